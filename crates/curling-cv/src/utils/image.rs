//! Frame loading and colour space conversions

use crate::Result;
use anyhow::{bail, Context};
use opencv::{
    core::Mat,
    imgproc::{self, COLOR_BGR2GRAY, COLOR_BGR2HSV, COLOR_RGB2BGR},
    prelude::*,
};
use std::path::Path;

/// Image utility functions for camera frames
pub struct ImageUtils;

impl ImageUtils {
    /// Load the frame the capture process last wrote, as a BGR Mat.
    ///
    /// The file may be half written or missing; any decode failure or an
    /// empty image is an error the caller treats as "no frame".
    pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open frame: {:?}", path.as_ref()))?
            .to_rgb8();

        Self::rgb_to_mat(&img)
    }

    /// Convert image::RgbImage to a BGR OpenCV Mat
    pub fn rgb_to_mat(rgb_image: &image::RgbImage) -> Result<Mat> {
        let (width, height) = rgb_image.dimensions();
        if width == 0 || height == 0 {
            bail!("Frame has no pixels ({}x{})", width, height);
        }

        let flat = Mat::from_slice(rgb_image.as_raw()).context("Failed to wrap frame buffer")?;
        let rgb = flat
            .reshape(3, height as i32)
            .context("Failed to reshape frame buffer")?
            .try_clone()?;

        let mut bgr = Mat::default();
        imgproc::cvt_color(&rgb, &mut bgr, COLOR_RGB2BGR, 0)
            .context("RGB to BGR conversion failed")?;
        Ok(bgr)
    }

    /// Whether a Mat holds any pixels
    pub fn is_readable(mat: &Mat) -> bool {
        !mat.empty() && mat.rows() > 0 && mat.cols() > 0
    }

    pub fn to_gray(bgr: &Mat) -> Result<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color(bgr, &mut gray, COLOR_BGR2GRAY, 0)
            .context("Grayscale conversion failed")?;
        Ok(gray)
    }

    pub fn to_hsv(bgr: &Mat) -> Result<Mat> {
        let mut hsv = Mat::default();
        imgproc::cvt_color(bgr, &mut hsv, COLOR_BGR2HSV, 0)
            .context("HSV conversion failed")?;
        Ok(hsv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Vec3b;

    #[test]
    fn test_rgb_to_mat_swaps_channels() -> Result<()> {
        let mut rgb_img = image::RgbImage::new(4, 3);
        rgb_img.put_pixel(1, 2, image::Rgb([10, 20, 30]));

        let mat = ImageUtils::rgb_to_mat(&rgb_img)?;
        assert_eq!((mat.cols(), mat.rows()), (4, 3));

        let px = *mat.at_2d::<Vec3b>(2, 1)?;
        assert_eq!((px[0], px[1], px[2]), (30, 20, 10));
        Ok(())
    }

    #[test]
    fn test_empty_image_rejected() {
        let rgb_img = image::RgbImage::new(0, 0);
        assert!(ImageUtils::rgb_to_mat(&rgb_img).is_err());
        assert!(!ImageUtils::is_readable(&Mat::default()));
    }

    #[test]
    fn test_missing_frame_is_error() {
        assert!(ImageUtils::load_frame("does/not/exist.jpg").is_err());
    }

    #[test]
    fn test_gray_conversion() -> Result<()> {
        let rgb_img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 200, 200]));
        let gray = ImageUtils::to_gray(&ImageUtils::rgb_to_mat(&rgb_img)?)?;
        assert_eq!(gray.channels(), 1);
        assert_eq!(*gray.at_2d::<u8>(0, 0)?, 200);
        Ok(())
    }
}
