//! Binary mask helpers for colour segmentation

use crate::detection::config::HsvRange;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{self, Mat, Point, Size},
    imgproc::{self, MORPH_ELLIPSE},
    prelude::*,
};

/// Mask construction and morphology
pub struct MaskUtils;

impl MaskUtils {
    /// Pixels of an HSV image inside `range`
    pub fn in_range(hsv: &Mat, range: &HsvRange) -> Result<Mat> {
        let mut mask = Mat::default();
        core::in_range(hsv, &range.lower_scalar(), &range.upper_scalar(), &mut mask)
            .context("Colour range mask failed")?;
        Ok(mask)
    }

    /// Saturating sum of the masks of several ranges
    pub fn any_of(hsv: &Mat, ranges: &[HsvRange]) -> Result<Mat> {
        let mut combined = Mat::default();
        for (i, range) in ranges.iter().enumerate() {
            let mask = Self::in_range(hsv, range)?;
            if i == 0 {
                combined = mask;
            } else {
                let mut sum = Mat::default();
                core::add(&combined, &mask, &mut sum, &core::no_array(), -1)?;
                combined = sum;
            }
        }
        Ok(combined)
    }

    /// Remove every mask from `binary`, saturating at zero
    pub fn subtract_all(binary: &Mat, masks: &[&Mat]) -> Result<Mat> {
        let mut result = binary.clone();
        for mask in masks {
            let mut diff = Mat::default();
            core::subtract(&result, *mask, &mut diff, &core::no_array(), -1)
                .context("Mask subtraction failed")?;
            result = diff;
        }
        Ok(result)
    }

    /// Elliptical structuring element, side floored at 1 pixel
    pub fn ellipse(side: i32) -> Result<Mat> {
        let side = side.max(1);
        Ok(imgproc::get_structuring_element(
            MORPH_ELLIPSE,
            Size::new(side, side),
            Point::new(-1, -1),
        )?)
    }

    /// Apply one morphological operation with an elliptical element
    pub fn morph(src: &Mat, op: i32, side: i32) -> Result<Mat> {
        let kernel = Self::ellipse(side)?;
        let mut dst = Mat::default();
        imgproc::morphology_ex(
            src,
            &mut dst,
            op,
            &kernel,
            Point::new(-1, -1),
            1,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )
        .context("Morphology failed")?;
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC1, CV_8UC3};
    use opencv::imgproc::{MORPH_CLOSE, MORPH_OPEN};

    fn range(lower: [f64; 3], upper: [f64; 3]) -> HsvRange {
        HsvRange { lower, upper }
    }

    #[test]
    fn test_any_of_wraps_red_hue() -> Result<()> {
        let mut hsv = Mat::new_rows_cols_with_default(1, 3, CV_8UC3, Scalar::all(0.0))?;
        *hsv.at_2d_mut::<Vec3b>(0, 0)? = Vec3b::from([5, 200, 200]);
        *hsv.at_2d_mut::<Vec3b>(0, 1)? = Vec3b::from([170, 200, 200]);
        *hsv.at_2d_mut::<Vec3b>(0, 2)? = Vec3b::from([90, 200, 200]);

        let mask = MaskUtils::any_of(
            &hsv,
            &[
                range([0.0, 100.0, 100.0], [10.0, 255.0, 255.0]),
                range([160.0, 100.0, 100.0], [179.0, 255.0, 255.0]),
            ],
        )?;

        assert_eq!(*mask.at_2d::<u8>(0, 0)?, 255);
        assert_eq!(*mask.at_2d::<u8>(0, 1)?, 255);
        assert_eq!(*mask.at_2d::<u8>(0, 2)?, 0);
        Ok(())
    }

    #[test]
    fn test_subtract_all() -> Result<()> {
        let binary = Mat::new_rows_cols_with_default(2, 2, CV_8UC1, Scalar::all(255.0))?;
        let mut mask = Mat::new_rows_cols_with_default(2, 2, CV_8UC1, Scalar::all(0.0))?;
        *mask.at_2d_mut::<u8>(1, 1)? = 255;

        let result = MaskUtils::subtract_all(&binary, &[&mask])?;
        assert_eq!(*result.at_2d::<u8>(0, 0)?, 255);
        assert_eq!(*result.at_2d::<u8>(1, 1)?, 0);
        Ok(())
    }

    #[test]
    fn test_open_removes_speckle() -> Result<()> {
        let mut binary = Mat::new_rows_cols_with_default(40, 40, CV_8UC1, Scalar::all(0.0))?;
        *binary.at_2d_mut::<u8>(20, 20)? = 255;

        let opened = MaskUtils::morph(&binary, MORPH_OPEN, 5)?;
        assert_eq!(*opened.at_2d::<u8>(20, 20)?, 0);

        let closed = MaskUtils::morph(&opened, MORPH_CLOSE, 0)?;
        assert_eq!(core::count_non_zero(&closed)?, 0);
        Ok(())
    }
}
