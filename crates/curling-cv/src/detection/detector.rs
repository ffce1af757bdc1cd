//! Target and token detector built on the Hough circle transform

use super::config::{DetectionConfig, HoughParams};
use crate::circle::CircleSet;
use crate::utils::{ImageUtils, MaskUtils};
use crate::Result;
use anyhow::Context;
use curling_core::config::{GameConfig, TargetStyle, DEFAULT_TOKEN_RADIUS};
use curling_core::geometry::Position;
use curling_core::traits::{FrameDetector, TokenDetection};
use log::debug;
use opencv::{
    core::{Mat, Vec3f, Vector},
    imgproc::{self, HOUGH_GRADIENT, MORPH_CLOSE, MORPH_OPEN, THRESH_BINARY_INV},
};

/// Finds the target and the token in BGR frames.
///
/// Stateless: each call depends only on the frame and the radii passed in.
pub struct PositionDetector {
    config: DetectionConfig,
}

impl PositionDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Centre of the physical target, `None` when no circle is found.
    pub fn detect_target(&self, frame: &Mat, target_radius: f64) -> Result<Option<Position>> {
        let candidates = self.target_candidates(frame, target_radius)?;
        debug!("Target circles found: {}", candidates.len());
        Ok(candidates.mean_position())
    }

    /// Every circle the target pipeline reports.
    pub fn target_candidates(&self, frame: &Mat, target_radius: f64) -> Result<CircleSet> {
        let cfg = &self.config.target;
        let gray = ImageUtils::to_gray(frame)?;

        let mut edges = Mat::default();
        imgproc::canny(&gray, &mut edges, cfg.canny_low, cfg.canny_high, 3, false)
            .context("Canny failed")?;
        let closed = MaskUtils::morph(&edges, MORPH_CLOSE, cfg.close_kernel)?;

        let (min_radius, max_radius) = cfg.hough.radius_bounds(target_radius);
        Self::hough(&closed, &cfg.hough, min_radius, max_radius)
    }

    /// Averaged token position.
    ///
    /// With `token_radius == None` the search is unbounded and the mean
    /// fitted radius is reported alongside the position.
    pub fn detect_token(
        &self,
        frame: &Mat,
        token_radius: Option<f64>,
    ) -> Result<Option<TokenDetection>> {
        let start_time = std::time::Instant::now();
        let candidates = self.token_candidates(frame, token_radius)?;
        debug!(
            "Token circles found: {} in {}ms, radii {:?}",
            candidates.len(),
            start_time.elapsed().as_millis(),
            candidates.radius_range()
        );

        let Some(position) = candidates.mean_position() else {
            return Ok(None);
        };
        let radius = match token_radius {
            Some(_) => None,
            None => candidates.mean().map(|c| c.radius),
        };

        Ok(Some(TokenDetection { position, radius }))
    }

    /// Every circle the token pipeline reports.
    pub fn token_candidates(&self, frame: &Mat, token_radius: Option<f64>) -> Result<CircleSet> {
        let cfg = &self.config.token;
        let hsv = ImageUtils::to_hsv(frame)?;

        let red = MaskUtils::any_of(&hsv, &cfg.red)?;
        let blue = MaskUtils::in_range(&hsv, &cfg.blue)?;
        let white = MaskUtils::in_range(&hsv, &cfg.white)?;

        let gray = ImageUtils::to_gray(frame)?;
        let mut dark = Mat::default();
        imgproc::threshold(&gray, &mut dark, cfg.dark_threshold, 255.0, THRESH_BINARY_INV)
            .context("Threshold failed")?;
        let dark = MaskUtils::subtract_all(&dark, &[&red, &blue, &white])?;

        let kernel_radius = token_radius.unwrap_or(DEFAULT_TOKEN_RADIUS) as i32;
        let opened = MaskUtils::morph(&dark, MORPH_OPEN, kernel_radius / cfg.open_divisor.max(1))?;
        let closed =
            MaskUtils::morph(&opened, MORPH_CLOSE, kernel_radius / cfg.close_divisor.max(1))?;

        let (min_radius, max_radius) = match token_radius {
            Some(radius) => cfg.hough.radius_bounds(radius),
            None => (0, 0),
        };
        Self::hough(&closed, &cfg.hough, min_radius, max_radius)
    }

    fn hough(image: &Mat, params: &HoughParams, min_radius: i32, max_radius: i32) -> Result<CircleSet> {
        let mut circles = Vector::<Vec3f>::new();
        imgproc::hough_circles(
            image,
            &mut circles,
            HOUGH_GRADIENT,
            params.dp,
            params.min_dist,
            params.canny_threshold,
            params.accumulator_threshold,
            min_radius,
            max_radius,
        )
        .context("Hough circle transform failed")?;

        Ok(CircleSet::from_hough(&circles))
    }
}

impl Default for PositionDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl FrameDetector for PositionDetector {
    type Frame = Mat;
    type Error = anyhow::Error;

    fn is_readable(&self, frame: &Mat) -> bool {
        ImageUtils::is_readable(frame)
    }

    fn detect_target(&self, frame: &Mat, config: &GameConfig) -> Result<Option<Position>> {
        match config.target_style {
            TargetStyle::Virtual => Ok(Some(config.camera.canonical_point())),
            TargetStyle::Real => PositionDetector::detect_target(self, frame, config.target_radius),
        }
    }

    fn detect_token(&self, frame: &Mat, config: &GameConfig) -> Result<Option<TokenDetection>> {
        PositionDetector::detect_token(self, frame, config.token_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Point, Scalar, CV_8UC3};
    use opencv::imgproc::LINE_8;

    fn blank_frame(width: i32, height: i32) -> Result<Mat> {
        Ok(Mat::new_rows_cols_with_default(
            height,
            width,
            CV_8UC3,
            Scalar::all(230.0),
        )?)
    }

    fn near(p: Position, x: i32, y: i32, tolerance: i32) -> bool {
        (p.x - x).abs() <= tolerance && (p.y - y).abs() <= tolerance
    }

    #[test]
    fn test_blank_frame_has_no_token() -> Result<()> {
        let detector = PositionDetector::default();
        let frame = blank_frame(640, 480)?;
        assert_eq!(detector.detect_token(&frame, Some(34.0))?, None);
        Ok(())
    }

    #[test]
    fn test_blank_frame_has_no_target() -> Result<()> {
        let detector = PositionDetector::default();
        let frame = blank_frame(640, 480)?;
        assert_eq!(detector.detect_target(&frame, 205.0)?, None);
        Ok(())
    }

    #[test]
    fn test_dark_token_found() -> Result<()> {
        let detector = PositionDetector::default();
        let mut frame = blank_frame(640, 480)?;
        imgproc::circle(
            &mut frame,
            Point::new(320, 240),
            34,
            Scalar::new(40.0, 40.0, 40.0, 0.0),
            -1,
            LINE_8,
            0,
        )?;

        let detection = detector.detect_token(&frame, Some(34.0))?.expect("token");
        assert!(near(detection.position, 320, 240, 5), "{:?}", detection);
        assert_eq!(detection.radius, None);
        Ok(())
    }

    #[test]
    fn test_red_disc_is_not_a_token() -> Result<()> {
        let detector = PositionDetector::default();
        let mut frame = blank_frame(640, 480)?;
        imgproc::circle(
            &mut frame,
            Point::new(320, 240),
            34,
            Scalar::new(0.0, 0.0, 200.0, 0.0),
            -1,
            LINE_8,
            0,
        )?;

        assert_eq!(detector.detect_token(&frame, Some(34.0))?, None);
        Ok(())
    }

    #[test]
    fn test_target_ring_found() -> Result<()> {
        let detector = PositionDetector::default();
        let mut frame = blank_frame(1280, 720)?;
        imgproc::circle(
            &mut frame,
            Point::new(640, 360),
            205,
            Scalar::new(30.0, 30.0, 30.0, 0.0),
            3,
            LINE_8,
            0,
        )?;

        let position = detector.detect_target(&frame, 205.0)?.expect("target");
        assert!(near(position, 640, 360, 10), "{:?}", position);
        Ok(())
    }

    #[test]
    fn test_virtual_target_bypasses_detection() -> Result<()> {
        let detector = PositionDetector::default();
        let config = GameConfig {
            target_style: TargetStyle::Virtual,
            ..Default::default()
        };
        let frame = blank_frame(16, 16)?;
        let position = FrameDetector::detect_target(&detector, &frame, &config)?;
        assert_eq!(position, Some(Position::new(640, 360)));
        Ok(())
    }

    #[test]
    fn test_empty_mat_not_readable() {
        let detector = PositionDetector::default();
        assert!(!FrameDetector::is_readable(&detector, &Mat::default()));
    }
}
