//! Detection configuration

use opencv::core::Scalar;
use serde::{Deserialize, Serialize};

/// Inclusive HSV bounds, OpenCV 8-bit scale (hue 0..180)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl HsvRange {
    pub const fn new(lower: [f64; 3], upper: [f64; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn lower_scalar(&self) -> Scalar {
        Scalar::new(self.lower[0], self.lower[1], self.lower[2], 0.0)
    }

    pub fn upper_scalar(&self) -> Scalar {
        Scalar::new(self.upper[0], self.upper[1], self.upper[2], 0.0)
    }
}

/// Hough gradient transform parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoughParams {
    pub dp: f64,
    pub min_dist: f64,
    /// Upper Canny threshold used internally by the transform
    pub canny_threshold: f64,
    pub accumulator_threshold: f64,
    /// Accepted radii are `radius ± radius_tolerance`
    pub radius_tolerance: f64,
}

impl HoughParams {
    /// Radius search bounds around `radius`, never negative
    pub fn radius_bounds(&self, radius: f64) -> (i32, i32) {
        let min = (radius - self.radius_tolerance) as i32;
        let max = (radius + self.radius_tolerance) as i32;
        (min.max(0), max.max(0))
    }
}

/// Token segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDetectionConfig {
    /// Both ends of the hue circle
    pub red: Vec<HsvRange>,
    pub blue: HsvRange,
    pub white: HsvRange,
    /// Gray level under which a pixel may belong to a token
    pub dark_threshold: f64,
    /// Opening element side is `radius / open_divisor`
    pub open_divisor: i32,
    /// Closing element side is `radius / close_divisor`
    pub close_divisor: i32,
    pub hough: HoughParams,
}

/// Target edge detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDetectionConfig {
    pub canny_low: f64,
    pub canny_high: f64,
    pub close_kernel: i32,
    pub hough: HoughParams,
}

/// Main detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub token: TokenDetectionConfig,
    pub target: TargetDetectionConfig,
}

impl Default for TokenDetectionConfig {
    fn default() -> Self {
        Self {
            red: vec![
                HsvRange::new([0.0, 100.0, 100.0], [10.0, 255.0, 255.0]),
                HsvRange::new([160.0, 100.0, 100.0], [179.0, 255.0, 255.0]),
            ],
            blue: HsvRange::new([75.0, 70.0, 70.0], [140.0, 255.0, 255.0]),
            white: HsvRange::new([0.0, 0.0, 130.0], [360.0, 130.0, 255.0]),
            dark_threshold: 185.0,
            open_divisor: 4,
            close_divisor: 2,
            hough: HoughParams {
                dp: 1.0,
                min_dist: 1.0,
                canny_threshold: 30.0,
                accumulator_threshold: 10.0,
                radius_tolerance: 5.0,
            },
        }
    }
}

impl Default for TargetDetectionConfig {
    fn default() -> Self {
        Self {
            canny_low: 30.0,
            canny_high: 100.0,
            close_kernel: 7,
            hough: HoughParams {
                dp: 1.0,
                min_dist: 1.0,
                canny_threshold: 15.0,
                accumulator_threshold: 5.0,
                radius_tolerance: 8.0,
            },
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            token: TokenDetectionConfig::default(),
            target: TargetDetectionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_bounds() {
        let config = DetectionConfig::default();
        assert_eq!(config.token.hough.radius_bounds(34.0), (29, 39));
        assert_eq!(config.target.hough.radius_bounds(205.0), (197, 213));
        assert_eq!(config.token.hough.radius_bounds(2.0), (0, 7));
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = DetectionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DetectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.token.red, config.token.red);
        assert_eq!(back.target.hough, config.target.hough);
    }
}
