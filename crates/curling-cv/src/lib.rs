//! Curling table computer vision
//!
//! Locates the target and the player tokens in overhead camera frames using
//! OpenCV colour segmentation and the Hough circle transform.

pub mod circle;
pub mod detection;
pub mod utils;

// Re-export commonly used types
pub use circle::CircleSet;
pub use detection::{DetectionConfig, PositionDetector};
pub use utils::ImageUtils;

pub use curling_core::traits::{FrameDetector, TokenDetection};

// Error handling
pub type Result<T> = anyhow::Result<T>;
