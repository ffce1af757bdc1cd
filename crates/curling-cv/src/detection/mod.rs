//! Target and token detection

pub mod config;
pub mod detector;

pub use config::DetectionConfig;
pub use detector::PositionDetector;
