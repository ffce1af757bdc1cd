//! Curling table game core
//!
//! Turn bookkeeping, token collisions and scoring for a curling-style game
//! observed by an overhead camera. Frame analysis lives behind the
//! [`traits::FrameDetector`] seam so this crate stays free of any imaging
//! backend.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod session;
pub mod stability;
pub mod token;

pub use config::{ConfigChange, GameConfig, TargetStyle, TokenStyle};
pub use engine::{GameSnapshot, Target, TurnEngine, TurnEvent, TurnPhase};
pub use error::EngineError;
pub use geometry::{Circle, Position};
pub use session::{GameSession, TickOutcome};
pub use token::{Player, Token, TokenRegistry};

/// Seams between the game core and frame analysis
pub mod traits {
    use super::*;

    /// A token found in a frame.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct TokenDetection {
        pub position: Position,
        /// Mean fitted radius, only reported while no radius is configured
        pub radius: Option<f64>,
    }

    /// Locates the target and the token in a camera frame.
    pub trait FrameDetector {
        type Frame;
        type Error: std::fmt::Display;

        /// Whether the frame holds any pixels at all.
        fn is_readable(&self, _frame: &Self::Frame) -> bool {
            true
        }

        fn detect_target(
            &self,
            frame: &Self::Frame,
            config: &GameConfig,
        ) -> Result<Option<Position>, Self::Error>;

        fn detect_token(
            &self,
            frame: &Self::Frame,
            config: &GameConfig,
        ) -> Result<Option<TokenDetection>, Self::Error>;
    }
}
