//! Runtime game configuration.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::geometry::Position;

pub const DEFAULT_TURNS_PER_ROUND: usize = 8;
pub const MIN_TURNS_PER_ROUND: usize = 4;
pub const TURN_STEP: usize = 2;
pub const DEFAULT_MAX_ROUNDS: u32 = 2;
pub const MIN_MAX_ROUNDS: u32 = 1;
pub const DEFAULT_TOKEN_RADIUS: f64 = 34.0;
pub const DEFAULT_TARGET_RADIUS: f64 = 205.0;
pub const MAX_TARGET_RADIUS: f64 = 500.0;

/// How tokens are drawn by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TokenStyle {
    /// Player artwork overlaid on the frame
    #[default]
    Image,
    /// Plain coloured circles
    Circle,
}

/// Where the target comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetStyle {
    /// A physical target detected once from the camera frame
    #[default]
    Real,
    /// A drawn target fixed at the centre of the canvas
    Virtual,
}

/// Capture parameters consumed by the camera collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub exposure: i32,
    pub exposure_enabled: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            exposure: -8,
            exposure_enabled: false,
        }
    }
}

impl CameraConfig {
    /// Centre of the canvas, used as the virtual target position.
    pub fn canonical_point(&self) -> Position {
        Position::new((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

/// Debounce applied to token reports before a turn is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Consecutive stable ticks needed before committing
    pub required_ticks: u32,
    /// Half side of the box a report must stay in, exclusive
    pub tolerance: i32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            required_ticks: 15,
            tolerance: 4,
        }
    }
}

/// Main game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub turns_per_round: usize,
    pub max_rounds: u32,
    /// `None` until learned from the detector's mean radius
    pub token_radius: Option<f64>,
    pub target_radius: f64,
    pub token_style: TokenStyle,
    pub target_style: TargetStyle,
    pub camera: CameraConfig,
    pub stability: StabilityConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turns_per_round: DEFAULT_TURNS_PER_ROUND,
            max_rounds: DEFAULT_MAX_ROUNDS,
            token_radius: Some(DEFAULT_TOKEN_RADIUS),
            target_radius: DEFAULT_TARGET_RADIUS,
            token_style: TokenStyle::default(),
            target_style: TargetStyle::default(),
            camera: CameraConfig::default(),
            stability: StabilityConfig::default(),
        }
    }
}

/// A single configuration adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    IncrementTurns,
    DecrementTurns,
    IncrementRounds,
    DecrementRounds,
    AdjustTokenRadius(f64),
    SetTokenRadius(Option<f64>),
    AdjustTargetRadius(f64),
    SetTargetRadius(f64),
    SetTokenStyle(TokenStyle),
    SetTargetStyle(TargetStyle),
    SetCameraResolution { width: u32, height: u32 },
    SetExposure(i32),
    EnableExposure(bool),
    SetStabilityTicks(u32),
}

impl GameConfig {
    /// Load a configuration file, normalising out-of-range values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        info!("Loaded game configuration from {:?}", path);
        Ok(config.normalized())
    }

    /// Bring every field back inside its bounds.
    pub fn normalized(mut self) -> Self {
        self.turns_per_round = (self.turns_per_round - self.turns_per_round % 2).max(MIN_TURNS_PER_ROUND);
        self.max_rounds = self.max_rounds.max(MIN_MAX_ROUNDS);
        self.token_radius = self.token_radius.map(clamp_token_radius);
        self.target_radius = clamp_target_radius(self.target_radius);
        self.camera.width = self.camera.width.max(1);
        self.camera.height = self.camera.height.max(1);
        self.stability.required_ticks = self.stability.required_ticks.max(1);
        self.stability.tolerance = self.stability.tolerance.max(1);
        self
    }

    /// Apply one adjustment. Returns `true` when a value actually changed.
    pub fn adjust(&mut self, change: ConfigChange) -> bool {
        let before = self.clone();

        match change {
            ConfigChange::IncrementTurns => self.turns_per_round += TURN_STEP,
            ConfigChange::DecrementTurns => {
                if self.turns_per_round > MIN_TURNS_PER_ROUND {
                    self.turns_per_round -= TURN_STEP;
                } else {
                    debug!("Ignoring turn decrement below {}", MIN_TURNS_PER_ROUND);
                }
            }
            ConfigChange::IncrementRounds => self.max_rounds += 1,
            ConfigChange::DecrementRounds => {
                if self.max_rounds > MIN_MAX_ROUNDS {
                    self.max_rounds -= 1;
                } else {
                    debug!("Ignoring round decrement below {}", MIN_MAX_ROUNDS);
                }
            }
            ConfigChange::AdjustTokenRadius(delta) => {
                let current = self.token_radius.unwrap_or(0.0);
                self.token_radius = Some(clamp_token_radius(current + delta));
            }
            ConfigChange::SetTokenRadius(radius) => {
                self.token_radius = radius.map(clamp_token_radius);
            }
            ConfigChange::AdjustTargetRadius(delta) => {
                self.target_radius = clamp_target_radius(self.target_radius + delta);
            }
            ConfigChange::SetTargetRadius(radius) => {
                self.target_radius = clamp_target_radius(radius);
            }
            ConfigChange::SetTokenStyle(style) => self.token_style = style,
            ConfigChange::SetTargetStyle(style) => self.target_style = style,
            ConfigChange::SetCameraResolution { width, height } => {
                self.camera.width = width.max(1);
                self.camera.height = height.max(1);
            }
            ConfigChange::SetExposure(value) => self.camera.exposure = value,
            ConfigChange::EnableExposure(enabled) => self.camera.exposure_enabled = enabled,
            ConfigChange::SetStabilityTicks(ticks) => self.stability.required_ticks = ticks.max(1),
        }

        let changed = *self != before;
        if changed {
            info!("Configuration updated: {:?}", change);
        }
        changed
    }
}

fn clamp_token_radius(radius: f64) -> f64 {
    radius.max(0.0)
}

fn clamp_target_radius(radius: f64) -> f64 {
    radius.clamp(0.0, MAX_TARGET_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.turns_per_round, 8);
        assert_eq!(config.max_rounds, 2);
        assert_eq!(config.token_radius, Some(34.0));
        assert_eq!(config.target_radius, 205.0);
        assert_eq!(config.camera.canonical_point(), Position::new(640, 360));
    }

    #[test]
    fn test_turn_floor() {
        let mut config = GameConfig::default();
        assert!(config.adjust(ConfigChange::DecrementTurns));
        assert!(config.adjust(ConfigChange::DecrementTurns));
        assert_eq!(config.turns_per_round, 4);
        assert!(!config.adjust(ConfigChange::DecrementTurns));
        assert_eq!(config.turns_per_round, 4);
        assert!(config.adjust(ConfigChange::IncrementTurns));
        assert_eq!(config.turns_per_round, 6);
    }

    #[test]
    fn test_round_floor() {
        let mut config = GameConfig::default();
        config.adjust(ConfigChange::DecrementRounds);
        assert!(!config.adjust(ConfigChange::DecrementRounds));
        assert_eq!(config.max_rounds, 1);
    }

    #[test]
    fn test_radius_clamping() {
        let mut config = GameConfig::default();
        config.adjust(ConfigChange::AdjustTokenRadius(-100.0));
        assert_eq!(config.token_radius, Some(0.0));

        config.adjust(ConfigChange::AdjustTargetRadius(1000.0));
        assert_eq!(config.target_radius, MAX_TARGET_RADIUS);
        config.adjust(ConfigChange::SetTargetRadius(-3.0));
        assert_eq!(config.target_radius, 0.0);
    }

    #[test]
    fn test_unset_token_radius_adjusts_from_zero() {
        let mut config = GameConfig {
            token_radius: None,
            ..Default::default()
        };
        config.adjust(ConfigChange::AdjustTokenRadius(1.0));
        assert_eq!(config.token_radius, Some(1.0));
    }

    #[test]
    fn test_normalized() {
        let config = GameConfig {
            turns_per_round: 7,
            max_rounds: 0,
            target_radius: 900.0,
            token_radius: Some(-2.0),
            ..Default::default()
        }
        .normalized();

        assert_eq!(config.turns_per_round, 6);
        assert_eq!(config.max_rounds, 1);
        assert_eq!(config.target_radius, 500.0);
        assert_eq!(config.token_radius, Some(0.0));
    }

    #[test]
    fn test_partial_json() {
        let config: GameConfig = serde_json::from_str(r#"{"max_rounds": 5}"#).unwrap();
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.turns_per_round, 8);
        assert_eq!(config.target_style, TargetStyle::Real);
    }
}
