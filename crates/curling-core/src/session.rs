//! One game driven tick by tick from camera frames.

use log::{debug, info, warn};

use crate::config::{ConfigChange, TargetStyle};
use crate::engine::{GameSnapshot, TokenRecord, TurnEngine, TurnEvent, TurnPhase};
use crate::error::EngineError;
use crate::geometry::Position;
use crate::stability::{Stability, StabilityWindow};
use crate::traits::FrameDetector;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Game over, nothing was done
    Finished,
    /// Frame missing or unreadable, state untouched
    FrameSkipped,
    /// No token on the table
    Waiting,
    /// Token seen, not yet stable
    Settling { position: Position, count: u32 },
    /// Stable token stored for the current turn
    Committed(TokenRecord),
    /// Committed token still on the table
    AwaitingRemoval,
    /// Committed token removed, turn closed
    TurnEnded(TurnEvent),
}

/// Couples a detector, the stability window and the turn engine.
pub struct GameSession<D: FrameDetector> {
    detector: D,
    engine: TurnEngine,
    window: StabilityWindow,
}

impl<D: FrameDetector> GameSession<D> {
    pub fn new(detector: D, engine: TurnEngine) -> Self {
        let window = StabilityWindow::new(engine.config().stability.clone());
        Self {
            detector,
            engine,
            window,
        }
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine.snapshot()
    }

    pub fn apply(&mut self, change: ConfigChange) -> bool {
        let round = self.engine.current_round();
        let changed = self.engine.apply(change);
        if changed {
            self.window.set_config(self.engine.config().stability.clone());
            if self.engine.current_round() != round || self.engine.is_finished() {
                self.window.reset();
            }
        }
        changed
    }

    /// Close the current turn without waiting for the token to be removed.
    pub fn end_turn(&mut self) -> Result<TurnEvent, EngineError> {
        let event = self.engine.end_turn()?;
        self.window.reset();
        Ok(event)
    }

    /// Run one detection tick. `None` stands for a frame that could not be read.
    pub fn tick(&mut self, frame: Option<&D::Frame>) -> TickOutcome {
        if self.engine.is_finished() {
            return TickOutcome::Finished;
        }

        let Some(frame) = frame.filter(|f| self.detector.is_readable(f)) else {
            warn!("No readable frame, skipping tick");
            return TickOutcome::FrameSkipped;
        };

        self.ensure_target(frame);
        let token = self.detect_token(frame);

        match self.engine.phase() {
            TurnPhase::AwaitingDetection => match self.window.observe(token) {
                Stability::Missing => TickOutcome::Waiting,
                Stability::Settling { position, count } => {
                    debug!("Token stable for {} ticks", count);
                    TickOutcome::Settling { position, count }
                }
                Stability::Stable(position) => match self.engine.record_token(position) {
                    Ok(record) => {
                        info!(
                            "Turn {}: {} ahead",
                            record.turn + 1,
                            self.engine
                                .advantage()
                                .map_or_else(|| "nobody".to_string(), |p| p.to_string())
                        );
                        TickOutcome::Committed(record)
                    }
                    Err(e) => {
                        warn!("Token not recorded: {}", e);
                        self.window.reset();
                        TickOutcome::Waiting
                    }
                },
            },
            TurnPhase::TurnCommitted => {
                if token.is_some() {
                    return TickOutcome::AwaitingRemoval;
                }
                match self.end_turn() {
                    Ok(event) => TickOutcome::TurnEnded(event),
                    Err(_) => TickOutcome::Finished,
                }
            }
            TurnPhase::RoundBoundary | TurnPhase::GameOver => TickOutcome::Finished,
        }
    }

    fn ensure_target(&mut self, frame: &D::Frame) {
        if self.engine.target().is_some() {
            return;
        }

        let config = self.engine.config();
        if config.target_style == TargetStyle::Virtual {
            let point = config.camera.canonical_point();
            self.engine.set_target(point);
            return;
        }

        match self.detector.detect_target(frame, config) {
            Ok(Some(position)) => {
                self.engine.set_target(position);
            }
            Ok(None) => debug!("Target not found"),
            Err(e) => warn!("Target detection failed: {}", e),
        }
    }

    fn detect_token(&mut self, frame: &D::Frame) -> Option<Position> {
        match self.detector.detect_token(frame, self.engine.config()) {
            Ok(Some(detection)) => {
                if let Some(radius) = detection.radius {
                    self.engine.learn_token_radius(radius);
                }
                Some(detection.position)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Token detection failed: {}", e);
                None
            }
        }
    }
}
