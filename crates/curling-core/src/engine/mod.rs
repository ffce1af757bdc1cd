//! Turn and round state machine.

pub mod state;

pub use state::{GameSnapshot, Target, TokenRecord, TurnEvent, TurnPhase, TurnState};

use log::{debug, info};

use crate::config::{ConfigChange, GameConfig, TargetStyle};
use crate::error::EngineError;
use crate::geometry::{distance_between, Position};
use crate::token::{resolve_collisions, Player, Token, TokenRegistry};

/// Drives turns, rounds and scoring for one game.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    config: GameConfig,
    registry: TokenRegistry,
    state: TurnState,
    target: Option<Target>,
}

impl TurnEngine {
    pub fn new(config: GameConfig) -> Self {
        let registry = TokenRegistry::new(config.turns_per_round);
        Self {
            config,
            registry,
            state: TurnState::default(),
            target: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn tokens(&self) -> &[Token] {
        self.registry.as_slice()
    }

    pub fn current_player(&self) -> Player {
        self.state.current_player
    }

    pub fn current_turn(&self) -> usize {
        self.state.current_turn
    }

    pub fn current_round(&self) -> u32 {
        self.state.current_round
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.state.scores[0], self.state.scores[1])
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Advantage stored at the end of the last turn.
    pub fn stored_advantage(&self) -> Option<Player> {
        self.state.advantage
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn target_position(&self) -> Option<Position> {
        self.target.map(|t| t.position)
    }

    /// Establish the target. A target already in place is kept.
    pub fn set_target(&mut self, position: Position) -> Target {
        *self.target.get_or_insert_with(|| {
            info!("Target established at ({}, {})", position.x, position.y);
            Target {
                position,
                radius: self.config.target_radius,
                style: self.config.target_style,
            }
        })
    }

    pub fn clear_target(&mut self) {
        if self.target.take().is_some() {
            debug!("Target cleared");
        }
    }

    /// Store the token detected for the current turn.
    ///
    /// Recording twice in the same turn overwrites the slot. Earlier slots
    /// displaced by the new token are invalidated.
    pub fn record_token(&mut self, position: Position) -> Result<TokenRecord, EngineError> {
        if self.state.finished {
            return Err(EngineError::GameFinished);
        }

        let turn = self.state.current_turn;
        if turn >= self.registry.len() {
            return Err(EngineError::TurnOutOfRange {
                turn,
                len: self.registry.len(),
            });
        }

        let owner = self.state.current_player;
        let distance_to_target = distance_between(Some(position), self.target_position());
        self.registry
            .set(turn, Token::new(position, owner, distance_to_target));

        let radius = self.config.token_radius.unwrap_or(0.0);
        let invalidated = resolve_collisions(self.registry.as_mut_slice(), turn, radius);

        self.state.phase = TurnPhase::TurnCommitted;
        info!(
            "Turn {} ({}): token at ({}, {}), distance {}, {} on the board",
            turn + 1,
            owner,
            position.x,
            position.y,
            distance_to_target.map_or_else(|| "unknown".to_string(), |d| format!("{:.1}", d)),
            self.registry.placed_count()
        );

        Ok(TokenRecord {
            turn,
            owner,
            distance_to_target,
            invalidated,
        })
    }

    /// Player whose token currently lies closest to the target.
    ///
    /// At turn 0 this is always `Player::First`. Otherwise slots
    /// `0..=current_turn` are scanned; absent tokens and unknown distances
    /// are skipped and the lowest index wins ties.
    pub fn advantage(&self) -> Option<Player> {
        if self.state.current_turn == 0 {
            return Some(Player::First);
        }

        let mut closest: Option<(usize, f64)> = None;
        for (i, token) in self
            .registry
            .iter()
            .enumerate()
            .take(self.state.current_turn + 1)
        {
            if !token.is_placed() {
                continue;
            }
            let Some(distance) = token.distance_to_target else {
                continue;
            };
            if distance < 0.0 {
                continue;
            }
            if closest.is_none_or(|(_, best)| distance < best) {
                closest = Some((i, distance));
            }
        }

        closest.map(|(i, distance)| {
            debug!("Closest token {} at {:.1}px", i, distance);
            Player::from_index(i)
        })
    }

    /// Close the current turn, settling the round when it was the last one.
    pub fn end_turn(&mut self) -> Result<TurnEvent, EngineError> {
        if self.state.finished {
            return Err(EngineError::GameFinished);
        }

        let advantage = self.advantage();
        self.state.advantage = advantage;
        self.state.current_turn += 1;
        self.state.current_player = self.state.current_player.other();

        if self.state.current_turn >= self.config.turns_per_round {
            self.state.phase = TurnPhase::RoundBoundary;
            return Ok(self.finish_round());
        }

        self.state.phase = TurnPhase::AwaitingDetection;
        info!(
            "Turn {}: {} ahead",
            self.state.current_turn,
            advantage.map_or_else(|| "nobody".to_string(), |p| p.to_string())
        );
        Ok(TurnEvent::TurnAdvanced {
            turn: self.state.current_turn,
            advantage,
        })
    }

    fn finish_round(&mut self) -> TurnEvent {
        let scored = self.state.advantage;
        if let Some(player) = scored {
            self.state.scores[player.index()] += 1;
        }
        let round = self.state.current_round;
        let scores = self.state.scores;
        info!(
            "Round {} over, point to {}, score {}-{}",
            round,
            scored.map_or_else(|| "nobody".to_string(), |p| p.to_string()),
            scores[0],
            scores[1]
        );

        if round >= self.config.max_rounds {
            self.state.finished = true;
            self.state.phase = TurnPhase::GameOver;
            let winner = self.state.leader();
            info!(
                "Game over, winner: {}",
                winner.map_or_else(|| "draw".to_string(), |p| p.to_string())
            );
            return TurnEvent::GameOver {
                scored,
                winner,
                scores,
            };
        }

        self.registry = TokenRegistry::new(self.config.turns_per_round);
        self.state.current_round += 1;
        self.state.current_player = Player::Second;
        self.state.current_turn = 0;
        self.state.phase = TurnPhase::AwaitingDetection;

        TurnEvent::RoundEnded {
            round,
            scored,
            scores,
        }
    }

    /// Apply a configuration change, resizing the registry when the number
    /// of turns moves. Returns `true` when something changed.
    ///
    /// A finished game ignores every change. Shrinking the round to or below
    /// the current turn closes the round on the spot.
    pub fn apply(&mut self, change: ConfigChange) -> bool {
        if self.state.finished {
            debug!("Game finished, ignoring {:?}", change);
            return false;
        }

        let changed = self.config.adjust(change);
        if !changed {
            return false;
        }

        match change {
            ConfigChange::IncrementTurns | ConfigChange::DecrementTurns => {
                self.registry.resize(self.config.turns_per_round);
                if self.state.current_turn >= self.config.turns_per_round {
                    self.close_truncated_round();
                }
            }
            ConfigChange::SetTargetStyle(_) => self.clear_target(),
            ConfigChange::SetTargetRadius(_) | ConfigChange::AdjustTargetRadius(_) => {
                if let Some(target) = self.target.as_mut() {
                    target.radius = self.config.target_radius;
                }
            }
            _ => {}
        }
        true
    }

    fn close_truncated_round(&mut self) {
        info!(
            "Round {} cut short at turn {} of {}",
            self.state.current_round,
            self.state.current_turn,
            self.config.turns_per_round
        );
        self.state.current_turn = self.config.turns_per_round;
        self.state.advantage = self.advantage();
        self.state.phase = TurnPhase::RoundBoundary;
        self.finish_round();
    }

    /// Adopt a radius measured by the detector while none is configured.
    pub fn learn_token_radius(&mut self, radius: f64) {
        if self.config.token_radius.is_none() {
            info!("Token radius learned from detection: {:.1}px", radius);
            self.config.token_radius = Some(radius.max(0.0));
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state.clone(),
            turns_per_round: self.config.turns_per_round,
            max_rounds: self.config.max_rounds,
            target: self.target,
            tokens: self.registry.as_slice().to_vec(),
        }
    }
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl TurnEngine {
    /// Whether the target must still be detected from a frame.
    pub fn needs_target_detection(&self) -> bool {
        self.target.is_none() && self.config.target_style == TargetStyle::Real
    }
}
