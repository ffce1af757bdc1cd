//! Turn bookkeeping and the read-only views handed to display code.

use serde::{Deserialize, Serialize};

use crate::config::TargetStyle;
use crate::geometry::Position;
use crate::token::{Player, Token};

/// Where the engine stands within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for a stable token placement
    AwaitingDetection,
    /// Token stored, waiting for the turn to end
    TurnCommitted,
    /// Last turn of the round played, score being settled
    RoundBoundary,
    /// Terminal
    GameOver,
}

/// The circular goal tokens are scored against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub position: Position,
    pub radius: f64,
    pub style: TargetStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    pub phase: TurnPhase,
    pub current_player: Player,
    pub current_turn: usize,
    pub current_round: u32,
    /// Advantage stored by the last `end_turn`
    pub advantage: Option<Player>,
    pub scores: [u32; 2],
    pub finished: bool,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            phase: TurnPhase::AwaitingDetection,
            current_player: Player::Second,
            current_turn: 0,
            current_round: 1,
            advantage: Some(Player::First),
            scores: [0, 0],
            finished: false,
        }
    }
}

impl TurnState {
    /// Player ahead on points, `None` on a tie.
    pub fn leader(&self) -> Option<Player> {
        match self.scores[0].cmp(&self.scores[1]) {
            std::cmp::Ordering::Greater => Some(Player::First),
            std::cmp::Ordering::Less => Some(Player::Second),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Outcome of a committed token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub turn: usize,
    pub owner: Player,
    pub distance_to_target: Option<f64>,
    /// Earlier slots displaced by this token
    pub invalidated: Vec<usize>,
}

/// What `end_turn` did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnEvent {
    TurnAdvanced {
        turn: usize,
        advantage: Option<Player>,
    },
    RoundEnded {
        round: u32,
        scored: Option<Player>,
        scores: [u32; 2],
    },
    GameOver {
        scored: Option<Player>,
        winner: Option<Player>,
        scores: [u32; 2],
    },
}

/// Everything a display needs, serialisable for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub state: TurnState,
    pub turns_per_round: usize,
    pub max_rounds: u32,
    pub target: Option<Target>,
    pub tokens: Vec<Token>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = TurnState::default();
        assert_eq!(state.phase, TurnPhase::AwaitingDetection);
        assert_eq!(state.current_player, Player::Second);
        assert_eq!(state.current_turn, 0);
        assert_eq!(state.current_round, 1);
        assert!(!state.finished);
        assert_eq!(state.leader(), None);
    }

    #[test]
    fn test_leader() {
        let state = TurnState {
            scores: [1, 3],
            ..Default::default()
        };
        assert_eq!(state.leader(), Some(Player::Second));
    }
}
