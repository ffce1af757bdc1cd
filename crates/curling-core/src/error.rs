use thiserror::Error;

/// Rejected turn-engine mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("the game is finished, no further turns can be played")]
    GameFinished,
    #[error("turn {turn} is outside the {len} slots of this round")]
    TurnOutOfRange { turn: usize, len: usize },
}
