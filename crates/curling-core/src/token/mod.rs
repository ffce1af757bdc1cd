//! Tokens placed during a round and the registry holding them.

pub mod collision;
pub mod registry;

pub use collision::resolve_collisions;
pub use registry::TokenRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Position;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// Player owning the slot at `index`, even slots belong to `First`.
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 { Player::First } else { Player::Second }
    }

    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.index() + 1)
    }
}

/// A token slot for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub position: Option<Position>,
    pub owner: Player,
    pub distance_to_target: Option<f64>,
}

impl Token {
    /// Empty slot for `owner`, nothing detected yet.
    pub fn empty(owner: Player) -> Self {
        Self {
            position: None,
            owner,
            distance_to_target: None,
        }
    }

    pub fn new(position: Position, owner: Player, distance_to_target: Option<f64>) -> Self {
        Self {
            position: Some(position),
            owner,
            distance_to_target,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Distance to another token, `None` if either has no position.
    pub fn distance_to_token(&self, other: &Token) -> Option<f64> {
        crate::geometry::distance_between(self.position, other.position)
    }

    pub fn invalidate(&mut self) {
        self.position = None;
    }
}
