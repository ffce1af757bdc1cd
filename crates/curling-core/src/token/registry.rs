use serde::{Deserialize, Serialize};

use super::{Player, Token};

/// Ordered token slots for the active round, one per turn.
///
/// Slot `i` is created for `Player::from_index(i)`; the length always matches
/// the configured number of turns per round.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
}

impl TokenRegistry {
    pub fn new(turns_per_round: usize) -> Self {
        Self {
            tokens: (0..turns_per_round)
                .map(|i| Token::empty(Player::from_index(i)))
                .collect(),
        }
    }

    /// Grow or shrink at the tail, keeping every surviving slot untouched.
    pub fn resize(&mut self, turns_per_round: usize) {
        if turns_per_round < self.tokens.len() {
            self.tokens.truncate(turns_per_round);
        } else {
            let start = self.tokens.len();
            self.tokens
                .extend((start..turns_per_round).map(|i| Token::empty(Player::from_index(i))));
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Replace the slot at `index`. Returns `false` when out of range.
    pub fn set(&mut self, index: usize, token: Token) -> bool {
        match self.tokens.get_mut(index) {
            Some(slot) => {
                *slot = token;
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn as_mut_slice(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Number of slots currently holding a position.
    pub fn placed_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_placed()).count()
    }
}

impl<'a> IntoIterator for &'a TokenRegistry {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;

    #[test]
    fn test_alternating_owners() {
        let registry = TokenRegistry::new(8);
        assert_eq!(registry.len(), 8);
        for (i, token) in registry.iter().enumerate() {
            assert_eq!(token.owner, Player::from_index(i));
            assert!(!token.is_placed());
        }
    }

    #[test]
    fn test_resize_keeps_prefix() {
        let mut registry = TokenRegistry::new(4);
        registry.set(1, Token::new(Position::new(50, 60), Player::First, Some(12.0)));

        registry.resize(6);
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.get(1).unwrap().position, Some(Position::new(50, 60)));
        assert_eq!(registry.get(4).unwrap().owner, Player::First);
        assert_eq!(registry.get(5).unwrap().owner, Player::Second);

        registry.resize(4);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get(1).unwrap().distance_to_target, Some(12.0));
    }

    #[test]
    fn test_set_out_of_range() {
        let mut registry = TokenRegistry::new(4);
        assert!(!registry.set(4, Token::empty(Player::First)));
        assert_eq!(registry.placed_count(), 0);
    }
}
