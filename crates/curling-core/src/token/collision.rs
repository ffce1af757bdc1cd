use log::debug;

use super::Token;
use crate::geometry::collision_threshold;

/// Invalidate earlier tokens displaced by the token at `turn`.
///
/// Only slots `0..turn` are examined. A slot closer than the collision
/// threshold loses its position; the new token itself is never touched.
/// Returns the indices that were invalidated.
pub fn resolve_collisions(tokens: &mut [Token], turn: usize, token_radius: f64) -> Vec<usize> {
    let Some(newest) = tokens.get(turn).cloned() else {
        return Vec::new();
    };
    if !newest.is_placed() {
        return Vec::new();
    }

    let threshold = collision_threshold(token_radius);
    let mut invalidated = Vec::new();

    for (i, token) in tokens[..turn].iter_mut().enumerate() {
        if let Some(distance) = newest.distance_to_token(token) {
            if distance < threshold {
                debug!(
                    "Token {} displaced by token {} ({:.1}px < {:.1}px)",
                    i, turn, distance, threshold
                );
                token.invalidate();
                invalidated.push(i);
            }
        }
    }

    invalidated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::token::{Player, TokenRegistry};

    fn placed(x: i32, y: i32, index: usize) -> Token {
        Token::new(Position::new(x, y), Player::from_index(index), None)
    }

    #[test]
    fn test_only_earlier_close_tokens_invalidated() {
        let mut registry = TokenRegistry::new(6);
        registry.set(0, placed(100, 100, 0));
        registry.set(1, placed(300, 300, 1));
        registry.set(2, placed(110, 100, 2));
        registry.set(3, placed(112, 100, 3));

        let hit = resolve_collisions(registry.as_mut_slice(), 2, 34.0);
        assert_eq!(hit, vec![0]);
        assert_eq!(registry.get(0).unwrap().position, None);
        assert!(registry.get(1).unwrap().is_placed());
        assert!(registry.get(2).unwrap().is_placed());
        // later slot untouched even though it overlaps
        assert!(registry.get(3).unwrap().is_placed());
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut tokens = vec![placed(100, 100, 0), placed(120, 100, 1)];
        // 0.8 * 25 = 20, distance is exactly 20
        assert!(resolve_collisions(&mut tokens, 1, 25.0).is_empty());
        assert!(tokens[0].is_placed());
    }

    #[test]
    fn test_absent_new_token_invalidates_nothing() {
        let mut tokens = vec![placed(100, 100, 0), Token::empty(Player::Second)];
        assert!(resolve_collisions(&mut tokens, 1, 34.0).is_empty());
        assert!(tokens[0].is_placed());
    }

    #[test]
    fn test_out_of_range_turn() {
        let mut tokens = vec![placed(100, 100, 0)];
        assert!(resolve_collisions(&mut tokens, 3, 34.0).is_empty());
    }
}
