//! Debounce of per-tick token reports.

use log::debug;

use crate::config::StabilityConfig;
use crate::geometry::Position;

/// Result of feeding one report to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Nothing reported this tick
    Missing,
    /// Report accepted, `count` stable ticks so far
    Settling { position: Position, count: u32 },
    /// Held still long enough, ready to commit
    Stable(Position),
}

/// Counts consecutive ticks a token stays inside a small box.
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    config: StabilityConfig,
    anchor: Option<Position>,
    count: u32,
}

impl StabilityWindow {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            config,
            anchor: None,
            count: 0,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn set_config(&mut self, config: StabilityConfig) {
        self.config = config;
    }

    pub fn reset(&mut self) {
        self.anchor = None;
        self.count = 0;
    }

    /// Feed the report of one tick.
    ///
    /// A report within the tolerance box of the previous one increments the
    /// counter; anything else resets it and re-anchors on the new report.
    pub fn observe(&mut self, report: Option<Position>) -> Stability {
        let Some(position) = report else {
            self.reset();
            return Stability::Missing;
        };

        let steady = self
            .anchor
            .is_some_and(|last| last.within_box(&position, self.config.tolerance));

        if steady {
            self.count += 1;
        } else {
            if self.count > 0 {
                debug!("Token moved, stability counter reset");
            }
            self.count = 0;
        }
        self.anchor = Some(position);

        if self.count >= self.config.required_ticks {
            Stability::Stable(position)
        } else {
            Stability::Settling {
                position,
                count: self.count,
            }
        }
    }
}

impl Default for StabilityWindow {
    fn default() -> Self {
        Self::new(StabilityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(required_ticks: u32) -> StabilityWindow {
        StabilityWindow::new(StabilityConfig {
            required_ticks,
            tolerance: 4,
        })
    }

    #[test]
    fn test_stable_after_required_ticks() {
        let mut window = window(3);
        let p = Position::new(200, 200);

        assert_eq!(window.observe(Some(p)), Stability::Settling { position: p, count: 0 });
        assert_eq!(window.observe(Some(p)), Stability::Settling { position: p, count: 1 });
        assert_eq!(window.observe(Some(p)), Stability::Settling { position: p, count: 2 });
        assert_eq!(window.observe(Some(p)), Stability::Stable(p));
    }

    #[test]
    fn test_jitter_inside_box_counts() {
        let mut window = window(2);
        window.observe(Some(Position::new(200, 200)));
        window.observe(Some(Position::new(203, 197)));
        let last = Position::new(205, 199);
        assert_eq!(window.observe(Some(last)), Stability::Stable(last));
    }

    #[test]
    fn test_jump_resets() {
        let mut window = window(5);
        for _ in 0..4 {
            window.observe(Some(Position::new(200, 200)));
        }
        assert_eq!(window.count(), 3);
        window.observe(Some(Position::new(204, 200)));
        assert_eq!(window.count(), 0);
    }

    #[test]
    fn test_miss_resets() {
        let mut window = window(5);
        window.observe(Some(Position::new(200, 200)));
        window.observe(Some(Position::new(200, 200)));
        assert_eq!(window.observe(None), Stability::Missing);
        assert_eq!(window.count(), 0);
    }
}
