//! Circle candidates returned by the Hough transform.

use curling_core::geometry::{mean_circle, Circle, Position};
use opencv::core::{Vec3f, Vector};
use serde::Serialize;

/// Every circle the transform reported for one frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CircleSet {
    circles: Vec<Circle>,
}

impl CircleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(circles: Vec<Circle>) -> Self {
        Self { circles }
    }

    /// Convert the raw `(x, y, radius)` output of `hough_circles`.
    pub fn from_hough(raw: &Vector<Vec3f>) -> Self {
        raw.iter()
            .map(|c| Circle::new(c[0] as f64, c[1] as f64, c[2] as f64))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn as_slice(&self) -> &[Circle] {
        &self.circles
    }

    /// Mean of all candidates, no outlier rejection.
    pub fn mean(&self) -> Option<Circle> {
        mean_circle(&self.circles)
    }

    /// Mean centre as a board position.
    ///
    /// A mean landing on `x == 0` reads as "no detection".
    pub fn mean_position(&self) -> Option<Position> {
        self.mean()
            .and_then(|c| Position::from_raw(c.x as i32, c.y as i32))
    }

    /// Smallest and largest fitted radius.
    pub fn radius_range(&self) -> Option<(f64, f64)> {
        self.circles.iter().fold(None, |acc, c| match acc {
            None => Some((c.radius, c.radius)),
            Some((lo, hi)) => Some((lo.min(c.radius), hi.max(c.radius))),
        })
    }
}

impl FromIterator<Circle> for CircleSet {
    fn from_iter<T: IntoIterator<Item = Circle>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl IntoIterator for CircleSet {
    type Item = Circle;
    type IntoIter = std::vec::IntoIter<Circle>;

    fn into_iter(self) -> Self::IntoIter {
        self.circles.into_iter()
    }
}
