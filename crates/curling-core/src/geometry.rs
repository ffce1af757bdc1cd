//! Pixel geometry shared by the detector and the turn engine.

use serde::{Deserialize, Serialize};

/// Fraction of the token radius under which two tokens are considered to
/// occupy the same spot on the table.
pub const COLLISION_FACTOR: f64 = 0.8;

/// Integer pixel coordinate of a detected object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build a position from raw detector coordinates.
    ///
    /// The capture pipeline reports "nothing here" with `x == 0`, so such a
    /// coordinate is mapped to `None` instead of a real position.
    pub fn from_raw(x: i32, y: i32) -> Option<Self> {
        if x == 0 { None } else { Some(Self { x, y }) }
    }

    /// Euclidean distance to `other` in pixels.
    pub fn distance_to(&self, other: &Position) -> f64 {
        distance(*self, *other)
    }

    /// True when both coordinates are strictly within `tolerance` pixels.
    pub fn within_box(&self, other: &Position, tolerance: i32) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

/// Euclidean distance between two positions.
pub fn distance(a: Position, b: Position) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Distance between two optional positions, `None` when either is unknown.
pub fn distance_between(a: Option<Position>, b: Option<Position>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(distance(a, b)),
        _ => None,
    }
}

/// Distance under which a newer token displaces an older one.
pub fn collision_threshold(token_radius: f64) -> f64 {
    COLLISION_FACTOR * token_radius
}

/// A circle candidate returned by the circle transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    /// Centre truncated to integer pixels.
    pub fn center(&self) -> Position {
        Position::new(self.x as i32, self.y as i32)
    }
}

/// Arithmetic mean of every candidate, centre and radius.
///
/// Every candidate weighs the same; there is no outlier rejection. Returns
/// `None` for an empty slice.
pub fn mean_circle(circles: &[Circle]) -> Option<Circle> {
    if circles.is_empty() {
        return None;
    }

    let n = circles.len() as f64;
    let (sum_x, sum_y, sum_r) = circles
        .iter()
        .fold((0.0, 0.0, 0.0), |(x, y, r), c| (x + c.x, y + c.y, r + c.radius));

    Some(Circle::new(sum_x / n, sum_y / n, sum_r / n))
}
