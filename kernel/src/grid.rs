//! Fixed-point grid vectors and world-space points.
//!
//! The movement rules are integral: positions and velocities live on a grid
//! of [`GRID_SCALE`] units per world unit, and every legal acceleration is
//! one of the nine offsets in `{-1, 0, 1}²`. World-space is derived, never
//! authoritative.

use std::ops::{Add, Neg, Sub};

/// Grid units per world unit. World position = grid position / `GRID_SCALE`.
pub const GRID_SCALE: f64 = 4.0;

/// An immutable integer 2D vector in grid units.
///
/// Used for both positions and velocities. Arithmetic never saturates —
/// track coordinates are far below `i32` range by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridVector {
    pub x: i32,
    pub y: i32,
}

impl GridVector {
    /// Construct from grid components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// True if both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Dot product, widened to avoid overflow on large velocities.
    #[must_use]
    pub const fn dot(&self, other: Self) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    /// Chebyshev length: the number of turns this vector takes to traverse
    /// at one grid step per turn.
    #[must_use]
    pub const fn chebyshev_len(&self) -> i32 {
        let ax = self.x.abs();
        let ay = self.y.abs();
        if ax > ay {
            ax
        } else {
            ay
        }
    }

    /// Euclidean length in grid units.
    #[must_use]
    pub fn len(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let sq = self.dot(*self) as f64;
        sq.sqrt()
    }

    /// Cosine similarity of headings in `[-1, 1]`.
    ///
    /// Returns `0.0` when either vector is zero (no heading exists).
    #[must_use]
    pub fn alignment(&self, other: Self) -> f64 {
        if self.is_zero() || other.is_zero() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let d = self.dot(other) as f64;
        d / (self.len() * other.len())
    }

    /// Clamp each component to `{-1, 0, 1}`, preserving heading.
    ///
    /// This is the degraded-terrain speed clamp: on gravel the movement rules
    /// cap achievable speed at exactly one grid unit in the current heading.
    #[must_use]
    pub const fn unit_step(&self) -> Self {
        Self {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }

    /// The 90°-rotated vector `(-y, x)`.
    ///
    /// Used by the last-resort fallback to force a maximal direction change.
    #[must_use]
    pub const fn perpendicular(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Convert to world space.
    #[must_use]
    pub fn to_world(self) -> WorldPoint {
        WorldPoint {
            x: f64::from(self.x) / GRID_SCALE,
            y: f64::from(self.y) / GRID_SCALE,
        }
    }
}

impl Add for GridVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for GridVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A point in world space (grid coordinates divided by [`GRID_SCALE`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    /// Construct from world components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }

    /// Linear interpolation toward `other` at parameter `t` in `[0, 1]`.
    ///
    /// Used to sample terrain quality along the straight line to the finish.
    #[must_use]
    pub fn lerp(&self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Snap to the nearest grid position.
    #[must_use]
    pub fn to_grid(self) -> GridVector {
        #[allow(clippy::cast_possible_truncation)]
        GridVector::new(
            (self.x * GRID_SCALE).round() as i32,
            (self.y * GRID_SCALE).round() as i32,
        )
    }
}

/// The nine relative accelerations of the move neighborhood, in fixed
/// row-major order from `(-1, -1)` to `(1, 1)`.
///
/// Enumeration order is deterministic; nothing downstream may depend on it
/// beyond determinism (sibling order is unspecified by contract).
#[must_use]
pub fn offsets_3x3() -> [GridVector; 9] {
    [
        GridVector::new(-1, -1),
        GridVector::new(0, -1),
        GridVector::new(1, -1),
        GridVector::new(-1, 0),
        GridVector::new(0, 0),
        GridVector::new(1, 0),
        GridVector::new(-1, 1),
        GridVector::new(0, 1),
        GridVector::new(1, 1),
    ]
}
