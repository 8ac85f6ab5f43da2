//! Race worlds for the harness runner.
//!
//! A world is a terrain oracle plus track geometry; the shared
//! [`TrackMoveProvider`] derives the legal move set from the world's
//! drivable bounds.

pub mod gravel_trap;
pub mod oval_circuit;

use slipstream_kernel::{offsets_3x3, GridVector};
use slipstream_search::contract::MoveProviderV1;

/// Legal-move enumeration over a rectangular drivable area.
///
/// Legal moves are the 3×3 neighborhood of the dead-reckoned base position,
/// clipped to the bounds. Enumeration order follows the fixed offset order,
/// so it is deterministic for a given `(pos, vel)`.
pub struct TrackMoveProvider {
    min: GridVector,
    max: GridVector,
    shown: Vec<GridVector>,
}

impl TrackMoveProvider {
    /// A provider over the inclusive grid rectangle `[min, max]`.
    #[must_use]
    pub fn new(min: GridVector, max: GridVector) -> Self {
        Self { min, max, shown: Vec::new() }
    }

    fn in_bounds(&self, p: GridVector) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

impl MoveProviderV1 for TrackMoveProvider {
    fn show_possible_moves(&mut self, pos: GridVector, vel: GridVector, max_step: i32) {
        let base = pos + vel;
        self.shown = offsets_3x3()
            .into_iter()
            .filter(|o| o.chebyshev_len() <= max_step)
            .map(|o| base + o)
            .filter(|&p| self.in_bounds(p))
            .collect();
    }

    fn valid_move_positions(&self) -> Vec<GridVector> {
        self.shown.clone()
    }

    fn clear_indicators(&mut self) {
        self.shown.clear();
    }
}
