//! Shared helpers for the lock-test suite.
//!
//! Lock tests pin externally observable behavior: liveness guarantees,
//! gravel semantics, determinism, selection, and multi-turn race scenarios.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use slipstream_kernel::{offsets_3x3, GridVector, WorldPoint};
use slipstream_search::contract::{MoveProviderV1, TerrainModelV1};
use slipstream_search::search::{PathSearch, Progress, SearchOutcome};

/// A terrain oracle with uniform quality everywhere. The nearest good
/// terrain is always one world unit ahead in +x.
pub struct UniformOracle {
    pub quality: f64,
}

impl TerrainModelV1 for UniformOracle {
    fn quality_at(&self, _p: WorldPoint) -> f64 {
        self.quality
    }
    fn center_affinity_at(&self, _p: WorldPoint) -> f64 {
        0.5
    }
    fn exit_risk(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
        0.1
    }
    fn lookahead_exit_risk(&self, _p: WorldPoint, _heading: GridVector, _steps: u32) -> f64 {
        0.1
    }
    fn nearest_good_terrain(&self, p: WorldPoint) -> WorldPoint {
        WorldPoint::new(p.x + 1.0, p.y)
    }
    fn turn_difficulty(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
        0.0
    }
}

/// A provider that returns a fixed move list regardless of state.
pub struct ScriptedProvider {
    moves: Vec<GridVector>,
    shown: bool,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new(moves: Vec<GridVector>) -> Self {
        Self { moves, shown: false }
    }

    /// The full 3×3 neighborhood of the dead-reckoned base.
    #[must_use]
    pub fn neighborhood(position: GridVector, velocity: GridVector) -> Self {
        let base = position + velocity;
        Self::new(offsets_3x3().into_iter().map(|o| base + o).collect())
    }
}

impl MoveProviderV1 for ScriptedProvider {
    fn show_possible_moves(&mut self, _pos: GridVector, _vel: GridVector, _max_step: i32) {
        self.shown = true;
    }
    fn valid_move_positions(&self) -> Vec<GridVector> {
        assert!(self.shown, "positions queried before show_possible_moves");
        self.moves.clone()
    }
    fn clear_indicators(&mut self) {
        self.shown = false;
    }
}

/// Drain a search's frontier and finish it, panicking on any engine error.
///
/// # Panics
///
/// If the engine rejects the finish (test setup bug).
#[must_use]
pub fn run_to_outcome(mut search: PathSearch<'_>) -> SearchOutcome {
    let mut guard = 0;
    while search.run_chunk() == Progress::Continue {
        guard += 1;
        assert!(guard < 1_000_000, "search failed to terminate");
    }
    search.finish().expect("drained search must finish")
}
