//! Collaborator contract traits.
//!
//! The engine needs only pure data and pure query functions. Both
//! collaborators are injected explicitly at search start — there is no
//! ambient lookup and no engine lifecycle coupling.

use slipstream_kernel::{GridVector, WorldPoint};

/// Terrain quality below this value is degraded ("gravel").
pub const GRAVEL_THRESHOLD: f64 = 0.5;

/// Pure query surface over the track's terrain model.
///
/// # Contract
///
/// - Every query is side-effect free and deterministic: same arguments →
///   same answer for the lifetime of one search. The engine may cache
///   results per search (e.g. the current-position quality) and never
///   mutates oracle state.
/// - All scalar results are in `[0, 1]`.
pub trait TerrainModelV1 {
    /// Terrain quality at a world point. `< GRAVEL_THRESHOLD` is degraded.
    fn quality_at(&self, p: WorldPoint) -> f64;

    /// Affinity to the track center line at a world point (1 = centered).
    fn center_affinity_at(&self, p: WorldPoint) -> f64;

    /// Risk of leaving the track when continuing from `p` along `heading`.
    fn exit_risk(&self, p: WorldPoint, heading: GridVector) -> f64;

    /// Exit risk accumulated over `steps` dead-reckoned steps ahead.
    fn lookahead_exit_risk(&self, p: WorldPoint, heading: GridVector, steps: u32) -> f64;

    /// The nearest point with good (non-degraded) terrain.
    fn nearest_good_terrain(&self, p: WorldPoint) -> WorldPoint;

    /// How sharp the upcoming track section is at `p` along `heading`
    /// (0 = straight, 1 = hairpin).
    fn turn_difficulty(&self, p: WorldPoint, heading: GridVector) -> f64;
}

/// The legal-move collaborator.
///
/// # Contract
///
/// - `show_possible_moves` seeds the legal target set; `valid_move_positions`
///   returns it. The engine queries this exactly once per search to seed
///   first-level candidates — at greater depths the 3×3 neighborhood
///   generator is self-contained.
/// - Enumeration must be deterministic for a given `(pos, vel)`.
pub trait MoveProviderV1 {
    /// Compute and expose the legal move targets for the given state.
    fn show_possible_moves(&mut self, pos: GridVector, vel: GridVector, max_step: i32);

    /// The current legal target set (grid positions).
    fn valid_move_positions(&self) -> Vec<GridVector>;

    /// Invalidate the current legal target set.
    fn clear_indicators(&mut self);
}

/// Where the racer is headed this turn.
#[derive(Debug, Clone, Copy)]
pub struct RaceTargets {
    /// The active target: next checkpoint, or the finish line once all
    /// checkpoints are cleared.
    pub target: WorldPoint,
    /// The checkpoint after the active one, for look-ahead positioning.
    /// `None` when the active target is the last checkpoint or the finish.
    pub next_checkpoint: Option<WorldPoint>,
    /// True once all checkpoints are cleared and the finish is the target.
    pub targeting_finish: bool,
}

impl RaceTargets {
    /// A checkpoint target with no successor.
    #[must_use]
    pub const fn checkpoint(target: WorldPoint) -> Self {
        Self {
            target,
            next_checkpoint: None,
            targeting_finish: false,
        }
    }

    /// A finish-line target.
    #[must_use]
    pub const fn finish(target: WorldPoint) -> Self {
        Self {
            target,
            next_checkpoint: None,
            targeting_finish: true,
        }
    }
}
