//! Turning a selected path into one legal, displacing move.
//!
//! The executor trusts the planner as far as it can verify it: the selected
//! path's first move is taken only if it is legal and displacing, otherwise
//! a later node of the same path is tried, and only then does the emergency
//! generator run. Every tier of the generator terminates with a move, so
//! the caller always gets exactly one.

use slipstream_kernel::{offsets_3x3, GridVector, WorldPoint};

use crate::contract::{MoveProviderV1, RaceTargets, TerrainModelV1};
use crate::node::Path;

/// Emergency heuristic weights (single-pass, no tree).
const EMERGENCY_DISTANCE_WEIGHT: f64 = 0.7;
const EMERGENCY_TERRAIN_WEIGHT: f64 = 2.0;
/// Small bonus for any non-trivial displacement.
const EMERGENCY_DISPLACEMENT_BONUS: f64 = 0.25;

/// Recovery-variant weights: terrain-dominant.
const RECOVERY_TERRAIN_WEIGHT: f64 = 0.6;
const RECOVERY_HEADING_WEIGHT: f64 = 0.2;
const RECOVERY_DISTANCE_WEIGHT: f64 = 0.2;

/// How the executed move was obtained. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// The selected path's first node, taken as planned.
    PlannedPath,
    /// A later node of the selected path, after the first was rejected.
    AlternativeNode,
    /// Emergency heuristic over the provider's legal move set.
    EmergencyScored,
    /// Emergency heuristic over a synthesized neighborhood (provider
    /// reported no legal moves).
    EmergencySynthesized,
    /// Unconditional last resort: maximum forced direction change.
    ForcedDirectionChange,
}

/// The single move handed back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChosenMove {
    /// Grid position to move to.
    pub target: GridVector,
    /// Resulting grid velocity (`target - current position`).
    pub velocity: GridVector,
    pub source: MoveSource,
}

impl ChosenMove {
    fn new(target: GridVector, position: GridVector, source: MoveSource) -> Self {
        Self {
            target,
            velocity: target - position,
            source,
        }
    }

    /// True if this move leaves the current position.
    #[must_use]
    pub fn is_displacing(&self) -> bool {
        !self.velocity.is_zero()
    }
}

/// Executes one turn: validate the planned move, else fall back.
pub struct MoveExecutor<'o> {
    oracle: &'o dyn TerrainModelV1,
    targets: RaceTargets,
}

impl<'o> MoveExecutor<'o> {
    #[must_use]
    pub fn new(oracle: &'o dyn TerrainModelV1, targets: RaceTargets) -> Self {
        Self { oracle, targets }
    }

    /// Produce exactly one legal move for this turn.
    ///
    /// `path` is the selector's winner, or `None` when the whole search
    /// failed upstream. `avoid_stationary` asks every tier to exclude the
    /// current-position candidate; exclusion is abandoned rather than
    /// returning nothing when it empties a candidate set.
    ///
    /// The provider is queried once here, both for legality checks against
    /// the planned path and as the tier-1 emergency candidate set.
    pub fn execute(
        &self,
        path: Option<&Path>,
        provider: &mut dyn MoveProviderV1,
        position: GridVector,
        velocity: GridVector,
        avoid_stationary: bool,
    ) -> ChosenMove {
        let on_gravel = self.oracle.quality_at(position.to_world())
            < crate::contract::GRAVEL_THRESHOLD;
        let velocity = if on_gravel { velocity.unit_step() } else { velocity };

        provider.show_possible_moves(position, velocity, 1);
        let legal = provider.valid_move_positions();
        provider.clear_indicators();

        // Primary: the planned first move, then later nodes of the same
        // path; each must be legal and displacing.
        if let Some(path) = path {
            let mut nodes = path.nodes.iter();
            if let Some(first) = nodes.next() {
                if first.position != position && legal.contains(&first.position) {
                    return ChosenMove::new(first.position, position, MoveSource::PlannedPath);
                }
            }
            for node in nodes {
                if node.position != position && legal.contains(&node.position) {
                    return ChosenMove::new(node.position, position, MoveSource::AlternativeNode);
                }
            }
        }

        self.emergency(&legal, position, velocity, on_gravel, avoid_stationary)
    }

    /// The multi-tier emergency generator. Always returns a move.
    fn emergency(
        &self,
        legal: &[GridVector],
        position: GridVector,
        velocity: GridVector,
        on_gravel: bool,
        avoid_stationary: bool,
    ) -> ChosenMove {
        // Tier 1: score the provider's legal set.
        if let Some(target) = self.best_candidate(legal, position, on_gravel, avoid_stationary) {
            return ChosenMove::new(target, position, MoveSource::EmergencyScored);
        }

        // Tier 2: the provider yielded nothing; synthesize the
        // neighborhood around the dead-reckoned base.
        let base = position + velocity;
        let synthesized: Vec<GridVector> =
            offsets_3x3().into_iter().map(|o| base + o).collect();
        if let Some(target) =
            self.best_candidate(&synthesized, position, on_gravel, avoid_stationary)
        {
            return ChosenMove::new(target, position, MoveSource::EmergencySynthesized);
        }

        // Tier 3: unconditional forced direction change.
        let target = if velocity.is_zero() {
            // Stationary: a deterministic pick derived from the current
            // position stands in for a random kick.
            let offsets = offsets_3x3();
            #[allow(clippy::cast_sign_loss)]
            let index =
                (position.x.unsigned_abs() as usize + position.y.unsigned_abs() as usize * 3)
                    % offsets.len();
            let offset = if offsets[index].is_zero() {
                GridVector::new(1, 1)
            } else {
                offsets[index]
            };
            position + offset
        } else {
            position + velocity.unit_step().perpendicular()
        };
        ChosenMove::new(target, position, MoveSource::ForcedDirectionChange)
    }

    /// Highest-scoring candidate under the single-pass heuristic, honoring
    /// (and, if necessary, abandoning) stationary exclusion.
    fn best_candidate(
        &self,
        candidates: &[GridVector],
        position: GridVector,
        on_gravel: bool,
        avoid_stationary: bool,
    ) -> Option<GridVector> {
        if candidates.is_empty() {
            return None;
        }
        let displacing: Vec<GridVector> = candidates
            .iter()
            .copied()
            .filter(|&c| c != position)
            .collect();
        let pool: &[GridVector] = if avoid_stationary && !displacing.is_empty() {
            &displacing
        } else {
            candidates
        };

        let mut best: Option<(GridVector, f64)> = None;
        for &candidate in pool {
            let score = if on_gravel {
                self.recovery_score(candidate, position)
            } else {
                self.emergency_score(candidate, position)
            };
            let better = best.is_none_or(|(_, s)| score > s);
            if better {
                best = Some((candidate, score));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Default emergency heuristic: closeness to target, terrain quality,
    /// and a displacement bonus.
    fn emergency_score(&self, candidate: GridVector, position: GridVector) -> f64 {
        let world = candidate.to_world();
        let closeness = 1.0 / (1.0 + world.distance(self.targets.target));
        let terrain = self.oracle.quality_at(world);
        let displacement = if candidate == position {
            0.0
        } else {
            EMERGENCY_DISPLACEMENT_BONUS
        };
        EMERGENCY_DISTANCE_WEIGHT * closeness + EMERGENCY_TERRAIN_WEIGHT * terrain + displacement
    }

    /// Recovery variant: terrain dominates, with heading and distance to
    /// the nearest good terrain contributing.
    fn recovery_score(&self, candidate: GridVector, position: GridVector) -> f64 {
        let world = candidate.to_world();
        let terrain = self.oracle.quality_at(world);
        let good = self.oracle.nearest_good_terrain(position.to_world());
        let heading = heading_alignment(position, candidate, good);
        let closeness = 1.0 / (1.0 + world.distance(good));
        RECOVERY_TERRAIN_WEIGHT * terrain
            + RECOVERY_HEADING_WEIGHT * heading
            + RECOVERY_DISTANCE_WEIGHT * closeness
    }
}

/// Alignment in `[0, 1]` of the move direction with the direction toward
/// `goal`; 0.5 when the move is non-displacing.
fn heading_alignment(position: GridVector, candidate: GridVector, goal: WorldPoint) -> f64 {
    let step = candidate - position;
    if step.is_zero() {
        return 0.5;
    }
    let goal_step = goal.to_grid() - position;
    if goal_step.is_zero() {
        return 0.5;
    }
    (step.alignment(goal_step) + 1.0) / 2.0
}
