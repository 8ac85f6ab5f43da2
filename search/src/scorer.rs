//! Move evaluation: per-node factor scoring and path-level aggregation.
//!
//! Scoring is a pure function of `(candidate, parent, depth)` plus the
//! immutable config snapshot and the per-search terrain cache — re-running
//! the evaluator on identical inputs yields an identical score.
//!
//! The specific bonus constants below are tunable policy carried over from
//! the original tuning, not derived quantities.

use slipstream_kernel::{GridVector, WorldPoint, GRID_SCALE};

use crate::contract::{RaceTargets, TerrainModelV1};
use crate::node::{NodeFactors, Path, PathNode, PathQuality};
use crate::policy::SearchConfigV1;

/// Per-depth decay applied last: slightly prefer earlier good moves.
const DEPTH_DECAY_PER_PLY: f64 = 0.05;

/// Fixed recovery-context bonus for a candidate landing on good terrain.
const RECOVERY_GOOD_TERRAIN_BONUS: f64 = 0.3;

/// Recovery context: return-to-good weight multiplier.
const RECOVERY_RETURN_MULT: f64 = 3.0;
/// Recovery context: terrain weight multiplier.
const RECOVERY_TERRAIN_MULT: f64 = 2.0;
/// Recovery context: suppression of distance/direction/speed importance.
const RECOVERY_SUPPRESS_MULT: f64 = 0.4;

/// Finish/checkpoint contexts: distance and direction emphasis.
const TARGETED_EMPHASIS_MULT: f64 = 1.5;
/// Finish context: track-center de-emphasis (approach the line directly).
const FINISH_CENTER_MULT: f64 = 0.3;

/// Path bonus: first good-terrain node while recovering (scaled by how
/// early it appears).
const PATH_FIRST_GOOD_BONUS: f64 = 0.2;
/// Path bonus: mean return-to-good factor above threshold.
const PATH_RETURN_BONUS: f64 = 0.1;
/// Path bonus: terminal direct-finish factor above threshold.
const PATH_FINISH_BONUS: f64 = 0.15;
/// Path bonus: mean distance and direction both strong (default context).
const PATH_BALANCED_BONUS: f64 = 0.1;
/// Path bonus: strong terminal distance factor (default context).
const PATH_TERMINAL_DISTANCE_BONUS: f64 = 0.05;

pub const STRONG_FACTOR: f64 = 0.7;
const STRONG_TERMINAL_DISTANCE: f64 = 0.8;

/// Dead-end classification thresholds.
const DEAD_END_EXIT_RISK: f64 = 0.8;

/// Quality classification thresholds.
const QUALITY_GOOD: f64 = 0.8;
const QUALITY_MEDIUM: f64 = 0.5;

/// Gravel speed scoring: the movement rules cap speed at one grid unit on
/// degraded terrain, so these are reproduced exactly.
const GRAVEL_SPEED_AT_CAP: f64 = 0.95;
const GRAVEL_SPEED_UNDER_CAP: f64 = 0.3;
const GRAVEL_SPEED_OVER_CAP: f64 = 0.05;

/// Heading similarity threshold for direction-change counting.
pub const HEADING_SIMILARITY: f64 = 0.8;

/// Which weighting regime applies, selected in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreContext {
    /// Currently on degraded terrain: emergency recovery weighting.
    Recovery,
    /// All checkpoints cleared: direct finish approach.
    FinishLine,
    /// Default checkpoint targeting.
    Checkpoint,
}

impl ScoreContext {
    /// Resolve the context from the current turn state.
    #[must_use]
    pub fn resolve(on_gravel: bool, targeting_finish: bool) -> Self {
        if on_gravel {
            Self::Recovery
        } else if targeting_finish {
            Self::FinishLine
        } else {
            Self::Checkpoint
        }
    }

    /// Stable string for report serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recovery => "recovery",
            Self::FinishLine => "finish_line",
            Self::Checkpoint => "checkpoint",
        }
    }
}

/// Per-search move evaluator.
///
/// Holds the config snapshot, the terrain oracle, and the per-search caches
/// (context, nearest good terrain). All scoring methods are `&self`.
pub struct MoveEvaluator<'a> {
    config: SearchConfigV1,
    oracle: &'a dyn TerrainModelV1,
    targets: RaceTargets,
    origin_world: WorldPoint,
    context: ScoreContext,
    /// Cached once per search; only meaningful in recovery context.
    nearest_good: WorldPoint,
}

impl<'a> MoveEvaluator<'a> {
    /// Build an evaluator for one search.
    ///
    /// `on_gravel` is the cached current-position terrain state; the oracle
    /// is queried once here for the nearest good terrain.
    pub fn new(
        config: SearchConfigV1,
        oracle: &'a dyn TerrainModelV1,
        targets: RaceTargets,
        origin_world: WorldPoint,
        on_gravel: bool,
    ) -> Self {
        let context = ScoreContext::resolve(on_gravel, targets.targeting_finish);
        let nearest_good = if context == ScoreContext::Recovery {
            oracle.nearest_good_terrain(origin_world)
        } else {
            origin_world
        };
        Self {
            config,
            oracle,
            targets,
            origin_world,
            context,
            nearest_good,
        }
    }

    /// The resolved scoring context for this search.
    #[must_use]
    pub fn context(&self) -> ScoreContext {
        self.context
    }

    /// Score one candidate move, producing its [`PathNode`].
    ///
    /// `parent` is `None` for first-level candidates, in which case the
    /// previous point is the search origin and the off-track chain starts
    /// at zero.
    #[must_use]
    pub fn score_node(
        &self,
        parent: Option<&PathNode>,
        position: GridVector,
        velocity: GridVector,
        depth: u32,
    ) -> PathNode {
        let world = position.to_world();
        let prev_world = parent.map_or(self.origin_world, |p| p.position.to_world());

        let terrain_quality = self.oracle.quality_at(world);
        // The physical speed cap binds moves made on or onto degraded
        // terrain. A recovered branch back on asphalt scores speed against
        // the race targets again, even mid-recovery-search.
        let from_degraded = parent.map_or(self.context == ScoreContext::Recovery, |p| {
            p.terrain_quality < self.config.terrain_threshold
        });
        let gravel_move = from_degraded || terrain_quality < self.config.terrain_threshold;

        let mut factors = NodeFactors {
            distance: improvement_factor(prev_world, world, self.targets.target, velocity),
            speed: self.speed_factor(world, velocity, gravel_move),
            terrain: terrain_quality,
            direction: direction_factor(position, velocity, self.targets.target),
            track_center: self.oracle.center_affinity_at(world),
            exit_risk: 1.0 - self.oracle.exit_risk(world, velocity),
            lookahead: self.lookahead_factor(position, velocity),
            return_to_good: 0.0,
            finish_approach: 0.0,
        };

        match self.context {
            ScoreContext::Recovery => {
                factors.return_to_good =
                    self.return_factor(prev_world, world, velocity, terrain_quality);
            }
            ScoreContext::FinishLine => {
                factors.finish_approach = self.finish_approach_factor(position, velocity, world);
            }
            ScoreContext::Checkpoint => {}
        }

        let mut score = self.weighted_score(&factors);
        if self.context == ScoreContext::Recovery
            && terrain_quality >= self.config.terrain_threshold
        {
            score = (score + RECOVERY_GOOD_TERRAIN_BONUS).min(1.0);
        }
        score *= (1.0 - DEPTH_DECAY_PER_PLY * f64::from(depth)).max(0.0);

        let off_track_count = if terrain_quality >= self.config.terrain_threshold {
            0
        } else {
            parent.map_or(0, |p| p.off_track_count) + 1
        };

        PathNode {
            position,
            velocity,
            score,
            factors,
            terrain_quality,
            off_track_count,
            exit_risk: self.oracle.exit_risk(world, velocity),
        }
    }

    /// Aggregate a complete node sequence into an evaluated [`Path`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate_path(&self, nodes: Vec<PathNode>) -> Path {
        let mut path = Path::unevaluated(nodes);
        if path.nodes.is_empty() {
            return path;
        }
        let len = path.nodes.len() as f64;

        let mut min_score = f64::MAX;
        let mut max_exit_risk: f64 = 0.0;
        for node in &path.nodes {
            path.total_score += node.score;
            path.avg_terrain += node.terrain_quality;
            path.avg_speed_factor += node.factors.speed;
            if node.is_off_track() {
                path.off_track_nodes += 1;
            } else {
                path.good_terrain_nodes += 1;
            }
            min_score = min_score.min(node.score);
            max_exit_risk = max_exit_risk.max(node.exit_risk);
        }
        path.avg_score = path.total_score / len;
        path.avg_terrain /= len;
        path.avg_speed_factor /= len;
        path.min_node_score = min_score;
        path.max_exit_risk = max_exit_risk;

        let mut changes = 0u32;
        for pair in path.nodes.windows(2) {
            let (a, b) = (pair[0].velocity, pair[1].velocity);
            if !a.is_zero() && !b.is_zero() && a.alignment(b) < HEADING_SIMILARITY {
                changes += 1;
            }
        }
        path.direction_changes = changes;

        path.avg_score += self.path_bonus(&path);

        path.dead_end = path.max_exit_risk > DEAD_END_EXIT_RISK
            || path.off_track_nodes * 2 > path.nodes.len() as u32;
        path.quality = if path.avg_score >= QUALITY_GOOD {
            PathQuality::Good
        } else if path.avg_score >= QUALITY_MEDIUM {
            PathQuality::Medium
        } else {
            PathQuality::Bad
        };
        path
    }

    /// Contextual bonuses added on top of the averaged score.
    #[allow(clippy::cast_precision_loss)]
    fn path_bonus(&self, path: &Path) -> f64 {
        let len = path.nodes.len() as f64;
        let mut bonus = 0.0;
        match self.context {
            ScoreContext::Recovery => {
                if let Some(i) = path.nodes.iter().position(|n| !n.is_off_track()) {
                    // Earlier recovery is worth more.
                    bonus += PATH_FIRST_GOOD_BONUS * (len - i as f64) / len;
                }
                let mean_return = path
                    .nodes
                    .iter()
                    .map(|n| n.factors.return_to_good)
                    .sum::<f64>()
                    / len;
                if mean_return > STRONG_FACTOR {
                    bonus += PATH_RETURN_BONUS;
                }
            }
            ScoreContext::FinishLine => {
                if let Some(last) = path.last() {
                    if last.factors.finish_approach > STRONG_FACTOR {
                        bonus += PATH_FINISH_BONUS;
                    }
                }
            }
            ScoreContext::Checkpoint => {
                let mean_distance =
                    path.nodes.iter().map(|n| n.factors.distance).sum::<f64>() / len;
                let mean_direction =
                    path.nodes.iter().map(|n| n.factors.direction).sum::<f64>() / len;
                if mean_distance > STRONG_FACTOR && mean_direction > STRONG_FACTOR {
                    bonus += PATH_BALANCED_BONUS;
                }
                if path
                    .last()
                    .is_some_and(|last| last.factors.distance > STRONG_TERMINAL_DISTANCE)
                {
                    bonus += PATH_TERMINAL_DISTANCE_BONUS;
                }
            }
        }
        bonus
    }

    /// Context-dependent weighted sum over a context-dependent denominator.
    fn weighted_score(&self, f: &NodeFactors) -> f64 {
        let w = &self.config.weights;
        let terms: [(f64, f64); 7] = match self.context {
            ScoreContext::Recovery => [
                (f.distance, w.distance * RECOVERY_SUPPRESS_MULT),
                (f.speed, w.speed * RECOVERY_SUPPRESS_MULT),
                (f.terrain, w.terrain * RECOVERY_TERRAIN_MULT),
                (f.direction, w.direction * RECOVERY_SUPPRESS_MULT),
                (f.track_center, w.track_center * RECOVERY_SUPPRESS_MULT),
                (f.exit_risk, w.exit_risk_penalty),
                (f.return_to_good, w.return_to_good * RECOVERY_RETURN_MULT),
            ],
            ScoreContext::FinishLine => [
                (f.distance, w.distance * TARGETED_EMPHASIS_MULT),
                (f.speed, w.speed),
                (f.terrain, w.terrain),
                (f.direction, w.direction * TARGETED_EMPHASIS_MULT),
                (f.track_center, w.track_center * FINISH_CENTER_MULT),
                (f.exit_risk, w.exit_risk_penalty),
                (f.finish_approach, w.finish_line),
            ],
            ScoreContext::Checkpoint => [
                (f.distance, w.distance * TARGETED_EMPHASIS_MULT),
                (f.speed, w.speed),
                (f.terrain, w.terrain),
                (f.direction, w.direction * TARGETED_EMPHASIS_MULT),
                (f.track_center, w.track_center),
                (f.exit_risk, w.exit_risk_penalty),
                (f.lookahead, w.lookahead),
            ],
        };
        let denom: f64 = terms.iter().map(|(_, weight)| weight).sum();
        if denom <= 0.0 {
            return 0.0;
        }
        let sum: f64 = terms.iter().map(|(value, weight)| value * weight).sum();
        (sum / denom).clamp(0.0, 1.0)
    }

    /// Speed-target matching with the hard gravel cap.
    fn speed_factor(&self, world: WorldPoint, velocity: GridVector, on_gravel: bool) -> f64 {
        if on_gravel {
            // Physical cap: one grid unit of speed on degraded terrain.
            return match velocity.chebyshev_len() {
                0 => GRAVEL_SPEED_UNDER_CAP,
                1 => GRAVEL_SPEED_AT_CAP,
                _ => GRAVEL_SPEED_OVER_CAP,
            };
        }
        let difficulty = self.oracle.turn_difficulty(world, velocity);
        let targets = self.config.speed_targets;
        let ideal = targets.straight_max + (targets.turn_max - targets.straight_max) * difficulty;
        let speed = velocity.len();
        (1.0 - (speed - ideal).abs() / targets.straight_max.max(1.0)).clamp(0.0, 1.0)
    }

    /// Look-ahead positioning toward the checkpoint after the current target.
    fn lookahead_factor(&self, position: GridVector, velocity: GridVector) -> f64 {
        match self.targets.next_checkpoint {
            // Neutral when no successor checkpoint exists.
            None => 0.5,
            Some(next) => direction_factor(position, velocity, next),
        }
    }

    /// Progress toward the nearest good terrain (recovery context only).
    fn return_factor(
        &self,
        prev_world: WorldPoint,
        world: WorldPoint,
        velocity: GridVector,
        terrain_quality: f64,
    ) -> f64 {
        if terrain_quality >= self.config.terrain_threshold {
            return 1.0;
        }
        improvement_factor(prev_world, world, self.nearest_good, velocity)
    }

    /// Direct-approach quality toward the finish: alignment, distance
    /// improvement, and sampled terrain along the straight line.
    fn finish_approach_factor(
        &self,
        position: GridVector,
        velocity: GridVector,
        world: WorldPoint,
    ) -> f64 {
        let alignment = direction_factor(position, velocity, self.targets.target);
        let improvement =
            improvement_factor(self.origin_world, world, self.targets.target, velocity);
        let line_terrain = (self.oracle.quality_at(world.lerp(self.targets.target, 0.25))
            + self.oracle.quality_at(world.lerp(self.targets.target, 0.5))
            + self.oracle.quality_at(world.lerp(self.targets.target, 0.75)))
            / 3.0;
        0.4 * alignment + 0.3 * improvement + 0.3 * line_terrain
    }
}

/// Distance-improvement factor: 0.5 is neutral, 1.0 is a full velocity-step
/// of improvement, 0.0 a full step of regression.
fn improvement_factor(
    prev: WorldPoint,
    now: WorldPoint,
    target: WorldPoint,
    velocity: GridVector,
) -> f64 {
    let delta = prev.distance(target) - now.distance(target);
    let step = (velocity.len() / GRID_SCALE).max(1.0 / GRID_SCALE);
    (0.5 + 0.5 * (delta / step)).clamp(0.0, 1.0)
}

/// Heading alignment with the target, mapped from `[-1, 1]` to `[0, 1]`.
///
/// A stationary candidate has no heading and scores neutral-low.
fn direction_factor(position: GridVector, velocity: GridVector, target: WorldPoint) -> f64 {
    let to_target = target.to_grid() - position;
    if velocity.is_zero() || to_target.is_zero() {
        return 0.5;
    }
    (velocity.alignment(to_target) + 1.0) / 2.0
}
