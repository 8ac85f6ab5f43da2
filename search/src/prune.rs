//! Layered pruning policy with liveness guarantees.
//!
//! Invoked once per candidate before it is enqueued as a child task. The
//! checks run in a fixed order and the first hit wins; forced-keep counters
//! guarantee frontier diversity so pruning can never extinguish the tree on
//! its own (the engine additionally rescues total-elimination expansions).

use slipstream_kernel::GridVector;

use crate::contract::TerrainModelV1;
use crate::node::{PathNode, SearchTask};
use crate::policy::SearchConfigV1;
use crate::scorer::HEADING_SIMILARITY;

/// Depth-1 candidates scoring above this are never pruned.
const FIRST_MOVE_KEEP_SCORE: f64 = 0.6;
/// Every Nth depth-1 candidate is force-kept regardless of score.
const FIRST_MOVE_KEEP_STRIDE: u32 = 3;

/// Lookahead exit-risk prune limit (relaxed in recovery context).
const LOOKAHEAD_RISK_LIMIT: f64 = 0.7;
const LOOKAHEAD_RISK_LIMIT_RECOVERY: f64 = 0.9;

/// Score-threshold leniency multipliers.
const FINISH_LINE_RELAXATION: f64 = 0.8;
const FIRST_MOVE_RELAXATION: f64 = 0.8;
const LOW_DIVERSITY_RELAXATION: f64 = 0.7;

/// Speed-match factor below this is an excessive-speed-at-turn prune.
const EXCESSIVE_SPEED_FLOOR: f64 = 0.3;

/// Which check eliminated a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    Terrain,
    Score,
    Lookahead,
    Inefficiency,
    ExcessiveSpeed,
}

/// Outcome of one pruning decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneDecision {
    /// Candidate survives normally.
    Keep,
    /// Candidate survives because a forced-keep rule fired.
    ForcedKeep,
    /// Candidate is eliminated.
    Prune(PruneReason),
}

impl PruneDecision {
    /// True for either form of survival.
    #[must_use]
    pub const fn keeps(self) -> bool {
        matches!(self, Self::Keep | Self::ForcedKeep)
    }
}

/// Per-search elimination tallies. Reset at search start; read-only after.
/// Diagnostic only — nothing reads these for control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneCounters {
    pub total_generated: u64,
    pub total_pruned: u64,
    pub pruned_by_terrain: u64,
    pub pruned_by_score: u64,
    pub pruned_by_lookahead: u64,
    pub pruned_by_inefficiency: u64,
    pub pruned_by_speed: u64,
    pub forced_keeps: u64,
    /// Total-elimination rescues performed by the engine.
    pub rescued_expansions: u64,
}

impl PruneCounters {
    /// Fold another pass's tallies into this one (re-run ladder).
    pub fn absorb(&mut self, other: &Self) {
        self.total_generated += other.total_generated;
        self.total_pruned += other.total_pruned;
        self.pruned_by_terrain += other.pruned_by_terrain;
        self.pruned_by_score += other.pruned_by_score;
        self.pruned_by_lookahead += other.pruned_by_lookahead;
        self.pruned_by_inefficiency += other.pruned_by_inefficiency;
        self.pruned_by_speed += other.pruned_by_speed;
        self.forced_keeps += other.forced_keeps;
        self.rescued_expansions += other.rescued_expansions;
    }

    /// JSON view for the search report.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "total_generated": self.total_generated,
            "total_pruned": self.total_pruned,
            "pruned_by_terrain": self.pruned_by_terrain,
            "pruned_by_score": self.pruned_by_score,
            "pruned_by_lookahead": self.pruned_by_lookahead,
            "pruned_by_inefficiency": self.pruned_by_inefficiency,
            "pruned_by_speed": self.pruned_by_speed,
            "forced_keeps": self.forced_keeps,
            "rescued_expansions": self.rescued_expansions,
        })
    }
}

/// The pruning decision function plus its per-search counters.
#[derive(Debug)]
pub struct PrunePolicy {
    config: SearchConfigV1,
    /// Depth-1 candidates examined so far (drives the forced-keep stride).
    first_level_seen: u32,
    pub counters: PruneCounters,
}

impl PrunePolicy {
    /// Fresh policy state for one search.
    #[must_use]
    pub fn new(config: SearchConfigV1) -> Self {
        Self {
            config,
            first_level_seen: 0,
            counters: PruneCounters::default(),
        }
    }

    /// Decide whether to eliminate `candidate`, extending `task` at `depth`.
    ///
    /// `completed_paths` is the current size of the completed-path set
    /// (used for below-diversity leniency); `recovery` is the search-level
    /// recovery context.
    #[allow(clippy::too_many_arguments)]
    pub fn decide(
        &mut self,
        task: Option<&SearchTask>,
        candidate: &PathNode,
        depth: u32,
        recovery: bool,
        targeting_finish: bool,
        completed_paths: u32,
        oracle: &dyn TerrainModelV1,
    ) -> PruneDecision {
        self.counters.total_generated += 1;

        if !self.config.pruning_enabled {
            return PruneDecision::Keep;
        }

        // 1. Forced keeps guarantee first-move diversity.
        if depth == 1 {
            self.first_level_seen += 1;
            let forced = candidate.score > FIRST_MOVE_KEEP_SCORE
                || self.first_level_seen <= self.config.min_first_move_keep
                || self.first_level_seen % FIRST_MOVE_KEEP_STRIDE == 0;
            if forced {
                self.counters.forced_keeps += 1;
                return PruneDecision::ForcedKeep;
            }
        }

        // 2. Terrain tolerance over the consecutive off-track chain.
        let tolerance = self.config.off_track_tolerance + u32::from(recovery);
        if candidate.is_off_track() && candidate.off_track_count >= tolerance {
            return self.record(PruneReason::Terrain);
        }

        // 3. Adaptive score threshold.
        if self.config.aggressive_pruning && !recovery {
            let mut threshold = self.config.score_threshold
                * (1.0 + self.config.depth_scaling * f64::from(depth.saturating_sub(1)));
            if targeting_finish {
                threshold *= FINISH_LINE_RELAXATION;
            }
            if depth == 1 {
                threshold *= FIRST_MOVE_RELAXATION;
            }
            if completed_paths < self.config.min_path_diversity {
                threshold *= LOW_DIVERSITY_RELAXATION;
            }
            if candidate.score < threshold {
                return self.record(PruneReason::Score);
            }
        }

        // 4. Lookahead exit risk.
        if self.config.lookahead_pruning {
            let limit = if recovery {
                LOOKAHEAD_RISK_LIMIT_RECOVERY
            } else {
                LOOKAHEAD_RISK_LIMIT
            };
            let risk = oracle.lookahead_exit_risk(
                candidate.position.to_world(),
                candidate.velocity,
                self.config.lookahead_steps,
            );
            if risk > limit {
                return self.record(PruneReason::Lookahead);
            }
        }

        // 5. Zig-zag inefficiency.
        if self.config.inefficiency_pruning && depth > 1 && !recovery {
            if let Some(task) = task {
                let mut changes = task.direction_changes(HEADING_SIMILARITY);
                if heading_changed(task.terminal().velocity, candidate.velocity) {
                    changes += 1;
                }
                if changes > depth / 2 {
                    return self.record(PruneReason::Inefficiency);
                }
            }
        }

        // 6. Excessive speed at a turn.
        if self.config.excessive_speed_pruning
            && !recovery
            && candidate.factors.speed < EXCESSIVE_SPEED_FLOOR
        {
            return self.record(PruneReason::ExcessiveSpeed);
        }

        PruneDecision::Keep
    }

    /// Credit a total-elimination rescue (engine force-kept one candidate).
    ///
    /// `reason` is the check that had eliminated the rescued candidate; its
    /// tally is refunded along with the total so the per-reason counters
    /// always sum to `total_pruned`.
    pub fn record_rescue(&mut self, reason: PruneReason) {
        self.counters.rescued_expansions += 1;
        self.counters.total_pruned = self.counters.total_pruned.saturating_sub(1);
        let tally = match reason {
            PruneReason::Terrain => &mut self.counters.pruned_by_terrain,
            PruneReason::Score => &mut self.counters.pruned_by_score,
            PruneReason::Lookahead => &mut self.counters.pruned_by_lookahead,
            PruneReason::Inefficiency => &mut self.counters.pruned_by_inefficiency,
            PruneReason::ExcessiveSpeed => &mut self.counters.pruned_by_speed,
        };
        *tally = tally.saturating_sub(1);
    }

    fn record(&mut self, reason: PruneReason) -> PruneDecision {
        self.counters.total_pruned += 1;
        match reason {
            PruneReason::Terrain => self.counters.pruned_by_terrain += 1,
            PruneReason::Score => self.counters.pruned_by_score += 1,
            PruneReason::Lookahead => self.counters.pruned_by_lookahead += 1,
            PruneReason::Inefficiency => self.counters.pruned_by_inefficiency += 1,
            PruneReason::ExcessiveSpeed => self.counters.pruned_by_speed += 1,
        }
        PruneDecision::Prune(reason)
    }
}

fn heading_changed(a: GridVector, b: GridVector) -> bool {
    !a.is_zero() && !b.is_zero() && a.alignment(b) < HEADING_SIMILARITY
}
