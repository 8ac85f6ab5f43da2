//! Search configuration snapshot.
//!
//! All tuning is captured as an immutable [`SearchConfigV1`] at search start;
//! changes a host makes to its own tuning surface apply to the *next* search,
//! never mid-flight. The snapshot digests to a stable identifier that is
//! embedded in every search report.

use crate::canon::{canonical_json_bytes, sha256_digest, DOMAIN_CONFIG_SNAPSHOT};
use crate::error::SearchError;

/// The nine evaluation weights. All non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    pub distance: f64,
    pub speed: f64,
    pub terrain: f64,
    pub direction: f64,
    pub lookahead: f64,
    pub return_to_good: f64,
    pub track_center: f64,
    pub exit_risk_penalty: f64,
    pub finish_line: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            distance: 1.5,
            speed: 1.0,
            terrain: 1.2,
            direction: 1.3,
            lookahead: 0.8,
            return_to_good: 1.0,
            track_center: 0.6,
            exit_risk_penalty: 1.0,
            finish_line: 1.5,
        }
    }
}

/// Ideal-speed anchors in grid units per turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedTargets {
    /// Ideal speed on a straight.
    pub straight_max: f64,
    /// Ideal speed through the sharpest turn.
    pub turn_max: f64,
}

impl Default for SpeedTargets {
    fn default() -> Self {
        Self {
            straight_max: 4.0,
            turn_max: 2.0,
        }
    }
}

/// Immutable per-search configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfigV1 {
    /// Maximum tree depth (plies per candidate path).
    pub max_depth: u32,
    pub weights: EvalWeights,
    pub speed_targets: SpeedTargets,

    // Pruning
    pub pruning_enabled: bool,
    /// Consecutive off-track steps tolerated before pruning.
    pub off_track_tolerance: u32,
    /// Terrain quality below this is degraded.
    pub terrain_threshold: f64,
    pub aggressive_pruning: bool,
    /// Base score threshold for aggressive pruning.
    pub score_threshold: f64,
    /// Per-depth increase factor applied to the score threshold.
    pub depth_scaling: f64,
    pub lookahead_pruning: bool,
    /// Dead-reckoned steps for lookahead exit-risk queries.
    pub lookahead_steps: u32,
    pub inefficiency_pruning: bool,
    pub excessive_speed_pruning: bool,
    /// First-level candidates force-kept unconditionally.
    pub min_first_move_keep: u32,
    /// Minimum distinct first-move paths a search must produce.
    pub min_path_diversity: u32,

    // Chunking
    /// Maximum tasks processed per scheduling quantum.
    pub chunk_max_tasks: u32,
    /// Host pacing hint between quanta, in milliseconds. The engine itself
    /// never sleeps; synchronous drivers honor this between chunks.
    pub chunk_delay_ms: u64,
}

impl Default for SearchConfigV1 {
    fn default() -> Self {
        Self {
            max_depth: 4,
            weights: EvalWeights::default(),
            speed_targets: SpeedTargets::default(),
            pruning_enabled: true,
            off_track_tolerance: 2,
            terrain_threshold: crate::contract::GRAVEL_THRESHOLD,
            aggressive_pruning: true,
            score_threshold: 0.4,
            depth_scaling: 0.05,
            lookahead_pruning: true,
            lookahead_steps: 3,
            inefficiency_pruning: true,
            excessive_speed_pruning: true,
            min_first_move_keep: 3,
            min_path_diversity: 3,
            chunk_max_tasks: 64,
            chunk_delay_ms: 0,
        }
    }
}

impl SearchConfigV1 {
    /// Pre-flight validation. Called once at search start.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for out-of-range parameters.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_depth == 0 {
            return Err(SearchError::InvalidConfig {
                detail: "max_depth must be at least 1".into(),
            });
        }
        if self.chunk_max_tasks == 0 {
            return Err(SearchError::InvalidConfig {
                detail: "chunk_max_tasks must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.terrain_threshold) {
            return Err(SearchError::InvalidConfig {
                detail: format!("terrain_threshold {} outside [0, 1]", self.terrain_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(SearchError::InvalidConfig {
                detail: format!("score_threshold {} outside [0, 1]", self.score_threshold),
            });
        }
        let w = &self.weights;
        for (name, value) in [
            ("distance", w.distance),
            ("speed", w.speed),
            ("terrain", w.terrain),
            ("direction", w.direction),
            ("lookahead", w.lookahead),
            ("return_to_good", w.return_to_good),
            ("track_center", w.track_center),
            ("exit_risk_penalty", w.exit_risk_penalty),
            ("finish_line", w.finish_line),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SearchError::InvalidConfig {
                    detail: format!("weight {name} must be finite and non-negative, got {value}"),
                });
            }
        }
        if self.speed_targets.turn_max > self.speed_targets.straight_max {
            return Err(SearchError::InvalidConfig {
                detail: "turn_max speed target exceeds straight_max".into(),
            });
        }
        Ok(())
    }

    /// First relaxation tier for the empty-result liveness ladder:
    /// halved score threshold, one extra off-track step, aggressive off.
    #[must_use]
    pub fn relaxed(&self) -> Self {
        Self {
            score_threshold: self.score_threshold / 2.0,
            off_track_tolerance: self.off_track_tolerance + 1,
            aggressive_pruning: false,
            ..self.clone()
        }
    }

    /// Final relaxation tier: pruning fully disabled.
    #[must_use]
    pub fn unpruned(&self) -> Self {
        Self {
            pruning_enabled: false,
            ..self.clone()
        }
    }

    /// Canonical JSON value of the snapshot.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "schema_version": "search_config.v1",
            "max_depth": self.max_depth,
            "weights": {
                "distance": self.weights.distance,
                "speed": self.weights.speed,
                "terrain": self.weights.terrain,
                "direction": self.weights.direction,
                "lookahead": self.weights.lookahead,
                "return_to_good": self.weights.return_to_good,
                "track_center": self.weights.track_center,
                "exit_risk_penalty": self.weights.exit_risk_penalty,
                "finish_line": self.weights.finish_line,
            },
            "speed_targets": {
                "straight_max": self.speed_targets.straight_max,
                "turn_max": self.speed_targets.turn_max,
            },
            "pruning_enabled": self.pruning_enabled,
            "off_track_tolerance": self.off_track_tolerance,
            "terrain_threshold": self.terrain_threshold,
            "aggressive_pruning": self.aggressive_pruning,
            "score_threshold": self.score_threshold,
            "depth_scaling": self.depth_scaling,
            "lookahead_pruning": self.lookahead_pruning,
            "lookahead_steps": self.lookahead_steps,
            "inefficiency_pruning": self.inefficiency_pruning,
            "excessive_speed_pruning": self.excessive_speed_pruning,
            "min_first_move_keep": self.min_first_move_keep,
            "min_path_diversity": self.min_path_diversity,
            "chunk_max_tasks": self.chunk_max_tasks,
            "chunk_delay_ms": self.chunk_delay_ms,
        })
    }

    /// Stable digest of the snapshot, embedded in every report.
    #[must_use]
    pub fn digest(&self) -> String {
        let bytes = canonical_json_bytes(&self.to_json_value());
        sha256_digest(DOMAIN_CONFIG_SNAPSHOT, &bytes)
    }
}
