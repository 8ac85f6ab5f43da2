//! `SearchReportV1`: the per-search diagnostics artifact.
//!
//! Observability here is artifact-based: every search emits one report with
//! its pruning counters, liveness outcome, and config binding. Reports are
//! diagnostic only — nothing reads them for control flow.

use slipstream_kernel::GridVector;

use crate::canon::{canonical_json_bytes, sha256_digest, DOMAIN_SEARCH_REPORT};
use crate::node::Path;
use crate::prune::PruneCounters;
use crate::scorer::ScoreContext;

/// How the search produced its result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReasonV1 {
    /// The primary chunked pass produced a non-empty path set.
    Completed,
    /// The empty-result ladder re-ran with relaxed pruning.
    /// Tier 1 = halved threshold / wider tolerance, tier 2 = pruning off.
    RelaxedPruning { tier: u8 },
    /// Single-node paths were manufactured to meet the diversity minimum.
    DiversityFallback,
    /// The unconditional single-path fallback fired (caller precondition
    /// was at the edge: only possible with a pathological move set).
    AbsoluteFallback,
}

impl TerminationReasonV1 {
    fn to_json(self) -> serde_json::Value {
        match self {
            Self::Completed => serde_json::json!({"type": "completed"}),
            Self::RelaxedPruning { tier } => {
                serde_json::json!({"type": "relaxed_pruning", "tier": tier})
            }
            Self::DiversityFallback => serde_json::json!({"type": "diversity_fallback"}),
            Self::AbsoluteFallback => serde_json::json!({"type": "absolute_fallback"}),
        }
    }
}

/// Summary of the selected winning path.
#[derive(Debug, Clone)]
pub struct SelectedPathSummary {
    pub first_move: GridVector,
    pub node_count: u32,
    pub avg_score: f64,
    pub quality: &'static str,
}

impl SelectedPathSummary {
    /// Capture the winner after selection.
    #[must_use]
    pub fn of(path: &Path) -> Option<Self> {
        let first = path.first()?;
        #[allow(clippy::cast_possible_truncation)]
        Some(Self {
            first_move: first.position,
            node_count: path.nodes.len() as u32,
            avg_score: path.avg_score,
            quality: path.quality.as_str(),
        })
    }
}

/// The complete per-search diagnostics artifact.
#[derive(Debug, Clone)]
pub struct SearchReportV1 {
    /// Digest of the config snapshot this search ran under.
    pub config_digest: String,
    /// Resolved scoring context.
    pub context: ScoreContext,
    /// Pruning tallies.
    pub counters: PruneCounters,
    /// How the result set was produced.
    pub termination: TerminationReasonV1,
    /// Completed paths in the final set.
    pub paths_completed: u64,
    /// Distinct first moves across the final set.
    pub distinct_first_moves: u64,
    /// Frontier queue high-water mark.
    pub frontier_high_water: u64,
    /// Scheduling quanta consumed by the primary pass.
    pub chunks_used: u64,
    /// Filled in by the host after selection.
    pub selected: Option<SelectedPathSummary>,
}

impl SearchReportV1 {
    /// Canonical JSON value (sorted keys at serialization).
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let selected = self.selected.as_ref().map_or(serde_json::Value::Null, |s| {
            serde_json::json!({
                "first_move": {"x": s.first_move.x, "y": s.first_move.y},
                "node_count": s.node_count,
                "avg_score": s.avg_score,
                "quality": s.quality,
            })
        });
        serde_json::json!({
            "schema_version": "search_report.v1",
            "config_digest": self.config_digest,
            "context": self.context.as_str(),
            "counters": self.counters.to_json_value(),
            "termination": self.termination.to_json(),
            "paths_completed": self.paths_completed,
            "distinct_first_moves": self.distinct_first_moves,
            "frontier_high_water": self.frontier_high_water,
            "chunks_used": self.chunks_used,
            "selected": selected,
        })
    }

    /// Serialize to canonical JSON bytes (sorted keys, compact form).
    #[must_use]
    pub fn to_canonical_json_bytes(&self) -> Vec<u8> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// Content digest of the canonical bytes.
    #[must_use]
    pub fn digest(&self) -> String {
        sha256_digest(DOMAIN_SEARCH_REPORT, &self.to_canonical_json_bytes())
    }
}
