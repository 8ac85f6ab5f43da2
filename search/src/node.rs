//! Path nodes, candidate paths, and search work items.

use slipstream_kernel::GridVector;

/// Named scoring factors, used for the diagnostic breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    Distance,
    Speed,
    Terrain,
    Direction,
    TrackCenter,
    ExitRisk,
    Lookahead,
    ReturnToGood,
    FinishApproach,
}

impl FactorKind {
    /// Stable string for report serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Speed => "speed",
            Self::Terrain => "terrain",
            Self::Direction => "direction",
            Self::TrackCenter => "track_center",
            Self::ExitRisk => "exit_risk",
            Self::Lookahead => "lookahead",
            Self::ReturnToGood => "return_to_good",
            Self::FinishApproach => "finish_approach",
        }
    }
}

/// The per-factor scores of one evaluated node, each in `[0, 1]`.
///
/// These feed both the composite score and the contextual path bonuses.
/// `exit_risk` here is the *inverted* factor (higher risk → lower value);
/// the raw risk is kept on [`PathNode::exit_risk`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFactors {
    pub distance: f64,
    pub speed: f64,
    pub terrain: f64,
    pub direction: f64,
    pub track_center: f64,
    pub exit_risk: f64,
    pub lookahead: f64,
    /// Progress toward good terrain; only computed in recovery context.
    pub return_to_good: f64,
    /// Direct-approach quality; only computed while targeting the finish.
    pub finish_approach: f64,
}

impl NodeFactors {
    /// Named breakdown for diagnostics. Never read by control flow.
    #[must_use]
    pub fn entries(&self) -> Vec<(FactorKind, f64)> {
        vec![
            (FactorKind::Distance, self.distance),
            (FactorKind::Speed, self.speed),
            (FactorKind::Terrain, self.terrain),
            (FactorKind::Direction, self.direction),
            (FactorKind::TrackCenter, self.track_center),
            (FactorKind::ExitRisk, self.exit_risk),
            (FactorKind::Lookahead, self.lookahead),
            (FactorKind::ReturnToGood, self.return_to_good),
            (FactorKind::FinishApproach, self.finish_approach),
        ]
    }
}

/// One ply of a candidate path.
///
/// Owned exclusively by the [`Path`] (or [`SearchTask`]) that contains it;
/// nodes are never shared between paths.
#[derive(Debug, Clone)]
pub struct PathNode {
    /// Grid position after this move.
    pub position: GridVector,
    /// Grid velocity after this move (gravel-clamped where applicable).
    pub velocity: GridVector,
    /// Composite score in `[0, 1]` after normalization and depth decay.
    pub score: f64,
    /// Per-factor breakdown.
    pub factors: NodeFactors,
    /// Terrain quality at this node's position.
    pub terrain_quality: f64,
    /// Consecutive off-track steps: 0 on good terrain, else parent's + 1.
    pub off_track_count: u32,
    /// Raw track-exit risk at this node.
    pub exit_risk: f64,
}

impl PathNode {
    /// True if this node sits on degraded terrain.
    #[must_use]
    pub fn is_off_track(&self) -> bool {
        self.terrain_quality < crate::contract::GRAVEL_THRESHOLD
    }
}

/// Quality classification of a completed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathQuality {
    Bad,
    Medium,
    Good,
    /// The single selected winner of a search.
    Best,
    Unknown,
}

impl PathQuality {
    /// Stable string for report serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bad => "bad",
            Self::Medium => "medium",
            Self::Good => "good",
            Self::Best => "best",
            Self::Unknown => "unknown",
        }
    }
}

/// A completed, depth-bounded candidate move sequence.
///
/// Node order is move order (shallowest first). Aggregates are filled by
/// path evaluation; after that a path is immutable except for the winner's
/// quality being raised to [`PathQuality::Best`] at selection.
#[derive(Debug, Clone)]
pub struct Path {
    pub nodes: Vec<PathNode>,
    pub total_score: f64,
    pub avg_score: f64,
    pub min_node_score: f64,
    pub avg_terrain: f64,
    pub off_track_nodes: u32,
    pub good_terrain_nodes: u32,
    pub max_exit_risk: f64,
    pub avg_speed_factor: f64,
    pub direction_changes: u32,
    pub dead_end: bool,
    pub quality: PathQuality,
}

impl Path {
    /// Wrap raw nodes with unevaluated aggregates.
    #[must_use]
    pub fn unevaluated(nodes: Vec<PathNode>) -> Self {
        Self {
            nodes,
            total_score: 0.0,
            avg_score: 0.0,
            min_node_score: 0.0,
            avg_terrain: 0.0,
            off_track_nodes: 0,
            good_terrain_nodes: 0,
            max_exit_risk: 0.0,
            avg_speed_factor: 0.0,
            direction_changes: 0,
            dead_end: false,
            quality: PathQuality::Unknown,
        }
    }

    /// The first move of the path, if any.
    #[must_use]
    pub fn first(&self) -> Option<&PathNode> {
        self.nodes.first()
    }

    /// The terminal node of the path, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    /// True if any node sits on good terrain.
    #[must_use]
    pub fn has_good_terrain_node(&self) -> bool {
        self.good_terrain_nodes > 0
    }
}

/// A transient work item in the frontier queue.
///
/// Created when a node survives pruning; consumed when the engine expands it
/// or finalizes it as a complete [`Path`] at max depth.
#[derive(Debug, Clone)]
pub struct SearchTask {
    /// The path so far, shallowest node first. Never empty.
    pub nodes: Vec<PathNode>,
    /// Depth of the terminal node (1 for first-level tasks).
    pub depth: u32,
}

impl SearchTask {
    /// Construct a task; `depth` must equal `nodes.len()`.
    #[must_use]
    pub fn new(nodes: Vec<PathNode>, depth: u32) -> Self {
        debug_assert_eq!(nodes.len() as u32, depth, "task depth must match node count");
        Self { nodes, depth }
    }

    /// The terminal node of the path so far.
    ///
    /// # Panics
    ///
    /// Tasks are constructed non-empty; an empty task is a construction bug.
    #[must_use]
    pub fn terminal(&self) -> &PathNode {
        self.nodes.last().expect("SearchTask is never empty")
    }

    /// Count of heading changes along the path so far.
    ///
    /// Two consecutive velocities count as a change when their heading
    /// cosine drops below the similarity threshold.
    #[must_use]
    pub fn direction_changes(&self, similarity_threshold: f64) -> u32 {
        let mut changes = 0;
        for pair in self.nodes.windows(2) {
            let a = pair[0].velocity;
            let b = pair[1].velocity;
            if !a.is_zero() && !b.is_zero() && a.alignment(b) < similarity_threshold {
                changes += 1;
            }
        }
        changes
    }
}
