//! Context-dependent best-path selection.
//!
//! Selection runs after the search finishes: filter the completed set by
//! context, sort what survives, take the top path, and raise its quality to
//! `Best`. Every filter falls back to the unfiltered set rather than
//! returning nothing; an empty input is a caller bug and fails loudly.

use std::cmp::Ordering;

use crate::error::SearchError;
use crate::node::{Path, PathQuality};
use crate::scorer::{ScoreContext, STRONG_FACTOR};

/// Minimum average terrain quality for the non-recovery preference filters.
const GOOD_AVG_TERRAIN: f64 = 0.6;

/// Finish-context composite weights: terminal distance, terminal direction,
/// exit-risk penalty.
const FINISH_TERMINAL_DISTANCE_WEIGHT: f64 = 0.5;
const FINISH_TERMINAL_DIRECTION_WEIGHT: f64 = 0.3;
const FINISH_EXIT_RISK_WEIGHT: f64 = 0.4;

/// Default-context composite weights: first-move direction and distance
/// dominate, terrain and speed contribute, exit risk penalizes.
const DEFAULT_FIRST_DIRECTION_WEIGHT: f64 = 0.8;
const DEFAULT_FIRST_DISTANCE_WEIGHT: f64 = 0.7;
const DEFAULT_TERRAIN_WEIGHT: f64 = 0.4;
const DEFAULT_SPEED_WEIGHT: f64 = 0.3;
const DEFAULT_EXIT_RISK_WEIGHT: f64 = 0.5;

/// Picks the winning path out of a completed set.
#[derive(Debug, Clone, Copy)]
pub struct PathSelector {
    context: ScoreContext,
}

impl PathSelector {
    /// A selector bound to the search's scoring context.
    #[must_use]
    pub const fn new(context: ScoreContext) -> Self {
        Self { context }
    }

    /// Select the best path, consuming the set. The winner's quality is
    /// raised to [`PathQuality::Best`]; exactly one path per search carries
    /// that mark.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyPathSet`] if `paths` is empty — the engine
    /// guarantees a non-empty set, so this is a caller bug.
    pub fn select(&self, mut paths: Vec<Path>) -> Result<Path, SearchError> {
        if paths.is_empty() {
            return Err(SearchError::EmptyPathSet);
        }

        let candidates = self.filter(&paths);
        let winner_idx = candidates
            .iter()
            .copied()
            .max_by(|&a, &b| self.compare(&paths[a], &paths[b]))
            .unwrap_or(0);

        let mut winner = paths.swap_remove(winner_idx);
        winner.quality = PathQuality::Best;
        Ok(winner)
    }

    /// Context-dependent preference filter. Falls back to the full index
    /// set whenever a filter eliminates everything.
    fn filter(&self, paths: &[Path]) -> Vec<usize> {
        let all: Vec<usize> = (0..paths.len()).collect();
        let pass = |pred: &dyn Fn(&Path) -> bool| -> Vec<usize> {
            all.iter().copied().filter(|&i| pred(&paths[i])).collect()
        };

        let filtered = match self.context {
            ScoreContext::Recovery => {
                let reaching = pass(&|p: &Path| p.has_good_terrain_node());
                if reaching.is_empty() {
                    pass(&|p: &Path| {
                        p.first().is_some_and(|n| n.factors.return_to_good >= STRONG_FACTOR)
                    })
                } else {
                    reaching
                }
            }
            ScoreContext::FinishLine => pass(&|p: &Path| {
                p.last().is_some_and(|n| n.factors.distance >= STRONG_FACTOR)
                    && p.avg_terrain >= GOOD_AVG_TERRAIN
            }),
            ScoreContext::Checkpoint => pass(&|p: &Path| {
                p.first().is_some_and(|n| {
                    n.factors.distance >= STRONG_FACTOR && n.factors.direction >= STRONG_FACTOR
                }) && p.avg_terrain >= GOOD_AVG_TERRAIN
            }),
        };

        if filtered.is_empty() {
            all
        } else {
            filtered
        }
    }

    /// Context-dependent ordering; `Greater` means `a` is the better path.
    fn compare(&self, a: &Path, b: &Path) -> Ordering {
        match self.context {
            ScoreContext::Recovery => a
                .has_good_terrain_node()
                .cmp(&b.has_good_terrain_node())
                .then_with(|| total(first_return(a), first_return(b)))
                .then_with(|| total(a.avg_score, b.avg_score))
                .then_with(|| total(a.avg_terrain, b.avg_terrain)),
            ScoreContext::FinishLine => total(finish_composite(a), finish_composite(b))
                .then_with(|| total(a.avg_terrain, b.avg_terrain)),
            ScoreContext::Checkpoint => total(default_composite(a), default_composite(b))
                .then_with(|| total(a.min_node_score, b.min_node_score)),
        }
    }
}

fn total(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

fn first_return(path: &Path) -> f64 {
    path.first().map_or(0.0, |n| n.factors.return_to_good)
}

fn finish_composite(path: &Path) -> f64 {
    let terminal_distance = path.last().map_or(0.0, |n| n.factors.distance);
    let terminal_direction = path.last().map_or(0.0, |n| n.factors.direction);
    path.avg_score
        + FINISH_TERMINAL_DISTANCE_WEIGHT * terminal_distance
        + FINISH_TERMINAL_DIRECTION_WEIGHT * terminal_direction
        - FINISH_EXIT_RISK_WEIGHT * path.max_exit_risk
}

fn default_composite(path: &Path) -> f64 {
    let first_direction = path.first().map_or(0.0, |n| n.factors.direction);
    let first_distance = path.first().map_or(0.0, |n| n.factors.distance);
    path.avg_score
        + DEFAULT_FIRST_DIRECTION_WEIGHT * first_direction
        + DEFAULT_FIRST_DISTANCE_WEIGHT * first_distance
        + DEFAULT_TERRAIN_WEIGHT * path.avg_terrain
        + DEFAULT_SPEED_WEIGHT * path.avg_speed_factor
        - DEFAULT_EXIT_RISK_WEIGHT * path.max_exit_risk
}
