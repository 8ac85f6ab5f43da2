//! The chunked path search engine.
//!
//! [`PathSearch`] owns one search from seeding to result delivery. It expands
//! a breadth-first frontier over the 9-way move neighborhood in bounded
//! bursts ([`PathSearch::run_chunk`]), so the host amortizes search cost
//! across scheduling quanta instead of stalling one frame. All engine state
//! is per-search and freshly built in [`PathSearch::start`]; dropping a
//! search mid-run leaves nothing behind for the next one to observe.
//!
//! Liveness is layered: forced keeps and total-elimination rescues guarantee
//! survivors during expansion, and [`PathSearch::finish`] runs the re-run
//! ladder (relaxed pruning, then pruning off) plus the diversity and
//! absolute single-node fallbacks if the completed set still comes up short.

use slipstream_kernel::{offsets_3x3, GridVector, WorldPoint};

use crate::contract::{MoveProviderV1, RaceTargets, TerrainModelV1};
use crate::error::SearchError;
use crate::frontier::DepthFrontier;
use crate::node::{Path, PathNode, SearchTask};
use crate::policy::SearchConfigV1;
use crate::prune::{PruneDecision, PrunePolicy, PruneReason};
use crate::report::{SearchReportV1, TerminationReasonV1};
use crate::scorer::{MoveEvaluator, ScoreContext};

/// Outcome of one scheduling quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Frontier work remains; call [`PathSearch::run_chunk`] again.
    Continue,
    /// The frontier is drained; call [`PathSearch::finish`].
    Done,
}

/// A first-level candidate, recorded at seeding so the fallback tiers can
/// manufacture paths without re-querying the move provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstMove {
    pub position: GridVector,
    pub velocity: GridVector,
}

/// Everything a finished search hands back to the host.
#[derive(Debug)]
pub struct SearchOutcome {
    /// The completed path set, never empty when at least one first-level
    /// candidate existed.
    pub paths: Vec<Path>,
    /// Diagnostics artifact; `selected` is filled in after selection.
    pub report: SearchReportV1,
}

/// One expansion pass over the move tree: frontier, evaluator, pruner, and
/// the completed set. The primary pass runs chunked; re-run ladder passes
/// run to completion synchronously inside `finish`.
struct SearchPass<'o> {
    config: SearchConfigV1,
    evaluator: MoveEvaluator<'o>,
    pruner: PrunePolicy,
    frontier: DepthFrontier,
    completed: Vec<Path>,
    oracle: &'o dyn TerrainModelV1,
    recovery: bool,
    targeting_finish: bool,
}

impl<'o> SearchPass<'o> {
    fn new(
        config: SearchConfigV1,
        oracle: &'o dyn TerrainModelV1,
        targets: RaceTargets,
        origin_world: WorldPoint,
        on_gravel: bool,
    ) -> Self {
        let evaluator = MoveEvaluator::new(config.clone(), oracle, targets, origin_world, on_gravel);
        let recovery = evaluator.context() == ScoreContext::Recovery;
        Self {
            pruner: PrunePolicy::new(config.clone()),
            config,
            evaluator,
            frontier: DepthFrontier::new(),
            completed: Vec::new(),
            oracle,
            recovery,
            targeting_finish: targets.targeting_finish,
        }
    }

    /// Score and prune the first-level candidates, enqueueing survivors as
    /// depth-1 tasks. If pruning eliminates every candidate, the single
    /// best one is rescued so the search always has a frontier to expand.
    fn seed(&mut self, seeds: &[FirstMove]) {
        let mut scored = Vec::with_capacity(seeds.len());
        let mut kept_any = false;
        for seed in seeds {
            let node = self.evaluator.score_node(None, seed.position, seed.velocity, 1);
            let decision = self.pruner.decide(
                None,
                &node,
                1,
                self.recovery,
                self.targeting_finish,
                self.completed_count(),
                self.oracle,
            );
            if decision.keeps() {
                kept_any = true;
                self.frontier.push(SearchTask::new(vec![node], 1));
            } else if let PruneDecision::Prune(reason) = decision {
                scored.push((node, reason));
            }
        }
        if !kept_any {
            if let Some((best, reason)) = take_best(scored) {
                self.pruner.record_rescue(reason);
                self.frontier.push(SearchTask::new(vec![best], 1));
            }
        }
    }

    /// Process up to `max_tasks` frontier items.
    fn step(&mut self, max_tasks: u32) -> Progress {
        for _ in 0..max_tasks {
            let Some(task) = self.frontier.pop() else {
                return Progress::Done;
            };
            if task.depth >= self.config.max_depth {
                self.finalize(task);
            } else {
                self.expand(task);
            }
        }
        if self.frontier.is_empty() {
            Progress::Done
        } else {
            Progress::Continue
        }
    }

    fn run_to_completion(&mut self, max_tasks: u32) {
        while self.step(max_tasks) == Progress::Continue {}
    }

    /// Generate the 9 children of a task's terminal node, enqueueing prune
    /// survivors at depth + 1. Total elimination rescues the best child.
    fn expand(&mut self, task: SearchTask) {
        let parent = task.terminal();
        // Degraded terrain caps achievable speed at one grid unit, so the
        // dead-reckoned base must use the clamped velocity too.
        let effective_velocity = if parent.is_off_track() {
            parent.velocity.unit_step()
        } else {
            parent.velocity
        };
        let base = parent.position + effective_velocity;
        let child_depth = task.depth + 1;

        let mut pruned = Vec::new();
        let mut kept_any = false;
        for offset in offsets_3x3() {
            let position = base + offset;
            let velocity = position - parent.position;
            let node = self.evaluator.score_node(Some(parent), position, velocity, child_depth);
            let decision = self.pruner.decide(
                Some(&task),
                &node,
                child_depth,
                self.recovery,
                self.targeting_finish,
                self.completed_count(),
                self.oracle,
            );
            if decision.keeps() {
                kept_any = true;
                self.enqueue_child(&task, node, child_depth);
            } else if let PruneDecision::Prune(reason) = decision {
                pruned.push((node, reason));
            }
        }
        if !kept_any {
            if let Some((best, reason)) = take_best(pruned) {
                self.pruner.record_rescue(reason);
                self.enqueue_child(&task, best, child_depth);
            } else {
                // Zero generated children: finalize the branch early.
                self.finalize(task);
            }
        }
    }

    fn enqueue_child(&mut self, task: &SearchTask, node: PathNode, child_depth: u32) {
        let mut nodes = task.nodes.clone();
        nodes.push(node);
        self.frontier.push(SearchTask::new(nodes, child_depth));
    }

    fn finalize(&mut self, task: SearchTask) {
        self.completed.push(self.evaluator.evaluate_path(task.nodes));
    }

    fn completed_count(&self) -> u32 {
        u32::try_from(self.completed.len()).unwrap_or(u32::MAX)
    }
}

/// Highest-scoring node out of a pruned candidate set, with the reason that
/// eliminated it, for total-elimination rescues. Ties resolve to the
/// earliest candidate in enumeration order.
fn take_best(candidates: Vec<(PathNode, PruneReason)>) -> Option<(PathNode, PruneReason)> {
    let mut best: Option<(PathNode, PruneReason)> = None;
    for candidate in candidates {
        let better = best.as_ref().is_none_or(|(b, _)| candidate.0.score > b.score);
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// A single in-flight search, from [`PathSearch::start`] to
/// [`PathSearch::finish`].
///
/// The host drives it one quantum at a time with [`PathSearch::run_chunk`];
/// the completed path set is not observable until `finish`, which also runs
/// every fallback tier. The move provider is queried exactly once, inside
/// `start`; everything after that is pure expansion over the oracle.
pub struct PathSearch<'o> {
    oracle: &'o dyn TerrainModelV1,
    targets: RaceTargets,
    origin_world: WorldPoint,
    on_gravel: bool,
    seeds: Vec<FirstMove>,
    /// The validated caller config, pre-shortcut; bound into the report.
    base_config: SearchConfigV1,
    pass: SearchPass<'o>,
    chunks_used: u64,
    done: bool,
}

impl<'o> PathSearch<'o> {
    /// Validate the config, snapshot the origin state, query the move
    /// provider once, and seed the first depth level.
    ///
    /// On degraded terrain the origin velocity is clamped to one grid unit
    /// before anything else sees it. If every first-level candidate lands
    /// on degraded terrain, pruning is disabled for the whole search
    /// (emergency pathfinding); a single good-terrain candidate keeps it on.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if the config fails
    /// validation.
    pub fn start(
        config: SearchConfigV1,
        oracle: &'o dyn TerrainModelV1,
        provider: &mut dyn MoveProviderV1,
        position: GridVector,
        velocity: GridVector,
        targets: RaceTargets,
    ) -> Result<Self, SearchError> {
        config.validate()?;

        let origin_world = position.to_world();
        let on_gravel = oracle.quality_at(origin_world) < config.terrain_threshold;
        let velocity = if on_gravel { velocity.unit_step() } else { velocity };

        provider.show_possible_moves(position, velocity, 1);
        let legal = provider.valid_move_positions();
        provider.clear_indicators();

        let seeds: Vec<FirstMove> = if legal.is_empty() {
            // Zero-candidate query: synthesize the neighborhood around the
            // dead-reckoned base position.
            let base = position + velocity;
            offsets_3x3()
                .into_iter()
                .map(|offset| {
                    let p = base + offset;
                    FirstMove { position: p, velocity: p - position }
                })
                .collect()
        } else {
            legal
                .into_iter()
                .map(|p| FirstMove { position: p, velocity: p - position })
                .collect()
        };

        let all_first_moves_degraded = seeds.iter().all(|seed| {
            oracle.quality_at(seed.position.to_world()) < config.terrain_threshold
        });
        let effective = if all_first_moves_degraded {
            config.unpruned()
        } else {
            config.clone()
        };

        let mut pass = SearchPass::new(effective, oracle, targets, origin_world, on_gravel);
        pass.seed(&seeds);

        Ok(Self {
            oracle,
            targets,
            origin_world,
            on_gravel,
            seeds,
            base_config: config,
            pass,
            chunks_used: 0,
            done: false,
        })
    }

    /// The resolved scoring context for this search.
    #[must_use]
    pub fn context(&self) -> ScoreContext {
        self.pass.evaluator.context()
    }

    /// Whether the primary pass has drained its frontier.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The recorded first-level candidates (provider-sourced or
    /// synthesized).
    #[must_use]
    pub fn seeds(&self) -> &[FirstMove] {
        &self.seeds
    }

    /// Process one bounded burst of frontier tasks.
    pub fn run_chunk(&mut self) -> Progress {
        if self.done {
            return Progress::Done;
        }
        self.chunks_used += 1;
        let progress = self.pass.step(self.base_config.chunk_max_tasks);
        if progress == Progress::Done {
            self.done = true;
        }
        progress
    }

    /// Consume the search, running the fallback ladder, and hand back the
    /// completed path set plus the diagnostics report.
    ///
    /// Ladder, in order: an empty set re-runs with relaxed pruning, then
    /// with pruning off; below-minimum first-move diversity manufactures
    /// single-node paths from untried seeds; a still-empty set takes one
    /// unconditional single-node path from the first seed.
    ///
    /// # Errors
    ///
    /// [`SearchError::SearchStillRunning`] if the frontier is not drained;
    /// [`SearchError::NoFirstMoves`] if not even a first-level candidate
    /// exists (caller precondition failure).
    pub fn finish(mut self) -> Result<SearchOutcome, SearchError> {
        if !self.done {
            return Err(SearchError::SearchStillRunning);
        }

        let context = self.pass.evaluator.context();
        let mut counters = self.pass.pruner.counters;
        let mut high_water = self.pass.frontier.high_water();
        let mut paths = std::mem::take(&mut self.pass.completed);
        let mut termination = TerminationReasonV1::Completed;

        // Tier 1 and 2: re-run with progressively weaker pruning.
        for (tier, config) in [
            (1, self.base_config.relaxed()),
            (2, self.base_config.unpruned()),
        ] {
            if !paths.is_empty() {
                break;
            }
            let mut rerun = SearchPass::new(
                config,
                self.oracle,
                self.targets,
                self.origin_world,
                self.on_gravel,
            );
            rerun.seed(&self.seeds);
            rerun.run_to_completion(self.base_config.chunk_max_tasks);
            counters.absorb(&rerun.pruner.counters);
            high_water = high_water.max(rerun.frontier.high_water());
            paths = rerun.completed;
            termination = TerminationReasonV1::RelaxedPruning { tier };
        }

        // Tier 3: manufacture single-node paths from untried seeds until
        // the diversity minimum is met, bypassing pruning.
        if distinct_first_moves(&paths) < u64::from(self.base_config.min_path_diversity) {
            let evaluator = MoveEvaluator::new(
                self.base_config.clone(),
                self.oracle,
                self.targets,
                self.origin_world,
                self.on_gravel,
            );
            let mut manufactured = false;
            for seed in &self.seeds {
                if distinct_first_moves(&paths)
                    >= u64::from(self.base_config.min_path_diversity)
                {
                    break;
                }
                let tried = paths
                    .iter()
                    .any(|p| p.first().map(|n| n.position) == Some(seed.position));
                if tried {
                    continue;
                }
                let node = evaluator.score_node(None, seed.position, seed.velocity, 1);
                paths.push(evaluator.evaluate_path(vec![node]));
                manufactured = true;
            }
            if manufactured {
                termination = TerminationReasonV1::DiversityFallback;
            }
        }

        // Tier 4: one unconditional single-node path. Reachable only when
        // the caller started a search with no legal first move at all.
        if paths.is_empty() {
            match self.seeds.first() {
                Some(seed) => {
                    let evaluator = MoveEvaluator::new(
                        self.base_config.clone(),
                        self.oracle,
                        self.targets,
                        self.origin_world,
                        self.on_gravel,
                    );
                    let node = evaluator.score_node(None, seed.position, seed.velocity, 1);
                    paths.push(evaluator.evaluate_path(vec![node]));
                    termination = TerminationReasonV1::AbsoluteFallback;
                }
                None => return Err(SearchError::NoFirstMoves),
            }
        }

        let report = SearchReportV1 {
            config_digest: self.base_config.digest(),
            context,
            counters,
            termination,
            paths_completed: paths.len() as u64,
            distinct_first_moves: distinct_first_moves(&paths),
            frontier_high_water: high_water,
            chunks_used: self.chunks_used,
            selected: None,
        };

        Ok(SearchOutcome { paths, report })
    }
}

/// Number of distinct first-move positions across a path set.
fn distinct_first_moves(paths: &[Path]) -> u64 {
    let mut seen: Vec<GridVector> = Vec::new();
    for path in paths {
        if let Some(first) = path.first() {
            if !seen.contains(&first.position) {
                seen.push(first.position);
            }
        }
    }
    seen.len() as u64
}
