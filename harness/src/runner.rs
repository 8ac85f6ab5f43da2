//! Harness runner: drives one turn through the engine pipeline.
//!
//! The runner uses ONLY engine APIs: `PathSearch::start`, `run_chunk`,
//! `finish`, `PathSelector::select`, `MoveExecutor::execute`. It does not
//! implement any search logic itself.
//!
//! # Pipeline
//!
//! ```text
//! begin_turn() → [poll() × N, one per scheduling quantum]
//!   → complete_turn() → select → execute → TurnOutcome (with report)
//! ```
//!
//! Exactly one turn may be active at a time; the runner owns the in-flight
//! search state and rejects re-entrant `begin_turn` calls. An active turn
//! may be abandoned between chunks; the next turn starts from fresh state.

use slipstream_kernel::GridVector;
use slipstream_search::contract::{MoveProviderV1, RaceTargets, TerrainModelV1};
use slipstream_search::error::SearchError;
use slipstream_search::executor::{ChosenMove, MoveExecutor};
use slipstream_search::node::Path;
use slipstream_search::policy::SearchConfigV1;
use slipstream_search::report::{SearchReportV1, SelectedPathSummary};
use slipstream_search::search::{PathSearch, Progress};
use slipstream_search::select::PathSelector;

/// Error during a harness turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// `begin_turn` while another turn is active (re-entrancy).
    SearchInProgress,
    /// `poll` or `complete_turn` with no active turn.
    NoActiveTurn,
    /// Engine error (validation or caller contract violation).
    Search(SearchError),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SearchInProgress => write!(f, "a search is already in progress"),
            Self::NoActiveTurn => write!(f, "no turn is active"),
            Self::Search(e) => write!(f, "search error: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {}

impl From<SearchError> for RunnerError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// Everything one completed turn produces.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The single legal move to execute.
    pub chosen: ChosenMove,
    /// The selected path, quality raised to `Best`.
    pub best_path: Path,
    /// The per-search report, with the selection summary filled in.
    pub report: SearchReportV1,
}

struct PendingTurn<'w> {
    search: PathSearch<'w>,
    targets: RaceTargets,
    position: GridVector,
    velocity: GridVector,
}

/// Orchestrates turns for one racer over one world.
pub struct RaceRunner<'w> {
    oracle: &'w dyn TerrainModelV1,
    config: SearchConfigV1,
    pending: Option<PendingTurn<'w>>,
}

impl<'w> RaceRunner<'w> {
    #[must_use]
    pub fn new(oracle: &'w dyn TerrainModelV1, config: SearchConfigV1) -> Self {
        Self { oracle, config, pending: None }
    }

    /// Start a turn's search. The provider is queried once, here.
    ///
    /// # Errors
    ///
    /// [`RunnerError::SearchInProgress`] if a turn is already active;
    /// engine validation errors otherwise.
    pub fn begin_turn(
        &mut self,
        provider: &mut dyn MoveProviderV1,
        position: GridVector,
        velocity: GridVector,
        targets: RaceTargets,
    ) -> Result<(), RunnerError> {
        if self.pending.is_some() {
            return Err(RunnerError::SearchInProgress);
        }
        let search = PathSearch::start(
            self.config.clone(),
            self.oracle,
            provider,
            position,
            velocity,
            targets,
        )?;
        self.pending = Some(PendingTurn { search, targets, position, velocity });
        Ok(())
    }

    /// Advance the active search by one scheduling quantum.
    ///
    /// # Errors
    ///
    /// [`RunnerError::NoActiveTurn`] if nothing is active.
    pub fn poll(&mut self) -> Result<Progress, RunnerError> {
        let turn = self.pending.as_mut().ok_or(RunnerError::NoActiveTurn)?;
        Ok(turn.search.run_chunk())
    }

    /// Abandon the active turn, if any. The engine builds all per-search
    /// state fresh in `begin_turn`, so nothing leaks into the next turn.
    pub fn abandon_turn(&mut self) {
        self.pending = None;
    }

    /// Finish the active turn: fallback ladder, selection, execution.
    ///
    /// The turn stays active if the search has not drained its frontier,
    /// so the host can keep polling.
    ///
    /// # Errors
    ///
    /// [`RunnerError::NoActiveTurn`]; [`SearchError::SearchStillRunning`]
    /// via [`RunnerError::Search`] when called early.
    pub fn complete_turn(
        &mut self,
        provider: &mut dyn MoveProviderV1,
    ) -> Result<TurnOutcome, RunnerError> {
        let turn = self.pending.take().ok_or(RunnerError::NoActiveTurn)?;
        if !turn.search.is_done() {
            let err = RunnerError::Search(SearchError::SearchStillRunning);
            self.pending = Some(turn);
            return Err(err);
        }

        let context = turn.search.context();
        let outcome = turn.search.finish()?;
        let best = PathSelector::new(context).select(outcome.paths)?;

        let mut report = outcome.report;
        report.selected = SelectedPathSummary::of(&best);

        let executor = MoveExecutor::new(self.oracle, turn.targets);
        // Stationary exclusion: a turn must displace the racer; the
        // executor re-admits the current tile only if exclusion would
        // leave it with no candidate at all.
        let chosen = executor.execute(Some(&best), provider, turn.position, turn.velocity, true);

        Ok(TurnOutcome { chosen, best_path: best, report })
    }

    /// Run a whole turn synchronously: begin, drain, complete.
    ///
    /// # Errors
    ///
    /// Same as the individual phases.
    pub fn run_turn(
        &mut self,
        provider: &mut dyn MoveProviderV1,
        position: GridVector,
        velocity: GridVector,
        targets: RaceTargets,
    ) -> Result<TurnOutcome, RunnerError> {
        self.begin_turn(provider, position, velocity, targets)?;
        let delay = self.config.chunk_delay_ms;
        while self.poll()? == Progress::Continue {
            if delay > 0 {
                std::thread::sleep(std::time::Duration::from_millis(delay));
            }
        }
        self.complete_turn(provider)
    }
}
