//! Gravel semantics lock tests: the speed cap, the off-track chain
//! invariant, recovery context priority, and the inevitability shortcut.

use lock_tests::{run_to_outcome, ScriptedProvider, UniformOracle};
use slipstream_kernel::{GridVector, WorldPoint};
use slipstream_search::contract::RaceTargets;
use slipstream_search::policy::SearchConfigV1;
use slipstream_search::scorer::{MoveEvaluator, ScoreContext};
use slipstream_search::search::PathSearch;

// ---------------------------------------------------------------------------
// Context resolution priority: recovery beats finish-line targeting
// ---------------------------------------------------------------------------

#[test]
fn recovery_context_overrides_finish_targeting() {
    let context = ScoreContext::resolve(true, true);
    assert_eq!(context, ScoreContext::Recovery);
    assert_eq!(ScoreContext::resolve(false, true), ScoreContext::FinishLine);
    assert_eq!(ScoreContext::resolve(false, false), ScoreContext::Checkpoint);
}

// ---------------------------------------------------------------------------
// The off-track chain invariant: 0 on good terrain, else parent + 1
// ---------------------------------------------------------------------------

#[test]
fn off_track_counts_form_a_consecutive_chain() {
    let oracle = UniformOracle { quality: 0.3 };
    let mut provider =
        ScriptedProvider::neighborhood(GridVector::new(0, 0), GridVector::new(1, 0));
    let search = PathSearch::start(
        SearchConfigV1::default(),
        &oracle,
        &mut provider,
        GridVector::new(0, 0),
        GridVector::new(1, 0),
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate");

    let outcome = run_to_outcome(search);
    for path in &outcome.paths {
        let mut previous = 0;
        for node in &path.nodes {
            if node.terrain_quality >= 0.5 {
                assert_eq!(node.off_track_count, 0, "good terrain resets the chain");
            } else {
                assert_eq!(
                    node.off_track_count,
                    previous + 1,
                    "degraded terrain extends the parent's chain by one"
                );
            }
            previous = node.off_track_count;
        }
    }
}

// ---------------------------------------------------------------------------
// The gravel speed cap is reproduced exactly in scoring
// ---------------------------------------------------------------------------

#[test]
fn gravel_speed_scoring_pins_the_cap() {
    let oracle = UniformOracle { quality: 0.3 };
    let eval = MoveEvaluator::new(
        SearchConfigV1::default(),
        &oracle,
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
        WorldPoint::new(0.0, 0.0),
        true,
    );

    let at_cap = eval.score_node(None, GridVector::new(1, 1), GridVector::new(1, 1), 1);
    let over = eval.score_node(None, GridVector::new(2, 0), GridVector::new(2, 0), 1);
    let under = eval.score_node(None, GridVector::new(0, 0), GridVector::zero(), 1);

    assert!(
        at_cap.factors.speed > over.factors.speed && at_cap.factors.speed > under.factors.speed,
        "exactly one grid unit must be the best speed on gravel"
    );
    assert!(
        over.factors.speed < under.factors.speed,
        "exceeding the physical cap must score below staying slow"
    );
}

// ---------------------------------------------------------------------------
// Gravel-inevitability shortcut vs. selective recovery
// ---------------------------------------------------------------------------

#[test]
fn all_degraded_candidates_disable_pruning() {
    let oracle = UniformOracle { quality: 0.2 };
    let mut provider =
        ScriptedProvider::neighborhood(GridVector::new(0, 0), GridVector::new(1, 0));
    let search = PathSearch::start(
        SearchConfigV1::default(),
        &oracle,
        &mut provider,
        GridVector::new(0, 0),
        GridVector::new(1, 0),
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate");

    let outcome = run_to_outcome(search);
    assert_eq!(outcome.report.counters.total_pruned, 0);
    assert!(outcome.report.counters.total_generated > 0);
}

#[test]
fn a_single_good_candidate_keeps_pruning_active() {
    struct IslandOracle;
    impl slipstream_search::contract::TerrainModelV1 for IslandOracle {
        fn quality_at(&self, p: WorldPoint) -> f64 {
            // One asphalt tile at grid (2, 1); gravel everywhere else.
            if p.distance(GridVector::new(2, 1).to_world()) < 0.01 {
                0.95
            } else {
                0.3
            }
        }
        fn center_affinity_at(&self, _p: WorldPoint) -> f64 {
            0.5
        }
        fn exit_risk(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
            0.1
        }
        fn lookahead_exit_risk(&self, _p: WorldPoint, _heading: GridVector, _steps: u32) -> f64 {
            0.1
        }
        fn nearest_good_terrain(&self, _p: WorldPoint) -> WorldPoint {
            GridVector::new(2, 1).to_world()
        }
        fn turn_difficulty(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
            0.0
        }
    }

    let oracle = IslandOracle;
    let mut provider =
        ScriptedProvider::neighborhood(GridVector::new(0, 0), GridVector::new(1, 0));
    let search = PathSearch::start(
        SearchConfigV1::default(),
        &oracle,
        &mut provider,
        GridVector::new(0, 0),
        GridVector::new(1, 0),
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate");

    assert_eq!(search.context(), ScoreContext::Recovery);
    let outcome = run_to_outcome(search);
    // The asphalt island among the first-level candidates suppresses the
    // inevitability shortcut, so terrain-tolerance pruning still runs.
    assert!(
        outcome.report.counters.total_pruned > 0,
        "pruning must stay active when a good-terrain candidate exists"
    );
}
