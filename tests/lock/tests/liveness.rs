//! Liveness lock tests: the engine never returns an empty path set while a
//! legal first move exists, and the executor always produces a move.

use lock_tests::{run_to_outcome, ScriptedProvider, UniformOracle};
use slipstream_kernel::{GridVector, WorldPoint};
use slipstream_search::contract::RaceTargets;
use slipstream_search::error::SearchError;
use slipstream_search::executor::MoveExecutor;
use slipstream_search::policy::SearchConfigV1;
use slipstream_search::search::PathSearch;

fn start<'a>(
    config: SearchConfigV1,
    oracle: &'a UniformOracle,
    provider: &mut ScriptedProvider,
) -> PathSearch<'a> {
    PathSearch::start(
        config,
        oracle,
        provider,
        GridVector::new(0, 0),
        GridVector::new(1, 0),
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate")
}

// ---------------------------------------------------------------------------
// Non-empty result under hostile pruning configurations
// ---------------------------------------------------------------------------

#[test]
fn hostile_score_threshold_still_yields_paths() {
    let oracle = UniformOracle { quality: 0.9 };
    let config = SearchConfigV1 {
        score_threshold: 0.95,
        min_first_move_keep: 1,
        ..SearchConfigV1::default()
    };
    let mut provider =
        ScriptedProvider::neighborhood(GridVector::new(0, 0), GridVector::new(1, 0));

    let outcome = run_to_outcome(start(config, &oracle, &mut provider));
    assert!(
        !outcome.paths.is_empty(),
        "a legal first move existed, so the result set must be non-empty"
    );
}

#[test]
fn single_legal_move_yields_a_path() {
    let oracle = UniformOracle { quality: 0.9 };
    let mut provider = ScriptedProvider::new(vec![GridVector::new(1, 0)]);

    let outcome = run_to_outcome(start(SearchConfigV1::default(), &oracle, &mut provider));
    assert!(!outcome.paths.is_empty());
    let first = outcome.paths[0].first().expect("path has nodes");
    assert_eq!(first.position, GridVector::new(1, 0));
}

#[test]
fn zero_candidate_query_synthesizes_and_yields_paths() {
    let oracle = UniformOracle { quality: 0.9 };
    let mut provider = ScriptedProvider::new(Vec::new());

    let outcome = run_to_outcome(start(SearchConfigV1::default(), &oracle, &mut provider));
    assert!(
        !outcome.paths.is_empty(),
        "synthesized neighborhood must keep the search alive"
    );
}

#[test]
fn every_path_stays_within_max_depth() {
    let oracle = UniformOracle { quality: 0.9 };
    let config = SearchConfigV1 {
        max_depth: 3,
        ..SearchConfigV1::default()
    };
    let mut provider =
        ScriptedProvider::neighborhood(GridVector::new(0, 0), GridVector::new(1, 0));

    let outcome = run_to_outcome(start(config, &oracle, &mut provider));
    for path in &outcome.paths {
        assert!(path.nodes.len() <= 3, "path exceeded the configured depth");
        assert!(!path.nodes.is_empty(), "completed paths are never empty");
    }
}

#[test]
fn diversity_minimum_is_met_when_enough_seeds_exist() {
    let oracle = UniformOracle { quality: 0.9 };
    let config = SearchConfigV1::default();
    let minimum = u64::from(config.min_path_diversity);
    let mut provider =
        ScriptedProvider::neighborhood(GridVector::new(0, 0), GridVector::new(1, 0));

    let outcome = run_to_outcome(start(config, &oracle, &mut provider));
    assert!(
        outcome.report.distinct_first_moves >= minimum,
        "nine seeds must produce at least {minimum} distinct first moves, got {}",
        outcome.report.distinct_first_moves
    );
}

// ---------------------------------------------------------------------------
// Total-elimination rescue: every expansion with candidates keeps a child
// ---------------------------------------------------------------------------

#[test]
fn total_elimination_rescues_one_child_per_expansion() {
    use slipstream_search::contract::TerrainModelV1;

    // Good terrain, but every deep branch trips the lookahead limit, so
    // beyond depth 1 all nine children of every expansion are pruned.
    struct DoomedLookahead;
    impl TerrainModelV1 for DoomedLookahead {
        fn quality_at(&self, _p: WorldPoint) -> f64 {
            0.9
        }
        fn center_affinity_at(&self, _p: WorldPoint) -> f64 {
            0.5
        }
        fn exit_risk(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
            0.1
        }
        fn lookahead_exit_risk(&self, _p: WorldPoint, _heading: GridVector, _steps: u32) -> f64 {
            1.0
        }
        fn nearest_good_terrain(&self, p: WorldPoint) -> WorldPoint {
            p
        }
        fn turn_difficulty(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
            0.0
        }
    }

    let oracle = DoomedLookahead;
    let config = SearchConfigV1::default();
    let max_depth = config.max_depth;
    let mut provider =
        ScriptedProvider::neighborhood(GridVector::new(0, 0), GridVector::new(1, 0));
    let search = PathSearch::start(
        config,
        &oracle,
        &mut provider,
        GridVector::new(0, 0),
        GridVector::new(1, 0),
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate");

    let outcome = run_to_outcome(search);
    assert!(
        outcome.report.counters.rescued_expansions > 0,
        "total elimination must trigger the rescue"
    );
    assert!(
        outcome
            .paths
            .iter()
            .any(|p| p.nodes.len() as u32 == max_depth),
        "rescued branches must still reach full depth"
    );
    let c = outcome.report.counters;
    assert_eq!(
        c.pruned_by_terrain
            + c.pruned_by_score
            + c.pruned_by_lookahead
            + c.pruned_by_inefficiency
            + c.pruned_by_speed,
        c.total_pruned,
        "reason tallies must sum to the total even after rescues"
    );
}

// ---------------------------------------------------------------------------
// Config validation fails fast
// ---------------------------------------------------------------------------

#[test]
fn zero_depth_config_is_rejected_at_start() {
    let oracle = UniformOracle { quality: 0.9 };
    let config = SearchConfigV1 {
        max_depth: 0,
        ..SearchConfigV1::default()
    };
    let mut provider = ScriptedProvider::new(vec![GridVector::new(1, 0)]);

    let result = PathSearch::start(
        config,
        &oracle,
        &mut provider,
        GridVector::new(0, 0),
        GridVector::new(1, 0),
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    );
    assert!(matches!(result, Err(SearchError::InvalidConfig { .. })));
}

// ---------------------------------------------------------------------------
// The executor always produces exactly one move
// ---------------------------------------------------------------------------

#[test]
fn executor_moves_even_with_no_path_and_no_legal_moves() {
    let oracle = UniformOracle { quality: 0.9 };
    let exec = MoveExecutor::new(&oracle, RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)));
    let mut provider = ScriptedProvider::new(Vec::new());

    let chosen = exec.execute(
        None,
        &mut provider,
        GridVector::new(2, 2),
        GridVector::new(1, 0),
        true,
    );
    assert!(chosen.is_displacing(), "the fallback ladder must end in a move");
}
