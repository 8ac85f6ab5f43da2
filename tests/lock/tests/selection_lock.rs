//! Selection lock tests: exactly one `Best` per search, context-dependent
//! winners, and loud failure on an empty input set.

use lock_tests::{run_to_outcome, ScriptedProvider, UniformOracle};
use slipstream_kernel::{GridVector, WorldPoint};
use slipstream_search::contract::{RaceTargets, TerrainModelV1};
use slipstream_search::error::SearchError;
use slipstream_search::node::PathQuality;
use slipstream_search::policy::SearchConfigV1;
use slipstream_search::scorer::ScoreContext;
use slipstream_search::search::PathSearch;
use slipstream_search::select::PathSelector;

#[test]
fn exactly_one_best_path_per_search() {
    let oracle = UniformOracle { quality: 0.9 };
    let position = GridVector::new(0, 0);
    let velocity = GridVector::new(1, 0);
    let mut provider = ScriptedProvider::neighborhood(position, velocity);
    let search = PathSearch::start(
        SearchConfigV1::default(),
        &oracle,
        &mut provider,
        position,
        velocity,
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate");

    let outcome = run_to_outcome(search);
    assert!(
        outcome.paths.iter().all(|p| p.quality != PathQuality::Best),
        "no path carries Best before selection"
    );
    let winner = PathSelector::new(ScoreContext::Checkpoint)
        .select(outcome.paths)
        .expect("non-empty set selects");
    assert_eq!(winner.quality, PathQuality::Best);
}

#[test]
fn a_single_path_is_returned_best_not_filtered_away() {
    let oracle = UniformOracle { quality: 0.9 };
    let mut provider = ScriptedProvider::new(vec![GridVector::new(1, 0)]);
    let config = SearchConfigV1 {
        max_depth: 1,
        ..SearchConfigV1::default()
    };
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
    assert_eq!(outcome.paths.len(), 1);
    let single_first = outcome.paths[0].first().expect("path has nodes").position;

    let winner = PathSelector::new(ScoreContext::Checkpoint)
        .select(outcome.paths)
        .expect("a single path must survive selection");
    assert_eq!(winner.quality, PathQuality::Best);
    assert_eq!(winner.first().expect("winner has nodes").position, single_first);
}

#[test]
fn no_path_set_survives_empty_selection() {
    let selector = PathSelector::new(ScoreContext::Checkpoint);
    assert!(matches!(
        selector.select(Vec::new()),
        Err(SearchError::EmptyPathSet)
    ));
}

#[test]
fn checkpoint_winner_heads_toward_the_target() {
    let oracle = UniformOracle { quality: 0.9 };
    let position = GridVector::new(0, 0);
    let velocity = GridVector::new(1, 0);
    let target = WorldPoint::new(10.0, 0.0);
    let mut provider = ScriptedProvider::neighborhood(position, velocity);
    let search = PathSearch::start(
        SearchConfigV1::default(),
        &oracle,
        &mut provider,
        position,
        velocity,
        RaceTargets::checkpoint(target),
    )
    .expect("config must validate");

    let outcome = run_to_outcome(search);
    let winner = PathSelector::new(ScoreContext::Checkpoint)
        .select(outcome.paths)
        .expect("non-empty set selects");
    let first = winner.first().expect("winner has nodes");

    assert!(
        first.position.x > position.x,
        "the winning first move must progress toward the target, got {:?}",
        first.position
    );
}

#[test]
fn recovery_winner_reaches_good_terrain_when_one_exists() {
    struct HalfGravel;
    impl TerrainModelV1 for HalfGravel {
        fn quality_at(&self, p: WorldPoint) -> f64 {
            if p.y > 0.1 {
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
        fn nearest_good_terrain(&self, p: WorldPoint) -> WorldPoint {
            WorldPoint::new(p.x, 0.5)
        }
        fn turn_difficulty(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
            0.0
        }
    }

    let oracle = HalfGravel;
    let position = GridVector::new(0, 0);
    let velocity = GridVector::new(1, 0);
    let mut provider = ScriptedProvider::neighborhood(position, velocity);
    let search = PathSearch::start(
        SearchConfigV1::default(),
        &oracle,
        &mut provider,
        position,
        velocity,
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate");

    assert_eq!(search.context(), ScoreContext::Recovery);
    let outcome = run_to_outcome(search);
    let winner = PathSelector::new(ScoreContext::Recovery)
        .select(outcome.paths)
        .expect("non-empty set selects");

    assert!(
        winner.has_good_terrain_node(),
        "recovery selection must pick a path that reaches asphalt"
    );
}
