//! Determinism lock tests: identical inputs produce identical path sets and
//! report digests, and chunk size changes scheduling but never results.

use lock_tests::{run_to_outcome, ScriptedProvider, UniformOracle};
use slipstream_kernel::{GridVector, WorldPoint};
use slipstream_search::contract::RaceTargets;
use slipstream_search::node::Path;
use slipstream_search::policy::SearchConfigV1;
use slipstream_search::search::{PathSearch, SearchOutcome};

fn run_once(config: SearchConfigV1, oracle: &UniformOracle) -> SearchOutcome {
    let position = GridVector::new(0, 0);
    let velocity = GridVector::new(1, 0);
    let mut provider = ScriptedProvider::neighborhood(position, velocity);
    let search = PathSearch::start(
        config,
        oracle,
        &mut provider,
        position,
        velocity,
        RaceTargets::checkpoint(WorldPoint::new(10.0, 0.0)),
    )
    .expect("config must validate");
    run_to_outcome(search)
}

/// Order-insensitive comparison key for a path set.
fn path_keys(paths: &[Path]) -> Vec<(Vec<GridVector>, String)> {
    let mut keys: Vec<(Vec<GridVector>, String)> = paths
        .iter()
        .map(|p| {
            (
                p.nodes.iter().map(|n| n.position).collect(),
                format!("{:.12}", p.total_score),
            )
        })
        .collect();
    keys.sort();
    keys
}

#[test]
fn repeated_searches_produce_identical_report_digests() {
    let oracle = UniformOracle { quality: 0.9 };
    let first = run_once(SearchConfigV1::default(), &oracle);
    let first_digest = first.report.digest();

    for _ in 1..10 {
        let other = run_once(SearchConfigV1::default(), &oracle);
        assert_eq!(
            other.report.digest(),
            first_digest,
            "identical inputs must yield byte-identical reports"
        );
    }
}

#[test]
fn repeated_searches_produce_identical_path_sets() {
    let oracle = UniformOracle { quality: 0.9 };
    let first = path_keys(&run_once(SearchConfigV1::default(), &oracle).paths);
    for _ in 1..5 {
        let other = path_keys(&run_once(SearchConfigV1::default(), &oracle).paths);
        assert_eq!(other, first);
    }
}

#[test]
fn chunk_size_never_changes_the_result_set() {
    let oracle = UniformOracle { quality: 0.9 };
    let baseline = run_once(SearchConfigV1::default(), &oracle);

    for chunk in [1, 2, 7, 1000] {
        let config = SearchConfigV1 {
            chunk_max_tasks: chunk,
            ..SearchConfigV1::default()
        };
        let outcome = run_once(config, &oracle);
        assert_eq!(
            path_keys(&outcome.paths),
            path_keys(&baseline.paths),
            "chunk size {chunk} changed the path set"
        );
        assert_eq!(outcome.report.counters, baseline.report.counters);
    }
}

#[test]
fn config_digest_distinguishes_configs() {
    let base = SearchConfigV1::default();
    let tweaked = SearchConfigV1 {
        max_depth: 3,
        ..SearchConfigV1::default()
    };
    assert_ne!(base.digest(), tweaked.digest());
    assert_eq!(base.digest(), SearchConfigV1::default().digest());
}

#[test]
fn report_binds_the_config_snapshot() {
    let oracle = UniformOracle { quality: 0.9 };
    let outcome = run_once(SearchConfigV1::default(), &oracle);
    assert_eq!(outcome.report.config_digest, SearchConfigV1::default().digest());
    assert!(outcome.report.config_digest.starts_with("sha256:"));
}
