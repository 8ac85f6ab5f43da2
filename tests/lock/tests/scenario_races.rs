//! Scenario lock tests: multi-turn races over the harness worlds, driving
//! the full pipeline (search → select → execute) turn after turn.

use slipstream_harness::runner::RaceRunner;
use slipstream_harness::worlds::gravel_trap::GravelTrap;
use slipstream_harness::worlds::oval_circuit::OvalCircuit;
use slipstream_harness::worlds::TrackMoveProvider;
use slipstream_kernel::GridVector;
use slipstream_search::contract::{RaceTargets, TerrainModelV1};
use slipstream_search::policy::SearchConfigV1;
use slipstream_search::scorer::ScoreContext;

/// One racer state, advanced by applying chosen moves verbatim.
struct Racer {
    position: GridVector,
    velocity: GridVector,
}

#[test]
fn oval_racer_closes_on_the_first_checkpoint() {
    let world = OvalCircuit::standard();
    let (min, max) = world.bounds();
    let mut provider = TrackMoveProvider::new(min, max);
    let mut runner = RaceRunner::new(&world, SearchConfigV1::default());

    let checkpoint = world.checkpoints()[0];
    let targets = RaceTargets::checkpoint(checkpoint);
    let mut racer = Racer { position: world.start_position(), velocity: GridVector::new(0, 1) };
    let initial_distance = racer.position.to_world().distance(checkpoint);

    for turn in 0..10 {
        let outcome = runner
            .run_turn(&mut provider, racer.position, racer.velocity, targets)
            .unwrap_or_else(|e| panic!("turn {turn} failed: {e}"));
        assert!(outcome.chosen.is_displacing(), "turn {turn} did not move");
        racer.position = outcome.chosen.target;
        racer.velocity = outcome.chosen.velocity;
    }

    let final_distance = racer.position.to_world().distance(checkpoint);
    assert!(
        final_distance < initial_distance,
        "ten turns must close on the checkpoint: {initial_distance} -> {final_distance}"
    );
}

#[test]
fn oval_racer_stays_on_asphalt() {
    let world = OvalCircuit::standard();
    let (min, max) = world.bounds();
    let mut provider = TrackMoveProvider::new(min, max);
    let mut runner = RaceRunner::new(&world, SearchConfigV1::default());

    let targets = RaceTargets::checkpoint(world.checkpoints()[0]);
    let mut racer = Racer { position: world.start_position(), velocity: GridVector::new(0, 1) };

    let mut off_track_turns = 0;
    for turn in 0..10 {
        let outcome = runner
            .run_turn(&mut provider, racer.position, racer.velocity, targets)
            .unwrap_or_else(|e| panic!("turn {turn} failed: {e}"));
        racer.position = outcome.chosen.target;
        racer.velocity = outcome.chosen.velocity;
        if world.quality_at(racer.position.to_world()) < 0.5 {
            off_track_turns += 1;
        }
    }
    assert!(
        off_track_turns <= 3,
        "a clear ring should rarely be left, got {off_track_turns} off-track turns"
    );
}

#[test]
fn gravel_trap_racer_recovers_onto_asphalt() {
    let world = GravelTrap::standard();
    let (min, max) = world.bounds();
    let mut provider = TrackMoveProvider::new(min, max);
    let mut runner = RaceRunner::new(&world, SearchConfigV1::default());

    let targets = RaceTargets::checkpoint(world.finish());
    let mut racer = Racer { position: world.patch_center(), velocity: GridVector::new(2, 0) };

    let mut recovered_at = None;
    for turn in 0..15 {
        let on_gravel = world.quality_at(racer.position.to_world()) < 0.5;
        let outcome = runner
            .run_turn(&mut provider, racer.position, racer.velocity, targets)
            .unwrap_or_else(|e| panic!("turn {turn} failed: {e}"));
        if on_gravel {
            assert_eq!(
                outcome.report.context,
                ScoreContext::Recovery,
                "turn {turn} on gravel must run in recovery context"
            );
        }
        racer.position = outcome.chosen.target;
        racer.velocity = outcome.chosen.velocity;
        if world.quality_at(racer.position.to_world()) >= 0.5 {
            recovered_at = Some(turn);
            break;
        }
    }

    let turn = recovered_at.expect("the racer must escape the gravel trap within 15 turns");
    assert!(turn < 15);
}

#[test]
fn finish_targeting_engages_the_finish_context() {
    let world = OvalCircuit::standard();
    let (min, max) = world.bounds();
    let mut provider = TrackMoveProvider::new(min, max);
    let mut runner = RaceRunner::new(&world, SearchConfigV1::default());

    let finish = world.checkpoints()[3];
    let outcome = runner
        .run_turn(
            &mut provider,
            world.start_position(),
            GridVector::new(0, 1),
            RaceTargets::finish(finish),
        )
        .expect("finish-line turn must succeed");

    assert_eq!(outcome.report.context, ScoreContext::FinishLine);
    assert!(outcome.chosen.is_displacing());
}

#[test]
fn turn_reports_stay_bound_to_one_config() {
    let world = GravelTrap::standard();
    let (min, max) = world.bounds();
    let mut provider = TrackMoveProvider::new(min, max);
    let config = SearchConfigV1::default();
    let mut runner = RaceRunner::new(&world, config.clone());

    let targets = RaceTargets::checkpoint(world.finish());
    let mut racer = Racer { position: world.start_position(), velocity: GridVector::new(1, 0) };

    for turn in 0..5 {
        let outcome = runner
            .run_turn(&mut provider, racer.position, racer.velocity, targets)
            .unwrap_or_else(|e| panic!("turn {turn} failed: {e}"));
        assert_eq!(outcome.report.config_digest, config.digest());
        racer.position = outcome.chosen.target;
        racer.velocity = outcome.chosen.velocity;
    }
}
