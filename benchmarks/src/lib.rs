//! Shared helpers for slipstream benchmark suites.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use slipstream_harness::worlds::oval_circuit::OvalCircuit;
use slipstream_harness::worlds::TrackMoveProvider;
use slipstream_kernel::GridVector;
use slipstream_search::contract::RaceTargets;
use slipstream_search::policy::SearchConfigV1;
use slipstream_search::search::{PathSearch, Progress, SearchOutcome};

/// Prepared inputs for driving one search over the standard circuit.
pub struct SearchSetup {
    pub world: OvalCircuit,
    pub position: GridVector,
    pub velocity: GridVector,
    pub targets: RaceTargets,
}

/// One racer state on the standard circuit, positioned at the start.
#[must_use]
pub fn circuit_setup() -> SearchSetup {
    let world = OvalCircuit::standard();
    let position = world.start_position();
    let targets = RaceTargets::checkpoint(world.checkpoints()[0]);
    SearchSetup {
        world,
        position,
        velocity: GridVector::new(0, 1),
        targets,
    }
}

/// A provider clipped to the setup's world bounds.
#[must_use]
pub fn circuit_provider(setup: &SearchSetup) -> TrackMoveProvider {
    let (min, max) = setup.world.bounds();
    TrackMoveProvider::new(min, max)
}

/// Run one full search to its outcome, draining chunks synchronously.
///
/// # Panics
///
/// Propagates engine errors as panics; benchmark inputs are always valid.
#[must_use]
pub fn run_search_once(setup: &SearchSetup, config: SearchConfigV1) -> SearchOutcome {
    let mut provider = circuit_provider(setup);
    let mut search = PathSearch::start(
        config,
        &setup.world,
        &mut provider,
        setup.position,
        setup.velocity,
        setup.targets,
    )
    .expect("benchmark config is valid");
    while search.run_chunk() == Progress::Continue {}
    search.finish().expect("benchmark search finishes")
}
