//! Slipstream Search: the deterministic path search-and-selection engine.
//!
//! Every turn the racer picks one of nine relative accelerations. This crate
//! owns everything between "where am I" and "which move": breadth-first
//! expansion of the move tree to a bounded depth, multi-factor scoring of
//! candidate moves, a layered pruning policy with liveness guarantees, a
//! time-sliced execution model that spreads search cost across frames,
//! context-dependent best-path selection, and a multi-tier emergency fallback
//! that always produces a legal, displacing move.
//!
//! # Crate dependency graph
//!
//! ```text
//! slipstream-kernel  ←  slipstream-search  ←  slipstream-harness
//! (grid math)           (engine core)         (worlds, runner)
//! ```
//!
//! # Key types
//!
//! - [`contract::TerrainModelV1`] / [`contract::MoveProviderV1`] — injected
//!   collaborator traits; the engine never discovers them ambiently
//! - [`node::Path`] / [`node::PathNode`] — a scored candidate move sequence
//! - [`policy::SearchConfigV1`] — immutable per-search configuration snapshot
//! - [`search::PathSearch`] — the resumable chunked search state machine
//! - [`select::PathSelector`] — context-dependent best-path selection
//! - [`executor::MoveExecutor`] — move execution with the emergency fallback ladder
//! - [`report::SearchReportV1`] — canonical-JSON diagnostics artifact

#![forbid(unsafe_code)]

pub mod canon;
pub mod contract;
pub mod error;
pub mod executor;
pub mod frontier;
pub mod node;
pub mod policy;
pub mod prune;
pub mod report;
pub mod scorer;
pub mod search;
pub mod select;
