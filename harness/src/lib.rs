//! Slipstream Harness: race-world orchestration for the search engine.
//!
//! The harness runs a turn through the engine's pipeline
//! (`PathSearch::start` → `run_chunk` × N → `finish` → select → execute)
//! and persists the per-search report artifact.
//!
//! The harness does NOT implement search logic — it delegates to the
//! engine. Worlds provide terrain geometry and legal moves only; the
//! harness owns orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod report_dir;
pub mod runner;
pub mod worlds;
