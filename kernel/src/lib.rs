//! Slipstream Kernel: pure value types for the grid-racing decision engine.
//!
//! Movement and velocity are integral in a fixed-point grid unit; world-space
//! positions are grid values divided by [`grid::GRID_SCALE`]. Everything here
//! is an immutable value type with no collaborators and no hidden state —
//! higher layers (`slipstream-search`, `slipstream-harness`) depend on this
//! crate, never the other way around.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod grid;

pub use grid::{offsets_3x3, GridVector, WorldPoint, GRID_SCALE};
