//! lattice_planning - state lattice search nodes in Rust
//!
//! This crate provides the node model of a state lattice planner: index
//! encoding, motion primitive tables, node expansion and heuristics, plus a
//! grid costmap collision checker to drive them.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;

#[cfg(test)]
mod test_utils;

// Re-export common types for convenience
pub use common::{Coordinates, Pose2D, PoseDelta, TrigValues};
pub use common::{CollisionChecker, NodePool};
pub use common::{LatticeError, LatticeResult};
