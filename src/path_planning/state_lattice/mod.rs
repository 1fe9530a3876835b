//! State Lattice Node Module
//!
//! This module implements the search-node model of a state lattice planner:
//! the encoding of (x, y, heading bin) states into integer indices, the
//! shared motion primitive table, node expansion and admissible heuristics.
//! The A* engine, the collision oracle and the node pool live elsewhere and
//! are reached through the [`CollisionChecker`](crate::common::CollisionChecker)
//! and [`NodePool`](crate::common::NodePool) traits.
//!
//! # Components
//!
//! - `index`: lattice index codec
//! - `primitive_library`: primitive library file format and loading
//! - `motion_table`: immutable motion table snapshots and their cache
//! - `node_lattice`: the search node and its operations
//! - `expansion`: successor generation
//! - `heuristic`: distance and wavefront heuristic tables
//! - `node_pool`: a hash map backed node pool
//!
//! # Example
//!
//! ```no_run
//! use lattice_planning::path_planning::state_lattice::{LatticeConfig, MotionTableCache};
//!
//! let config = LatticeConfig::from_toml_file("lattice.toml").unwrap();
//! let mut cache = MotionTableCache::default();
//! let table = cache.build(200, &config).unwrap();
//! println!("{} primitives over {} headings", table.primitives().len(), table.num_angle_bins());
//! ```
//!
//! # References
//!
//! - "Generating Near Minimal Spanning Control Sets for Constrained Motion Planning
//!   in Discrete State Spaces", Pivtoraiko and Kelly

pub mod config;
pub mod expansion;
pub mod heuristic;
pub mod index;
pub mod motion_model;
pub mod motion_table;
pub mod node_lattice;
pub mod node_pool;
pub mod primitive_library;

// Re-exports
pub use config::{LatticeConfig, TraversalCostParams};
pub use expansion::get_neighbors;
pub use heuristic::{
    heuristic_cost, DistanceHeuristicTable, HeuristicTables, WavefrontTable, DIAGONAL_FACTOR,
    WAVEFRONT_SENTINEL,
};
pub use index::{LatticeIndexer, NodeIndex};
pub use motion_model::MotionModel;
pub use motion_table::{LatticeMotionTable, MotionTableCache};
pub use node_lattice::LatticeNode;
pub use node_pool::NodeArena;
pub use primitive_library::{
    signed_bin_difference, JsonPrimitiveLoader, LatticeFile, LatticeFileMetadata,
    LatticeFilePrimitive, LatticeMetadata, MotionPrimitive, PrimitiveLoader, PrimitiveSet,
};
