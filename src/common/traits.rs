//! Common traits defining the capabilities the lattice core consumes

use crate::path_planning::state_lattice::{LatticeNode, NodeIndex};

/// Collision oracle queried by node validity checks
///
/// Implementations report any internal failure (off-map query, missing
/// transform, stale sensor data) as a collision so the candidate is simply
/// dropped from expansion.
pub trait CollisionChecker {
    /// Check a continuous pose. `theta` is in radians.
    fn in_collision(&mut self, x: f64, y: f64, theta: f64, traverse_unknown: bool) -> bool;

    /// Traversal cost of the cell from the last query that reported no collision
    fn cost(&self) -> f64;
}

/// Pool of search nodes addressed by lattice index
///
/// Within one search the same index must always resolve to the same node.
pub trait NodePool {
    /// Return the node for `index`, allocating it on first reference.
    /// The flag is `true` when the node already existed.
    fn get_or_allocate(&mut self, index: NodeIndex) -> (&mut LatticeNode, bool);
}
