//! Lattice search node
//!
//! A node is one (cell, heading bin) state. Nodes are pooled by index and
//! recycled between searches with [`LatticeNode::reset`]; the predecessor is a
//! plain index into the pool, never an owning reference.

use crate::common::{CollisionChecker, Coordinates, NodePool};

use super::expansion;
use super::heuristic::{self, HeuristicTables};
use super::index::NodeIndex;
use super::motion_table::LatticeMotionTable;

#[derive(Debug, Clone, PartialEq)]
pub struct LatticeNode {
    index: NodeIndex,
    pose: Coordinates,
    /// Cost of the cell under the node, set by a successful validity check
    cell_cost: Option<f64>,
    accumulated_cost: f64,
    was_visited: bool,
    is_queued: bool,
    parent: Option<NodeIndex>,
    motion_primitive_id: Option<u32>,
}

impl LatticeNode {
    pub fn new(index: NodeIndex) -> Self {
        Self {
            index,
            pose: Coordinates::origin(),
            cell_cost: None,
            accumulated_cost: f64::INFINITY,
            was_visited: false,
            is_queued: false,
            parent: None,
            motion_primitive_id: None,
        }
    }

    /// Restore the pristine state, keeping the index
    pub fn reset(&mut self) {
        *self = Self::new(self.index);
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn pose(&self) -> Coordinates {
        self.pose
    }

    pub fn set_pose(&mut self, pose: Coordinates) {
        self.pose = pose;
    }

    pub fn cell_cost(&self) -> Option<f64> {
        self.cell_cost
    }

    pub fn accumulated_cost(&self) -> f64 {
        self.accumulated_cost
    }

    pub fn set_accumulated_cost(&mut self, cost: f64) {
        self.accumulated_cost = cost;
    }

    pub fn was_visited(&self) -> bool {
        self.was_visited
    }

    /// Close the node; called by the search engine when it pops the node
    pub fn visited(&mut self) {
        self.was_visited = true;
        self.is_queued = false;
    }

    pub fn is_queued(&self) -> bool {
        self.is_queued
    }

    pub fn queued(&mut self) {
        self.is_queued = true;
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<NodeIndex>) {
        self.parent = parent;
    }

    pub fn motion_primitive_id(&self) -> Option<u32> {
        self.motion_primitive_id
    }

    pub fn set_motion_primitive_id(&mut self, id: u32) {
        self.motion_primitive_id = Some(id);
    }

    /// Query the collision checker at this node's pose.
    ///
    /// On success the checker's cost is cached on the node. On collision the
    /// cached cost is left untouched.
    pub fn is_node_valid<C: CollisionChecker + ?Sized>(
        &mut self,
        traverse_unknown: bool,
        collision_checker: &mut C,
        table: &LatticeMotionTable,
    ) -> bool {
        let pose = self.pose.to_pose(table.bin_size());
        if collision_checker.in_collision(pose.x, pose.y, pose.yaw, traverse_unknown) {
            return false;
        }

        self.cell_cost = Some(collision_checker.cost());
        true
    }

    /// Cost of moving from this node to `child` along the child's primitive
    pub fn traversal_cost(&self, child: &LatticeNode, table: &LatticeMotionTable) -> f64 {
        match child.motion_primitive_id.and_then(|id| table.primitive(id)) {
            Some(primitive) if primitive.start_heading == self.pose.theta => {
                table.primitive_cost(primitive)
            }
            // not a primitive this node can take, so the child was not
            // expanded from here
            _ => table.neutral_cost(),
        }
    }

    /// Admissible estimate of the remaining cost from `node_coords` to `goal_coords`
    pub fn heuristic_cost(
        node_coords: &Coordinates,
        goal_coords: &Coordinates,
        table: &LatticeMotionTable,
        heuristics: &HeuristicTables,
    ) -> f64 {
        heuristic::heuristic_cost(node_coords, goal_coords, table, heuristics)
    }

    /// Valid, unvisited successors of the node at `index`, in primitive order
    pub fn get_neighbors<P, C>(
        index: NodeIndex,
        pool: &mut P,
        collision_checker: &mut C,
        traverse_unknown: bool,
        table: &LatticeMotionTable,
    ) -> Vec<NodeIndex>
    where
        P: NodePool + ?Sized,
        C: CollisionChecker + ?Sized,
    {
        expansion::get_neighbors(index, pool, collision_checker, traverse_unknown, table)
    }
}
