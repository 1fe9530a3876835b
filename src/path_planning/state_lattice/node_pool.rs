//! Arena of lattice nodes keyed by lattice index

use std::collections::HashMap;

use crate::common::{Coordinates, NodePool};

use super::index::NodeIndex;
use super::node_lattice::LatticeNode;

/// Node storage for one search; recycled between searches with
/// [`NodeArena::reset_all`]
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: HashMap<NodeIndex, LatticeNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, index: NodeIndex) -> Option<&LatticeNode> {
        self.nodes.get(&index)
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut LatticeNode> {
        self.nodes.get_mut(&index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reset every node in place, keeping the allocations
    pub fn reset_all(&mut self) {
        self.nodes.values_mut().for_each(LatticeNode::reset);
    }

    /// Poses from the root to `index`, following predecessor indices
    pub fn backtrace(&self, index: NodeIndex) -> Vec<Coordinates> {
        let mut path = Vec::new();
        let mut current = Some(index);

        while let Some(i) = current {
            let node = match self.nodes.get(&i) {
                Some(node) => node,
                None => break,
            };
            path.push(node.pose());
            // a predecessor cycle would mean a corrupted search tree
            if path.len() > self.nodes.len() {
                debug_assert!(false, "predecessor cycle through node {}", i);
                break;
            }
            current = node.parent();
        }

        path.reverse();
        path
    }
}

impl NodePool for NodeArena {
    fn get_or_allocate(&mut self, index: NodeIndex) -> (&mut LatticeNode, bool) {
        let existed = self.nodes.contains_key(&index);
        let node = self
            .nodes
            .entry(index)
            .or_insert_with(|| LatticeNode::new(index));
        (node, existed)
    }
}
