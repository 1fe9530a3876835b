//! Node expansion through the motion primitive table

use tracing::{trace, warn};

use crate::common::{CollisionChecker, Coordinates, NodePool};

use super::index::NodeIndex;
use super::motion_table::LatticeMotionTable;
use super::primitive_library::MotionPrimitive;

/// Expand the node at `index`.
///
/// Successors come back in primitive declaration order, which is the tie-break
/// order the search observes. Visited successors and successors that fail the
/// collision check are dropped; targets off the grid's lower or left edge (or
/// past its width) are skipped before indexing. Primitives spanning more than
/// one cell must also find the cells they sweep free.
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
    let indexer = table.indexer();
    let pose = {
        let (node, existed) = pool.get_or_allocate(index);
        if !existed {
            let (x, y, theta) = indexer.decode(index);
            warn!(index, x, y, theta, "expanding a node that was never allocated");
            node.set_pose(Coordinates::new(x as f64, y as f64, theta));
        }
        node.pose()
    };
    let size_x = indexer.size_x() as f64;
    let projections = table.projections_for(pose.theta);
    let mut neighbors = Vec::with_capacity(projections.len());

    for primitive in projections {
        let target = table.project(&pose, primitive);
        if target.x < 0.0 || target.y < 0.0 || target.x >= size_x {
            trace!(primitive = primitive.id, x = target.x, y = target.y, "projection off grid");
            continue;
        }

        let neighbor_index = indexer.index(target.x as u32, target.y as u32, target.theta);
        let (neighbor, _) = pool.get_or_allocate(neighbor_index);
        if neighbor.was_visited() {
            continue;
        }

        // Lattice poses are exact bins, but storing them lets backtracking and
        // goal approaches treat every node type alike
        neighbor.set_pose(target);
        if !sweep_is_clear(&pose, primitive, collision_checker, traverse_unknown, table) {
            trace!(primitive = primitive.id, "primitive sweeps an occupied cell");
            continue;
        }
        if neighbor.is_node_valid(traverse_unknown, collision_checker, table) {
            neighbor.set_motion_primitive_id(primitive.id);
            neighbors.push(neighbor_index);
        }
    }

    neighbors
}

/// Cells strictly between the start and end of `primitive` applied at `pose`.
///
/// The cells form an 8-connected chain with one cell per unit of the larger
/// displacement component, so single-cell primitives have none.
pub fn intermediate_cells(
    pose: &Coordinates,
    primitive: &MotionPrimitive,
) -> impl Iterator<Item = (f64, f64)> {
    let (x0, y0) = (pose.x, pose.y);
    let (dx, dy) = (primitive.delta.dx, primitive.delta.dy);
    let steps = dx.abs().max(dy.abs()).round() as i64;
    (1..steps).map(move |i| {
        let t = i as f64 / steps as f64;
        (x0 + (dx * t + 0.5).floor(), y0 + (dy * t + 0.5).floor())
    })
}

/// Whether every intermediate cell of `primitive` applied at `pose` is free
pub fn sweep_is_clear<C: CollisionChecker + ?Sized>(
    pose: &Coordinates,
    primitive: &MotionPrimitive,
    collision_checker: &mut C,
    traverse_unknown: bool,
    table: &LatticeMotionTable,
) -> bool {
    let yaw = pose.theta as f64 * table.bin_size();
    intermediate_cells(pose, primitive)
        .all(|(x, y)| !collision_checker.in_collision(x, y, yaw, traverse_unknown))
}
