//! Heuristic tables for lattice search
//!
//! Two independent lower bounds on the remaining cost are combined with `max`:
//!
//! - a windowed *distance heuristic* giving the obstacle-free primitive cost
//!   from a state near the goal, in the goal's frame. Only non-negative
//!   relative y is stored; negative y is answered by mirroring the heading.
//! - a full-grid *wavefront heuristic* from a breadth expansion over the
//!   costmap, ignoring heading.
//!
//! Both are expressed in units of the neutral cost. Node and goal coordinates
//! are lattice cells.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::time::Instant;

use itertools::iproduct;
use nalgebra::DMatrix;
use ordered_float::OrderedFloat;
use tracing::info;

use crate::common::{Coordinates, LatticeError, LatticeResult, TrigValues};
use crate::utils::Costmap;

use super::motion_table::LatticeMotionTable;
use super::primitive_library::MotionPrimitive;

/// Wavefront value of the goal cell and its neighbors
pub const WAVEFRONT_SENTINEL: u32 = 2;

/// Mean cost of a mixed straight/diagonal 8-connected step, (1 + sqrt(2)) / 2
pub const DIAGONAL_FACTOR: f64 = 1.207;

/// Offset from the goal rotated into the goal's frame, rounded to cells
fn goal_frame_offset(dx: f64, dy: f64, goal_trig: TrigValues) -> (i32, i32) {
    // cos(-th) = cos(th), sin(-th) = -sin(th)
    let (cos_th, sin_th) = (goal_trig.0, -goal_trig.1);
    (
        (dx * cos_th - dy * sin_th).round() as i32,
        (dx * sin_th + dy * cos_th).round() as i32,
    )
}

fn relative_heading(theta: u32, goal_theta: u32, bins: u32) -> u32 {
    (theta as i64 - goal_theta as i64).rem_euclid(bins as i64) as u32
}

/// Obstacle-free primitive cost around a goal, in the goal's frame
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceHeuristicTable {
    size_lookup: usize,
    num_angle_bins: u32,
    /// `[x][y >= 0][theta]`, x offset by half the window
    values: Vec<f64>,
}

impl DistanceHeuristicTable {
    /// Wrap precomputed values laid out as `[size][ceil(size / 2)][bins]`
    pub fn from_values(size_lookup: usize, num_angle_bins: u32, values: Vec<f64>) -> LatticeResult<Self> {
        if size_lookup < 3 {
            return Err(LatticeError::InvalidParameter(format!(
                "heuristic window must be at least 3 cells, got {}",
                size_lookup
            )));
        }
        if num_angle_bins == 0 {
            return Err(LatticeError::InvalidParameter(
                "heuristic table needs at least one heading bin".to_string(),
            ));
        }
        let expected = size_lookup * ceil_half(size_lookup) * num_angle_bins as usize;
        if values.len() != expected {
            return Err(LatticeError::InvalidParameter(format!(
                "distance heuristic has {} values, expected {}",
                values.len(),
                expected
            )));
        }
        if values.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(LatticeError::InvalidParameter(
                "distance heuristic values must be finite and non-negative".to_string(),
            ));
        }
        Ok(Self {
            size_lookup,
            num_angle_bins,
            values,
        })
    }

    /// Table that never contributes (all zeros)
    pub fn zeros(size_lookup: usize, num_angle_bins: u32) -> LatticeResult<Self> {
        let len = size_lookup * ceil_half(size_lookup) * num_angle_bins as usize;
        Self::from_values(size_lookup, num_angle_bins, vec![0.0; len])
    }

    /// Minimum primitive cost to reach a goal at `goal_heading` from every
    /// entry of the window.
    ///
    /// Runs a backward Dijkstra from the goal over the unbounded obstacle-free
    /// lattice. Expansion stops past a cost of twice the window size; states
    /// not settled by then count as that cutoff, which is still a lower bound.
    ///
    /// Each entry holds the minimum over all lattice states that
    /// [`heuristic_cost`] maps onto it. Rotating by a goal heading that is not
    /// a symmetry of the library, or mirroring a library that is not mirror
    /// symmetric, sends several states to one entry, and the minimum keeps
    /// every one of them bounded from below.
    pub fn precompute(
        table: &LatticeMotionTable,
        size_lookup: usize,
        goal_heading: u32,
    ) -> LatticeResult<Self> {
        let start = Instant::now();
        let bins = table.num_angle_bins();
        if goal_heading >= bins {
            return Err(LatticeError::InvalidParameter(format!(
                "goal heading bin {} out of range [0, {})",
                goal_heading, bins
            )));
        }
        let mut distance = Self::zeros(size_lookup, bins)?;
        let neutral = table.neutral_cost();
        let cutoff = 2.0 * size_lookup as f64;

        let mut by_end_heading: Vec<Vec<&MotionPrimitive>> = vec![Vec::new(); bins as usize];
        for primitive in table.primitives().iter() {
            by_end_heading[primitive.end_heading as usize].push(primitive);
        }

        let mut best: HashMap<(i64, i64, u32), f64> = HashMap::new();
        let mut open = BinaryHeap::new();
        best.insert((0, 0, goal_heading), 0.0);
        open.push(Reverse((OrderedFloat(0.0), 0i64, 0i64, goal_heading)));

        while let Some(Reverse((OrderedFloat(cost), x, y, theta))) = open.pop() {
            if cost > cutoff {
                break;
            }
            if best.get(&(x, y, theta)).map_or(false, |&b| cost > b) {
                continue;
            }
            for primitive in &by_end_heading[theta as usize] {
                let predecessor = (
                    x - primitive.delta.dx.round() as i64,
                    y - primitive.delta.dy.round() as i64,
                    primitive.start_heading,
                );
                let new_cost = cost + table.primitive_cost(primitive) / neutral;
                if best.get(&predecessor).map_or(true, |&b| new_cost < b) {
                    best.insert(predecessor, new_cost);
                    open.push(Reverse((
                        OrderedFloat(new_cost),
                        predecessor.0,
                        predecessor.1,
                        predecessor.2,
                    )));
                }
            }
        }

        // A rotated offset inside the window is at most twice the half window
        // away along either world axis
        distance.values.fill(f64::INFINITY);
        let goal_trig = table.trig_values(goal_heading);
        let reach = 2 * (size_lookup / 2) as i64;
        for (wx, wy, theta) in iproduct!(-reach..=reach, -reach..=reach, 0..bins) {
            let (rel_x, rel_y) = goal_frame_offset(wx as f64, wy as f64, goal_trig);
            let rel_theta = relative_heading(theta, goal_heading, bins);
            if let Some(position) = distance.position(rel_x, rel_y, rel_theta) {
                let cost = best.get(&(wx, wy, theta)).map_or(cutoff, |&c| c.min(cutoff));
                let entry = &mut distance.values[position];
                *entry = entry.min(cost);
            }
        }
        // entries no lattice state maps onto are never read
        for entry in distance.values.iter_mut().filter(|v| v.is_infinite()) {
            *entry = 0.0;
        }

        info!(
            size_lookup,
            headings = bins,
            goal_heading,
            settled_states = best.len(),
            elapsed = start.elapsed().as_secs_f64(),
            "precomputed distance heuristic"
        );
        Ok(distance)
    }

    pub fn size_lookup(&self) -> usize {
        self.size_lookup
    }

    pub fn num_angle_bins(&self) -> u32 {
        self.num_angle_bins
    }

    /// Value for a goal-frame offset, or `None` outside the window
    pub fn lookup(&self, rel_x: i32, rel_y: i32, rel_theta: u32) -> Option<f64> {
        self.position(rel_x, rel_y, rel_theta)
            .map(|position| self.values[position])
    }

    fn position(&self, rel_x: i32, rel_y: i32, rel_theta: u32) -> Option<usize> {
        let floored = (self.size_lookup / 2) as i32;
        if rel_x.abs() >= floored || rel_y.abs() >= floored || rel_theta >= self.num_angle_bins {
            return None;
        }

        // Stored for y >= 0 only: reflecting across the x axis negates heading
        let theta_pos = if rel_y < 0 {
            (self.num_angle_bins - rel_theta) % self.num_angle_bins
        } else {
            rel_theta
        };
        let x_pos = (rel_x + floored) as usize;
        let y_pos = rel_y.unsigned_abs() as usize;
        let bins = self.num_angle_bins as usize;
        Some(x_pos * ceil_half(self.size_lookup) * bins + y_pos * bins + theta_pos as usize)
    }
}

fn ceil_half(size: usize) -> usize {
    (size + 1) / 2
}

/// Breadth expansion distances over the grid, `[y][x]`
#[derive(Debug, Clone, PartialEq)]
pub struct WavefrontTable {
    values: DMatrix<u32>,
}

impl WavefrontTable {
    /// Wrap a `[height][width]` matrix of wavefront values
    pub fn from_matrix(values: DMatrix<u32>) -> Self {
        Self { values }
    }

    /// Wrap row-major values, one row per y
    pub fn from_rows(size_x: usize, size_y: usize, values: &[u32]) -> LatticeResult<Self> {
        if values.len() != size_x * size_y {
            return Err(LatticeError::InvalidParameter(format!(
                "wavefront has {} values, expected {}x{}",
                values.len(),
                size_x,
                size_y
            )));
        }
        Ok(Self::from_matrix(DMatrix::from_row_slice(size_y, size_x, values)))
    }

    /// Expand 8-connected from the goal cell over traversable cells.
    ///
    /// A cell `k` steps from the goal stores `2 + floor(k / DIAGONAL_FACTOR)`,
    /// so the decoded heuristic never exceeds the step count. Unreached cells
    /// store 0 and contribute nothing.
    pub fn from_costmap(
        costmap: &Costmap,
        goal_x: usize,
        goal_y: usize,
        traverse_unknown: bool,
    ) -> LatticeResult<Self> {
        let (size_x, size_y) = (costmap.size_x(), costmap.size_y());
        if goal_x >= size_x || goal_y >= size_y {
            return Err(LatticeError::InvalidParameter(format!(
                "wavefront goal ({}, {}) outside {}x{} costmap",
                goal_x, goal_y, size_x, size_y
            )));
        }

        let mut steps: DMatrix<Option<u32>> = DMatrix::from_element(size_y, size_x, None);
        let mut queue = VecDeque::with_capacity(size_x * size_y / 4);
        steps[(goal_y, goal_x)] = Some(0);
        queue.push_back((goal_x, goal_y));

        while let Some((x, y)) = queue.pop_front() {
            let current = steps[(y, x)].unwrap_or(0);
            for (dx, dy) in iproduct!(-1i64..=1, -1i64..=1) {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= size_x as i64 || ny >= size_y as i64 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if steps[(ny, nx)].is_some() || !costmap.is_traversable(nx, ny, traverse_unknown) {
                    continue;
                }
                steps[(ny, nx)] = Some(current + 1);
                queue.push_back((nx, ny));
            }
        }

        let values = steps.map(|s| match s {
            Some(k) => WAVEFRONT_SENTINEL + (k as f64 / DIAGONAL_FACTOR).floor() as u32,
            None => 0,
        });
        Ok(Self::from_matrix(values))
    }

    pub fn size_x(&self) -> usize {
        self.values.ncols()
    }

    pub fn size_y(&self) -> usize {
        self.values.nrows()
    }

    pub fn value(&self, x: usize, y: usize) -> Option<u32> {
        self.values.get((y, x)).copied()
    }

    /// Decoded heuristic at a cell; values at or below the sentinel are zero
    pub fn heuristic(&self, x: usize, y: usize) -> f64 {
        self.value(x, y)
            .map_or(0.0, |v| v.saturating_sub(WAVEFRONT_SENTINEL) as f64 * DIAGONAL_FACTOR)
    }
}

/// Both heuristic tables for one planning request
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicTables {
    distance: DistanceHeuristicTable,
    wavefront: WavefrontTable,
}

impl HeuristicTables {
    /// Pair tables for use with `table`; the distance table must share its
    /// heading bins
    pub fn new(
        table: &LatticeMotionTable,
        distance: DistanceHeuristicTable,
        wavefront: WavefrontTable,
    ) -> LatticeResult<Self> {
        if distance.num_angle_bins() != table.num_angle_bins() {
            return Err(LatticeError::InvalidParameter(format!(
                "distance heuristic has {} heading bins, motion table has {}",
                distance.num_angle_bins(),
                table.num_angle_bins()
            )));
        }
        Ok(Self {
            distance,
            wavefront,
        })
    }

    /// Precompute both tables for a goal pose
    pub fn build(
        table: &LatticeMotionTable,
        costmap: &Costmap,
        goal: &Coordinates,
        size_lookup: usize,
        traverse_unknown: bool,
    ) -> LatticeResult<Self> {
        if goal.x < 0.0 || goal.y < 0.0 {
            return Err(LatticeError::InvalidParameter(format!(
                "goal ({}, {}) has negative coordinates",
                goal.x, goal.y
            )));
        }
        let distance = DistanceHeuristicTable::precompute(table, size_lookup, goal.theta)?;
        let wavefront = WavefrontTable::from_costmap(
            costmap,
            goal.x.round() as usize,
            goal.y.round() as usize,
            traverse_unknown,
        )?;
        Self::new(table, distance, wavefront)
    }

    pub fn distance(&self) -> &DistanceHeuristicTable {
        &self.distance
    }

    pub fn wavefront(&self) -> &WavefrontTable {
        &self.wavefront
    }
}

/// `neutral_cost * max(distance heuristic, wavefront heuristic)`
///
/// The distance table is only read when its heading bins match `table`.
pub fn heuristic_cost(
    node_coords: &Coordinates,
    goal_coords: &Coordinates,
    table: &LatticeMotionTable,
    heuristics: &HeuristicTables,
) -> f64 {
    let bins = table.num_angle_bins();
    let distance_heuristic = if heuristics.distance.num_angle_bins() == bins {
        let (rel_x, rel_y) = goal_frame_offset(
            node_coords.x - goal_coords.x,
            node_coords.y - goal_coords.y,
            table.trig_values(goal_coords.theta),
        );
        let rel_theta = relative_heading(node_coords.theta, goal_coords.theta, bins);
        heuristics
            .distance
            .lookup(rel_x, rel_y, rel_theta)
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let wavefront_heuristic = if node_coords.x < 0.0 || node_coords.y < 0.0 {
        0.0
    } else {
        heuristics
            .wavefront
            .heuristic(node_coords.x as usize, node_coords.y as usize)
    };

    table.neutral_cost() * distance_heuristic.max(wavefront_heuristic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CollisionChecker;
    use crate::path_planning::state_lattice::{PrimitiveSet, TraversalCostParams};
    use crate::path_planning::state_lattice::expansion::sweep_is_clear;
    use crate::path_planning::state_lattice::LatticeFile;
    use crate::test_utils::{eight_heading_file, four_heading_file, single_bin_file};
    use crate::utils::{costs, Costmap, GridCollisionChecker};

    fn motion_table_for(file: LatticeFile, size_x: u32) -> LatticeMotionTable {
        LatticeMotionTable::from_primitives(
            "test.json",
            size_x,
            PrimitiveSet::from_file(file).unwrap(),
            TraversalCostParams::default(),
        )
    }

    fn four_heading_table(size_x: u32) -> LatticeMotionTable {
        motion_table_for(four_heading_file(), size_x)
    }

    /// Table whose entries are distinct, so lookups can be traced
    fn indexed_distance_table(size: usize, bins: u32) -> DistanceHeuristicTable {
        let len = size * ceil_half(size) * bins as usize;
        DistanceHeuristicTable::from_values(size, bins, (0..len).map(|i| i as f64).collect())
            .unwrap()
    }

    #[test]
    fn test_distance_table_shape_is_checked() {
        assert!(DistanceHeuristicTable::from_values(5, 4, vec![0.0; 5 * 3 * 4]).is_ok());
        assert!(DistanceHeuristicTable::from_values(5, 4, vec![0.0; 5 * 5 * 4]).is_err());
        assert!(DistanceHeuristicTable::from_values(1, 4, vec![0.0; 4]).is_err());
        assert!(DistanceHeuristicTable::from_values(3, 1, vec![-1.0; 6]).is_err());
    }

    #[test]
    fn test_lookup_window_bounds() {
        let table = indexed_distance_table(7, 4);
        // floor(7 / 2) = 3, so |offset| < 3 is inside
        assert!(table.lookup(2, 2, 0).is_some());
        assert!(table.lookup(-2, -2, 3).is_some());
        assert!(table.lookup(3, 0, 0).is_none());
        assert!(table.lookup(0, -3, 0).is_none());
        // heading past the table's bins
        assert!(table.lookup(0, 0, 4).is_none());
    }

    #[test]
    fn test_tables_must_share_heading_bins() {
        let motion_table = four_heading_table(20);
        let err = HeuristicTables::new(
            &motion_table,
            DistanceHeuristicTable::zeros(5, 8).unwrap(),
            WavefrontTable::from_rows(1, 1, &[0]).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, LatticeError::InvalidParameter(_)));

        let eight = motion_table_for(eight_heading_file(), 20);
        assert!(DistanceHeuristicTable::precompute(&eight, 7, 8).is_err());
    }

    #[test]
    fn test_mirror_symmetry() {
        let bins = 16;
        let table = indexed_distance_table(9, bins);
        for (x, y, theta) in iproduct!(-3i32..=3, 1i32..=3, 0..bins) {
            let mirrored_theta = (bins - theta) % bins;
            assert_eq!(
                table.lookup(x, y, theta),
                table.lookup(x, -y, mirrored_theta),
                "offset ({}, {}) heading {}",
                x,
                y,
                theta
            );
        }
    }

    #[test]
    fn test_mirror_symmetry_through_heuristic_cost() {
        let motion_table = four_heading_table(20);
        let heuristics = HeuristicTables::new(
            &motion_table,
            indexed_distance_table(9, 4),
            WavefrontTable::from_rows(1, 1, &[0]).unwrap(),
        )
        .unwrap();
        let goal = Coordinates::new(10.0, 10.0, 0);
        for (dx, dy, theta) in iproduct!(-3i32..=3, 1i32..=3, 0u32..4) {
            let upper = Coordinates::new(10.0 + dx as f64, 10.0 + dy as f64, theta);
            let lower = Coordinates::new(10.0 + dx as f64, 10.0 - dy as f64, (4 - theta) % 4);
            let h_upper = heuristic_cost(&upper, &goal, &motion_table, &heuristics);
            let h_lower = heuristic_cost(&lower, &goal, &motion_table, &heuristics);
            assert!((h_upper - h_lower).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wavefront_sentinel_at_goal() {
        let motion_table = four_heading_table(5);
        let mut values = vec![6u32; 25];
        values[2 * 5 + 3] = WAVEFRONT_SENTINEL;
        let heuristics = HeuristicTables::new(
            &motion_table,
            DistanceHeuristicTable::zeros(5, 4).unwrap(),
            WavefrontTable::from_rows(5, 5, &values).unwrap(),
        )
        .unwrap();
        let goal = Coordinates::new(3.0, 2.0, 1);
        for theta in 0..4 {
            let node = Coordinates::new(3.0, 2.0, theta);
            assert_eq!(heuristic_cost(&node, &goal, &motion_table, &heuristics), 0.0);
        }
    }

    #[test]
    fn test_wavefront_below_sentinel_floors_to_zero() {
        let wavefront = WavefrontTable::from_rows(3, 1, &[0, 1, 5]).unwrap();
        assert_eq!(wavefront.heuristic(0, 0), 0.0);
        assert_eq!(wavefront.heuristic(1, 0), 0.0);
        assert!((wavefront.heuristic(2, 0) - 3.0 * DIAGONAL_FACTOR).abs() < 1e-12);
        // off the table contributes nothing
        assert_eq!(wavefront.heuristic(7, 7), 0.0);
    }

    #[test]
    fn test_combination_is_max() {
        let motion_table = four_heading_table(20);
        let size = 5;
        let mut values = vec![0.0; size * ceil_half(size) * 4];
        // offset (1, 0) heading 0 -> x_pos 3, y_pos 0
        values[3 * ceil_half(size) * 4] = 10.0;
        let wavefront = WavefrontTable::from_matrix(DMatrix::from_element(20, 20, 4));
        let heuristics = HeuristicTables::new(
            &motion_table,
            DistanceHeuristicTable::from_values(size, 4, values).unwrap(),
            wavefront,
        )
        .unwrap();
        let neutral = motion_table.neutral_cost();
        let goal = Coordinates::new(10.0, 10.0, 0);

        let near = Coordinates::new(11.0, 10.0, 0);
        let h_near = heuristic_cost(&near, &goal, &motion_table, &heuristics);
        assert!((h_near - neutral * 10.0).abs() < 1e-9);

        let other = Coordinates::new(11.0, 10.0, 1);
        let h_other = heuristic_cost(&other, &goal, &motion_table, &heuristics);
        assert!((h_other - neutral * 2.0 * DIAGONAL_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_goal_frame_rotation() {
        let motion_table = four_heading_table(20);
        let size = 5;
        let mut values = vec![0.0; size * ceil_half(size) * 4];
        values[3 * ceil_half(size) * 4] = 7.0;
        let heuristics = HeuristicTables::new(
            &motion_table,
            DistanceHeuristicTable::from_values(size, 4, values).unwrap(),
            WavefrontTable::from_rows(1, 1, &[0]).unwrap(),
        )
        .unwrap();
        // goal faces +y; one cell along +y at the same heading is offset (1, 0, 0)
        let goal = Coordinates::new(10.0, 10.0, 1);
        let ahead = Coordinates::new(10.0, 11.0, 1);
        let h = heuristic_cost(&ahead, &goal, &motion_table, &heuristics);
        assert!((h - motion_table.neutral_cost() * 7.0).abs() < 1e-9);

        let beside = Coordinates::new(11.0, 10.0, 1);
        assert_eq!(heuristic_cost(&beside, &goal, &motion_table, &heuristics), 0.0);
    }

    #[test]
    fn test_precompute_values() {
        let motion_table = four_heading_table(20);
        let table = DistanceHeuristicTable::precompute(&motion_table, 7, 0).unwrap();
        assert_eq!(table.lookup(0, 0, 0), Some(0.0));
        // one forward step
        assert!((table.lookup(-1, 0, 0).unwrap() - 1.0).abs() < 1e-12);
        // one reverse step, doubled by the reverse penalty
        assert!((table.lookup(1, 0, 0).unwrap() - 2.0).abs() < 1e-12);
        // a right turn from heading 1 ends at the goal pose
        let turn = std::f64::consts::FRAC_PI_2 * 1.05;
        assert!((table.lookup(-1, -1, 1).unwrap() - turn).abs() < 1e-12);
    }

    #[test]
    fn test_precompute_single_bin() {
        let motion_table = LatticeMotionTable::from_primitives(
            "single.json",
            10,
            PrimitiveSet::from_file(single_bin_file()).unwrap(),
            TraversalCostParams::default(),
        );
        let table = DistanceHeuristicTable::precompute(&motion_table, 7, 0).unwrap();
        assert!((table.lookup(-2, 0, 0).unwrap() - 2.0).abs() < 1e-12);
        // behind the goal is unreachable with forward-only motion: cutoff
        assert!((table.lookup(1, 0, 0).unwrap() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_wavefront_from_costmap() {
        let mut costmap = Costmap::new(7, 5);
        for y in 0..4 {
            costmap.set_cost(3, y, crate::utils::costs::LETHAL_OBSTACLE);
        }
        let wavefront = WavefrontTable::from_costmap(&costmap, 1, 1, false).unwrap();
        assert_eq!(wavefront.size_x(), 7);
        assert_eq!(wavefront.size_y(), 5);
        assert_eq!(wavefront.value(1, 1), Some(WAVEFRONT_SENTINEL));
        assert_eq!(wavefront.value(2, 2), Some(WAVEFRONT_SENTINEL));
        // walls are never entered
        assert_eq!(wavefront.value(3, 0), Some(0));
        // detour around the wall through y = 4: six steps
        assert_eq!(wavefront.value(5, 1), Some(WAVEFRONT_SENTINEL + 4));
        assert!(WavefrontTable::from_costmap(&costmap, 9, 1, false).is_err());
    }

    /// Exact cost-to-goal for every state of the grid, by backward Dijkstra
    /// over the same primitives, validity checks and traversal costs the
    /// search uses
    fn brute_force_costs(
        table: &LatticeMotionTable,
        costmap: &Costmap,
        goal: (i64, i64, u32),
    ) -> HashMap<(i64, i64, u32), f64> {
        let size_x = costmap.size_x() as i64;
        let size_y = costmap.size_y() as i64;
        let mut checker = GridCollisionChecker::new(costmap);
        let mut best = HashMap::new();
        let mut open = BinaryHeap::new();
        best.insert(goal, 0.0);
        open.push(Reverse((OrderedFloat(0.0), goal.0, goal.1, goal.2)));

        while let Some(Reverse((OrderedFloat(cost), x, y, theta))) = open.pop() {
            if best.get(&(x, y, theta)).map_or(false, |&b| cost > b) {
                continue;
            }
            // expansion only produces states whose cell passes the check
            if checker.in_collision(x as f64, y as f64, 0.0, false) {
                continue;
            }
            for primitive in table.primitives().iter().filter(|p| p.end_heading == theta) {
                let px = x - primitive.delta.dx.round() as i64;
                let py = y - primitive.delta.dy.round() as i64;
                if px < 0 || py < 0 || px >= size_x || py >= size_y {
                    continue;
                }
                let origin = Coordinates::new(px as f64, py as f64, primitive.start_heading);
                if !sweep_is_clear(&origin, primitive, &mut checker, false, table) {
                    continue;
                }
                let key = (px, py, primitive.start_heading);
                let new_cost = cost + table.primitive_cost(primitive);
                if best.get(&key).map_or(true, |&b| new_cost < b) {
                    best.insert(key, new_cost);
                    open.push(Reverse((OrderedFloat(new_cost), px, py, key.2)));
                }
            }
        }
        best
    }

    /// Heuristic never exceeds the optimal cost for any state that can reach
    /// the goal, for every goal heading
    fn assert_admissible(
        motion_table: &LatticeMotionTable,
        costmap: &Costmap,
        goal_x: u32,
        goal_y: u32,
        size_lookup: usize,
    ) {
        for goal_theta in 0..motion_table.num_angle_bins() {
            let goal = Coordinates::new(goal_x as f64, goal_y as f64, goal_theta);
            let heuristics =
                HeuristicTables::build(motion_table, costmap, &goal, size_lookup, false).unwrap();
            let truth = brute_force_costs(
                motion_table,
                costmap,
                (goal_x as i64, goal_y as i64, goal_theta),
            );
            assert!(truth.len() > 100);

            for (&(x, y, theta), &true_cost) in &truth {
                let node = Coordinates::new(x as f64, y as f64, theta);
                let h = heuristic_cost(&node, &goal, motion_table, &heuristics);
                assert!(
                    h <= true_cost + 1e-9,
                    "goal heading {}: h({}, {}, {}) = {} exceeds optimal cost {}",
                    goal_theta,
                    x,
                    y,
                    theta,
                    h,
                    true_cost
                );
            }
        }
    }

    #[test]
    fn test_heuristic_admissibility() {
        let costmap = Costmap::new(12, 12);
        assert_admissible(&four_heading_table(12), &costmap, 6, 6, 9);
    }

    #[test]
    fn test_heuristic_admissibility_off_axis_goal_headings() {
        let costmap = Costmap::new(24, 24);
        let motion_table = motion_table_for(eight_heading_file(), 24);
        assert_admissible(&motion_table, &costmap, 12, 12, 21);

        // rounding the de-rotated offset of this node lands on a cell that is
        // dearer than the node itself when the goal faces 45 degrees
        let goal = Coordinates::new(12.0, 12.0, 1);
        let heuristics = HeuristicTables::build(&motion_table, &costmap, &goal, 21, false).unwrap();
        let truth = brute_force_costs(&motion_table, &costmap, (12, 12, 1));
        let node = Coordinates::new(9.0, 7.0, 1);
        let h = heuristic_cost(&node, &goal, &motion_table, &heuristics);
        assert!(h <= truth[&(9, 7, 1)] + 1e-9);
    }

    #[test]
    fn test_heuristic_admissibility_around_thin_wall() {
        let mut costmap = Costmap::new(24, 24);
        for y in 0..22 {
            costmap.set_cost(10, y, costs::LETHAL_OBSTACLE);
        }
        let motion_table = motion_table_for(eight_heading_file(), 24);
        assert_admissible(&motion_table, &costmap, 14, 3, 15);

        // the only way past the wall is over the top
        let goal = Coordinates::new(14.0, 3.0, 0);
        let heuristics = HeuristicTables::build(&motion_table, &costmap, &goal, 15, false).unwrap();
        let node = Coordinates::new(9.0, 1.0, 0);
        let h = heuristic_cost(&node, &goal, &motion_table, &heuristics);
        assert!(h > 10.0 * motion_table.neutral_cost());
    }

    #[test]
    fn test_heuristic_is_informative() {
        let costmap = Costmap::new(12, 12);
        let motion_table = four_heading_table(12);
        let goal = Coordinates::new(6.0, 6.0, 0);
        let heuristics = HeuristicTables::build(&motion_table, &costmap, &goal, 9, false).unwrap();

        let behind = Coordinates::new(3.0, 6.0, 0);
        let h = heuristic_cost(&behind, &goal, &motion_table, &heuristics);
        assert!((h - 3.0 * motion_table.neutral_cost()).abs() < 1e-9);
    }
}
