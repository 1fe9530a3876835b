// grid costmap and the collision checker the lattice search queries

use std::ops::Deref;

use nalgebra::DMatrix;
use tracing::trace;

use crate::common::{CollisionChecker, LatticeError, LatticeResult};

/// Cell cost values
pub mod costs {
    pub const FREE_SPACE: u8 = 0;
    pub const INSCRIBED_INFLATED_OBSTACLE: u8 = 253;
    pub const LETHAL_OBSTACLE: u8 = 254;
    pub const NO_INFORMATION: u8 = 255;
}

/// Costmap stored `[y][x]`, one byte per cell
#[derive(Debug, Clone, PartialEq)]
pub struct Costmap {
    grid: DMatrix<u8>,
}

impl Costmap {
    /// Free costmap of `size_x` by `size_y` cells
    pub fn new(size_x: usize, size_y: usize) -> Self {
        Self::from_matrix(DMatrix::from_element(size_y, size_x, costs::FREE_SPACE))
    }

    pub fn from_matrix(grid: DMatrix<u8>) -> Self {
        Self { grid }
    }

    /// Upsample a coarse occupancy matrix, each cell becoming `scale` x `scale`
    pub fn from_occupancy(original: DMatrix<u8>, scale: usize) -> LatticeResult<Self> {
        if scale < 1 {
            return Err(LatticeError::InvalidParameter("scale must be >= 1".to_string()));
        }
        let grid = original.kronecker(&DMatrix::<u8>::repeat(scale, scale, 1));
        Ok(Self::from_matrix(grid))
    }

    pub fn size_x(&self) -> usize {
        self.grid.ncols()
    }

    pub fn size_y(&self) -> usize {
        self.grid.nrows()
    }

    pub fn cost(&self, x: usize, y: usize) -> Option<u8> {
        self.grid.get((y, x)).copied()
    }

    /// Out-of-range writes are ignored
    pub fn set_cost(&mut self, x: usize, y: usize, cost: u8) {
        if let Some(cell) = self.grid.get_mut((y, x)) {
            *cell = cost;
        }
    }

    pub fn is_traversable(&self, x: usize, y: usize, traverse_unknown: bool) -> bool {
        match self.cost(x, y) {
            Some(costs::NO_INFORMATION) => traverse_unknown,
            Some(cost) => cost < costs::INSCRIBED_INFLATED_OBSTACLE,
            None => false,
        }
    }
}

impl Deref for Costmap {
    type Target = DMatrix<u8>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

/// Point collision checker over a [`Costmap`]; the footprint is one cell
#[derive(Debug, Clone)]
pub struct GridCollisionChecker<'a> {
    costmap: &'a Costmap,
    last_cost: f64,
}

impl<'a> GridCollisionChecker<'a> {
    pub fn new(costmap: &'a Costmap) -> Self {
        Self {
            costmap,
            last_cost: costs::FREE_SPACE as f64,
        }
    }
}

impl CollisionChecker for GridCollisionChecker<'_> {
    fn in_collision(&mut self, x: f64, y: f64, _theta: f64, traverse_unknown: bool) -> bool {
        let (cx, cy) = (x.round(), y.round());
        if cx < 0.0 || cy < 0.0 {
            trace!(x, y, "query below the costmap origin");
            return true;
        }
        let cost = match self.costmap.cost(cx as usize, cy as usize) {
            Some(cost) => cost,
            None => {
                trace!(x, y, "query outside the costmap");
                return true;
            }
        };

        self.last_cost = cost as f64;
        match cost {
            costs::NO_INFORMATION => !traverse_unknown,
            c => c >= costs::INSCRIBED_INFLATED_OBSTACLE,
        }
    }

    fn cost(&self) -> f64 {
        self.last_cost
    }
}
