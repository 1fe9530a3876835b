//! Grid utilities shared by the planners

pub mod grid_map;

pub use grid_map::{costs, Costmap, GridCollisionChecker};
