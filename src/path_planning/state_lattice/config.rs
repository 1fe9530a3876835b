//! Configuration for the lattice node model
//!
//! All fields have defaults, so a TOML file only needs to name the lattice
//! file:
//!
//! ```toml
//! lattice_filepath = "primitives/diff_drive_16.json"
//! reverse_penalty = 2.5
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::{LatticeError, LatticeResult};

use super::motion_model::MotionModel;

/// Cost weights applied to every primitive traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalCostParams {
    /// Cost of one diagonal cell step; scales edges and heuristics alike
    pub neutral_cost: f64,
    /// Multiplier on the arc cost of reverse primitives (> 1)
    pub reverse_penalty: f64,
    /// Weight on the heading change of a primitive, per radian
    pub change_penalty: f64,
}

impl Default for TraversalCostParams {
    fn default() -> Self {
        Self {
            neutral_cost: std::f64::consts::SQRT_2,
            reverse_penalty: 2.0,
            change_penalty: 0.05,
        }
    }
}

/// Configuration for the state lattice node model
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Motion model requested by the planner; must be STATE_LATTICE
    pub motion_model: MotionModel,
    /// Primitive library reference
    pub lattice_filepath: PathBuf,
    /// Scale of one diagonal step
    pub neutral_cost: f64,
    /// Reverse motion multiplier
    pub reverse_penalty: f64,
    /// Heading change weight [1/rad]
    pub change_penalty: f64,
    /// Side length of the distance heuristic window [cells]
    pub lookup_table_size: usize,
    /// Whether unknown space counts as traversable
    pub traverse_unknown: bool,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        let costs = TraversalCostParams::default();
        Self {
            motion_model: MotionModel::StateLattice,
            lattice_filepath: PathBuf::new(),
            neutral_cost: costs.neutral_cost,
            reverse_penalty: costs.reverse_penalty,
            change_penalty: costs.change_penalty,
            lookup_table_size: 21,
            traverse_unknown: true,
        }
    }
}

impl LatticeConfig {
    pub fn with_filepath<P: Into<PathBuf>>(lattice_filepath: P) -> Self {
        Self {
            lattice_filepath: lattice_filepath.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> LatticeResult<Self> {
        let config: LatticeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> LatticeResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn traversal_costs(&self) -> TraversalCostParams {
        TraversalCostParams {
            neutral_cost: self.neutral_cost,
            reverse_penalty: self.reverse_penalty,
            change_penalty: self.change_penalty,
        }
    }

    pub fn validate(&self) -> LatticeResult<()> {
        if !(self.neutral_cost.is_finite() && self.neutral_cost > 0.0) {
            return Err(LatticeError::InvalidParameter(format!(
                "neutral_cost must be positive, got {}",
                self.neutral_cost
            )));
        }
        if !(self.reverse_penalty.is_finite() && self.reverse_penalty > 1.0) {
            return Err(LatticeError::InvalidParameter(format!(
                "reverse_penalty must be greater than 1, got {}",
                self.reverse_penalty
            )));
        }
        if !(self.change_penalty.is_finite() && self.change_penalty >= 0.0) {
            return Err(LatticeError::InvalidParameter(format!(
                "change_penalty must be non-negative, got {}",
                self.change_penalty
            )));
        }
        if self.lookup_table_size < 3 {
            return Err(LatticeError::InvalidParameter(format!(
                "lookup_table_size must be at least 3, got {}",
                self.lookup_table_size
            )));
        }
        Ok(())
    }
}
