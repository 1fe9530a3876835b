//! Motion model selection
//!
//! The lattice node only supports `STATE_LATTICE`; the other kinds exist so
//! that a shared planner configuration can name them and be rejected with a
//! clear error instead of running with an empty primitive set.

use std::convert::TryFrom;
use std::str::FromStr;

use serde::Deserialize;
use strum_macros::{Display, EnumString};

use crate::common::{LatticeError, LatticeResult};

/// Motion model kinds understood by the planner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String")]
pub enum MotionModel {
    #[strum(serialize = "2D")]
    TwoD,
    #[strum(serialize = "DUBIN")]
    Dubin,
    #[strum(serialize = "REEDS_SHEPP")]
    ReedsShepp,
    #[strum(serialize = "STATE_LATTICE")]
    StateLattice,
}

impl MotionModel {
    /// Fail unless this model can drive lattice expansion
    pub fn require_state_lattice(self) -> LatticeResult<()> {
        match self {
            MotionModel::StateLattice => Ok(()),
            other => Err(LatticeError::UnsupportedMotionModel(other.to_string())),
        }
    }
}

impl Default for MotionModel {
    fn default() -> Self {
        MotionModel::StateLattice
    }
}

impl TryFrom<String> for MotionModel {
    type Error = LatticeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MotionModel::from_str(&value)
            .map_err(|_| LatticeError::UnsupportedMotionModel(value.clone()))
    }
}
