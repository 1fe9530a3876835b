//! Common types, traits, and error definitions for lattice_planning
//!
//! This module provides the foundational building blocks shared by the
//! lattice node model and its reference collaborators.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
