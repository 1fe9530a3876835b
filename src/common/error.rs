//! Error types for lattice_planning

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for lattice planning setup
///
/// Everything here is a configuration-time failure: once the motion table and
/// heuristic tables are built, node expansion never returns an error.
#[derive(Error, Debug)]
pub enum LatticeError {
    /// The requested motion model cannot drive a lattice node
    #[error("Unsupported motion model: {0}. Please select STATE_LATTICE and provide a valid lattice file")]
    UnsupportedMotionModel(String),
    /// The primitive library could not be read
    #[error("Failed to load lattice file {path}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The primitive library was read but its content is unusable
    #[error("Malformed lattice file: {0}")]
    MalformedLibrary(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        LatticeError::MalformedLibrary(e.to_string())
    }
}

impl From<toml::de::Error> for LatticeError {
    fn from(e: toml::de::Error) -> Self {
        LatticeError::Config(e.to_string())
    }
}

/// Result type alias for lattice operations
pub type LatticeResult<T> = Result<T, LatticeError>;
