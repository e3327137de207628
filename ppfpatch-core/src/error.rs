//! Error types for ppfpatch

use thiserror::Error;

/// Main error type for ppfpatch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spatial index queried before build")]
    IndexNotBuilt,

    #[error("empty neighborhood around reference point {index}")]
    EmptyNeighborhood { index: usize },

    #[error("degenerate normal at point {index}")]
    DegenerateNormal { index: usize },

    #[error("cannot resolve sample: {0}")]
    SampleResolution(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for ppfpatch operations
pub type Result<T> = std::result::Result<T, Error>;
