//! Error types shared across Homestead crates.

use thiserror::Error;

/// Top-level error type for Homestead operations.
///
/// Subsystem errors are converted into this at crate boundaries so hosts can
/// handle a single type.
#[derive(Debug, Error)]
pub enum HomesteadError {
    /// Inventory invariant violated or capacity exceeded
    #[error("Inventory error: {0}")]
    Inventory(String),

    /// Grid or placement geometry error
    #[error("Grid error: {0}")]
    Grid(String),

    /// Invalid state transition
    #[error("State error: {0}")]
    State(String),

    /// Content (item catalog, config) could not be loaded
    #[error("Content error: {0}")]
    Content(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Homestead operations.
pub type HomesteadResult<T> = Result<T, HomesteadError>;
