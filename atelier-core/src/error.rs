//! Error types for atelier-core
//!
//! The pipeline itself never fails: malformed input degrades to a documented
//! default and is counted in the data-quality report. Errors only surface at
//! the edges, when configuration or snapshot files are read.

use thiserror::Error;

/// Main error type for the atelier-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Snapshot could not be loaded from its source
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Result type alias for atelier-core
pub type Result<T> = std::result::Result<T, Error>;
