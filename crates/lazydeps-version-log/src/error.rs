//! Version log error types.

use std::io;

use thiserror::Error;

/// Errors from reading or writing HTML files.
#[derive(Debug, Error)]
pub enum VersionLogError {
    /// The input HTML could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadError {
        /// Input path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The output HTML could not be written.
    #[error("Failed to write {path}: {source}")]
    WriteError {
        /// Output path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Result type for version log operations.
pub type VersionLogResult<T> = Result<T, VersionLogError>;
