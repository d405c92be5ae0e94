//! Error types for overlap-core.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for overlap-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while running a PSI computation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A request field could not be decoded.
    #[error("invalid input in field '{field}': {source}")]
    InvalidInput {
        /// Name of the offending request field.
        field: &'static str,
        /// Decoding error from the base64 engine.
        source: base64::DecodeError,
    },

    /// A required preexisting input file is absent.
    #[error("missing input file: {0}")]
    MissingInput(PathBuf),

    /// Filesystem failure while creating or writing workspace files.
    #[error("workspace I/O error at {path}: {source}")]
    WorkspaceIo {
        /// Path of the file being created or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The PSI binary could not be started at all.
    #[error("failed to launch PSI binary: {0}")]
    LaunchFailed(std::io::Error),

    /// The PSI binary ran but exited non-zero.
    #[error("PSI computation failed (exit code {exit_code}): {detail}")]
    ComputationFailed {
        /// Exit code reported by the child, -1 if killed by signal.
        exit_code: i32,
        /// Captured stderr, or stdout when stderr was empty.
        detail: String,
    },

    /// The PSI binary did not finish within the configured timeout.
    #[error("PSI computation timed out after {0:?}")]
    ComputationTimeout(Duration),

    /// The PSI binary exited zero but its output did not match the
    /// expected two-trailing-integer shape.
    #[error("malformed PSI output: {raw:?}")]
    MalformedOutput {
        /// Captured stdout, truncated, kept for diagnosis.
        raw: String,
    },

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Check if this error was caused by the request rather than the
    /// service or the external binary.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidInput { .. } | CoreError::MissingInput(_)
        )
    }

    /// Check if this error originated in the external binary.
    pub fn is_computation_error(&self) -> bool {
        matches!(
            self,
            CoreError::ComputationFailed { .. } | CoreError::ComputationTimeout(_)
        )
    }
}
