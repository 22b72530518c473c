//! Unified error types for the keystream workspace.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum KeystreamError {
    /// An I/O operation failed.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// What was being attempted when the error occurred.
        context: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The listener was activated while a previous activation is still live.
    #[error("listener is already active")]
    AlreadyActive,

    /// A replay script entry is malformed.
    #[error("invalid replay script at entry {entry}: {message}")]
    Script {
        /// One-based position of the offending entry.
        entry: usize,
        /// Description of the problem.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, KeystreamError>;
