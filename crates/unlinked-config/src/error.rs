//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File system operation failed.
    #[error("failed to {operation} {path}")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File being accessed.
        path: PathBuf,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
    /// Settings document was not valid JSON.
    #[error("settings file {path} is not valid JSON")]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_json::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field '{field}': {reason}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// No password was supplied and none could be prompted for.
    #[error("a password is required (use --password or TRANSMISSION_PASSWORD)")]
    MissingPassword,
}

impl ConfigError {
    pub(crate) const fn invalid(
        field: &'static str,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
