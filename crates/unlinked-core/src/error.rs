//! Error types for the cleanup core.
//!
//! # Design
//!
//! - Probe failures carry the offending path and are downgraded by callers, never fatal.
//! - Transport failures are isolated to the torrent that triggered them.
//! - Source errors are preserved rather than flattened into strings.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::TorrentId;

/// Result type for filesystem metadata lookups.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type for calls into the client daemon.
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures raised while resolving a file's identity.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The path does not exist (deleted or moved since the snapshot).
    #[error("file not found")]
    NotFound {
        /// Path that failed to resolve.
        path: PathBuf,
    },
    /// The path exists but its metadata cannot be read.
    #[error("permission denied")]
    PermissionDenied {
        /// Path that could not be read.
        path: PathBuf,
    },
    /// Any other metadata failure.
    #[error("file metadata lookup failed")]
    Io {
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    /// Classify an IO error raised while probing `path`.
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path that triggered the failure.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::PermissionDenied { path } | Self::Io { path, .. } => {
                path
            }
        }
    }
}

/// Failures reported by the client daemon transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No usable session with the daemon (listing or session setup failed).
    #[error("connection to torrent client failed during {operation}: {detail}")]
    Connection {
        /// Operation that was being attempted.
        operation: &'static str,
        /// Transport-level failure detail.
        detail: String,
    },
    /// The daemon rejected or failed a removal request.
    #[error("removal of torrent {torrent_id} failed: {reason}")]
    Removal {
        /// Torrent the removal targeted.
        torrent_id: TorrentId,
        /// Reason reported by the daemon or transport.
        reason: String,
    },
}

impl TransportError {
    /// Build a connection failure for `operation`.
    pub fn connection(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Connection {
            operation,
            detail: detail.into(),
        }
    }

    /// Build a removal failure for `torrent_id`.
    pub fn removal(torrent_id: TorrentId, reason: impl Into<String>) -> Self {
        Self::Removal {
            torrent_id,
            reason: reason.into(),
        }
    }
}

/// Returned when an action name is not one of the recognised spellings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown action '{value}' (expected list, delete, remove, or interactive)")]
pub struct ActionParseError {
    /// The rejected input.
    pub value: String,
}
