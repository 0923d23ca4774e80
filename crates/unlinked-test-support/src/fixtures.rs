//! Torrent builders and on-disk fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tempfile::TempDir;
use unlinked_core::{TorrentId, TorrentRecord};

/// Fixed reference time used by fixtures so ages are deterministic.
#[must_use]
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builder for [`TorrentRecord`] values.
#[derive(Debug, Clone)]
pub struct TorrentBuilder {
    record: TorrentRecord,
}

impl TorrentBuilder {
    /// Torrent `id` named `name`, rooted at `/downloads`, 30 days old, no files.
    #[must_use]
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            record: TorrentRecord {
                id: TorrentId(id),
                name: name.to_string(),
                root: PathBuf::from("/downloads"),
                files: Vec::new(),
                trackers: Vec::new(),
                added_at: reference_now() - TimeDelta::days(30),
                completed_at: None,
            },
        }
    }

    /// Set the download directory.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.record.root = root.into();
        self
    }

    /// Append a file; relative paths are joined onto the root.
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        let path = self.record.root.join(path);
        self.record.files.push(path);
        self
    }

    /// Append a tracker host.
    #[must_use]
    pub fn tracker(mut self, host: &str) -> Self {
        self.record.trackers.push(host.to_string());
        self
    }

    /// Set the age relative to [`reference_now`].
    #[must_use]
    pub fn age_days(mut self, days: i64) -> Self {
        self.record.added_at = reference_now() - TimeDelta::days(days);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> TorrentRecord {
        self.record
    }
}

/// Temporary directory tree for filesystem-backed tests.
#[derive(Debug)]
pub struct DiskTree {
    dir: TempDir,
}

impl DiskTree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("unlinked-")
            .tempdir()
            .context("failed to create temp dir")?;
        Ok(Self { dir })
    }

    /// Root of the tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write(&self, relative: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Hardlink `existing` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when the link cannot be created.
    pub fn hard_link(&self, existing: &Path, relative: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::hard_link(existing, &path)
            .with_context(|| format!("failed to link {}", path.display()))?;
        Ok(path)
    }
}
