//! Filesystem metadata lookups.
//!
//! [`FileStatProbe`] is the only seam that touches the OS. [`StatTable`] resolves every
//! distinct path of a torrent set once per run so later passes never stat twice.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ProbeError, ProbeResult};
use crate::model::{FileIdentity, FileStat, TorrentRecord};
use crate::path::normalize;

/// Resolves a path to its content identity and link count.
pub trait FileStatProbe: Send + Sync {
    /// Stat `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::NotFound`] when the path does not exist and
    /// [`ProbeError::PermissionDenied`] when its metadata is unreadable.
    fn stat(&self, path: &Path) -> ProbeResult<FileStat>;

    /// Content identity of `path`.
    ///
    /// # Errors
    ///
    /// Same as [`FileStatProbe::stat`].
    fn identity(&self, path: &Path) -> ProbeResult<FileIdentity> {
        self.stat(path).map(|stat| stat.identity)
    }
}

/// Probe backed by `stat(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStatProbe;

#[cfg(unix)]
impl FileStatProbe for FsStatProbe {
    #[allow(clippy::useless_conversion, clippy::cast_sign_loss, clippy::unnecessary_cast)]
    fn stat(&self, path: &Path) -> ProbeResult<FileStat> {
        let stat = nix::sys::stat::stat(path)
            .map_err(|errno| ProbeError::from_io(path, std::io::Error::from(errno)))?;
        Ok(FileStat {
            identity: FileIdentity {
                device: stat.st_dev as u64,
                inode: stat.st_ino as u64,
            },
            link_count: stat.st_nlink as u64,
        })
    }
}

#[cfg(not(unix))]
impl FileStatProbe for FsStatProbe {
    fn stat(&self, path: &Path) -> ProbeResult<FileStat> {
        std::fs::metadata(path).map_err(|err| ProbeError::from_io(path, err))?;
        Err(ProbeError::from_io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "inode identity requires a unix platform",
            ),
        ))
    }
}

/// Stat results for every distinct path of a torrent set, keyed by normalised path.
///
/// Paths that failed to resolve are recorded as `None`.
#[derive(Debug, Default)]
pub struct StatTable {
    entries: HashMap<PathBuf, Option<FileStat>>,
}

impl StatTable {
    /// Stat every file of every torrent exactly once.
    ///
    /// Lookup failures are logged and recorded as unresolved; they never abort collection.
    pub fn collect<P>(probe: &P, torrents: &[TorrentRecord]) -> Self
    where
        P: FileStatProbe + ?Sized,
    {
        let mut entries = HashMap::new();
        for torrent in torrents {
            for file in &torrent.files {
                let key = normalize(file);
                if entries.contains_key(&key) {
                    continue;
                }
                let resolved = match probe.stat(&key) {
                    Ok(stat) => Some(stat),
                    Err(err) => {
                        log_probe_failure(torrent, &err);
                        None
                    }
                };
                entries.insert(key, resolved);
            }
        }
        debug!(paths = entries.len(), "collected file metadata");
        Self { entries }
    }

    /// Stat result for `path`, or `None` when it was not collected or did not resolve.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<FileStat> {
        self.entries.get(&normalize(path)).copied().flatten()
    }

    /// Number of distinct paths probed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no paths were probed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn log_probe_failure(torrent: &TorrentRecord, err: &ProbeError) {
    match err {
        ProbeError::NotFound { path } | ProbeError::PermissionDenied { path } => info!(
            torrent_id = %torrent.id,
            path = %path.display(),
            reason = %err,
            "file identity unavailable"
        ),
        ProbeError::Io { path, source } => info!(
            torrent_id = %torrent.id,
            path = %path.display(),
            error = %source,
            "file metadata lookup failed"
        ),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::model::TorrentId;
    use anyhow::Result;
    use chrono::Utc;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingProbe {
        calls: AtomicUsize,
    }

    impl FileStatProbe for CountingProbe {
        fn stat(&self, path: &Path) -> ProbeResult<FileStat> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            FsStatProbe.stat(path)
        }
    }

    fn torrent(id: i64, files: Vec<PathBuf>) -> TorrentRecord {
        TorrentRecord {
            id: TorrentId(id),
            name: format!("torrent-{id}"),
            root: PathBuf::from("/"),
            files,
            trackers: Vec::new(),
            added_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn fs_probe_reports_shared_identity_for_hardlinks() -> Result<()> {
        let temp = TempDir::new()?;
        let original = temp.path().join("original.mkv");
        let link = temp.path().join("link.mkv");
        fs::write(&original, b"payload")?;
        fs::hard_link(&original, &link)?;

        let first = FsStatProbe.stat(&original)?;
        let second = FsStatProbe.stat(&link)?;
        assert_eq!(first.identity, second.identity);
        assert_eq!(first.link_count, 2);
        assert_eq!(FsStatProbe.identity(&link)?, first.identity);
        Ok(())
    }

    #[test]
    fn fs_probe_maps_missing_files_to_not_found() -> Result<()> {
        let temp = TempDir::new()?;
        let err = FsStatProbe
            .stat(&temp.path().join("missing"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ProbeError::NotFound { .. }));
        Ok(())
    }

    #[test]
    fn stat_table_probes_each_path_once_and_records_failures() -> Result<()> {
        let temp = TempDir::new()?;
        let shared = temp.path().join("shared.mkv");
        fs::write(&shared, b"payload")?;
        let missing = temp.path().join("gone.mkv");

        let torrents = vec![
            torrent(1, vec![shared.clone(), missing.clone()]),
            torrent(2, vec![temp.path().join("./shared.mkv")]),
        ];
        let probe = CountingProbe {
            calls: AtomicUsize::new(0),
        };

        let table = StatTable::collect(&probe, &torrents);

        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
        assert_eq!(table.len(), 2);
        assert!(table.get(&shared).is_some());
        assert!(table.get(&missing).is_none());
        Ok(())
    }
}
