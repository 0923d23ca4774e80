//! Fake collaborators: an in-memory probe and a recording daemon.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use unlinked_core::{
    FileIdentity, FileStat, FileStatProbe, ProbeError, ProbeResult, TorrentCatalog, TorrentId,
    TorrentRecord, TorrentRemover, TransportError, TransportResult,
};

/// Probe answering from a fixed table; unknown paths are reported missing.
#[derive(Debug, Default)]
pub struct StaticProbe {
    entries: HashMap<PathBuf, FileStat>,
}

impl StaticProbe {
    /// Empty probe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` with the given inode (device 1) and link count.
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, inode: u64, link_count: u64) -> Self {
        self.entries.insert(
            path.into(),
            FileStat {
                identity: FileIdentity { device: 1, inode },
                link_count,
            },
        );
        self
    }
}

impl FileStatProbe for StaticProbe {
    fn stat(&self, path: &Path) -> ProbeResult<FileStat> {
        self.entries
            .get(path)
            .copied()
            .ok_or_else(|| ProbeError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Daemon fake recording every removal call.
#[derive(Debug, Default)]
pub struct RecordingDaemon {
    torrents: Vec<TorrentRecord>,
    calls: Mutex<Vec<(TorrentId, bool)>>,
    rejected: HashSet<TorrentId>,
    offline: bool,
}

impl RecordingDaemon {
    /// Daemon serving `torrents`.
    #[must_use]
    pub fn new(torrents: Vec<TorrentRecord>) -> Self {
        Self {
            torrents,
            ..Self::default()
        }
    }

    /// Reject removals of `id`.
    #[must_use]
    pub fn rejecting(mut self, id: TorrentId) -> Self {
        self.rejected.insert(id);
        self
    }

    /// Fail every listing call.
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Removal calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(TorrentId, bool)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TorrentCatalog for RecordingDaemon {
    async fn list_torrents(&self) -> TransportResult<Vec<TorrentRecord>> {
        if self.offline {
            return Err(TransportError::connection("torrent-get", "daemon offline"));
        }
        Ok(self.torrents.clone())
    }
}

#[async_trait]
impl TorrentRemover for RecordingDaemon {
    async fn remove_torrent(&self, id: TorrentId, delete_data: bool) -> TransportResult<()> {
        self.calls
            .lock()
            .map_err(|_| TransportError::removal(id, "recorder poisoned"))?
            .push((id, delete_data));
        if self.rejected.contains(&id) {
            return Err(TransportError::removal(id, "torrent not found"));
        }
        Ok(())
    }
}
