//! Advisory detection of data still referenced from outside a torrent.
//!
//! This flag is informational. It never decides whether data may be deleted; that is
//! the job of [`crate::cross_seed::CrossSeedIndex`].

use std::collections::{BTreeSet, HashMap};

use crate::model::{FileIdentity, TorrentRecord};
use crate::path::normalize;
use crate::probe::StatTable;

/// Answers whether a torrent's files are hardlinked from somewhere else.
#[derive(Debug, Clone, Copy)]
pub struct HardlinkDetector<'a> {
    stats: &'a StatTable,
}

impl<'a> HardlinkDetector<'a> {
    /// Detector reading from a pre-collected stat table.
    #[must_use]
    pub const fn new(stats: &'a StatTable) -> Self {
        Self { stats }
    }

    /// Returns `true` when at least one file has more directory entries than the torrent
    /// itself accounts for.
    ///
    /// Unresolvable files are skipped; a torrent without any resolvable file yields `false`.
    #[must_use]
    pub fn has_external_reference(&self, torrent: &TorrentRecord) -> bool {
        let paths: BTreeSet<_> = torrent.files.iter().map(|file| normalize(file)).collect();

        // identity -> (link count, paths of this torrent pointing at it)
        let mut inodes: HashMap<FileIdentity, (u64, u64)> = HashMap::new();
        for path in &paths {
            if let Some(stat) = self.stats.get(path) {
                inodes.entry(stat.identity).or_insert((stat.link_count, 0)).1 += 1;
            }
        }

        inodes
            .values()
            .any(|&(link_count, own_paths)| link_count > own_paths)
    }
}
