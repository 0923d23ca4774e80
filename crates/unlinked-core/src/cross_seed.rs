//! Cross-seed detection: which torrents share on-disk content with other torrents.
//!
//! The index is the only mechanism allowed to protect data from deletion.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::model::{FileIdentity, SafetyVerdict, TorrentId, TorrentRecord};
use crate::path::normalize;
use crate::probe::StatTable;

/// Grouping key for one file. Unresolvable files fall back to their path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum ContentKey {
    Identity(FileIdentity),
    Path(PathBuf),
}

/// Immutable map from torrent id to the other torrents sharing its content.
///
/// Symmetric: if `a` lists `b`, then `b` lists `a`. Peer lists follow the input order.
#[derive(Debug, Default)]
pub struct CrossSeedIndex<'a> {
    peers: HashMap<TorrentId, Vec<&'a TorrentRecord>>,
}

impl<'a> CrossSeedIndex<'a> {
    /// Build the index over the full torrent set.
    ///
    /// Each file is keyed once and owners are collected per key, so the work is linear in
    /// the number of files plus the size of each sharing group.
    #[must_use]
    pub fn build(torrents: &'a [TorrentRecord], stats: &StatTable) -> Self {
        let mut owners: HashMap<ContentKey, Vec<usize>> = HashMap::new();
        for (position, torrent) in torrents.iter().enumerate() {
            let keys: BTreeSet<ContentKey> = torrent
                .files
                .iter()
                .map(|file| content_key(file, stats))
                .collect();
            for key in keys {
                owners.entry(key).or_default().push(position);
            }
        }

        let mut related: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); torrents.len()];
        for positions in owners.values().filter(|positions| positions.len() > 1) {
            for &left in positions {
                for &right in positions {
                    if torrents[left].id != torrents[right].id {
                        related[left].insert(right);
                    }
                }
            }
        }

        let mut peers: HashMap<TorrentId, Vec<&'a TorrentRecord>> = HashMap::new();
        for (position, others) in related.into_iter().enumerate() {
            if others.is_empty() {
                continue;
            }
            peers
                .entry(torrents[position].id)
                .or_default()
                .extend(others.into_iter().map(|other| &torrents[other]));
        }

        Self { peers }
    }

    /// Other torrents sharing content with `id`; empty when not cross-seeded.
    #[must_use]
    pub fn peers(&self, id: TorrentId) -> &[&'a TorrentRecord] {
        self.peers.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns `true` when `id` shares content with at least one other torrent.
    #[must_use]
    pub fn is_cross_seeded(&self, id: TorrentId) -> bool {
        !self.peers(id).is_empty()
    }

    /// Safety verdict for `id`.
    #[must_use]
    pub fn verdict(&self, id: TorrentId) -> SafetyVerdict {
        if self.is_cross_seeded(id) {
            SafetyVerdict::Protected
        } else {
            SafetyVerdict::Unprotected
        }
    }

    /// Number of cross-seeded torrents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Returns `true` when no torrent is cross-seeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

fn content_key(file: &Path, stats: &StatTable) -> ContentKey {
    stats.get(file).map_or_else(
        || ContentKey::Path(normalize(file)),
        |stat| ContentKey::Identity(stat.identity),
    )
}
