//! Candidate selection by directory, tracker, and age.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::TorrentRecord;
use crate::path::is_within;

/// Default minimum age in days applied by the command-line front end.
pub const DEFAULT_MIN_DAYS: u32 = 7;

/// Filters narrowing the candidate set. Absent filters do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Keep torrents whose root is this directory or nested beneath it.
    pub directory: Option<PathBuf>,
    /// Keep torrents with a tracker host containing this text (case-insensitive).
    pub tracker: Option<String>,
    /// Keep torrents at least this many days old.
    pub min_days: u32,
}

/// Applies [`FilterCriteria`] at a fixed point in time.
#[derive(Debug, Clone)]
pub struct FilterPipeline<'c> {
    criteria: &'c FilterCriteria,
    now: DateTime<Utc>,
    tracker_needle: Option<String>,
}

impl<'c> FilterPipeline<'c> {
    /// Pipeline evaluating ages relative to `now`.
    #[must_use]
    pub fn new(criteria: &'c FilterCriteria, now: DateTime<Utc>) -> Self {
        Self {
            criteria,
            now,
            tracker_needle: criteria.tracker.as_deref().map(str::to_lowercase),
        }
    }

    /// Torrents passing every filter, in input order.
    #[must_use]
    pub fn select<'t>(&self, torrents: &'t [TorrentRecord]) -> Vec<&'t TorrentRecord> {
        torrents
            .iter()
            .filter(|torrent| self.matches(torrent))
            .collect()
    }

    /// Returns `true` when `torrent` passes every filter.
    #[must_use]
    pub fn matches(&self, torrent: &TorrentRecord) -> bool {
        self.matches_directory(&torrent.root)
            && self.matches_tracker(&torrent.trackers)
            && self.meets_age(torrent)
    }

    fn matches_directory(&self, root: &Path) -> bool {
        self.criteria
            .directory
            .as_deref()
            .is_none_or(|directory| is_within(root, directory))
    }

    fn matches_tracker(&self, trackers: &[String]) -> bool {
        self.tracker_needle.as_deref().is_none_or(|needle| {
            trackers
                .iter()
                .any(|host| host.to_lowercase().contains(needle))
        })
    }

    fn meets_age(&self, torrent: &TorrentRecord) -> bool {
        torrent.age(self.now) >= TimeDelta::days(i64::from(self.criteria.min_days))
    }
}
