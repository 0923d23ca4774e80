//! Core domain types shared across the workspace.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ActionParseError;

/// Identifier assigned by the client daemon, unique within one daemon session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TorrentId(pub i64);

impl Display for TorrentId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Point-in-time snapshot of one torrent as reported by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Daemon-assigned identifier.
    pub id: TorrentId,
    /// Display name.
    pub name: String,
    /// Download directory the torrent's files live under.
    pub root: PathBuf,
    /// Absolute paths of the torrent's files, in daemon order.
    pub files: Vec<PathBuf>,
    /// Tracker hosts the torrent announces to.
    #[serde(default)]
    pub trackers: Vec<String>,
    /// When the torrent was added to the daemon.
    pub added_at: DateTime<Utc>,
    /// When the download completed, if known.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TorrentRecord {
    /// Time elapsed since completion (or since being added when completion is unknown).
    ///
    /// Timestamps in the future count as zero age.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        let since = self.completed_at.unwrap_or(self.added_at);
        (now - since).max(TimeDelta::zero())
    }
}

/// `(device, inode)` pair used purely as an equality key for file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileIdentity {
    /// Device the inode lives on.
    pub device: u64,
    /// Inode number on that device.
    pub inode: u64,
}

/// Metadata captured for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Content identity of the path.
    pub identity: FileIdentity,
    /// Number of directory entries referencing the inode.
    pub link_count: u64,
}

/// Whether a torrent's data may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyVerdict {
    /// No other torrent entry shares this torrent's content.
    Unprotected,
    /// At least one other torrent entry shares content; data must survive.
    Protected,
}

impl SafetyVerdict {
    /// Returns `true` for [`SafetyVerdict::Protected`].
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Protected)
    }
}

/// Resolved removal instruction for a single torrent.
///
/// Fields are private so a directive that deletes the data of a protected torrent
/// cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovalDirective {
    torrent_id: TorrentId,
    delete_data: bool,
}

impl RemovalDirective {
    /// Remove the torrent entry and leave its data on disk.
    #[must_use]
    pub const fn keep_data(torrent_id: TorrentId) -> Self {
        Self {
            torrent_id,
            delete_data: false,
        }
    }

    /// Remove the torrent entry together with its data, unless `verdict` protects it,
    /// in which case the data is kept.
    #[must_use]
    pub const fn with_data(torrent_id: TorrentId, verdict: SafetyVerdict) -> Self {
        Self {
            torrent_id,
            delete_data: !verdict.is_protected(),
        }
    }

    /// Torrent the directive applies to.
    #[must_use]
    pub const fn torrent_id(&self) -> TorrentId {
        self.torrent_id
    }

    /// Whether the daemon should delete the torrent's data.
    #[must_use]
    pub const fn delete_data(&self) -> bool {
        self.delete_data
    }
}

/// Batch action requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Report candidates only.
    List,
    /// Remove candidates with their data (protected torrents keep their data).
    Delete,
    /// Remove candidates, keeping data.
    Remove,
    /// Ask per torrent.
    Interactive,
}

impl Action {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Delete => "delete",
            Self::Remove => "remove",
            Self::Interactive => "interactive",
        }
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" | "l" => Ok(Self::List),
            "delete" | "d" => Ok(Self::Delete),
            "remove" | "r" => Ok(Self::Remove),
            "interactive" | "i" => Ok(Self::Interactive),
            _ => Err(ActionParseError {
                value: value.to_string(),
            }),
        }
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Per-torrent answer given in interactive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractiveChoice {
    /// Remove the torrent, keep data.
    Remove,
    /// Remove the torrent with data.
    Delete,
    /// Leave the torrent untouched.
    Skip,
}

impl InteractiveChoice {
    /// Interpret a raw answer. Empty or unrecognised input skips.
    #[must_use]
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "r" | "remove" => Self::Remove,
            "d" | "delete" => Self::Delete,
            _ => Self::Skip,
        }
    }
}

/// What the decision engine concluded for one torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// `list` action: nothing to apply.
    ReportOnly,
    /// Interactive skip: nothing to apply.
    Skipped,
    /// A removal should be applied.
    Directive {
        /// Directive to hand to the executor.
        directive: RemovalDirective,
        /// Data deletion was requested but refused because the torrent is protected.
        downgraded: bool,
    },
}

impl Resolution {
    /// The directive to apply, if any.
    #[must_use]
    pub const fn directive(&self) -> Option<RemovalDirective> {
        match self {
            Self::Directive { directive, .. } => Some(*directive),
            Self::ReportOnly | Self::Skipped => None,
        }
    }

    /// Whether a data deletion request was downgraded by protection.
    #[must_use]
    pub const fn is_downgraded(&self) -> bool {
        matches!(
            self,
            Self::Directive {
                downgraded: true,
                ..
            }
        )
    }
}

/// Report entry describing what happened to one candidate torrent.
#[derive(Debug, Clone, Serialize)]
pub struct TorrentOutcome {
    /// Torrent identifier.
    pub id: TorrentId,
    /// Torrent name.
    pub name: String,
    /// Cross-seed safety verdict.
    pub verdict: SafetyVerdict,
    /// Advisory flag: some file is still referenced from outside the torrent.
    pub externally_linked: bool,
    /// Names of the other torrents sharing content with this one.
    pub cross_seeded_with: Vec<String>,
    /// Decision engine outcome.
    pub resolution: Resolution,
    /// Whether the directive was accepted by the daemon.
    pub applied: bool,
    /// Transport failure message when the directive could not be applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TorrentOutcome {
    /// Directive that was successfully applied, if any.
    #[must_use]
    pub const fn directive_applied(&self) -> Option<RemovalDirective> {
        if self.applied {
            self.resolution.directive()
        } else {
            None
        }
    }
}

/// Full result of one cleanup invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Random identifier correlating the report with log output.
    pub run_id: Uuid,
    /// Action that was evaluated.
    pub action: Action,
    /// Per-torrent outcomes in candidate order.
    pub outcomes: Vec<TorrentOutcome>,
}

impl RunReport {
    /// Number of outcomes whose directive failed to apply.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.error.is_some())
            .count()
    }

    /// Directives that were applied, in application order.
    pub fn applied_directives(&self) -> impl Iterator<Item = RemovalDirective> + '_ {
        self.outcomes
            .iter()
            .filter_map(TorrentOutcome::directive_applied)
    }
}
