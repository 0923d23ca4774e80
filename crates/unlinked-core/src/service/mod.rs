//! Collaborator traits implemented outside the core (daemon transport, console input).

use std::collections::VecDeque;
use std::io;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::model::{SafetyVerdict, TorrentId, TorrentRecord};

/// Source of the torrent snapshot evaluated by a run.
#[async_trait]
pub trait TorrentCatalog: Send + Sync {
    /// Fetch every torrent known to the daemon.
    async fn list_torrents(&self) -> TransportResult<Vec<TorrentRecord>>;
}

/// Capability to remove a torrent from the daemon.
#[async_trait]
pub trait TorrentRemover: Send + Sync {
    /// Remove `id`, deleting its data when `delete_data` is set.
    async fn remove_torrent(&self, id: TorrentId, delete_data: bool) -> TransportResult<()>;
}

/// What the user sees when asked about one torrent.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// Torrent being asked about.
    pub torrent: &'a TorrentRecord,
    /// Cross-seed verdict for the torrent.
    pub verdict: SafetyVerdict,
    /// Advisory hardlink flag.
    pub externally_linked: bool,
}

/// Sequential, blocking source of interactive answers.
pub trait ChoiceSource: Send {
    /// Ask about one torrent and return the raw answer.
    ///
    /// End of input should be reported as an empty answer.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the answer cannot be read; callers treat it as a skip.
    fn choose(&mut self, prompt: &PromptContext<'_>) -> io::Result<String>;
}

/// Replays a fixed list of answers, then answers empty.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChoices {
    answers: VecDeque<String>,
    asked: Vec<TorrentId>,
}

impl ScriptedChoices {
    /// Script answering with `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Torrents asked about so far, in prompt order.
    #[must_use]
    pub fn asked(&self) -> &[TorrentId] {
        &self.asked
    }
}

impl ChoiceSource for ScriptedChoices {
    fn choose(&mut self, prompt: &PromptContext<'_>) -> io::Result<String> {
        self.asked.push(prompt.torrent.id);
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
