//! Applies resolved directives through the daemon transport.

use tracing::{error, info, warn};

use crate::error::TransportResult;
use crate::model::{RemovalDirective, Resolution, TorrentRecord};
use crate::service::TorrentRemover;

/// Hands directives to a [`TorrentRemover`], one call per directive, never retried.
#[derive(Debug)]
pub struct ActionExecutor<'r, R: ?Sized> {
    remover: &'r R,
}

impl<'r, R> ActionExecutor<'r, R>
where
    R: TorrentRemover + ?Sized,
{
    /// Executor issuing removals through `remover`.
    #[must_use]
    pub const fn new(remover: &'r R) -> Self {
        Self { remover }
    }

    /// Apply the directive carried by `resolution`.
    ///
    /// Returns the applied directive, or `None` when there was nothing to apply.
    ///
    /// # Errors
    ///
    /// Propagates the remover's failure unchanged.
    pub async fn apply(
        &self,
        torrent: &TorrentRecord,
        resolution: &Resolution,
    ) -> TransportResult<Option<RemovalDirective>> {
        let Some(directive) = resolution.directive() else {
            return Ok(None);
        };

        if resolution.is_downgraded() {
            warn!(
                torrent_id = %torrent.id,
                name = %torrent.name,
                "cross-seeded torrent: removing entry only, keeping data"
            );
        }

        match self
            .remover
            .remove_torrent(directive.torrent_id(), directive.delete_data())
            .await
        {
            Ok(()) => {
                info!(
                    torrent_id = %torrent.id,
                    name = %torrent.name,
                    delete_data = directive.delete_data(),
                    "torrent removed"
                );
                Ok(Some(directive))
            }
            Err(err) => {
                error!(
                    torrent_id = %torrent.id,
                    name = %torrent.name,
                    delete_data = directive.delete_data(),
                    error = %err,
                    "torrent removal failed"
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::resolve;
    use crate::error::TransportError;
    use crate::model::{Action, SafetyVerdict, TorrentId};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(TorrentId, bool)>>,
        fail: bool,
    }

    #[async_trait]
    impl TorrentRemover for Recorder {
        async fn remove_torrent(&self, id: TorrentId, delete_data: bool) -> TransportResult<()> {
            self.calls
                .lock()
                .map_err(|_| TransportError::removal(id, "poisoned"))?
                .push((id, delete_data));
            if self.fail {
                Err(TransportError::removal(id, "daemon said no"))
            } else {
                Ok(())
            }
        }
    }

    fn torrent() -> TorrentRecord {
        TorrentRecord {
            id: TorrentId(8),
            name: "eight".into(),
            root: PathBuf::from("/"),
            files: Vec::new(),
            trackers: Vec::new(),
            added_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn no_directive_is_a_no_op() -> anyhow::Result<()> {
        let recorder = Recorder::default();
        let executor = ActionExecutor::new(&recorder);
        let torrent = torrent();

        let applied = executor
            .apply(
                &torrent,
                &resolve(Action::List, torrent.id, SafetyVerdict::Unprotected, None),
            )
            .await?;

        assert!(applied.is_none());
        assert!(recorder.calls.lock().expect("lock").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn directive_is_issued_once() -> anyhow::Result<()> {
        let recorder = Recorder::default();
        let executor = ActionExecutor::new(&recorder);
        let torrent = torrent();

        let applied = executor
            .apply(
                &torrent,
                &resolve(Action::Delete, torrent.id, SafetyVerdict::Unprotected, None),
            )
            .await?;

        assert_eq!(applied.map(|directive| directive.delete_data()), Some(true));
        assert_eq!(
            recorder.calls.lock().expect("lock").as_slice(),
            &[(TorrentId(8), true)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failures_propagate_without_retry() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let executor = ActionExecutor::new(&recorder);
        let torrent = torrent();

        let err = executor
            .apply(
                &torrent,
                &resolve(Action::Remove, torrent.id, SafetyVerdict::Unprotected, None),
            )
            .await
            .expect_err("removal should fail");

        assert!(matches!(
            err,
            TransportError::Removal { ref reason, .. } if reason == "daemon said no"
        ));
        assert_eq!(recorder.calls.lock().expect("lock").len(), 1);
    }
}
