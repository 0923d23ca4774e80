//! One cleanup invocation: probe, index, filter, decide, apply.

use chrono::{DateTime, Utc};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::cross_seed::CrossSeedIndex;
use crate::decision::resolve;
use crate::executor::ActionExecutor;
use crate::filter::{FilterCriteria, FilterPipeline};
use crate::hardlink::HardlinkDetector;
use crate::model::{Action, InteractiveChoice, RunReport, TorrentOutcome, TorrentRecord};
use crate::probe::{FileStatProbe, StatTable};
use crate::service::{ChoiceSource, PromptContext, TorrentRemover};

/// Parameters of one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Requested action; `None` behaves like [`Action::Interactive`].
    pub action: Option<Action>,
    /// Candidate filters.
    pub criteria: FilterCriteria,
    /// Drop candidates whose files are hardlinked from outside the torrent.
    pub only_unlinked: bool,
    /// Reference time for age filtering.
    pub now: DateTime<Utc>,
}

impl RunRequest {
    /// Request with the given action and filters, evaluated at the current time.
    #[must_use]
    pub fn new(action: Option<Action>, criteria: FilterCriteria) -> Self {
        Self {
            action,
            criteria,
            only_unlinked: false,
            now: Utc::now(),
        }
    }

    /// Action after applying the interactive default.
    #[must_use]
    pub fn effective_action(&self) -> Action {
        self.action.unwrap_or(Action::Interactive)
    }
}

/// Runs cleanup passes against a probe and a removal capability.
#[derive(Debug)]
pub struct CleanupService<P, R> {
    probe: P,
    remover: R,
}

impl<P, R> CleanupService<P, R>
where
    P: FileStatProbe,
    R: TorrentRemover,
{
    /// Service using `probe` for filesystem metadata and `remover` for removals.
    #[must_use]
    pub const fn new(probe: P, remover: R) -> Self {
        Self { probe, remover }
    }

    /// Removal capability backing the service.
    #[must_use]
    pub const fn remover(&self) -> &R {
        &self.remover
    }

    /// Evaluate `torrents` and apply the resulting directives.
    ///
    /// `torrents` must be the full daemon snapshot: cross-seed detection considers every
    /// entry, including those the filters exclude.
    pub async fn run(
        &self,
        torrents: &[TorrentRecord],
        request: &RunRequest,
        choices: &mut dyn ChoiceSource,
    ) -> RunReport {
        self.run_with_observer(torrents, request, choices, &mut |_| {})
            .await
    }

    /// Same as [`CleanupService::run`], calling `observer` as each outcome becomes final.
    pub async fn run_with_observer(
        &self,
        torrents: &[TorrentRecord],
        request: &RunRequest,
        choices: &mut dyn ChoiceSource,
        observer: &mut (dyn FnMut(&TorrentOutcome) + Send),
    ) -> RunReport {
        let run_id = Uuid::new_v4();
        let action = request.effective_action();
        let span = info_span!("cleanup_run", %run_id, action = action.as_str());
        let outcomes = self
            .evaluate(torrents, request, action, choices, observer)
            .instrument(span)
            .await;
        RunReport {
            run_id,
            action,
            outcomes,
        }
    }

    async fn evaluate(
        &self,
        torrents: &[TorrentRecord],
        request: &RunRequest,
        action: Action,
        choices: &mut dyn ChoiceSource,
        observer: &mut (dyn FnMut(&TorrentOutcome) + Send),
    ) -> Vec<TorrentOutcome> {
        let stats = StatTable::collect(&self.probe, torrents);
        let index = CrossSeedIndex::build(torrents, &stats);
        let detector = HardlinkDetector::new(&stats);
        let executor = ActionExecutor::new(&self.remover);

        let mut candidates = FilterPipeline::new(&request.criteria, request.now).select(torrents);
        if request.only_unlinked {
            candidates.retain(|torrent| !detector.has_external_reference(torrent));
        }
        info!(
            total = torrents.len(),
            candidates = candidates.len(),
            cross_seeded = index.len(),
            "candidates selected"
        );

        let mut outcomes = Vec::with_capacity(candidates.len());
        for torrent in candidates {
            let verdict = index.verdict(torrent.id);
            let externally_linked = detector.has_external_reference(torrent);

            let choice = if action == Action::Interactive {
                let prompt = PromptContext {
                    torrent,
                    verdict,
                    externally_linked,
                };
                Some(read_choice(choices, &prompt))
            } else {
                None
            };

            let resolution = resolve(action, torrent.id, verdict, choice);
            debug!(torrent_id = %torrent.id, ?resolution, "resolved");

            let (applied, error) = match executor.apply(torrent, &resolution).await {
                Ok(applied) => (applied.is_some(), None),
                Err(err) => (false, Some(err.to_string())),
            };

            let outcome = TorrentOutcome {
                id: torrent.id,
                name: torrent.name.clone(),
                verdict,
                externally_linked,
                cross_seeded_with: index
                    .peers(torrent.id)
                    .iter()
                    .map(|peer| peer.name.clone())
                    .collect(),
                resolution,
                applied,
                error,
            };
            observer(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn read_choice(choices: &mut dyn ChoiceSource, prompt: &PromptContext<'_>) -> InteractiveChoice {
    match choices.choose(prompt) {
        Ok(answer) => InteractiveChoice::parse(&answer),
        Err(err) => {
            warn!(torrent_id = %prompt.torrent.id, error = %err, "failed to read answer; skipping");
            InteractiveChoice::Skip
        }
    }
}
