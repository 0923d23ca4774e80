//! Report renderers.

use std::io::{self, Write};

use anyhow::anyhow;
use unlinked_core::{Action, Resolution, RunReport, TorrentOutcome};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Writes outcomes as they become final and the summary once the run ends.
///
/// The observer callback cannot fail, so the first write error is kept and
/// surfaced by [`ReportWriter::finish`].
pub(crate) struct ReportWriter<W> {
    format: OutputFormat,
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> ReportWriter<W> {
    pub(crate) const fn new(format: OutputFormat, out: W) -> Self {
        Self {
            format,
            out,
            error: None,
        }
    }

    pub(crate) fn outcome(&mut self, outcome: &TorrentOutcome) {
        if self.format != OutputFormat::Table || self.error.is_some() {
            return;
        }
        let written = format_outcome(outcome)
            .iter()
            .try_for_each(|line| writeln!(self.out, "{line}"));
        if let Err(err) = written {
            self.error = Some(err);
        }
    }

    pub(crate) fn finish(mut self, report: &RunReport) -> CliResult<W> {
        if let Some(err) = self.error.take() {
            return Err(CliError::failure(anyhow!("failed to write report: {err}")));
        }
        let text = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
            OutputFormat::Table => format_summary(report),
        };
        writeln!(self.out, "{text}")
            .and_then(|()| self.out.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write report: {err}")))?;
        Ok(self.out)
    }
}

pub(crate) fn format_outcome(outcome: &TorrentOutcome) -> Vec<String> {
    let mut lines = vec![format!("{:>5}  {}", outcome.id.0, outcome.name)];
    if !outcome.cross_seeded_with.is_empty() {
        lines.push(format!(
            "       [CROSS-SEEDED] shares data with: {}",
            outcome.cross_seeded_with.join(", ")
        ));
    }
    if outcome.externally_linked {
        lines.push("       still hardlinked outside this torrent".to_string());
    }
    if outcome.resolution.is_downgraded() {
        lines.push("       [PROTECTED] data kept; removing the torrent only".to_string());
    }
    match (&outcome.resolution, &outcome.error) {
        (_, Some(error)) => lines.push(format!("       [ERROR] {error}")),
        (Resolution::Skipped, None) => lines.push("       [SKIP] left in place".to_string()),
        (Resolution::Directive { directive, .. }, None) if outcome.applied => {
            let what = if directive.delete_data() {
                "removed torrent and data"
            } else {
                "removed torrent, data kept"
            };
            lines.push(format!("       [ACTION] {what}"));
        }
        (Resolution::Directive { .. } | Resolution::ReportOnly, None) => {}
    }
    lines
}

pub(crate) fn format_summary(report: &RunReport) -> String {
    let candidates = report.outcomes.len();
    if report.action == Action::List {
        return format!("{candidates} candidate(s)");
    }
    let removed = report.applied_directives().count();
    let with_data = report
        .applied_directives()
        .filter(|directive| directive.delete_data())
        .count();
    format!(
        "{candidates} candidate(s), {removed} removed ({with_data} with data), {} failed",
        report.failures()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use unlinked_core::{RemovalDirective, SafetyVerdict, TorrentId};

    fn report(action: Action, outcomes: Vec<TorrentOutcome>) -> RunReport {
        RunReport {
            run_id: Default::default(),
            action,
            outcomes,
        }
    }

    fn outcome(id: i64, resolution: Resolution) -> TorrentOutcome {
        TorrentOutcome {
            id: TorrentId(id),
            name: format!("torrent-{id}"),
            verdict: SafetyVerdict::Unprotected,
            externally_linked: false,
            cross_seeded_with: Vec::new(),
            resolution,
            applied: resolution.directive().is_some(),
            error: None,
        }
    }

    #[test]
    fn protected_delete_shows_cross_seed_and_protection() {
        let outcome = TorrentOutcome {
            verdict: SafetyVerdict::Protected,
            cross_seeded_with: vec!["Film (other tracker)".into()],
            ..outcome(
                1,
                Resolution::Directive {
                    directive: RemovalDirective::with_data(TorrentId(1), SafetyVerdict::Protected),
                    downgraded: true,
                },
            )
        };

        let lines = format_outcome(&outcome);

        assert_eq!(lines[0], "    1  torrent-1");
        assert!(lines[1].contains("[CROSS-SEEDED] shares data with: Film (other tracker)"));
        assert!(lines[2].contains("[PROTECTED]"));
        assert!(lines[3].contains("[ACTION] removed torrent, data kept"));
    }

    #[test]
    fn skips_and_errors_use_their_markers() {
        let skipped = format_outcome(&outcome(2, Resolution::Skipped));
        assert!(skipped[1].contains("[SKIP]"));

        let failed = TorrentOutcome {
            applied: false,
            error: Some("removal of torrent 3 failed: torrent not found".into()),
            ..outcome(
                3,
                Resolution::Directive {
                    directive: RemovalDirective::keep_data(TorrentId(3)),
                    downgraded: false,
                },
            )
        };
        let failed = format_outcome(&failed);
        assert!(failed[1].contains("[ERROR] removal of torrent 3 failed"));

        let listed = format_outcome(&outcome(4, Resolution::ReportOnly));
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn table_writer_streams_outcomes_then_summary() -> anyhow::Result<()> {
        let deleted = outcome(
            1,
            Resolution::Directive {
                directive: RemovalDirective::with_data(TorrentId(1), SafetyVerdict::Unprotected),
                downgraded: false,
            },
        );
        let skipped = outcome(2, Resolution::Skipped);
        let mut writer = ReportWriter::new(OutputFormat::Table, Vec::new());
        writer.outcome(&deleted);
        writer.outcome(&skipped);

        let out = writer
            .finish(&report(Action::Interactive, vec![deleted, skipped]))
            .map_err(|err| anyhow!(err.display_message()))?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("[ACTION] removed torrent and data"));
        assert!(text.contains("[SKIP]"));
        assert!(text.ends_with("2 candidate(s), 1 removed (1 with data), 0 failed\n"));
        Ok(())
    }

    #[test]
    fn json_writer_prints_only_the_report() -> anyhow::Result<()> {
        let listed = outcome(7, Resolution::ReportOnly);
        let mut writer = ReportWriter::new(OutputFormat::Json, Vec::new());
        writer.outcome(&listed);

        let out = writer
            .finish(&report(Action::List, vec![listed]))
            .map_err(|err| anyhow!(err.display_message()))?;
        let value: serde_json::Value = serde_json::from_slice(&out)?;

        assert_eq!(value["action"], "list");
        assert_eq!(value["outcomes"][0]["id"], 7);
        assert_eq!(value["outcomes"][0]["resolution"]["kind"], "report_only");
        Ok(())
    }
}
