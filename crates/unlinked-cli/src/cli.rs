//! Argument parsing and the cleanup run flow.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use unlinked_config::{
    ConfigError, ConnectionOverrides, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RPC_PATH, Protocol,
};
use unlinked_core::{
    Action, ChoiceSource, CleanupService, DEFAULT_MIN_DAYS, FileStatProbe, FilterCriteria,
    FsStatProbe, RunReport, RunRequest, TorrentCatalog, TorrentRecord, TorrentRemover,
};
use unlinked_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};

use crate::client::{CliError, CliResult};
use crate::output::ReportWriter;
use crate::prompt::ConsolePrompt;
use crate::transmission::TransmissionClient;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parses CLI arguments, runs one cleanup pass, and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.into(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }

    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let password = resolve_password(cli.password.clone())?;
    let config = unlinked_config::resolve(cli.connection_overrides(password))
        .map_err(CliError::config)?;
    let client = TransmissionClient::connect(&config, Duration::from_secs(cli.timeout))
        .await
        .map_err(CliError::connection)?;
    let torrents = client.list_torrents().await.map_err(CliError::failure)?;

    let request = cli.run_request();
    info!(
        torrents = torrents.len(),
        action = request.effective_action().as_str(),
        only_unlinked = request.only_unlinked,
        "starting cleanup"
    );

    let service = CleanupService::new(FsStatProbe, client);
    let (report, _) = render_run(
        &service,
        &torrents,
        &request,
        &mut ConsolePrompt::stdio(),
        ReportWriter::new(cli.output, io::stdout()),
    )
    .await?;

    match report.failures() {
        0 => Ok(()),
        failed => Err(CliError::failure(anyhow!(
            "{failed} removal(s) failed; see the report above"
        ))),
    }
}

/// Runs one pass, streaming outcomes into `writer`, and returns the report with the
/// writer's sink.
async fn render_run<P, R, W>(
    service: &CleanupService<P, R>,
    torrents: &[TorrentRecord],
    request: &RunRequest,
    choices: &mut dyn ChoiceSource,
    mut writer: ReportWriter<W>,
) -> CliResult<(RunReport, W)>
where
    P: FileStatProbe,
    R: TorrentRemover,
    W: Write + Send,
{
    let report = service
        .run_with_observer(torrents, request, choices, &mut |outcome| {
            writer.outcome(outcome);
        })
        .await;
    let out = writer.finish(&report)?;
    Ok((report, out))
}

fn resolve_password(explicit: Option<String>) -> CliResult<String> {
    password_from(explicit, io::stdin().is_terminal(), || {
        rpassword::prompt_password("Transmission password: ")
    })
}

fn password_from(
    explicit: Option<String>,
    interactive: bool,
    read: impl FnOnce() -> io::Result<String>,
) -> CliResult<String> {
    if let Some(password) = explicit {
        return Ok(password);
    }
    if interactive {
        read().map_err(|err| CliError::validation(format!("failed to read password: {err}")))
    } else {
        warn!("no password supplied and stdin is not a terminal");
        Err(CliError::config(ConfigError::MissingPassword))
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "transmission-unlinked",
    version,
    about = "Remove finished Transmission torrents without deleting data other torrents still seed"
)]
pub(crate) struct Cli {
    /// Transmission daemon settings.json; used together with --password.
    #[arg(long, value_name = "PATH")]
    settings_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ProtocolArg::Http)]
    protocol: ProtocolArg,
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(long)]
    username: Option<String>,
    #[arg(long, env = "TRANSMISSION_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// RPC endpoint path.
    #[arg(long, default_value = DEFAULT_RPC_PATH)]
    path: String,
    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    /// Only consider torrents stored in this directory or below it.
    #[arg(long = "dir", value_name = "DIR")]
    directory: Option<PathBuf>,
    /// Only consider torrents announcing to a tracker containing this text.
    #[arg(long)]
    tracker: Option<String>,
    /// Only consider torrents at least this many days old.
    #[arg(long, default_value_t = DEFAULT_MIN_DAYS)]
    min_days: u32,
    /// What to do with candidates; asks per torrent when omitted.
    #[arg(long, value_enum)]
    action: Option<ActionArg>,
    /// Also consider torrents whose files are still hardlinked elsewhere.
    #[arg(long)]
    include_linked: bool,
    #[arg(
        long = "output",
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select the report format"
    )]
    output: OutputFormat,
    #[arg(long, env = "UNLINKED_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty)]
    log_format: LogFormatArg,
}

impl Cli {
    fn connection_overrides(&self, password: String) -> ConnectionOverrides {
        ConnectionOverrides {
            settings_file: self.settings_file.clone(),
            protocol: Some(self.protocol.into()),
            host: Some(self.host.clone()),
            port: Some(self.port),
            username: self.username.clone(),
            password: Some(password),
            path: Some(self.path.clone()),
        }
    }

    fn run_request(&self) -> RunRequest {
        let criteria = FilterCriteria {
            directory: self.directory.clone(),
            tracker: self.tracker.clone(),
            min_days: self.min_days,
        };
        let mut request = RunRequest::new(self.action.map(Action::from), criteria);
        request.only_unlinked = !self.include_linked;
        request
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ActionArg {
    #[value(alias = "l")]
    List,
    #[value(alias = "d")]
    Delete,
    #[value(alias = "r")]
    Remove,
    #[value(alias = "i")]
    Interactive,
}

impl From<ActionArg> for Action {
    fn from(value: ActionArg) -> Self {
        match value {
            ActionArg::List => Self::List,
            ActionArg::Delete => Self::Delete,
            ActionArg::Remove => Self::Remove,
            ActionArg::Interactive => Self::Interactive,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ProtocolArg {
    Http,
    Https,
}

impl From<ProtocolArg> for Protocol {
    fn from(value: ProtocolArg) -> Self {
        match value {
            ProtocolArg::Http => Self::Http,
            ProtocolArg::Https => Self::Https,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}
