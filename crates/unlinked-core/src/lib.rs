#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Decides which torrents may be removed, and whether their data may go with them.
//!
//! Layout:
//! - `probe.rs`: stat lookups and the per-run [`StatTable`]
//! - `hardlink.rs`: advisory external-reference detection
//! - `cross_seed.rs`: the [`CrossSeedIndex`], the only gate on data deletion
//! - `filter.rs`: candidate selection
//! - `decision.rs`: the pure (action, verdict, answer) to directive mapping
//! - `executor.rs`: applies directives through a [`TorrentRemover`]
//! - `run.rs`: [`CleanupService`] tying the passes together

pub mod cross_seed;
pub mod decision;
pub mod error;
pub mod executor;
pub mod filter;
pub mod hardlink;
pub mod model;
pub mod path;
pub mod probe;
pub mod run;
pub mod service;

pub use cross_seed::CrossSeedIndex;
pub use decision::resolve;
pub use error::{ActionParseError, ProbeError, ProbeResult, TransportError, TransportResult};
pub use executor::ActionExecutor;
pub use filter::{DEFAULT_MIN_DAYS, FilterCriteria, FilterPipeline};
pub use hardlink::HardlinkDetector;
pub use model::{
    Action, FileIdentity, FileStat, InteractiveChoice, RemovalDirective, Resolution, RunReport,
    SafetyVerdict, TorrentId, TorrentOutcome, TorrentRecord,
};
pub use probe::{FileStatProbe, FsStatProbe, StatTable};
pub use run::{CleanupService, RunRequest};
pub use service::{ChoiceSource, PromptContext, ScriptedChoices, TorrentCatalog, TorrentRemover};
