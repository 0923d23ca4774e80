#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line front end removing finished torrents from a Transmission daemon
//! without deleting data that cross-seeded torrents still use.
//!
//! Layout:
//! - `cli.rs`: argument parsing and the run flow
//! - `client.rs`: CLI error type and exit codes
//! - `transmission.rs`: JSON-RPC transport implementing the core collaborator traits
//! - `prompt.rs`: console answers for interactive mode
//! - `output.rs`: table and JSON report renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod output;
pub(crate) mod prompt;
pub(crate) mod transmission;

pub use cli::run;
