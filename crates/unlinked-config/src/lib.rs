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

//! Connection settings for the Transmission daemon.
//!
//! Layout: `model.rs` (typed settings and defaults), `loader.rs` (daemon
//! `settings.json` loading and override resolution), `validate.rs` (field checks).

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_settings_file, normalize_rpc_url, parse_settings, resolve};
pub use model::{
    ConnectionConfig, ConnectionOverrides, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RPC_PATH, Protocol,
};
pub use validate::validate;
