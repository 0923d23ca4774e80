#![forbid(unsafe_code)]

//! `transmission-unlinked` entry point.

#[tokio::main]
async fn main() {
    std::process::exit(unlinked_cli::run().await);
}
