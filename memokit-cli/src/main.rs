//! memokit command-line front end.
//!
//! ```bash
//! # Ten numbers in [0, 10), one per second
//! memokit numbers
//!
//! # Faster, shorter run
//! memokit numbers --count 3 --delay-ms 200
//!
//! # Fetch a document and narrow it
//! memokit fetch https://api.github.com/orgs/rust-lang --path repos_url
//!
//! # Verbose logging
//! RUST_LOG=debug memokit fetch https://example.com/data.json
//! ```

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use memokit_core::config::MemokitConfig;
use memokit_http::ReqwestTransport;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MemokitConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MemokitConfig::default(),
    };
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    logging::init_logging(&config.logging.level, args.json_logs);

    let mut stdout = std::io::stdout().lock();
    match args.command {
        Command::Numbers { count, delay_ms } => {
            commands::apply_numbers_overrides(&mut config, count, delay_ms)?;
            commands::run_numbers(&config, &mut stdout).await
        }
        Command::Fetch { url, path } => {
            let transport = ReqwestTransport::new(&config.http)?;
            commands::run_fetch(&transport, &url, path.as_deref(), &mut stdout).await
        }
    }
}
