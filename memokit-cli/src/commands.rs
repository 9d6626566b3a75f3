//! Subcommand bodies, written against `Write` and `JsonTransport` so they run
//! the same on stdout and a live client as on buffers and stubs.

use std::io::Write;

use anyhow::{Context, Result};
use futures::StreamExt;
use memokit_core::config::MemokitConfig;
use memokit_core::numbers::delayed_numbers;
use memokit_core::{access_nested_map, parse_path};
use memokit_http::{JsonTransport, get_json};
use tracing::info;

/// Apply `numbers` flag overrides to `config` and re-validate it.
pub fn apply_numbers_overrides(
    config: &mut MemokitConfig,
    count: Option<usize>,
    delay_ms: Option<u64>,
) -> Result<()> {
    if let Some(count) = count {
        config.generator.count = count;
    }
    if let Some(delay_ms) = delay_ms {
        config.generator.delay_ms = delay_ms;
    }
    config.validate()?;
    Ok(())
}

/// Stream the delayed numbers to `out`, one per line, then their sum.
pub async fn run_numbers<W: Write>(config: &MemokitConfig, out: &mut W) -> Result<()> {
    info!(
        count = config.generator.count,
        delay_ms = config.generator.delay_ms,
        "streaming delayed numbers"
    );

    let mut numbers = Box::pin(delayed_numbers(&config.generator));
    let mut received = 0_usize;
    let mut total = 0.0_f64;
    while let Some(value) = numbers.next().await {
        writeln!(out, "{value:.6}")?;
        out.flush()?;
        received += 1;
        total += value;
    }
    writeln!(out, "total: {total:.6}")?;
    info!(received, total, "stream finished");
    Ok(())
}

/// Fetch `url`, narrow it to the dotted `path` if given, and pretty-print it.
///
/// The path is checked before any request is made.
pub async fn run_fetch<T, W>(transport: &T, url: &str, path: Option<&str>, out: &mut W) -> Result<()>
where
    T: JsonTransport + ?Sized,
    W: Write,
{
    let keys = path.map(parse_path).transpose()?;

    let body = get_json(transport, url)
        .await
        .with_context(|| format!("fetching {url}"))?;
    let selected = match &keys {
        Some(keys) => access_nested_map(&body, keys)?,
        None => &body,
    };

    writeln!(out, "{}", serde_json::to_string_pretty(selected)?)?;
    Ok(())
}
