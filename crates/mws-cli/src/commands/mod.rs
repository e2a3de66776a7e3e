//! Shared plumbing for the `mws` subcommands.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use mws_config::{MwsConfig, UnusedKeyPolicy};
use mws_http::HttpClientFactory;
use mws_orders::{OrdersError, Transport};

/// Load layered config, resolve keys from the environment and initialise a
/// transport over signed HTTP.
pub fn build_transport(config_paths: &[String]) -> Result<Transport> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = mws_config::load_layered_yaml(&path_refs)?;

    let report = mws_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for pointer in &report.unused_leaf_pointers {
        warn!(%pointer, "unused config key");
    }

    let cfg = MwsConfig::from_config_json(&loaded.config_json)?;
    let secrets = mws_config::resolve_secrets(&loaded.config_json)?;
    info!(
        config_hash = %loaded.config_hash,
        endpoint = %cfg.endpoint,
        merchant_id = %cfg.merchant_id,
        "config loaded"
    );

    let factory = HttpClientFactory::with_timeout(cfg.http_timeout);
    let transport = Transport::init(&cfg.to_settings_bag(&secrets), &factory)
        .context("transport init failed")?
        .with_window(cfg.time_window()?);
    Ok(transport)
}

/// Write each record as one JSON line on stdout. Stops at the first error.
/// Returns the number of records written.
pub fn print_json_lines<T, I>(what: &str, records: I) -> Result<usize>
where
    T: Serialize,
    I: Iterator<Item = Result<T, OrdersError>>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut n = 0usize;
    for record in records {
        let record = record.with_context(|| format!("{what} sync failed after {n} record(s)"))?;
        serde_json::to_writer(&mut out, &record).context("json serialize failed")?;
        out.write_all(b"\n").context("stdout write failed")?;
        n += 1;
    }
    out.flush().context("stdout flush failed")?;
    info!(what, count = n, "done");
    Ok(n)
}
