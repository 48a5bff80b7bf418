//! Fetch command implementation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::fetcher::Fetcher;

/// Run the fetch command: download every configured source and write the
/// parsed tokens into list files under the input directory.
pub async fn run(sources_path: &Path, input_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load(sources_path)
        .with_context(|| format!("Failed to load sources from {:?}", sources_path))?;

    if config.sources.is_empty() {
        warn!("No sources configured in {:?}", sources_path);
        return Ok(());
    }

    let dir = input_dir.unwrap_or_else(|| config.path.clone());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create list directory {:?}", dir))?;

    let fetcher = Fetcher::new()?;
    let summary = fetcher.fetch_all(&config.sources, &dir).await;

    for outcome in &summary.succeeded {
        info!(
            "Source '{}' ({}) - {} IPs, {} domains",
            outcome.url, outcome.category, outcome.ip_count, outcome.domain_count
        );
    }
    for (url, error) in &summary.failed {
        warn!("Source '{}' failed: {}", url, error);
    }

    info!(
        "Fetched {} source(s), {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );

    if summary.succeeded.is_empty() {
        anyhow::bail!("Every configured source failed to fetch");
    }

    Ok(())
}
