//! HTTP fetcher: downloads each configured source, parses it with the
//! parser its content type declares, and writes the tokens back into
//! naming-convention list files.

use anyhow::{Context, Result};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Source;
use crate::parsers::{self, ParsedTokens};

const TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 2000;

/// Maximum size per source download (10 MB). The largest known upstream
/// dump is well under this.
const MAX_SOURCE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum concurrent downloads. Results are still merged in source
/// order, never completion order.
const MAX_CONCURRENT_REQUESTS: usize = 6;

/// What one successfully processed source produced.
#[derive(Debug)]
pub struct FetchOutcome {
    pub url: String,
    pub category: String,
    pub ip_count: usize,
    pub domain_count: usize,
}

/// Per-run summary. Failed sources are skipped, not fatal; the caller
/// decides what an empty success list means.
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub succeeded: Vec<FetchOutcome>,
    pub failed: Vec<(String, String)>,
}

/// HTTP client for downloading sources.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("geoforge/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Download and parse one source.
    pub async fn fetch_source(&self, source: &Source) -> Result<ParsedTokens> {
        info!("Downloading '{}'...", source.url);
        let raw = self
            .fetch_with_retry(&source.url)
            .await
            .with_context(|| format!("Failed to fetch {}", source.url))?;

        debug!("Parsing '{}' ({} bytes)", source.url, raw.len());
        Ok(parsers::parse(source.content_type, &raw))
    }

    /// Download, parse and write every source, bounded-concurrently.
    ///
    /// `buffered` (not `buffer_unordered`) keeps completion results in
    /// source order, so files on disk are written deterministically even
    /// when two sources target the same path.
    pub async fn fetch_all(&self, sources: &[Source], dir: &Path) -> FetchSummary {
        use futures::stream::{self, StreamExt};

        let results: Vec<(usize, Result<ParsedTokens>)> =
            stream::iter(sources.iter().enumerate().map(|(i, source)| async move {
                (i, self.fetch_source(source).await)
            }))
            .buffered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await;

        let mut summary = FetchSummary::default();
        for (i, result) in results {
            let source = &sources[i];
            match result.and_then(|tokens| {
                write_tokens(&tokens, source, dir)?;
                Ok(tokens)
            }) {
                Ok(tokens) => summary.succeeded.push(FetchOutcome {
                    url: source.url.clone(),
                    category: source.category.clone(),
                    ip_count: tokens.ips.len(),
                    domain_count: tokens.domains.len(),
                }),
                Err(e) => {
                    warn!("Skipping source '{}': {:#}", source.url, e);
                    summary.failed.push((source.url.clone(), format!("{:#}", e)));
                }
            }
        }
        summary
    }

    /// Fetch raw bytes with retry, exponential backoff and a size cap.
    async fn fetch_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = RETRY_DELAY_MS * (1 << (attempt - 1));
                debug!("Retry {} after {}ms for {}", attempt, delay, url);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        if let Some(content_length) = response.content_length() {
                            if content_length as usize > MAX_SOURCE_SIZE {
                                anyhow::bail!(
                                    "Response too large: {} bytes (max: {} bytes)",
                                    content_length,
                                    MAX_SOURCE_SIZE
                                );
                            }
                        }

                        let body = response
                            .bytes()
                            .await
                            .context("Failed to read response body")?;

                        if body.len() > MAX_SOURCE_SIZE {
                            anyhow::bail!(
                                "Downloaded content too large: {} bytes (max: {} bytes)",
                                body.len(),
                                MAX_SOURCE_SIZE
                            );
                        }

                        return Ok(body.to_vec());
                    }
                    last_error = Some(anyhow::anyhow!("HTTP {}", response.status()));
                }
                Err(e) => {
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }
}

/// Write parsed tokens to the source's target list files. Empty token
/// sets write nothing, so a domain-only source leaves no stray IP file.
fn write_tokens(tokens: &ParsedTokens, source: &Source, dir: &Path) -> Result<()> {
    if !tokens.ips.is_empty() {
        let path = source.ip_target(dir);
        write_list(&tokens.ips, &path)?;
        info!("Parsed IP addresses written to '{}'", path.display());
    }
    if !tokens.domains.is_empty() {
        let path = source.domain_target(dir);
        write_list(&tokens.domains, &path)?;
        info!("Parsed domains written to '{}'", path.display());
    }
    Ok(())
}

/// Write one value per line, atomically (tempfile + rename), so a crash
/// mid-write never leaves a truncated list behind.
fn write_list(values: &[String], path: &Path) -> Result<()> {
    use tempfile::NamedTempFile;

    let parent = path.parent().unwrap_or(Path::new("."));
    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;

    for value in values {
        writeln!(temp_file, "{}", value)
            .with_context(|| format!("Failed to write list file {:?}", path))?;
    }
    temp_file.flush().context("Failed to flush list file")?;
    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist list file {:?}", path))?;
    Ok(())
}
