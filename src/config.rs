//! Source configuration for geoforge.
//!
//! A `sources.json` file declares where raw lists are downloaded from and
//! which parser decodes each of them. The fetch step writes its results
//! into `{include|exclude}-{ip|domain}-{category}.lst` files under
//! `path`, which is also the input directory for the generate step.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level `sources.json` structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the fetch step writes list files into.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Ordered source descriptors. Order is significant: results are
    /// merged back in this order, and later sources overwrite earlier
    /// ones that target the same list file.
    #[serde(default)]
    pub sources: Vec<Source>,
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}

/// One remote list source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub url: String,

    /// Category label attached to every record this source produces.
    pub category: String,

    pub content_type: ContentType,

    /// Exclude sources become subtraction filters for the same category,
    /// never emitted data.
    #[serde(default)]
    pub is_exclude: bool,

    /// Override for the IP list file this source writes to.
    #[serde(default)]
    pub ip_filename: Option<PathBuf>,

    /// Override for the domain list file this source writes to.
    #[serde(default)]
    pub domain_filename: Option<PathBuf>,
}

impl Source {
    fn direction_token(&self) -> &'static str {
        if self.is_exclude {
            "exclude"
        } else {
            "include"
        }
    }

    /// Target file for IP tokens parsed out of this source.
    pub fn ip_target(&self, dir: &Path) -> PathBuf {
        self.ip_filename.clone().unwrap_or_else(|| {
            dir.join(format!(
                "{}-ip-{}.lst",
                self.direction_token(),
                self.category
            ))
        })
    }

    /// Target file for domain tokens parsed out of this source.
    pub fn domain_target(&self, dir: &Path) -> PathBuf {
        self.domain_filename.clone().unwrap_or_else(|| {
            dir.join(format!(
                "{}-domain-{}.lst",
                self.direction_token(),
                self.category
            ))
        })
    }
}

/// Declared format of a source's raw content.
///
/// A closed set: dispatch to the matching parser is a `match` in
/// [`crate::parsers::parse`], built into the binary rather than a mutable
/// runtime table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// One IP or domain per line, classified per line.
    DefaultList,
    /// Semicolon-delimited Antizapret dump, Windows-1251 encoded.
    CsvDumpAntizapret,
    /// Rublacklist JSON: array of objects each carrying a domain list.
    #[serde(rename = "JsonRublacklistDPI")]
    JsonRublacklistDpi,
    /// JSON array of domain strings.
    JsonListDomains,
    /// JSON array of IP strings.
    #[serde(rename = "JsonListIPs")]
    JsonListIps,
    /// /etc/hosts style two-column lines.
    HostsFile,
}

impl Config {
    /// Load and validate a `sources.json` file.
    ///
    /// Any failure here is fatal for the run: a missing or malformed
    /// source descriptor file means there is nothing sensible to fetch.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read sources file: {:?}", path.as_ref()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse sources file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate source descriptors.
    pub fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if source.category.is_empty() {
                anyhow::bail!("Source '{}' has an empty category", source.url);
            }
            if source.category.contains('-') {
                anyhow::bail!(
                    "Source category '{}' must not contain '-': the file naming \
                     convention uses it as a separator",
                    source.category
                );
            }
            if !source.url.starts_with("https://") {
                anyhow::bail!("Source URL must use HTTPS: {}", source.url);
            }
        }
        Ok(())
    }
}
