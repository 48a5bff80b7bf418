//! Output boundary: normalized per-category record sets and the encoder
//! contract consumed by artifact writers.
//!
//! Only the rule-set JSON encoder ships here. Binary geo-database
//! writers are external collaborators implementing the same [`Encoder`]
//! trait over the same record sets.

use anyhow::{Context, Result};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info};

use crate::normalizer::{DomainPattern, MatchKind};

/// Stable, deduplicated, order-preserving records for one category.
#[derive(Debug, Default, Clone)]
pub struct CategoryRecords {
    pub networks: Vec<IpNet>,
    pub domains: Vec<DomainPattern>,
}

impl CategoryRecords {
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty() && self.domains.is_empty()
    }
}

/// All categories of one run, ordered by category name so every
/// traversal is deterministic.
#[derive(Debug, Default)]
pub struct RecordSets {
    categories: BTreeMap<String, CategoryRecords>,
}

impl RecordSets {
    pub fn entry(&mut self, category: &str) -> &mut CategoryRecords {
        self.categories.entry(category.to_string()).or_default()
    }

    pub fn get(&self, category: &str) -> Option<&CategoryRecords> {
        self.categories.get(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryRecords)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// One rule block of a rule-set document.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub domain: Vec<String>,
    pub domain_suffix: Vec<String>,
    pub ip_cidr: Vec<String>,
}

/// The rule-set JSON document shape.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSet {
    pub version: u32,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub const VERSION: u32 = 1;

    /// Build a single-rule set from category records, keeping sequence
    /// order.
    pub fn from_records(records: &CategoryRecords) -> Self {
        let mut rule = Rule::default();
        for pattern in &records.domains {
            match pattern.kind {
                MatchKind::Exact => rule.domain.push(pattern.value.clone()),
                MatchKind::Suffix => rule.domain_suffix.push(pattern.value.clone()),
            }
        }
        rule.ip_cidr = records.networks.iter().map(|n| n.to_string()).collect();
        Self {
            version: Self::VERSION,
            rules: vec![rule],
        }
    }
}

/// An artifact writer fed one category at a time.
pub trait Encoder {
    fn name(&self) -> &'static str;

    fn emit(&self, category: &str, records: &CategoryRecords, out_dir: &Path) -> Result<()>;
}

/// Writes `ip-<category>.json` / `domain-<category>.json` rule-set
/// documents.
pub struct RuleSetJsonEncoder;

impl RuleSetJsonEncoder {
    fn write(&self, path: &Path, rule_set: &RuleSet) -> Result<()> {
        let json = serde_json::to_string_pretty(rule_set)
            .context("Failed to serialize rule-set")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write rule-set file {:?}", path))?;
        info!("Wrote rule-set '{}'", path.display());
        Ok(())
    }
}

impl Encoder for RuleSetJsonEncoder {
    fn name(&self) -> &'static str {
        "rule-set-json"
    }

    /// A category with networks gets an `ip-` document, a category with
    /// domain patterns a `domain-` document; a category carrying both
    /// gets both files, each holding only its own kind.
    fn emit(&self, category: &str, records: &CategoryRecords, out_dir: &Path) -> Result<()> {
        if !records.networks.is_empty() {
            let rule_set = RuleSet::from_records(&CategoryRecords {
                networks: records.networks.clone(),
                domains: Vec::new(),
            });
            self.write(&out_dir.join(format!("ip-{}.json", category)), &rule_set)?;
        }
        if !records.domains.is_empty() {
            let rule_set = RuleSet::from_records(&CategoryRecords {
                networks: Vec::new(),
                domains: records.domains.clone(),
            });
            self.write(&out_dir.join(format!("domain-{}.json", category)), &rule_set)?;
        }
        Ok(())
    }
}

/// Run every encoder over every category. A failing (encoder, category)
/// pair is logged and skipped; everything else is still attempted.
/// Returns the number of failures.
pub fn emit_all(record_sets: &RecordSets, encoders: &[&dyn Encoder], out_dir: &Path) -> usize {
    let mut failures = 0;
    for encoder in encoders {
        for (category, records) in record_sets.iter() {
            if records.is_empty() {
                continue;
            }
            if let Err(e) = encoder.emit(category, records, out_dir) {
                error!(
                    "Encoder '{}' failed for category '{}': {:#}",
                    encoder.name(),
                    category,
                    e
                );
                failures += 1;
            }
        }
    }
    failures
}
