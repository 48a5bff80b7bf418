//! Exclusion resolution: include candidates tested against the literal
//! and pattern exclude records of their own category and entry type.
//!
//! The literal record is consulted first, then the pattern record,
//! short-circuiting on the first match. A single match suppresses the
//! candidate for every output artifact.

use ipnet::IpNet;
use tracing::warn;

use crate::aggregator::FileIndex;
use crate::classifier::{EntryType, RawFileRecord};
use crate::normalizer::canonical_network;

/// Exclusion filter for one (category, entry type) pair, resolved once
/// per include record rather than per candidate.
pub struct ExclusionFilter<'a> {
    literal: Option<&'a RawFileRecord>,
    pattern: Option<&'a RawFileRecord>,
    /// Exclude lines of an IP literal record, parsed up front. Lines that
    /// fail to parse are warned about and do not filter anything.
    literal_nets: Vec<IpNet>,
}

impl<'a> ExclusionFilter<'a> {
    pub fn for_category(index: &'a FileIndex, entry_type: EntryType, category: &str) -> Self {
        let literal = index.exclude_literal(entry_type, category);
        let pattern = index.exclude_pattern(entry_type, category);

        let literal_nets = match (entry_type, literal) {
            (EntryType::Ip, Some(record)) => record
                .lines
                .iter()
                .filter_map(|line| match canonical_network(line) {
                    Ok(net) => Some(net),
                    Err(e) => {
                        warn!("File '{}': {}", record.path.display(), e);
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            literal,
            pattern,
            literal_nets,
        }
    }

    /// True if a domain candidate is excluded: exact line equality in the
    /// literal record, or the first matching regex in file order.
    pub fn excludes_domain(&self, value: &str) -> bool {
        if let Some(record) = self.literal {
            if record.lines.iter().any(|line| line == value) {
                return true;
            }
        }
        self.matches_pattern(value)
    }

    /// True if an IP candidate is excluded. Literal exclusion is
    /// containment in either direction: the candidate inside an excluded
    /// network, or an excluded address inside the candidate's range
    /// (equality of two host networks is the degenerate case of both).
    /// Pattern exclusion tests the regex against the original string form.
    pub fn excludes_network(&self, value: &str, net: &IpNet) -> bool {
        if self
            .literal_nets
            .iter()
            .any(|excluded| contains(excluded, net) || contains(net, excluded))
        {
            return true;
        }
        self.matches_pattern(value)
    }

    fn matches_pattern(&self, value: &str) -> bool {
        match self.pattern {
            Some(record) => record.patterns.iter().any(|regex| regex.is_match(value)),
            None => false,
        }
    }
}

/// Check if `container` fully contains `contained`. Mixed-family pairs
/// never contain each other.
fn contains(container: &IpNet, contained: &IpNet) -> bool {
    match (container, contained) {
        (IpNet::V4(c), IpNet::V4(t)) => c.contains(t),
        (IpNet::V6(c), IpNet::V6(t)) => c.contains(t),
        _ => false,
    }
}
