//! Record-set generation: aggregated include records pushed through
//! exclusion resolution and normalization.

use tracing::{debug, info, warn};

use crate::aggregator::FileIndex;
use crate::classifier::EntryType;
use crate::emit::RecordSets;
use crate::normalizer::{canonical_network, expand_domain, OrderedSet};
use crate::resolver::ExclusionFilter;

/// Build the per-category record sets for one run.
///
/// Iterates the include records in deterministic order; every candidate
/// value is tested against its category's exclude records before
/// normalization adds it. Identical inputs always yield identical
/// sequences.
pub fn build_record_sets(index: &FileIndex) -> RecordSets {
    let mut sets = RecordSets::default();

    for record in index.includes() {
        let filter = ExclusionFilter::for_category(index, record.entry_type, &record.category);

        match record.entry_type {
            EntryType::Ip => {
                info!("Adding IP addresses from '{}'...", record.path.display());
                let mut networks = OrderedSet::new();
                for line in &record.lines {
                    let net = match canonical_network(line) {
                        Ok(net) => net,
                        Err(e) => {
                            warn!("File '{}': {}", record.path.display(), e);
                            continue;
                        }
                    };
                    if filter.excludes_network(line, &net) {
                        debug!("'{}' suppressed by exclude list", line);
                        continue;
                    }
                    networks.insert(net);
                }
                sets.entry(&record.category)
                    .networks
                    .extend(networks.into_vec());
            }
            EntryType::Domain => {
                info!("Adding domains from '{}'...", record.path.display());
                let mut domains = OrderedSet::new();
                for line in &record.lines {
                    if filter.excludes_domain(line) {
                        debug!("'{}' suppressed by exclude list", line);
                        continue;
                    }
                    domains.extend(expand_domain(line));
                }
                sets.entry(&record.category)
                    .domains
                    .extend(domains.into_vec());
            }
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Direction, RawFileRecord};
    use crate::normalizer::DomainPattern;
    use regex::Regex;
    use std::path::PathBuf;

    fn lst(
        name: &str,
        direction: Direction,
        entry_type: EntryType,
        category: &str,
        lines: &[&str],
    ) -> RawFileRecord {
        RawFileRecord {
            path: PathBuf::from(name),
            category: category.to_string(),
            direction,
            entry_type,
            is_pattern: false,
            lines: lines.iter().map(|s| s.to_string()).collect(),
            patterns: Vec::new(),
        }
    }

    fn rgx(name: &str, entry_type: EntryType, category: &str, patterns: &[&str]) -> RawFileRecord {
        RawFileRecord {
            path: PathBuf::from(name),
            category: category.to_string(),
            direction: Direction::Exclude,
            entry_type,
            is_pattern: true,
            lines: Vec::new(),
            patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
        }
    }

    #[test]
    fn test_wildcard_include_with_literal_exclude() {
        let index = FileIndex::build(vec![
            lst(
                "include-domain-ads.lst",
                Direction::Include,
                EntryType::Domain,
                "ads",
                &["ads.example.com", "*.trk.example.com"],
            ),
            lst(
                "exclude-domain-ads.lst",
                Direction::Exclude,
                EntryType::Domain,
                "ads",
                &["ads.example.com"],
            ),
        ]);
        let sets = build_record_sets(&index);
        let records = sets.get("ads").unwrap();
        assert_eq!(
            records.domains,
            vec![
                DomainPattern::suffix("trk.example.com"),
                DomainPattern::exact("trk.example.com"),
            ]
        );
    }

    #[test]
    fn test_network_exclusion_by_containment() {
        let index = FileIndex::build(vec![
            lst(
                "include-ip-ads.lst",
                Direction::Include,
                EntryType::Ip,
                "ads",
                &["10.0.0.0/8", "192.168.1.1"],
            ),
            lst(
                "exclude-ip-ads.lst",
                Direction::Exclude,
                EntryType::Ip,
                "ads",
                &["10.0.1.0/24"],
            ),
        ]);
        let sets = build_record_sets(&index);
        let records = sets.get("ads").unwrap();
        // 10.0.0.0/8 contains the excluded /24 and is suppressed.
        assert_eq!(records.networks.len(), 1);
        assert_eq!(records.networks[0].to_string(), "192.168.1.1/32");
    }

    #[test]
    fn test_pattern_exclusion_applies_to_ips_and_domains() {
        let index = FileIndex::build(vec![
            lst(
                "include-ip-ads.lst",
                Direction::Include,
                EntryType::Ip,
                "ads",
                &["192.168.1.1", "8.8.8.8"],
            ),
            rgx("exclude-ip-ads.rgx", EntryType::Ip, "ads", &[r"^192\.168\."]),
            lst(
                "include-domain-ads.lst",
                Direction::Include,
                EntryType::Domain,
                "ads",
                &["metrics.example.com", "cdn.example.com"],
            ),
            rgx(
                "exclude-domain-ads.rgx",
                EntryType::Domain,
                "ads",
                &[r"^metrics\."],
            ),
        ]);
        let sets = build_record_sets(&index);
        let records = sets.get("ads").unwrap();
        assert_eq!(records.networks.len(), 1);
        assert_eq!(records.networks[0].to_string(), "8.8.8.8/32");
        assert_eq!(records.domains, vec![DomainPattern::exact("cdn.example.com")]);
    }

    #[test]
    fn test_exclusions_scoped_to_category() {
        let index = FileIndex::build(vec![
            lst(
                "include-domain-ads.lst",
                Direction::Include,
                EntryType::Domain,
                "ads",
                &["shared.example.com"],
            ),
            lst(
                "include-domain-social.lst",
                Direction::Include,
                EntryType::Domain,
                "social",
                &["shared.example.com"],
            ),
            lst(
                "exclude-domain-ads.lst",
                Direction::Exclude,
                EntryType::Domain,
                "ads",
                &["shared.example.com"],
            ),
        ]);
        let sets = build_record_sets(&index);
        assert!(sets.get("ads").unwrap().domains.is_empty());
        assert_eq!(
            sets.get("social").unwrap().domains,
            vec![DomainPattern::exact("shared.example.com")]
        );
    }

    #[test]
    fn test_malformed_ip_lines_dropped_not_fatal() {
        let index = FileIndex::build(vec![lst(
            "include-ip-ads.lst",
            Direction::Include,
            EntryType::Ip,
            "ads",
            &["garbage", "1.2.3.4", "300.1.1.1"],
        )]);
        let sets = build_record_sets(&index);
        let records = sets.get("ads").unwrap();
        assert_eq!(records.networks.len(), 1);
        assert_eq!(records.networks[0].to_string(), "1.2.3.4/32");
    }

    #[test]
    fn test_duplicates_collapse_first_seen() {
        let index = FileIndex::build(vec![lst(
            "include-ip-ads.lst",
            Direction::Include,
            EntryType::Ip,
            "ads",
            &["1.2.3.4", "1.2.3.4/32", "5.6.7.8", "1.2.3.4"],
        )]);
        let sets = build_record_sets(&index);
        let strings: Vec<String> = sets
            .get("ads")
            .unwrap()
            .networks
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(strings, vec!["1.2.3.4/32", "5.6.7.8/32"]);
    }

    #[test]
    fn test_exclude_records_never_emit() {
        let index = FileIndex::build(vec![lst(
            "exclude-ip-ads.lst",
            Direction::Exclude,
            EntryType::Ip,
            "ads",
            &["1.2.3.4"],
        )]);
        let sets = build_record_sets(&index);
        assert!(sets.is_empty());
    }
}
