//! Normalization: canonical networks, wildcard-domain expansion and
//! order-preserving deduplication.

use anyhow::Result;
use ipnet::IpNet;
use std::collections::HashSet;
use std::hash::Hash;
use std::net::IpAddr;

/// How a domain pattern matches candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Matches the literal value only.
    Exact,
    /// Matches the value and any subdomain of it.
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainPattern {
    pub value: String,
    pub kind: MatchKind,
}

impl DomainPattern {
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: MatchKind::Exact,
        }
    }

    pub fn suffix(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: MatchKind::Suffix,
        }
    }
}

/// Canonicalize an IP value to a fully specified network.
///
/// A value containing `/` parses as a CIDR literal and is truncated to
/// its network address; a bare address becomes a /32 or /128 host
/// network.
pub fn canonical_network(value: &str) -> Result<IpNet> {
    if value.contains('/') {
        let net: IpNet = value
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid CIDR: {}", value))?;
        Ok(net.trunc())
    } else {
        let ip: IpAddr = value
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid IP address: {}", value))?;
        Ok(IpNet::from(ip))
    }
}

/// Expand one domain value into its pattern records.
///
/// A `*`-prefixed value yields two records over the bare root: a suffix
/// pattern (any subdomain) and an exact pattern (the root itself). A
/// plain value yields a single exact record.
pub fn expand_domain(value: &str) -> Vec<DomainPattern> {
    match value.strip_prefix('*') {
        Some(stripped) => {
            let root = stripped.strip_prefix('.').unwrap_or(stripped);
            vec![DomainPattern::suffix(root), DomainPattern::exact(root)]
        }
        None => vec![DomainPattern::exact(value)],
    }
}

/// An ordered sequence that silently drops values it has already seen.
/// Order is first-occurrence order.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    values: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Insert a value; returns false if it was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.seen.insert(value.clone()) {
            self.values.push(value);
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T: Eq + Hash + Clone> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Deduplication preserves first-occurrence order and yields no
        /// duplicates.
        #[test]
        fn prop_ordered_set_invariants(values in prop::collection::vec(0u16..100, 0..200)) {
            let mut set = OrderedSet::new();
            set.extend(values.iter().copied());
            let deduped = set.into_vec();

            // No duplicates.
            let unique: std::collections::HashSet<_> = deduped.iter().collect();
            prop_assert_eq!(unique.len(), deduped.len());

            // First-occurrence order: deduped is a subsequence of values.
            let mut it = values.iter();
            for v in &deduped {
                prop_assert!(it.any(|x| x == v));
            }
        }

        /// Canonicalization of a bare IPv4 always yields a /32.
        #[test]
        fn prop_bare_ipv4_is_slash_32(a: u8, b: u8, c: u8, d: u8) {
            let net = canonical_network(&format!("{}.{}.{}.{}", a, b, c, d)).unwrap();
            prop_assert_eq!(net.prefix_len(), 32);
        }

        /// Canonicalization is idempotent: re-parsing the string form
        /// yields the same network.
        #[test]
        fn prop_canonicalize_idempotent(a: u8, b: u8, c: u8, d: u8, prefix in 0u8..=32) {
            let first = canonical_network(&format!("{}.{}.{}.{}/{}", a, b, c, d, prefix)).unwrap();
            let second = canonical_network(&first.to_string()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
