//! Format parsers: raw source bytes in, IP and domain token sequences out.
//!
//! Every parser is total. Malformed structured input never fails the
//! caller: the parser logs a warning and returns two empty sequences.
//! Deduplication is deliberately not done here; the normalizer owns it.

use encoding_rs::WINDOWS_1251;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::warn;

use crate::config::ContentType;

/// Tokens extracted from one source, split by kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedTokens {
    pub ips: Vec<String>,
    pub domains: Vec<String>,
}

impl ParsedTokens {
    pub fn is_empty(&self) -> bool {
        self.ips.is_empty() && self.domains.is_empty()
    }
}

/// Shape a single token can classify as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ipv4,
    Ipv6,
    Domain,
}

/// Classification order for line-classified lists.
///
/// Domains are tested before IP literals; this is safe because
/// [`is_domain_token`] rejects values whose final label is purely numeric,
/// so dotted quads fall through to the IPv4 test.
pub const DEFAULT_LIST_PRIORITY: [TokenKind; 3] =
    [TokenKind::Domain, TokenKind::Ipv4, TokenKind::Ipv6];

/// Classification order for hosts-file lines: address column first.
pub const HOSTS_PRIORITY: [TokenKind; 3] = [TokenKind::Ipv4, TokenKind::Ipv6, TokenKind::Domain];

/// Domain syntax: dot-separated labels of letters, digits, hyphens and a
/// leading `*` wildcard; Cyrillic labels are allowed (several upstream
/// sources carry unencoded IDN zones). The final label must contain at
/// least one letter, which keeps IP literals out of the domain bucket.
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[0-9A-Za-zЀ-ӿ*](?:[0-9A-Za-zЀ-ӿ-]*[0-9A-Za-zЀ-ӿ])?\.)*[0-9-]*[A-Za-zЀ-ӿ][0-9A-Za-zЀ-ӿ-]*$",
    )
    .expect("domain regex is valid")
});

/// True if `token` matches the domain syntax.
pub fn is_domain_token(token: &str) -> bool {
    DOMAIN_RE.is_match(token)
}

/// True if `token` is an IPv4 address, optionally with a `/0..=32` prefix.
pub fn is_ipv4_token(token: &str) -> bool {
    match token.split_once('/') {
        Some((addr, prefix)) => {
            addr.parse::<Ipv4Addr>().is_ok()
                && matches!(prefix.parse::<u8>(), Ok(p) if p <= 32)
        }
        None => token.parse::<Ipv4Addr>().is_ok(),
    }
}

/// True if `token` is an IPv6 address, optionally with a `/0..=128` prefix.
pub fn is_ipv6_token(token: &str) -> bool {
    match token.split_once('/') {
        Some((addr, prefix)) => {
            addr.parse::<Ipv6Addr>().is_ok()
                && matches!(prefix.parse::<u8>(), Ok(p) if p <= 128)
        }
        None => token.parse::<Ipv6Addr>().is_ok(),
    }
}

fn matches_kind(kind: TokenKind, token: &str) -> bool {
    match kind {
        TokenKind::Ipv4 => is_ipv4_token(token),
        TokenKind::Ipv6 => is_ipv6_token(token),
        TokenKind::Domain => is_domain_token(token),
    }
}

/// Classify one token against `priority`, returning the first kind that
/// matches. Tokens satisfying several kinds resolve to the earliest one.
pub fn classify_token(token: &str, priority: &[TokenKind]) -> Option<TokenKind> {
    priority
        .iter()
        .copied()
        .find(|kind| matches_kind(*kind, token))
}

/// Parse raw source content with the parser declared by `content_type`.
///
/// The dispatch is a match over the closed [`ContentType`] set; there is
/// no runtime parser registry.
pub fn parse(content_type: ContentType, raw: &[u8]) -> ParsedTokens {
    match content_type {
        ContentType::DefaultList => parse_default_list(&String::from_utf8_lossy(raw)),
        ContentType::CsvDumpAntizapret => parse_csv_dump(raw),
        ContentType::JsonRublacklistDpi => parse_structured_domains(raw),
        ContentType::JsonListDomains => parse_domain_array(raw),
        ContentType::JsonListIps => parse_ip_array(raw),
        ContentType::HostsFile => parse_hosts_file(&String::from_utf8_lossy(raw)),
    }
}

/// Parse a line-classified list: one IP or domain per line.
pub fn parse_default_list(content: &str) -> ParsedTokens {
    let mut tokens = ParsedTokens::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match classify_token(line, &DEFAULT_LIST_PRIORITY) {
            Some(TokenKind::Ipv4) | Some(TokenKind::Ipv6) => tokens.ips.push(line.to_string()),
            Some(TokenKind::Domain) => tokens.domains.push(line.to_string()),
            None => warn!("Unparsable line dropped: '{}'", line),
        }
    }

    tokens
}

/// Parse a semicolon-delimited Antizapret dump.
///
/// The upstream dump is Windows-1251 encoded; it is transcoded to UTF-8
/// before splitting. Single-column lines are headers and are skipped.
/// Column 0 carries `|`-separated IP tokens, column 1 (when present)
/// `|`-separated domain tokens.
pub fn parse_csv_dump(raw: &[u8]) -> ParsedTokens {
    let (content, _, had_errors) = WINDOWS_1251.decode(raw);
    if had_errors {
        warn!("Some bytes in the dump could not be transcoded from Windows-1251");
    }

    let mut tokens = ParsedTokens::default();

    for line in content.lines() {
        let mut columns = line.split(';');
        let ip_column = columns.next().unwrap_or_default();
        let Some(domain_column) = columns.next() else {
            // Header line, no delimiter.
            continue;
        };

        tokens.ips.extend(
            ip_column
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
        );
        tokens.domains.extend(
            domain_column
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
        );
    }

    tokens
}

/// Parse a JSON array of objects each carrying a `domains` list
/// (Rublacklist DPI registry shape). Lists are concatenated in array order.
pub fn parse_structured_domains(raw: &[u8]) -> ParsedTokens {
    #[derive(Deserialize)]
    struct Entry {
        #[serde(default)]
        domains: Vec<String>,
    }

    let entries: Vec<Entry> = match serde_json::from_slice(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to parse structured domain list: {}", e);
            return ParsedTokens::default();
        }
    };

    ParsedTokens {
        ips: Vec::new(),
        domains: entries.into_iter().flat_map(|e| e.domains).collect(),
    }
}

/// Parse a flat JSON array of domain strings.
pub fn parse_domain_array(raw: &[u8]) -> ParsedTokens {
    match serde_json::from_slice::<Vec<String>>(raw) {
        Ok(domains) => ParsedTokens {
            ips: Vec::new(),
            domains,
        },
        Err(e) => {
            warn!("Failed to parse domain array: {}", e);
            ParsedTokens::default()
        }
    }
}

/// Parse a flat JSON array of IP strings.
pub fn parse_ip_array(raw: &[u8]) -> ParsedTokens {
    match serde_json::from_slice::<Vec<String>>(raw) {
        Ok(ips) => ParsedTokens {
            ips,
            domains: Vec::new(),
        },
        Err(e) => {
            warn!("Failed to parse IP array: {}", e);
            ParsedTokens::default()
        }
    }
}

/// True for address literals a hosts file uses as placeholders rather
/// than data: the loopback ranges and the unspecified address.
fn is_suppressed_host_token(token: &str) -> bool {
    token.starts_with("127.") || token == "0.0.0.0" || token == "::1" || token == "localhost"
}

/// Parse an /etc/hosts style file: whitespace-separated tokens, `#`
/// starts a comment. Loopback literals and `localhost` never reach the
/// output; they are the placeholder column of every hosts blocklist.
pub fn parse_hosts_file(content: &str) -> ParsedTokens {
    let mut tokens = ParsedTokens::default();

    for line in content.lines() {
        let data = line.split('#').next().unwrap_or_default();
        for token in data.split_whitespace() {
            if is_suppressed_host_token(token) {
                continue;
            }
            match classify_token(token, &HOSTS_PRIORITY) {
                Some(TokenKind::Ipv4) | Some(TokenKind::Ipv6) => tokens.ips.push(token.to_string()),
                Some(TokenKind::Domain) => tokens.domains.push(token.to_string()),
                None => warn!("Unparsable hosts token dropped: '{}'", token),
            }
        }
    }

    tokens
}
