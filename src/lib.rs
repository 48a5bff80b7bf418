//! # geoforge - geo rule-set generation from block/allow lists
//!
//! Converts heterogeneous block/allow lists (IP addresses, CIDR ranges,
//! domain patterns) gathered from multiple sources into normalized,
//! per-category record sets for downstream artifact encoders.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       geoforge                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: fetch, generate                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_json)                                        │
//! │    └── sources.json: url, category, contentType, isExclude  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── bounded concurrency, source-order merge              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parsers (regex + encoding_rs)                              │
//! │    └── line lists, hosts files, CSV dumps, JSON arrays      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Classifier + Aggregator                                    │
//! │    └── {include|exclude}-{ip|domain}-{category}.{lst|rgx}   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Resolver + Normalizer (ipnet)                              │
//! │    └── exclusion precedence, CIDR canonicalization,         │
//! │        wildcard expansion, order-preserving dedup           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Emit (Encoder trait)                                       │
//! │    └── rule-set JSON built in; binary encoders external     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use geoforge::aggregator::FileIndex;
//! use geoforge::classifier::process_dir;
//! use geoforge::generator::build_record_sets;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let records = process_dir(Path::new("./lists"))?;
//!     let index = FileIndex::build(records);
//!     let record_sets = build_record_sets(&index);
//!
//!     for (category, records) in record_sets.iter() {
//!         println!(
//!             "{}: {} networks, {} domain patterns",
//!             category,
//!             records.networks.len(),
//!             records.domains.len()
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Identical inputs yield byte-identical, order-identical outputs:
//!   files are processed in sorted path order, categories in name order,
//!   and every sequence deduplicates preserving first occurrence.
//! - A value matched by its category's exclude records (literal or
//!   pattern) is never emitted, for any artifact.
//! - Per-file, per-line and per-source failures are skipped with a
//!   warning; only configuration errors abort a run.
//!
//! ## Modules
//!
//! - [`aggregator`] - record lookup keyed by direction/type/category
//! - [`classifier`] - file naming convention and list reading
//! - [`cli`] - command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - sources.json parsing and validation
//! - [`emit`] - record sets and the encoder boundary
//! - [`fetcher`] - HTTP client for downloading sources
//! - [`generator`] - exclusion resolution + normalization driver
//! - [`normalizer`] - canonical networks and wildcard expansion
//! - [`parsers`] - format parsers and token classification
//! - [`resolver`] - literal/pattern exclusion filters

pub mod aggregator;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod emit;
pub mod error;
pub mod fetcher;
pub mod generator;
pub mod normalizer;
pub mod parsers;
pub mod resolver;

pub use config::Config;
pub use error::GeoforgeError;
