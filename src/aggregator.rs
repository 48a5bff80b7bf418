//! Category aggregation: classified file records keyed by
//! (direction, entry type, pattern flag, category).
//!
//! Only include records that are not pattern files are primary emission
//! data; every other record exists solely to answer exclusion lookups.

use std::collections::HashMap;
use tracing::warn;

use crate::classifier::{Direction, EntryType, RawFileRecord};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub direction: Direction,
    pub entry_type: EntryType,
    pub is_pattern: bool,
    pub category: String,
}

impl FileKey {
    fn of(record: &RawFileRecord) -> Self {
        Self {
            direction: record.direction,
            entry_type: record.entry_type,
            is_pattern: record.is_pattern,
            category: record.category.clone(),
        }
    }
}

/// Lookup over all classified records of one run.
#[derive(Debug, Default)]
pub struct FileIndex {
    records: HashMap<FileKey, RawFileRecord>,
}

impl FileIndex {
    /// Build the index. When two files collide on the same key the later
    /// one wins; the collision is warned about because it usually means
    /// two sources were configured onto the same category.
    pub fn build(records: Vec<RawFileRecord>) -> Self {
        let mut index = FileIndex::default();
        for record in records {
            let key = FileKey::of(&record);
            let path = record.path.clone();
            if let Some(previous) = index.records.insert(key, record) {
                warn!(
                    "'{}' replaces '{}': same direction, entry type and category",
                    path.display(),
                    previous.path.display()
                );
            }
        }
        index
    }

    /// Include records eligible for emission, in deterministic path order.
    pub fn includes(&self) -> Vec<&RawFileRecord> {
        let mut includes: Vec<&RawFileRecord> = self
            .records
            .values()
            .filter(|r| r.direction == Direction::Include && !r.is_pattern)
            .collect();
        includes.sort_by(|a, b| a.path.cmp(&b.path));
        includes
    }

    /// The literal (value-list) exclude record for a category, if any.
    ///
    /// `None` means no exclude file exists for this category; `Some` with
    /// empty lines means the file exists but excludes nothing.
    pub fn exclude_literal(&self, entry_type: EntryType, category: &str) -> Option<&RawFileRecord> {
        self.lookup(entry_type, false, category)
    }

    /// The pattern (regex-list) exclude record for a category, if any.
    pub fn exclude_pattern(&self, entry_type: EntryType, category: &str) -> Option<&RawFileRecord> {
        self.lookup(entry_type, true, category)
    }

    fn lookup(
        &self,
        entry_type: EntryType,
        is_pattern: bool,
        category: &str,
    ) -> Option<&RawFileRecord> {
        self.records.get(&FileKey {
            direction: Direction::Exclude,
            entry_type,
            is_pattern,
            category: category.to_string(),
        })
    }
}
