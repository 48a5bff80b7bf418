//! File classification: the naming convention turns a directory of list
//! files into typed records.
//!
//! A file is `{include|exclude}-{ip|domain}-{category}.{lst|rgx}`.
//! Direction and entry-type tokens are case-insensitive. The category is
//! the third dash segment only; trailing segments are discarded with a
//! warning (see DESIGN.md). Files that fail any classification step are
//! skipped with a warning, never aborting the batch.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::GeoforgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Include,
    Exclude,
}

impl FromStr for Direction {
    type Err = GeoforgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "include" => Ok(Direction::Include),
            "exclude" => Ok(Direction::Exclude),
            _ => Err(GeoforgeError::InvalidDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Ip,
    Domain,
}

impl FromStr for EntryType {
    type Err = GeoforgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ip" => Ok(EntryType::Ip),
            "domain" => Ok(EntryType::Domain),
            _ => Err(GeoforgeError::InvalidEntryType(s.to_string())),
        }
    }
}

/// One classified input file. Immutable once built.
///
/// For `.lst` files `lines` holds the surviving value lines and
/// `patterns` is empty; for `.rgx` files `patterns` holds the compiled
/// expressions and `lines` is empty.
#[derive(Debug)]
pub struct RawFileRecord {
    pub path: PathBuf,
    pub category: String,
    pub direction: Direction,
    pub entry_type: EntryType,
    pub is_pattern: bool,
    pub lines: Vec<String>,
    pub patterns: Vec<Regex>,
}

/// Classify a single file by name and read its content.
pub fn classify_file(path: &Path) -> Result<RawFileRecord, GeoforgeError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GeoforgeError::BadFileName(path.display().to_string()))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let is_pattern = match extension {
        "lst" => false,
        "rgx" => true,
        _ => return Err(GeoforgeError::InvalidExtension(format!(".{}", extension))),
    };

    let stem = file_name
        .strip_suffix(&format!(".{}", extension))
        .unwrap_or(file_name);

    let segments: Vec<&str> = stem.split('-').collect();
    if segments.len() < 3 {
        return Err(GeoforgeError::BadFileName(file_name.to_string()));
    }

    let direction = Direction::from_str(segments[0])?;
    let entry_type = EntryType::from_str(segments[1])?;
    let category = segments[2].to_string();
    if segments.len() > 3 {
        warn!(
            "File '{}': naming convention uses only the third segment as \
             category '{}'; discarding trailing '-{}'",
            file_name,
            category,
            segments[3..].join("-")
        );
    }

    let lines = read_value_lines(path)?;

    let (lines, patterns) = if is_pattern {
        (Vec::new(), compile_patterns(path, lines))
    } else {
        (lines, Vec::new())
    };

    Ok(RawFileRecord {
        path: path.to_path_buf(),
        category,
        direction,
        entry_type,
        is_pattern,
        lines,
        patterns,
    })
}

/// Read a list file, dropping blank lines and `#` comments.
fn read_value_lines(path: &Path) -> Result<Vec<String>, GeoforgeError> {
    let content = fs::read_to_string(path)
        .map_err(|e| GeoforgeError::FileSystem(format!("{}: {}", path.display(), e)))?;

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// Compile each line of a `.rgx` file. A line that fails to compile is
/// dropped with a warning; the remaining lines stay active.
fn compile_patterns(path: &Path, lines: Vec<String>) -> Vec<Regex> {
    lines
        .into_iter()
        .filter_map(|line| match Regex::new(&line) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(
                    "File '{}': skipping invalid pattern '{}': {}",
                    path.display(),
                    line,
                    e
                );
                None
            }
        })
        .collect()
}

/// Discover and classify every file under `dir` (recursively).
///
/// Files failing classification are skipped with a warning. The result is
/// ordered by path so downstream stages are deterministic.
pub fn process_dir(dir: &Path) -> Result<Vec<RawFileRecord>> {
    let mut paths = Vec::new();
    collect_files(dir, &mut paths)
        .with_context(|| format!("Failed to read input directory {:?}", dir))?;
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        info!("Reading the file '{}'...", path.display());
        match classify_file(&path) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                "Skipping '{}': does not match the list format: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(records)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_classify_lst_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "include-ip-ads.lst",
            "# header\n1.2.3.4\n\n10.0.0.0/8\n",
        );
        let record = classify_file(&path).unwrap();
        assert_eq!(record.direction, Direction::Include);
        assert_eq!(record.entry_type, EntryType::Ip);
        assert_eq!(record.category, "ads");
        assert!(!record.is_pattern);
        assert_eq!(record.lines, vec!["1.2.3.4", "10.0.0.0/8"]);
        assert!(record.patterns.is_empty());
    }

    #[test]
    fn test_classify_case_insensitive_tokens() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "EXCLUDE-Domain-tracking.lst", "a.example.com\n");
        let record = classify_file(&path).unwrap();
        assert_eq!(record.direction, Direction::Exclude);
        assert_eq!(record.entry_type, EntryType::Domain);
        assert_eq!(record.category, "tracking");
    }

    #[test]
    fn test_classify_rgx_skips_invalid_patterns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "exclude-domain-ads.rgx",
            "^ads\\.\n[invalid\n\\.example\\.com$\n",
        );
        let record = classify_file(&path).unwrap();
        assert!(record.is_pattern);
        // The invalid middle line is dropped, the others survive.
        assert_eq!(record.patterns.len(), 2);
        assert!(record.patterns[0].is_match("ads.example.com"));
        assert!(record.patterns[1].is_match("trk.example.com"));
    }

    #[test]
    fn test_invalid_direction() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "both-ip-ads.lst", "");
        assert!(matches!(
            classify_file(&path),
            Err(GeoforgeError::InvalidDirection(_))
        ));
    }

    #[test]
    fn test_invalid_entry_type() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "include-url-ads.lst", "");
        assert!(matches!(
            classify_file(&path),
            Err(GeoforgeError::InvalidEntryType(_))
        ));
    }

    #[test]
    fn test_invalid_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "include-ip-ads.txt", "");
        assert!(matches!(
            classify_file(&path),
            Err(GeoforgeError::InvalidExtension(_))
        ));
    }

    #[test]
    fn test_too_few_segments() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "include-ip.lst", "");
        assert!(matches!(
            classify_file(&path),
            Err(GeoforgeError::BadFileName(_))
        ));
    }

    #[test]
    fn trailing_segments_are_discarded_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "include-domain-foo-bar.lst", "a.example.com\n");
        let record = classify_file(&path).unwrap();
        // Documented truncation: 'bar' is dropped, the category is 'foo'.
        assert_eq!(record.category, "foo");
    }

    #[test]
    fn test_process_dir_skips_bad_files_and_sorts() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "include-ip-b.lst", "1.1.1.1\n");
        write_file(dir.path(), "include-ip-a.lst", "2.2.2.2\n");
        write_file(dir.path(), "notes.txt", "ignored\n");
        write_file(dir.path(), "badname.lst", "ignored\n");

        let records = process_dir(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        // Sorted by path, not directory order.
        assert_eq!(records[0].category, "a");
        assert_eq!(records[1].category, "b");
    }

    #[test]
    fn test_process_dir_recurses() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        write_file(&sub, "include-domain-deep.lst", "a.example.com\n");

        let records = process_dir(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "deep");
    }

    #[test]
    fn test_missing_dir_is_fatal() {
        assert!(process_dir(Path::new("/nonexistent/geoforge-input")).is_err());
    }
}
