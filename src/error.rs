//! Error types for geoforge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoforgeError {
    #[error("Invalid direction '{0}', expected 'include' or 'exclude'")]
    InvalidDirection(String),

    #[error("Invalid entry type '{0}', expected 'ip' or 'domain'")]
    InvalidEntryType(String),

    #[error("Invalid extension '{0}', expected '.lst' or '.rgx'")]
    InvalidExtension(String),

    #[error("File name '{0}' does not match '{{include|exclude}}-{{ip|domain}}-{{category}}'")]
    BadFileName(String),

    #[error("File system error: {0}")]
    FileSystem(String),
}
