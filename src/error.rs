//! Typed failures surfaced by the generator.
//!
//! Only structural conditions live here. Best-effort conditions (a snippet
//! that does not parse, a field type nothing resolves) are absorbed where they
//! happen and at most logged.
use std::path::PathBuf;

use thiserror::Error;

/// The grammar source could not be obtained.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed reading {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("invalid glob pattern '{pattern}': {reason}")]
    BadPattern { pattern: String, reason: String },

    #[error("glob pattern matched no files: {pattern}")]
    NoMatch { pattern: String },
}

/// A generation request that cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("no record types found in the input")]
    NoRecords,

    #[error("type '{name}' not found; available record types: {}", available.join(", "))]
    UnknownType { name: String, available: Vec<String> },
}
