//! Error types for WBS Core
//!
//! Provides error handling for:
//! - Structural input errors (depth sequence, field count, status values)
//! - Unresolvable inclusion of external sources
//! - Source and configuration IO
//!
//! Scheduling inconsistencies are not errors; the percolator corrects them.

use std::fmt;
use std::path::PathBuf;

/// Main WBS error type
#[derive(Debug, thiserror::Error)]
pub enum WbsError {
    /// Depth sequence cannot be arranged into a tree
    #[error("malformed hierarchy at {location}: {message}")]
    MalformedHierarchy {
        /// Offending row
        location: RowLocation,
        /// What went wrong
        message: String,
    },

    /// Row content is invalid
    #[error("malformed row at {location}: {message}")]
    MalformedRow {
        /// Offending row
        location: RowLocation,
        /// What went wrong
        message: String,
    },

    /// External source could not be included
    #[error("inclusion error: {0}")]
    Inclusion(#[from] InclusionError),

    /// Source file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited record stream could not be decoded
    #[error("record error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl WbsError {
    /// Create malformed hierarchy error for a row
    pub fn malformed_hierarchy(location: RowLocation, message: impl Into<String>) -> Self {
        Self::MalformedHierarchy {
            location,
            message: message.into(),
        }
    }

    /// Create malformed row error
    pub fn malformed_row(location: RowLocation, message: impl Into<String>) -> Self {
        Self::MalformedRow {
            location,
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Row that caused the error, if the error is row-level
    #[must_use]
    pub fn location(&self) -> Option<&RowLocation> {
        match self {
            Self::MalformedHierarchy { location, .. } | Self::MalformedRow { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }

    /// Check if error comes from the shape of the input rather than the environment
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MalformedHierarchy { .. } | Self::MalformedRow { .. }
        )
    }
}

/// Inclusion errors
#[derive(Debug, thiserror::Error)]
pub enum InclusionError {
    /// Included source does not exist or cannot be opened
    #[error("cannot open included source {path} (chain: {})", display_chain(.chain))]
    Missing {
        path: PathBuf,
        chain: Vec<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Source includes itself directly or transitively
    #[error("inclusion cycle: {}", display_chain(.chain))]
    Cycle { chain: Vec<PathBuf> },
}

impl InclusionError {
    /// Inclusion chain leading to the failure, outermost first
    #[must_use]
    pub fn chain(&self) -> &[PathBuf] {
        match self {
            Self::Missing { chain, .. } | Self::Cycle { chain } => chain,
        }
    }
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are individually valid but unusable together
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Position of a row in its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLocation {
    /// Source name (file path or in-memory label)
    pub source: String,
    /// 1-based line number
    pub line: u64,
}

impl RowLocation {
    /// Create new location
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, line: u64) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for RowLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// Result alias for WBS operations
pub type Result<T, E = WbsError> = std::result::Result<T, E>;
