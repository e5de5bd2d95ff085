use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A position inside one of the scanned source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl AsRef<Path>, line: usize) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Fatal extraction failures
///
/// Every variant aborts the category being built. Degradations that only
/// affect rendering quality are logged instead of raised.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no base declaration file for category {category} in {}", dir.display())]
    MissingBaseType { category: String, dir: PathBuf },

    #[error("{location}: unknown translation key `{key}`")]
    UnknownTranslation { key: String, location: SourceLocation },

    #[error("{location}: `{member}` is not a declared member of {class}")]
    UnknownMember {
        member: String,
        class: String,
        location: SourceLocation,
    },

    #[error("{location}: malformed statement: {reason}")]
    MalformedStatement {
        reason: String,
        location: SourceLocation,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ExtractError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn malformed(location: &SourceLocation, reason: impl Into<String>) -> Self {
        Self::MalformedStatement {
            reason: reason.into(),
            location: location.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
