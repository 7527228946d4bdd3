use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a file could not be reconstructed into statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    UnbalancedDelimiters { depth: usize },
    UnterminatedLiteral { quote: char },
    /// A stream statement (`std::cout << ...`) never reached its `;`.
    MissingTerminator { terminator: char },
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedKind::UnbalancedDelimiters { depth } => {
                write!(f, "{} unclosed delimiter(s) at end of file", depth)
            }
            MalformedKind::UnterminatedLiteral { quote } => {
                write!(f, "unterminated {} literal at end of file", quote)
            }
            MalformedKind::MissingTerminator { terminator } => {
                write!(f, "statement not terminated by '{}' at end of file", terminator)
            }
        }
    }
}

/// Failure scoped to a single file's scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Line numbers are zero-based like `SourceLine::index`; display is one-based.
    #[error("malformed statement at lines {}-{}: {kind}", .start_line + 1, .end_line + 1)]
    MalformedStatement {
        start_line: usize,
        end_line: usize,
        kind: MalformedKind,
    },
}

impl ScanError {
    pub fn line_range(&self) -> (usize, usize) {
        match self {
            ScanError::MalformedStatement {
                start_line,
                end_line,
                ..
            } => (*start_line, *end_line),
        }
    }
}

/// Fatal start-up errors, reported before any file is scanned.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("debug keyword must not be empty")]
    EmptyDebugKeyword,

    #[error("line comment marker must not be empty")]
    EmptyCommentMarker,

    #[error("block comment needs both an opening and a closing marker")]
    UnbalancedBlockMarkers,

    #[error("no output call targets configured")]
    NoOutputTargets,

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum DbgcError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DbgcError>;
