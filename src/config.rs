use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_DEBUG_KEYWORD: &str = "debug";

/// Comment markers of the host syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentSyntax {
    pub line_marker: String,
    pub block_open: Option<String>,
    pub block_close: Option<String>,
}

impl Default for CommentSyntax {
    fn default() -> Self {
        Self {
            line_marker: "//".to_string(),
            block_open: Some("/*".to_string()),
            block_close: Some("*/".to_string()),
        }
    }
}

impl CommentSyntax {
    /// Both block markers, if the syntax has block comments.
    pub fn block(&self) -> Option<(&str, &str)> {
        match (&self.block_open, &self.block_close) {
            (Some(open), Some(close)) => Some((open.as_str(), close.as_str())),
            _ => None,
        }
    }
}

/// Format placeholder families masked out of literals before keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    /// `%d`, `%-5.2f`, `%v`
    Printf,
    /// `{}`, `{name:?}`
    Braces,
}

/// Lexical knobs the scanner needs: comments and literal delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Syntax {
    pub comment: CommentSyntax,
    /// Literal delimiters whose contents honor `escape`.
    pub quotes: Vec<char>,
    /// Literal delimiters with no escapes (Go backticks).
    pub raw_quotes: Vec<char>,
    pub escape: char,
    /// `'x'` is a char token and a lone `'` is a lifetime (Rust).
    pub char_literals: bool,
    pub placeholders: Vec<Placeholder>,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            comment: CommentSyntax::default(),
            quotes: vec!['"', '\''],
            raw_quotes: Vec::new(),
            escape: '\\',
            char_literals: false,
            placeholders: vec![Placeholder::Printf],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Only output calls whose literal text carries the debug keyword.
    Keyword,
    /// Every recognized output call.
    AllOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub output_call_targets: BTreeSet<String>,
    /// Calls that are debug output whatever their arguments (`dbg!`).
    pub debug_only_targets: BTreeSet<String>,
    /// Stream objects written with `<<` up to `;` (`std::cout`).
    pub stream_targets: BTreeSet<String>,
    pub debug_keyword: String,
    pub syntax: Syntax,
    pub mode: DetectionMode,
    /// Also look for the keyword outside string literals, e.g. `debugInfo` passed through `%v`.
    pub match_identifiers: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Language::Go.config()
    }
}

impl ScanConfig {
    pub fn new(targets: &[&str], syntax: Syntax) -> Self {
        Self {
            output_call_targets: to_set(targets),
            debug_only_targets: BTreeSet::new(),
            stream_targets: BTreeSet::new(),
            debug_keyword: DEFAULT_DEBUG_KEYWORD.to_string(),
            syntax,
            mode: DetectionMode::Keyword,
            match_identifiers: false,
        }
    }

    /// Reject configurations that would make classification meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debug_keyword.trim().is_empty() {
            return Err(ConfigError::EmptyDebugKeyword);
        }
        if self.syntax.comment.line_marker.trim().is_empty() {
            return Err(ConfigError::EmptyCommentMarker);
        }
        let comment = &self.syntax.comment;
        if comment.block_open.is_some() != comment.block_close.is_some() {
            return Err(ConfigError::UnbalancedBlockMarkers);
        }
        if self.output_call_targets.is_empty()
            && self.debug_only_targets.is_empty()
            && self.stream_targets.is_empty()
        {
            return Err(ConfigError::NoOutputTargets);
        }
        Ok(())
    }

    /// Output-producing target of any kind. Calls nested inside one of these
    /// are part of its arguments, not statements of their own.
    pub fn claims(&self, target: &str) -> bool {
        self.output_call_targets.contains(target)
            || self.debug_only_targets.contains(target)
            || self.stream_targets.contains(target)
    }

    /// Read a JSON overlay from disk.
    pub fn load(path: &Path) -> Result<ConfigOverlay, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// User-supplied adjustments applied on top of a language preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverlay {
    pub language: Option<String>,
    /// Added to the preset's targets.
    pub output_call_targets: Vec<String>,
    pub debug_only_targets: Vec<String>,
    pub stream_targets: Vec<String>,
    /// Drop the preset's targets instead of extending them.
    pub replace_targets: bool,
    pub debug_keyword: Option<String>,
    pub mode: Option<DetectionMode>,
    pub match_identifiers: Option<bool>,
    pub syntax: Option<Syntax>,
}

impl ConfigOverlay {
    pub fn apply(&self, mut base: ScanConfig) -> ScanConfig {
        if self.replace_targets {
            base.output_call_targets.clear();
            base.debug_only_targets.clear();
            base.stream_targets.clear();
        }
        base.output_call_targets
            .extend(self.output_call_targets.iter().cloned());
        base.debug_only_targets
            .extend(self.debug_only_targets.iter().cloned());
        base.stream_targets
            .extend(self.stream_targets.iter().cloned());
        if let Some(keyword) = &self.debug_keyword {
            base.debug_keyword = keyword.clone();
        }
        if let Some(mode) = self.mode {
            base.mode = mode;
        }
        if let Some(flag) = self.match_identifiers {
            base.match_identifiers = flag;
        }
        if let Some(syntax) = &self.syntax {
            base.syntax = syntax.clone();
        }
        base
    }

    /// Keyword the resolved configuration matches on.
    pub fn keyword(&self) -> &str {
        self.debug_keyword.as_deref().unwrap_or(DEFAULT_DEBUG_KEYWORD)
    }

    /// The language pinned by the overlay, if any.
    pub fn language(&self) -> Result<Option<Language>, ConfigError> {
        self.language.as_deref().map(Language::from_name).transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    C,
    Cpp,
    Java,
    Rust,
}

const GO_TARGETS: &[&str] = &[
    "fmt.Print",
    "fmt.Println",
    "fmt.Printf",
    "fmt.Sprint",
    "fmt.Sprintln",
    "fmt.Sprintf",
    "fmt.Fprint",
    "fmt.Fprintln",
    "fmt.Fprintf",
    "log.Print",
    "log.Println",
    "log.Printf",
    "log.Fatal",
    "log.Fatalln",
    "log.Fatalf",
    "log.Panic",
    "log.Panicln",
    "log.Panicf",
];

const C_TARGETS: &[&str] = &[
    "printf",
    "fprintf",
    "sprintf",
    "snprintf",
    "printf_debug",
    "dprintf",
    "puts",
    "fputs",
    "fputc",
    "putchar",
    "fputchar",
    "write",
    "perror",
];

const CPP_STREAMS: &[&str] = &[
    "std::cout",
    "std::cerr",
    "std::clog",
    "cout",
    "cerr",
    "clog",
];

const JAVA_TARGETS: &[&str] = &[
    "System.out.print",
    "System.out.println",
    "System.out.printf",
    "System.err.print",
    "System.err.println",
    "System.err.printf",
    "String.format",
];

const RUST_TARGETS: &[&str] = &[
    "print!",
    "println!",
    "eprint!",
    "eprintln!",
    "format!",
    "write!",
    "writeln!",
    "trace!",
    "debug!",
    "info!",
    "warn!",
    "error!",
    "log::trace!",
    "log::debug!",
    "log::info!",
    "log::warn!",
    "log::error!",
    "tracing::trace!",
    "tracing::debug!",
    "tracing::info!",
    "tracing::warn!",
    "tracing::error!",
];

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Go,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Rust,
    ];

    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "go" => Some(Language::Go),
            "c" | "h" => Some(Language::C),
            "cpp" | "hpp" | "cc" | "cxx" | "hh" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Language::from_extension)
    }

    pub fn from_name(name: &str) -> Result<Language, ConfigError> {
        match name.to_lowercase().as_str() {
            "go" | "golang" => Ok(Language::Go),
            "c" => Ok(Language::C),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(ConfigError::UnknownLanguage(name.to_string())),
        }
    }

    pub fn config(self) -> ScanConfig {
        match self {
            Language::Go => ScanConfig::new(
                GO_TARGETS,
                Syntax {
                    raw_quotes: vec!['`'],
                    ..Syntax::default()
                },
            ),
            Language::C => ScanConfig::new(C_TARGETS, Syntax::default()),
            Language::Cpp => {
                let mut config = ScanConfig::new(C_TARGETS, Syntax::default());
                let qualified: Vec<String> = C_TARGETS.iter().map(|t| format!("std::{}", t)).collect();
                config.output_call_targets.extend(qualified);
                config.stream_targets = to_set(CPP_STREAMS);
                config
            }
            Language::Java => ScanConfig::new(JAVA_TARGETS, Syntax::default()),
            Language::Rust => {
                let mut config = ScanConfig::new(
                    RUST_TARGETS,
                    Syntax {
                        quotes: vec!['"'],
                        char_literals: true,
                        placeholders: vec![Placeholder::Braces],
                        ..Syntax::default()
                    },
                );
                config.debug_only_targets = to_set(&["dbg!", "std::dbg!"]);
                config
            }
        }
    }
}

fn to_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}
