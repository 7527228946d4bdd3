use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::CommentSyntax;
use crate::error::{DbgcError, Result};
use crate::scanner::{strip_marker, Classification};

/// Receives each classification of a file, in file order.
pub trait Dispatch {
    fn dispatch(&mut self, classification: &Classification);
}

/// Keeps the debug classifications it is handed.
#[derive(Debug, Default)]
pub struct Collector {
    pub found: Vec<Classification>,
}

impl Dispatch for Collector {
    fn dispatch(&mut self, classification: &Classification) {
        if classification.is_debug {
            self.found.push(classification.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Report,
    CommentOut,
    Uncomment,
    Delete,
}

impl Action {
    pub fn verb(self) -> &'static str {
        match self {
            Action::Report => "report",
            Action::CommentOut => "comment out",
            Action::Uncomment => "uncomment",
            Action::Delete => "delete",
        }
    }
}

/// Where a statement sits: lines plus the byte columns of its first and last char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

/// Outcome of applying a rewrite to a file's lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Applied {
    pub lines: Vec<String>,
    pub edited: usize,
    /// Line ranges left alone because other code shares their first or last line.
    pub skipped: Vec<(usize, usize)>,
}

/// Line edits for the debug statements of one file.
#[derive(Debug, Clone)]
pub struct Rewrite {
    action: Action,
    marker: String,
    spans: Vec<Span>,
}

impl Dispatch for Rewrite {
    fn dispatch(&mut self, classification: &Classification) {
        if classification.is_debug {
            let stmt = &classification.statement;
            self.spans.push(Span {
                start_line: stmt.start_line,
                start_col: stmt.start_col,
                end_line: stmt.end_line,
                end_col: stmt.end_col,
            });
        }
    }
}

impl Rewrite {
    pub fn new(action: Action, comment: &CommentSyntax) -> Self {
        Self {
            action,
            marker: comment.line_marker.clone(),
            spans: Vec::new(),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Whether code outside the statement sits on its first or last line.
    /// Columns of disabled statements are relative to the uncommented text.
    fn shares_lines(&self, span: &Span, lines: &[String]) -> bool {
        let (Some(first), Some(last)) = (lines.get(span.start_line), lines.get(span.end_line)) else {
            return true;
        };
        let first = code_view(first, &self.marker);
        let last = code_view(last, &self.marker);

        let clean_before = first
            .get(..span.start_col)
            .map_or(false, |s| s.trim().is_empty());
        let clean_after = last.get(span.end_col..).map_or(false, |s| {
            let rest = s.trim_start_matches([' ', '\t', ';']).trim_end();
            rest.is_empty() || rest.starts_with(self.marker.as_str())
        });
        !(clean_before && clean_after)
    }

    /// Apply the action to every physical line of every recorded statement.
    /// Comment-out and delete leave statements that share a line with other code.
    pub fn apply(&self, lines: Vec<String>) -> Applied {
        if self.action == Action::Report {
            return Applied {
                lines,
                ..Applied::default()
            };
        }

        let (edit, skip): (Vec<Span>, Vec<Span>) = match self.action {
            Action::CommentOut | Action::Delete => self
                .spans
                .iter()
                .copied()
                .partition(|span| !self.shares_lines(span, &lines)),
            _ => (self.spans.clone(), Vec::new()),
        };
        let covers = |idx: usize| {
            edit.iter()
                .any(|span| span.start_line <= idx && idx <= span.end_line)
        };

        let lines = match self.action {
            Action::Delete => lines
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| !covers(*idx))
                .map(|(_, line)| line)
                .collect(),
            Action::CommentOut => lines
                .into_iter()
                .enumerate()
                .map(|(idx, line)| {
                    if covers(idx) && !line.trim().is_empty() {
                        comment_line(&line, &self.marker)
                    } else {
                        line
                    }
                })
                .collect(),
            _ => lines
                .into_iter()
                .enumerate()
                .map(|(idx, line)| {
                    if covers(idx) {
                        uncomment_line(&line, &self.marker)
                    } else {
                        line
                    }
                })
                .collect(),
        };

        Applied {
            lines,
            edited: edit.len(),
            skipped: skip.iter().map(|s| (s.start_line, s.end_line)).collect(),
        }
    }
}

/// A commented line with one marker removed; other lines as they are.
fn code_view<'l>(line: &'l str, marker: &str) -> Cow<'l, str> {
    match strip_marker(line, marker) {
        Some((indent, body)) => Cow::Owned(format!("{}{}", indent, body)),
        None => Cow::Borrowed(line),
    }
}

fn comment_line(line: &str, marker: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    format!("{}{} {}", indent, marker, trimmed)
}

fn uncomment_line(line: &str, marker: &str) -> String {
    code_view(line, marker).into_owned()
}

/// Read `path`, apply `rewrite` and write it back. Returns the number of statements edited.
pub fn rewrite_file(path: &Path, rewrite: &Rewrite) -> Result<usize> {
    if rewrite.is_empty() || rewrite.action() == Action::Report {
        return Ok(0);
    }

    let io_err = |source| DbgcError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = fs::read_to_string(path).map_err(io_err)?;
    let lines: Vec<String> = content.lines().map(|s| s.to_string()).collect();

    let applied = rewrite.apply(lines);
    for (start, end) in &applied.skipped {
        warn!(
            path = %path.display(),
            start = start + 1,
            end = end + 1,
            "statement shares its lines with other code, left unchanged"
        );
    }
    if applied.edited == 0 {
        return Ok(0);
    }

    let mut new_content = applied.lines.join("\n");
    if content.ends_with('\n') {
        new_content.push('\n');
    }
    fs::write(path, new_content).map_err(io_err)?;

    info!(path = %path.display(), statements = applied.edited, action = rewrite.action().verb(), "rewrote file");
    Ok(applied.edited)
}
