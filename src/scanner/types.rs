use serde::Serialize;

/// One physical line of source, newline stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub index: usize,
    pub text: String,
}

impl SourceLine {
    /// Split source text into physical lines (`\n` or `\r\n`).
    pub fn split(source: &str) -> Vec<SourceLine> {
        source
            .lines()
            .enumerate()
            .map(|(index, text)| SourceLine {
                index,
                text: text.to_string(),
            })
            .collect()
    }
}

/// Per-line comment classification plus the running block-comment state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentState {
    pub fully_commented: bool,
    /// Still inside a block comment when the line ends.
    pub in_block: bool,
    /// Byte offset where code resumes after a block comment closed on this line.
    pub code_start: usize,
}

/// A logical call reconstructed from one or more physical lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub start_line: usize,
    pub end_line: usize,
    pub call_target: String,
    pub raw_argument_text: String,
    /// Byte offset of the call target on `start_line`.
    pub start_col: usize,
    /// Byte offset just past the closing delimiter on `end_line`.
    pub end_col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reason {
    CallTargetMatch,
    ContentKeywordMatch,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub statement: Statement,
    pub is_debug: bool,
    pub reason: Reason,
}

impl Classification {
    pub fn line_range(&self) -> (usize, usize) {
        (self.statement.start_line, self.statement.end_line)
    }
}
