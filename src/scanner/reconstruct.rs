use regex::Regex;
use std::collections::{BTreeSet, VecDeque};
use std::sync::OnceLock;
use tracing::trace;

use super::types::{CommentState, SourceLine, Statement};
use crate::config::Syntax;
use crate::error::{MalformedKind, ScanError};

/// Longest dotted/qualified identifier ending right before an opening paren.
fn call_target_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[A-Za-z_][A-Za-z0-9_]*(?:(?:\.|::|->)[A-Za-z_][A-Za-z0-9_]*)*!?$")
            .expect("Invalid regex")
    })
}

/// `'x'`, `'\n'`, `'\x7f'`, `'\u{1F600}'`
fn char_literal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^'(?:\\(?:u\{[0-9A-Fa-f_]{1,6}\}|x[0-9A-Fa-f]{2}|.)|[^'\\])'").expect("Invalid regex")
    })
}

/// Call target immediately preceding a `(` at the end of `prefix`, with its byte offset.
pub fn call_target_before(prefix: &str) -> Option<(usize, &str)> {
    let prefix = prefix.trim_end_matches([' ', '\t']);
    call_target_pattern()
        .find(prefix)
        .map(|m| (m.start(), m.as_str()))
}

/// Length of the char literal at the start of `rest`. `None` means the `'`
/// is a lifetime or label sigil.
pub fn char_literal_len(rest: &str) -> Option<usize> {
    char_literal_pattern().find(rest).map(|m| m.end())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// `target(...)`, closed by the matching delimiter.
    Call,
    /// `target << ...`, closed by `;` at its own depth.
    Stream,
}

/// A statement whose end has not been seen yet.
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    start_line: usize,
    start_col: usize,
    call_target: String,
    /// Open delimiters around the frame when it started.
    base: usize,
    /// One fragment per scanned line, joined by newlines on close.
    fragments: Vec<String>,
}

impl Frame {
    fn push(&mut self, text: &str) {
        if let Some(last) = self.fragments.last_mut() {
            last.push_str(text);
        }
    }

    fn close(self, end_line: usize, end_col: usize) -> Statement {
        Statement {
            start_line: self.start_line,
            end_line,
            call_target: self.call_target,
            raw_argument_text: self.fragments.join("\n"),
            start_col: self.start_col,
            end_col,
        }
    }
}

/// Groups non-comment lines into call statements by delimiter balance.
///
/// Yields statements lazily in file order. A call nested inside another one
/// is folded into its arguments, unless every enclosing call is one the
/// `claiming` predicate rejects; then it is yielded on its own right after
/// its outermost enclosing statement. On end of input with a statement or
/// literal still open it yields one `MalformedStatement` and stops.
pub struct Reconstructor<'a> {
    lines: &'a [SourceLine],
    states: &'a [CommentState],
    syntax: &'a Syntax,
    claims: Box<dyn Fn(&str) -> bool + 'a>,
    streams: Option<&'a BTreeSet<String>>,
    pos: usize,
    col: usize,
    frames: Vec<Frame>,
    /// Open delimiters since the outermost frame started.
    depth: usize,
    /// Closed statements of the current outermost frame.
    closed: Vec<Statement>,
    ready: VecDeque<Statement>,
    /// Open literal delimiter and the line it opened on.
    quote: Option<(char, usize)>,
    escaped: bool,
    last_code_line: usize,
    finished: bool,
}

pub fn reconstruct<'a>(
    lines: &'a [SourceLine],
    states: &'a [CommentState],
    syntax: &'a Syntax,
) -> Reconstructor<'a> {
    debug_assert_eq!(lines.len(), states.len());
    Reconstructor {
        lines,
        states,
        syntax,
        claims: Box::new(|_| true),
        streams: None,
        pos: 0,
        col: 0,
        frames: Vec::new(),
        depth: 0,
        closed: Vec::new(),
        ready: VecDeque::new(),
        quote: None,
        escaped: false,
        last_code_line: 0,
        finished: false,
    }
}

impl<'a> Reconstructor<'a> {
    /// Targets whose arguments swallow nested calls. Defaults to all of them.
    pub fn claiming(mut self, claims: impl Fn(&str) -> bool + 'a) -> Self {
        self.claims = Box::new(claims);
        self
    }

    /// Stream objects that start a `<<` statement.
    pub fn with_streams(mut self, targets: &'a BTreeSet<String>) -> Self {
        self.streams = Some(targets);
        self
    }

    fn accepts_statement(&self) -> bool {
        self.frames.iter().all(|f| !(self.claims)(f.call_target.as_str()))
    }

    fn is_stream(&self, target: &str) -> bool {
        self.streams.map_or(false, |s| s.contains(target))
    }

    fn flush(&mut self, text: &str) {
        for frame in &mut self.frames {
            frame.push(text);
        }
    }

    fn open(&mut self, kind: FrameKind, line_no: usize, start_col: usize, target: &str) {
        self.frames.push(Frame {
            kind,
            start_line: line_no,
            start_col,
            call_target: target.to_string(),
            base: self.depth,
            fragments: vec![String::new()],
        });
    }

    /// Close the innermost frame. Returns true when that was the outermost one.
    fn close_top(&mut self, line_no: usize, end_col: usize) -> bool {
        if let Some(frame) = self.frames.pop() {
            let stmt = frame.close(line_no, end_col);
            trace!(
                call = %stmt.call_target,
                start = stmt.start_line,
                end = stmt.end_line,
                "statement closed"
            );
            self.closed.push(stmt);
        }
        if !self.frames.is_empty() {
            return false;
        }
        self.depth = 0;
        self.closed.sort_by_key(|s| (s.start_line, s.start_col));
        self.ready.extend(self.closed.drain(..));
        true
    }

    /// Scan the current line from `from`. Returns the byte offset to resume at
    /// if an outermost statement closed on this line.
    fn scan_line(&mut self, line_no: usize, text: &str, from: usize) -> Option<usize> {
        let syntax = self.syntax;
        let marker = syntax.comment.line_marker.as_str();
        let block = syntax.comment.block();

        // Frames open at entry always carry over from an earlier line.
        for frame in &mut self.frames {
            frame.fragments.push(String::new());
        }
        let mut fragment_start = from;
        let mut i = from;

        while let Some(ch) = text[i..].chars().next() {
            let rest = &text[i..];
            let width = ch.len_utf8();

            if let Some((q, _)) = self.quote {
                if self.escaped {
                    self.escaped = false;
                } else if ch == syntax.escape && !syntax.raw_quotes.contains(&q) {
                    self.escaped = true;
                } else if ch == q {
                    self.quote = None;
                }
                i += width;
                continue;
            }

            if rest.starts_with(marker) {
                break;
            }
            if let Some((open_marker, close_marker)) = block {
                if rest.starts_with(open_marker) {
                    let after = open_marker.len();
                    match rest[after..].find(close_marker) {
                        Some(j) => {
                            self.flush(&text[fragment_start..i]);
                            i += after + j + close_marker.len();
                            fragment_start = i;
                            continue;
                        }
                        None => break,
                    }
                }
            }

            if ch == '\'' && syntax.char_literals {
                i += char_literal_len(rest).unwrap_or(width);
                continue;
            }
            if syntax.quotes.contains(&ch) || syntax.raw_quotes.contains(&ch) {
                self.quote = Some((ch, line_no));
                i += width;
                continue;
            }

            if rest.starts_with("<<") && self.streams.is_some() && self.accepts_statement() {
                if let Some((col, target)) = call_target_before(&text[..i]) {
                    if self.is_stream(target) {
                        self.flush(&text[fragment_start..i + 2]);
                        fragment_start = i + 2;
                        self.open(FrameKind::Stream, line_no, col, target);
                        i += 2;
                        continue;
                    }
                }
            }

            match ch {
                '(' | '{' | '[' => {
                    let target = if ch == '(' && self.accepts_statement() {
                        call_target_before(&text[..i])
                    } else {
                        None
                    };
                    if let Some((col, target)) = target {
                        self.flush(&text[fragment_start..i + width]);
                        fragment_start = i + width;
                        self.open(FrameKind::Call, line_no, col, target);
                    }
                    if !self.frames.is_empty() {
                        self.depth += 1;
                    }
                }
                ')' | '}' | ']' if !self.frames.is_empty() => {
                    // A stream ends where its enclosing delimiter closes.
                    while let Some(top) = self.frames.last() {
                        if top.kind != FrameKind::Stream || top.base != self.depth {
                            break;
                        }
                        self.flush(&text[fragment_start..i]);
                        fragment_start = i;
                        if self.close_top(line_no, i) {
                            return Some(i + width);
                        }
                    }
                    self.depth -= 1;
                    let closes_call = self
                        .frames
                        .last()
                        .map_or(false, |top| top.kind == FrameKind::Call && top.base == self.depth);
                    if closes_call {
                        self.flush(&text[fragment_start..i]);
                        fragment_start = i;
                        if self.close_top(line_no, i + width) {
                            return Some(i + width);
                        }
                    }
                }
                ';' => {
                    let closes_stream = self
                        .frames
                        .last()
                        .map_or(false, |top| top.kind == FrameKind::Stream && top.base == self.depth);
                    if closes_stream {
                        self.flush(&text[fragment_start..i]);
                        fragment_start = i;
                        if self.close_top(line_no, i + width) {
                            return Some(i + width);
                        }
                    }
                }
                _ => {}
            }
            i += width;
        }

        self.flush(&text[fragment_start..i]);
        None
    }

    fn fail(&self, start_line: usize, kind: MalformedKind) -> Option<Result<Statement, ScanError>> {
        Some(Err(ScanError::MalformedStatement {
            start_line,
            end_line: self.last_code_line.max(start_line),
            kind,
        }))
    }
}

impl<'a> Iterator for Reconstructor<'a> {
    type Item = Result<Statement, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(stmt) = self.ready.pop_front() {
            return Some(Ok(stmt));
        }
        if self.finished {
            return None;
        }

        while self.pos < self.lines.len() {
            let state = self.states[self.pos];
            if state.fully_commented {
                self.pos += 1;
                self.col = 0;
                continue;
            }

            let lines = self.lines;
            let line = &lines[self.pos];
            let from = if self.col == 0 {
                // A newline ends any pending escape.
                self.escaped = false;
                state.code_start
            } else {
                self.col
            };
            self.last_code_line = line.index;

            match self.scan_line(line.index, &line.text, from) {
                Some(end) => {
                    self.col = end;
                    if let Some(stmt) = self.ready.pop_front() {
                        return Some(Ok(stmt));
                    }
                }
                None => {
                    self.pos += 1;
                    self.col = 0;
                }
            }
        }

        self.finished = true;
        if let Some(outer) = self.frames.first() {
            let kind = match self.depth {
                0 => MalformedKind::MissingTerminator { terminator: ';' },
                depth => MalformedKind::UnbalancedDelimiters { depth },
            };
            return self.fail(outer.start_line, kind);
        }
        if let Some((quote, line)) = self.quote.take() {
            return self.fail(line, MalformedKind::UnterminatedLiteral { quote });
        }
        None
    }
}
