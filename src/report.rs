use console::Style;
use regex::{Captures, Regex};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::batch::{BatchReport, FileScan, Target};
use crate::config::Language;
use crate::error::DbgcError;
use crate::scanner::{Classification, Reason};

/// Collapse runs of whitespace (newlines included) to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One-line rendering of a statement, e.g. `fmt.Printf("debug: %d", 42)`.
pub fn statement_text(c: &Classification) -> String {
    format!(
        "{}({})",
        c.statement.call_target,
        normalize_whitespace(&c.statement.raw_argument_text)
    )
}

/// One-based line label: `12` or `12-15`.
pub fn line_label(c: &Classification) -> String {
    let (start, end) = c.line_range();
    if start == end {
        format!("{}", start + 1)
    } else {
        format!("{}-{}", start + 1, end + 1)
    }
}

/// ripgrep-like text output: magenta path, green line, keyword in bold red.
/// Colours switch off when the terminal does not support them.
pub struct TextReport {
    highlight: Option<Regex>,
    path_style: Style,
    line_style: Style,
    keyword_style: Style,
}

impl TextReport {
    pub fn new(keyword: &str) -> Self {
        let highlight = Regex::new(&format!("(?i){}", regex::escape(keyword.trim()))).ok();
        Self {
            highlight,
            path_style: Style::new().magenta(),
            line_style: Style::new().green(),
            keyword_style: Style::new().red().bold(),
        }
    }

    fn highlight(&self, text: &str) -> String {
        match &self.highlight {
            Some(re) => re
                .replace_all(text, |caps: &Captures<'_>| self.keyword_style.apply_to(&caps[0]).to_string())
                .into_owned(),
            None => text.to_string(),
        }
    }

    /// `path line:statement` on one line, as offered in interactive selection.
    pub fn item(&self, target: &Target<'_>) -> String {
        format!(
            "{} {}:{}",
            self.path_style.apply_to(target.scan.path.display()),
            self.line_style.apply_to(line_label(target.classification)),
            self.highlight(&statement_text(target.classification))
        )
    }

    fn write_group<W: Write>(&self, out: &mut W, path: &Path, items: &[&Classification]) -> io::Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", self.path_style.apply_to(path.display()))?;
        for c in items {
            writeln!(
                out,
                "{}:{}",
                self.line_style.apply_to(line_label(c)),
                self.highlight(&statement_text(c))
            )?;
        }
        writeln!(out)
    }

    pub fn write_active<W: Write>(&self, out: &mut W, report: &BatchReport) -> io::Result<()> {
        for scan in &report.scanned {
            let items: Vec<&Classification> = scan.debug_statements().collect();
            self.write_group(out, &scan.path, &items)?;
        }
        Ok(())
    }

    pub fn write_disabled<W: Write>(&self, out: &mut W, report: &BatchReport) -> io::Result<()> {
        for scan in &report.scanned {
            let items: Vec<&Classification> = scan.disabled.iter().collect();
            self.write_group(out, &scan.path, &items)?;
        }
        Ok(())
    }

    pub fn write_failures<W: Write>(&self, out: &mut W, report: &BatchReport) -> io::Result<()> {
        let error = Style::new().red().bold().for_stderr();
        for failure in &report.failed {
            writeln!(out, "{}: {}", error.apply_to("error"), failure.error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub files: Vec<JsonFile>,
    pub failures: Vec<JsonFailure>,
}

#[derive(Debug, Serialize)]
pub struct JsonFile {
    pub path: String,
    pub language: Option<Language>,
    pub statements: Vec<JsonStatement>,
    pub disabled: Vec<JsonStatement>,
}

/// Statement with one-based line numbers.
#[derive(Debug, Serialize)]
pub struct JsonStatement {
    pub start_line: usize,
    pub end_line: usize,
    pub call_target: String,
    pub text: String,
    pub reason: Reason,
}

#[derive(Debug, Serialize)]
pub struct JsonFailure {
    pub path: String,
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
    pub message: String,
}

impl From<&Classification> for JsonStatement {
    fn from(c: &Classification) -> Self {
        let (start, end) = c.line_range();
        Self {
            start_line: start + 1,
            end_line: end + 1,
            call_target: c.statement.call_target.clone(),
            text: statement_text(c),
            reason: c.reason,
        }
    }
}

impl From<&FileScan> for JsonFile {
    fn from(scan: &FileScan) -> Self {
        Self {
            path: scan.path.display().to_string(),
            language: scan.language,
            statements: scan.debug_statements().map(JsonStatement::from).collect(),
            disabled: scan.disabled.iter().map(JsonStatement::from).collect(),
        }
    }
}

impl From<&BatchReport> for JsonReport {
    fn from(report: &BatchReport) -> Self {
        let failures = report
            .failed
            .iter()
            .map(|failure| {
                let range = match &failure.error {
                    DbgcError::Malformed { source, .. } => Some(source.line_range()),
                    _ => None,
                };
                JsonFailure {
                    path: failure.path.display().to_string(),
                    start_line: range.map(|(start, _)| start + 1),
                    end_line: range.map(|(_, end)| end + 1),
                    message: failure.error.to_string(),
                }
            })
            .collect();

        Self {
            files: report
                .scanned
                .iter()
                .filter(|scan| scan.debug_count() > 0 || !scan.disabled.is_empty())
                .map(JsonFile::from)
                .collect(),
            failures,
        }
    }
}

pub fn write_json<W: Write>(out: &mut W, report: &BatchReport) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonReport::from(report))?;
    writeln!(out).map_err(serde_json::Error::io)
}
