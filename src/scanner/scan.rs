use tracing::debug;

use super::classify::Classifier;
use super::comments::{comment_states, strip_marker};
use super::reconstruct::{reconstruct, Reconstructor};
use super::types::{Classification, CommentState, SourceLine};
use crate::config::ScanConfig;
use crate::dispatch::Dispatch;
use crate::error::ScanError;

/// Reconstructor that splits out output calls nested in other calls and
/// knows the configured stream objects.
fn statements<'a>(lines: &'a [SourceLine], states: &'a [CommentState], config: &'a ScanConfig) -> Reconstructor<'a> {
    reconstruct(lines, states, &config.syntax)
        .claiming(move |target| config.claims(target))
        .with_streams(&config.stream_targets)
}

/// Full pipeline for one file: comment states, reconstruction, classification.
///
/// Returns one classification per reconstructed statement in file order, or
/// the first `MalformedStatement`; no classifications escape a failed file.
pub fn scan_lines(lines: &[SourceLine], config: &ScanConfig) -> Result<Vec<Classification>, ScanError> {
    let states = comment_states(lines, &config.syntax);
    let classifier = Classifier::new(config);

    statements(lines, &states, config)
        .map(|stmt| stmt.map(|stmt| classifier.classify(&stmt)))
        .collect()
}

pub fn scan_source(source: &str, config: &ScanConfig) -> Result<Vec<Classification>, ScanError> {
    scan_lines(&SourceLine::split(source), config)
}

/// Scan, then hand every classification to `dispatcher`. Nothing is
/// dispatched for a malformed file.
pub fn scan_and_dispatch<D: Dispatch>(
    lines: &[SourceLine],
    config: &ScanConfig,
    dispatcher: &mut D,
) -> Result<usize, ScanError> {
    let classifications = scan_lines(lines, config)?;
    for classification in &classifications {
        dispatcher.dispatch(classification);
    }
    Ok(classifications.len())
}

/// Find statements inside line-commented code (already disabled).
///
/// Each run of consecutive line-commented lines is unwrapped one marker level
/// and scanned on its own. Commented prose often fails to balance; when it
/// does, scanning resumes on the line after the failure point.
pub fn scan_disabled(lines: &[SourceLine], config: &ScanConfig) -> Vec<Classification> {
    let marker = config.syntax.comment.line_marker.as_str();
    let classifier = Classifier::new(config);
    let mut found = Vec::new();

    for run in commented_runs(lines, marker) {
        let mut start = 0usize;
        while start < run.len() {
            let slice = &run[start..];
            let states = comment_states(slice, &config.syntax);
            let mut resume = None;

            for item in statements(slice, &states, config) {
                match item {
                    Ok(stmt) => found.push(classifier.classify(&stmt)),
                    Err(err) => {
                        let (failed_at, _) = err.line_range();
                        debug!(line = failed_at + 1, %err, "skipping unbalanced commented code");
                        resume = slice.iter().position(|l| l.index == failed_at);
                        break;
                    }
                }
            }

            match resume {
                Some(offset) => start += offset + 1,
                None => break,
            }
        }
    }

    found
}

/// Consecutive line-commented lines with one marker stripped, original indices
/// kept. Blank lines between commented lines stay in the run.
fn commented_runs(lines: &[SourceLine], marker: &str) -> Vec<Vec<SourceLine>> {
    let mut runs: Vec<Vec<SourceLine>> = Vec::new();
    let mut current: Vec<SourceLine> = Vec::new();
    let mut blanks: Vec<SourceLine> = Vec::new();

    for line in lines {
        if let Some((indent, body)) = strip_marker(&line.text, marker) {
            current.append(&mut blanks);
            current.push(SourceLine {
                index: line.index,
                text: format!("{}{}", indent, body),
            });
        } else if line.text.trim().is_empty() && !current.is_empty() {
            blanks.push(line.clone());
        } else {
            blanks.clear();
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
