use super::reconstruct::char_literal_len;
use super::types::{CommentState, SourceLine};
use crate::config::Syntax;

/// Classify one physical line given the state left by the previous line.
pub fn classify_line(line: &str, prior: &CommentState, syntax: &Syntax) -> CommentState {
    let marker = syntax.comment.line_marker.as_str();
    let block = syntax.comment.block();

    let mut pos = 0usize;
    let mut in_block = prior.in_block && block.is_some();

    loop {
        if in_block {
            let Some((_, close)) = block else { break };
            match line[pos..].find(close) {
                Some(i) => {
                    pos += i + close.len();
                    in_block = false;
                }
                None => {
                    return CommentState {
                        fully_commented: true,
                        in_block: true,
                        code_start: line.len(),
                    };
                }
            }
        }

        let rest = &line[pos..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(marker) {
            return CommentState {
                fully_commented: true,
                in_block: false,
                code_start: pos,
            };
        }

        match block {
            Some((open, _)) if trimmed.starts_with(open) => {
                pos += rest.len() - trimmed.len() + open.len();
                in_block = true;
            }
            _ => break,
        }
    }

    CommentState {
        fully_commented: false,
        in_block: opens_block(&line[pos..], syntax),
        code_start: pos,
    }
}

/// Whether a block comment opened on this code line is still open at its end.
/// Literal state is tracked only within the line.
fn opens_block(code: &str, syntax: &Syntax) -> bool {
    let Some((open, close)) = syntax.comment.block() else {
        return false;
    };
    let marker = syntax.comment.line_marker.as_str();

    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut i = 0usize;

    while let Some(ch) = code[i..].chars().next() {
        let rest = &code[i..];
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == syntax.escape && !syntax.raw_quotes.contains(&q) {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            i += ch.len_utf8();
            continue;
        }

        if rest.starts_with(marker) {
            return false;
        }
        if rest.starts_with(open) {
            match rest[open.len()..].find(close) {
                Some(j) => {
                    i += open.len() + j + close.len();
                    continue;
                }
                None => return true,
            }
        }
        if ch == '\'' && syntax.char_literals {
            i += char_literal_len(rest).unwrap_or(1);
            continue;
        }
        if syntax.quotes.contains(&ch) || syntax.raw_quotes.contains(&ch) {
            quote = Some(ch);
        }
        i += ch.len_utf8();
    }

    false
}

/// Run the classifier over a whole file, threading the block state through.
pub fn comment_states(lines: &[SourceLine], syntax: &Syntax) -> Vec<CommentState> {
    let mut prior = CommentState::default();
    lines
        .iter()
        .map(|line| {
            prior = classify_line(&line.text, &prior, syntax);
            prior
        })
        .collect()
}

/// Check if a line, taken on its own, is fully commented.
pub fn is_comment(line: &str, syntax: &Syntax) -> bool {
    classify_line(line, &CommentState::default(), syntax).fully_commented
}

/// Strip one line-comment marker (and one following space) after the indentation.
pub fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let body = trimmed.strip_prefix(marker)?;
    Some((indent, body.strip_prefix(' ').unwrap_or(body)))
}
