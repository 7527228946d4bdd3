use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use super::reconstruct::char_literal_len;
use super::types::{Classification, Reason, Statement};
use crate::config::{DetectionMode, Placeholder, ScanConfig, Syntax};

/// printf-style verbs: `%d`, `%-5.2f`, `%v`, and the `%%` escape.
fn printf_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%%|%[-+# 0]*(?:\d+|\*)?(?:\.(?:\d+|\*))?[a-zA-Z]").expect("Invalid regex"))
}

/// Brace placeholders: `{}`, `{0}`, `{name:?}`. Only identifiers, positions
/// and format specs count; `{debug mode}` is plain text.
fn braces_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{[A-Za-z0-9_]*(?::[^{}]*)?\}").expect("Invalid regex"))
}

/// Replace every placeholder of the given families with a space.
pub fn mask_placeholders<'t>(literal: &'t str, placeholders: &[Placeholder]) -> Cow<'t, str> {
    let mut masked = Cow::Borrowed(literal);
    for placeholder in placeholders {
        let pattern = match placeholder {
            Placeholder::Printf => printf_pattern(),
            Placeholder::Braces => braces_pattern(),
        };
        let replaced = match pattern.replace_all(&masked, " ") {
            Cow::Owned(replaced) => Some(replaced),
            Cow::Borrowed(_) => None,
        };
        if let Some(replaced) = replaced {
            masked = Cow::Owned(replaced);
        }
    }
    masked
}

/// Argument text split into literal contents and everything else.
#[derive(Debug, Default, PartialEq)]
pub struct ArgumentParts {
    pub literals: Vec<String>,
    pub code: String,
}

/// Split argument text on literal delimiters, honoring escapes.
pub fn split_literals(text: &str, syntax: &Syntax) -> ArgumentParts {
    let mut parts = ArgumentParts::default();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    let mut skip = 0usize;

    for (i, ch) in text.char_indices() {
        if skip > 0 {
            skip -= ch.len_utf8();
            continue;
        }
        match quote {
            Some(q) => {
                if escaped {
                    current.push(ch);
                    escaped = false;
                    continue;
                }
                if ch == syntax.escape && !syntax.raw_quotes.contains(&q) {
                    escaped = true;
                    current.push(ch);
                    continue;
                }
                if ch == q {
                    parts.literals.push(std::mem::take(&mut current));
                    quote = None;
                    continue;
                }
                current.push(ch);
            }
            None => {
                if ch == '\'' && syntax.char_literals {
                    // Char literals never carry a keyword; keep them as code.
                    if let Some(len) = char_literal_len(&text[i..]) {
                        parts.code.push_str(&text[i..i + len]);
                        skip = len - 1;
                        continue;
                    }
                }
                if syntax.quotes.contains(&ch) || syntax.raw_quotes.contains(&ch) {
                    quote = Some(ch);
                    continue;
                }
                parts.code.push(ch);
            }
        }
    }

    if quote.is_some() {
        parts.literals.push(current);
    }
    parts
}

/// Decides whether a reconstructed statement is debug output.
pub struct Classifier<'a> {
    config: &'a ScanConfig,
    keyword: String,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self {
            config,
            keyword: config.debug_keyword.trim().to_lowercase(),
        }
    }

    pub fn classify(&self, stmt: &Statement) -> Classification {
        let (is_debug, reason) = self.decide(stmt);
        Classification {
            statement: stmt.clone(),
            is_debug,
            reason,
        }
    }

    fn decide(&self, stmt: &Statement) -> (bool, Reason) {
        let target = stmt.call_target.as_str();

        if self.config.debug_only_targets.contains(target) {
            return (true, Reason::CallTargetMatch);
        }
        if !self.config.output_call_targets.contains(target) && !self.config.stream_targets.contains(target) {
            return (false, Reason::None);
        }
        if self.mentions_keyword(&stmt.raw_argument_text) {
            return (true, Reason::ContentKeywordMatch);
        }
        match self.config.mode {
            DetectionMode::AllOutput => (true, Reason::CallTargetMatch),
            DetectionMode::Keyword => (false, Reason::None),
        }
    }

    fn mentions_keyword(&self, arguments: &str) -> bool {
        let parts = split_literals(arguments, &self.config.syntax);
        let in_literal = parts.literals.iter().any(|literal| {
            let masked = mask_placeholders(literal, &self.config.syntax.placeholders);
            masked.to_lowercase().contains(&self.keyword)
        });
        in_literal || (self.config.match_identifiers && parts.code.to_lowercase().contains(&self.keyword))
    }
}
