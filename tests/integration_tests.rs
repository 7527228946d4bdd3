use dbgc::config::{Language, ScanConfig};
use dbgc::error::MalformedKind;
use dbgc::scanner::{scan_disabled, scan_lines, Classifier};
use dbgc::{scan_source, Classification, Reason, ScanError, SourceLine};
use pretty_assertions::assert_eq;

fn go(source: &str) -> Vec<Classification> {
    scan_source(source, &ScanConfig::default()).expect("scan failed")
}

fn debug_ranges(classifications: &[Classification]) -> Vec<(usize, usize)> {
    classifications
        .iter()
        .filter(|c| c.is_debug)
        .map(|c| c.line_range())
        .collect()
}

#[cfg(test)]
mod scenario_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line_debug() {
        let got = go(r#"fmt.Println("debug: initialization started")"#);

        assert_eq!(got.len(), 1, "Should reconstruct exactly one statement");
        assert_eq!(got[0].statement.call_target, "fmt.Println");
        assert_eq!(got[0].statement.start_line, 0);
        assert_eq!(got[0].statement.end_line, 0);
        assert!(got[0].is_debug);
        assert_eq!(got[0].reason, Reason::ContentKeywordMatch);
    }

    #[test]
    fn test_plain_output_is_not_debug() {
        let got = go(r#"fmt.Println("Application running")"#);

        assert_eq!(got.len(), 1);
        assert!(!got[0].is_debug);
        assert_eq!(got[0].reason, Reason::None);
    }

    #[test]
    fn test_commented_call_produces_nothing() {
        let got = go(r#"    // fmt.Println("debug: starting")"#);
        assert!(got.is_empty(), "Commented lines must never start a statement");
    }

    #[test]
    fn test_multiline_printf() {
        let src = "fmt.Printf(\n\t\"debug: multiline message with value=%d and name=%s\\n\",\n\t42,\n\t\"test\")";
        let got = go(src);

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].line_range(), (0, 3));
        assert!(got[0].is_debug);
        assert_eq!(
            got[0].statement.raw_argument_text,
            "\n\t\"debug: multiline message with value=%d and name=%s\\n\",\n\t42,\n\t\"test\""
        );
    }

    #[test]
    fn test_nested_map_literal() {
        let src = r#"result := fmt.Sprintf(
    "debug: result=%v",
    map[string]int{
        "a": 1,
        "b": 2,
    })
fmt.Println(result)"#;
        let got = go(src);

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].statement.call_target, "fmt.Sprintf");
        assert_eq!(got[0].line_range(), (0, 5));
        assert!(got[0].is_debug);
        assert_eq!(got[1].line_range(), (6, 6));
        assert!(!got[1].is_debug);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classification_is_idempotent() {
        let config = ScanConfig::default();
        let classifier = Classifier::new(&config);
        for c in go(include_str!("fixtures/go/multiline.go")) {
            let again = classifier.classify(&c.statement);
            assert_eq!(again, classifier.classify(&c.statement));
            assert_eq!(again, c);
        }
    }

    #[test]
    fn test_commented_lines_never_join_statements() {
        let src = include_str!("fixtures/go/commented.go");
        let commented: Vec<usize> = src
            .lines()
            .enumerate()
            .filter(|(_, l)| l.trim_start().starts_with("//"))
            .map(|(i, _)| i)
            .collect();

        let got = go(src);
        assert!(debug_ranges(&got).is_empty());
        for c in &got {
            assert!(
                !commented.contains(&c.statement.start_line),
                "statement started on commented line {}",
                c.statement.start_line
            );
            assert!(!c.statement.raw_argument_text.contains("debug"));
        }
    }

    #[test]
    fn test_recognized_call_without_keyword_is_never_debug() {
        let got = go("fmt.Printf(\n  \"value=%d\\n\",\n  debugLevel)");
        assert_eq!(got.len(), 1);
        assert!(!got[0].is_debug);
    }

    #[test]
    fn test_unrecognized_call_with_keyword_is_not_debug() {
        let got = go(r#"errors.New("debug: this is an error value")"#);
        assert_eq!(got.len(), 1);
        assert_eq!((got[0].is_debug, got[0].reason), (false, Reason::None));
    }

    #[test]
    fn test_guarded_call_is_classified_like_any_other() {
        let src = "if debugMode {\n\tlog.Println(\"DEBUG: running in debug mode\")\n}";
        assert_eq!(debug_ranges(&go(src)), vec![(1, 1)]);
    }

    #[test]
    fn test_output_is_in_file_order() {
        let got = go(include_str!("fixtures/go/basic.go"));
        let starts: Vec<usize> = got.iter().map(|c| c.statement.start_line).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }
}

#[cfg(test)]
mod fixture_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan_as(language: Language, source: &str) -> Vec<Classification> {
        scan_lines(&SourceLine::split(source), &language.config()).expect("scan failed")
    }

    #[test]
    fn test_go_basic() {
        let got = go(include_str!("fixtures/go/basic.go"));
        assert_eq!(debug_ranges(&got), vec![(9, 9), (15, 15), (22, 22)]);
    }

    #[test]
    fn test_go_multiline() {
        let got = go(include_str!("fixtures/go/multiline.go"));
        assert_eq!(debug_ranges(&got), vec![(10, 13), (15, 18), (20, 25)]);
    }

    #[test]
    fn test_go_disabled_statements() {
        let lines = SourceLine::split(include_str!("fixtures/go/commented.go"));
        let disabled: Vec<(usize, usize)> = scan_disabled(&lines, &ScanConfig::default())
            .iter()
            .filter(|c| c.is_debug)
            .map(|c| c.line_range())
            .collect();
        assert_eq!(disabled, vec![(5, 5), (6, 6), (11, 13), (20, 20)]);
    }

    #[test]
    fn test_c_block_comments_and_continuations() {
        let got = scan_as(Language::C, include_str!("fixtures/c/multiline.c"));
        assert_eq!(debug_ranges(&got), vec![(6, 6), (8, 10), (14, 14), (16, 17)]);
        assert!(got.iter().all(|c| c.statement.start_line > 4));
    }

    #[test]
    fn test_java_multiline() {
        let got = scan_as(Language::Java, include_str!("fixtures/java/Multiline.java"));
        assert_eq!(debug_ranges(&got), vec![(2, 2), (4, 7), (13, 13)]);

        let results = got
            .iter()
            .find(|c| c.statement.start_line == 9)
            .expect("println statement");
        assert_eq!(results.line_range(), (9, 11));
        assert!(!results.is_debug);
    }

    #[test]
    fn test_cpp_streams() {
        let src = include_str!("fixtures/cpp/streams.cpp");
        let got = scan_as(Language::Cpp, src);
        assert_eq!(debug_ranges(&got), vec![(4, 4), (5, 5), (7, 8), (9, 9), (14, 14)]);

        let cerr = got
            .iter()
            .find(|c| c.statement.start_line == 7)
            .expect("multi-line stream");
        assert_eq!(cerr.statement.call_target, "std::cerr");
        assert_eq!(cerr.reason, Reason::ContentKeywordMatch);

        let disabled = scan_disabled(&SourceLine::split(src), &Language::Cpp.config());
        let disabled: Vec<(usize, usize)> = disabled
            .iter()
            .filter(|c| c.is_debug)
            .map(|c| c.line_range())
            .collect();
        assert_eq!(disabled, vec![(15, 15)]);
    }

    #[test]
    fn test_rust_char_literals() {
        let got = scan_as(Language::Rust, include_str!("fixtures/rust/chars.rs"));
        let debug: Vec<(usize, Reason)> = got
            .iter()
            .filter(|c| c.is_debug)
            .map(|c| (c.statement.start_line, c.reason))
            .collect();
        assert_eq!(
            debug,
            vec![(6, Reason::ContentKeywordMatch), (13, Reason::CallTargetMatch)]
        );
    }

    #[test]
    fn test_rust_dbg_and_lifetimes() {
        let got = scan_as(Language::Rust, include_str!("fixtures/rust/dbg.rs"));
        let debug: Vec<(usize, Reason)> = got
            .iter()
            .filter(|c| c.is_debug)
            .map(|c| (c.statement.start_line, c.reason))
            .collect();
        assert_eq!(
            debug,
            vec![(2, Reason::CallTargetMatch), (4, Reason::ContentKeywordMatch)]
        );
    }
}

#[cfg(test)]
mod nesting_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_go_calls_inside_closures() {
        let got = go(include_str!("fixtures/go/nested.go"));
        assert_eq!(debug_ranges(&got), vec![(9, 9), (14, 14), (17, 17)]);

        let run = got
            .iter()
            .find(|c| c.statement.call_target == "t.Run")
            .expect("t.Run statement");
        assert_eq!(run.line_range(), (8, 11));
        assert!(!run.is_debug);
    }

    #[test]
    fn test_rust_calls_inside_closures() {
        let lines = SourceLine::split(include_str!("fixtures/rust/nested.rs"));
        let got = scan_lines(&lines, &Language::Rust.config()).expect("scan failed");
        let debug: Vec<(usize, Reason)> = got
            .iter()
            .filter(|c| c.is_debug)
            .map(|c| (c.statement.start_line, c.reason))
            .collect();
        assert_eq!(
            debug,
            vec![(5, Reason::CallTargetMatch), (10, Reason::ContentKeywordMatch)]
        );
    }

    #[test]
    fn test_output_call_arguments_are_not_split() {
        let got = go(r#"fmt.Println(fmt.Sprintf("debug: %d", 1))"#);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].statement.call_target, "fmt.Println");
        assert!(got[0].is_debug);
    }

    #[test]
    fn test_statements_stay_in_file_order() {
        let got = go("wrap(func() {\n\tfmt.Println(\"debug: a\")\n})\nfmt.Println(\"debug: b\")");
        let starts: Vec<(usize, &str)> = got
            .iter()
            .map(|c| (c.statement.start_line, c.statement.call_target.as_str()))
            .collect();
        assert_eq!(
            starts,
            vec![(0, "wrap"), (0, "func"), (1, "fmt.Println"), (3, "fmt.Println")]
        );
    }
}

#[cfg(test)]
mod literal_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_braces_are_text_in_go() {
        let got = go(r#"fmt.Println("{debug}")"#);
        assert!(got[0].is_debug);
    }

    #[test]
    fn test_percent_escape_keeps_keyword() {
        let got = go(r#"fmt.Printf("100%% debug\n")"#);
        assert!(got[0].is_debug);
    }

    #[test]
    fn test_verb_does_not_join_keyword() {
        let got = go(r#"fmt.Printf("de%sbug", x)"#);
        assert!(!got[0].is_debug);
    }

    #[test]
    fn test_rust_named_argument_is_not_keyword() {
        let lines = SourceLine::split("println!(\"{debug:?}\", debug = state);");
        let got = scan_lines(&lines, &Language::Rust.config()).expect("scan failed");
        assert!(!got[0].is_debug);
    }

    #[test]
    fn test_rust_quote_char_does_not_break_file() {
        let src = "fn is_quote(c: char) -> bool {\n    c == '\"'\n}\nfn main() {\n    println!(\"debug: x\");\n}";
        let lines = SourceLine::split(src);
        let got = scan_lines(&lines, &Language::Rust.config()).expect("char literal must not open a string");
        assert_eq!(debug_ranges(&got), vec![(4, 4)]);
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unbalanced_call_is_malformed() {
        let src = "fmt.Println(\"ok\")\nfmt.Printf(\n\t\"debug: %d\\n\",\n\t42\n";
        let err = scan_source(src, &ScanConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ScanError::MalformedStatement {
                start_line: 1,
                end_line: 3,
                kind: MalformedKind::UnbalancedDelimiters { depth: 1 },
            }
        );
        assert_eq!(err.to_string(), "malformed statement at lines 2-4: 1 unclosed delimiter(s) at end of file");
    }

    #[test]
    fn test_unterminated_literal_is_malformed() {
        let err = scan_source("x := `raw\nfmt.Println(\"debug\")", &ScanConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::MalformedStatement {
                start_line: 0,
                kind: MalformedKind::UnterminatedLiteral { quote: '`' },
                ..
            }
        ));
    }

    #[test]
    fn test_raw_literal_spanning_lines_hides_calls() {
        let src = "usage := `\nfmt.Println(\"debug\")\n`\nfmt.Println(\"done\")";
        let got = go(src);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].line_range(), (3, 3));
    }
}
