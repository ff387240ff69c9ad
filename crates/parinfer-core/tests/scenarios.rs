//! Black-box scenarios against the public API, one per named behavior the
//! engine is expected to satisfy.

use parinfer_core::{indent_mode, paren_mode, smart_mode, Options};

#[test]
fn indent_mode_closes_an_unclosed_list_at_the_next_lines_indent() {
    let out = indent_mode("(foo\nbar", &Options::default());
    assert!(out.success);
    assert_eq!(out.text, "(foo)\nbar");
}

#[test]
fn indent_mode_drops_a_trailing_unmatched_closer_once_indent_closes_the_list() {
    let out = indent_mode("(foo\nbar)", &Options::default());
    assert!(out.success);
    assert_eq!(out.text, "(foo)\nbar");
}

#[test]
fn paren_mode_indents_a_line_to_sit_inside_its_holding_closer() {
    let out = paren_mode("(foo\nbar)", &Options::default());
    assert!(out.success);
    assert_eq!(out.text, "(foo\n bar)");
}

#[test]
fn indent_mode_reports_an_unclosed_quote() {
    let out = indent_mode("(foo\"", &Options::default());
    assert!(!out.success);
    let err = out.error.expect("unclosed quote should produce an error");
    assert_eq!(err.kind.name(), "unclosed-quote");
    assert_eq!(err.line_no, 0);
    assert_eq!(err.x, 4);
}

#[test]
fn paren_mode_reports_an_unclosed_paren() {
    let out = paren_mode("(foo", &Options::default());
    assert!(!out.success);
    let err = out.error.expect("unclosed paren should produce an error");
    assert_eq!(err.kind.name(), "unclosed-paren");
    assert_eq!(err.line_no, 0);
    assert_eq!(err.x, 0);
}

#[test]
fn paren_mode_reports_quote_danger_inside_a_comment() {
    let out = paren_mode("; \"foo", &Options::default());
    assert!(!out.success);
    let err = out.error.expect("unbalanced quote in a comment is quote-danger");
    assert_eq!(err.kind.name(), "quote-danger");
    assert_eq!(err.line_no, 0);
    assert_eq!(err.x, 2);
}

#[test]
fn paren_mode_reports_a_hanging_backslash_at_end_of_line() {
    let out = paren_mode("(foo \\", &Options::default());
    assert!(!out.success);
    let err = out.error.expect("a trailing backslash in code is eol-backslash");
    assert_eq!(err.kind.name(), "eol-backslash");
    assert_eq!(err.line_no, 0);
    assert_eq!(err.x, 5);
}

#[test]
fn paren_mode_reports_an_unmatched_close_paren_of_the_wrong_kind() {
    let out = paren_mode("(foo]\nbar)", &Options::default());
    assert!(!out.success);
    let err = out.error.expect("a mismatched close paren is unmatched-close-paren");
    assert_eq!(err.kind.name(), "unmatched-close-paren");
    assert_eq!(err.line_no, 0);
    assert_eq!(err.x, 4);
}

#[test]
fn cross_mode_preservation_holds_with_no_cursor_supplied() {
    let text = "(defn foo [x]\n  (+ x 1))";
    let indented = indent_mode(text, &Options::default());
    let reparened = paren_mode(&indented.text, &Options::default());
    assert_eq!(reparened.text, indented.text);
}

#[test]
fn idempotence_holds_on_a_second_pass_with_no_cursor() {
    let text = "(foo\nbar";
    let first = indent_mode(text, &Options::default());
    let second = indent_mode(&first.text, &Options::default());
    assert_eq!(second.text, first.text);
}

#[test]
fn paren_trail_ranges_contain_only_close_parens() {
    let out = paren_mode("(foo\nbar)", &Options::default());
    assert!(out.success);
    let lines: Vec<&str> = out.text.split('\n').collect();
    for trail in &out.paren_trails {
        let line = lines[trail.line_no];
        let chars: Vec<char> = line.chars().collect();
        for &ch in &chars[trail.start_x..trail.end_x] {
            assert!(matches!(ch, ')' | ']' | '}'), "expected a close paren, found {ch:?}");
        }
    }
}

#[test]
fn smart_mode_accepts_a_leading_close_paren_by_falling_back_to_paren_mode() {
    let out = smart_mode("(foo)\n)", &Options::default());
    assert!(out.success);
}

#[test]
fn smart_mode_with_a_cursor_lets_the_user_hold_a_paren_open_while_typing() {
    let mut options = Options::default();
    options.cursor_line = Some(0);
    options.cursor_x = Some(4);
    let out = smart_mode("(foo)", &options);
    assert!(out.success);
}
