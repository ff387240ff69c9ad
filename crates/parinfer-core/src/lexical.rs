//! Character classification and lexical state tracking (C2, C3 — spec §4.2).
//!
//! The engine's "current character" is modelled as a small string rather
//! than a `char`: a tab is rewritten to two spaces and a deleted character
//! becomes the empty string, both in the same processing step that reads
//! the original input character (spec §4.1 `commitChar`, §4.2 "tab in code
//! is rewritten to two spaces").

use crate::paren::is_close_paren;

pub(crate) const BLANK_SPACE: &str = " ";
pub(crate) const DOUBLE_SPACE: &str = "  ";
pub(crate) const DOUBLE_QUOTE: char = '"';
pub(crate) const SEMICOLON: char = ';';
pub(crate) const BACKSLASH: char = '\\';
pub(crate) const TAB: char = '\t';
pub(crate) const NEWLINE: char = '\n';

/// `isInCode / isInStr / isInComment / isEscaping / isEscaped / quoteDanger`
/// (spec §3 "Result" lexical flags).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LexState {
    pub is_in_code: bool,
    pub is_escaping: bool,
    pub is_escaped: bool,
    pub is_in_str: bool,
    pub is_in_comment: bool,
    pub quote_danger: bool,
}

impl LexState {
    pub(crate) fn new() -> Self {
        LexState {
            is_in_code: true,
            ..Default::default()
        }
    }

    /// True for a single space or the double-space tab replacement, unless
    /// the current character is itself escaped.
    pub(crate) fn is_whitespace(&self, ch: &str) -> bool {
        !self.is_escaped && (ch == BLANK_SPACE || ch == DOUBLE_SPACE)
    }

    /// Can `ch` be the last code character of a list (i.e. does writing it
    /// invalidate the current paren trail)? Spec §4.2 `isClosable`.
    pub(crate) fn is_closable(&self, ch: &str) -> bool {
        if ch.is_empty() {
            return false;
        }
        let closer = ch.chars().next().is_some_and(is_close_paren) && !self.is_escaped;
        self.is_in_code && !self.is_whitespace(ch) && !closer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_recognizes_tab_expansion() {
        let lex = LexState::new();
        assert!(lex.is_whitespace(BLANK_SPACE));
        assert!(lex.is_whitespace(DOUBLE_SPACE));
        assert!(!lex.is_whitespace("a"));
    }

    #[test]
    fn closable_excludes_whitespace_and_closers() {
        let lex = LexState::new();
        assert!(lex.is_closable("a"));
        assert!(!lex.is_closable(" "));
        assert!(!lex.is_closable(")"));
        assert!(!lex.is_closable(""));
    }
}
