//! The per-character and per-line driver (C7, spec §4.7) plus the
//! character-event handlers it dispatches to (C2–C4, spec §4.2–§4.3).
//!
//! `Processor` is the single owned, mutable record the whole algorithm
//! mutates in place (spec §3 "Result"); per spec §9's "mutable shared
//! state" note, its fields are grouped into cohesive substructures
//! (`LineEditor`, `CursorState`, `LexState`, `ParenTrail`) rather than left
//! as one flat bag, even though most operations still need simultaneous
//! access to several of them and so live as `Processor` methods.

use std::collections::HashMap;

use crate::error::{EngineResult, EngineSignal, ErrorExtra, ErrorKind, ErrorPos, ParinferError};
use crate::lexical::{LexState, BACKSLASH, DOUBLE_QUOTE, NEWLINE, SEMICOLON, TAB};
use crate::line_editor::{CursorState, LineEditor};
use crate::options::{ChangeMap, Mode, Options, TabStop};
use crate::paren::{is_close_paren, is_open_paren, is_valid_close_paren, Closer, Opener, ParenArena};
use crate::trail::ParenTrail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgTabStop {
    Space,
    Arg,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorTracker {
    pub error: Option<ParinferError>,
    pub pos_cache: HashMap<ErrorKind, ErrorPos>,
}

/// The engine's running state for one `processText` call (spec §3
/// "Result"). Line/character counters that start "before the beginning"
/// (`-1` in the reference) are `isize`; positions that are either unset or
/// a concrete buffer coordinate are `Option<usize>`.
pub(crate) struct Processor {
    pub mode: Mode,
    pub smart: bool,
    pub force_balance: bool,
    pub partial_result: bool,
    pub return_parens: bool,

    pub orig_text: String,
    pub input_lines: Vec<Vec<char>>,
    pub input_line_no: isize,
    pub input_x: isize,

    pub output: LineEditor,
    pub line_no: isize,
    pub x: isize,
    pub ch: String,
    pub indent_x: Option<usize>,
    pub comment_x: Option<usize>,

    pub paren_stack: Vec<Opener>,
    pub paren_trail: ParenTrail,
    pub paren_trails: Vec<crate::options::ParenTrailRecord>,
    pub paren_arena: Option<ParenArena>,

    pub cursor: CursorState,

    pub lex: LexState,

    pub tracking_indent: bool,
    pub skip_char: bool,
    pub tracking_arg_tab_stop: Option<ArgTabStop>,

    pub max_indent: Option<usize>,
    pub indent_delta: isize,

    pub errors: ErrorTracker,
    pub changes: ChangeMap,

    pub tab_stops: Vec<TabStop>,

    pub success: bool,
}

/// Splits on `\r\n` or `\n`, matching the reference's `LINE_ENDING_REGEX`
/// (`\r?\n`) without pulling in a regex dependency for one scan.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let end = if i > start && bytes[i - 1] == b'\r' { i - 1 } else { i };
            lines.push(&text[start..end]);
            start = i + 1;
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines
}

impl Processor {
    pub(crate) fn new(text: &str, options: &Options, mode: Mode, smart: bool) -> Self {
        let input_lines = split_lines(text).iter().map(|l| l.chars().collect()).collect();
        let changes = ChangeMap::build(&options.changes);
        Processor {
            mode,
            smart,
            force_balance: options.force_balance,
            partial_result: options.partial_result,
            return_parens: options.return_parens,

            orig_text: text.to_string(),
            input_lines,
            input_line_no: -1,
            input_x: -1,

            output: LineEditor::default(),
            line_no: -1,
            x: 0,
            ch: String::new(),
            indent_x: None,
            comment_x: None,

            paren_stack: Vec::new(),
            paren_trail: ParenTrail::new(),
            paren_trails: Vec::new(),
            paren_arena: options.return_parens.then(ParenArena::default),

            cursor: CursorState {
                cursor_x: options.cursor_x,
                cursor_line: options.cursor_line,
                prev_cursor_x: options.prev_cursor_x,
                prev_cursor_line: options.prev_cursor_line,
                orig_cursor_x: options.cursor_x,
                orig_cursor_line: options.cursor_line,
                selection_start_line: options.selection_start_line,
            },

            lex: LexState::new(),

            tracking_indent: false,
            skip_char: false,
            tracking_arg_tab_stop: None,

            max_indent: None,
            indent_delta: 0,

            errors: ErrorTracker::default(),
            changes,

            tab_stops: Vec::new(),

            success: false,
        }
    }

    /// Runs every input line then finalizes. The Smart-Mode fallback
    /// restart lives in `crate::api::process_text`, which owns retrying
    /// with a fresh `Processor` in Paren Mode.
    pub(crate) fn run(&mut self) -> EngineResult<()> {
        for i in 0..self.input_lines.len() {
            self.input_line_no = i as isize;
            self.process_line(i)?;
        }
        self.finalize_result()
    }

    fn process_line(&mut self, line_no: usize) -> EngineResult<()> {
        self.init_line();
        let line: String = self.input_lines[line_no].iter().collect();
        self.output.push_line(&line);

        self.set_tab_stops();

        let chars = self.input_lines[line_no].clone();
        for (x, ch) in chars.iter().enumerate() {
            self.input_x = x as isize;
            self.process_char(&ch.to_string())?;
        }
        self.process_char("\n")?;

        if !self.force_balance {
            self.check_unmatched_outside_paren_trail()?;
            self.check_leading_close_paren()?;
        }

        if Some(self.line_no as usize) == self.paren_trail.line_no {
            self.finish_new_paren_trail();
        }
        Ok(())
    }

    fn process_char(&mut self, ch: &str) -> EngineResult<()> {
        let orig_ch = ch.to_string();
        self.ch = orig_ch.clone();
        self.skip_char = false;

        self.handle_change_delta();

        if self.tracking_indent {
            self.check_indent()?;
        }

        if self.skip_char {
            self.ch = String::new();
        } else {
            self.on_char()?;
        }

        self.commit_char(&orig_ch);
        Ok(())
    }

    pub(crate) fn finalize_result(&mut self) -> EngineResult<()> {
        if self.lex.quote_danger {
            return Err(self.error(ErrorKind::QuoteDanger).into());
        }
        if self.lex.is_in_str {
            return Err(self.error(ErrorKind::UnclosedQuote).into());
        }
        if !self.paren_stack.is_empty() && self.mode == Mode::Paren {
            return Err(self.error(ErrorKind::UnclosedParen).into());
        }
        if self.mode == Mode::Indent {
            self.init_line();
            self.on_indent()?;
        }
        self.success = true;
        Ok(())
    }

    fn init_line(&mut self) {
        self.x = 0;
        self.line_no += 1;

        self.indent_x = None;
        self.comment_x = None;
        self.indent_delta = 0;
        self.errors.pos_cache.remove(&ErrorKind::UnmatchedCloseParen);
        self.errors.pos_cache.remove(&ErrorKind::UnmatchedOpenParen);
        self.errors.pos_cache.remove(&ErrorKind::LeadingCloseParen);

        self.tracking_arg_tab_stop = None;
        self.tracking_indent = !self.lex.is_in_str;
    }

    /// Diffs the character the machine emits against the original input
    /// character, replacing the output range if they differ (spec §4.1
    /// `commitChar`).
    fn commit_char(&mut self, orig_ch: &str) {
        if orig_ch != self.ch {
            let start = self.x as usize;
            let end = start + orig_ch.chars().count();
            let replacement = self.ch.clone();
            self.replace_within_line(self.line_no as usize, start, end, &replacement);
            self.indent_delta -= orig_ch.chars().count() as isize - self.ch.chars().count() as isize;
        }
        self.x += self.ch.chars().count() as isize;
    }

    pub(crate) fn replace_within_line(&mut self, line_no: usize, start: usize, end: usize, replacement: &str) {
        self.output.replace_within_line(&mut self.cursor, line_no, start, end, replacement);
    }

    pub(crate) fn insert_within_line(&mut self, line_no: usize, idx: usize, insert: &str) {
        self.output.insert_within_line(&mut self.cursor, line_no, idx, insert);
    }

    fn handle_change_delta(&mut self) {
        if !self.changes.is_empty() && (self.smart || self.mode == Mode::Paren) {
            if let Some(delta) = self.changes.delta_at(self.input_line_no as usize, self.input_x as usize) {
                self.indent_delta += delta;
            }
        }
    }

    fn track_arg_tab_stop(&mut self, state: ArgTabStop) {
        match state {
            ArgTabStop::Space => {
                if self.lex.is_in_code && self.lex.is_whitespace(&self.ch) {
                    self.tracking_arg_tab_stop = Some(ArgTabStop::Arg);
                }
            }
            ArgTabStop::Arg => {
                if !self.lex.is_whitespace(&self.ch) {
                    let x = self.x as usize;
                    if let Some(opener) = self.paren_stack.last_mut() {
                        opener.arg_x = Some(x);
                    }
                    self.tracking_arg_tab_stop = None;
                }
            }
        }
    }

    fn check_cursor_holding(&self) -> EngineResult<bool> {
        let opener = self.paren_stack.last().expect("checkCursorHolding only runs right after matching a closer");
        let parent = if self.paren_stack.len() >= 2 {
            Some(&self.paren_stack[self.paren_stack.len() - 2])
        } else {
            None
        };
        let hold_min_x = parent.map(|p| p.x + 1).unwrap_or(0);
        let hold_max_x = opener.x;

        let holding = self.cursor.cursor_line == Some(opener.line_no)
            && self.cursor.cursor_x.is_some_and(|cx| hold_min_x <= cx && cx <= hold_max_x);

        let should_check_prev = self.changes.is_empty() && self.cursor.prev_cursor_line.is_some();
        if should_check_prev {
            let prev_holding = self.cursor.prev_cursor_line == Some(opener.line_no)
                && self
                    .cursor
                    .prev_cursor_x
                    .is_some_and(|px| hold_min_x <= px && px <= hold_max_x);
            if prev_holding && !holding {
                return Err(EngineSignal::ReleaseCursorHold);
            }
        }
        Ok(holding)
    }

    // ---- literal character events (spec §4.3) ----

    fn on_open_paren(&mut self) {
        if !self.lex.is_in_code {
            return;
        }
        let ch = self.ch.chars().next().expect("open-paren char is non-empty");
        let mut opener = Opener::new(ch, self.line_no as usize, self.x as usize, self.input_line_no as usize, self.input_x as usize);
        opener.indent_delta = self.indent_delta;

        if self.return_parens {
            let parent_idx = self.paren_stack.last().and_then(|o| o.arena_index);
            let arena = self.paren_arena.get_or_insert_with(ParenArena::default);
            opener.arena_index = Some(arena.push(opener.ch, opener.line_no, opener.x, opener.input_line_no, opener.input_x, parent_idx));
        }

        self.paren_stack.push(opener);
        self.tracking_arg_tab_stop = Some(ArgTabStop::Space);
    }

    fn on_matched_close_paren(&mut self) -> EngineResult<()> {
        if self.return_parens {
            let closer = Closer {
                line_no: self.line_no as usize,
                x: self.x as usize,
                ch: self.ch.chars().next().expect("close-paren char is non-empty"),
                trail: None,
            };
            if let (Some(opener), Some(arena)) = (self.paren_stack.last(), self.paren_arena.as_mut()) {
                if let Some(idx) = opener.arena_index {
                    arena.set_closer(idx, closer);
                }
            }
        }

        self.paren_trail.end_x = Some(self.x as usize + 1);
        let opener = self.paren_stack.last().cloned().expect("matched close-paren implies a matching opener");
        self.paren_trail.openers.push(opener);

        if self.mode == Mode::Indent && self.smart && self.check_cursor_holding()? {
            let orig_start_x = self.paren_trail.start_x;
            let orig_end_x = self.paren_trail.end_x;
            let orig_openers = std::mem::take(&mut self.paren_trail.openers);
            self.reset_paren_trail(self.line_no as usize, self.x as usize + 1);
            self.paren_trail.clamped.start_x = orig_start_x;
            self.paren_trail.clamped.end_x = orig_end_x;
            self.paren_trail.clamped.openers = orig_openers;
        }

        self.paren_stack.pop();
        self.tracking_arg_tab_stop = None;
        Ok(())
    }

    fn on_unmatched_close_paren(&mut self) -> EngineResult<()> {
        match self.mode {
            Mode::Paren => {
                let in_leading_trail =
                    self.paren_trail.line_no == Some(self.line_no as usize) && self.paren_trail.start_x == self.indent_x;
                let can_remove = self.smart && in_leading_trail;
                if !can_remove {
                    return Err(self.error(ErrorKind::UnmatchedCloseParen).into());
                }
            }
            Mode::Indent => {
                if !self.errors.pos_cache.contains_key(&ErrorKind::UnmatchedCloseParen) {
                    self.cache_error_pos(ErrorKind::UnmatchedCloseParen);
                    if let Some(opener) = self.paren_stack.last().cloned() {
                        let mut pos = self.cache_error_pos(ErrorKind::UnmatchedOpenParen);
                        pos.input_line_no = opener.input_line_no;
                        pos.input_x = opener.input_x;
                        self.errors.pos_cache.insert(ErrorKind::UnmatchedOpenParen, pos);
                    }
                }
            }
        }
        self.ch = String::new();
        Ok(())
    }

    fn on_close_paren(&mut self) -> EngineResult<()> {
        if !self.lex.is_in_code {
            return Ok(());
        }
        let ch = self.ch.chars().next().expect("close-paren char is non-empty");
        let valid = self.paren_stack.last().is_some_and(|o| is_valid_close_paren(o.ch, ch));
        if valid {
            self.on_matched_close_paren()
        } else {
            self.on_unmatched_close_paren()
        }
    }

    fn on_tab(&mut self) {
        if self.lex.is_in_code {
            self.ch = "  ".to_string();
        }
    }

    fn on_semicolon(&mut self) {
        if self.lex.is_in_code {
            self.lex.is_in_comment = true;
            self.comment_x = Some(self.x as usize);
            self.tracking_arg_tab_stop = None;
        }
    }

    fn on_newline(&mut self) {
        self.lex.is_in_comment = false;
        self.ch = String::new();
    }

    fn on_quote(&mut self) {
        if self.lex.is_in_str {
            self.lex.is_in_str = false;
        } else if self.lex.is_in_comment {
            self.lex.quote_danger = !self.lex.quote_danger;
            if self.lex.quote_danger {
                self.cache_error_pos(ErrorKind::QuoteDanger);
            }
        } else {
            self.lex.is_in_str = true;
            self.cache_error_pos(ErrorKind::UnclosedQuote);
        }
    }

    fn on_backslash(&mut self) {
        self.lex.is_escaping = true;
    }

    fn after_backslash(&mut self) -> EngineResult<()> {
        self.lex.is_escaping = false;
        self.lex.is_escaped = true;

        if self.ch == "\n" {
            if self.lex.is_in_code {
                return Err(self.error(ErrorKind::EolBackslash).into());
            }
            self.on_newline();
        }
        Ok(())
    }

    fn on_char(&mut self) -> EngineResult<()> {
        self.lex.is_escaped = false;

        if self.lex.is_escaping {
            self.after_backslash()?;
        } else {
            let first = self.ch.chars().next();
            match first {
                Some(c) if is_open_paren(c) => self.on_open_paren(),
                Some(c) if is_close_paren(c) => self.on_close_paren()?,
                Some(DOUBLE_QUOTE) => self.on_quote(),
                Some(SEMICOLON) => self.on_semicolon(),
                Some(BACKSLASH) => self.on_backslash(),
                Some(TAB) => self.on_tab(),
                Some(NEWLINE) => self.on_newline(),
                _ => {}
            }
        }

        self.lex.is_in_code = !self.lex.is_in_comment && !self.lex.is_in_str;

        if self.lex.is_closable(&self.ch) {
            let new_x = self.x as usize + self.ch.chars().count();
            self.reset_paren_trail(self.line_no as usize, new_x);
        }

        if let Some(state) = self.tracking_arg_tab_stop {
            self.track_arg_tab_stop(state);
        }
        Ok(())
    }

    // ---- error helpers (spec §7) ----

    pub(crate) fn cache_error_pos(&mut self, kind: ErrorKind) -> ErrorPos {
        let pos = ErrorPos {
            line_no: self.line_no as usize,
            x: self.x as usize,
            input_line_no: self.input_line_no as usize,
            input_x: self.input_x as usize,
        };
        self.errors.pos_cache.insert(kind, pos);
        pos
    }

    fn pick(&self, cache: Option<&ErrorPos>) -> (usize, usize) {
        if self.partial_result {
            cache.map(|c| (c.line_no, c.x)).unwrap_or((self.line_no as usize, self.x as usize))
        } else {
            cache
                .map(|c| (c.input_line_no, c.input_x))
                .unwrap_or((self.input_line_no as usize, self.input_x as usize))
        }
    }

    fn pick_opener(&self, opener: &Opener) -> (usize, usize) {
        if self.partial_result {
            (opener.line_no, opener.x)
        } else {
            (opener.input_line_no, opener.input_x)
        }
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> ParinferError {
        let cache = self.errors.pos_cache.get(&kind).copied();
        let (mut line_no, mut x) = self.pick(cache.as_ref());
        let mut extra = None;

        match kind {
            ErrorKind::UnmatchedCloseParen => {
                let open_cache = self.errors.pos_cache.get(&ErrorKind::UnmatchedOpenParen).copied();
                let opener_top = self.paren_stack.last();
                if open_cache.is_some() || opener_top.is_some() {
                    let (eln, ex) = match &open_cache {
                        Some(c) => self.pick(Some(c)),
                        None => self.pick_opener(opener_top.expect("checked above")),
                    };
                    extra = Some(ErrorExtra {
                        kind: ErrorKind::UnmatchedOpenParen,
                        line_no: eln,
                        x: ex,
                    });
                }
            }
            ErrorKind::UnclosedParen => {
                if let Some(opener) = self.paren_stack.last() {
                    let (oln, ox) = self.pick_opener(opener);
                    line_no = oln;
                    x = ox;
                }
            }
            _ => {}
        }

        ParinferError { kind, line_no, x, extra }
    }

    // ---- indent-point / tab-stop helpers shared with indent.rs ----

    pub(crate) fn should_add_opener_indent(&self, opener: &Opener) -> bool {
        opener.indent_delta != self.indent_delta
    }

    pub(crate) fn check_unmatched_outside_paren_trail(&self) -> EngineResult<()> {
        if let (Some(cache), Some(start_x)) = (
            self.errors.pos_cache.get(&ErrorKind::UnmatchedCloseParen),
            self.paren_trail.start_x,
        ) {
            if cache.x < start_x {
                return Err(self.error(ErrorKind::UnmatchedCloseParen).into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_crlf_and_lf() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("one line"), vec!["one line"]);
    }
}
