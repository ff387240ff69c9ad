//! Indent handler (C6, spec §4.6): drives the mode-specific rewrite at each
//! line's indentation point, and `getParentOpenerIndex`, the routine that
//! decides which stack opener is the current line's parent.

use crate::error::{EngineResult, EngineSignal, ErrorKind};
use crate::lexical::{BLANK_SPACE, NEWLINE, SEMICOLON, TAB};
use crate::options::{Mode, TabStop};
use crate::paren::{is_close_paren, is_valid_close_paren};
use crate::processor::Processor;
use crate::trail::is_cursor_left_of;

impl Processor {
    fn add_indent(&mut self, delta: isize) {
        let orig_indent = self.x as usize;
        let new_indent = (orig_indent as isize + delta).max(0) as usize;
        let indent_str = " ".repeat(new_indent);
        self.replace_within_line(self.line_no as usize, 0, orig_indent, &indent_str);
        self.x = new_indent as isize;
        self.indent_x = Some(new_indent);
        self.indent_delta += delta;
    }

    /// PAREN MODE: clamp the indentation this line would otherwise get to
    /// `[opener.x+1, opener.maxChildIndent]`, adding back any of the
    /// parent's shift the user hasn't already applied (spec §4.6
    /// `correctIndent`).
    fn correct_indent(&mut self) {
        let orig_indent = self.x as usize;
        let mut new_indent = orig_indent as isize;
        let mut min_indent: usize = 0;
        let mut max_indent = self.max_indent;

        if let Some(opener) = self.paren_stack.last().cloned() {
            min_indent = opener.x + 1;
            max_indent = opener.max_child_indent;
            if self.should_add_opener_indent(&opener) {
                new_indent += opener.indent_delta;
            }
        }

        new_indent = new_indent.max(min_indent as isize);
        if let Some(max_indent) = max_indent {
            new_indent = new_indent.min(max_indent as isize);
        }

        if new_indent as usize != orig_indent {
            self.add_indent(new_indent - orig_indent as isize);
        }
    }

    /// Runs at the first non-whitespace character of a line (spec §4.6
    /// `onIndent`).
    pub(crate) fn on_indent(&mut self) -> EngineResult<()> {
        self.indent_x = Some(self.x as usize);
        self.tracking_indent = false;

        if self.lex.quote_danger {
            return Err(self.error(ErrorKind::QuoteDanger).into());
        }

        match self.mode {
            Mode::Indent => {
                self.correct_paren_trail(self.x as usize);
                if let Some(opener) = self.paren_stack.last().cloned() {
                    if self.should_add_opener_indent(&opener) {
                        self.add_indent(opener.indent_delta);
                    }
                }
            }
            Mode::Paren => {
                self.correct_indent();
            }
        }
        Ok(())
    }

    pub(crate) fn check_leading_close_paren(&self) -> EngineResult<()> {
        if self.errors.pos_cache.contains_key(&ErrorKind::LeadingCloseParen)
            && self.paren_trail.line_no == Some(self.line_no as usize)
        {
            return Err(self.error(ErrorKind::LeadingCloseParen).into());
        }
        Ok(())
    }

    /// A line starting with a close paren (spec §4.6 `onLeadingCloseParen`).
    fn on_leading_close_paren(&mut self) -> EngineResult<()> {
        if self.mode == Mode::Indent {
            if !self.force_balance && self.smart {
                return Err(EngineSignal::LeadingCloseParen);
            }
            if !self.errors.pos_cache.contains_key(&ErrorKind::LeadingCloseParen) {
                self.cache_error_pos(ErrorKind::LeadingCloseParen);
            }
            self.skip_char = true;
        }

        if self.mode == Mode::Paren {
            let ch = self.ch.chars().next().unwrap_or_default();
            let valid = self.paren_stack.last().is_some_and(|o| is_valid_close_paren(o.ch, ch));
            if !valid {
                if self.smart {
                    self.skip_char = true;
                } else {
                    return Err(self.error(ErrorKind::UnmatchedCloseParen).into());
                }
            } else if is_cursor_left_of(self.cursor.cursor_x, self.cursor.cursor_line, Some(self.x as usize), self.line_no as usize) {
                self.reset_paren_trail(self.line_no as usize, self.x as usize);
                self.on_indent()?;
            } else {
                self.append_paren_trail();
                self.skip_char = true;
            }
        }
        Ok(())
    }

    /// A comment line doesn't count as an indentation point, but still
    /// shifts by its parent's `indentDelta` (spec §4.6 `onCommentLine`).
    fn on_comment_line(&mut self) {
        let trail_len = self.paren_trail.openers.len();

        if self.mode == Mode::Paren {
            for j in 0..trail_len {
                let opener = self.paren_trail.openers[trail_len - 1 - j].clone();
                self.paren_stack.push(opener);
            }
        }

        let i = self.get_parent_opener_index(self.x as usize);
        let stack_len = self.paren_stack.len();
        if i < stack_len {
            let opener = self.paren_stack[stack_len - 1 - i].clone();
            if self.should_add_opener_indent(&opener) {
                self.add_indent(opener.indent_delta);
            }
        }

        if self.mode == Mode::Paren {
            for _ in 0..trail_len {
                self.paren_stack.pop();
            }
        }
    }

    pub(crate) fn check_indent(&mut self) -> EngineResult<()> {
        let ch = self.ch.clone();
        let first = ch.chars().next();
        if first.is_some_and(is_close_paren) {
            self.on_leading_close_paren()?;
        } else if first == Some(SEMICOLON) {
            self.on_comment_line();
            self.tracking_indent = false;
        } else if first != Some(NEWLINE) && ch != BLANK_SPACE && first != Some(TAB) {
            self.on_indent()?;
        }
        Ok(())
    }

    fn make_tab_stop(&self, opener: &crate::paren::Opener) -> TabStop {
        TabStop {
            ch: opener.ch,
            x: opener.x,
            line_no: opener.line_no,
            arg_x: opener.arg_x,
        }
    }

    fn tab_stop_line(&self) -> Option<usize> {
        self.cursor.selection_start_line.or(self.cursor.cursor_line)
    }

    /// Snapshots the paren stack (plus, in Paren Mode, the pending trail)
    /// into `tabStops` when this line holds the cursor/selection start
    /// (spec §4.6 `setTabStops`).
    pub(crate) fn set_tab_stops(&mut self) {
        if self.tab_stop_line() != Some(self.line_no as usize) {
            return;
        }

        for opener in self.paren_stack.clone() {
            let stop = self.make_tab_stop(&opener);
            self.tab_stops.push(stop);
        }

        if self.mode == Mode::Paren {
            for opener in self.paren_trail.openers.iter().rev().cloned().collect::<Vec<_>>() {
                let stop = self.make_tab_stop(&opener);
                self.tab_stops.push(stop);
            }
        }

        for i in 1..self.tab_stops.len() {
            let x = self.tab_stops[i].x;
            if let Some(prev_arg_x) = self.tab_stops[i - 1].arg_x {
                if prev_arg_x >= x {
                    self.tab_stops[i - 1].arg_x = None;
                }
            }
        }
    }

    /// The most subtle routine in the engine (spec §4.6): walking the
    /// stack from the top down, decide whether each opener is "outside"
    /// the line's indentation point both before and after this edit, and
    /// — when that classification flips — whether to treat the flip as
    /// fragmentation (lifting the line out of the expression) or adoption
    /// (pulling it into a neighbour). Returns the stack depth from the top
    /// at which the first parent is found, or `paren_stack.len()` if none
    /// qualifies (close everything).
    pub(crate) fn get_parent_opener_index(&mut self, indent_x: usize) -> usize {
        let len = self.paren_stack.len();
        let mut i = 0;
        while i < len {
            let opener = self.paren_stack[len - 1 - i].clone();

            let curr_outside = opener.x < indent_x;
            let prev_indent_x = indent_x as isize - self.indent_delta;
            let prev_outside = (opener.x as isize - opener.indent_delta) < prev_indent_x;

            let mut is_parent = false;

            if prev_outside && curr_outside {
                is_parent = true;
            } else if !prev_outside && !curr_outside {
                is_parent = false;
            } else if prev_outside && !curr_outside {
                // Fragmentation: the line used to be outside this opener
                // but now falls inside it.
                if self.indent_delta == 0 {
                    // Prevent fragmentation: the whole block moved together.
                    is_parent = true;
                } else if opener.indent_delta == 0 {
                    // Allow fragmentation: only this line moved.
                    is_parent = false;
                } else {
                    // Both deltas are nonzero. The reference leaves this
                    // case unresolved and silently allows fragmentation;
                    // we preserve that behavior rather than invent a new
                    // rule (see DESIGN.md).
                    is_parent = false;
                }
            } else {
                // Adoption: the line used to be inside this opener but now
                // falls outside it.
                let next_opener = if i + 1 < len { Some(self.paren_stack[len - 2 - i].clone()) } else { None };

                if let Some(next_opener) = &next_opener {
                    if next_opener.indent_delta <= opener.indent_delta {
                        is_parent = indent_x as isize + next_opener.indent_delta > opener.x as isize;
                    } else {
                        is_parent = true;
                    }
                } else if self.indent_delta > opener.indent_delta {
                    is_parent = true;
                }

                if is_parent {
                    self.paren_stack[len - 1 - i].indent_delta = 0;
                }
            }

            if is_parent {
                return i;
            }
            i += 1;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn indent_result(text: &str) -> String {
        crate::api::indent_mode(text, &Options::default()).text
    }

    #[test]
    fn unclosed_list_gets_closed_at_next_lines_indent() {
        assert_eq!(indent_result("(foo\nbar"), "(foo)\nbar");
    }

    #[test]
    fn trailing_unmatched_closer_is_dropped_when_indent_closes_the_list() {
        assert_eq!(indent_result("(foo\nbar)"), "(foo)\nbar");
    }
}
