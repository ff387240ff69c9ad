//! Paren trail data model and cursor-position predicates (C5, spec §3
//! "ParenTrail", §4.4, §4.5). The operations that mutate a trail alongside
//! the paren stack and output buffer live on `Processor` (they need
//! exclusive access to more than one substructure at once); this module
//! holds the trail's shape and the standalone positional predicates.

use crate::options::Mode;
use crate::paren::{is_close_paren, Closer, Opener};
use crate::processor::Processor;

/// The portion of a trail a cursor hid from consideration, stashed so
/// Smart Mode can reinstate it if the cursor moves away (spec §4.4
/// `clampParenTrailToCursor`).
#[derive(Debug, Clone, Default)]
pub(crate) struct Clamped {
    pub start_x: Option<usize>,
    pub end_x: Option<usize>,
    pub openers: Vec<Opener>,
}

/// The trailing range of a single line eligible for rewrite (spec §3
/// "ParenTrail").
#[derive(Debug, Clone, Default)]
pub(crate) struct ParenTrail {
    pub line_no: Option<usize>,
    pub start_x: Option<usize>,
    pub end_x: Option<usize>,
    pub openers: Vec<Opener>,
    pub clamped: Clamped,
}

impl ParenTrail {
    pub(crate) fn new() -> Self {
        ParenTrail::default()
    }
}

/// Same line and `cursorX <= x` — inclusive, since `cursorX == x` still
/// implies the cursor sits immediately before `x` (spec §4.5).
pub(crate) fn is_cursor_left_of(
    cursor_x: Option<usize>,
    cursor_line: Option<usize>,
    x: Option<usize>,
    line_no: usize,
) -> bool {
    match (cursor_x, cursor_line, x) {
        (Some(cx), Some(cl), Some(x)) => cl == line_no && cx <= x,
        _ => false,
    }
}

/// Same line and `cursorX > x` (spec §4.5).
pub(crate) fn is_cursor_right_of(
    cursor_x: Option<usize>,
    cursor_line: Option<usize>,
    x: Option<usize>,
    line_no: usize,
) -> bool {
    match (cursor_x, cursor_line, x) {
        (Some(cx), Some(cl), Some(x)) => cl == line_no && cx > x,
        _ => false,
    }
}

impl Processor {
    pub(crate) fn reset_paren_trail(&mut self, line_no: usize, x: usize) {
        self.paren_trail.line_no = Some(line_no);
        self.paren_trail.start_x = Some(x);
        self.paren_trail.end_x = Some(x);
        self.paren_trail.openers.clear();
        self.paren_trail.clamped = Clamped::default();
    }

    fn is_cursor_in_comment(&self, cursor_x: Option<usize>, cursor_line: Option<usize>) -> bool {
        is_cursor_right_of(cursor_x, cursor_line, self.comment_x, self.line_no as usize)
    }

    fn is_cursor_clamping_paren_trail(&self, cursor_x: Option<usize>, cursor_line: Option<usize>) -> bool {
        is_cursor_right_of(cursor_x, cursor_line, self.paren_trail.start_x, self.line_no as usize)
            && !self.is_cursor_in_comment(cursor_x, cursor_line)
    }

    /// INDENT MODE: let the cursor hide (clamp) part of the trail from
    /// consideration, stashing the hidden openers so Smart Mode can
    /// reinstate them if the cursor moves away (spec §4.4).
    pub(crate) fn clamp_paren_trail_to_cursor(&mut self) {
        let (Some(start_x), Some(end_x)) = (self.paren_trail.start_x, self.paren_trail.end_x) else {
            return;
        };
        let clamping = self.is_cursor_clamping_paren_trail(self.cursor.cursor_x, self.cursor.cursor_line);
        if !clamping {
            return;
        }
        let cursor_x = self.cursor.cursor_x.expect("clamping implies a cursor position");
        let new_start_x = start_x.max(cursor_x);
        let new_end_x = end_x.max(cursor_x);

        let line = self.output.line(self.line_no as usize);
        let remove_count = (start_x..new_start_x).filter(|&i| line.get(i).copied().is_some_and(is_close_paren)).count();

        let mut openers = std::mem::take(&mut self.paren_trail.openers);
        let clamped_openers: Vec<Opener> = openers.drain(0..remove_count).collect();

        self.paren_trail.openers = openers;
        self.paren_trail.start_x = Some(new_start_x);
        self.paren_trail.end_x = Some(new_end_x);

        self.paren_trail.clamped.openers = clamped_openers;
        self.paren_trail.clamped.start_x = Some(start_x);
        self.paren_trail.clamped.end_x = Some(end_x);
    }

    /// INDENT MODE: push the trail's openers back onto the stack so the
    /// next line's indent point decides how many of them to close.
    pub(crate) fn pop_paren_trail(&mut self) {
        let (Some(start_x), Some(end_x)) = (self.paren_trail.start_x, self.paren_trail.end_x) else {
            return;
        };
        if start_x == end_x {
            return;
        }
        while let Some(opener) = self.paren_trail.openers.pop() {
            self.paren_stack.push(opener);
        }
    }

    /// INDENT MODE: close every opener above `getParentOpenerIndex` into
    /// the paren trail (spec §4.4 `correctParenTrail`).
    pub(crate) fn correct_paren_trail(&mut self, indent_x: usize) {
        let mut parens = String::new();
        let index = self.get_parent_opener_index(indent_x);
        let trail_start_x = self.paren_trail.start_x;

        for i in 0..index {
            let opener = self.paren_stack.pop().expect("getParentOpenerIndex stays within the stack depth");
            let close_ch = opener.closer_ch();

            if self.return_parens {
                if let (Some(line_no), Some(start_x)) = (self.paren_trail.line_no, trail_start_x) {
                    if let (Some(arena), Some(idx)) = (self.paren_arena.as_mut(), opener.arena_index) {
                        arena.set_closer(idx, Closer { line_no, x: start_x + i, ch: close_ch, trail: None });
                    }
                }
            }

            self.paren_trail.openers.push(opener);
            parens.push(close_ch);
        }

        if let Some(trail_line_no) = self.paren_trail.line_no {
            let start_x = self.paren_trail.start_x.expect("trail has a line_no so start_x is set");
            let end_x = self.paren_trail.end_x.expect("trail has a line_no so end_x is set");
            self.replace_within_line(trail_line_no, start_x, end_x, &parens);
            self.paren_trail.end_x = Some(start_x + parens.chars().count());
            self.remember_paren_trail();
        }
    }

    /// PAREN MODE: strip interior spaces from the trail, keeping only close
    /// parens (spec §4.4 `cleanParenTrail`).
    pub(crate) fn clean_paren_trail(&mut self) {
        let (Some(start_x), Some(end_x)) = (self.paren_trail.start_x, self.paren_trail.end_x) else {
            return;
        };
        if start_x == end_x || Some(self.line_no as usize) != self.paren_trail.line_no {
            return;
        }

        let line = self.output.line(self.line_no as usize);
        let mut new_trail = String::new();
        let mut space_count = 0;
        for &ch in &line[start_x..end_x] {
            if is_close_paren(ch) {
                new_trail.push(ch);
            } else {
                space_count += 1;
            }
        }

        if space_count > 0 {
            self.replace_within_line(self.line_no as usize, start_x, end_x, &new_trail);
            self.paren_trail.end_x = Some(end_x - space_count);
        }
    }

    /// PAREN MODE: migrate a cursor-held close-paren to the end of the
    /// trail (spec §4.4 `appendParenTrail`).
    pub(crate) fn append_paren_trail(&mut self) {
        let opener = self.paren_stack.pop().expect("appendParenTrail only runs when a matching opener exists");
        let close_ch = opener.closer_ch();
        let line_no = self.paren_trail.line_no.expect("paren trail active when appendParenTrail runs");
        let end_x = self.paren_trail.end_x.expect("paren trail active when appendParenTrail runs");

        if self.return_parens {
            if let (Some(arena), Some(idx)) = (self.paren_arena.as_mut(), opener.arena_index) {
                arena.set_closer(idx, Closer { line_no, x: end_x, ch: close_ch, trail: None });
            }
        }

        self.set_max_indent(Some(&opener));
        self.insert_within_line(line_no, end_x, &close_ch.to_string());

        self.paren_trail.end_x = Some(end_x + 1);
        self.paren_trail.openers.push(opener);
        self.update_remembered_paren_trail();
    }

    pub(crate) fn invalidate_paren_trail(&mut self) {
        self.paren_trail = ParenTrail::new();
    }

    pub(crate) fn set_max_indent(&mut self, opener: Option<&Opener>) {
        let Some(opener) = opener else { return };
        if let Some(parent) = self.paren_stack.last_mut() {
            parent.max_child_indent = Some(opener.x);
        } else {
            self.max_indent = Some(opener.x);
        }
    }

    pub(crate) fn remember_paren_trail(&mut self) {
        let mut openers = self.paren_trail.clamped.openers.clone();
        openers.extend(self.paren_trail.openers.iter().cloned());
        if openers.is_empty() {
            return;
        }

        let is_clamped = self.paren_trail.clamped.start_x.is_some();
        let all_clamped = self.paren_trail.openers.is_empty();
        let record = crate::options::ParenTrailRecord {
            line_no: self.paren_trail.line_no.expect("non-empty trail has a line_no"),
            start_x: if is_clamped {
                self.paren_trail.clamped.start_x.expect("is_clamped implies Some")
            } else {
                self.paren_trail.start_x.expect("non-empty trail has a start_x")
            },
            end_x: if all_clamped {
                self.paren_trail.clamped.end_x.expect("all_clamped implies a clamped end_x")
            } else {
                self.paren_trail.end_x.expect("non-empty trail has an end_x")
            },
        };

        let trail_index = self.paren_trails.len();
        self.paren_trails.push(record);

        if self.return_parens {
            if let Some(arena) = self.paren_arena.as_mut() {
                for opener in &openers {
                    if let Some(idx) = opener.arena_index {
                        arena.set_trail(idx, trail_index);
                    }
                }
            }
        }
    }

    pub(crate) fn update_remembered_paren_trail(&mut self) {
        let matches_last = self
            .paren_trails
            .last()
            .is_some_and(|t| Some(t.line_no) == self.paren_trail.line_no);

        if !matches_last {
            self.remember_paren_trail();
            return;
        }

        let end_x = self.paren_trail.end_x.expect("update only runs on an active trail");
        if let Some(last) = self.paren_trails.last_mut() {
            last.end_x = end_x;
        }
        if self.return_parens {
            let trail_index = self.paren_trails.len() - 1;
            if let (Some(opener), Some(arena)) = (self.paren_trail.openers.last(), self.paren_arena.as_mut()) {
                if let Some(idx) = opener.arena_index {
                    arena.set_trail(idx, trail_index);
                }
            }
        }
    }

    /// Finalizes the current line's paren trail once it is known no more
    /// characters on this line can extend it (spec §4.7 `finishNewParenTrail`).
    pub(crate) fn finish_new_paren_trail(&mut self) {
        if self.lex.is_in_str {
            self.invalidate_paren_trail();
            return;
        }
        match self.mode {
            Mode::Indent => {
                self.clamp_paren_trail_to_cursor();
                self.pop_paren_trail();
            }
            Mode::Paren => {
                let outermost = self.paren_trail.openers.last().cloned();
                self.set_max_indent(outermost.as_ref());
                if Some(self.line_no as usize) != self.cursor.cursor_line {
                    self.clean_paren_trail();
                }
                self.remember_paren_trail();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_of_is_inclusive_at_boundary() {
        assert!(is_cursor_left_of(Some(3), Some(0), Some(3), 0));
        assert!(!is_cursor_left_of(Some(4), Some(0), Some(3), 0));
        assert!(!is_cursor_left_of(Some(3), Some(1), Some(3), 0));
    }

    #[test]
    fn right_of_is_strict() {
        assert!(is_cursor_right_of(Some(4), Some(0), Some(3), 0));
        assert!(!is_cursor_right_of(Some(3), Some(0), Some(3), 0));
    }
}
