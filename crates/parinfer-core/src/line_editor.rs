//! In-place edits on the mutable output lines, with cursor-shift bookkeeping
//! (C1, spec §4.1).

/// Cursor coordinates tracked across the edit, kept together since every
/// edit needs to consult and possibly update both in lockstep.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CursorState {
    pub cursor_x: Option<usize>,
    pub cursor_line: Option<usize>,
    pub prev_cursor_x: Option<usize>,
    pub prev_cursor_line: Option<usize>,
    pub orig_cursor_x: Option<usize>,
    pub orig_cursor_line: Option<usize>,
    pub selection_start_line: Option<usize>,
}

/// True when an edit spanning `[start, end)` on the cursor's line should
/// shift the cursor (spec §4.1: "a zero-width edit at `cursorX==start==end`
/// shifts only when `cursorX == 0`").
fn is_cursor_affected(cursor_x: usize, start: usize, end: usize) -> bool {
    if cursor_x == start && cursor_x == end {
        cursor_x == 0
    } else {
        cursor_x >= end
    }
}

/// The mutable output buffer: one `Vec<char>` per line so in-range splices
/// are cheap and `line[i]` lookups (e.g. `isCloseParen`) stay O(1).
#[derive(Debug, Clone, Default)]
pub(crate) struct LineEditor {
    lines: Vec<Vec<char>>,
}

impl LineEditor {
    pub(crate) fn push_line(&mut self, line: &str) {
        self.lines.push(line.chars().collect());
    }

    pub(crate) fn line(&self, line_no: usize) -> &[char] {
        &self.lines[line_no]
    }

    pub(crate) fn char_at(&self, line_no: usize, x: usize) -> Option<char> {
        self.lines.get(line_no).and_then(|l| l.get(x)).copied()
    }

    /// Replace `lines[line_no][start..end]` with `replacement`, then shift
    /// the cursor to track the edit (spec §4.1 `replaceWithinLine`).
    pub(crate) fn replace_within_line(
        &mut self,
        cursor: &mut CursorState,
        line_no: usize,
        start: usize,
        end: usize,
        replacement: &str,
    ) {
        let line = &mut self.lines[line_no];
        let replacement_chars: Vec<char> = replacement.chars().collect();
        line.splice(start..end, replacement_chars.iter().copied());
        self.shift_cursor_on_edit(cursor, line_no, start, end, replacement_chars.len());
    }

    pub(crate) fn insert_within_line(
        &mut self,
        cursor: &mut CursorState,
        line_no: usize,
        idx: usize,
        insert: &str,
    ) {
        self.replace_within_line(cursor, line_no, idx, idx, insert);
    }

    fn shift_cursor_on_edit(
        &self,
        cursor: &mut CursorState,
        line_no: usize,
        start: usize,
        end: usize,
        new_len: usize,
    ) {
        let dx = new_len as isize - (end - start) as isize;
        if dx == 0 {
            return;
        }
        if cursor.cursor_line != Some(line_no) {
            return;
        }
        let Some(cursor_x) = cursor.cursor_x else {
            return;
        };
        if is_cursor_affected(cursor_x, start, end) {
            cursor.cursor_x = Some((cursor_x as isize + dx) as usize);
        }
    }

    pub(crate) fn into_lines(self) -> Vec<Vec<char>> {
        self.lines
    }

    pub(crate) fn join(&self, line_ending: &str) -> String {
        self.lines
            .iter()
            .map(|l| l.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(line_ending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_shifts_cursor_past_edit() {
        let mut editor = LineEditor::default();
        editor.push_line("(foo bar)");
        let mut cursor = CursorState {
            cursor_x: Some(9),
            cursor_line: Some(0),
            ..Default::default()
        };
        editor.replace_within_line(&mut cursor, 0, 8, 9, "");
        assert_eq!(cursor.cursor_x, Some(8));
        assert_eq!(editor.line(0), &['(', 'f', 'o', 'o', ' ', 'b', 'a', 'r']);
    }

    #[test]
    fn zero_width_insert_before_cursor_is_unaffected() {
        let mut editor = LineEditor::default();
        editor.push_line("foo");
        let mut cursor = CursorState {
            cursor_x: Some(1),
            cursor_line: Some(0),
            ..Default::default()
        };
        editor.insert_within_line(&mut cursor, 0, 1, "X");
        // cursorX(1) == start(1) == end(1), and cursorX != 0, so unaffected.
        assert_eq!(cursor.cursor_x, Some(1));
    }
}
