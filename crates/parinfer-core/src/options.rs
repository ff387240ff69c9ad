//! Public request/response types (spec §3 "Result", §6 "External Interfaces").
//!
//! The reference threads one open dictionary through the whole algorithm
//! (spec §9, "Dynamic option/result shape"). Here that becomes a fixed
//! struct with optional fields; `UINT_NULL` sentinels become `Option<usize>`.

use std::collections::HashMap;

use crate::error::ParinferError;
use crate::paren::ParenTree;

/// A single prior edit, as supplied by an editor integration (spec §3
/// "Change"). `old_text`/`new_text` may themselves span multiple lines;
/// `ChangeMap::build` splits them the way `transformChange` does before
/// indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Change {
    pub x: usize,
    pub line_no: usize,
    pub old_text: String,
    pub new_text: String,
}

/// Splits on `\r?\n` exactly like the reference's `LINE_ENDING_REGEX`, so a
/// multi-line edit's last segment length is computed consistently with the
/// rest of the engine's own line splitting.
fn split_on_line_endings(text: &str) -> Vec<&str> {
    crate::processor::split_lines(text)
}

impl Change {
    /// New-end coordinates and the x-delta this edit applies at that point,
    /// ported from `transformChange` (examples/original_source/parinfer.py:60-99).
    /// `old_text`/`new_text` split on line endings; when an edit spans
    /// multiple lines, the end coordinates land on the *last* segment, not
    /// the edit's start line — `oldEndX`/`newEndX` only fold in `change.x`
    /// when that text is single-line.
    fn transformed(&self) -> (usize, usize, isize) {
        let old_lines = split_on_line_endings(&self.old_text);
        let new_lines = split_on_line_endings(&self.new_text);

        let last_old_line_len = old_lines.last().map_or(0, |s| s.chars().count());
        let last_new_line_len = new_lines.last().map_or(0, |s| s.chars().count());

        let old_end_x = (if old_lines.len() == 1 { self.x } else { 0 }) + last_old_line_len;
        let new_end_x = (if new_lines.len() == 1 { self.x } else { 0 }) + last_new_line_len;
        let new_end_line_no = self.line_no + (new_lines.len() - 1);

        (new_end_line_no, new_end_x, new_end_x as isize - old_end_x as isize)
    }
}

/// `{newEndLineNo -> {newEndX -> delta}}`, the transformed lookup
/// `handleChangeDelta` reads from (spec §4.5), keyed by each edit's *new*
/// end coordinates rather than its start — matching `transformChanges`,
/// since a multi-line edit's end can land on a different line than where it
/// started. Built once from the flat `changes` list.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChangeMap {
    by_line: HashMap<usize, HashMap<usize, isize>>,
}

impl ChangeMap {
    pub(crate) fn build(changes: &[Change]) -> Self {
        let mut by_line: HashMap<usize, HashMap<usize, isize>> = HashMap::new();
        for change in changes {
            let (new_end_line_no, new_end_x, delta) = change.transformed();
            by_line.entry(new_end_line_no).or_default().insert(new_end_x, delta);
        }
        ChangeMap { by_line }
    }

    pub(crate) fn delta_at(&self, line_no: usize, x: usize) -> Option<isize> {
        self.by_line.get(&line_no).and_then(|row| row.get(&x)).copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

/// Per-call engine options (spec §6 input table). All fields are optional;
/// the engine is a pure function of `(text, Options)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    pub cursor_x: Option<usize>,
    pub cursor_line: Option<usize>,
    pub prev_cursor_x: Option<usize>,
    pub prev_cursor_line: Option<usize>,
    pub selection_start_line: Option<usize>,
    pub changes: Vec<Change>,
    pub partial_result: bool,
    pub force_balance: bool,
    pub return_parens: bool,
}

/// Operating mode (spec §3 "mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Indent,
    Paren,
}

/// A `{ch, x, lineNo, argX?}` tab-stop entry for editor integrations (spec
/// §4.5 `makeTabStop`, §6 output table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabStop {
    pub ch: char,
    pub x: usize,
    pub line_no: usize,
    pub arg_x: Option<usize>,
}

/// A finalised paren trail's extent (spec §6 output table, `parenTrails`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParenTrailRecord {
    pub line_no: usize,
    pub start_x: usize,
    pub end_x: usize,
}

/// The engine's public return value (spec §6 output table).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Output {
    pub text: String,
    pub success: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub cursor_x: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub cursor_line: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<ParinferError>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub tab_stops: Vec<TabStop>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub paren_trails: Vec<ParenTrailRecord>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub parens: Option<ParenTree>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_change_keys_by_its_own_line() {
        let changes = vec![Change { x: 9, line_no: 0, old_text: String::new(), new_text: " []".into() }];
        let map = ChangeMap::build(&changes);
        assert_eq!(map.delta_at(0, 12), Some(3));
    }

    #[test]
    fn multi_line_change_keys_by_the_new_end_line_not_the_start_line() {
        // (defn foo
        //    "docstring."
        //   |[])
        // inserting a docstring line pushes the edit's end onto line_no + 1.
        let changes = vec![Change {
            x: 9,
            line_no: 0,
            old_text: String::new(),
            new_text: "\n  \"docstring.\"".into(),
        }];
        let map = ChangeMap::build(&changes);
        assert_eq!(map.delta_at(0, 9), None);
        assert_eq!(map.delta_at(1, 15), Some(6));
    }
}
