//! Paren matching table, opener records, and the paren stack (C4, spec §4.3).

/// Returns the closer for a given opener character, or `None` if `ch` is not
/// one of `( [ {`.
pub(crate) fn matching_closer(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

pub(crate) fn is_open_paren(ch: char) -> bool {
    matches!(ch, '(' | '[' | '{')
}

pub(crate) fn is_close_paren(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}')
}

/// True when `closer` is the exact match for `opener` (spec: `onCloseParen`
/// "matched" branch tests `PARENS[closer] == opener.ch`).
pub(crate) fn is_valid_close_paren(opener_ch: char, closer: char) -> bool {
    matching_closer(opener_ch) == Some(closer)
}

/// A record pushed on the paren stack when an open paren is seen in code
/// context (spec §3 "Opener").
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Opener {
    pub ch: char,
    pub line_no: usize,
    pub x: usize,
    pub input_line_no: usize,
    pub input_x: usize,
    /// Accumulated horizontal shift applied to descendants since this
    /// opener was emitted.
    pub indent_delta: isize,
    /// Upper bound for indentation of any direct child line; set when a
    /// matched close paren lands at the opener's own `x`.
    pub max_child_indent: Option<usize>,
    /// x of the first non-whitespace token after this opener, used for
    /// editor tab stops.
    pub arg_x: Option<usize>,
    /// Arena index into the `returnParens` tree, when enabled.
    pub arena_index: Option<usize>,
}

impl Opener {
    pub(crate) fn new(ch: char, line_no: usize, x: usize, input_line_no: usize, input_x: usize) -> Self {
        Opener {
            ch,
            line_no,
            x,
            input_line_no,
            input_x,
            indent_delta: 0,
            max_child_indent: None,
            arg_x: None,
            arena_index: None,
        }
    }

    pub(crate) fn closer_ch(&self) -> char {
        matching_closer(self.ch).expect("Opener.ch is always one of ( [ {")
    }
}

/// Position of a closer, recorded on its opener's arena node once matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Closer {
    pub line_no: usize,
    pub x: usize,
    pub ch: char,
    /// Index into the output's `paren_trails`, if this closer belongs to a
    /// finalised trail.
    pub trail: Option<usize>,
}

/// A node in the `returnParens` arena (spec §9 "Tree back-references").
/// Built only when `Options::return_parens` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParenNode {
    pub ch: char,
    pub line_no: usize,
    pub x: usize,
    pub input_line_no: usize,
    pub input_x: usize,
    pub children: Vec<usize>,
    pub closer: Option<Closer>,
}

/// The `returnParens` tree (spec §6 "Paren tree with closers"): an arena of
/// nodes plus the indices of its top-level (depth-0) openers, in order of
/// appearance. The reference's `result.parens` is exactly that root list,
/// each opener nesting its own children directly; here the nodes stay flat
/// in one `Vec` and `children`/`roots` hold indices into it instead, since a
/// literal parent-owns-child tree would need cyclic ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParenTree {
    pub nodes: Vec<ParenNode>,
    pub roots: Vec<usize>,
}

/// Arena of `ParenNode`s, indexed by handle rather than owned recursively,
/// to sidestep cyclic ownership (spec §9).
#[derive(Debug, Clone, Default)]
pub(crate) struct ParenArena {
    nodes: Vec<ParenNode>,
    /// Arena indices of top-level (depth-0) nodes, in order of appearance.
    roots: Vec<usize>,
}

impl ParenArena {
    pub(crate) fn push(
        &mut self,
        ch: char,
        line_no: usize,
        x: usize,
        input_line_no: usize,
        input_x: usize,
        parent: Option<usize>,
    ) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(ParenNode {
            ch,
            line_no,
            x,
            input_line_no,
            input_x,
            children: Vec::new(),
            closer: None,
        });
        match parent {
            Some(parent_idx) => self.nodes[parent_idx].children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    pub(crate) fn set_closer(&mut self, idx: usize, closer: Closer) {
        self.nodes[idx].closer = Some(closer);
    }

    /// Stamps the owning paren trail's index onto an already-matched
    /// closer, once that trail is finalized.
    pub(crate) fn set_trail(&mut self, idx: usize, trail_index: usize) {
        if let Some(closer) = self.nodes[idx].closer.as_mut() {
            closer.trail = Some(trail_index);
        }
    }

    /// Consumes the arena into its public `ParenTree`: the full flat node
    /// list plus the indices of its top-level roots, so a consumer can tell
    /// which nodes are top-level without walking every node's `children`.
    pub(crate) fn into_tree(self) -> ParenTree {
        ParenTree { nodes: self.nodes, roots: self.roots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_all_three_paren_kinds() {
        assert_eq!(matching_closer('('), Some(')'));
        assert_eq!(matching_closer('['), Some(']'));
        assert_eq!(matching_closer('{'), Some('}'));
        assert_eq!(matching_closer('a'), None);
    }

    #[test]
    fn valid_close_paren_requires_exact_match() {
        assert!(is_valid_close_paren('(', ')'));
        assert!(!is_valid_close_paren('(', ']'));
    }

    #[test]
    fn arena_tracks_roots_and_children() {
        let mut arena = ParenArena::default();
        let root = arena.push('(', 0, 0, 0, 0, None);
        let child = arena.push('[', 0, 1, 0, 1, Some(root));
        let tree = arena.into_tree();
        assert_eq!(tree.roots, vec![root]);
        assert_eq!(tree.nodes[root].children, vec![child]);
    }
}
