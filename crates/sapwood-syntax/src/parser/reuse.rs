//! Subtree reuse for incremental parsing.
//!
//! [`ReuseCursor`] walks the previous tree in step with the new parse. At
//! every position the parse reaches, the outermost old subtree starting
//! there is offered first, then its first child, and so on down. A subtree
//! is taken when nothing it depends on can have changed:
//!
//! - it has no errors and covers at least one byte,
//! - every byte its construction examined (including the token that
//!   triggered its last reduction) lies before the edit, or the subtree
//!   starts after the edit,
//! - the parse is in the state the subtree was originally pushed from, with
//!   the same external scanner state and lex mode for its first token.

use tracing::trace;

use super::driver::{Run, StackEntry};
use crate::arena::{Arena, NodeData, NodeRef};
use crate::edit::InputEdit;
use crate::tree::TreeInner;

#[derive(Debug, Clone, Copy)]
struct Entry {
    node: NodeRef,
    /// Old offset where the node's padding begins.
    start: usize,
    /// Position among the parent's children.
    index: usize,
}

pub(crate) struct ReuseCursor<'a> {
    tree: &'a TreeInner,
    edit: InputEdit,
    stack: Vec<Entry>,
}

impl<'a> ReuseCursor<'a> {
    pub fn new(tree: &'a TreeInner, edit: InputEdit) -> Self {
        Self {
            tree,
            edit,
            stack: vec![Entry {
                node: tree.root,
                start: 0,
                index: 0,
            }],
        }
    }

    pub fn arena(&self) -> &'a Arena {
        &self.tree.arena
    }

    fn end(&self, entry: &Entry) -> usize {
        entry.start + self.tree.arena.get(entry.node).total()
    }

    /// Move to the first old node that starts at or after `target`.
    fn seek(&mut self, target: usize) {
        while let Some(top) = self.stack.last().copied() {
            if top.start >= target {
                return;
            }
            if self.end(&top) <= target || !self.descend() {
                self.advance();
            }
        }
    }

    fn descend(&mut self) -> bool {
        let Some(top) = self.stack.last().copied() else {
            return false;
        };
        let Some(&first) = self.tree.arena.children(top.node).first() else {
            return false;
        };
        self.stack.push(Entry {
            node: first,
            start: top.start,
            index: 0,
        });
        true
    }

    /// Step past the current node, climbing as long as it was a last child.
    fn advance(&mut self) {
        while let Some(entry) = self.stack.pop() {
            let end = self.end(&entry);
            let Some(parent) = self.stack.last() else {
                return;
            };
            if let Some(&next) = self.tree.arena.children(parent.node).get(entry.index + 1) {
                self.stack.push(Entry {
                    node: next,
                    start: end,
                    index: entry.index + 1,
                });
                return;
            }
        }
    }

    /// Whether the bytes the node depends on survived the edit unchanged.
    fn unchanged(&self, data: &NodeData, start: usize) -> bool {
        let end = start + data.total();
        let before = end + data.lookahead as usize <= self.edit.start_byte;
        let after = start >= self.edit.old_end_byte;
        (before || after) && !data.has_error() && data.total() > 0 && !data.is_leaf()
    }

    /// Outermost unchanged subtree starting at `position` of the new text
    /// that `accept` agrees to. The cursor itself stays on the outermost
    /// node so a later call at the same position sees every candidate again.
    pub fn find(
        &mut self,
        position: usize,
        mut accept: impl FnMut(NodeRef, &NodeData) -> bool,
    ) -> Option<NodeRef> {
        let old_position = self.edit.map_new(position)?;
        self.seek(old_position);
        let top = *self.stack.last()?;
        if top.start != old_position || self.edit.map_old(top.start) != Some(position) {
            return None;
        }
        let arena = &self.tree.arena;
        let mut node = top.node;
        loop {
            let data = arena.get(node);
            if self.unchanged(data, top.start) && accept(node, data) {
                return Some(node);
            }
            node = *arena.children(node).first()?;
        }
    }
}

impl Run<'_> {
    /// Old subtree that can stand in for parsing at the current position.
    pub(super) fn try_reuse(&mut self) -> Option<NodeRef> {
        if self.reuse.is_none() || self.no_external_at == Some(self.position) {
            return None;
        }
        let state = self.top_state();
        let mode = match &self.lookahead {
            Some(token) => token.lex_mode,
            None => self.current_lex_mode(),
        };
        let scanner = self.scanner.clone();
        let lookahead = self.lookahead.as_ref().map(|t| (t.symbol, t.padding, t.size));
        let position = self.position;
        let grammar = self.grammar;

        let reuse = self.reuse.as_mut()?;
        let arena = reuse.arena();
        reuse.find(position, |node, data| {
            if data.parse_state != state
                || data.lex_mode != mode
                || grammar.goto(state, data.symbol).is_none()
            {
                return false;
            }
            if **arena.scanner_before(node) != *scanner {
                return false;
            }
            match lookahead {
                None => true,
                Some((symbol, padding, size)) => arena.first_leaf(node).is_some_and(|leaf| {
                    let leaf = arena.get(leaf);
                    leaf.symbol == symbol
                        && leaf.padding as usize == padding
                        && leaf.size as usize == size
                }),
            }
        })
    }

    pub(super) fn push_reused(&mut self, node: NodeRef) {
        let data = *self.data(node);
        let state = self.top_state();
        let Some(next) = self.grammar.goto(state, data.symbol) else {
            return;
        };
        trace!(
            symbol = self.grammar.symbol_name(data.symbol),
            start = self.position,
            size = data.total(),
            "reuse"
        );
        self.stack.push(StackEntry {
            state: next,
            node: Some(node),
            start: self.position,
            extra: false,
        });
        self.position += data.total();
        self.scanner = self.arena.scanner_after(node).clone();
        self.lex_mode_override = Some(data.next_lex_mode);
        self.lookahead = None;
        self.reductions_since_shift = 0;
        self.stats.reused += 1;
    }
}
