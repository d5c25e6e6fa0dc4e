//! Stateful tree navigation.

use sapwood_core::FieldId;

use crate::node::{ChildIter, Node};

#[derive(Clone)]
struct Level<'t> {
    parent: Node<'t>,
    /// Positioned just after the current node.
    siblings: ChildIter<'t>,
}

/// Cursor over the visible nodes below a starting node.
///
/// Moving to a sibling is amortized constant time, which [`Node`]'s own
/// sibling accessors are not. Cloning snapshots the position.
#[derive(Clone)]
pub struct TreeCursor<'t> {
    current: Node<'t>,
    levels: Vec<Level<'t>>,
}

impl<'t> TreeCursor<'t> {
    pub fn new(node: Node<'t>) -> Self {
        Self {
            current: node,
            levels: Vec::new(),
        }
    }

    pub fn node(&self) -> Node<'t> {
        self.current
    }

    /// Field of the current node; `None` at the starting node.
    pub fn field_id(&self) -> Option<FieldId> {
        if self.levels.is_empty() {
            return None;
        }
        self.current.field_id()
    }

    pub fn field_name(&self) -> Option<&'t str> {
        if self.levels.is_empty() {
            return None;
        }
        self.current.field_name()
    }

    /// Distance from the starting node.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn goto_first_child(&mut self) -> bool {
        let mut siblings = ChildIter::new(&self.current);
        let Some(first) = siblings.next() else {
            return false;
        };
        self.levels.push(Level {
            parent: self.current,
            siblings,
        });
        self.current = first;
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let Some(level) = self.levels.last_mut() else {
            return false;
        };
        match level.siblings.next() {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        match self.levels.pop() {
            Some(level) => {
                self.current = level.parent;
                true
            }
            None => false,
        }
    }

    /// Restart from `node`, which becomes the new starting node.
    pub fn reset(&mut self, node: Node<'t>) {
        self.current = node;
        self.levels.clear();
    }
}

/// Lazy pre-order iterator over a subtree.
///
/// The starting node is always yielded first. Each call to
/// [`Node::walk`] begins a fresh traversal.
#[derive(Clone)]
pub struct PreOrder<'t> {
    cursor: TreeCursor<'t>,
    include_anonymous: bool,
    started: bool,
    done: bool,
}

impl<'t> PreOrder<'t> {
    pub(crate) fn new(node: Node<'t>, include_anonymous: bool) -> Self {
        Self {
            cursor: TreeCursor::new(node),
            include_anonymous,
            started: false,
            done: false,
        }
    }

    /// Depth of the node most recently yielded, relative to the start.
    pub fn depth(&self) -> usize {
        self.cursor.depth()
    }

    fn advance(&mut self) -> bool {
        if self.cursor.goto_first_child() {
            return true;
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return true;
            }
            if !self.cursor.goto_parent() {
                return false;
            }
        }
    }
}

impl<'t> Iterator for PreOrder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.cursor.node());
        }
        loop {
            if !self.advance() {
                self.done = true;
                return None;
            }
            let node = self.cursor.node();
            if self.include_anonymous || node.is_named() {
                return Some(node);
            }
        }
    }
}

impl std::iter::FusedIterator for PreOrder<'_> {}
