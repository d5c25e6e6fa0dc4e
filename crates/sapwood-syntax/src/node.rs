//! Borrowed node handles.
//!
//! The arena stores the parser's raw structure: hidden rules, repetition
//! helpers, extras. A [`Node`] only ever shows the visible part. Children of
//! hidden nodes are spliced into the nearest visible ancestor, and a field
//! on a hidden node labels every visible node spliced out of it unless that
//! node carries a field of its own.

use std::fmt;
use std::ops::Range;
use std::str::Utf8Error;
use std::sync::Arc;

use sapwood_core::{FieldId, Grammar, Point, SourceBuffer, SymbolId};

use crate::arena::{NO_PRODUCTION, NodeData, NodeRef};
use crate::cursor::{PreOrder, TreeCursor};
use crate::tree::TreeInner;

/// A visible node of a [`SyntaxTree`](crate::SyntaxTree).
///
/// Handles are small and `Copy`; they borrow the tree and stay valid for as
/// long as it does.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t TreeInner,
    id: NodeRef,
    /// Offset where the node's padding begins.
    start: usize,
    alias: Option<SymbolId>,
    field: Option<FieldId>,
}

impl<'t> Node<'t> {
    pub(crate) fn root(tree: &'t TreeInner) -> Self {
        Self {
            tree,
            id: tree.root,
            start: 0,
            alias: None,
            field: None,
        }
    }

    #[inline]
    fn data(&self) -> &'t NodeData {
        self.tree.arena.get(self.id)
    }

    #[inline]
    fn grammar(&self) -> &'t Grammar {
        &self.tree.grammar
    }

    /// Stable identity of the node within its tree.
    pub fn id(&self) -> usize {
        ((self.id.segment as usize) << 32) | self.id.index as usize
    }

    /// Kind as displayed: the alias when the node was renamed.
    pub fn kind_id(&self) -> SymbolId {
        self.alias.unwrap_or(self.data().symbol)
    }

    /// Kind the parser produced, ignoring aliases.
    pub fn grammar_id(&self) -> SymbolId {
        self.data().symbol
    }

    pub fn kind(&self) -> &'t str {
        self.grammar().symbol_name(self.kind_id())
    }

    pub fn is_named(&self) -> bool {
        self.grammar().is_named(self.kind_id())
    }

    pub fn is_error(&self) -> bool {
        self.data().symbol == Grammar::ERROR
    }

    /// Whether this node or any descendant is an error.
    pub fn has_error(&self) -> bool {
        self.data().has_error()
    }

    pub fn is_extra(&self) -> bool {
        self.data().is_extra()
    }

    pub fn start_byte(&self) -> usize {
        self.start + self.data().padding as usize
    }

    pub fn end_byte(&self) -> usize {
        self.start + self.data().total()
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte()..self.end_byte()
    }

    pub fn start_position(&self) -> Point {
        self.tree.source.point_at(self.start_byte())
    }

    pub fn end_position(&self) -> Point {
        self.tree.source.point_at(self.end_byte())
    }

    /// Field labelling this node in its parent.
    pub fn field_id(&self) -> Option<FieldId> {
        self.field
    }

    pub fn field_name(&self) -> Option<&'t str> {
        self.field.map(|f| self.grammar().field_name(f))
    }

    pub fn text(&self) -> &'t [u8] {
        self.tree.source.slice(self.byte_range())
    }

    pub fn utf8_text(&self) -> Result<&'t str, Utf8Error> {
        self.tree.source.text(self.byte_range())
    }

    pub fn source(&self) -> &'t SourceBuffer {
        &self.tree.source
    }

    pub fn language(&self) -> &'t Arc<Grammar> {
        &self.tree.grammar
    }

    /// Named children in document order.
    pub fn children(&self) -> Children<'t> {
        self.children_filtered(false)
    }

    /// All visible children, anonymous tokens included.
    pub fn all_children(&self) -> Children<'t> {
        self.children_filtered(true)
    }

    pub fn children_filtered(&self, include_anonymous: bool) -> Children<'t> {
        Children {
            inner: ChildIter::new(self),
            include_anonymous,
        }
    }

    pub fn child_count(&self) -> usize {
        self.all_children().count()
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.all_children().nth(index)
    }

    pub fn named_child_count(&self) -> usize {
        self.children().count()
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'t>> {
        self.children().nth(index)
    }

    /// First child labelled `name`, in document order.
    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'t>> {
        self.child_by_field_id(self.grammar().field_id(name)?)
    }

    pub fn child_by_field_id(&self, field: FieldId) -> Option<Node<'t>> {
        self.all_children().find(|c| c.field == Some(field))
    }

    pub fn children_by_field_name(
        &self,
        name: &str,
    ) -> impl Iterator<Item = Node<'t>> + use<'t> {
        let field = self.grammar().field_id(name);
        self.all_children()
            .filter(move |c| field.is_some() && c.field == field)
    }

    /// Field of the child at `index` among all visible children.
    pub fn field_name_for_child(&self, index: usize) -> Option<&'t str> {
        self.child(index)?.field_name()
    }

    /// Parent node, found by descending from the root.
    pub fn parent(&self) -> Option<Node<'t>> {
        let root = Node::root(self.tree);
        if self.id == root.id {
            return None;
        }
        let mut pending = vec![root];
        while let Some(candidate) = pending.pop() {
            let mut containing = Vec::new();
            for child in candidate.all_children() {
                if child == *self {
                    return Some(candidate);
                }
                if child.encloses(self) {
                    containing.push(child);
                }
            }
            pending.extend(containing.into_iter().rev());
        }
        None
    }

    fn encloses(&self, other: &Node<'_>) -> bool {
        !self.data().is_leaf()
            && self.start <= other.start
            && other.end_byte() <= self.end_byte()
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let mut siblings = parent.all_children();
        siblings.find(|c| c == self)?;
        siblings.next()
    }

    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let mut previous = None;
        for child in parent.all_children() {
            if child == *self {
                return previous;
            }
            previous = Some(child);
        }
        None
    }

    pub fn next_named_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let mut siblings = parent.children();
        siblings.find(|c| c == self)?;
        siblings.next()
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let mut previous = None;
        for child in parent.children() {
            if child == *self {
                return previous;
            }
            previous = Some(child);
        }
        None
    }

    pub fn cursor(&self) -> TreeCursor<'t> {
        TreeCursor::new(*self)
    }

    /// Pre-order traversal of this subtree, anonymous nodes included.
    pub fn walk(&self) -> PreOrder<'t> {
        PreOrder::new(*self, true)
    }

    /// Pre-order traversal of the named nodes of this subtree.
    pub fn walk_named(&self) -> PreOrder<'t> {
        PreOrder::new(*self, false)
    }

    /// Named structure as an s-expression, with field labels.
    pub fn to_sexp(&self) -> String {
        let mut out = format!("({}", self.kind());
        let mut open = vec![self.children()];
        while let Some(children) = open.last_mut() {
            let Some(child) = children.next() else {
                out.push(')');
                open.pop();
                continue;
            };
            out.push(' ');
            if let Some(field) = child.field_name() {
                out.push_str(field);
                out.push_str(": ");
            }
            out.push('(');
            out.push_str(child.kind());
            open.push(child.children());
        }
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id && self.start == other.start
    }
}

impl Eq for Node<'_> {}

impl std::hash::Hash for Node<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.start.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}..{}]", self.kind(), self.start_byte(), self.end_byte())
    }
}

#[derive(Debug, Clone)]
struct Frame {
    node: NodeRef,
    production: u16,
    next: usize,
    /// Index among non-extra children; fields and aliases are keyed by it.
    structural: u16,
    offset: usize,
    inherited: Option<FieldId>,
}

/// Visible children of a node, hidden wrappers flattened.
#[derive(Clone)]
pub(crate) struct ChildIter<'t> {
    tree: &'t TreeInner,
    frames: Vec<Frame>,
}

impl<'t> ChildIter<'t> {
    pub(crate) fn new(parent: &Node<'t>) -> Self {
        let data = parent.data();
        Self {
            tree: parent.tree,
            frames: vec![Frame {
                node: parent.id,
                production: data.production,
                next: 0,
                structural: 0,
                offset: parent.start,
                inherited: None,
            }],
        }
    }
}

impl<'t> Iterator for ChildIter<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        let arena = &self.tree.arena;
        let grammar = &self.tree.grammar;
        loop {
            let frame = self.frames.last_mut()?;
            let Some(&child) = arena.children(frame.node).get(frame.next) else {
                self.frames.pop();
                continue;
            };
            frame.next += 1;
            let data = arena.get(child);
            let start = frame.offset;
            frame.offset += data.total();

            let (own_field, alias) = if data.is_extra() || frame.production == NO_PRODUCTION {
                (None, None)
            } else {
                let index = frame.structural;
                frame.structural += 1;
                let production = grammar.production(frame.production);
                (
                    lookup(&production.fields, index),
                    lookup(&production.aliases, index),
                )
            };
            let field = own_field.or(frame.inherited);

            let visible = match alias {
                Some(alias) => grammar.is_visible(alias),
                None => grammar.is_visible(data.symbol),
            };
            if visible {
                return Some(Node {
                    tree: self.tree,
                    id: child,
                    start,
                    alias,
                    field,
                });
            }
            self.frames.push(Frame {
                node: child,
                production: data.production,
                next: 0,
                structural: 0,
                offset: start,
                inherited: field,
            });
        }
    }
}

fn lookup<T: Copy>(map: &[(u16, T)], index: u16) -> Option<T> {
    map.binary_search_by_key(&index, |(i, _)| *i)
        .ok()
        .map(|i| map[i].1)
}

/// Iterator returned by [`Node::children`] and friends.
#[derive(Clone)]
pub struct Children<'t> {
    inner: ChildIter<'t>,
    include_anonymous: bool,
}

impl<'t> Iterator for Children<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.include_anonymous {
            return self.inner.next();
        }
        self.inner.by_ref().find(Node::is_named)
    }
}
