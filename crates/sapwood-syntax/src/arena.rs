//! Segmented node storage.
//!
//! Every parse appends one [`Segment`]. A tree produced by an incremental
//! parse keeps the segments of the tree it was derived from, so reused
//! subtrees are shared by reference instead of copied. Node positions are
//! relative (padding plus size), which is what lets a subtree sit at a
//! different offset in the new tree without being touched.

use std::sync::Arc;

use sapwood_core::{StateId, SymbolId};

/// Address of a node inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeRef {
    pub segment: u32,
    pub index: u32,
}

pub(crate) mod flags {
    pub const EXTRA: u8 = 1 << 0;
    pub const HAS_ERROR: u8 = 1 << 1;
    /// Produced by the lexer.
    pub const LEAF: u8 = 1 << 2;
}

/// Marks nodes that no reduction produced.
pub(crate) const NO_PRODUCTION: u16 = u16::MAX;

/// Parse state recorded on nodes that must never be reused.
pub(crate) const NO_STATE: StateId = StateId::MAX;

#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeData {
    pub symbol: SymbolId,
    pub production: u16,
    pub flags: u8,
    /// Bytes of skipped whitespace in front of the node.
    pub padding: u32,
    pub size: u32,
    /// Bytes past the end that influenced how this node was built.
    pub lookahead: u32,
    /// State on top of the stack when the node was pushed.
    pub parse_state: StateId,
    /// Lex mode of the node's first token.
    pub lex_mode: u16,
    /// Lex mode the token after this node was lexed in.
    pub next_lex_mode: u16,
    pub scanner_before: u32,
    pub scanner_after: u32,
    pub children_start: u32,
    pub children_len: u32,
}

impl NodeData {
    #[inline]
    pub fn total(&self) -> usize {
        self.padding as usize + self.size as usize
    }

    #[inline]
    pub fn is_extra(&self) -> bool {
        self.flags & flags::EXTRA != 0
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.flags & flags::HAS_ERROR != 0
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.flags & flags::LEAF != 0
    }
}

/// Nodes, child edges and scanner states written by one parse.
#[derive(Debug, Default)]
pub(crate) struct Segment {
    nodes: Vec<NodeData>,
    edges: Vec<NodeRef>,
    scanner_states: Vec<Arc<[u8]>>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Append-only view of a tree's segments.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    segments: Vec<Arc<Segment>>,
}

impl Arena {
    #[inline]
    pub fn get(&self, node: NodeRef) -> &NodeData {
        &self.segments[node.segment as usize].nodes[node.index as usize]
    }

    pub fn children(&self, node: NodeRef) -> &[NodeRef] {
        let segment = &self.segments[node.segment as usize];
        let data = &segment.nodes[node.index as usize];
        let start = data.children_start as usize;
        &segment.edges[start..start + data.children_len as usize]
    }

    pub fn scanner_before(&self, node: NodeRef) -> &Arc<[u8]> {
        let segment = &self.segments[node.segment as usize];
        &segment.scanner_states[segment.nodes[node.index as usize].scanner_before as usize]
    }

    pub fn scanner_after(&self, node: NodeRef) -> &Arc<[u8]> {
        let segment = &self.segments[node.segment as usize];
        &segment.scanner_states[segment.nodes[node.index as usize].scanner_after as usize]
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn node_capacity(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// Number of segments both arenas hold by reference.
    pub fn shared_with(&self, other: &Arena) -> usize {
        self.segments
            .iter()
            .filter(|s| other.segments.iter().any(|o| Arc::ptr_eq(s, o)))
            .count()
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(Arc::new(segment));
    }

    /// First token of the subtree, or `None` when the subtree has no tokens.
    pub fn first_leaf(&self, mut node: NodeRef) -> Option<NodeRef> {
        loop {
            if self.get(node).is_leaf() {
                return Some(node);
            }
            node = *self.children(node).first()?;
        }
    }
}

/// Writer for the segment a parse is producing.
///
/// Nodes are addressed with the segment index the builder will occupy once
/// pushed onto the arena.
#[derive(Debug)]
pub(crate) struct SegmentBuilder {
    id: u32,
    segment: Segment,
}

impl SegmentBuilder {
    pub fn new(id: usize) -> Self {
        let mut segment = Segment::default();
        segment.scanner_states.push(Arc::from(&[][..]));
        Self {
            id: id as u32,
            segment,
        }
    }

    /// Intern a scanner state. Consecutive tokens usually share one.
    pub fn intern_state(&mut self, state: &Arc<[u8]>) -> u32 {
        let states = &mut self.segment.scanner_states;
        if let Some(i) = states.iter().rev().take(4).position(|s| s == state) {
            return (states.len() - 1 - i) as u32;
        }
        states.push(state.clone());
        (states.len() - 1) as u32
    }

    pub fn push(&mut self, mut data: NodeData, children: &[NodeRef]) -> NodeRef {
        data.children_start = self.segment.edges.len() as u32;
        data.children_len = children.len() as u32;
        self.segment.edges.extend_from_slice(children);
        self.segment.nodes.push(data);
        NodeRef {
            segment: self.id,
            index: (self.segment.nodes.len() - 1) as u32,
        }
    }

    /// Node written earlier in this segment.
    pub fn get(&self, node: NodeRef) -> Option<&NodeData> {
        (node.segment == self.id).then(|| &self.segment.nodes[node.index as usize])
    }

    pub fn state(&self, index: u32) -> &Arc<[u8]> {
        &self.segment.scanner_states[index as usize]
    }

    pub fn children(&self, node: NodeRef) -> Option<&[NodeRef]> {
        let data = self.get(node)?;
        let start = data.children_start as usize;
        Some(&self.segment.edges[start..start + data.children_len as usize])
    }

    pub fn finish(self) -> Segment {
        self.segment
    }
}

/// Copy everything reachable from `root` into a single fresh segment.
///
/// Runs iteratively: left-recursive repetitions make hidden chains as deep
/// as the list is long.
pub(crate) fn compact(arena: &Arena, root: NodeRef) -> (Arena, NodeRef) {
    let mut builder = SegmentBuilder::new(0);
    let mut pending = vec![(root, false)];
    let mut done: Vec<NodeRef> = Vec::new();

    while let Some((node, expanded)) = pending.pop() {
        let children = arena.children(node);
        if !expanded {
            pending.push((node, true));
            pending.extend(children.iter().rev().map(|&c| (c, false)));
            continue;
        }
        let copied = done.split_off(done.len() - children.len());
        let mut data = *arena.get(node);
        data.scanner_before = builder.intern_state(arena.scanner_before(node));
        data.scanner_after = builder.intern_state(arena.scanner_after(node));
        done.push(builder.push(data, &copied));
    }

    let mut compacted = Arena::default();
    compacted.push_segment(builder.finish());
    let root = done.pop().unwrap_or(NodeRef {
        segment: 0,
        index: 0,
    });
    (compacted, root)
}
