use std::fmt;
use std::sync::Arc;

use sapwood_core::{Grammar, SourceBuffer};

use crate::arena::{Arena, NodeRef};
use crate::cursor::TreeCursor;
use crate::node::Node;

pub(crate) struct TreeInner {
    pub grammar: Arc<Grammar>,
    pub source: SourceBuffer,
    pub arena: Arena,
    pub root: NodeRef,
}

/// Result of a parse. Cloning is cheap and shares every node.
#[derive(Clone)]
pub struct SyntaxTree {
    inner: Arc<TreeInner>,
}

impl SyntaxTree {
    pub(crate) fn new(
        grammar: Arc<Grammar>,
        source: SourceBuffer,
        arena: Arena,
        root: NodeRef,
    ) -> Self {
        Self {
            inner: Arc::new(TreeInner {
                grammar,
                source,
                arena,
                root,
            }),
        }
    }

    pub(crate) fn inner(&self) -> &TreeInner {
        &self.inner
    }

    pub fn root(&self) -> Node<'_> {
        Node::root(&self.inner)
    }

    pub fn source(&self) -> &SourceBuffer {
        &self.inner.source
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.inner.grammar
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        self.root().cursor()
    }

    /// Number of visible nodes, anonymous ones included.
    pub fn node_count(&self) -> usize {
        self.root().walk().count()
    }

    pub fn to_sexp(&self) -> String {
        self.root().to_sexp()
    }

    /// Arena segments backing this tree. Each incremental parse adds one
    /// until the tree is compacted.
    pub fn segment_count(&self) -> usize {
        self.inner.arena.segment_count()
    }

    /// Segments this tree shares with `other` by reference.
    pub fn shared_segments(&self, other: &SyntaxTree) -> usize {
        self.inner.arena.shared_with(&other.inner.arena)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("grammar", &self.inner.grammar.name())
            .field("len", &self.inner.source.len())
            .field("segments", &self.inner.arena.segment_count())
            .field("nodes", &self.inner.arena.node_capacity())
            .finish()
    }
}
