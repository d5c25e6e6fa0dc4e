//! Node type checks.

use sapwood_core::{Grammar, SymbolId};

/// What a node's kind must be for a step to accept it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NodeTest {
    /// `_`: any node, named or anonymous.
    Any,
    /// `(_)`: any named node.
    Named,
    /// A specific kind. `id` is canonical (see [`Grammar::canonical_kind`]),
    /// so aliases displayed the same way are one kind.
    Kind { id: SymbolId, named: bool },
}

impl NodeTest {
    pub fn kind(id: SymbolId, named: bool) -> Self {
        Self::Kind { id, named }
    }

    /// `(ERROR)`.
    pub fn error() -> Self {
        Self::Kind {
            id: Grammar::ERROR,
            named: true,
        }
    }

    /// Check a node given its canonical kind and namedness.
    #[inline]
    pub fn accepts(&self, kind: SymbolId, named: bool) -> bool {
        match *self {
            Self::Any => true,
            Self::Named => named,
            Self::Kind { id, named: want } => id == kind && want == named,
        }
    }

    pub fn display(&self, grammar: &Grammar) -> String {
        match *self {
            Self::Any => "_".to_owned(),
            Self::Named => "(_)".to_owned(),
            Self::Kind { id, named: true } => format!("({})", grammar.symbol_name(id)),
            Self::Kind { id, named: false } => format!("{:?}", grammar.symbol_name(id)),
        }
    }
}
