//! Typed AST wrappers over CST nodes.
//!
//! Casting only checks the node kind. Malformed shapes (a tree without a
//! kind, a capture without a name) surface as `None` from the accessors and
//! were already reported by the parser.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};
use super::lexer::unescape;

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn text_range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(Tree, Tree);
ast_node!(Str, Str);
ast_node!(Wildcard, Wildcard);
ast_node!(Group, Group);
ast_node!(Alt, Alt);
ast_node!(Field, Field);
ast_node!(NegatedField, NegatedField);
ast_node!(Capture, Capture);
ast_node!(Quantifier, Quantifier);
ast_node!(Anchor, Anchor);
ast_node!(Predicate, Predicate);
ast_node!(CaptureRef, CaptureRef);

/// Anything that can appear where a pattern term is expected. Predicates
/// are included because they may sit between terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Tree(Tree),
    Str(Str),
    Wildcard(Wildcard),
    Group(Group),
    Alt(Alt),
    Field(Field),
    NegatedField(NegatedField),
    Capture(Capture),
    Quantifier(Quantifier),
    Anchor(Anchor),
    Predicate(Predicate),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Tree => Tree::cast(node).map(Expr::Tree),
            SyntaxKind::Str => Str::cast(node).map(Expr::Str),
            SyntaxKind::Wildcard => Wildcard::cast(node).map(Expr::Wildcard),
            SyntaxKind::Group => Group::cast(node).map(Expr::Group),
            SyntaxKind::Alt => Alt::cast(node).map(Expr::Alt),
            SyntaxKind::Field => Field::cast(node).map(Expr::Field),
            SyntaxKind::NegatedField => NegatedField::cast(node).map(Expr::NegatedField),
            SyntaxKind::Capture => Capture::cast(node).map(Expr::Capture),
            SyntaxKind::Quantifier => Quantifier::cast(node).map(Expr::Quantifier),
            SyntaxKind::Anchor => Anchor::cast(node).map(Expr::Anchor),
            SyntaxKind::Predicate => Predicate::cast(node).map(Expr::Predicate),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Expr::Tree(n) => n.as_cst(),
            Expr::Str(n) => n.as_cst(),
            Expr::Wildcard(n) => n.as_cst(),
            Expr::Group(n) => n.as_cst(),
            Expr::Alt(n) => n.as_cst(),
            Expr::Field(n) => n.as_cst(),
            Expr::NegatedField(n) => n.as_cst(),
            Expr::Capture(n) => n.as_cst(),
            Expr::Quantifier(n) => n.as_cst(),
            Expr::Anchor(n) => n.as_cst(),
            Expr::Predicate(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        self.as_cst().text_range()
    }
}

fn token(node: &SyntaxNode, pred: impl Fn(SyntaxKind) -> bool) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| pred(t.kind()))
}

fn children(node: &SyntaxNode) -> impl Iterator<Item = Expr> + '_ {
    node.children().filter_map(Expr::cast)
}

impl Root {
    pub fn items(&self) -> impl Iterator<Item = Expr> + '_ {
        children(&self.0)
    }
}

impl Tree {
    /// `Id`, `_` or `ERROR`. `None` for `()`.
    pub fn node_kind(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| {
            matches!(k, SyntaxKind::Id | SyntaxKind::Underscore | SyntaxKind::KwError)
        })
    }

    pub fn children(&self) -> impl Iterator<Item = Expr> + '_ {
        children(&self.0)
    }
}

impl Group {
    pub fn children(&self) -> impl Iterator<Item = Expr> + '_ {
        children(&self.0)
    }
}

impl Alt {
    pub fn branches(&self) -> impl Iterator<Item = Expr> + '_ {
        children(&self.0)
    }
}

impl Str {
    pub fn raw_value(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| k == SyntaxKind::StrVal)
    }

    /// Content with escapes resolved. Empty for `""`.
    pub fn value(&self) -> String {
        self.raw_value()
            .map(|t| unescape(t.text()))
            .unwrap_or_default()
    }
}

impl Field {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| k == SyntaxKind::Id)
    }

    pub fn value(&self) -> Option<Expr> {
        children(&self.0).next()
    }
}

impl NegatedField {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| k == SyntaxKind::Id)
    }
}

impl Capture {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| k == SyntaxKind::Id)
    }

    pub fn inner(&self) -> Option<Expr> {
        children(&self.0).next()
    }
}

impl Quantifier {
    pub fn inner(&self) -> Option<Expr> {
        children(&self.0).next()
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| {
            matches!(k, SyntaxKind::Star | SyntaxKind::Plus | SyntaxKind::Question)
        })
    }
}

/// One argument of a predicate call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredicateArg {
    Capture(CaptureRef),
    Str(Str),
    /// Bare identifier, e.g. a `#set!` key.
    Word(SyntaxToken),
}

impl PredicateArg {
    pub fn text_range(&self) -> TextRange {
        match self {
            PredicateArg::Capture(c) => c.text_range(),
            PredicateArg::Str(s) => s.text_range(),
            PredicateArg::Word(t) => t.text_range(),
        }
    }
}

impl Predicate {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| k == SyntaxKind::PredicateName)
    }

    pub fn args(&self) -> impl Iterator<Item = PredicateArg> + '_ {
        self.0.children_with_tokens().filter_map(|it| match it {
            rowan::NodeOrToken::Node(node) => match node.kind() {
                SyntaxKind::CaptureRef => CaptureRef::cast(node).map(PredicateArg::Capture),
                SyntaxKind::Str => Str::cast(node).map(PredicateArg::Str),
                _ => None,
            },
            rowan::NodeOrToken::Token(t)
                if matches!(t.kind(), SyntaxKind::Id | SyntaxKind::KwError) =>
            {
                Some(PredicateArg::Word(t))
            }
            rowan::NodeOrToken::Token(_) => None,
        })
    }
}

impl CaptureRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, |k| k == SyntaxKind::Id)
    }
}
