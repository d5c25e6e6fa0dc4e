//! Syntax kinds for the query language.
//!
//! `SyntaxKind` is both the token kind the lexer produces and the node kind
//! the parser builds. Only token variants carry logos attributes.

use logos::Logos;
use rowan::Language;

/// Tokens first, then nodes, then the `__LAST` sentinel.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("!")]
    Negation,

    #[token("_")]
    Underscore,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    /// Not part of the language; lexed so the parser can say so.
    #[token(",")]
    Comma,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    #[doc(hidden)]
    StringLiteral, // split by the lexer

    DoubleQuote,
    /// String content between quotes, escapes still in place.
    StrVal,

    #[token("ERROR")]
    KwError,

    /// Node kinds, field names, capture names and bare predicate arguments.
    /// Dots and hyphens are allowed for capture names like `@function.name`.
    #[regex(r"[a-zA-Z][a-zA-Z0-9_.\-]*")]
    Id,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    /// `#match?`, `#not-eq?`, `#set!`.
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_\-]*[?!]?")]
    PredicateName,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r";[^\n]*", allow_greedy = true)]
    LineComment,

    /// Coalesced unrecognized characters.
    Garbage,
    Error,

    // Nodes
    Root,
    Tree,
    Str,
    Wildcard,
    Group,
    Alt,
    Field,
    NegatedField,
    Capture,
    Quantifier,
    Anchor,
    Predicate,
    CaptureRef,

    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryLang {}

impl Language for QueryLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: in bounds, and SyntaxKind is repr(u16) with contiguous discriminants
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<QueryLang>;
pub type SyntaxToken = rowan::SyntaxToken<QueryLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// Bitset of token kinds for O(1) membership tests.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Panics at compile time if a kind does not fit in 64 bits.
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        kind < 64 && self.0 & (1 << kind) != 0
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..(__LAST as u16).min(64) {
            if self.0 & (1 << i) != 0 {
                list.entry(&QueryLang::kind_from_raw(rowan::SyntaxKind(i)));
            }
        }
        list.finish()
    }
}

pub mod token_sets {
    use super::*;

    /// Tokens that can start an expression. `At` is missing on purpose:
    /// captures wrap, they never start.
    pub const EXPR_FIRST: TokenSet = TokenSet::new(&[
        ParenOpen,
        BracketOpen,
        Underscore,
        Id,
        DoubleQuote,
        Dot,
        Negation,
        KwError,
    ]);

    pub const QUANTIFIERS: TokenSet = TokenSet::new(&[Star, Plus, Question]);

    /// Closers of enclosing constructs: a tree or group stops at them and
    /// reports itself unclosed.
    pub const TREE_RECOVERY: TokenSet = TokenSet::new(&[BracketClose]);

    pub const ALT_RECOVERY: TokenSet = TokenSet::new(&[ParenClose]);

    pub const PREDICATE_RECOVERY: TokenSet = TokenSet::new(&[ParenOpen, BracketOpen, BracketClose]);

    /// Where skipping stops after garbage at the top level.
    pub const ROOT_RECOVERY: TokenSet = TokenSet::new(&[
        ParenOpen,
        BracketOpen,
        Underscore,
        Id,
        DoubleQuote,
        KwError,
        At,
        PredicateName,
        Comma,
    ]);
}
