#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by every Sapwood crate.
//!
//! - [`SourceBuffer`]: immutable source bytes plus a lazily built line index
//! - [`Grammar`]: the compiled, read-only language table the parser runs on
//! - [`Interner`]: string deduplication for query names
//!
//! Nothing in here builds grammars. Tables arrive through a [`GrammarLoader`]
//! or through [`Grammar::new`] with a table produced elsewhere.

pub mod grammar;
pub mod interner;
pub mod source;
pub mod utils;

#[cfg(test)]
mod source_tests;

pub use grammar::{
    Action, Associativity, ExternalScanner, FieldId, Grammar, GrammarError, GrammarLoader,
    GrammarTable, LexMode, ParseState, Production, ScanLexer, StateId, SymbolId, SymbolInfo,
    SymbolKind, TABLE_VERSION, TokenDef, TokenMatch, TokenMatcher, TokenPattern,
};
pub use interner::{Atom, Interner};
pub use source::{Point, SourceBuffer};
