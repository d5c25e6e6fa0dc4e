//! The grammar table contract.
//!
//! A [`GrammarTable`] is plain data: symbols, fields, productions, LR states
//! and token definitions. [`Grammar`] wraps a validated table together with
//! compiled token matchers and an optional [`ExternalScanner`]. How a table
//! was produced is not this crate's concern.

mod binary;
mod error;
mod language;
mod loader;
mod scanner;
mod table;
mod token;

#[cfg(test)]
mod language_tests;
#[cfg(test)]
pub(crate) mod test_tables;

pub use error::GrammarError;
pub use language::Grammar;
pub use loader::GrammarLoader;
pub use scanner::{ExternalScanner, ScanLexer};
pub use table::{
    Action, Associativity, FieldId, GrammarTable, LexMode, ParseState, Production, StateId,
    SymbolId, SymbolInfo, SymbolKind, TABLE_VERSION, TokenDef, TokenPattern,
};
pub use token::{TokenMatch, TokenMatcher};
