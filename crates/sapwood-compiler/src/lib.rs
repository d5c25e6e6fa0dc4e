#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Query compiler for Sapwood.
//!
//! Query text goes through four stages:
//!
//! 1. [`parser`]: lossless CST with error recovery, plus a typed AST view
//! 2. [`analyze::link`]: node kinds and fields resolved against a [`Grammar`]
//! 3. [`analyze::predicates`]: predicate calls checked and compiled
//! 4. [`lower`]: patterns lowered to a [`QueryProgram`]
//!
//! Every stage reports into one [`Diagnostics`] list. Compilation fails
//! with a [`QueryError`] carrying the first error and the full list.
//!
//! ```ignore
//! let grammar = sapwood_langs::python()?;
//! let query = Query::new(&grammar, "(function_definition name: (identifier) @name)")?;
//! assert_eq!(query.capture_names(), ["name"]);
//! ```
//!
//! [`Grammar`]: sapwood_core::Grammar
//! [`QueryProgram`]: sapwood_program::QueryProgram

pub mod analyze;
pub mod diagnostics;
mod error;
pub mod lower;
mod options;
pub mod parser;
mod query;

#[cfg(test)]
mod query_tests;
#[cfg(test)]
mod test_utils;

pub use diagnostics::{DiagnosticKind, DiagnosticMessage, Diagnostics, DiagnosticsPrinter, Severity};
pub use error::QueryError;
pub use options::CompileOptions;
pub use query::{Query, compile};
