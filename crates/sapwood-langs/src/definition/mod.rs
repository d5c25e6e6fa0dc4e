//! Grammar definitions in the shape of tree-sitter's `grammar.json`.
//!
//! Definitions can be loaded from JSON or assembled in Rust with the
//! combinators in [`dsl`]. Either way they feed [`crate::generate`].

pub mod dsl;
mod json;
mod types;

#[cfg(test)]
mod dsl_tests;

pub use types::{GrammarDefinition, Precedence, PrecedenceEntry, Rule};
