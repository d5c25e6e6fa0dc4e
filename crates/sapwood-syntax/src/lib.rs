#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Parsing and syntax trees.
//!
//! - [`Parser`]: context-aware lexer plus LR driver with error recovery and
//!   incremental reuse
//! - [`SyntaxTree`] / [`Node`]: immutable concrete syntax trees over a
//!   segmented arena shared between tree versions
//! - [`TreeCursor`] and [`PreOrder`]: stateful navigation and traversal
//! - [`InputEdit`]: the single replacement an incremental parse accounts for

mod arena;
mod cursor;
mod edit;
mod lexer;
mod node;
mod parser;
mod tree;

#[cfg(test)]
mod cursor_tests;
#[cfg(test)]
mod edit_tests;
#[cfg(test)]
mod incremental_tests;
#[cfg(test)]
mod test_utils;

pub use cursor::{PreOrder, TreeCursor};
pub use edit::InputEdit;
pub use node::{Children, Node};
pub use parser::{ParseOptions, Parser};
pub use tree::SyntaxTree;
