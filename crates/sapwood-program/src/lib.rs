#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Executable form of a compiled query.
//!
//! A [`QueryProgram`] is a list of independent top-level patterns. Each
//! pattern is a tree of [`Instruction`]s: node tests with their field,
//! capture and child constraints, plus the combinators quantifiers and
//! alternations lower to. Predicates run after a structural match.
//!
//! The program is built by `sapwood-compiler` and executed by `sapwood-vm`.
//! It never changes after construction and can be shared across threads.

pub mod dump;
pub mod instruction;
pub mod nav;
pub mod node_test;
pub mod predicate;
pub mod program;
pub mod registry;

#[cfg(test)]
mod instruction_tests;
#[cfg(test)]
mod nav_tests;
#[cfg(test)]
mod program_tests;

pub use instruction::{Block, Instruction, NodeMatch, Quantifier, Step};
pub use nav::Nav;
pub use node_test::NodeTest;
pub use predicate::{Predicate, PredicateArg, PredicateValue, TextOp};
pub use program::{CaptureId, Pattern, Property, QueryProgram};
pub use registry::{CustomPredicate, PredicateFn, PredicateRegistry};
