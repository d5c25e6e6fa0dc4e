//! Passes over the parsed query: grammar linking and predicate checks.

pub mod link;
pub mod predicates;
pub mod visitor;

#[cfg(test)]
mod predicates_tests;

pub use link::{LinkOutput, link};
pub use predicates::{Directive, PredicateChecker};
pub use visitor::Visitor;
