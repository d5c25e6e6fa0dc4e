//! Query execution engine.
//!
//! The matcher is a backtracking interpreter over the program's instruction
//! tree. The cursor drives it over the nodes of a tree and turns solutions
//! into matches and captures.

mod budget;
mod capture;
mod cursor;
mod error;
mod matcher;
mod options;

#[cfg(test)]
mod budget_tests;
#[cfg(test)]
mod cursor_tests;
#[cfg(test)]
mod matcher_tests;
#[cfg(test)]
mod test_utils;

pub use capture::{Capture, QueryMatch};
pub use cursor::{QueryCaptures, QueryCursor, QueryMatches};
pub use error::MatchAbort;
pub use options::ExecOptions;
