#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Runtime for executing compiled Sapwood queries.
//!
//! A [`QueryCursor`] walks a syntax tree in pre-order and runs every
//! [`QueryProgram`](sapwood_program::QueryProgram) pattern whose first node
//! test accepts the visited node. Results come out lazily, node by node, as
//! [`QueryMatch`]es or as a flat stream of [`Capture`]s.

pub mod engine;

pub use engine::{Capture, ExecOptions, MatchAbort, QueryCaptures, QueryCursor, QueryMatch, QueryMatches};
