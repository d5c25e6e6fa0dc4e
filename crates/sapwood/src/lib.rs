//! Sapwood: incremental parsing and structural queries over syntax trees.
//!
//! # Example
//!
//! ```
//! use sapwood::{Parser, Query, QueryCursor};
//!
//! let python = sapwood::langs::python().expect("bundled grammar");
//! let tree = Parser::new(python.clone())
//!     .expect("supported table")
//!     .parse("def add(a, b):\n    return a + b\n");
//!
//! let query = Query::new(&python, "(function_definition name: (identifier) @name)")
//!     .expect("valid query");
//! let names: Vec<_> = QueryCursor::new()
//!     .captures(&query, tree.root())
//!     .map(|capture| capture.map(|c| c.node.utf8_text().unwrap_or_default()))
//!     .collect::<Result<_, _>>()
//!     .expect("no limits set");
//! assert_eq!(names, ["add"]);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub use sapwood_compiler::{
    CompileOptions, DiagnosticKind, DiagnosticMessage, Diagnostics, DiagnosticsPrinter, Query,
    QueryError, Severity, compile,
};
pub use sapwood_core::{Grammar, GrammarError, GrammarLoader, GrammarTable, Point, SourceBuffer};
pub use sapwood_program::{CaptureId, PredicateRegistry, PredicateValue, Property, QueryProgram};
pub use sapwood_syntax::{InputEdit, Node, ParseOptions, Parser, PreOrder, SyntaxTree, TreeCursor};
pub use sapwood_vm::{
    Capture, ExecOptions, MatchAbort, QueryCaptures, QueryCursor, QueryMatch, QueryMatches,
};

/// Bundled grammars and the grammar table generator.
#[cfg(feature = "langs")]
pub use sapwood_langs as langs;
