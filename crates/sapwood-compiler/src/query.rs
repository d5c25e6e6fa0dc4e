//! The compile entry point.

use std::ops::Deref;

use sapwood_core::Grammar;
use sapwood_program::QueryProgram;
use tracing::debug;

use crate::analyze::link;
use crate::diagnostics::Diagnostics;
use crate::error::QueryError;
use crate::lower;
use crate::options::CompileOptions;
use crate::parser::{ParseResult, Parser, lexer};

/// A compiled query together with its text.
///
/// Dereferences to the [`QueryProgram`] the matcher runs.
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    program: QueryProgram,
    /// Warnings; a query with errors is never built.
    diagnostics: Diagnostics,
}

impl Query {
    /// Compile with default options.
    pub fn new(grammar: &Grammar, source: &str) -> Result<Self, QueryError> {
        compile(grammar, source, &CompileOptions::default())
    }

    pub fn with_options(
        grammar: &Grammar,
        source: &str,
        options: &CompileOptions,
    ) -> Result<Self, QueryError> {
        compile(grammar, source, options)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &QueryProgram {
        &self.program
    }

    pub fn into_program(self) -> QueryProgram {
        self.program
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl Deref for Query {
    type Target = QueryProgram;

    fn deref(&self) -> &QueryProgram {
        &self.program
    }
}

/// Parse, link and lower `source` against `grammar`.
///
/// Syntax errors stop compilation before the grammar is consulted, so name
/// errors are only reported for queries that parse.
pub fn compile(
    grammar: &Grammar,
    source: &str,
    options: &CompileOptions,
) -> Result<Query, QueryError> {
    let ParseResult {
        root,
        mut diagnostics,
    } = Parser::new(source, lexer::lex(source))
        .with_fuel(options.fuel)
        .with_recursion_limit(options.recursion_limit)
        .parse();
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "query failed to parse");
        return Err(QueryError::new(source, diagnostics));
    }

    let linked = link::link(&root, grammar, &mut diagnostics);
    let lowered = lower::lower(&root, &linked, &options.registry, &mut diagnostics);
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "query failed to compile");
        return Err(QueryError::new(source, diagnostics));
    }

    let program = QueryProgram::new(grammar, lowered.patterns, lowered.capture_names);
    debug!(
        grammar = grammar.name(),
        patterns = program.pattern_count(),
        captures = program.capture_names().len(),
        warnings = diagnostics.warning_count(),
        "compiled query"
    );
    Ok(Query {
        source: source.to_owned(),
        program,
        diagnostics,
    })
}
