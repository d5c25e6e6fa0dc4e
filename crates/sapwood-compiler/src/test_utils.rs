use std::sync::{Arc, OnceLock};

use sapwood_core::Grammar;
use sapwood_program::dump::dump;

use crate::{CompileOptions, DiagnosticKind, Query, QueryError};

fn cached(
    cell: &'static OnceLock<Arc<Grammar>>,
    build: fn() -> Result<Arc<Grammar>, sapwood_core::GrammarError>,
) -> Arc<Grammar> {
    cell.get_or_init(|| build().expect("bundled grammar builds"))
        .clone()
}

pub fn json() -> Arc<Grammar> {
    static CELL: OnceLock<Arc<Grammar>> = OnceLock::new();
    cached(&CELL, sapwood_langs::json)
}

pub fn python() -> Arc<Grammar> {
    static CELL: OnceLock<Arc<Grammar>> = OnceLock::new();
    cached(&CELL, sapwood_langs::python)
}

pub fn compile_ok(grammar: &Grammar, source: &str) -> Query {
    compile_ok_with(grammar, source, &CompileOptions::default())
}

pub fn compile_ok_with(grammar: &Grammar, source: &str, options: &CompileOptions) -> Query {
    Query::with_options(grammar, source, options).unwrap_or_else(|err| panic!("{}", err.render(source)))
}

pub fn compile_err(grammar: &Grammar, source: &str) -> QueryError {
    compile_err_with(grammar, source, &CompileOptions::default())
}

pub fn compile_err_with(grammar: &Grammar, source: &str, options: &CompileOptions) -> QueryError {
    Query::with_options(grammar, source, options).expect_err("query should not compile")
}

/// Program listing of a query that must compile.
pub fn program(grammar: &Grammar, source: &str) -> String {
    dump(compile_ok(grammar, source).program(), grammar)
}

/// Kinds left after suppression, in report order.
pub fn error_kinds(grammar: &Grammar, source: &str) -> Vec<DiagnosticKind> {
    compile_err(grammar, source)
        .diagnostics
        .filtered()
        .iter()
        .map(|d| d.kind())
        .collect()
}

/// Plain one-line-per-diagnostic rendering after suppression.
pub fn errors(grammar: &Grammar, source: &str) -> String {
    compile_err(grammar, source)
        .diagnostics
        .filtered()
        .printer()
        .render()
}
