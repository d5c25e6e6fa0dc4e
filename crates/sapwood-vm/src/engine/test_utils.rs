use std::fmt::Write;
use std::sync::{Arc, OnceLock};

use sapwood_compiler::Query;
use sapwood_core::Grammar;
use sapwood_syntax::{Parser, SyntaxTree};

use super::{ExecOptions, QueryCursor};

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

pub fn parse(grammar: &Arc<Grammar>, text: &str) -> SyntaxTree {
    Parser::new(grammar.clone()).expect("parser").parse(text)
}

pub fn query(grammar: &Grammar, source: &str) -> Query {
    Query::new(grammar, source).unwrap_or_else(|err| panic!("{}", err.render(source)))
}

/// One line per match: pattern index, then `@name text` per capture.
pub fn run(grammar: &Arc<Grammar>, source: &str, query_source: &str) -> String {
    run_with(grammar, source, query_source, ExecOptions::default())
}

pub fn run_with(
    grammar: &Arc<Grammar>,
    source: &str,
    query_source: &str,
    options: ExecOptions,
) -> String {
    let tree = parse(grammar, source);
    let query = query(grammar, query_source);
    let cursor = QueryCursor::with_options(options);

    let mut out = String::new();
    for found in cursor.matches(&query, tree.root()) {
        let found = found.expect("execution is not limited");
        write!(out, "{}:", found.pattern_index).unwrap();
        for capture in &found.captures {
            let text = capture.node.utf8_text().unwrap().replace('\n', "\\n");
            write!(out, " @{} {text:?}", capture.name).unwrap();
        }
        out.push('\n');
    }
    out
}

/// Texts captured under `name`, in output order.
pub fn captured(grammar: &Arc<Grammar>, source: &str, query_source: &str, name: &str) -> Vec<String> {
    let tree = parse(grammar, source);
    let query = query(grammar, query_source);
    QueryCursor::new()
        .captures(&query, tree.root())
        .map(|c| c.expect("execution is not limited"))
        .filter(|c| c.name == name)
        .map(|c| c.node.utf8_text().unwrap().to_owned())
        .collect()
}
