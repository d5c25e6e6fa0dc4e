//! LALR(1) table generation.
//!
//! The pipeline mirrors tree-sitter's `generate` command in miniature:
//!
//! 1. [`prepare`] splits the definition into lexical tokens and flattened
//!    productions (choices expanded, repetitions turned into hidden
//!    left-recursive helper symbols, inline rules substituted).
//! 2. [`lalr`] builds the LR(0) item automaton and propagates LALR(1)
//!    lookaheads by merging LR(1) states with equal cores.
//! 3. [`tables`] numbers symbols, fields and aliases and emits a
//!    [`GrammarTable`], keeping every conflict with its precedence.

mod error;
mod lalr;
mod prepare;
mod sets;
mod tables;


use sapwood_core::GrammarTable;
use tracing::debug;

use crate::definition::GrammarDefinition;

pub use error::GenerateError;

/// Build a table from a grammar definition.
pub fn generate(definition: &GrammarDefinition) -> Result<GrammarTable, GenerateError> {
    let prepared = prepare::prepare(definition)?;
    let automaton = lalr::Automaton::build(&prepared);
    let table = tables::emit(definition, &prepared, &automaton)?;
    debug!(
        grammar = %definition.name,
        states = table.states.len(),
        productions = table.productions.len(),
        "generated grammar table"
    );
    Ok(table)
}
