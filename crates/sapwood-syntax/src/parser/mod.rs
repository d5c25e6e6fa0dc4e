//! Table-driven LR parsing.
//!
//! [`Parser`] runs a grammar's LR table over a [`SourceBuffer`] and always
//! produces a tree: input the table cannot handle ends up in `ERROR` nodes.
//! [`Parser::parse_with_edit`] additionally walks the previous tree and
//! reuses every subtree the edit cannot have influenced.

mod driver;
mod options;
mod recover;
mod reuse;

use std::sync::Arc;

use sapwood_core::{Grammar, GrammarError, SourceBuffer, TABLE_VERSION};
use tracing::{debug, warn};

use crate::arena;
use crate::edit::InputEdit;
use crate::tree::SyntaxTree;

pub use options::ParseOptions;

use driver::Run;
use reuse::ReuseCursor;

/// Parses source text with one grammar.
///
/// A parser holds no per-parse state, so one instance can serve any number
/// of parses, sequentially or from several threads.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Arc<Grammar>,
    options: ParseOptions,
}

impl Parser {
    pub fn new(grammar: Arc<Grammar>) -> Result<Self, GrammarError> {
        if grammar.version() != TABLE_VERSION {
            return Err(GrammarError::UnsupportedVersion {
                found: grammar.version(),
                expected: TABLE_VERSION,
            });
        }
        Ok(Self {
            grammar,
            options: ParseOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Parse `source` from scratch. Never fails.
    pub fn parse(&self, source: impl Into<SourceBuffer>) -> SyntaxTree {
        let source = source.into();
        self.run(source, None)
    }

    /// Parse `source`, the result of applying `edit` to `old`'s text.
    ///
    /// The result is identical to [`Parser::parse`] on the same text. When
    /// the edit does not describe how the old text became the new one, or
    /// `old` was built with a different grammar instance, this degrades to
    /// a full parse.
    pub fn parse_with_edit(
        &self,
        old: &SyntaxTree,
        edit: &InputEdit,
        source: impl Into<SourceBuffer>,
    ) -> SyntaxTree {
        let source = source.into();
        if !Arc::ptr_eq(old.grammar(), &self.grammar) {
            warn!(
                old = old.grammar().name(),
                new = self.grammar.name(),
                "previous tree was built by another grammar instance; parsing from scratch"
            );
            return self.run(source, None);
        }
        if !edit.is_consistent(old.source(), &source) {
            warn!(?edit, "edit does not match the buffers; parsing from scratch");
            return self.run(source, None);
        }
        self.run(source, Some(ReuseCursor::new(old.inner(), *edit)))
    }

    fn run(&self, source: SourceBuffer, reuse: Option<ReuseCursor<'_>>) -> SyntaxTree {
        let incremental = reuse.is_some();
        let old_arena = reuse
            .as_ref()
            .map(|r| r.arena().clone())
            .unwrap_or_default();

        let run = Run::new(&self.grammar, self.options, &source, old_arena, reuse);
        let (mut arena, mut root, stats) = run.finish();

        let reused_nothing = incremental && stats.reused == 0 && arena.segment_count() > 1;
        if reused_nothing || arena.segment_count() > self.options.compaction_threshold {
            (arena, root) = arena::compact(&arena, root);
        }

        debug!(
            grammar = self.grammar.name(),
            bytes = source.len(),
            incremental,
            reused = stats.reused,
            shifts = stats.shifts,
            reductions = stats.reductions,
            errors = stats.errors,
            segments = arena.segment_count(),
            "parse finished"
        );
        SyntaxTree::new(self.grammar.clone(), source, arena, root)
    }
}
