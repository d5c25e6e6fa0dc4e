//! Driving the matcher over a tree.

use std::collections::VecDeque;
use std::ops::Range;

use sapwood_program::QueryProgram;
use sapwood_syntax::Node;
use tracing::{debug, trace, warn};

use super::budget::Budget;
use super::capture::{Capture, QueryMatch};
use super::error::MatchAbort;
use super::matcher::Matcher;
use super::options::ExecOptions;

/// Runs query programs over syntax trees.
///
/// The cursor only holds options; each call to [`matches`](Self::matches) or
/// [`captures`](Self::captures) starts an independent, lazy execution.
#[derive(Clone, Debug, Default)]
pub struct QueryCursor {
    options: ExecOptions,
}

impl QueryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExecOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ExecOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Restrict later executions to nodes intersecting `range`.
    pub fn set_byte_range(&mut self, range: Range<usize>) -> &mut Self {
        self.options.byte_range = Some(range);
        self
    }

    /// Matches of every pattern in the subtree rooted at `node`.
    ///
    /// Matches come in pre-order of the node the pattern starts at, then in
    /// pattern order. A program compiled for a different grammar yields
    /// nothing.
    pub fn matches<'q, 't>(&self, program: &'q QueryProgram, node: Node<'t>) -> QueryMatches<'q, 't> {
        QueryMatches::new(program, node, &self.options)
    }

    /// The captures of [`matches`](Self::matches), flattened.
    pub fn captures<'q, 't>(&self, program: &'q QueryProgram, node: Node<'t>) -> QueryCaptures<'q, 't> {
        QueryCaptures {
            matches: self.matches(program, node),
            pending: VecDeque::new(),
        }
    }
}

/// Children of one visited node, with the next one to visit.
struct Level<'t> {
    siblings: Vec<Node<'t>>,
    next: usize,
}

/// Lazy iterator over [`QueryMatch`]es. Fused after yielding an error.
pub struct QueryMatches<'q, 't> {
    program: &'q QueryProgram,
    matcher: Matcher<'t>,
    byte_range: Option<Range<usize>>,
    levels: Vec<Level<'t>>,
    pending: VecDeque<QueryMatch<'q, 't>>,
    candidates: Vec<usize>,
    matched: usize,
    done: bool,
}

impl<'q, 't> QueryMatches<'q, 't> {
    fn new(program: &'q QueryProgram, root: Node<'t>, options: &ExecOptions) -> Self {
        let compatible = program.is_compatible(root.language());
        if !compatible {
            warn!(
                query_grammar = program.grammar_name(),
                tree_grammar = root.language().name(),
                "query was compiled for a different grammar, no matches"
            );
        }

        Self {
            program,
            matcher: Matcher::new(Budget::new(options)),
            byte_range: options.byte_range.clone(),
            levels: vec![Level {
                siblings: vec![root],
                next: 0,
            }],
            pending: VecDeque::new(),
            candidates: Vec::new(),
            matched: 0,
            done: !compatible,
        }
    }

    /// Node tests performed so far.
    pub fn steps(&self) -> u64 {
        self.matcher.budget.steps()
    }

    fn in_range(&self, node: &Node<'_>) -> bool {
        let Some(range) = &self.byte_range else {
            return true;
        };
        let (start, end) = (node.start_byte(), node.end_byte());
        if start == end {
            return range.contains(&start);
        }
        start < range.end && end > range.start
    }

    /// Visit the next node in pre-order and queue its matches. Returns
    /// `false` once the traversal is exhausted.
    fn advance(&mut self) -> Result<bool, MatchAbort> {
        let Some(level) = self.levels.last_mut() else {
            return Ok(false);
        };
        let Some(&node) = level.siblings.get(level.next) else {
            self.levels.pop();
            return Ok(true);
        };
        let index = level.next;
        level.next += 1;

        // Children lie inside their parent, so the whole subtree is skipped.
        if !self.in_range(&node) {
            return Ok(true);
        }
        self.matcher.budget.check()?;

        let program = self.program;
        let kind = node.language().canonical_kind(node.kind_id());
        program.candidates(kind, node.is_named(), &mut self.candidates);

        if let Some(level) = self.levels.last() {
            for &pattern_index in &self.candidates {
                let Some(pattern) = program.pattern(pattern_index) else {
                    continue;
                };
                for bindings in self.matcher.run(pattern, &level.siblings, index)? {
                    trace!(pattern = pattern_index, node = ?node, "match");
                    let captures = bindings
                        .into_iter()
                        .map(|(id, node)| Capture {
                            node,
                            index: id,
                            name: program.capture_name(id),
                        })
                        .collect();
                    self.pending.push_back(QueryMatch {
                        pattern_index,
                        captures,
                    });
                    self.matched += 1;
                }
            }
        }

        let children: Vec<Node<'t>> = node.all_children().collect();
        if !children.is_empty() {
            self.levels.push(Level {
                siblings: children,
                next: 0,
            });
        }
        Ok(true)
    }
}

impl<'q, 't> Iterator for QueryMatches<'q, 't> {
    type Item = Result<QueryMatch<'q, 't>, MatchAbort>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.pending.pop_front() {
                return Some(Ok(found));
            }
            if self.done {
                return None;
            }
            match self.advance() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    debug!(
                        matches = self.matched,
                        steps = self.steps(),
                        "query execution finished"
                    );
                }
                Err(abort) => {
                    self.done = true;
                    self.pending.clear();
                    self.levels.clear();
                    debug!(%abort, matches = self.matched, steps = self.steps(), "query execution aborted");
                    return Some(Err(abort));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for QueryMatches<'_, '_> {}

/// Lazy iterator over the captures of every match, match by match.
/// Fused after yielding an error.
pub struct QueryCaptures<'q, 't> {
    matches: QueryMatches<'q, 't>,
    pending: VecDeque<Capture<'q, 't>>,
}

impl QueryCaptures<'_, '_> {
    /// Node tests performed so far.
    pub fn steps(&self) -> u64 {
        self.matches.steps()
    }
}

impl<'q, 't> Iterator for QueryCaptures<'q, 't> {
    type Item = Result<Capture<'q, 't>, MatchAbort>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(capture) = self.pending.pop_front() {
                return Some(Ok(capture));
            }
            match self.matches.next()? {
                Ok(found) => self.pending.extend(found.captures),
                Err(abort) => return Some(Err(abort)),
            }
        }
    }
}

impl std::iter::FusedIterator for QueryCaptures<'_, '_> {}
