//! Backtracking matcher for one pattern at one node.
//!
//! Matching is written in continuation-passing style: every instruction gets
//! a position among the current siblings and a continuation for "the rest of
//! the pattern". The continuation returns whether it recorded a solution,
//! which is how alternations and quantifiers commit to the first choice that
//! works while unanchored searches keep enumerating.
//!
//! Positions are indices into the full child list of a node, anonymous nodes
//! included. Navigation decides which indices a step may consume:
//!
//! - `Stay`: exactly the node at the position
//! - `Adjacent`: the first named node at or after it, trying anonymous nodes
//!   on the way
//! - `Search`: any node at or after it
//!
//! A step that consumes nothing (a skipped optional) hands its navigation to
//! the next step, so `. (a)? (b)` still anchors `(b)` when `(a)` is absent.
//!
//! Quantifiers over a single childless node keep their iterations on an
//! explicit stack. Other quantifier bodies nest one continuation per
//! iteration, bounded by the recursion limit.

use std::cmp::Reverse;
use std::collections::HashMap;

use sapwood_program::{Block, CaptureId, Instruction, Nav, NodeMatch, Pattern, Quantifier, Step};
use sapwood_syntax::Node;
use tracing::trace;

use super::budget::Budget;
use super::error::MatchAbort;

/// Bindings of one solution: capture and node, in output order.
pub(crate) type Bindings<'t> = Vec<(CaptureId, Node<'t>)>;

/// The rest of a pattern. Receives the first unconsumed position and the
/// navigation the next step inherits.
type Cont<'c, 't> = dyn FnMut(&mut Matcher<'t>, usize, Nav) -> Result<bool, MatchAbort> + 'c;

pub(crate) struct Matcher<'t> {
    pub(crate) budget: Budget,
    /// Captures bound along the current path.
    bound: Bindings<'t>,
    /// Solutions for the pattern being run.
    found: Vec<Bindings<'t>>,
    /// For every binding, the indices of the solutions that contain it.
    postings: HashMap<(CaptureId, Node<'t>), Vec<usize>>,
}

/// One live iteration of a quantifier over a childless node.
struct Iteration {
    count: usize,
    /// First sibling after the nodes consumed so far.
    pos: usize,
    /// Next sibling to try for one more iteration.
    cursor: usize,
    matched: bool,
    /// Bindings to restore once this iteration is done.
    mark: usize,
}

impl<'t> Matcher<'t> {
    pub(crate) fn new(budget: Budget) -> Self {
        Self {
            budget,
            bound: Vec::new(),
            found: Vec::new(),
            postings: HashMap::new(),
        }
    }

    /// Every solution of `pattern` whose first node is `siblings[index]`.
    ///
    /// A solution whose bindings are all part of an earlier solution is
    /// dropped, so searching past a quantified run does not repeat its tail.
    pub(crate) fn run(
        &mut self,
        pattern: &Pattern,
        siblings: &[Node<'t>],
        index: usize,
    ) -> Result<Vec<Bindings<'t>>, MatchAbort> {
        self.bound.clear();
        self.found.clear();
        self.postings.clear();

        let mut accept = |m: &mut Matcher<'t>, _: usize, _: Nav| m.accept(pattern);
        let result = self.block(&pattern.root, siblings, index, Nav::Search, &mut accept);
        self.bound.clear();
        self.postings.clear();
        let found = std::mem::take(&mut self.found);
        result.map(|_| found)
    }

    fn accept(&mut self, pattern: &Pattern) -> Result<bool, MatchAbort> {
        let mut bindings = self.bound.clone();
        bindings.sort_by_key(|(id, node)| (node.start_byte(), Reverse(node.end_byte()), *id));
        bindings.dedup();

        let passes = pattern
            .predicates
            .iter()
            .all(|p| p.evaluate(|id| texts(&bindings, id)));
        if !passes {
            trace!(predicates = pattern.predicates.len(), "predicates rejected solution");
            return Ok(false);
        }

        if !self.is_covered(&bindings) {
            let solution = self.found.len();
            for &binding in &bindings {
                self.postings.entry(binding).or_default().push(solution);
            }
            self.found.push(bindings);
        }
        Ok(true)
    }

    /// Whether an earlier solution contains every one of `bindings`.
    /// Candidates come from the binding shared by the fewest solutions.
    fn is_covered(&self, bindings: &[(CaptureId, Node<'t>)]) -> bool {
        let Some(rarest) = bindings
            .iter()
            .map(|binding| self.solutions_with(binding))
            .min_by_key(|solutions| solutions.len())
        else {
            return !self.found.is_empty();
        };
        rarest.iter().any(|solution| {
            bindings
                .iter()
                .all(|binding| self.solutions_with(binding).binary_search(solution).is_ok())
        })
    }

    fn solutions_with(&self, binding: &(CaptureId, Node<'t>)) -> &[usize] {
        self.postings.get(binding).map_or(&[][..], Vec::as_slice)
    }

    fn block(
        &mut self,
        block: &Block,
        siblings: &[Node<'t>],
        pos: usize,
        nav: Nav,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        self.steps(&block.steps, block.anchored_end, siblings, pos, nav, k)
    }

    fn steps(
        &mut self,
        steps: &[Step],
        anchored_end: bool,
        siblings: &[Node<'t>],
        pos: usize,
        nav: Nav,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        let Some((step, rest)) = steps.split_first() else {
            if anchored_end && siblings[pos..].iter().any(Node::is_named) {
                return Ok(false);
            }
            return k(self, pos, nav);
        };

        let nav = nav.restrict(step.nav);
        let mut next = |m: &mut Matcher<'t>, pos: usize, nav: Nav| {
            m.steps(rest, anchored_end, siblings, pos, nav, k)
        };
        self.instruction(&step.instruction, siblings, pos, nav, &mut next)
    }

    fn instruction(
        &mut self,
        instruction: &Instruction,
        siblings: &[Node<'t>],
        pos: usize,
        nav: Nav,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        match instruction {
            Instruction::Match(m) => self.node(m, siblings, pos, nav, k),
            Instruction::Group(block) => self.block(block, siblings, pos, nav, k),
            Instruction::Alternation(branches) => {
                for branch in branches {
                    if self.block(branch, siblings, pos, nav, k)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Instruction::Repeat { body, quantifier } => {
                self.repeat(body, *quantifier, siblings, pos, nav, 0, k)
            }
        }
    }

    /// Greedy: one more iteration is tried before stopping at `count`.
    #[allow(clippy::too_many_arguments)]
    fn repeat(
        &mut self,
        body: &Block,
        quantifier: Quantifier,
        siblings: &[Node<'t>],
        pos: usize,
        nav: Nav,
        count: usize,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        if let Some((m, step_nav)) = childless_body(body) {
            return self.repeat_childless(m, step_nav, quantifier, siblings, pos, nav, k);
        }

        self.budget.descend()?;
        let result = self.repeat_nested(body, quantifier, siblings, pos, nav, count, k);
        self.budget.ascend();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn repeat_nested(
        &mut self,
        body: &Block,
        quantifier: Quantifier,
        siblings: &[Node<'t>],
        pos: usize,
        nav: Nav,
        count: usize,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        if count == 0 || quantifier.is_unbounded() {
            // Later iterations continue right after the previous one.
            let iteration_nav = if count == 0 { nav } else { Nav::Adjacent };
            let mut again = |m: &mut Matcher<'t>, next: usize, _: Nav| {
                if next == pos {
                    return Ok(false);
                }
                m.budget.descend()?;
                let result = m.repeat_nested(body, quantifier, siblings, next, nav, count + 1, k);
                m.budget.ascend();
                result
            };
            if self.block(body, siblings, pos, iteration_nav, &mut again)? {
                return Ok(true);
            }
        }

        if count < quantifier.min() {
            return Ok(false);
        }
        let carried = if count == 0 { nav } else { Nav::Search };
        k(self, pos, carried)
    }

    /// Same exploration order as [`Self::repeat_nested`] for a body that
    /// matches exactly one node: each iteration tries its candidates in
    /// sibling order, deeper iterations first, and falls back to the
    /// continuation only when no longer run succeeded.
    #[allow(clippy::too_many_arguments)]
    fn repeat_childless(
        &mut self,
        m: &NodeMatch,
        step_nav: Nav,
        quantifier: Quantifier,
        siblings: &[Node<'t>],
        pos: usize,
        nav: Nav,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        let mut stack = vec![Iteration {
            count: 0,
            pos,
            cursor: pos,
            matched: false,
            mark: self.bound.len(),
        }];

        while let Some(top) = stack.last_mut() {
            let mut candidate = None;
            if top.count == 0 || quantifier.is_unbounded() {
                let iteration_nav = if top.count == 0 { nav } else { Nav::Adjacent };
                let iteration_nav = iteration_nav.restrict(step_nav);
                while top.cursor < siblings.len() {
                    let index = top.cursor;
                    let node = siblings[index];
                    top.cursor = match iteration_nav {
                        Nav::Stay => siblings.len(),
                        Nav::Adjacent if node.is_named() => siblings.len(),
                        _ => index + 1,
                    };
                    self.budget.step()?;
                    if self.admits(m, node) {
                        candidate = Some((index, node));
                        break;
                    }
                }
            }

            if let Some((index, node)) = candidate {
                let count = top.count + 1;
                let mark = self.bound.len();
                self.bound.extend(m.captures.iter().map(|&id| (id, node)));
                stack.push(Iteration {
                    count,
                    pos: index + 1,
                    cursor: index + 1,
                    matched: false,
                    mark,
                });
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let result = if done.matched {
                true
            } else if done.count < quantifier.min() {
                false
            } else {
                let carried = if done.count == 0 { nav } else { Nav::Search };
                k(self, done.pos, carried)?
            };
            self.bound.truncate(done.mark);
            match stack.last_mut() {
                Some(parent) => parent.matched |= result,
                None => return Ok(result),
            }
        }
        Ok(false)
    }

    fn node(
        &mut self,
        m: &NodeMatch,
        siblings: &[Node<'t>],
        pos: usize,
        nav: Nav,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        let mut matched = false;
        for (index, &node) in siblings.iter().enumerate().skip(pos) {
            matched |= self.try_node(m, node, index + 1, k)?;
            match nav {
                Nav::Stay => break,
                Nav::Adjacent if node.is_named() => break,
                _ => {}
            }
        }
        Ok(matched)
    }

    fn try_node(
        &mut self,
        m: &NodeMatch,
        node: Node<'t>,
        next: usize,
        k: &mut Cont<'_, 't>,
    ) -> Result<bool, MatchAbort> {
        self.budget.step()?;
        if !self.admits(m, node) {
            return Ok(false);
        }

        let mark = self.bound.len();
        self.bound.extend(m.captures.iter().map(|&id| (id, node)));

        let result = if m.children.is_empty() {
            k(self, next, Nav::Search)
        } else {
            let children: Vec<Node<'t>> = node.all_children().collect();
            let mut after = |s: &mut Matcher<'t>, _: usize, _: Nav| k(s, next, Nav::Search);
            self.block(&m.children, &children, 0, Nav::Search, &mut after)
        };

        self.bound.truncate(mark);
        result
    }

    /// Kind, field and negated-field checks of one node test.
    fn admits(&self, m: &NodeMatch, node: Node<'t>) -> bool {
        let kind = node.language().canonical_kind(node.kind_id());
        m.test.accepts(kind, node.is_named())
            && (m.field.is_none() || node.field_id() == m.field)
            && !m
                .negated_fields
                .iter()
                .any(|&field| node.child_by_field_id(field).is_some())
    }
}

/// The node test of a body that is one childless node and nothing else.
fn childless_body(body: &Block) -> Option<(&NodeMatch, Nav)> {
    match body.steps.as_slice() {
        [Step {
            instruction: Instruction::Match(m),
            nav,
        }] if !body.anchored_end && m.children.is_empty() => Some((m, *nav)),
        _ => None,
    }
}

fn texts<'t>(bindings: &[(CaptureId, Node<'t>)], id: CaptureId) -> Vec<&'t [u8]> {
    bindings
        .iter()
        .filter(|(capture, _)| *capture == id)
        .map(|(_, node)| node.text())
        .collect()
}
