//! Error recovery.
//!
//! Two strategies, tried in order when the current state has no action for
//! the lookahead:
//!
//! 1. Pop the stack down to the nearest state that can act on the token and
//!    wrap everything popped in an `ERROR` node. Allowed once per token.
//! 2. Skip the token, wrapping it in an `ERROR` node. Consecutive skips grow
//!    the same `ERROR` node.
//!
//! `ERROR` nodes are pushed as extras, so they never change the LR state.

use sapwood_core::Grammar;
use tracing::trace;

use super::driver::{Run, StackEntry};
use crate::arena::{NO_PRODUCTION, NodeRef, flags};
use crate::lexer::Token;

impl Run<'_> {
    /// Returns the root when the input ended in a state nothing can rescue.
    pub(super) fn recover(&mut self, token: Token) -> Option<NodeRef> {
        self.stats.errors += 1;
        let key = (token.start, token.symbol);
        if self.popped_at != Some(key) {
            let grammar = self.grammar;
            let below_top = self.stack.len().saturating_sub(1);
            let target = (0..below_top)
                .rev()
                .find(|&i| !grammar.actions(self.stack[i].state, token.symbol).is_empty());
            if let Some(target) = target {
                trace!(
                    symbol = grammar.symbol_name(token.symbol),
                    popped = below_top - target,
                    "recover by popping"
                );
                self.popped_at = Some(key);
                self.pop_into_error(target);
                self.lookahead = Some(token);
                return None;
            }
        }

        if token.symbol == Grammar::END {
            trace!("unrecoverable end of input");
            return Some(self.error_root(&token));
        }
        self.skip(token);
        None
    }

    fn pop_into_error(&mut self, target: usize) {
        let popped = self.stack.split_off(target + 1);
        let state = self.stack[target].state;
        let start = popped.first().map_or(self.position, |e| e.start);
        let children: Vec<NodeRef> = popped.iter().filter_map(|e| e.node).collect();
        let node = self.branch(
            Grammar::ERROR,
            NO_PRODUCTION,
            &children,
            start,
            state,
            flags::EXTRA | flags::HAS_ERROR,
            None,
        );
        self.stack.push(StackEntry {
            state,
            node: Some(node),
            start,
            extra: true,
        });
    }

    /// Consume `token` into an `ERROR` node.
    pub(super) fn skip(&mut self, token: Token) {
        trace!(
            symbol = self.grammar.symbol_name(token.symbol),
            start = token.content_start(),
            "skip"
        );
        let state = self.top_state();
        let leaf = self.leaf(&token, state, false);

        let previous = match self.stack.last() {
            Some(&StackEntry {
                node: Some(node),
                extra: true,
                start,
                ..
            }) if self.data(node).symbol == Grammar::ERROR => Some((node, start)),
            _ => None,
        };
        let (start, children) = match previous {
            Some((node, start)) => {
                self.stack.pop();
                let mut children = self.children_of(node).to_vec();
                children.push(leaf);
                (start, children)
            }
            None => (token.start, vec![leaf]),
        };

        let node = self.branch(
            Grammar::ERROR,
            NO_PRODUCTION,
            &children,
            start,
            state,
            flags::EXTRA | flags::HAS_ERROR,
            None,
        );
        self.stack.push(StackEntry {
            state,
            node: Some(node),
            start,
            extra: true,
        });

        if token.size == 0 {
            self.no_external_at = Some(token.end());
        }
        self.consume(&token);
        self.lex_mode_override = None;
    }

    /// Root for input whose end the table cannot accept: one `ERROR` node
    /// holding everything parsed so far.
    fn error_root(&mut self, end: &Token) -> NodeRef {
        let entries = std::mem::take(&mut self.stack);
        let children: Vec<NodeRef> = entries.iter().filter_map(|e| e.node).collect();
        self.root(Grammar::ERROR, NO_PRODUCTION, &children, end)
    }
}
