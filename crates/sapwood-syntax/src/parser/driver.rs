use std::sync::Arc;

use sapwood_core::{Action, Associativity, Grammar, SourceBuffer, StateId, SymbolId};
use tracing::trace;

use super::options::ParseOptions;
use super::reuse::ReuseCursor;
use crate::arena::{
    Arena, NO_PRODUCTION, NO_STATE, NodeData, NodeRef, SegmentBuilder, flags,
};
use crate::lexer::{Lexer, Token};

#[derive(Debug, Clone)]
pub(super) struct StackEntry {
    /// State after pushing `node`.
    pub state: StateId,
    /// `None` only for the bottom entry.
    pub node: Option<NodeRef>,
    /// Where the node's padding begins.
    pub start: usize,
    pub extra: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub(super) struct Stats {
    pub shifts: usize,
    pub reductions: usize,
    pub reused: usize,
    pub errors: usize,
}

/// State of one parse from the first byte to the accepted root.
pub(super) struct Run<'a> {
    pub grammar: &'a Grammar,
    pub options: ParseOptions,
    pub input: &'a [u8],
    lexer: Lexer<'a>,
    /// Segments of the previous tree, shared by the result.
    pub arena: Arena,
    pub builder: SegmentBuilder,
    pub stack: Vec<StackEntry>,
    pub lookahead: Option<Token>,
    /// Where the next token's padding begins.
    pub position: usize,
    /// Scanner state after the last consumed token.
    pub scanner: Arc<[u8]>,
    /// Lex mode a fresh parse would use for the next token, known after a
    /// reused subtree was pushed without lexing its successor.
    pub lex_mode_override: Option<u16>,
    pub reuse: Option<ReuseCursor<'a>>,
    /// Position and symbol of the last pop recovery; allowed once per token.
    pub popped_at: Option<(usize, SymbolId)>,
    /// Position where a zero-width external token was skipped as an error.
    pub no_external_at: Option<usize>,
    pub reductions_since_shift: u32,
    pub stats: Stats,
}

impl<'a> Run<'a> {
    pub fn new(
        grammar: &'a Grammar,
        options: ParseOptions,
        source: &'a SourceBuffer,
        arena: Arena,
        reuse: Option<ReuseCursor<'a>>,
    ) -> Self {
        let builder = SegmentBuilder::new(arena.segment_count());
        Self {
            grammar,
            options,
            input: source.as_bytes(),
            lexer: Lexer::new(grammar, source.as_bytes()),
            arena,
            builder,
            stack: vec![StackEntry {
                state: 0,
                node: None,
                start: 0,
                extra: false,
            }],
            lookahead: None,
            position: 0,
            scanner: Arc::from(&[][..]),
            lex_mode_override: None,
            reuse,
            popped_at: None,
            no_external_at: None,
            reductions_since_shift: 0,
            stats: Stats::default(),
        }
    }

    /// Drive the table until the input is accepted.
    pub fn finish(mut self) -> (Arena, NodeRef, Stats) {
        let root = loop {
            if let Some(node) = self.try_reuse() {
                self.push_reused(node);
                continue;
            }

            let token = match self.lookahead.take() {
                Some(token) => token,
                None => self.lex(),
            };
            if token.extra {
                self.shift_extra(token);
                continue;
            }

            let state = self.top_state();
            match resolve(self.grammar, self.grammar.actions(state, token.symbol)) {
                Some(Action::Shift { state: next, .. }) => self.shift(token, state, next),
                Some(Action::Reduce { production }) => {
                    self.reductions_since_shift += 1;
                    if self.reductions_since_shift > self.options.reduction_fuel {
                        trace!(position = token.start, "reduction fuel exhausted");
                        self.skip(token);
                        continue;
                    }
                    self.reduce(production, &token);
                    self.lookahead = Some(token);
                }
                Some(Action::Accept) => break self.accept(&token),
                None => {
                    if let Some(root) = self.recover(token) {
                        break root;
                    }
                }
            }
        };

        let Self {
            mut arena,
            builder,
            stats,
            ..
        } = self;
        arena.push_segment(builder.finish());
        (arena, root, stats)
    }

    pub fn top_state(&self) -> StateId {
        self.stack.last().map_or(0, |e| e.state)
    }

    pub fn current_lex_mode(&self) -> u16 {
        self.lex_mode_override
            .unwrap_or_else(|| self.grammar.lex_mode_id(self.top_state()))
    }

    fn lex(&self) -> Token {
        let allow_external = self.no_external_at != Some(self.position);
        let token = self.lexer.lex(
            self.position,
            self.current_lex_mode(),
            &self.scanner,
            allow_external,
        );
        trace!(
            symbol = self.grammar.symbol_name(token.symbol),
            start = token.content_start(),
            end = token.end(),
            "lexed"
        );
        token
    }

    pub fn data(&self, node: NodeRef) -> &NodeData {
        self.builder
            .get(node)
            .unwrap_or_else(|| self.arena.get(node))
    }

    pub fn children_of(&self, node: NodeRef) -> &[NodeRef] {
        self.builder
            .children(node)
            .unwrap_or_else(|| self.arena.children(node))
    }

    fn state_after(&self, node: NodeRef) -> Arc<[u8]> {
        match self.builder.get(node) {
            Some(data) => self.builder.state(data.scanner_after).clone(),
            None => self.arena.scanner_after(node).clone(),
        }
    }

    fn state_before(&self, node: NodeRef) -> Arc<[u8]> {
        match self.builder.get(node) {
            Some(data) => self.builder.state(data.scanner_before).clone(),
            None => self.arena.scanner_before(node).clone(),
        }
    }

    /// Offset just past the top entry's node.
    pub fn top_end(&self) -> usize {
        match self.stack.last() {
            Some(StackEntry {
                node: Some(node),
                start,
                ..
            }) => start + self.data(*node).total(),
            _ => 0,
        }
    }

    pub fn leaf(&mut self, token: &Token, parse_state: StateId, extra: bool) -> NodeRef {
        let mut node_flags = flags::LEAF;
        if extra {
            node_flags |= flags::EXTRA;
        }
        if token.symbol == Grammar::UNKNOWN {
            node_flags |= flags::HAS_ERROR;
        }
        let scanner_before = self.builder.intern_state(&token.scanner_before);
        let scanner_after = self.builder.intern_state(&token.scanner_after);
        let data = NodeData {
            symbol: token.symbol,
            production: NO_PRODUCTION,
            flags: node_flags,
            padding: token.padding as u32,
            size: token.size as u32,
            lookahead: token.examined_end.saturating_sub(token.end()) as u32,
            parse_state,
            lex_mode: token.lex_mode,
            next_lex_mode: token.lex_mode,
            scanner_before,
            scanner_after,
            children_start: 0,
            children_len: 0,
        };
        self.builder.push(data, &[])
    }

    /// Build an interior node over `children`, which begin at `start`.
    ///
    /// `lookahead` is the token that triggered the reduction; its examined
    /// range is part of what the node depends on.
    pub fn branch(
        &mut self,
        symbol: SymbolId,
        production: u16,
        children: &[NodeRef],
        start: usize,
        parse_state: StateId,
        extra_flags: u8,
        lookahead: Option<&Token>,
    ) -> NodeRef {
        let mut total = 0;
        let mut reach = start;
        let mut node_flags = extra_flags;
        for &child in children {
            let data = self.data(child);
            reach = reach.max(start + total + data.total() + data.lookahead as usize);
            total += data.total();
            if data.has_error() {
                node_flags |= flags::HAS_ERROR;
            }
        }
        if let Some(token) = lookahead {
            reach = reach.max(token.examined_end);
        }
        let end = start + total;

        let (padding, lex_mode, before, after) = match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => (
                self.data(first).padding,
                self.data(first).lex_mode,
                self.state_before(first),
                self.state_after(last),
            ),
            _ => {
                let state = self.scanner_at_top();
                let mode = lookahead.map_or_else(|| self.current_lex_mode(), |t| t.lex_mode);
                (0, mode, state.clone(), state)
            }
        };
        let scanner_before = self.builder.intern_state(&before);
        let scanner_after = self.builder.intern_state(&after);

        let data = NodeData {
            symbol,
            production,
            flags: node_flags,
            padding,
            size: (total as u32).saturating_sub(padding),
            lookahead: reach.saturating_sub(end) as u32,
            parse_state,
            lex_mode,
            next_lex_mode: lookahead.map_or(lex_mode, |t| t.lex_mode),
            scanner_before,
            scanner_after,
            children_start: 0,
            children_len: 0,
        };
        self.builder.push(data, children)
    }

    /// Scanner state after the topmost non-extra entry.
    fn scanner_at_top(&self) -> Arc<[u8]> {
        self.stack
            .iter()
            .rev()
            .filter(|e| !e.extra)
            .find_map(|e| e.node)
            .map_or_else(|| Arc::from(&[][..]), |node| self.state_after(node))
    }

    pub fn consume(&mut self, token: &Token) {
        self.position = token.end();
        self.scanner = token.scanner_after.clone();
        self.reductions_since_shift = 0;
    }

    fn shift(&mut self, token: Token, state: StateId, next: StateId) {
        trace!(
            symbol = self.grammar.symbol_name(token.symbol),
            state,
            next,
            "shift"
        );
        let node = self.leaf(&token, state, false);
        self.stack.push(StackEntry {
            state: next,
            node: Some(node),
            start: token.start,
            extra: false,
        });
        self.consume(&token);
        self.lex_mode_override = None;
        self.stats.shifts += 1;
    }

    fn shift_extra(&mut self, token: Token) {
        let state = self.top_state();
        let node = self.leaf(&token, state, true);
        self.stack.push(StackEntry {
            state,
            node: Some(node),
            start: token.start,
            extra: true,
        });
        self.consume(&token);
    }

    fn reduce(&mut self, production_id: u16, lookahead: &Token) {
        let grammar = self.grammar;
        let production = grammar.production(production_id);

        let mut trailing = Vec::new();
        while self.stack.len() > 1 && self.stack.last().is_some_and(|e| e.extra) {
            trailing.extend(self.stack.pop());
        }

        let mut popped = Vec::new();
        let mut remaining = production.child_count;
        while remaining > 0 && self.stack.len() > 1 {
            let Some(entry) = self.stack.pop() else {
                break;
            };
            if !entry.extra {
                remaining -= 1;
            }
            popped.push(entry);
        }
        popped.reverse();

        let below = self.top_state();
        let start = popped.first().map_or_else(|| self.top_end(), |e| e.start);
        let children: Vec<NodeRef> = popped.iter().filter_map(|e| e.node).collect();

        trace!(
            lhs = grammar.symbol_name(production.lhs),
            production = production_id,
            children = children.len(),
            "reduce"
        );

        let state = match grammar.goto(below, production.lhs) {
            Some(next) => {
                let node = self.branch(
                    production.lhs,
                    production_id,
                    &children,
                    start,
                    below,
                    0,
                    Some(lookahead),
                );
                self.stack.push(StackEntry {
                    state: next,
                    node: Some(node),
                    start,
                    extra: false,
                });
                next
            }
            None => {
                let node = self.branch(
                    Grammar::ERROR,
                    NO_PRODUCTION,
                    &children,
                    start,
                    below,
                    flags::EXTRA | flags::HAS_ERROR,
                    None,
                );
                self.stats.errors += 1;
                self.stack.push(StackEntry {
                    state: below,
                    node: Some(node),
                    start,
                    extra: true,
                });
                below
            }
        };

        for mut entry in trailing.into_iter().rev() {
            entry.state = state;
            self.stack.push(entry);
        }
        self.stats.reductions += 1;
    }

    /// Build the root from the start symbol's children and every extra left
    /// on the stack. The root spans the whole input.
    fn accept(&mut self, end: &Token) -> NodeRef {
        let mut children = Vec::new();
        let mut production = NO_PRODUCTION;
        let mut symbol = self.grammar.start_symbol();
        let entries = std::mem::take(&mut self.stack);
        for entry in entries.iter().skip(1) {
            let Some(node) = entry.node else { continue };
            if entry.extra {
                children.push(node);
                continue;
            }
            let data = *self.data(node);
            symbol = data.symbol;
            production = data.production;
            children.extend_from_slice(self.children_of(node));
        }
        trace!(children = children.len(), "accept");
        self.root(symbol, production, &children, end)
    }

    pub fn root(
        &mut self,
        symbol: SymbolId,
        production: u16,
        children: &[NodeRef],
        end: &Token,
    ) -> NodeRef {
        let has_error = symbol == Grammar::ERROR
            || children.iter().any(|&c| self.data(c).has_error());
        let data = NodeData {
            symbol,
            production,
            flags: if has_error { flags::HAS_ERROR } else { 0 },
            padding: 0,
            size: self.input.len() as u32,
            lookahead: end.examined_end.saturating_sub(self.input.len()) as u32,
            parse_state: NO_STATE,
            lex_mode: end.lex_mode,
            next_lex_mode: end.lex_mode,
            scanner_before: 0,
            scanner_after: 0,
            children_start: 0,
            children_len: 0,
        };
        self.builder.push(data, children)
    }
}

/// Pick one action from a conflicting list: higher precedence wins, equal
/// precedence between a shift and a reduce follows the reduce's
/// associativity, anything else keeps the earlier action.
pub(super) fn resolve(grammar: &Grammar, actions: &[Action]) -> Option<Action> {
    let (first, rest) = actions.split_first()?;
    Some(
        rest.iter()
            .fold(*first, |best, &candidate| prefer(grammar, best, candidate)),
    )
}

fn prefer(grammar: &Grammar, current: Action, candidate: Action) -> Action {
    let precedence = |action: Action| match action {
        Action::Shift { precedence, .. } => precedence,
        Action::Reduce { production } => grammar.production(production).precedence,
        Action::Accept => 0,
    };
    let (ours, theirs) = (precedence(current), precedence(candidate));
    if theirs != ours {
        return if theirs > ours { candidate } else { current };
    }

    let associativity = |production: u16| grammar.production(production).associativity;
    match (current, candidate) {
        (Action::Shift { .. }, Action::Reduce { production }) => {
            match associativity(production) {
                Associativity::Left => candidate,
                Associativity::Right | Associativity::None => current,
            }
        }
        (Action::Reduce { production }, Action::Shift { .. }) => {
            match associativity(production) {
                Associativity::Right => candidate,
                Associativity::Left | Associativity::None => current,
            }
        }
        _ => current,
    }
}
