//! Validated, ready-to-run grammar.

use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use super::error::GrammarError;
use super::scanner::ExternalScanner;
use super::table::{
    Action, FieldId, GrammarTable, LexMode, ParseState, Production, StateId, SymbolId,
    SymbolInfo, SymbolKind, TABLE_VERSION, TokenPattern,
};
use super::token::TokenMatcher;

/// Compiled language table shared by parsers and query compilers.
///
/// Immutable after construction; wrap it in an `Arc` to share it between
/// threads.
pub struct Grammar {
    table: GrammarTable,
    matchers: Vec<Option<TokenMatcher>>,
    scanner: Option<Arc<dyn ExternalScanner>>,
    externals: Range<SymbolId>,
    extras: Vec<SymbolId>,
    kinds: HashMap<(String, bool), SymbolId>,
    /// Per symbol, the first visible symbol displayed the same way.
    canonical: Vec<SymbolId>,
    field_ids: HashMap<String, FieldId>,
    fields_by_kind: HashMap<SymbolId, Vec<FieldId>>,
    fingerprint: u64,
}

impl Grammar {
    /// End of input.
    pub const END: SymbolId = 0;
    /// Kind of nodes that cover input the grammar could not parse.
    pub const ERROR: SymbolId = SymbolId::MAX;
    /// Hidden kind for bytes no token matches; always inside an `ERROR` node.
    pub const UNKNOWN: SymbolId = SymbolId::MAX - 1;

    pub fn new(
        table: GrammarTable,
        scanner: Option<Arc<dyn ExternalScanner>>,
    ) -> Result<Self, GrammarError> {
        if table.version != TABLE_VERSION {
            return Err(GrammarError::UnsupportedVersion {
                found: table.version,
                expected: TABLE_VERSION,
            });
        }
        validate(&table)?;

        let token_count = table.tokens.len() as SymbolId;
        let first_external = table
            .symbols
            .iter()
            .position(|s| s.kind == SymbolKind::External)
            .map_or(token_count, |i| i as SymbolId);
        let externals = first_external..token_count;
        if !externals.is_empty() && scanner.is_none() {
            return Err(GrammarError::MissingScanner {
                grammar: table.name.clone(),
            });
        }

        let mut matchers = Vec::with_capacity(table.tokens.len());
        for (id, token) in table.tokens.iter().enumerate() {
            let name = &table.symbols[id].name;
            let matcher = match &token.pattern {
                TokenPattern::End | TokenPattern::External => None,
                TokenPattern::Literal(text) => Some(TokenMatcher::literal(text)),
                TokenPattern::Regex(pattern) => {
                    Some(TokenMatcher::regex(pattern).map_err(|message| {
                        GrammarError::Token {
                            name: name.clone(),
                            message,
                        }
                    })?)
                }
            };
            if matcher.as_ref().is_some_and(TokenMatcher::matches_empty) {
                return Err(GrammarError::EmptyToken { name: name.clone() });
            }
            matchers.push(matcher);
        }

        let extras = (0..token_count)
            .filter(|&id| table.symbols[id as usize].extra)
            .collect();

        let mut kinds = HashMap::new();
        let mut canonical = Vec::with_capacity(table.symbols.len());
        for (id, symbol) in table.symbols.iter().enumerate() {
            let id = id as SymbolId;
            if symbol.visible {
                let first = *kinds
                    .entry((symbol.name.clone(), symbol.named))
                    .or_insert(id);
                canonical.push(first);
            } else {
                canonical.push(id);
            }
        }
        kinds.insert(("ERROR".to_owned(), true), Self::ERROR);

        let field_ids = table
            .fields
            .iter()
            .enumerate()
            .filter_map(|(i, name)| Some((name.clone(), FieldId::new(i as u16 + 1)?)))
            .collect();
        let mut fields_by_kind: HashMap<SymbolId, Vec<FieldId>> = HashMap::new();
        for (kind, fields) in &table.fields_by_kind {
            let merged = fields_by_kind.entry(canonical[*kind as usize]).or_default();
            merged.extend(fields);
            merged.sort_unstable();
            merged.dedup();
        }

        let mut hasher = DefaultHasher::new();
        table.name.hash(&mut hasher);
        for symbol in &table.symbols {
            (&symbol.name, symbol.named, symbol.visible).hash(&mut hasher);
        }
        table.fields.hash(&mut hasher);
        let fingerprint = hasher.finish();

        debug!(
            grammar = %table.name,
            symbols = table.symbols.len(),
            states = table.states.len(),
            productions = table.productions.len(),
            "loaded grammar table"
        );

        Ok(Self {
            table,
            matchers,
            scanner,
            externals,
            extras,
            kinds,
            canonical,
            field_ids,
            fields_by_kind,
            fingerprint,
        })
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    pub fn table(&self) -> &GrammarTable {
        &self.table
    }

    pub fn version(&self) -> u32 {
        self.table.version
    }

    /// Stable identity of the node-kind and field vocabulary. Queries
    /// compiled against one grammar run on trees of any grammar with the
    /// same fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn symbol_count(&self) -> usize {
        self.table.symbols.len()
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&SymbolInfo> {
        self.table.symbols.get(id as usize)
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        match id {
            Self::ERROR => "ERROR",
            Self::UNKNOWN => "UNKNOWN",
            _ => self.symbol(id).map_or("", |s| s.name.as_str()),
        }
    }

    pub fn is_named(&self, id: SymbolId) -> bool {
        match id {
            Self::ERROR => true,
            Self::UNKNOWN => false,
            _ => self.symbol(id).is_some_and(|s| s.named),
        }
    }

    pub fn is_visible(&self, id: SymbolId) -> bool {
        match id {
            Self::ERROR => true,
            Self::UNKNOWN => false,
            _ => self.symbol(id).is_some_and(|s| s.visible),
        }
    }

    pub fn is_extra(&self, id: SymbolId) -> bool {
        self.symbol(id).is_some_and(|s| s.extra)
    }

    /// Terminals and externals, the symbols a lexer can produce.
    pub fn is_token(&self, id: SymbolId) -> bool {
        (id as usize) < self.table.tokens.len()
    }

    pub fn start_symbol(&self) -> SymbolId {
        self.table.start
    }

    pub fn word_token(&self) -> Option<SymbolId> {
        self.table.word
    }

    pub fn is_keyword(&self, id: SymbolId) -> bool {
        self.table.tokens.get(id as usize).is_some_and(|t| t.keyword)
    }

    pub fn token_matcher(&self, id: SymbolId) -> Option<&TokenMatcher> {
        self.matchers.get(id as usize)?.as_ref()
    }

    /// Terminal extras, valid between any two tokens.
    pub fn extras(&self) -> &[SymbolId] {
        &self.extras
    }

    pub fn externals(&self) -> Range<SymbolId> {
        self.externals.clone()
    }

    pub fn external_count(&self) -> usize {
        self.externals.len()
    }

    pub fn external_symbol(&self, index: usize) -> Option<SymbolId> {
        let id = self.externals.start.checked_add(index as SymbolId)?;
        self.externals.contains(&id).then_some(id)
    }

    pub fn external_index(&self, id: SymbolId) -> Option<usize> {
        self.externals
            .contains(&id)
            .then(|| (id - self.externals.start) as usize)
    }

    pub fn scanner(&self) -> Option<&Arc<dyn ExternalScanner>> {
        self.scanner.as_ref()
    }

    pub fn state_count(&self) -> usize {
        self.table.states.len()
    }

    pub fn state(&self, id: StateId) -> &ParseState {
        &self.table.states[id as usize]
    }

    /// Actions for `terminal` in `state`, in table order.
    pub fn actions(&self, state: StateId, terminal: SymbolId) -> &[Action] {
        let actions = &self.state(state).actions;
        match actions.binary_search_by_key(&terminal, |(t, _)| *t) {
            Ok(i) => &actions[i].1,
            Err(_) => &[],
        }
    }

    pub fn goto(&self, state: StateId, non_terminal: SymbolId) -> Option<StateId> {
        let gotos = &self.state(state).gotos;
        gotos
            .binary_search_by_key(&non_terminal, |(s, _)| *s)
            .ok()
            .map(|i| gotos[i].1)
    }

    pub fn lex_mode_id(&self, state: StateId) -> u16 {
        self.state(state).lex_mode
    }

    pub fn lex_mode(&self, state: StateId) -> &LexMode {
        &self.table.lex_modes[self.lex_mode_id(state) as usize]
    }

    pub fn production(&self, id: u16) -> &Production {
        &self.table.productions[id as usize]
    }

    pub fn field_count(&self) -> usize {
        self.table.fields.len()
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        self.table
            .fields
            .get(id.get() as usize - 1)
            .map_or("", String::as_str)
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.field_ids.get(name).copied()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.table.fields.iter().map(String::as_str)
    }

    /// Fields that can label children of a visible node kind.
    pub fn fields_for_kind(&self, kind: SymbolId) -> &[FieldId] {
        self.fields_by_kind
            .get(&self.canonical_kind(kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Representative id for a node kind: symbols that display with the same
    /// name and namedness (a token and an alias, say) share one.
    pub fn canonical_kind(&self, id: SymbolId) -> SymbolId {
        self.canonical.get(id as usize).copied().unwrap_or(id)
    }

    /// Resolve a node kind as it appears in trees and queries.
    pub fn id_for_node_kind(&self, name: &str, named: bool) -> Option<SymbolId> {
        self.kinds.get(&(name.to_owned(), named)).copied()
    }

    /// Names of visible node kinds, deduplicated, in symbol order.
    pub fn node_kind_names(&self, named: bool) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut names: Vec<&str> = self
            .table
            .symbols
            .iter()
            .filter(|s| s.visible && s.named == named)
            .map(|s| s.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect();
        if named {
            names.push("ERROR");
        }
        names
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.table.name)
            .field("symbols", &self.table.symbols.len())
            .field("states", &self.table.states.len())
            .field("scanner", &self.scanner.is_some())
            .finish()
    }
}

fn validate(table: &GrammarTable) -> Result<(), GrammarError> {
    let symbol_count = table.symbols.len();
    if symbol_count == 0 || symbol_count >= Grammar::UNKNOWN as usize {
        return Err(GrammarError::invalid(format!(
            "symbol count {symbol_count} out of range"
        )));
    }
    if table.symbols[0].kind != SymbolKind::Terminal {
        return Err(GrammarError::invalid("symbol 0 must be the end terminal"));
    }

    let rank = |kind: SymbolKind| match kind {
        SymbolKind::Terminal => 0,
        SymbolKind::External => 1,
        SymbolKind::NonTerminal => 2,
        SymbolKind::Alias => 3,
    };
    if table
        .symbols
        .windows(2)
        .any(|w| rank(w[0].kind) > rank(w[1].kind))
    {
        return Err(GrammarError::invalid(
            "symbols must be ordered terminals, externals, non-terminals, aliases",
        ));
    }

    let token_count = table
        .symbols
        .iter()
        .take_while(|s| matches!(s.kind, SymbolKind::Terminal | SymbolKind::External))
        .count();
    if table.tokens.len() != token_count {
        return Err(GrammarError::invalid(format!(
            "{} token definitions for {token_count} tokens",
            table.tokens.len()
        )));
    }
    for (id, token) in table.tokens.iter().enumerate() {
        let external = table.symbols[id].kind == SymbolKind::External;
        let consistent = match token.pattern {
            TokenPattern::End => id == 0,
            TokenPattern::External => external,
            TokenPattern::Literal(_) | TokenPattern::Regex(_) => id != 0 && !external,
        };
        if !consistent {
            return Err(GrammarError::invalid(format!(
                "token `{}` has a pattern that does not fit its kind",
                table.symbols[id].name
            )));
        }
    }

    let is_token = |id: SymbolId| (id as usize) < token_count;
    let is_non_terminal = |id: SymbolId| {
        table
            .symbols
            .get(id as usize)
            .is_some_and(|s| s.kind == SymbolKind::NonTerminal)
    };
    let is_displayable = |id: SymbolId| (id as usize) < symbol_count;
    let field_ok = |field: FieldId| (field.get() as usize) <= table.fields.len();

    if !is_non_terminal(table.start) {
        return Err(GrammarError::invalid("start symbol must be a non-terminal"));
    }
    if let Some(word) = table.word
        && (!is_token(word) || table.symbols[word as usize].kind != SymbolKind::Terminal)
    {
        return Err(GrammarError::invalid("word token must be a terminal"));
    }

    for (i, production) in table.productions.iter().enumerate() {
        let fields_ok = production
            .fields
            .iter()
            .all(|&(index, field)| index < production.child_count && field_ok(field));
        let aliases_ok = production
            .aliases
            .iter()
            .all(|&(index, alias)| index < production.child_count && is_displayable(alias));
        if !is_non_terminal(production.lhs) || !fields_ok || !aliases_ok {
            return Err(GrammarError::invalid(format!("production {i} is inconsistent")));
        }
    }

    if table.states.is_empty() {
        return Err(GrammarError::invalid("table has no parse states"));
    }
    let state_count = table.states.len();
    for (i, state) in table.states.iter().enumerate() {
        if state.lex_mode as usize >= table.lex_modes.len() {
            return Err(GrammarError::invalid(format!(
                "state {i} refers to a missing lex mode"
            )));
        }
        let sorted = state.actions.windows(2).all(|w| w[0].0 < w[1].0)
            && state.gotos.windows(2).all(|w| w[0].0 < w[1].0);
        if !sorted {
            return Err(GrammarError::invalid(format!("state {i} is not sorted")));
        }
        for (terminal, actions) in &state.actions {
            if !is_token(*terminal) {
                return Err(GrammarError::invalid(format!(
                    "state {i} has an action on non-terminal {terminal}"
                )));
            }
            for action in actions {
                let ok = match *action {
                    Action::Shift { state, .. } => (state as usize) < state_count,
                    Action::Reduce { production } => {
                        (production as usize) < table.productions.len()
                    }
                    Action::Accept => *terminal == Grammar::END,
                };
                if !ok {
                    return Err(GrammarError::invalid(format!(
                        "state {i} has an action out of range"
                    )));
                }
            }
        }
        for &(symbol, target) in &state.gotos {
            if !is_non_terminal(symbol) || target as usize >= state_count {
                return Err(GrammarError::invalid(format!(
                    "state {i} has a goto out of range"
                )));
            }
        }
    }

    for (i, mode) in table.lex_modes.iter().enumerate() {
        let terminals_ok = mode
            .terminals
            .iter()
            .all(|&t| is_token(t) && table.symbols[t as usize].kind == SymbolKind::Terminal);
        let externals_ok = mode
            .externals
            .iter()
            .all(|&t| is_token(t) && table.symbols[t as usize].kind == SymbolKind::External);
        if !terminals_ok || !externals_ok {
            return Err(GrammarError::invalid(format!(
                "lex mode {i} lists a symbol that is not a token"
            )));
        }
    }

    for (kind, fields) in &table.fields_by_kind {
        if !is_displayable(*kind) || !fields.iter().all(|&f| field_ok(f)) {
            return Err(GrammarError::invalid("field table is out of range"));
        }
    }

    Ok(())
}
