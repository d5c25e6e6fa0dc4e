//! Numbering and table emission.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use sapwood_core::{
    Action, FieldId, Grammar, GrammarTable, LexMode, ParseState, Production, StateId, SymbolId,
    SymbolInfo, SymbolKind, TABLE_VERSION, TokenDef, TokenMatcher, TokenPattern,
};
use tracing::{debug, trace};

use super::error::GenerateError;
use super::lalr::Automaton;
use super::prepare::{GSymbol, Prepared};
use crate::definition::GrammarDefinition;

struct Numbering {
    externals: usize,
    variables: usize,
}

impl Numbering {
    fn new(prepared: &Prepared) -> Self {
        let externals = prepared.terminals.len();
        Self {
            externals,
            variables: externals + prepared.externals.len(),
        }
    }

    fn id(&self, symbol: GSymbol) -> SymbolId {
        (match symbol {
            GSymbol::Terminal(t) => t,
            GSymbol::External(e) => self.externals + e,
            GSymbol::NonTerminal(n) => self.variables + n,
        }) as SymbolId
    }
}

pub(crate) fn emit(
    definition: &GrammarDefinition,
    prepared: &Prepared,
    automaton: &Automaton,
) -> Result<GrammarTable, GenerateError> {
    let numbering = Numbering::new(prepared);
    let mut symbols = symbol_infos(prepared);

    let fields: Vec<String> = prepared
        .productions
        .iter()
        .flat_map(|p| p.steps.iter().filter_map(|s| s.field.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let field_id = |name: &str| -> FieldId {
        let index = fields.binary_search_by(|f| f.as_str().cmp(name)).unwrap_or(0);
        FieldId::new(index as u16 + 1).unwrap_or(FieldId::MIN)
    };

    let mut displayed: HashMap<(String, bool), SymbolId> = HashMap::new();
    for (id, symbol) in symbols.iter().enumerate() {
        if symbol.visible {
            displayed
                .entry((symbol.name.clone(), symbol.named))
                .or_insert(id as SymbolId);
        }
    }

    let mut productions = Vec::with_capacity(prepared.productions.len());
    // Fields reachable from an aliased node, keyed by the displayed symbol.
    let mut alias_sources: Vec<(SymbolId, GSymbol)> = Vec::new();
    for production in &prepared.productions {
        let mut fields = Vec::new();
        let mut aliases = Vec::new();
        for (index, step) in production.steps.iter().enumerate() {
            if let Some(field) = &step.field {
                fields.push((index as u16, field_id(field)));
            }
            if let Some((name, named)) = &step.alias {
                let target = *displayed.entry((name.clone(), *named)).or_insert_with(|| {
                    symbols.push(SymbolInfo {
                        name: name.clone(),
                        named: *named,
                        visible: true,
                        kind: SymbolKind::Alias,
                        extra: false,
                    });
                    (symbols.len() - 1) as SymbolId
                });
                aliases.push((index as u16, target));
                alias_sources.push((target, step.symbol));
            }
        }
        let (precedence, associativity) = production.precedence();
        productions.push(Production {
            lhs: numbering.id(GSymbol::NonTerminal(production.lhs)),
            child_count: production.steps.len() as u16,
            precedence,
            associativity,
            fields,
            aliases,
        });
    }

    if symbols.len() >= Grammar::UNKNOWN as usize {
        return Err(GenerateError::TooManySymbols(symbols.len()));
    }
    if automaton.states.len() > StateId::MAX as usize {
        return Err(GenerateError::TooManySymbols(automaton.states.len()));
    }

    let mut lex_modes: Vec<LexMode> = Vec::new();
    let mut lex_mode_ids: HashMap<LexMode, u16> = HashMap::new();
    let mut states = Vec::with_capacity(automaton.states.len());
    let mut conflicts = 0usize;

    for (state_id, state) in automaton.states.iter().enumerate() {
        let mut actions: BTreeMap<SymbolId, Vec<Action>> = BTreeMap::new();
        let mut gotos = Vec::new();

        for (&symbol, &target) in &state.transitions {
            if let GSymbol::NonTerminal(_) = symbol {
                gotos.push((numbering.id(symbol), target as StateId));
                continue;
            }
            // Items that shift this terminal directly or through a
            // non-terminal starting with it lend it their precedence.
            let precedence = prepared
                .lookahead_index(symbol)
                .and_then(|lookahead| {
                    state
                        .items
                        .iter()
                        .filter_map(|item| {
                            automaton.productions[item.production].steps.get(item.dot)
                        })
                        .filter(|step| {
                            automaton
                                .first_sets
                                .begins_with(prepared, step.symbol, lookahead)
                        })
                        .map(|step| step.precedence)
                        .max()
                })
                .unwrap_or(0);
            actions.entry(numbering.id(symbol)).or_default().push(Action::Shift {
                state: target as StateId,
                precedence,
            });
        }

        let mut completed: Vec<_> = state
            .items
            .iter()
            .filter(|item| item.dot == automaton.productions[item.production].steps.len())
            .collect();
        completed.sort_by_key(|item| item.production);
        for item in completed {
            for index in item.lookahead.iter() {
                let terminal = numbering.id(prepared.lookahead_symbol(index));
                let action = if item.production == automaton.augmented {
                    Action::Accept
                } else {
                    Action::Reduce {
                        production: item.production as u16,
                    }
                };
                actions.entry(terminal).or_default().push(action);
            }
        }

        let mut mode = LexMode::default();
        for (&terminal, list) in &actions {
            if list.len() > 1 {
                conflicts += 1;
                trace!(
                    state = state_id,
                    symbol = %symbols[terminal as usize].name,
                    actions = list.len(),
                    "conflict kept in table"
                );
            }
            let info = &symbols[terminal as usize];
            match info.kind {
                SymbolKind::External => mode.externals.push(terminal),
                _ if terminal != Grammar::END && !info.extra => mode.terminals.push(terminal),
                _ => {}
            }
        }
        let lex_mode = *lex_mode_ids.entry(mode.clone()).or_insert_with(|| {
            lex_modes.push(mode);
            (lex_modes.len() - 1) as u16
        });

        states.push(ParseState {
            actions: actions.into_iter().collect(),
            gotos,
            lex_mode,
        });
    }
    if conflicts > 0 {
        debug!(
            grammar = %definition.name,
            conflicts,
            declared = definition.conflicts.len(),
            "grammar has conflicts"
        );
    }

    let tokens = token_defs(prepared)?;
    let word = prepared.word.map(|w| w as SymbolId);
    let fields_by_kind = fields_by_kind(prepared, &numbering, &alias_sources, &field_id);

    Ok(GrammarTable {
        name: definition.name.clone(),
        version: TABLE_VERSION,
        symbols,
        fields,
        productions,
        states,
        lex_modes,
        tokens,
        start: numbering.id(GSymbol::NonTerminal(0)),
        word,
        fields_by_kind,
    })
}

fn symbol_infos(prepared: &Prepared) -> Vec<SymbolInfo> {
    let terminals = prepared.terminals.iter().map(|t| SymbolInfo {
        name: t.name.clone(),
        named: t.named,
        visible: t.visible,
        kind: SymbolKind::Terminal,
        extra: t.extra,
    });
    let externals = prepared.externals.iter().map(|e| SymbolInfo {
        name: e.name.clone(),
        named: e.named,
        visible: e.visible,
        kind: SymbolKind::External,
        extra: false,
    });
    let variables = prepared.variables.iter().map(|v| SymbolInfo {
        name: v.name.clone(),
        named: true,
        visible: v.visible,
        kind: SymbolKind::NonTerminal,
        extra: false,
    });
    terminals.chain(externals).chain(variables).collect()
}

fn token_defs(prepared: &Prepared) -> Result<Vec<TokenDef>, GenerateError> {
    let word = match prepared.word.map(|w| &prepared.terminals[w]) {
        Some(token) => Some(matcher(&token.name, &token.pattern)?),
        None => None,
    };

    let mut tokens = Vec::with_capacity(prepared.terminals.len() + prepared.externals.len());
    for token in &prepared.terminals {
        if token.pattern != TokenPattern::End {
            matcher(&token.name, &token.pattern)?;
        }
        let keyword = match (&token.pattern, &word) {
            (TokenPattern::Literal(text), Some(word)) if !token.named => {
                word.longest_match(text.as_bytes(), 0).len == Some(text.len())
            }
            _ => false,
        };
        tokens.push(TokenDef {
            pattern: token.pattern.clone(),
            keyword,
        });
    }
    tokens.extend(prepared.externals.iter().map(|_| TokenDef {
        pattern: TokenPattern::External,
        keyword: false,
    }));
    Ok(tokens)
}

fn matcher(name: &str, pattern: &TokenPattern) -> Result<TokenMatcher, GenerateError> {
    let matcher = match pattern {
        TokenPattern::Literal(text) => TokenMatcher::literal(text),
        TokenPattern::Regex(regex) => {
            TokenMatcher::regex(regex).map_err(|message| GenerateError::InvalidToken {
                name: name.to_owned(),
                message,
            })?
        }
        TokenPattern::End | TokenPattern::External => {
            return Err(GenerateError::InvalidToken {
                name: name.to_owned(),
                message: "not a lexical token".to_owned(),
            });
        }
    };
    if matcher.matches_empty() {
        return Err(GenerateError::InvalidToken {
            name: name.to_owned(),
            message: "matches the empty string".to_owned(),
        });
    }
    Ok(matcher)
}

/// Fields a node of each visible kind can carry on its children, looking
/// through hidden children whose own children are spliced in.
fn fields_by_kind(
    prepared: &Prepared,
    numbering: &Numbering,
    alias_sources: &[(SymbolId, GSymbol)],
    field_id: &dyn Fn(&str) -> FieldId,
) -> Vec<(SymbolId, Vec<FieldId>)> {
    let count = prepared.variables.len();
    let mut direct: Vec<BTreeSet<FieldId>> = vec![BTreeSet::new(); count];
    let mut hidden: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
    for production in &prepared.productions {
        for step in &production.steps {
            if let Some(field) = &step.field {
                direct[production.lhs].insert(field_id(field));
            }
            if let GSymbol::NonTerminal(child) = step.symbol
                && step.alias.is_none()
                && !prepared.variables[child].visible
            {
                hidden[production.lhs].insert(child);
            }
        }
    }

    let mut reachable = direct;
    let mut changed = true;
    while changed {
        changed = false;
        for variable in 0..count {
            for &child in &hidden[variable] {
                let inherited: Vec<FieldId> = reachable[child].iter().copied().collect();
                for field in inherited {
                    changed |= reachable[variable].insert(field);
                }
            }
        }
    }

    let mut by_kind: BTreeMap<SymbolId, BTreeSet<FieldId>> = BTreeMap::new();
    for (variable, fields) in reachable.iter().enumerate() {
        if prepared.variables[variable].visible && !fields.is_empty() {
            by_kind
                .entry(numbering.id(GSymbol::NonTerminal(variable)))
                .or_default()
                .extend(fields);
        }
    }
    for &(target, source) in alias_sources {
        if let GSymbol::NonTerminal(variable) = source
            && !reachable[variable].is_empty()
        {
            by_kind
                .entry(target)
                .or_default()
                .extend(&reachable[variable]);
        }
    }
    by_kind
        .into_iter()
        .map(|(kind, fields)| (kind, fields.into_iter().collect()))
        .collect()
}
