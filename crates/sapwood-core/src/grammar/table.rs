//! Serializable table types.

use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

/// Version written into every table; bumped whenever the layout changes.
pub const TABLE_VERSION: u32 = 1;

/// Index into [`GrammarTable::symbols`].
pub type SymbolId = u16;

/// Index into [`GrammarTable::states`].
pub type StateId = u16;

/// Field identifier; `n` names `fields[n - 1]`.
pub type FieldId = NonZeroU16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Produced by the built-in lexer. Symbol 0 is always the end of input.
    Terminal,
    /// Produced by the grammar's external scanner.
    External,
    /// Produced by reductions.
    NonTerminal,
    /// Only ever displayed through a production's alias map.
    Alias,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub named: bool,
    /// Hidden symbols never appear as nodes; their children are spliced into
    /// the parent.
    pub visible: bool,
    pub kind: SymbolKind,
    /// Extras may appear between any two tokens.
    #[serde(default)]
    pub extra: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Associativity {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SymbolId,
    /// Number of non-extra children the reduction pops.
    pub child_count: u16,
    #[serde(default)]
    pub precedence: i32,
    #[serde(default)]
    pub associativity: Associativity,
    /// `(structural child index, field)` pairs, sorted by index.
    #[serde(default)]
    pub fields: Vec<(u16, FieldId)>,
    /// `(structural child index, displayed symbol)` pairs, sorted by index.
    #[serde(default)]
    pub aliases: Vec<(u16, SymbolId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Shift { state: StateId, precedence: i32 },
    Reduce { production: u16 },
    Accept,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseState {
    /// Actions per terminal, sorted by terminal. Conflicting actions are kept
    /// in the order the table lists them.
    pub actions: Vec<(SymbolId, Vec<Action>)>,
    /// Gotos per non-terminal, sorted by non-terminal.
    pub gotos: Vec<(SymbolId, StateId)>,
    pub lex_mode: u16,
}

/// Tokens the lexer may produce in a group of states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LexMode {
    pub terminals: Vec<SymbolId>,
    pub externals: Vec<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenPattern {
    End,
    Literal(String),
    Regex(String),
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDef {
    pub pattern: TokenPattern,
    /// Literal that must also be matched in full by the word token.
    #[serde(default)]
    pub keyword: bool,
}

/// The complete, serializable language table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarTable {
    pub name: String,
    pub version: u32,
    /// Terminals first (end of input at 0), then externals, then
    /// non-terminals, then alias-only symbols.
    pub symbols: Vec<SymbolInfo>,
    pub fields: Vec<String>,
    pub productions: Vec<Production>,
    pub states: Vec<ParseState>,
    pub lex_modes: Vec<LexMode>,
    /// One entry per terminal or external symbol, indexed by symbol id.
    pub tokens: Vec<TokenDef>,
    pub start: SymbolId,
    #[serde(default)]
    pub word: Option<SymbolId>,
    /// Fields that can label children of each visible kind.
    #[serde(default)]
    pub fields_by_kind: Vec<(SymbolId, Vec<FieldId>)>,
}
