//! Hand-built tables for unit tests.

use super::table::*;

fn terminal(name: &str, named: bool, visible: bool) -> SymbolInfo {
    SymbolInfo {
        name: name.to_owned(),
        named,
        visible,
        kind: SymbolKind::Terminal,
        extra: false,
    }
}

/// `item -> "x"`, with whitespace as a hidden extra.
pub(crate) fn single_item() -> GrammarTable {
    let mut ws = terminal("_whitespace", false, false);
    ws.extra = true;
    GrammarTable {
        name: "single".to_owned(),
        version: TABLE_VERSION,
        symbols: vec![
            terminal("end", false, false),
            terminal("x", false, true),
            ws,
            SymbolInfo {
                name: "item".to_owned(),
                named: true,
                visible: true,
                kind: SymbolKind::NonTerminal,
                extra: false,
            },
        ],
        fields: vec!["value".to_owned()],
        productions: vec![Production {
            lhs: 3,
            child_count: 1,
            precedence: 0,
            associativity: Associativity::None,
            fields: vec![(0, FieldId::new(1).unwrap())],
            aliases: vec![],
        }],
        states: vec![
            ParseState {
                actions: vec![(
                    1,
                    vec![Action::Shift {
                        state: 1,
                        precedence: 0,
                    }],
                )],
                gotos: vec![(3, 2)],
                lex_mode: 0,
            },
            ParseState {
                actions: vec![(0, vec![Action::Reduce { production: 0 }])],
                gotos: vec![],
                lex_mode: 1,
            },
            ParseState {
                actions: vec![(0, vec![Action::Accept])],
                gotos: vec![],
                lex_mode: 1,
            },
        ],
        lex_modes: vec![
            LexMode {
                terminals: vec![1],
                externals: vec![],
            },
            LexMode::default(),
        ],
        tokens: vec![
            TokenDef {
                pattern: TokenPattern::End,
                keyword: false,
            },
            TokenDef {
                pattern: TokenPattern::Literal("x".to_owned()),
                keyword: false,
            },
            TokenDef {
                pattern: TokenPattern::Regex(r"\s+".to_owned()),
                keyword: false,
            },
        ],
        start: 3,
        word: None,
        fields_by_kind: vec![(3, vec![FieldId::new(1).unwrap()])],
    }
}
