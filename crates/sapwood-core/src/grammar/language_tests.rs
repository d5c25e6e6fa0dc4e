use std::sync::Arc;

use super::test_tables::single_item;
use super::*;

#[derive(Debug)]
struct NoopScanner;

impl ExternalScanner for NoopScanner {
    fn scan(&self, _: &mut ScanLexer<'_>, _: &[bool], _: &mut Vec<u8>) -> bool {
        false
    }
}

#[test]
fn loads_valid_table() {
    let grammar = Grammar::new(single_item(), None).unwrap();

    assert_eq!(grammar.name(), "single");
    assert_eq!(grammar.start_symbol(), 3);
    assert_eq!(grammar.extras(), &[2]);
    assert_eq!(grammar.symbol_name(3), "item");
    assert_eq!(grammar.symbol_name(Grammar::ERROR), "ERROR");
    assert!(grammar.is_named(Grammar::ERROR));
    assert!(!grammar.is_visible(Grammar::UNKNOWN));
    assert!(grammar.is_token(2));
    assert!(!grammar.is_token(3));
}

#[test]
fn action_and_goto_lookup() {
    let grammar = Grammar::new(single_item(), None).unwrap();

    assert_eq!(
        grammar.actions(0, 1),
        &[Action::Shift {
            state: 1,
            precedence: 0
        }]
    );
    assert!(grammar.actions(0, 0).is_empty());
    assert_eq!(grammar.goto(0, 3), Some(2));
    assert_eq!(grammar.goto(1, 3), None);
    assert_eq!(grammar.lex_mode(0).terminals, vec![1]);
}

#[test]
fn kind_and_field_lookup() {
    let grammar = Grammar::new(single_item(), None).unwrap();

    assert_eq!(grammar.id_for_node_kind("item", true), Some(3));
    assert_eq!(grammar.id_for_node_kind("x", false), Some(1));
    assert_eq!(grammar.id_for_node_kind("x", true), None);
    assert_eq!(grammar.id_for_node_kind("ERROR", true), Some(Grammar::ERROR));
    assert_eq!(grammar.node_kind_names(true), vec!["item", "ERROR"]);
    assert_eq!(grammar.node_kind_names(false), vec!["x"]);

    let value = grammar.field_id("value").unwrap();
    assert_eq!(grammar.field_name(value), "value");
    assert_eq!(grammar.fields_for_kind(3), &[value]);
    assert!(grammar.fields_for_kind(1).is_empty());
}

#[test]
fn aliases_share_a_canonical_kind() {
    let mut table = single_item();
    table.symbols.push(SymbolInfo {
        name: "x".to_owned(),
        named: false,
        visible: true,
        kind: SymbolKind::Alias,
        extra: false,
    });
    let grammar = Grammar::new(table, None).unwrap();

    assert_eq!(grammar.canonical_kind(4), 1);
    assert_eq!(grammar.canonical_kind(3), 3);
    assert_eq!(grammar.canonical_kind(Grammar::ERROR), Grammar::ERROR);
    assert_eq!(grammar.node_kind_names(false), vec!["x"]);
}

#[test]
fn rejects_wrong_version() {
    let mut table = single_item();
    table.version = 99;

    let err = Grammar::new(table, None).unwrap_err();
    assert!(matches!(
        err,
        GrammarError::UnsupportedVersion { found: 99, .. }
    ));
}

#[test]
fn rejects_shift_out_of_range() {
    let mut table = single_item();
    table.states[0].actions[0].1[0] = Action::Shift {
        state: 42,
        precedence: 0,
    };

    let err = Grammar::new(table, None).unwrap_err();
    assert!(matches!(err, GrammarError::Invalid(_)));
}

#[test]
fn rejects_unsorted_actions() {
    let mut table = single_item();
    table.states[0].actions.push((0, vec![Action::Accept]));

    assert!(Grammar::new(table, None).is_err());
}

#[test]
fn rejects_empty_token() {
    let mut table = single_item();
    table.tokens[2].pattern = TokenPattern::Regex(r"\s*".to_owned());

    let err = Grammar::new(table, None).unwrap_err();
    assert!(matches!(err, GrammarError::EmptyToken { name } if name == "_whitespace"));
}

#[test]
fn rejects_bad_regex() {
    let mut table = single_item();
    table.tokens[2].pattern = TokenPattern::Regex("[".to_owned());

    let err = Grammar::new(table, None).unwrap_err();
    assert!(matches!(err, GrammarError::Token { .. }));
}

#[test]
fn externals_require_scanner() {
    let mut table = single_item();
    table.symbols.insert(
        3,
        SymbolInfo {
            name: "_indent".to_owned(),
            named: false,
            visible: false,
            kind: SymbolKind::External,
            extra: false,
        },
    );
    table.tokens.push(TokenDef {
        pattern: TokenPattern::External,
        keyword: false,
    });
    table.start = 4;
    table.productions[0].lhs = 4;
    table.states[0].gotos = vec![(4, 2)];
    table.fields_by_kind = vec![(4, vec![FieldId::new(1).unwrap()])];

    let err = Grammar::new(table.clone(), None).unwrap_err();
    assert!(matches!(err, GrammarError::MissingScanner { .. }));

    let grammar = Grammar::new(table, Some(Arc::new(NoopScanner))).unwrap();
    assert_eq!(grammar.externals(), 3..4);
    assert_eq!(grammar.external_symbol(0), Some(3));
    assert_eq!(grammar.external_index(3), Some(0));
    assert_eq!(grammar.external_symbol(1), None);
}

#[test]
fn binary_roundtrip() {
    let table = single_item();
    let bytes = table.to_binary().unwrap();

    assert_eq!(GrammarTable::from_binary(&bytes).unwrap(), table);
    let grammar = Grammar::from_binary(&bytes, None).unwrap();
    assert_eq!(
        grammar.fingerprint(),
        Grammar::new(single_item(), None).unwrap().fingerprint()
    );
}

#[test]
fn truncated_binary_is_an_error() {
    let bytes = single_item().to_binary().unwrap();
    let err = Grammar::from_binary(&bytes[..bytes.len() / 2], None).unwrap_err();
    assert!(matches!(err, GrammarError::Binary(_)));
}

#[test]
fn scan_lexer_tracks_padding_and_lookahead() {
    let mut lexer = ScanLexer::new(b"\n    x", 0);
    while matches!(lexer.lookahead(), Some(b'\n' | b' ')) {
        lexer.advance(true);
    }
    lexer.mark_end();
    lexer.set_result(0);

    assert_eq!(lexer.token_start(), 5);
    assert_eq!(lexer.token_end(), 5);
    assert_eq!(lexer.column(), 4);
    assert_eq!(lexer.examined_end(), 6);
    assert_eq!(lexer.result(), Some(0));
}
