use sapwood_core::{GrammarError, GrammarLoader};

use super::*;

#[test]
#[cfg(feature = "lang-python")]
fn grammar_from_name_ignores_case() {
    assert_eq!(from_name("py").unwrap().name(), "python");
    assert_eq!(from_name("Python").unwrap().name(), "python");
    assert!(matches!(from_name("cobol"), Err(GrammarError::NotFound(_))));
}

#[test]
#[cfg(feature = "lang-json")]
fn grammar_from_extension() {
    assert_eq!(from_ext("JSON").unwrap().name(), "json");
    assert!(from_ext("rs").is_err());
}

#[test]
fn names_lists_enabled_grammars() {
    let names = names();
    assert!(!names.is_empty());
    for name in names {
        assert_eq!(from_name(name).unwrap().name(), name);
    }
}

#[test]
#[cfg(feature = "lang-python")]
fn python_has_scanner_and_externals() {
    let grammar = python().unwrap();
    assert!(grammar.scanner().is_some());
    assert_eq!(grammar.external_count(), 3);
    assert!(grammar.id_for_node_kind("function_definition", true).is_some());
    assert!(grammar.id_for_node_kind("string_start", true).is_some());
    assert!(grammar.id_for_node_kind("_newline", true).is_none());
}

#[test]
#[cfg(feature = "lang-arithmetic")]
fn builtin_loader_loads_by_name() {
    let loader = BuiltinLoader;
    assert_eq!(loader.load("calc").unwrap().name(), "arithmetic");
    assert!(loader.names().contains(&"arithmetic".to_owned()));
}

#[test]
#[cfg(feature = "lang-json")]
fn cache_returns_the_same_grammar() {
    let cache = GrammarCache::new(BuiltinLoader);
    assert!(cache.is_empty());

    let first = cache.load("json").unwrap();
    let second = cache.load("JSON").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    cache.clear();
    let third = cache.load("json").unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
}

#[test]
fn cache_does_not_store_failures() {
    let cache = GrammarCache::new(BuiltinLoader);
    assert!(cache.load("missing").is_err());
    assert!(cache.is_empty());
}

#[test]
fn grammar_from_json_text() {
    let json = r#"{
        "name": "list",
        "rules": {
            "list": { "type": "REPEAT", "content": { "type": "SYMBOL", "name": "word" } },
            "word": { "type": "PATTERN", "value": "[a-z]+" }
        },
        "extras": [{ "type": "PATTERN", "value": "\\s" }]
    }"#;

    let grammar = from_json(json, None).unwrap();
    assert_eq!(grammar.name(), "list");
    assert!(grammar.id_for_node_kind("word", true).is_some());
    assert_eq!(grammar.symbol_name(grammar.start_symbol()), "list");
}

#[test]
fn externals_without_scanner_are_rejected() {
    let definition = definition::dsl::GrammarBuilder::new("ext")
        .rule("start", definition::dsl::sym("_token"))
        .external("_token")
        .build();

    assert!(matches!(
        build(&definition, None),
        Err(GrammarError::MissingScanner { .. })
    ));
}
