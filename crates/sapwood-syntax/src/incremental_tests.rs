use std::ops::Range;
use std::sync::Arc;

use indoc::indoc;
use proptest::prelude::*;
use sapwood_core::{Grammar, SourceBuffer};

use crate::test_utils::{arithmetic, assert_spans_consistent, dump, json, python};
use crate::{InputEdit, ParseOptions, Parser, SyntaxTree};

const ARITHMETIC: &str = indoc! {"
    x = 1 + 2 * 3;
    # running total
    y = f(x, 2) - 4;
    z = -(y ^ 2) / x;
    w = g();
"};

const JSON: &str = indoc! {r#"
    {
      "name": "sapwood",
      "tags": ["parser", "query"],
      /* nested */
      "meta": {"stars": 12, "fork": false, "parent": null},
      "escaped": "tab\there"
    }
"#};

const PYTHON: &str = indoc! {r#"
    def add(a, b):
        return a + b


    def hello(name):
        print(f"Hello, {name}!")


    def main():
        # comment
        add(2022, 1)
        if True:
            hello("🌍")
        else:
            pass
"#};

const INSERTIONS: &[&str] = &[
    "", " ", "\n", "    ", "x", "1", "+", "(", ")", ";", ",", ":", "\"", "#", "def ", "[", "]",
    "{", "}", "\n    y = 2\n", "null", "f(x)",
];

/// Apply one edit both ways and require identical trees.
fn assert_edit_matches_full_parse(
    parser: &Parser,
    old: &SyntaxTree,
    range: Range<usize>,
    text: &str,
) -> SyntaxTree {
    let (source, edit) = InputEdit::splice(old.source(), range, text.as_bytes());
    let incremental = parser.parse_with_edit(old, &edit, source.clone());
    let fresh = parser.parse(source);

    assert_eq!(dump(&incremental), dump(&fresh), "edit {edit:?} inserting {text:?}");
    assert_eq!(incremental.root().has_error(), fresh.root().has_error());
    assert_spans_consistent(&incremental);
    incremental
}

fn edits(len: usize) -> impl Strategy<Value = Vec<(usize, usize, &'static str)>> {
    prop::collection::vec(
        (0..=len, 0..6usize, prop::sample::select(INSERTIONS)),
        1..4,
    )
}

fn run_edits(grammar: Arc<Grammar>, text: &str, edits: Vec<(usize, usize, &'static str)>) {
    let parser = Parser::new(grammar).unwrap();
    let mut tree = parser.parse(text);
    for (start, removed, inserted) in edits {
        let start = start.min(tree.source().len());
        tree = assert_edit_matches_full_parse(&parser, &tree, start..start + removed, inserted);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arithmetic_edits_match_full_parse(steps in edits(ARITHMETIC.len())) {
        run_edits(arithmetic(), ARITHMETIC, steps);
    }

    #[test]
    fn json_edits_match_full_parse(steps in edits(JSON.len())) {
        run_edits(json(), JSON, steps);
    }

    #[test]
    fn python_edits_match_full_parse(steps in edits(PYTHON.len())) {
        run_edits(python(), PYTHON, steps);
    }
}

#[test]
fn insertion_at_every_offset_matches_full_parse() {
    let parser = Parser::new(python()).unwrap();
    let sources = ["x = 1\ny = 2\n", "def f(a):\n    return a\n", "g(h(1), [2])\n"];
    let inserts = ["def h():\n  pass\n", "z = 0\n", " ", "1", "(", "\n", "#c\n"];

    for source in sources {
        let old = parser.parse(source);
        for at in 0..=source.len() {
            for text in inserts {
                assert_edit_matches_full_parse(&parser, &old, at..at, text);
            }
        }
    }
}

#[test]
fn deletion_at_every_offset_matches_full_parse() {
    let parser = Parser::new(arithmetic()).unwrap();
    let old = parser.parse(ARITHMETIC);

    for at in 0..ARITHMETIC.len() {
        assert_edit_matches_full_parse(&parser, &old, at..at + 1, "");
    }
}

#[test]
fn statement_inserted_before_reused_statements() {
    let parser = Parser::new(python()).unwrap();
    let old = parser.parse("x = 1\ny = 2\n");

    let new = assert_edit_matches_full_parse(&parser, &old, 0..0, "def h():\n  pass\n");

    let kinds: Vec<_> = new.root().children().map(|n| n.kind()).collect();
    assert_eq!(kinds, ["function_definition", "expression_statement", "expression_statement"]);
}

#[test]
fn unchanged_statements_are_shared() {
    let parser = Parser::new(arithmetic()).unwrap();
    let old = parser.parse(ARITHMETIC);
    let at = ARITHMETIC.find("g()").unwrap();

    let new = assert_edit_matches_full_parse(&parser, &old, at..at + 1, "h");

    assert_eq!(new.segment_count(), 2);
    assert_eq!(new.shared_segments(&old), 1);
    assert!(new.to_sexp().contains("call_expression"));
}

#[test]
fn statements_after_the_edit_are_shared() {
    let parser = Parser::new(arithmetic()).unwrap();
    let old = parser.parse(ARITHMETIC);

    let new = assert_edit_matches_full_parse(&parser, &old, 4..5, "10");

    assert_eq!(new.shared_segments(&old), 1);
}

#[test]
fn python_block_edit_is_shared() {
    let parser = Parser::new(python()).unwrap();
    let old = parser.parse(PYTHON);
    let at = PYTHON.find("2022").unwrap();

    let new = assert_edit_matches_full_parse(&parser, &old, at..at + 4, "2023");

    assert_eq!(new.shared_segments(&old), 1);
    let first = new.root().named_child(0).unwrap();
    assert_eq!(first.child_by_field_name("name").unwrap().utf8_text().unwrap(), "add");
}

#[test]
fn edit_that_introduces_an_error() {
    let parser = Parser::new(json()).unwrap();
    let old = parser.parse(JSON);
    assert!(!old.root().has_error());
    let at = JSON.find("12").unwrap();

    let broken = assert_edit_matches_full_parse(&parser, &old, at..at + 2, "");
    assert!(broken.root().has_error());

    let repaired = assert_edit_matches_full_parse(&parser, &broken, at..at, "7");
    assert!(!repaired.root().has_error());
}

#[test]
fn segments_are_compacted() {
    let parser = Parser::new(arithmetic())
        .unwrap()
        .with_options(ParseOptions::new().compaction_threshold(2));
    let mut tree = parser.parse(ARITHMETIC);
    let at = ARITHMETIC.find("w").unwrap();

    for round in 0..5 {
        let text = if round % 2 == 0 { "v" } else { "w" };
        tree = assert_edit_matches_full_parse(&parser, &tree, at..at + 1, text);
        assert!(tree.segment_count() <= 2, "round {round}: {tree:?}");
    }
}

#[test]
fn foreign_grammar_instance_parses_from_scratch() {
    let old = Parser::new(arithmetic()).unwrap().parse(ARITHMETIC);
    let other = Parser::new(sapwood_langs::arithmetic().unwrap()).unwrap();

    let (source, edit) = InputEdit::splice(old.source(), 0..1, b"q");
    let tree = other.parse_with_edit(&old, &edit, source.clone());

    assert_eq!(tree.shared_segments(&old), 0);
    assert_eq!(dump(&tree), dump(&other.parse(source)));
}

#[test]
fn inconsistent_edit_parses_from_scratch() {
    let parser = Parser::new(arithmetic()).unwrap();
    let old = parser.parse("a = 1;");
    let source = SourceBuffer::from("a = 22;");

    // Claims nothing changed.
    let tree = parser.parse_with_edit(&old, &InputEdit::new(0, 0, 0), source.clone());

    assert_eq!(tree.shared_segments(&old), 0);
    assert_eq!(dump(&tree), dump(&parser.parse(source)));
}
