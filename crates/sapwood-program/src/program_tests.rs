use std::sync::Arc;

use sapwood_core::Grammar;

use crate::dump::dump;
use crate::{
    Block, CaptureId, Instruction, Nav, NodeMatch, NodeTest, Pattern, Property, QueryProgram,
    Quantifier, Step,
};

fn json() -> Arc<Grammar> {
    sapwood_langs::json().unwrap()
}

fn kind(grammar: &Grammar, name: &str) -> NodeTest {
    NodeTest::kind(grammar.id_for_node_kind(name, true).unwrap(), true)
}

fn top(test: NodeTest) -> Block {
    Block::new(vec![Step {
        nav: Nav::Stay,
        instruction: Instruction::Match(NodeMatch::new(test)),
    }])
}

#[test]
fn candidates_merge_kind_and_wildcard_patterns() {
    let grammar = json();
    let array = kind(&grammar, "array");
    let number = kind(&grammar, "number");
    let patterns = vec![
        Pattern::new(top(array), 0..7),
        Pattern::new(top(NodeTest::Named), 8..11),
        Pattern::new(top(number), 12..20),
        Pattern::new(top(NodeTest::Any), 21..22),
        Pattern::new(top(array), 23..30),
    ];
    let program = QueryProgram::new(&grammar, patterns, Vec::new());

    let NodeTest::Kind { id: array_id, .. } = array else { unreachable!() };
    let mut out = Vec::new();
    program.candidates(array_id, true, &mut out);
    assert_eq!(out, [0, 1, 3, 4]);

    let comma = grammar.id_for_node_kind(",", false).unwrap();
    program.candidates(comma, false, &mut out);
    assert_eq!(out, [3]);
}

#[test]
fn optional_first_terms_index_both_kinds() {
    let grammar = json();
    let root = Block::new(vec![
        Step {
            nav: Nav::Stay,
            instruction: Instruction::Repeat {
                body: top(kind(&grammar, "string")),
                quantifier: Quantifier::Optional,
            },
        },
        Step {
            nav: Nav::Search,
            instruction: Instruction::Match(NodeMatch::new(kind(&grammar, "number"))),
        },
    ]);
    let program = QueryProgram::new(&grammar, vec![Pattern::new(root, 0..1)], Vec::new());

    let mut out = Vec::new();
    for name in ["string", "number"] {
        let id = grammar.id_for_node_kind(name, true).unwrap();
        program.candidates(id, true, &mut out);
        assert_eq!(out, [0], "{name}");
    }
    let object = grammar.id_for_node_kind("object", true).unwrap();
    program.candidates(object, true, &mut out);
    assert!(out.is_empty());
}

#[test]
fn pattern_metadata() {
    let grammar = json();
    let mut pattern = Pattern::new(top(NodeTest::Named), 4..9);
    pattern.properties.push(Property {
        key: "priority".to_owned(),
        value: Some("2".to_owned()),
        capture: None,
    });
    let program = QueryProgram::new(
        &grammar,
        vec![pattern],
        vec!["value".to_owned(), "key".to_owned()],
    );

    assert_eq!(program.pattern_count(), 1);
    assert_eq!(program.pattern_range(0), Some(4..9));
    assert_eq!(program.start_byte_for_pattern(0), Some(4));
    assert_eq!(program.pattern_range(1), None);
    assert_eq!(program.property_settings(0)[0].key, "priority");
    assert!(program.property_settings(3).is_empty());

    assert_eq!(program.capture_index("key"), Some(CaptureId::new(1)));
    assert_eq!(program.capture_index("@value"), Some(CaptureId::new(0)));
    assert_eq!(program.capture_index("nope"), None);
    assert_eq!(program.capture_name(CaptureId::new(1)), "key");

    assert!(program.is_compatible(&grammar));
    assert!(!program.is_compatible(&sapwood_langs::arithmetic().unwrap()));
    assert_eq!(program.grammar_name(), "json");
}

#[test]
fn dump_lists_every_instruction() {
    let grammar = json();
    let field = grammar.field_id("key").unwrap();
    let mut pair = NodeMatch::new(kind(&grammar, "pair"));
    pair.captures.push(CaptureId::new(0));
    let mut key = NodeMatch::new(kind(&grammar, "string"));
    key.field = Some(field);
    pair.children = Block {
        steps: vec![
            Step {
                nav: Nav::Adjacent,
                instruction: Instruction::Match(key),
            },
            Step {
                nav: Nav::Search,
                instruction: Instruction::Repeat {
                    body: Block::new(vec![Step {
                        nav: Nav::Search,
                        instruction: Instruction::Match(NodeMatch::new(NodeTest::Any)),
                    }]),
                    quantifier: Quantifier::ZeroOrMore,
                },
            },
        ],
        anchored_end: true,
    };
    let root = Block::new(vec![Step {
        nav: Nav::Stay,
        instruction: Instruction::Match(pair),
    }]);
    let program = QueryProgram::new(&grammar, vec![Pattern::new(root, 0..30)], vec!["p".to_owned()]);

    insta::assert_snapshot!(dump(&program, &grammar), @r"
    pattern 0 0..30
      stay (pair) @p
        adjacent key: (string)
        search repeat*
          search _
        end
    ");
}
