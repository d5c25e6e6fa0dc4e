use sapwood_program::{CaptureId, Predicate, PredicateArg, PredicateRegistry, Property, TextOp};

use crate::test_utils::{compile_err, compile_err_with, compile_ok, error_kinds, errors, python};
use crate::{CompileOptions, DiagnosticKind};

#[test]
fn text_operators_from_names() {
    let grammar = python();
    let source = r#"
        ((identifier) @a (#not-eq? @a "x"))
        ((identifier) @a (#any-eq? @a "x"))
        ((identifier) @a (#any-not-match? @a "^x"))
        ((identifier) @a (#eq? @a @a))
    "#;
    let query = compile_ok(&grammar, source);
    let ops: Vec<TextOp> = query
        .patterns()
        .iter()
        .map(|p| match &p.predicates[0] {
            Predicate::Eq { op, .. } | Predicate::Match { op, .. } => *op,
            other => panic!("unexpected {other:?}"),
        })
        .collect();

    assert_eq!(
        ops,
        [
            TextOp::new(true, false),
            TextOp::new(false, true),
            TextOp::new(true, true),
            TextOp::new(false, false)
        ]
    );
    assert!(matches!(
        &query.pattern(3).unwrap().predicates[0],
        Predicate::Eq { other: PredicateArg::Capture(_), .. }
    ));
}

#[test]
fn any_of_collects_strings() {
    let grammar = python();
    let query = compile_ok(&grammar, r#"((identifier) @a (#not-any-of? @a "self" "cls"))"#);

    let Predicate::AnyOf { values, negated, .. } = &query.pattern(0).unwrap().predicates[0] else {
        panic!("expected any-of");
    };
    assert_eq!(values, &["self", "cls"]);
    assert!(*negated);
}

#[test]
fn set_directive_forms() {
    let grammar = python();
    let source = r#"((identifier) @a (#set! priority "10") (#set! @a local) (#set! tag))"#;
    let query = compile_ok(&grammar, source);

    assert_eq!(
        query.property_settings(0),
        [
            Property {
                key: "priority".into(),
                value: Some("10".into()),
                capture: None
            },
            Property {
                key: "local".into(),
                value: None,
                capture: Some(CaptureId::new(0))
            },
            Property {
                key: "tag".into(),
                value: None,
                capture: None
            },
        ]
    );
}

#[test]
fn capture_must_be_bound_by_the_same_pattern() {
    let grammar = python();

    insta::assert_snapshot!(errors(&grammar, r#"((identifier) @a (#eq? @b "x"))"#), @r#"error at 23..25: `@b` is not bound by this pattern"#);

    let source = "(identifier) @a ((integer) @b (#eq? @a @b))";
    assert_eq!(error_kinds(&grammar, source), [DiagnosticKind::UnboundCapture]);
}

#[test]
fn unknown_predicate_suggests_a_builtin() {
    let grammar = python();

    insta::assert_snapshot!(errors(&grammar, r#"((identifier) @a (#mtch? @a "x"))"#), @"error at 18..24: `#mtch?` is not a known predicate (hint: did you mean `#match?`?)");
}

#[test]
fn arity_is_checked() {
    let grammar = python();

    insta::assert_snapshot!(errors(&grammar, "((identifier) @a (#eq? @a))"), @"error at 17..26: wrong number of predicate arguments: `#eq?` takes 2 arguments, got 1");
    assert_eq!(
        error_kinds(&grammar, "((identifier) @a (#any-of? @a))"),
        [DiagnosticKind::PredicateArity]
    );
    assert_eq!(
        error_kinds(&grammar, r#"((identifier) @a (#set! @a k "v" "w"))"#),
        [DiagnosticKind::PredicateArity]
    );
}

#[test]
fn argument_kinds_are_checked() {
    let grammar = python();

    assert_eq!(
        error_kinds(&grammar, "((identifier) @a (#match? @a word))"),
        [DiagnosticKind::PredicateArgumentKind]
    );
    assert_eq!(
        error_kinds(&grammar, r#"((identifier) @a (#eq? "x" @a))"#),
        [DiagnosticKind::PredicateArgumentKind]
    );
    assert_eq!(
        error_kinds(&grammar, r#"((identifier) @a (#any-of? @a "x" @a))"#),
        [DiagnosticKind::PredicateArgumentKind]
    );
}

#[test]
fn invalid_regex_points_into_the_string() {
    let grammar = python();
    let err = compile_err(&grammar, r#"((identifier) @a (#match? @a "a(b"))"#);

    let first = err.first().unwrap();
    assert_eq!(first.kind(), DiagnosticKind::InvalidRegex);
    assert!(first.message().starts_with("invalid regular expression: "), "{}", first.message());
    let range = first.range();
    assert!(range.start >= 30 && range.end <= 33, "{range:?}");
}

#[test]
fn custom_predicate_arity() {
    let grammar = python();
    let registry = PredicateRegistry::new().register("short?", 1..=1, |_| true);
    let options = CompileOptions::new().registry(registry);
    let err = compile_err_with(&grammar, r#"((identifier) @a (#short? @a "x"))"#, &options);

    assert_eq!(err.first().unwrap().kind(), DiagnosticKind::PredicateArity);
    assert_eq!(
        err.message,
        "wrong number of predicate arguments: `#short?` takes 1 argument, got 2"
    );
}

#[test]
fn registry_names_are_suggested() {
    let grammar = python();
    let registry = PredicateRegistry::new().register("is-upper?", 1..=1, |_| true);
    let options = CompileOptions::new().registry(registry);
    let err = compile_err_with(&grammar, "((identifier) @a (#is-uper? @a))", &options);

    assert_eq!(err.first().unwrap().hints(), ["did you mean `#is-upper?`?"]);
}
