use indoc::indoc;
use sapwood_core::Point;
use sapwood_program::CaptureId;

use crate::test_utils::{compile_err, compile_err_with, compile_ok, error_kinds, json, python};
use crate::{CompileOptions, DiagnosticKind, Query};

#[test]
fn compiled_query_exposes_its_program() {
    let grammar = python();
    let source = indoc! {r#"
        (function_definition name: (identifier) @name) @def
        ((identifier) @id (#set! role "reference"))
    "#};
    let query = Query::new(&grammar, source).unwrap();

    assert_eq!(query.source(), source);
    assert_eq!(query.pattern_count(), 2);
    assert_eq!(query.capture_names(), ["name", "def", "id"]);
    assert_eq!(query.capture_index("def"), Some(CaptureId::new(1)));
    assert_eq!(query.grammar_name(), grammar.name());
    assert!(query.is_compatible(&grammar));
    assert_eq!(query.property_settings(1)[0].key, "role");
    assert!(query.diagnostics().is_empty());

    let program = query.into_program();
    assert_eq!(program.pattern_count(), 2);
}

#[test]
fn syntax_error_position() {
    let grammar = python();
    let err = compile_err(&grammar, "(identifier");

    assert_eq!(err.first().unwrap().kind(), DiagnosticKind::UnclosedTree);
    assert_eq!(err.offset, 0);
    assert_eq!(err.to_string(), "missing closing `)` at 1:1");
}

#[test]
fn error_position_is_row_and_byte_column() {
    let grammar = python();
    let err = compile_err(&grammar, "(identifier)\n  (nope)");

    assert_eq!(err.position, Point::new(1, 3));
    assert_eq!(err.offset, 16);
    assert_eq!(err.to_string(), "`nope` is not a node kind at 2:4");
}

#[test]
fn syntax_errors_skip_name_resolution() {
    let grammar = python();

    assert_eq!(error_kinds(&grammar, "(nope"), [DiagnosticKind::UnclosedTree]);
}

#[test]
fn render_annotates_the_source() {
    let grammar = json();
    let source = "(aray)";
    let err = compile_err(&grammar, source);
    let rendered = err.render(source);

    assert!(rendered.contains("`aray` is not a node kind"), "{rendered}");
    assert!(rendered.contains("did you mean `array`?"), "{rendered}");
}

#[test]
fn quantified_pattern_must_consume_input() {
    let grammar = python();

    assert_eq!(
        error_kinds(&grammar, "(block ((return_statement)?)*)"),
        [DiagnosticKind::EmptyRepetition]
    );
    assert_eq!(error_kinds(&grammar, "(identifier)?"), [DiagnosticKind::EmptyPattern]);
    assert_eq!(error_kinds(&grammar, "(identifier)* @ids"), [DiagnosticKind::EmptyPattern]);
}

#[test]
fn captures_and_fields_need_a_single_term() {
    let grammar = python();

    assert_eq!(
        error_kinds(&grammar, "(block ((expression_statement) (return_statement)) @s)"),
        [DiagnosticKind::CaptureOnSequence]
    );
    assert_eq!(
        error_kinds(&grammar, "(function_definition body: ((block) (block)))"),
        [DiagnosticKind::FieldOnSequence]
    );
}

#[test]
fn field_constraints_need_a_node() {
    let grammar = python();

    assert_eq!(error_kinds(&grammar, "name: (identifier)"), [DiagnosticKind::FieldOutsideNode]);
    assert_eq!(error_kinds(&grammar, "!name"), [DiagnosticKind::NegatedFieldOutsideNode]);
}

#[test]
fn anchors_need_neighbors() {
    let grammar = python();

    assert_eq!(error_kinds(&grammar, ". (identifier)"), [DiagnosticKind::MisplacedAnchor]);
    assert_eq!(error_kinds(&grammar, "((identifier) .)"), [DiagnosticKind::MisplacedAnchor]);
    assert!(Query::new(&grammar, "(block . (pass_statement) .)").is_ok());
}

#[test]
fn predicate_before_any_pattern() {
    let grammar = python();

    assert_eq!(
        error_kinds(&grammar, r#"(#eq? @a "x") (identifier) @a"#),
        [DiagnosticKind::PredicateWithoutPattern]
    );
}

#[test]
fn duplicate_capture_is_a_warning() {
    let grammar = python();
    let query = compile_ok(&grammar, "(identifier) @a @a");

    assert_eq!(query.diagnostics().warning_count(), 1);
    assert_eq!(query.capture_names(), ["a"]);
}

#[test]
fn recursion_limit_is_configurable() {
    let grammar = python();
    let options = CompileOptions::new().recursion_limit(Some(2));
    let err = compile_err_with(&grammar, "(module (block (pass_statement)))", &options);

    assert_eq!(err.first().unwrap().kind(), DiagnosticKind::NestingTooDeep);
    assert!(Query::new(&grammar, "(module (block (pass_statement)))").is_ok());
}

#[test]
fn fuel_is_configurable() {
    let grammar = python();
    let options = CompileOptions::new().fuel(Some(2));
    let err = compile_err_with(&grammar, "(identifier) (integer)", &options);

    assert_eq!(err.first().unwrap().kind(), DiagnosticKind::QueryTooLarge);
}

#[test]
fn options_builder() {
    let options = CompileOptions::new().recursion_limit(None).fuel(Some(10));

    assert_eq!(options.get_recursion_limit(), None);
    assert_eq!(options.get_fuel(), Some(10));
    assert_eq!(CompileOptions::default().get_recursion_limit(), Some(256));
}
