use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedExpression, range(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
    insta::assert_snapshot!(diagnostics.printer().render(), @"error at 0..5: expected a pattern");
}

#[test]
fn templated_messages() {
    assert_eq!(
        DiagnosticKind::UnknownNodeKind.message(Some("x")),
        "`x` is not a node kind"
    );
}

#[test]
fn unclosed_messages_append_detail() {
    assert_eq!(
        DiagnosticKind::UnclosedTree.message(Some("tree started here")),
        "missing closing `)`; tree started here"
    );
    assert_eq!(
        DiagnosticKind::InvalidRegex.message(Some("unclosed group")),
        "invalid regular expression: unclosed group"
    );
    assert_eq!(DiagnosticKind::UnclosedTree.message(None), "missing closing `)`");
}

#[test]
fn plain_output_carries_fix_related_and_hints() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 1))
        .related_to("opened here", range(0, 1))
        .fix("close it", ")")
        .hint("check the nesting")
        .emit();

    insta::assert_snapshot!(
        diagnostics.printer().render(),
        @"error at 0..1: missing closing `)` (fix: close it) (related: opened here at 0..1) (hint: check the nesting)"
    );
}

#[test]
fn default_hints_are_attached() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(DiagnosticKind::EmptyTree, range(0, 2)).emit();

    let message = diagnostics.iter().next().unwrap();
    assert_eq!(message.hints().len(), 1);
    assert!(message.hints()[0].contains("(_)"));
}

#[test]
fn warnings_are_counted_separately() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DuplicateCapture, range(0, 2))
        .message("x")
        .emit();
    diagnostics.report(DiagnosticKind::UnknownField, range(3, 4)).emit();

    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 1);
    assert!(diagnostics.has_warnings());
}

#[test]
fn first_error_skips_warnings() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownField, range(8, 9))
        .emit();
    diagnostics
        .report(DiagnosticKind::DuplicateCapture, range(0, 2))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownNodeKind, range(4, 6))
        .emit();

    let first = diagnostics.first_error().unwrap();
    assert_eq!(first.kind(), DiagnosticKind::UnknownNodeKind);
    assert_eq!(first.range(), 4..6);
}

#[test]
fn containing_diagnostic_suppresses_inner() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownNodeKind, range(5, 8))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownField, range(25, 30))
        .emit();

    let filtered = diagnostics.filtered();
    let kinds: Vec<_> = filtered.iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, [DiagnosticKind::UnclosedTree, DiagnosticKind::UnknownField]);
}

#[test]
fn lower_priority_does_not_suppress() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownNodeKind, range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(5, 8))
        .emit();

    assert_eq!(diagnostics.filtered().len(), 2);
}

#[test]
fn missing_token_beats_unclosed_at_same_position() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(4, 4))
        .emit();
    diagnostics
        .report(DiagnosticKind::ExpectedExpression, range(4, 4))
        .emit();

    let filtered = diagnostics.filtered();
    assert_eq!(filtered.len(), 1);
    assert_eq!(
        filtered.iter().next().unwrap().kind(),
        DiagnosticKind::ExpectedExpression
    );
}

#[test]
fn suppression_range_widens_reach() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedGroup, range(0, 1))
        .suppression_range(range(0, 10))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownNodeKind, range(3, 5))
        .emit();

    assert_eq!(diagnostics.filtered().len(), 1);
}

#[test]
fn rendered_snippet_points_at_source() {
    let source = "(foo)";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownNodeKind, range(1, 4))
        .message("foo")
        .hint("did you mean `for`?")
        .emit();

    let rendered = diagnostics.render(source);
    assert!(rendered.contains("error"));
    assert!(rendered.contains("`foo` is not a node kind"));
    assert!(rendered.contains("(foo)"));
    assert!(rendered.contains("^^^"));
    assert!(rendered.ends_with("= help: did you mean `for`?"));
}

#[test]
fn rendered_zero_width_span_at_end() {
    let source = "(a";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(2, 2))
        .emit();

    let rendered = diagnostics.printer().source(source).path("q.scm").render();
    assert!(rendered.contains("missing closing `)`"));
    assert!(rendered.contains("q.scm"));
}

#[test]
fn empty_collection_renders_nothing() {
    assert!(Diagnostics::new().render("anything").is_empty());
}

#[test]
fn suppression_order_follows_priority() {
    assert!(DiagnosticKind::UnclosedTree.suppresses(&DiagnosticKind::UnknownNodeKind));
    assert!(DiagnosticKind::ExpectedExpression.suppresses(&DiagnosticKind::UnboundCapture));
    assert!(!DiagnosticKind::UnclosedTree.suppresses(&DiagnosticKind::UnclosedTree));
    assert!(!DiagnosticKind::DuplicateCapture.suppresses(&DiagnosticKind::UnclosedTree));
}
