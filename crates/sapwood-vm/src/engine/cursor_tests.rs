use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::test_utils::{json, parse, python, query, run, run_with};
use super::{ExecOptions, MatchAbort, QueryCursor};

#[test]
fn execution_can_start_at_any_node() {
    let grammar = json();
    let tree = parse(&grammar, "[[1, 2], [3]]");
    let query = query(&grammar, "(number) @n");
    let inner = tree.root().walk().find(|n| n.kind() == "array" && n.start_byte() == 1).unwrap();

    let texts: Vec<_> = QueryCursor::new()
        .captures(&query, inner)
        .map(|c| c.unwrap().node.utf8_text().unwrap())
        .collect();
    assert_eq!(texts, ["1", "2"]);
}

#[test]
fn byte_range_limits_match_roots() {
    let grammar = json();
    let options = ExecOptions::new().byte_range(3..5);

    insta::assert_snapshot!(run_with(&grammar, "[1, 2, 3]", "(number) @n", options), @r#"0: @n "2""#);
}

#[test]
fn set_byte_range_on_cursor() {
    let grammar = json();
    let tree = parse(&grammar, "[1, 2, 3]");
    let query = query(&grammar, "(number) @n");
    let mut cursor = QueryCursor::new();
    cursor.set_byte_range(6..9);

    let count = cursor.matches(&query, tree.root()).count();
    assert_eq!(count, 1);
    assert_eq!(cursor.options().get_byte_range(), Some(&(6..9)));
}

#[test]
fn program_for_another_grammar_matches_nothing() {
    let json = json();
    let python = python();
    let tree = parse(&python, "x\n");
    let query = query(&json, "(_) @any");

    assert!(!query.is_compatible(&python));
    assert_eq!(QueryCursor::new().matches(&query, tree.root()).count(), 0);
}

#[test]
fn execution_is_deterministic() {
    let grammar = json();
    let source = r#"{"a": [1, 2, {"b": null}], "c": true}"#;
    let query = "(pair key: (string) @k) (array (_) @item) (null) @null";

    assert_eq!(run(&grammar, source, query), run(&grammar, source, query));
}

#[test]
fn match_helpers() {
    let grammar = json();
    let tree = parse(&grammar, "[1, 2]");
    let query = query(&grammar, "(array (number)+ @n) @list");
    let found: Vec<_> = QueryCursor::new()
        .matches(&query, tree.root())
        .map(Result::unwrap)
        .collect();

    assert_eq!(found.len(), 1);
    let n = query.capture_index("n").unwrap();
    let texts: Vec<_> = found[0]
        .nodes_for_capture(n)
        .map(|node| node.utf8_text().unwrap())
        .collect();
    assert_eq!(texts, ["1", "2"]);
    assert_eq!(found[0].capture("@list").map(|n| n.kind()), Some("array"));
    assert_eq!(found[0].capture("missing"), None);
}

#[test]
fn step_limit_keeps_earlier_matches() {
    let grammar = json();
    let tree = parse(&grammar, "[1, 2, 3]");
    let query = query(&grammar, "(number) @n");
    let cursor = QueryCursor::with_options(ExecOptions::new().step_limit(1));
    let mut matches = cursor.matches(&query, tree.root());

    let first = matches.next().unwrap().unwrap();
    assert_eq!(first.captures[0].node.utf8_text().unwrap(), "1");
    assert_eq!(matches.next(), Some(Err(MatchAbort::StepLimitExceeded(1))));
    assert_eq!(matches.next(), None);
    assert_eq!(matches.next(), None);
}

#[test]
fn cancellation_flag_stops_execution() {
    let grammar = json();
    let tree = parse(&grammar, "[1, 2, 3]");
    let query = query(&grammar, "(number) @n");
    let flag = Arc::new(AtomicBool::new(false));
    let cursor = QueryCursor::with_options(ExecOptions::new().cancellation(flag.clone()));

    let mut captures = cursor.captures(&query, tree.root());
    assert!(captures.next().unwrap().is_ok());
    flag.store(true, Ordering::Relaxed);
    assert_eq!(captures.next(), Some(Err(MatchAbort::Cancelled)));
    assert_eq!(captures.next(), None);
}

#[test]
fn passed_deadline_aborts_before_any_match() {
    let grammar = json();
    let tree = parse(&grammar, "[1]");
    let query = query(&grammar, "(number) @n");
    let cursor = QueryCursor::with_options(ExecOptions::new().deadline(Instant::now()));

    let results: Vec<_> = cursor.matches(&query, tree.root()).collect();
    assert_eq!(results, [Err(MatchAbort::DeadlineExceeded)]);
}

#[test]
fn abort_messages() {
    assert_eq!(MatchAbort::Cancelled.to_string(), "query execution was cancelled");
    assert_eq!(
        MatchAbort::StepLimitExceeded(10).to_string(),
        "query execution exceeded its limit of 10 steps"
    );
}

#[test]
fn steps_are_counted() {
    let grammar = json();
    let tree = parse(&grammar, "[1, 2, 3]");
    let query = query(&grammar, "(number) @n");
    let mut matches = QueryCursor::new().matches(&query, tree.root());

    assert_eq!(matches.steps(), 0);
    while matches.next().is_some() {}
    assert_eq!(matches.steps(), 3);
}
