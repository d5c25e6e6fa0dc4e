use indoc::indoc;

use super::test_utils::{json, parse, python, query, run};
use super::{ExecOptions, MatchAbort, QueryCursor};

#[test]
fn unanchored_child_reports_every_position() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", "(array (number) @n)"), @r#"
    0: @n "1"
    0: @n "2"
    0: @n "3"
    "#);
}

#[test]
fn leading_and_trailing_anchors() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", "(array . (number) @first)"), @r#"0: @first "1""#);
    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", "(array (number) @last .)"), @r#"0: @last "3""#);
}

#[test]
fn anchor_between_terms_skips_punctuation_only() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", "(array (number) @a . (number) @b)"), @r#"
    0: @a "1" @b "2"
    0: @a "2" @b "3"
    "#);
    insta::assert_snapshot!(run(&grammar, "[1, true, 3]", "(array (number) @a . (number) @b)"), @"");
}

#[test]
fn quantifier_is_greedy_and_tails_are_not_repeated() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", "(array (number)+ @n)"), @r#"0: @n "1" @n "2" @n "3""#);
}

#[test]
fn optional_term() {
    let grammar = json();
    let query = "(array . (true)? @t . (number) @n)";

    insta::assert_snapshot!(run(&grammar, "[true, 1]", query), @r#"0: @t "true" @n "1""#);
    insta::assert_snapshot!(run(&grammar, "[1]", query), @r#"0: @n "1""#);
    insta::assert_snapshot!(run(&grammar, "[false, 1]", query), @"");
}

#[test]
fn alternation_commits_to_first_branch_that_matches() {
    let grammar = json();
    let query = "(pair value: [(number) @num (_) @any])";

    insta::assert_snapshot!(run(&grammar, r#"{"a": 1, "b": "x"}"#, query), @r#"
    0: @num "1"
    0: @any "\"x\""
    "#);
}

#[test]
fn fields_select_the_labelled_child() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, r#"{"a": "b"}"#, "(pair value: (string) @v)"), @r#"0: @v "\"b\"""#);
}

#[test]
fn negated_field() {
    let grammar = python();
    let source = indoc! {"
        if x:
            pass
        if y:
            pass
        else:
            pass
    "};

    insta::assert_snapshot!(run(&grammar, source, "(if_statement condition: (_) @c !alternative)"), @r#"0: @c "x""#);
}

#[test]
fn anonymous_nodes_and_wildcards() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1]", "(array _ @x)"), @r#"
    0: @x "["
    0: @x "1"
    0: @x "]"
    "#);
    insta::assert_snapshot!(run(&grammar, "[1]", "(array (_) @x)"), @r#"0: @x "1""#);
    insta::assert_snapshot!(run(&grammar, r#"{"a": 1}"#, r#"(pair ":" @colon)"#), @r#"0: @colon ":""#);
}

#[test]
fn top_level_group_matches_consecutive_siblings() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1, 2]", "((number) @a . (number) @b)"), @r#"0: @a "1" @b "2""#);
}

#[test]
fn captures_are_ordered_outer_first() {
    let grammar = json();
    let query = "(pair key: (string (string_content) @inner) @outer)";

    insta::assert_snapshot!(run(&grammar, r#"{"a": 1}"#, query), @r#"0: @outer "\"a\"" @inner "a""#);
}

#[test]
fn nested_nodes_match_independently() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[[1], [2]]", "(array) @a"), @r#"
    0: @a "[[1], [2]]"
    0: @a "[1]"
    0: @a "[2]"
    "#);
}

#[test]
fn same_node_in_pattern_order() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1]", "(number) @n (array) @a (_) @any"), @r#"
    2: @any "[1]"
    1: @a "[1]"
    2: @any "[1]"
    0: @n "1"
    2: @any "1"
    "#);
}

#[test]
fn equality_predicates() {
    let grammar = json();
    let query = r#"((pair key: (string) @k value: (_) @v) (#eq? @k "\"id\""))"#;

    insta::assert_snapshot!(run(&grammar, r#"{"id": 1, "name": 2}"#, query), @r#"0: @k "\"id\"" @v "1""#);
    insta::assert_snapshot!(
        run(&grammar, "[1, 2, 1]", "((array (number) @a (number) @b) (#eq? @a @b))"),
        @r#"0: @a "1" @b "1""#
    );
    insta::assert_snapshot!(
        run(&grammar, "[1, 2, 1]", "((array (number) @a (number) @b) (#not-eq? @a @b))"),
        @r#"
    0: @a "1" @b "2"
    0: @a "2" @b "1"
    "#
    );
}

#[test]
fn failed_predicate_keeps_searching() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", r#"((array (number) @n) (#match? @n "^2"))"#), @r#"0: @n "2""#);
}

#[test]
fn membership_predicates() {
    let grammar = json();

    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", r#"((number) @n (#any-of? @n "1" "3"))"#), @r#"
    0: @n "1"
    0: @n "3"
    "#);
    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", r#"((number) @n (#not-any-of? @n "1" "3"))"#), @r#"0: @n "2""#);
}

#[test]
fn quantified_captures_are_lists_for_predicates() {
    let grammar = json();

    insta::assert_snapshot!(
        run(&grammar, "[1, 2, 3]", r#"((array . (number)+ @n .) (#any-eq? @n "2"))"#),
        @r#"0: @n "1" @n "2" @n "3""#
    );
    insta::assert_snapshot!(run(&grammar, "[1, 2, 3]", r#"((array . (number)+ @n .) (#eq? @n "2"))"#), @"");
}

#[test]
fn error_nodes_can_be_queried() {
    let grammar = json();
    let tree = super::test_utils::parse(&grammar, "[1, }");
    assert!(tree.root().has_error(), "{}", tree.to_sexp());

    let output = run(&grammar, "[1, }", "(ERROR) @e");
    assert!(output.lines().count() >= 1, "{output}");
    assert!(output.lines().all(|l| l.starts_with("0: @e")), "{output}");
}

#[test]
fn long_runs_do_not_nest() {
    let grammar = json();
    let items = vec!["7"; 10_000].join(", ");
    let tree = parse(&grammar, &format!("[{items}]"));
    let query = query(&grammar, "(array . (number)* @n (number) @last .)");

    let matches: Vec<_> = QueryCursor::new()
        .matches(&query, tree.root())
        .map(|m| m.unwrap())
        .collect();
    assert_eq!(matches.len(), 1);
    let captures = &matches[0].captures;
    assert_eq!(captures.len(), 10_000);
    assert_eq!(captures.iter().filter(|c| c.name == "n").count(), 9_999);
    assert_eq!(captures[9_999].name, "last");
    assert_eq!(captures[9_999].node.end_byte() + 1, tree.root().end_byte());
}

#[test]
fn structured_repeat_is_bounded_by_recursion_limit() {
    let grammar = json();
    let source = "[[1], [2], [3], [4], [5]]";
    let query_source = "(array . (array (number) @n)* .)";

    insta::assert_snapshot!(run(&grammar, source, query_source), @r#"
    0: @n "1" @n "2" @n "3" @n "4" @n "5"
    "#);

    let tree = parse(&grammar, source);
    let query = query(&grammar, query_source);
    let cursor = QueryCursor::with_options(ExecOptions::new().recursion_limit(3));
    let results: Vec<_> = cursor.matches(&query, tree.root()).collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].as_ref().err(), Some(&MatchAbort::RecursionLimitExceeded(3)));
}

#[test]
fn many_solutions_per_root_are_all_reported() {
    let grammar = json();
    let items = (0..2_000).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
    let tree = parse(&grammar, &format!("[{items}]"));
    let query = query(&grammar, "(array (number) @n) @list");

    let count = QueryCursor::new()
        .matches(&query, tree.root())
        .map(|m| m.unwrap())
        .filter(|m| m.captures.len() == 2)
        .count();
    assert_eq!(count, 2_000);
}
