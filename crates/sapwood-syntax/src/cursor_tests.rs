use crate::test_utils::{arithmetic, find, json, parse};

#[test]
fn cursor_moves_through_the_tree() {
    let tree = parse(arithmetic(), "x = f(1);");
    let mut cursor = tree.walk();

    assert_eq!(cursor.node().kind(), "program");
    assert_eq!(cursor.depth(), 0);
    assert!(cursor.field_name().is_none());
    assert!(!cursor.goto_next_sibling());
    assert!(!cursor.goto_parent());

    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "assignment");
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "identifier");
    assert_eq!(cursor.field_name(), Some("left"));
    assert_eq!(cursor.depth(), 2);

    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind(), "=");
    assert!(cursor.field_id().is_none());
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind(), "call_expression");
    assert_eq!(cursor.field_name(), Some("right"));
    assert!(!cursor.goto_next_sibling());

    assert!(cursor.goto_parent());
    assert_eq!(cursor.node().kind(), "assignment");
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind(), ";");
    assert!(!cursor.goto_first_child());
}

#[test]
fn cursor_is_scoped_to_its_start() {
    let tree = parse(json(), "[1, [2]]");
    let inner = find(&tree, "array")
        .unwrap()
        .named_child(1)
        .unwrap();
    let mut cursor = inner.cursor();

    assert!(!cursor.goto_next_sibling());
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "[");
    assert!(cursor.goto_parent());
    assert!(!cursor.goto_parent());
    assert_eq!(cursor.node(), inner);
}

#[test]
fn cursor_snapshot_and_reset() {
    let tree = parse(json(), "[1, 2]");
    let mut cursor = tree.walk();
    cursor.goto_first_child();
    cursor.goto_first_child();

    let snapshot = cursor.clone();
    cursor.goto_next_sibling();
    assert_eq!(snapshot.node().kind(), "[");
    assert_eq!(cursor.node().kind(), "number");

    cursor.reset(tree.root());
    assert_eq!(cursor.depth(), 0);
    assert_eq!(cursor.node(), tree.root());
}

#[test]
fn pre_order_with_and_without_anonymous_nodes() {
    let tree = parse(arithmetic(), "-a;");

    let all: Vec<_> = tree.root().walk().map(|n| n.kind()).collect();
    assert_eq!(all, ["program", "expression_statement", "unary_expression", "-", "identifier", ";"]);

    let named: Vec<_> = tree.root().walk_named().map(|n| n.kind()).collect();
    assert_eq!(named, ["program", "expression_statement", "unary_expression", "identifier"]);
}

#[test]
fn pre_order_reports_depth() {
    let tree = parse(json(), "[[1]]");
    let mut walk = tree.root().walk_named();
    let mut seen = Vec::new();
    while let Some(node) = walk.next() {
        seen.push((node.kind(), walk.depth()));
    }

    assert_eq!(seen, [("document", 0), ("array", 1), ("array", 2), ("number", 3)]);
}

#[test]
fn pre_order_of_subtree_stays_inside() {
    let tree = parse(json(), "[1] [2]");
    let first = find(&tree, "array").unwrap();
    let texts: Vec<_> = first.walk().map(|n| n.utf8_text().unwrap()).collect();

    assert_eq!(texts, ["[1]", "[", "1", "]"]);

    let mut walk = first.walk();
    walk.by_ref().for_each(drop);
    assert!(walk.next().is_none());
}
