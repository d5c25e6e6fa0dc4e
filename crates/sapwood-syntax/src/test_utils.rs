use std::fmt::Write;
use std::sync::{Arc, OnceLock};

use sapwood_core::Grammar;

use crate::{Node, Parser, SyntaxTree};

fn cached(
    cell: &'static OnceLock<Arc<Grammar>>,
    build: fn() -> Result<Arc<Grammar>, sapwood_core::GrammarError>,
) -> Arc<Grammar> {
    cell.get_or_init(|| build().expect("bundled grammar builds"))
        .clone()
}

pub fn arithmetic() -> Arc<Grammar> {
    static CELL: OnceLock<Arc<Grammar>> = OnceLock::new();
    cached(&CELL, sapwood_langs::arithmetic)
}

pub fn json() -> Arc<Grammar> {
    static CELL: OnceLock<Arc<Grammar>> = OnceLock::new();
    cached(&CELL, sapwood_langs::json)
}

pub fn python() -> Arc<Grammar> {
    static CELL: OnceLock<Arc<Grammar>> = OnceLock::new();
    cached(&CELL, sapwood_langs::python)
}

pub fn parse(grammar: Arc<Grammar>, text: &str) -> SyntaxTree {
    Parser::new(grammar).expect("parser").parse(text)
}

/// Every visible node with its field, kind and byte range, one per line.
pub fn dump(tree: &SyntaxTree) -> String {
    let mut out = String::new();
    let mut walk = tree.root().walk();
    while let Some(node) = walk.next() {
        let indent = "  ".repeat(walk.depth());
        let field = node.field_name().map(|f| format!("{f}: ")).unwrap_or_default();
        let kind = if node.is_named() {
            node.kind().to_owned()
        } else {
            format!("{:?}", node.kind())
        };
        writeln!(out, "{indent}{field}{kind} {:?}", node.byte_range()).unwrap();
    }
    out
}

/// First node of `kind` in pre-order.
pub fn find<'t>(tree: &'t SyntaxTree, kind: &str) -> Option<Node<'t>> {
    tree.root().walk().find(|n| n.kind() == kind)
}

/// Checks that every node's children are ordered, disjoint and inside it.
pub fn assert_spans_consistent(tree: &SyntaxTree) {
    for node in tree.root().walk() {
        let mut last_end = node.start_byte();
        for child in node.all_children() {
            assert!(
                child.start_byte() >= last_end,
                "{child:?} overlaps a sibling inside {node:?}"
            );
            assert!(child.end_byte() <= node.end_byte(), "{child:?} escapes {node:?}");
            last_end = child.end_byte();
        }
    }
}
