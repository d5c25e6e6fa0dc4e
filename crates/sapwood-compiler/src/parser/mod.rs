//! Parser for the query language.
//!
//! Produces a lossless concrete syntax tree with rowan's green tree builder:
//!
//! - Tokens carry spans; text is sliced only when building tree nodes.
//! - Trivia is buffered, then attached before the next node or token.
//! - Suffixes (`*`, `@name`) wrap the preceding expression via checkpoints.
//!
//! The parser always produces a tree. Unknown tokens are wrapped in `Error`
//! nodes, missing tokens are reported without consuming anything, and each
//! production stops at its recovery set so the enclosing one can resume.
//! Exceeding the nesting or size limit reports once and stops parsing.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;
mod invariants;

#[cfg(test)]
mod lexer_tests;

pub use ast::{
    Alt, Anchor, Capture, CaptureRef, Expr, Field, Group, NegatedField, Predicate, PredicateArg,
    Quantifier, Root, Str, Tree, Wildcard,
};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};

pub use self::core::{ParseResult, Parser};

/// Lex and parse `source` without limits.
pub fn parse(source: &str) -> ParseResult {
    Parser::new(source, lexer::lex(source)).parse()
}

/// Indented CST dump without trivia, for tests and debugging.
pub fn dump_cst(node: &SyntaxNode) -> String {
    use std::fmt::Write;

    fn go(node: &SyntaxNode, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        writeln!(out, "{indent}{:?}", node.kind()).expect("String write never fails");
        for child in node.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Node(n) => go(&n, depth + 1, out),
                rowan::NodeOrToken::Token(t) if t.kind().is_trivia() => {}
                rowan::NodeOrToken::Token(t) => {
                    writeln!(out, "{indent}  {:?} {:?}", t.kind(), t.text())
                        .expect("String write never fails");
                }
            }
        }
    }

    let mut out = String::new();
    go(node, 0, &mut out);
    out
}
