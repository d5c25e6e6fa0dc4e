//! Statements over arithmetic expressions. Small enough to read its
//! tables by hand, and every binary operator is ambiguous until
//! precedence settles it.

use crate::definition::GrammarDefinition;
use crate::definition::dsl::*;

pub fn definition() -> GrammarDefinition {
    GrammarBuilder::new("arithmetic")
        .rule("program", repeat(sym("_statement")))
        .rule(
            "_statement",
            seq([
                choice([sym("assignment"), sym("expression_statement")]),
                lit(";"),
            ]),
        )
        .rule(
            "assignment",
            seq([
                field("left", sym("identifier")),
                lit("="),
                field("right", sym("_expression")),
            ]),
        )
        .rule("expression_statement", sym("_expression"))
        .rule(
            "_expression",
            choice([
                sym("identifier"),
                sym("number"),
                sym("binary_expression"),
                sym("unary_expression"),
                sym("call_expression"),
                sym("parenthesized_expression"),
            ]),
        )
        .rule(
            "binary_expression",
            choice([
                binary("sum", "+"),
                binary("sum", "-"),
                binary("product", "*"),
                binary("product", "/"),
                prec_right(
                    "power",
                    seq([
                        field("left", sym("_expression")),
                        field("operator", lit("^")),
                        field("right", sym("_expression")),
                    ]),
                ),
            ]),
        )
        .rule(
            "unary_expression",
            prec(
                "unary",
                seq([
                    field("operator", lit("-")),
                    field("operand", sym("_expression")),
                ]),
            ),
        )
        .rule(
            "call_expression",
            prec(
                "call",
                seq([
                    field("function", sym("identifier")),
                    lit("("),
                    optional(sep1(field("argument", sym("_expression")), ",", false)),
                    lit(")"),
                ]),
            ),
        )
        .rule(
            "parenthesized_expression",
            seq([lit("("), sym("_expression"), lit(")")]),
        )
        .rule("identifier", pat("[a-zA-Z_][a-zA-Z0-9_]*"))
        .rule("number", pat(r"[0-9]+(\.[0-9]+)?"))
        .rule("comment", pat("#[^\n]*"))
        .extra(pat(r"\s+"))
        .extra(sym("comment"))
        .precedences(&["call", "power", "unary", "product", "sum"])
        .word("identifier")
        .build()
}

fn binary(precedence: &str, operator: &str) -> crate::definition::Rule {
    prec_left(
        precedence,
        seq([
            field("left", sym("_expression")),
            field("operator", lit(operator)),
            field("right", sym("_expression")),
        ]),
    )
}
