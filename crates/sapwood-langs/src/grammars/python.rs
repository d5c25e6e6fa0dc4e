//! A Python subset: definitions, control flow, calls, literals (f-strings
//! included) and operators. Indentation comes from [`IndentScanner`].

use crate::definition::GrammarDefinition;
use crate::definition::dsl::*;

pub use super::python_scanner::IndentScanner;

const PREC_CONDITIONAL: i32 = -1;
const PREC_OR: i32 = 10;
const PREC_AND: i32 = 11;
const PREC_NOT: i32 = 12;
const PREC_COMPARE: i32 = 13;
const PREC_PLUS: i32 = 18;
const PREC_TIMES: i32 = 19;
const PREC_UNARY: i32 = 20;
const PREC_POWER: i32 = 21;
const PREC_CALL: i32 = 22;

pub fn definition() -> GrammarDefinition {
    let mut builder = GrammarBuilder::new("python")
        .rule("module", repeat(sym("_statement")))
        .rule(
            "_statement",
            choice([sym("_simple_statements"), sym("_compound_statement")]),
        )
        .rule(
            "_simple_statements",
            seq([sep1(sym("_simple_statement"), ";", true), sym("_newline")]),
        )
        .rule(
            "_simple_statement",
            choice([
                sym("expression_statement"),
                sym("return_statement"),
                sym("pass_statement"),
                sym("break_statement"),
                sym("continue_statement"),
                sym("import_statement"),
                sym("import_from_statement"),
            ]),
        )
        .rule(
            "expression_statement",
            choice([
                sym("_expression"),
                sym("assignment"),
                sym("augmented_assignment"),
            ]),
        )
        .rule(
            "assignment",
            seq([
                field("left", sym("_expression")),
                lit("="),
                field("right", sym("_expression")),
            ]),
        )
        .rule(
            "augmented_assignment",
            seq([
                field("left", sym("_expression")),
                field(
                    "operator",
                    choice(["+=", "-=", "*=", "/="].map(lit)),
                ),
                field("right", sym("_expression")),
            ]),
        )
        .rule(
            "return_statement",
            seq([lit("return"), optional(sym("_expression"))]),
        )
        .rule("pass_statement", lit("pass"))
        .rule("break_statement", lit("break"))
        .rule("continue_statement", lit("continue"))
        .rule(
            "import_statement",
            seq([
                lit("import"),
                sep1(field("name", sym("dotted_name")), ",", false),
            ]),
        )
        .rule(
            "import_from_statement",
            seq([
                lit("from"),
                field("module_name", sym("dotted_name")),
                lit("import"),
                sep1(field("name", sym("dotted_name")), ",", false),
            ]),
        )
        .rule("dotted_name", sep1(sym("identifier"), ".", false))
        .rule(
            "_compound_statement",
            choice([
                sym("if_statement"),
                sym("for_statement"),
                sym("while_statement"),
                sym("function_definition"),
                sym("class_definition"),
            ]),
        )
        .rule(
            "if_statement",
            seq([
                lit("if"),
                field("condition", sym("_expression")),
                lit(":"),
                field("consequence", sym("_suite")),
                repeat(field("alternative", sym("elif_clause"))),
                optional(field("alternative", sym("else_clause"))),
            ]),
        )
        .rule(
            "elif_clause",
            seq([
                lit("elif"),
                field("condition", sym("_expression")),
                lit(":"),
                field("consequence", sym("_suite")),
            ]),
        )
        .rule(
            "else_clause",
            seq([lit("else"), lit(":"), field("body", sym("_suite"))]),
        )
        .rule(
            "for_statement",
            seq([
                lit("for"),
                field("left", sym("identifier")),
                lit("in"),
                field("right", sym("_expression")),
                lit(":"),
                field("body", sym("_suite")),
            ]),
        )
        .rule(
            "while_statement",
            seq([
                lit("while"),
                field("condition", sym("_expression")),
                lit(":"),
                field("body", sym("_suite")),
            ]),
        )
        .rule(
            "function_definition",
            seq([
                lit("def"),
                field("name", sym("identifier")),
                field("parameters", sym("parameters")),
                lit(":"),
                field("body", sym("_suite")),
            ]),
        )
        .rule(
            "parameters",
            seq([
                lit("("),
                optional(sep1(sym("_parameter"), ",", true)),
                lit(")"),
            ]),
        )
        .rule(
            "_parameter",
            choice([sym("identifier"), sym("default_parameter")]),
        )
        .rule(
            "default_parameter",
            seq([
                field("name", sym("identifier")),
                lit("="),
                field("value", sym("_expression")),
            ]),
        )
        .rule(
            "class_definition",
            seq([
                lit("class"),
                field("name", sym("identifier")),
                optional(field("superclasses", sym("argument_list"))),
                lit(":"),
                field("body", sym("_suite")),
            ]),
        )
        .rule(
            "_suite",
            choice([
                alias(sym("_simple_statements"), "block", true),
                seq([sym("_indent"), sym("block")]),
            ]),
        )
        .rule(
            "block",
            seq([repeat(sym("_statement")), sym("_dedent")]),
        )
        .rule(
            "_expression",
            choice([
                sym("comparison_operator"),
                sym("not_operator"),
                sym("boolean_operator"),
                sym("conditional_expression"),
                sym("_primary_expression"),
            ]),
        )
        .rule(
            "_primary_expression",
            choice([
                sym("binary_operator"),
                sym("unary_operator"),
                sym("identifier"),
                sym("integer"),
                sym("float"),
                sym("string"),
                sym("true"),
                sym("false"),
                sym("none"),
                sym("call"),
                sym("attribute"),
                sym("subscript"),
                sym("list"),
                sym("dictionary"),
                sym("parenthesized_expression"),
            ]),
        )
        .rule(
            "binary_operator",
            choice([
                binary(PREC_PLUS, "+", false),
                binary(PREC_PLUS, "-", false),
                binary(PREC_TIMES, "*", false),
                binary(PREC_TIMES, "/", false),
                binary(PREC_TIMES, "//", false),
                binary(PREC_TIMES, "%", false),
                binary(PREC_POWER, "**", true),
            ]),
        )
        .rule(
            "unary_operator",
            prec(
                PREC_UNARY,
                seq([
                    field("operator", choice([lit("-"), lit("+")])),
                    field("argument", sym("_primary_expression")),
                ]),
            ),
        )
        .rule(
            "comparison_operator",
            prec_left(
                PREC_COMPARE,
                seq([
                    sym("_primary_expression"),
                    repeat1(seq([
                        field(
                            "operators",
                            choice(["<", "<=", "==", "!=", ">=", ">", "in"].map(lit)),
                        ),
                        sym("_primary_expression"),
                    ])),
                ]),
            ),
        )
        .rule(
            "not_operator",
            prec(
                PREC_NOT,
                seq([lit("not"), field("argument", sym("_expression"))]),
            ),
        )
        .rule(
            "boolean_operator",
            choice([
                prec_left(
                    PREC_AND,
                    seq([
                        field("left", sym("_expression")),
                        field("operator", lit("and")),
                        field("right", sym("_expression")),
                    ]),
                ),
                prec_left(
                    PREC_OR,
                    seq([
                        field("left", sym("_expression")),
                        field("operator", lit("or")),
                        field("right", sym("_expression")),
                    ]),
                ),
            ]),
        )
        .rule(
            "conditional_expression",
            prec_right(
                PREC_CONDITIONAL,
                seq([
                    sym("_expression"),
                    lit("if"),
                    sym("_expression"),
                    lit("else"),
                    sym("_expression"),
                ]),
            ),
        )
        .rule(
            "call",
            prec(
                PREC_CALL,
                seq([
                    field("function", sym("_primary_expression")),
                    field("arguments", sym("argument_list")),
                ]),
            ),
        )
        .rule(
            "argument_list",
            seq([
                lit("("),
                optional(sep1(
                    choice([sym("_expression"), sym("keyword_argument")]),
                    ",",
                    true,
                )),
                lit(")"),
            ]),
        )
        .rule(
            "keyword_argument",
            seq([
                field("name", sym("identifier")),
                lit("="),
                field("value", sym("_expression")),
            ]),
        )
        .rule(
            "attribute",
            prec(
                PREC_CALL,
                seq([
                    field("object", sym("_primary_expression")),
                    lit("."),
                    field("attribute", sym("identifier")),
                ]),
            ),
        )
        .rule(
            "subscript",
            prec(
                PREC_CALL,
                seq([
                    field("value", sym("_primary_expression")),
                    lit("["),
                    field("subscript", sym("_expression")),
                    lit("]"),
                ]),
            ),
        )
        .rule(
            "list",
            seq([
                lit("["),
                optional(sep1(sym("_expression"), ",", true)),
                lit("]"),
            ]),
        )
        .rule(
            "dictionary",
            seq([
                lit("{"),
                optional(sep1(sym("pair"), ",", true)),
                lit("}"),
            ]),
        )
        .rule(
            "pair",
            seq([
                field("key", sym("_expression")),
                lit(":"),
                field("value", sym("_expression")),
            ]),
        )
        .rule(
            "parenthesized_expression",
            seq([lit("("), sym("_expression"), lit(")")]),
        )
        .rule("string", choice(string_forms()))
        .rule("identifier", pat("[_a-zA-Z][_a-zA-Z0-9]*"))
        .rule(
            "integer",
            pat("0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|[0-9][0-9_]*"),
        )
        .rule(
            "float",
            pat(concat!(
                r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?",
                r"|\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?",
                r"|[0-9][0-9_]*[eE][+-]?[0-9_]+",
            )),
        )
        .rule("true", lit("True"))
        .rule("false", lit("False"))
        .rule("none", lit("None"))
        .rule("comment", pat("#[^\r\n]*"));

    for quote in ['"', '\''] {
        let suffix = quote_suffix(quote);
        builder = builder
            .rule(
                &format!("_string_start_{suffix}"),
                pat(&format!("[rRbBuU]{{0,2}}{quote}")),
            )
            .rule(
                &format!("_fstring_start_{suffix}"),
                pat(&format!("[rRbB]?[fF][rRbB]?{quote}")),
            )
            .rule(
                &format!("_string_content_{suffix}"),
                pat(&format!(r"([^{quote}\\\r\n]|\\(.|\r?\n))+")),
            )
            .rule(
                &format!("_fstring_content_{suffix}"),
                pat(&format!(r"([^{quote}{{}}\\\r\n]|\\(.|\r?\n)|\{{\{{|\}}\}})+")),
            )
            // One interpolation rule per quote keeps the states after `}`
            // from offering the other quote's content token.
            .rule(
                &format!("_interpolation_{suffix}"),
                seq([lit("{"), field("expression", sym("_expression")), lit("}")]),
            );
    }

    builder
        .extra(pat(r"[ \t\f\r\n]+|\\\r?\n"))
        .extra(sym("comment"))
        .external("_newline")
        .external("_indent")
        .external("_dedent")
        .word("identifier")
        .build()
}

fn binary(precedence: i32, operator: &str, right: bool) -> crate::definition::Rule {
    let body = seq([
        field("left", sym("_primary_expression")),
        field("operator", lit(operator)),
        field("right", sym("_primary_expression")),
    ]);
    if right {
        prec_right(precedence, body)
    } else {
        prec_left(precedence, body)
    }
}

fn quote_suffix(quote: char) -> &'static str {
    if quote == '"' { "dq" } else { "sq" }
}

/// Plain and formatted strings for each quote character. Every form shows
/// up as `string_start`, `string_content` and `string_end` children.
fn string_forms() -> Vec<crate::definition::Rule> {
    let mut forms = Vec::new();
    for quote in ['"', '\''] {
        let suffix = quote_suffix(quote);
        let end = alias(lit(&quote.to_string()), "string_end", true);
        forms.push(seq([
            alias(sym(&format!("_string_start_{suffix}")), "string_start", true),
            repeat(alias(
                sym(&format!("_string_content_{suffix}")),
                "string_content",
                true,
            )),
            end.clone(),
        ]));
        forms.push(seq([
            alias(sym(&format!("_fstring_start_{suffix}")), "string_start", true),
            repeat(choice([
                alias(
                    sym(&format!("_fstring_content_{suffix}")),
                    "string_content",
                    true,
                ),
                alias(
                    sym(&format!("_interpolation_{suffix}")),
                    "interpolation",
                    true,
                ),
            ])),
            end,
        ]));
    }
    forms
}
