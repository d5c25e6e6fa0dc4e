//! JSON with `//` and `/* */` comments.

use crate::definition::GrammarDefinition;
use crate::definition::dsl::*;

pub fn definition() -> GrammarDefinition {
    GrammarBuilder::new("json")
        .rule("document", repeat(sym("_value")))
        .rule(
            "_value",
            choice([
                sym("object"),
                sym("array"),
                sym("number"),
                sym("string"),
                sym("true"),
                sym("false"),
                sym("null"),
            ]),
        )
        .rule(
            "object",
            seq([
                lit("{"),
                optional(sep1(sym("pair"), ",", false)),
                lit("}"),
            ]),
        )
        .rule(
            "pair",
            seq([
                field("key", sym("string")),
                lit(":"),
                field("value", sym("_value")),
            ]),
        )
        .rule(
            "array",
            seq([
                lit("["),
                optional(sep1(sym("_value"), ",", false)),
                lit("]"),
            ]),
        )
        .rule(
            "string",
            seq([
                lit("\""),
                repeat(choice([sym("string_content"), sym("escape_sequence")])),
                lit("\""),
            ]),
        )
        .rule("string_content", pat(r#"[^\\"\n]+"#))
        .rule(
            "escape_sequence",
            pat(r#"\\(["\\/bfnrt]|u[0-9a-fA-F]{4})"#),
        )
        .rule(
            "number",
            pat(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?"),
        )
        .rule("true", lit("true"))
        .rule("false", lit("false"))
        .rule("null", lit("null"))
        .rule("comment", pat(r"//[^\n]*|/\*([^*]|\*+[^*/])*\*+/"))
        .extra(pat(r"\s+"))
        .extra(sym("comment"))
        .build()
}
