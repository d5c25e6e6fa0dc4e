use super::cst::SyntaxKind::{self, *};
use super::lexer::{lex, token_text, unescape};

fn kinds(source: &str) -> Vec<(SyntaxKind, &str)> {
    lex(source)
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .map(|t| (t.kind, token_text(source, t)))
        .collect()
}

#[test]
fn pattern_tokens() {
    assert_eq!(
        kinds(r#"(call function: (identifier) @fn.name !body) "(" _ ."#),
        [
            (ParenOpen, "("),
            (Id, "call"),
            (Id, "function"),
            (Colon, ":"),
            (ParenOpen, "("),
            (Id, "identifier"),
            (ParenClose, ")"),
            (At, "@"),
            (Id, "fn.name"),
            (Negation, "!"),
            (Id, "body"),
            (ParenClose, ")"),
            (DoubleQuote, "\""),
            (StrVal, "("),
            (DoubleQuote, "\""),
            (Underscore, "_"),
            (Dot, "."),
        ]
    );
}

#[test]
fn quantifiers_and_alternation() {
    assert_eq!(
        kinds("[(a)* (b)+ (c)?]"),
        [
            (BracketOpen, "["),
            (ParenOpen, "("),
            (Id, "a"),
            (ParenClose, ")"),
            (Star, "*"),
            (ParenOpen, "("),
            (Id, "b"),
            (ParenClose, ")"),
            (Plus, "+"),
            (ParenOpen, "("),
            (Id, "c"),
            (ParenClose, ")"),
            (Question, "?"),
            (BracketClose, "]"),
        ]
    );
}

#[test]
fn predicate_names() {
    assert_eq!(
        kinds(r#"(#not-eq? @a "x") (#set! key)"#),
        [
            (ParenOpen, "("),
            (PredicateName, "#not-eq?"),
            (At, "@"),
            (Id, "a"),
            (DoubleQuote, "\""),
            (StrVal, "x"),
            (DoubleQuote, "\""),
            (ParenClose, ")"),
            (ParenOpen, "("),
            (PredicateName, "#set!"),
            (Id, "key"),
            (ParenClose, ")"),
        ]
    );
}

#[test]
fn keyword_and_identifiers() {
    assert_eq!(kinds("ERROR ERRORS"), [(KwError, "ERROR"), (Id, "ERRORS")]);
}

#[test]
fn comments_and_whitespace_are_trivia() {
    let tokens = lex("; leading\n(a) ; trailing");
    let trivia: Vec<_> = tokens.iter().filter(|t| t.kind.is_trivia()).map(|t| t.kind).collect();
    assert_eq!(trivia, [LineComment, Newline, Whitespace, LineComment]);
}

#[test]
fn empty_and_escaped_strings() {
    assert_eq!(kinds(r#""""#), [(DoubleQuote, "\""), (DoubleQuote, "\"")]);
    assert_eq!(
        kinds(r#""a\"b""#),
        [(DoubleQuote, "\""), (StrVal, r#"a\"b"#), (DoubleQuote, "\"")]
    );
}

#[test]
fn garbage_is_coalesced() {
    assert_eq!(kinds("(a) %%$ (b)"), [
        (ParenOpen, "("),
        (Id, "a"),
        (ParenClose, ")"),
        (Garbage, "%%$"),
        (ParenOpen, "("),
        (Id, "b"),
        (ParenClose, ")"),
    ]);
    assert_eq!(kinds("(a) 42"), [(ParenOpen, "("), (Id, "a"), (ParenClose, ")"), (Garbage, "42")]);
}

#[test]
fn escapes() {
    assert_eq!(unescape(r#"a\"b"#), "a\"b");
    assert_eq!(unescape(r"tab\there\n"), "tab\there\n");
    assert_eq!(unescape(r"back\\slash"), "back\\slash");
    assert_eq!(unescape(r"\q"), "q");
    assert_eq!(unescape("plain"), "plain");
}
