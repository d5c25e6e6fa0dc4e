use super::Rule;
use super::dsl::*;

#[test]
fn optional_is_choice_with_blank() {
    assert_eq!(
        optional(lit("x")),
        Rule::Choice(vec![Rule::String("x".into()), Rule::Blank])
    );
}

#[test]
fn sep1_with_trailing_separator() {
    let rule = sep1(sym("item"), ",", true);
    let Rule::Seq(members) = rule else {
        panic!("expected a sequence");
    };
    assert_eq!(members.len(), 3);
    assert_eq!(members[0], sym("item"));
    assert_eq!(members[2], optional(lit(",")));
}

#[test]
fn builder_keeps_rule_order() {
    let grammar = GrammarBuilder::new("demo")
        .rule("start", repeat(sym("item")))
        .rule("item", pat("[a-z]+"))
        .extra(pat(r"\s"))
        .word("item")
        .build();

    assert_eq!(grammar.name, "demo");
    assert_eq!(grammar.rules[0].0, "start");
    assert_eq!(grammar.word.as_deref(), Some("item"));
    assert_eq!(grammar.extras.len(), 1);
}
