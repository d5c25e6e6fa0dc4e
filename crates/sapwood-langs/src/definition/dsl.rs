//! Rule combinators mirroring tree-sitter's `grammar.js` helpers.

use super::types::{GrammarDefinition, Precedence, PrecedenceEntry, Rule};

pub fn blank() -> Rule {
    Rule::Blank
}

pub fn sym(name: &str) -> Rule {
    Rule::Symbol(name.to_owned())
}

pub fn lit(text: &str) -> Rule {
    Rule::String(text.to_owned())
}

pub fn pat(regex: &str) -> Rule {
    Rule::Pattern {
        value: regex.to_owned(),
        flags: None,
    }
}

pub fn seq(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Seq(members.into_iter().collect())
}

pub fn choice(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Choice(members.into_iter().collect())
}

pub fn optional(rule: Rule) -> Rule {
    choice([rule, blank()])
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat(Box::new(rule))
}

pub fn repeat1(rule: Rule) -> Rule {
    Rule::Repeat1(Box::new(rule))
}

/// `rule (sep rule)*`, optionally followed by a trailing separator.
pub fn sep1(rule: Rule, separator: &str, trailing: bool) -> Rule {
    let mut members = vec![rule.clone(), repeat(seq([lit(separator), rule]))];
    if trailing {
        members.push(optional(lit(separator)));
    }
    seq(members)
}

pub fn field(name: &str, content: Rule) -> Rule {
    Rule::Field {
        name: name.to_owned(),
        content: Box::new(content),
    }
}

pub fn alias(content: Rule, value: &str, named: bool) -> Rule {
    Rule::Alias {
        content: Box::new(content),
        value: value.to_owned(),
        named,
    }
}

pub fn token(content: Rule) -> Rule {
    Rule::Token(Box::new(content))
}

pub fn immediate_token(content: Rule) -> Rule {
    Rule::ImmediateToken(Box::new(content))
}

pub fn prec(value: impl Into<Precedence>, content: Rule) -> Rule {
    Rule::Prec {
        value: value.into(),
        content: Box::new(content),
    }
}

pub fn prec_left(value: impl Into<Precedence>, content: Rule) -> Rule {
    Rule::PrecLeft {
        value: value.into(),
        content: Box::new(content),
    }
}

pub fn prec_right(value: impl Into<Precedence>, content: Rule) -> Rule {
    Rule::PrecRight {
        value: value.into(),
        content: Box::new(content),
    }
}

/// Incrementally assembles a [`GrammarDefinition`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    definition: GrammarDefinition,
}

impl GrammarBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            definition: GrammarDefinition {
                name: name.to_owned(),
                ..GrammarDefinition::default()
            },
        }
    }

    pub fn rule(mut self, name: &str, rule: Rule) -> Self {
        self.definition.rules.push((name.to_owned(), rule));
        self
    }

    pub fn extra(mut self, rule: Rule) -> Self {
        self.definition.extras.push(rule);
        self
    }

    pub fn external(mut self, name: &str) -> Self {
        self.definition.externals.push(sym(name));
        self
    }

    pub fn word(mut self, name: &str) -> Self {
        self.definition.word = Some(name.to_owned());
        self
    }

    /// Named precedences, tightest first.
    pub fn precedences(mut self, names: &[&str]) -> Self {
        self.definition.precedences.push(
            names
                .iter()
                .map(|n| PrecedenceEntry::Name((*n).to_owned()))
                .collect(),
        );
        self
    }

    pub fn inline(mut self, name: &str) -> Self {
        self.definition.inline.push(name.to_owned());
        self
    }

    pub fn conflict(mut self, names: &[&str]) -> Self {
        self.definition
            .conflicts
            .push(names.iter().map(|n| (*n).to_owned()).collect());
        self
    }

    pub fn build(self) -> GrammarDefinition {
        self.definition
    }
}
