//! `grammar.json` loading.
//!
//! Rules are objects tagged by an upper-case `type`. The first entry of
//! `rules` is the start rule, so the object is read into an `IndexMap`.

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{GrammarDefinition, Precedence, PrecedenceEntry, Rule};

impl GrammarDefinition {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: GrammarFile = serde_json::from_str(json)?;
        Ok(file.into_definition())
    }
}

#[derive(Debug, Deserialize)]
struct GrammarFile {
    name: String,
    rules: IndexMap<String, JsonRule>,
    #[serde(default)]
    extras: Vec<JsonRule>,
    #[serde(default)]
    precedences: Vec<Vec<JsonPrecedenceEntry>>,
    #[serde(default)]
    conflicts: Vec<Vec<String>>,
    #[serde(default)]
    externals: Vec<JsonRule>,
    #[serde(default)]
    inline: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    word: Option<String>,
}

impl GrammarFile {
    fn into_definition(self) -> GrammarDefinition {
        let rules_of = |rules: Vec<JsonRule>| rules.into_iter().map(JsonRule::into_rule).collect();
        GrammarDefinition {
            name: self.name,
            rules: self
                .rules
                .into_iter()
                .map(|(name, rule)| (name, rule.into_rule()))
                .collect(),
            extras: rules_of(self.extras),
            precedences: self
                .precedences
                .into_iter()
                .map(|level| level.into_iter().map(JsonPrecedenceEntry::into_entry).collect())
                .collect(),
            conflicts: self.conflicts,
            externals: rules_of(self.externals),
            inline: self.inline,
            supertypes: self.supertypes,
            word: self.word,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum JsonRule {
    Blank,
    String {
        value: String,
    },
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    Symbol {
        name: String,
    },
    Seq {
        members: Vec<JsonRule>,
    },
    Choice {
        members: Vec<JsonRule>,
    },
    Repeat {
        content: Box<JsonRule>,
    },
    Repeat1 {
        content: Box<JsonRule>,
    },
    Field {
        name: String,
        content: Box<JsonRule>,
    },
    Alias {
        content: Box<JsonRule>,
        value: String,
        named: bool,
    },
    Token {
        content: Box<JsonRule>,
    },
    ImmediateToken {
        content: Box<JsonRule>,
    },
    Prec {
        value: JsonPrecedence,
        content: Box<JsonRule>,
    },
    PrecLeft {
        value: JsonPrecedence,
        content: Box<JsonRule>,
    },
    PrecRight {
        value: JsonPrecedence,
        content: Box<JsonRule>,
    },
    PrecDynamic {
        value: i32,
        content: Box<JsonRule>,
    },
    /// Reserved-word sets only affect keyword extraction upstream; the
    /// wrapped rule is used as is.
    Reserved {
        content: Box<JsonRule>,
    },
}

impl JsonRule {
    fn into_rule(self) -> Rule {
        let boxed = |content: Box<JsonRule>| Box::new(content.into_rule());
        let all = |members: Vec<JsonRule>| members.into_iter().map(JsonRule::into_rule).collect();

        match self {
            Self::Blank => Rule::Blank,
            Self::String { value } => Rule::String(value),
            Self::Pattern { value, flags } => Rule::Pattern { value, flags },
            Self::Symbol { name } => Rule::Symbol(name),
            Self::Seq { members } => Rule::Seq(all(members)),
            Self::Choice { members } => Rule::Choice(all(members)),
            Self::Repeat { content } => Rule::Repeat(boxed(content)),
            Self::Repeat1 { content } => Rule::Repeat1(boxed(content)),
            Self::Field { name, content } => Rule::Field {
                name,
                content: boxed(content),
            },
            Self::Alias {
                content,
                value,
                named,
            } => Rule::Alias {
                content: boxed(content),
                value,
                named,
            },
            Self::Token { content } => Rule::Token(boxed(content)),
            Self::ImmediateToken { content } => Rule::ImmediateToken(boxed(content)),
            Self::Prec { value, content } => Rule::Prec {
                value: value.into_precedence(),
                content: boxed(content),
            },
            Self::PrecLeft { value, content } => Rule::PrecLeft {
                value: value.into_precedence(),
                content: boxed(content),
            },
            Self::PrecRight { value, content } => Rule::PrecRight {
                value: value.into_precedence(),
                content: boxed(content),
            },
            Self::PrecDynamic { value, content } => Rule::PrecDynamic {
                value,
                content: boxed(content),
            },
            Self::Reserved { content } => content.into_rule(),
        }
    }
}

/// Numeric level or a name from the `precedences` lists.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonPrecedence {
    Level(i32),
    Named(String),
}

impl JsonPrecedence {
    fn into_precedence(self) -> Precedence {
        match self {
            Self::Level(level) => Precedence::Integer(level),
            Self::Named(name) => Precedence::Name(name),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum JsonPrecedenceEntry {
    String { value: String },
    Symbol { name: String },
}

impl JsonPrecedenceEntry {
    fn into_entry(self) -> PrecedenceEntry {
        match self {
            Self::String { value } => PrecedenceEntry::Name(value),
            Self::Symbol { name } => PrecedenceEntry::Symbol(name),
        }
    }
}
