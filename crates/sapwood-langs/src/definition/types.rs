use serde::{Deserialize, Serialize};

/// A complete grammar definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrammarDefinition {
    pub name: String,
    /// Rules in definition order. The first rule is the start rule.
    pub rules: Vec<(String, Rule)>,
    /// Tokens allowed between any two tokens (whitespace, comments).
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Orderings that give named precedences their rank.
    #[serde(default)]
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    /// Conflicts the author expects; the generator keeps every conflict in
    /// the table either way and only reports the unexpected ones.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    /// Tokens produced by the external scanner, in scanner index order.
    #[serde(default)]
    pub externals: Vec<Rule>,
    /// Rules expanded in place instead of producing a node.
    #[serde(default)]
    pub inline: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Identifier-like token used to keep keywords from matching word
    /// prefixes.
    #[serde(default)]
    pub word: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rule {
    Blank,
    String(String),
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    Symbol(String),
    Seq(Vec<Rule>),
    Choice(Vec<Rule>),
    Repeat(Box<Rule>),
    Repeat1(Box<Rule>),
    Field {
        name: String,
        content: Box<Rule>,
    },
    Alias {
        content: Box<Rule>,
        value: String,
        named: bool,
    },
    Token(Box<Rule>),
    ImmediateToken(Box<Rule>),
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecDynamic {
        value: i32,
        content: Box<Rule>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
    Name(String),
}

impl From<i32> for Precedence {
    fn from(value: i32) -> Self {
        Precedence::Integer(value)
    }
}

impl From<&str> for Precedence {
    fn from(name: &str) -> Self {
        Precedence::Name(name.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecedenceEntry {
    Name(String),
    Symbol(String),
}

impl GrammarDefinition {
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}
