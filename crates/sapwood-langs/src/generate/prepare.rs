//! Token extraction and rule flattening.

use std::collections::{HashMap, HashSet};

use sapwood_core::{Associativity, TokenPattern};

use super::error::GenerateError;
use crate::definition::{GrammarDefinition, Precedence, PrecedenceEntry, Rule};

/// Upper bound on alternatives a single rule may flatten into.
const MAX_ALTERNATIVES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum GSymbol {
    /// Index into [`Prepared::terminals`]; 0 is the end of input.
    Terminal(usize),
    /// Index into [`Prepared::externals`].
    External(usize),
    /// Index into [`Prepared::variables`].
    NonTerminal(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct LexicalToken {
    pub name: String,
    pub named: bool,
    pub visible: bool,
    pub pattern: TokenPattern,
    pub extra: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ExternalToken {
    pub name: String,
    pub named: bool,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Variable {
    pub name: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub symbol: GSymbol,
    pub field: Option<String>,
    pub alias: Option<(String, bool)>,
    pub precedence: i32,
    pub associativity: Associativity,
}

#[derive(Debug, Clone)]
pub(crate) struct GenProduction {
    pub lhs: usize,
    pub steps: Vec<Step>,
}

impl GenProduction {
    /// Precedence used when reducing: that of the final step.
    pub(crate) fn precedence(&self) -> (i32, Associativity) {
        self.steps
            .last()
            .map_or((0, Associativity::None), |s| (s.precedence, s.associativity))
    }
}

#[derive(Debug)]
pub(crate) struct Prepared {
    pub terminals: Vec<LexicalToken>,
    pub externals: Vec<ExternalToken>,
    /// Non-terminals; the start rule is always index 0.
    pub variables: Vec<Variable>,
    pub productions: Vec<GenProduction>,
    pub word: Option<usize>,
}

impl Prepared {
    /// Terminals and externals share one index space for lookahead sets.
    pub(crate) fn lookahead_index(&self, symbol: GSymbol) -> Option<usize> {
        match symbol {
            GSymbol::Terminal(t) => Some(t),
            GSymbol::External(e) => Some(self.terminals.len() + e),
            GSymbol::NonTerminal(_) => None,
        }
    }

    pub(crate) fn lookahead_symbol(&self, index: usize) -> GSymbol {
        if index < self.terminals.len() {
            GSymbol::Terminal(index)
        } else {
            GSymbol::External(index - self.terminals.len())
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Context {
    precedence: i32,
    associativity: Associativity,
    field: Option<String>,
    alias: Option<(String, bool)>,
}

impl Context {
    fn step(&self, symbol: GSymbol) -> Step {
        Step {
            symbol,
            field: self.field.clone(),
            alias: self.alias.clone(),
            precedence: self.precedence,
            associativity: self.associativity,
        }
    }

    /// Step for a helper symbol: keeps precedence, drops field and alias.
    fn bare_step(&self, symbol: GSymbol) -> Step {
        Step {
            symbol,
            field: None,
            alias: None,
            precedence: self.precedence,
            associativity: self.associativity,
        }
    }
}

enum RuleClass {
    Lexical(usize),
    External(usize),
    Inline,
    Syntax(usize),
}

struct Preparer<'d> {
    definition: &'d GrammarDefinition,
    rules: HashMap<&'d str, &'d Rule>,
    classes: HashMap<&'d str, RuleClass>,
    terminals: Vec<LexicalToken>,
    literal_tokens: HashMap<String, usize>,
    pattern_tokens: HashMap<String, usize>,
    externals: Vec<ExternalToken>,
    variables: Vec<Variable>,
    productions: Vec<GenProduction>,
    repeats: HashMap<String, usize>,
    precedence_ranks: HashMap<String, i32>,
    inline_stack: Vec<String>,
}

pub(crate) fn prepare(definition: &GrammarDefinition) -> Result<Prepared, GenerateError> {
    let Some((start_name, _)) = definition.rules.first() else {
        return Err(GenerateError::NoRules(definition.name.clone()));
    };

    let mut preparer = Preparer {
        definition,
        rules: definition
            .rules
            .iter()
            .map(|(name, rule)| (name.as_str(), rule))
            .collect(),
        classes: HashMap::new(),
        terminals: vec![LexicalToken {
            name: "end".to_owned(),
            named: false,
            visible: false,
            pattern: TokenPattern::End,
            extra: false,
        }],
        literal_tokens: HashMap::new(),
        pattern_tokens: HashMap::new(),
        externals: Vec::new(),
        variables: Vec::new(),
        productions: Vec::new(),
        repeats: HashMap::new(),
        precedence_ranks: precedence_ranks(&definition.precedences),
        inline_stack: Vec::new(),
    };

    preparer.classify()?;
    if !matches!(
        preparer.classes.get(start_name.as_str()),
        Some(RuleClass::Syntax(0))
    ) {
        return Err(GenerateError::TokenStartRule(start_name.clone()));
    }
    preparer.extras()?;

    for (name, rule) in &definition.rules {
        if let Some(&RuleClass::Syntax(index)) = preparer.classes.get(name.as_str()) {
            let alternatives = preparer.flatten(rule, &Context::default(), name)?;
            for steps in alternatives {
                preparer.productions.push(GenProduction { lhs: index, steps });
            }
        }
    }

    let word = match &definition.word {
        None => None,
        Some(name) => match preparer.classes.get(name.as_str()) {
            Some(&RuleClass::Lexical(index)) => Some(index),
            _ => return Err(GenerateError::InvalidWord(name.clone())),
        },
    };

    Ok(Prepared {
        terminals: preparer.terminals,
        externals: preparer.externals,
        variables: preparer.variables,
        productions: preparer.productions,
        word,
    })
}

/// Earlier entries in an ordering bind tighter.
fn precedence_ranks(orderings: &[Vec<PrecedenceEntry>]) -> HashMap<String, i32> {
    let mut ranks = HashMap::new();
    for ordering in orderings {
        for (i, entry) in ordering.iter().enumerate() {
            let (PrecedenceEntry::Name(name) | PrecedenceEntry::Symbol(name)) = entry;
            ranks
                .entry(name.clone())
                .or_insert((ordering.len() - i) as i32);
        }
    }
    ranks
}

fn is_lexical(rule: &Rule) -> bool {
    match rule {
        Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => true,
        Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. } => is_lexical(content),
        _ => false,
    }
}

fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\.+*?()|[]{}^$#&-~".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl<'d> Preparer<'d> {
    fn classify(&mut self) -> Result<(), GenerateError> {
        let definition = self.definition;
        for (i, external) in definition.externals.iter().enumerate() {
            let (name, named) = match external {
                Rule::Symbol(name) => (name.clone(), true),
                Rule::String(text) => (text.clone(), false),
                _ => {
                    return Err(GenerateError::Unsupported {
                        rule: "externals".to_owned(),
                        message: "externals must be symbols or strings".to_owned(),
                    });
                }
            };
            let visible = !name.starts_with('_');
            self.externals.push(ExternalToken {
                name,
                named,
                visible,
            });
            if let Rule::Symbol(name) = external {
                self.classes.insert(name.as_str(), RuleClass::External(i));
            }
        }

        let inline: HashSet<&str> = definition.inline.iter().map(String::as_str).collect();
        for (name, rule) in &definition.rules {
            let name = name.as_str();
            if self.classes.contains_key(name) {
                continue;
            }
            if inline.contains(name) {
                self.classes.insert(name, RuleClass::Inline);
            } else if is_lexical(rule) {
                let pattern = self.token_pattern(rule, name)?;
                let index = self.terminals.len();
                self.terminals.push(LexicalToken {
                    name: name.to_owned(),
                    named: true,
                    visible: !name.starts_with('_'),
                    pattern,
                    extra: false,
                });
                self.classes.insert(name, RuleClass::Lexical(index));
            } else {
                let index = self.variables.len();
                self.variables.push(Variable {
                    name: name.to_owned(),
                    visible: !name.starts_with('_'),
                });
                self.classes.insert(name, RuleClass::Syntax(index));
            }
        }
        Ok(())
    }

    fn extras(&mut self) -> Result<(), GenerateError> {
        let definition = self.definition;
        for extra in &definition.extras {
            let index = match extra {
                Rule::Symbol(name) => match self.classes.get(name.as_str()) {
                    Some(&RuleClass::Lexical(index)) => index,
                    Some(_) => return Err(GenerateError::NonTokenExtra(name.clone())),
                    None => {
                        return Err(GenerateError::UndefinedSymbol {
                            rule: "extras".to_owned(),
                            name: name.clone(),
                        });
                    }
                },
                rule if is_lexical(rule) => self.anonymous_token(rule, "extras")?,
                _ => return Err(GenerateError::NonTokenExtra(format!("{extra:?}"))),
            };
            self.terminals[index].extra = true;
        }
        Ok(())
    }

    fn rank(&self, value: &Precedence) -> Result<i32, GenerateError> {
        match value {
            Precedence::Integer(n) => Ok(*n),
            Precedence::Name(name) => self
                .precedence_ranks
                .get(name)
                .copied()
                .ok_or_else(|| GenerateError::UnknownPrecedence(name.clone())),
        }
    }

    fn token_pattern(&self, rule: &Rule, owner: &str) -> Result<TokenPattern, GenerateError> {
        match rule {
            Rule::String(text) => Ok(TokenPattern::Literal(text.clone())),
            Rule::Token(content) | Rule::ImmediateToken(content) => {
                if let Rule::String(text) = content.as_ref() {
                    Ok(TokenPattern::Literal(text.clone()))
                } else {
                    Ok(TokenPattern::Regex(self.regex(content, owner)?))
                }
            }
            Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. }
            | Rule::PrecDynamic { content, .. } => self.token_pattern(content, owner),
            other => Ok(TokenPattern::Regex(self.regex(other, owner)?)),
        }
    }

    fn regex(&self, rule: &Rule, owner: &str) -> Result<String, GenerateError> {
        Ok(match rule {
            Rule::Blank => String::new(),
            Rule::String(text) => escape_regex(text),
            Rule::Pattern { value, flags } => match flags.as_deref() {
                Some(flags) if flags.contains('i') => format!("(?i:{value})"),
                _ => format!("(?:{value})"),
            },
            Rule::Seq(members) => members
                .iter()
                .map(|m| self.regex(m, owner))
                .collect::<Result<Vec<_>, _>>()?
                .concat(),
            Rule::Choice(members) => {
                let alternatives = members
                    .iter()
                    .map(|m| self.regex(m, owner))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("(?:{})", alternatives.join("|"))
            }
            Rule::Repeat(content) => format!("(?:{})*", self.regex(content, owner)?),
            Rule::Repeat1(content) => format!("(?:{})+", self.regex(content, owner)?),
            Rule::Token(content)
            | Rule::ImmediateToken(content)
            | Rule::Field { content, .. }
            | Rule::Alias { content, .. }
            | Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. }
            | Rule::PrecDynamic { content, .. } => self.regex(content, owner)?,
            Rule::Symbol(name) => match self.rules.get(name.as_str()) {
                Some(&inner) if is_lexical(inner) => self.regex(inner, owner)?,
                _ => {
                    return Err(GenerateError::Unsupported {
                        rule: owner.to_owned(),
                        message: format!("token refers to non-lexical rule `{name}`"),
                    });
                }
            },
        })
    }

    /// Terminal for a token that appears inline in a syntax rule.
    fn anonymous_token(&mut self, rule: &Rule, owner: &str) -> Result<usize, GenerateError> {
        match self.token_pattern(rule, owner)? {
            TokenPattern::Literal(text) => Ok(self.literal_token(&text)),
            TokenPattern::Regex(regex) => {
                if let Some(&index) = self.pattern_tokens.get(&regex) {
                    return Ok(index);
                }
                let index = self.terminals.len();
                self.terminals.push(LexicalToken {
                    name: format!("_{owner}_token{}", self.pattern_tokens.len() + 1),
                    named: false,
                    visible: false,
                    pattern: TokenPattern::Regex(regex.clone()),
                    extra: false,
                });
                self.pattern_tokens.insert(regex, index);
                Ok(index)
            }
            TokenPattern::End | TokenPattern::External => unreachable!("not produced by rules"),
        }
    }

    fn literal_token(&mut self, text: &str) -> usize {
        if let Some(&index) = self.literal_tokens.get(text) {
            return index;
        }
        let index = self.terminals.len();
        self.terminals.push(LexicalToken {
            name: text.to_owned(),
            named: false,
            visible: true,
            pattern: TokenPattern::Literal(text.to_owned()),
            extra: false,
        });
        self.literal_tokens.insert(text.to_owned(), index);
        index
    }

    /// Expand a rule into its alternatives, each a sequence of steps.
    fn flatten(
        &mut self,
        rule: &Rule,
        ctx: &Context,
        owner: &str,
    ) -> Result<Vec<Vec<Step>>, GenerateError> {
        Ok(match rule {
            Rule::Blank => vec![vec![]],
            Rule::String(text) => {
                let index = self.literal_token(text);
                vec![vec![ctx.step(GSymbol::Terminal(index))]]
            }
            Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                let index = self.anonymous_token(rule, owner)?;
                vec![vec![ctx.step(GSymbol::Terminal(index))]]
            }
            Rule::Symbol(name) => return self.flatten_symbol(name, ctx, owner),
            Rule::Seq(members) => {
                let mut acc: Vec<Vec<Step>> = vec![vec![]];
                for member in members {
                    let alternatives = self.flatten(member, ctx, owner)?;
                    if acc.len() * alternatives.len() > MAX_ALTERNATIVES {
                        return Err(GenerateError::TooManyAlternatives(owner.to_owned()));
                    }
                    acc = acc
                        .iter()
                        .flat_map(|prefix| {
                            alternatives.iter().map(move |suffix| {
                                prefix.iter().chain(suffix).cloned().collect::<Vec<_>>()
                            })
                        })
                        .collect();
                }
                acc
            }
            Rule::Choice(members) => {
                let mut all = Vec::new();
                for member in members {
                    all.extend(self.flatten(member, ctx, owner)?);
                }
                if all.len() > MAX_ALTERNATIVES {
                    return Err(GenerateError::TooManyAlternatives(owner.to_owned()));
                }
                all
            }
            Rule::Repeat(content) => {
                let aux = self.repeat_symbol(content, ctx, owner)?;
                vec![vec![ctx.bare_step(GSymbol::NonTerminal(aux))], vec![]]
            }
            Rule::Repeat1(content) => {
                let aux = self.repeat_symbol(content, ctx, owner)?;
                vec![vec![ctx.bare_step(GSymbol::NonTerminal(aux))]]
            }
            Rule::Field { name, content } => {
                let inner = Context {
                    field: Some(name.clone()),
                    ..ctx.clone()
                };
                self.flatten(content, &inner, owner)?
            }
            Rule::Alias {
                content,
                value,
                named,
            } => {
                let inner = Context {
                    alias: Some((value.clone(), *named)),
                    ..ctx.clone()
                };
                self.flatten(content, &inner, owner)?
            }
            Rule::Prec { value, content } => {
                let inner = Context {
                    precedence: self.rank(value)?,
                    ..ctx.clone()
                };
                self.flatten(content, &inner, owner)?
            }
            Rule::PrecLeft { value, content } => {
                let inner = Context {
                    precedence: self.rank(value)?,
                    associativity: Associativity::Left,
                    ..ctx.clone()
                };
                self.flatten(content, &inner, owner)?
            }
            Rule::PrecRight { value, content } => {
                let inner = Context {
                    precedence: self.rank(value)?,
                    associativity: Associativity::Right,
                    ..ctx.clone()
                };
                self.flatten(content, &inner, owner)?
            }
            Rule::PrecDynamic { content, .. } => self.flatten(content, ctx, owner)?,
        })
    }

    fn flatten_symbol(
        &mut self,
        name: &str,
        ctx: &Context,
        owner: &str,
    ) -> Result<Vec<Vec<Step>>, GenerateError> {
        let symbol = match self.classes.get(name) {
            Some(&RuleClass::Lexical(index)) => GSymbol::Terminal(index),
            Some(&RuleClass::External(index)) => GSymbol::External(index),
            Some(&RuleClass::Syntax(index)) => GSymbol::NonTerminal(index),
            Some(RuleClass::Inline) => {
                if self.inline_stack.iter().any(|n| n == name) {
                    return Err(GenerateError::RecursiveInline(name.to_owned()));
                }
                let rule = self.rules[name];
                self.inline_stack.push(name.to_owned());
                let expanded = self.flatten(rule, ctx, owner);
                self.inline_stack.pop();
                return expanded;
            }
            None => {
                return Err(GenerateError::UndefinedSymbol {
                    rule: owner.to_owned(),
                    name: name.to_owned(),
                });
            }
        };
        Ok(vec![vec![ctx.step(symbol)]])
    }

    /// Hidden left-recursive helper: `aux -> aux item | item`.
    fn repeat_symbol(
        &mut self,
        content: &Rule,
        ctx: &Context,
        owner: &str,
    ) -> Result<usize, GenerateError> {
        let key = format!("{content:?}/{ctx:?}");
        if let Some(&aux) = self.repeats.get(&key) {
            return Ok(aux);
        }

        let aux = self.variables.len();
        self.variables.push(Variable {
            name: format!("{owner}_repeat{}", self.repeats.len() + 1),
            visible: false,
        });
        self.repeats.insert(key, aux);

        let alternatives = self.flatten(content, ctx, owner)?;
        let recursion = ctx.bare_step(GSymbol::NonTerminal(aux));
        for steps in &alternatives {
            let mut recursive = Vec::with_capacity(steps.len() + 1);
            recursive.push(recursion.clone());
            recursive.extend(steps.iter().cloned());
            self.productions.push(GenProduction {
                lhs: aux,
                steps: recursive,
            });
        }
        for steps in alternatives {
            self.productions.push(GenProduction { lhs: aux, steps });
        }
        Ok(aux)
    }
}
