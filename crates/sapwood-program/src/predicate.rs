//! Post-match text checks.
//!
//! Predicates see every capture as a list of node texts, since a quantified
//! capture can bind several nodes in one match. Plain forms require every
//! node to pass and hold vacuously over an empty list. `any-` forms require
//! at least one passing node.

use regex_automata::meta::Regex;

use crate::program::CaptureId;
use crate::registry::CustomPredicate;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PredicateArg {
    Capture(CaptureId),
    Literal(String),
}

/// Text handed to a custom predicate for one argument.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PredicateValue<'a> {
    /// Texts of the nodes a capture bound, in match order.
    Nodes(&'a [&'a [u8]]),
    Literal(&'a str),
}

/// How a text test combines over a capture's nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TextOp {
    /// `not-`: the test is inverted per node.
    pub negated: bool,
    /// `any-`: one passing node suffices.
    pub any: bool,
}

impl TextOp {
    pub fn new(negated: bool, any: bool) -> Self {
        Self { negated, any }
    }

    fn combine<T>(self, items: impl IntoIterator<Item = T>, mut test: impl FnMut(T) -> bool) -> bool {
        let mut items = items.into_iter();
        if self.any {
            items.any(|item| test(item) != self.negated)
        } else {
            items.all(|item| test(item) != self.negated)
        }
    }

    /// Prefix used in the predicate name, e.g. `any-not-`.
    pub fn prefix(self) -> &'static str {
        match (self.any, self.negated) {
            (false, false) => "",
            (false, true) => "not-",
            (true, false) => "any-",
            (true, true) => "any-not-",
        }
    }
}

#[derive(Clone, Debug)]
pub enum Predicate {
    /// `#eq?` family. Capture against capture compares every pair of nodes.
    Eq {
        capture: CaptureId,
        other: PredicateArg,
        op: TextOp,
    },
    /// `#match?` family. Unanchored search, like `#match?` in editors.
    Match {
        capture: CaptureId,
        regex: Regex,
        pattern: String,
        op: TextOp,
    },
    /// `#any-of?` / `#not-any-of?`.
    AnyOf {
        capture: CaptureId,
        values: Vec<String>,
        negated: bool,
    },
    /// A predicate from the registry the query was compiled with.
    Custom {
        predicate: CustomPredicate,
        args: Vec<PredicateArg>,
    },
}

impl Predicate {
    /// Captures the predicate reads.
    pub fn captures(&self) -> Vec<CaptureId> {
        let mut out = Vec::new();
        let args: &[PredicateArg] = match self {
            Self::Eq { capture, other, .. } => {
                out.push(*capture);
                std::slice::from_ref(other)
            }
            Self::Match { capture, .. } | Self::AnyOf { capture, .. } => {
                out.push(*capture);
                &[]
            }
            Self::Custom { args, .. } => args,
        };
        out.extend(args.iter().filter_map(|arg| match arg {
            PredicateArg::Capture(id) => Some(*id),
            PredicateArg::Literal(_) => None,
        }));
        out
    }

    /// Evaluate against the texts each capture bound in the match.
    pub fn evaluate<'a, F>(&self, texts: F) -> bool
    where
        F: Fn(CaptureId) -> Vec<&'a [u8]>,
    {
        match self {
            Self::Eq {
                capture,
                other: PredicateArg::Literal(literal),
                op,
            } => op.combine(texts(*capture), |text| text == literal.as_bytes()),
            Self::Eq {
                capture,
                other: PredicateArg::Capture(other),
                op,
            } => {
                let left = texts(*capture);
                let right = texts(*other);
                let pairs = left
                    .iter()
                    .flat_map(|l| right.iter().map(move |r| (*l, *r)));
                op.combine(pairs, |(l, r)| l == r)
            }
            Self::Match {
                capture, regex, op, ..
            } => op.combine(texts(*capture), |text| regex.is_match(text)),
            Self::AnyOf {
                capture,
                values,
                negated,
            } => TextOp::new(*negated, false).combine(texts(*capture), |text| {
                values.iter().any(|v| v.as_bytes() == text)
            }),
            Self::Custom { predicate, args } => {
                let resolved: Vec<Vec<&'a [u8]>> = args
                    .iter()
                    .map(|arg| match arg {
                        PredicateArg::Capture(id) => texts(*id),
                        PredicateArg::Literal(_) => Vec::new(),
                    })
                    .collect();
                let values: Vec<PredicateValue<'_>> = args
                    .iter()
                    .zip(&resolved)
                    .map(|(arg, nodes)| match arg {
                        PredicateArg::Capture(_) => PredicateValue::Nodes(nodes),
                        PredicateArg::Literal(s) => PredicateValue::Literal(s),
                    })
                    .collect();
                predicate.call(&values)
            }
        }
    }

    /// Name as written in the query, with its leading `#`.
    pub fn name(&self) -> String {
        match self {
            Self::Eq { op, .. } => format!("#{}eq?", op.prefix()),
            Self::Match { op, .. } => format!("#{}match?", op.prefix()),
            Self::AnyOf { negated: false, .. } => "#any-of?".to_owned(),
            Self::AnyOf { negated: true, .. } => "#not-any-of?".to_owned(),
            Self::Custom { predicate, .. } => format!("#{}", predicate.name()),
        }
    }
}
