//! Predicate and directive checking.
//!
//! Turns `(#name? args...)` into a [`Predicate`] or a [`Property`]. The
//! built-in names are fixed; anything else must come from the registry the
//! query is compiled with. Capture arguments must be bound by the pattern the
//! predicate belongs to.

use regex_automata::meta::Regex;
use regex_syntax::ast;
use rowan::{TextRange, TextSize};
use sapwood_core::Interner;
use sapwood_core::utils::{find_similar, suggestion_distance};
use sapwood_program::{CaptureId, Predicate, PredicateArg, PredicateRegistry, Property, TextOp};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::ast::{self as query_ast, PredicateArg as ArgSyntax};

const BUILTINS: &[&str] = &[
    "eq?",
    "not-eq?",
    "any-eq?",
    "any-not-eq?",
    "match?",
    "not-match?",
    "any-match?",
    "any-not-match?",
    "any-of?",
    "not-any-of?",
    "set!",
];

/// What a predicate call compiles to.
#[derive(Debug)]
pub enum Directive {
    Predicate(Predicate),
    Property(Property),
}

/// Compiles predicate calls for one pattern.
pub struct PredicateChecker<'a> {
    pub registry: &'a PredicateRegistry,
    pub captures: &'a Interner,
    /// Captures bound by the pattern.
    pub bound: &'a [CaptureId],
}

impl PredicateChecker<'_> {
    pub fn check(
        &self,
        predicate: &query_ast::Predicate,
        diagnostics: &mut Diagnostics,
    ) -> Option<Directive> {
        let name_token = predicate.name()?;
        let name = name_token.text().trim_start_matches('#');
        let args: Vec<ArgSyntax> = predicate.args().collect();

        let mut call = Call {
            checker: self,
            name,
            range: predicate.text_range(),
            args: &args,
            diagnostics,
        };

        match name {
            "eq?" | "not-eq?" | "any-eq?" | "any-not-eq?" => call.eq(text_op(name, "eq?")),
            "match?" | "not-match?" | "any-match?" | "any-not-match?" => {
                call.match_(text_op(name, "match?"))
            }
            "any-of?" | "not-any-of?" => call.any_of(name == "not-any-of?"),
            "set!" => call.set(),
            _ => call.custom(name_token.text_range()),
        }
    }
}

fn text_op(name: &str, base: &str) -> TextOp {
    let prefix = name.strip_suffix(base).unwrap_or_default();
    TextOp::new(prefix.contains("not-"), prefix.starts_with("any-"))
}

struct Call<'c, 'a> {
    checker: &'c PredicateChecker<'a>,
    name: &'c str,
    range: TextRange,
    args: &'c [ArgSyntax],
    diagnostics: &'c mut Diagnostics,
}

impl Call<'_, '_> {
    fn arity(&mut self, min: usize, max: usize) -> Option<()> {
        let got = self.args.len();
        if (min..=max).contains(&got) {
            return Some(());
        }
        let expected = match (min, max) {
            (min, max) if min == max => format!("{min}"),
            (min, usize::MAX) => format!("at least {min}"),
            (min, max) => format!("{min} to {max}"),
        };
        let plural = if max == 1 { "" } else { "s" };
        self.diagnostics
            .report(DiagnosticKind::PredicateArity, self.range)
            .message(format!(
                "`#{}` takes {expected} argument{plural}, got {got}",
                self.name
            ))
            .emit();
        None
    }

    fn capture(&mut self, arg: &ArgSyntax) -> Option<CaptureId> {
        let ArgSyntax::Capture(capture) = arg else {
            self.diagnostics
                .report(DiagnosticKind::PredicateArgumentKind, arg.text_range())
                .message("expected a capture")
                .emit();
            return None;
        };
        let name = capture.name()?;
        let id = self
            .checker
            .captures
            .get(name.text())
            .map(|atom| CaptureId::new(atom.as_u32()))
            .filter(|id| self.checker.bound.contains(id));
        if id.is_none() {
            self.diagnostics
                .report(DiagnosticKind::UnboundCapture, capture.text_range())
                .message(name.text())
                .emit();
        }
        id
    }

    fn string(&mut self, arg: &ArgSyntax) -> Option<String> {
        match arg {
            ArgSyntax::Str(s) => Some(s.value()),
            _ => {
                self.diagnostics
                    .report(DiagnosticKind::PredicateArgumentKind, arg.text_range())
                    .message("expected a string")
                    .emit();
                None
            }
        }
    }

    /// Capture or string.
    fn operand(&mut self, arg: &ArgSyntax) -> Option<PredicateArg> {
        match arg {
            ArgSyntax::Capture(_) => self.capture(arg).map(PredicateArg::Capture),
            ArgSyntax::Str(s) => Some(PredicateArg::Literal(s.value())),
            ArgSyntax::Word(_) => {
                self.diagnostics
                    .report(DiagnosticKind::PredicateArgumentKind, arg.text_range())
                    .message("expected a capture or a string")
                    .emit();
                None
            }
        }
    }

    fn eq(&mut self, op: TextOp) -> Option<Directive> {
        self.arity(2, 2)?;
        let args = self.args;
        let capture = self.capture(&args[0]);
        let other = self.operand(&args[1]);
        Some(Directive::Predicate(Predicate::Eq {
            capture: capture?,
            other: other?,
            op,
        }))
    }

    fn match_(&mut self, op: TextOp) -> Option<Directive> {
        self.arity(2, 2)?;
        let args = self.args;
        let capture = self.capture(&args[0]);
        let pattern = self.string(&args[1])?;
        let regex = self.regex(&pattern, &args[1]);
        Some(Directive::Predicate(Predicate::Match {
            capture: capture?,
            regex: regex?,
            pattern,
            op,
        }))
    }

    fn regex(&mut self, pattern: &str, arg: &ArgSyntax) -> Option<Regex> {
        let parsed = ast::parse::ParserBuilder::new()
            .octal(false)
            .build()
            .parse(pattern);
        if let Err(err) = parsed {
            let range = regex_span(arg, pattern, err.span());
            self.diagnostics
                .report(DiagnosticKind::InvalidRegex, range)
                .message(err.kind().to_string())
                .emit();
            return None;
        }
        match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidRegex, arg.text_range())
                    .message(err.to_string())
                    .emit();
                None
            }
        }
    }

    fn any_of(&mut self, negated: bool) -> Option<Directive> {
        self.arity(2, usize::MAX)?;
        let args = self.args;
        let capture = self.capture(&args[0]);
        let mut values = Vec::with_capacity(args.len() - 1);
        let mut ok = true;
        for arg in &args[1..] {
            match self.string(arg) {
                Some(value) => values.push(value),
                None => ok = false,
            }
        }
        let capture = capture?;
        ok.then_some(Directive::Predicate(Predicate::AnyOf {
            capture,
            values,
            negated,
        }))
    }

    /// `(#set! [@capture] key [value])`
    fn set(&mut self) -> Option<Directive> {
        self.arity(1, 3)?;
        let args = self.args;
        let (capture, rest) = match args.split_first() {
            Some((first @ ArgSyntax::Capture(_), rest)) => (Some(self.capture(first)?), rest),
            _ => (None, args),
        };
        let Some((key, value)) = rest.split_first() else {
            self.diagnostics
                .report(DiagnosticKind::PredicateArity, self.range)
                .message("`#set!` needs a key")
                .emit();
            return None;
        };
        if value.len() > 1 {
            self.diagnostics
                .report(DiagnosticKind::PredicateArity, self.range)
                .message("`#set!` takes a key and at most one value")
                .emit();
            return None;
        }
        let key = self.word(key)?;
        let value = match value.first() {
            Some(arg) => Some(self.word(arg)?),
            None => None,
        };
        Some(Directive::Property(Property {
            key,
            value,
            capture,
        }))
    }

    /// String or bare word.
    fn word(&mut self, arg: &ArgSyntax) -> Option<String> {
        match arg {
            ArgSyntax::Str(s) => Some(s.value()),
            ArgSyntax::Word(token) => Some(token.text().to_owned()),
            ArgSyntax::Capture(_) => {
                self.diagnostics
                    .report(DiagnosticKind::PredicateArgumentKind, arg.text_range())
                    .message("expected a word or a string")
                    .emit();
                None
            }
        }
    }

    fn custom(&mut self, name_range: TextRange) -> Option<Directive> {
        let Some(predicate) = self.checker.registry.get(self.name).cloned() else {
            let mut candidates: Vec<&str> = BUILTINS.to_vec();
            candidates.extend(self.checker.registry.names());
            let similar = find_similar(self.name, candidates, suggestion_distance(self.name));
            let mut builder = self
                .diagnostics
                .report(DiagnosticKind::UnknownPredicate, name_range)
                .message(format!("#{}", self.name));
            if let Some(similar) = similar {
                builder = builder.hint(format!("did you mean `#{similar}`?"));
            }
            builder.emit();
            return None;
        };

        let arity = predicate.arity().clone();
        self.arity(*arity.start(), *arity.end())?;

        let syntax = self.args;
        let mut args = Vec::with_capacity(syntax.len());
        let mut ok = true;
        for arg in syntax {
            let compiled = match arg {
                ArgSyntax::Capture(_) => self.capture(arg).map(PredicateArg::Capture),
                ArgSyntax::Str(s) => Some(PredicateArg::Literal(s.value())),
                ArgSyntax::Word(token) => Some(PredicateArg::Literal(token.text().to_owned())),
            };
            match compiled {
                Some(arg) => args.push(arg),
                None => ok = false,
            }
        }
        ok.then_some(Directive::Predicate(Predicate::Custom { predicate, args }))
    }
}

/// Narrow a regex error to the offending characters when the string has no
/// escapes, so pattern offsets line up with query offsets.
fn regex_span(arg: &ArgSyntax, pattern: &str, span: &ast::Span) -> TextRange {
    let ArgSyntax::Str(s) = arg else {
        return arg.text_range();
    };
    let Some(raw) = s.raw_value() else {
        return arg.text_range();
    };
    if raw.text() != pattern {
        return arg.text_range();
    }
    let base = raw.text_range().start();
    let start = base + TextSize::from(span.start.offset as u32);
    let end = base + TextSize::from(span.end.offset.max(span.start.offset) as u32);
    TextRange::new(start, end)
}
