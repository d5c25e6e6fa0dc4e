use rowan::Checkpoint;

use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::{EXPR_FIRST, QUANTIFIERS};

impl Parser<'_> {
    /// Recursive descent entry. Dispatches on lookahead, then wraps the
    /// result in quantifier and capture suffixes.
    pub(crate) fn parse_expr(&mut self) {
        self.parse_expr_inner(true)
    }

    /// Used for field values so that `field: (x)*` parses as `(field: (x))*`.
    pub(crate) fn parse_expr_no_suffix(&mut self) {
        self.parse_expr_inner(false)
    }

    fn parse_expr_inner(&mut self, with_suffix: bool) {
        if !self.enter_recursion() {
            self.start_node(SyntaxKind::Error);
            while !self.eof() {
                self.skip_trivia_to_buffer();
                if self.eof() {
                    break;
                }
                self.bump();
            }
            self.finish_node();
            return;
        }

        let checkpoint = self.checkpoint();
        let mut suffixable = with_suffix;

        match self.current() {
            SyntaxKind::ParenOpen if self.next_is(SyntaxKind::PredicateName) => {
                self.parse_predicate();
                suffixable = false;
            }
            SyntaxKind::ParenOpen => self.parse_paren(),
            SyntaxKind::BracketOpen => self.parse_alt(),
            SyntaxKind::Underscore => self.parse_wildcard(),
            SyntaxKind::DoubleQuote => self.parse_str(),
            SyntaxKind::Dot => {
                self.parse_anchor();
                suffixable = false;
            }
            SyntaxKind::Negation => {
                self.parse_negated_field();
                suffixable = false;
            }
            SyntaxKind::Id => {
                if self.next_is(SyntaxKind::Colon) {
                    self.parse_field();
                } else {
                    self.error_bare_identifier();
                    suffixable = false;
                }
            }
            SyntaxKind::KwError => {
                self.error_bare_identifier();
                suffixable = false;
            }
            _ => {
                self.error_and_bump(DiagnosticKind::ExpectedExpression);
                suffixable = false;
            }
        }

        if suffixable {
            self.try_parse_quantifier(checkpoint);
            self.try_parse_captures(checkpoint);
        }

        self.exit_recursion();
    }

    /// Node kinds are written in parentheses: suggest `(name)`.
    fn error_bare_identifier(&mut self) {
        let span = self.current_span();
        let text = self.current_text();
        self.error_with_fix(
            DiagnosticKind::BareIdentifier,
            span,
            "wrap it in parentheses",
            format!("({text})"),
        );
        self.bump_as_error();
    }

    /// `field: expr`
    fn parse_field(&mut self) {
        self.start_node(SyntaxKind::Field);

        self.assert_current(SyntaxKind::Id);
        self.bump();
        self.assert_current(SyntaxKind::Colon);
        self.bump();

        if self.currently_is_one_of(EXPR_FIRST) {
            self.parse_expr_no_suffix();
        } else {
            self.error_msg(DiagnosticKind::ExpectedExpression, "after `field:`");
        }

        self.finish_node();
    }

    /// `!field`: the node must not have a child under this field.
    fn parse_negated_field(&mut self) {
        self.start_node(SyntaxKind::NegatedField);
        self.assert_current(SyntaxKind::Negation);
        self.bump();

        if self.currently_is(SyntaxKind::Id) {
            self.bump();
        } else {
            self.error_msg(DiagnosticKind::ExpectedFieldName, "e.g. `!value`");
        }
        self.finish_node();
    }

    /// `@name` with nothing before it. The name is swallowed with the `@`.
    pub(crate) fn error_capture_without_target(&mut self) {
        self.error(DiagnosticKind::CaptureWithoutTarget);
        self.start_node(SyntaxKind::Error);
        self.bump();
        if self.currently_is(SyntaxKind::Id) {
            self.bump();
        }
        self.finish_node();
    }

    /// Commas are a common slip; terms are separated by whitespace.
    pub(crate) fn error_skip_separator(&mut self) {
        let span = self.current_span();
        self.error_with_fix(DiagnosticKind::InvalidSeparator, span, "remove it", "");
        self.skip_token();
    }

    fn try_parse_quantifier(&mut self, checkpoint: Checkpoint) {
        if self.currently_is_one_of(QUANTIFIERS) {
            self.start_node_at(checkpoint, SyntaxKind::Quantifier);
            self.bump();
            self.finish_node();
        }
    }

    /// `@a @b` nests: the last capture is the outermost node.
    fn try_parse_captures(&mut self, checkpoint: Checkpoint) {
        while self.currently_is(SyntaxKind::At) {
            self.start_node_at(checkpoint, SyntaxKind::Capture);
            self.drain_trivia();
            self.bump();
            if self.currently_is(SyntaxKind::Id) {
                self.bump();
            } else {
                self.error(DiagnosticKind::ExpectedCaptureName);
            }
            self.finish_node();
        }
    }
}
