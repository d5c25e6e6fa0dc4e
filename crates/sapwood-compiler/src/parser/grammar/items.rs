use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::{EXPR_FIRST, ROOT_RECOVERY};

impl Parser<'_> {
    /// Top level: patterns and trailing predicates, in any order.
    pub(crate) fn parse_root(&mut self) {
        self.start_node(SyntaxKind::Root);

        while !self.should_stop() {
            if !self.parse_item() {
                self.error_until_next_item();
            }
        }

        self.drain_trivia();
        self.finish_node();
    }

    /// Returns `false` when the current token cannot start an item; an
    /// error has been reported but nothing consumed.
    fn parse_item(&mut self) -> bool {
        match self.current() {
            kind if EXPR_FIRST.contains(kind) => {
                self.parse_expr();
                true
            }
            SyntaxKind::Comma => {
                self.error_skip_separator();
                true
            }
            SyntaxKind::At => {
                self.error_capture_without_target();
                true
            }
            SyntaxKind::PredicateName => {
                self.error_and_bump(DiagnosticKind::PredicateWithoutParens);
                true
            }
            _ => {
                self.error_msg(DiagnosticKind::UnexpectedToken, "expected a pattern like `(node)`");
                false
            }
        }
    }

    /// Wraps everything up to the next token that can start a pattern.
    fn error_until_next_item(&mut self) {
        self.start_node(SyntaxKind::Error);
        loop {
            self.bump();
            if self.should_stop() || self.currently_is_one_of(ROOT_RECOVERY) {
                break;
            }
        }
        self.finish_node();
    }
}
