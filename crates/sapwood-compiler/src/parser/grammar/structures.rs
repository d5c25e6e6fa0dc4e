use rowan::Checkpoint;

use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::token_sets::{ALT_RECOVERY, EXPR_FIRST, TREE_RECOVERY};
use crate::parser::cst::{SyntaxKind, TokenSet};

impl Parser<'_> {
    /// `(kind ...)` | `(_ ...)` | `(ERROR)` | `((a) (b))` | `()`
    pub(crate) fn parse_paren(&mut self) {
        let checkpoint = self.checkpoint();
        self.push_delimiter();
        self.assert_current(SyntaxKind::ParenOpen);
        self.bump();

        match self.current() {
            SyntaxKind::Id | SyntaxKind::Underscore => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.bump();
                self.parse_children(SyntaxKind::ParenClose, TREE_RECOVERY);
                self.close_delimiter(SyntaxKind::ParenClose, DiagnosticKind::UnclosedTree, "node");
            }
            SyntaxKind::KwError => self.parse_error_tree(checkpoint),
            SyntaxKind::ParenOpen
            | SyntaxKind::BracketOpen
            | SyntaxKind::DoubleQuote
            | SyntaxKind::Dot => {
                self.start_node_at(checkpoint, SyntaxKind::Group);
                self.parse_children(SyntaxKind::ParenClose, TREE_RECOVERY);
                self.close_delimiter(SyntaxKind::ParenClose, DiagnosticKind::UnclosedGroup, "group");
            }
            SyntaxKind::ParenClose => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                let close = self.current_span();
                self.bump();
                if let Some(open) = self.delimiter_stack.pop() {
                    self.diagnostics
                        .report(DiagnosticKind::EmptyTree, open.span.cover(close))
                        .emit();
                }
            }
            _ => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.error_msg(DiagnosticKind::ExpectedExpression, "node kind after `(`");
                self.parse_children(SyntaxKind::ParenClose, TREE_RECOVERY);
                self.close_delimiter(SyntaxKind::ParenClose, DiagnosticKind::UnclosedTree, "node");
            }
        }

        self.finish_node();
    }

    /// `(ERROR)` matches error nodes and takes no children.
    fn parse_error_tree(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, SyntaxKind::Tree);
        self.bump();
        if !self.currently_is(SyntaxKind::ParenClose) && !self.should_stop() {
            self.error(DiagnosticKind::ErrorTakesNoArguments);
            self.parse_children(SyntaxKind::ParenClose, TREE_RECOVERY);
        }
        self.close_delimiter(SyntaxKind::ParenClose, DiagnosticKind::UnclosedTree, "node");
    }

    fn parse_children(&mut self, until: SyntaxKind, recovery: TokenSet) {
        loop {
            if self.should_stop() {
                break;
            }
            let kind = self.current();
            if kind == until || recovery.contains(kind) {
                break;
            }
            match kind {
                SyntaxKind::Comma => self.error_skip_separator(),
                SyntaxKind::At => self.error_capture_without_target(),
                SyntaxKind::PredicateName => {
                    self.error_and_bump(DiagnosticKind::PredicateWithoutParens)
                }
                _ if EXPR_FIRST.contains(kind) => self.parse_expr(),
                _ => self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected a pattern"),
            }
        }
    }

    /// `[a b c]`
    pub(crate) fn parse_alt(&mut self) {
        self.start_node(SyntaxKind::Alt);
        self.push_delimiter();
        let open = self.current_span();
        self.assert_current(SyntaxKind::BracketOpen);
        self.bump();

        if self.currently_is(SyntaxKind::BracketClose) {
            let close = self.current_span();
            self.diagnostics
                .report(DiagnosticKind::EmptyAlternation, open.cover(close))
                .emit();
        }
        self.parse_children(SyntaxKind::BracketClose, ALT_RECOVERY);

        self.close_delimiter(
            SyntaxKind::BracketClose,
            DiagnosticKind::UnclosedAlternation,
            "alternation",
        );
        self.finish_node();
    }
}
