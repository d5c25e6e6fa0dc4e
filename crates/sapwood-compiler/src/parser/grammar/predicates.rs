use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::PREDICATE_RECOVERY;

impl Parser<'_> {
    /// `(#name? @capture "literal" word ...)`
    ///
    /// Arity and argument kinds depend on the predicate and are checked
    /// later; here any capture, string or bare word is accepted.
    pub(crate) fn parse_predicate(&mut self) {
        self.start_node(SyntaxKind::Predicate);
        self.push_delimiter();
        self.assert_current(SyntaxKind::ParenOpen);
        self.bump();
        self.assert_current(SyntaxKind::PredicateName);
        self.bump();

        loop {
            if self.should_stop() {
                break;
            }
            match self.current() {
                SyntaxKind::ParenClose => break,
                kind if PREDICATE_RECOVERY.contains(kind) => break,
                SyntaxKind::At => self.parse_capture_ref(),
                SyntaxKind::DoubleQuote => self.parse_str(),
                SyntaxKind::Id | SyntaxKind::KwError => self.bump(),
                SyntaxKind::Comma => self.error_skip_separator(),
                _ => self.error_and_bump_msg(
                    DiagnosticKind::InvalidPredicateArgument,
                    "expected `@capture`, a string or a word",
                ),
            }
        }

        self.close_delimiter(
            SyntaxKind::ParenClose,
            DiagnosticKind::UnclosedPredicate,
            "predicate",
        );
        self.finish_node();
    }

    /// `@name` inside a predicate refers to a capture of the pattern.
    fn parse_capture_ref(&mut self) {
        self.start_node(SyntaxKind::CaptureRef);
        self.bump();
        if self.currently_is(SyntaxKind::Id) {
            self.bump();
        } else {
            self.error(DiagnosticKind::ExpectedCaptureName);
        }
        self.finish_node();
    }
}
