use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;

impl Parser<'_> {
    pub(crate) fn parse_wildcard(&mut self) {
        self.start_node(SyntaxKind::Wildcard);
        self.assert_current(SyntaxKind::Underscore);
        self.bump();
        self.finish_node();
    }

    /// `"if"`
    pub(crate) fn parse_str(&mut self) {
        self.start_node(SyntaxKind::Str);
        self.bump_string_tokens();
        self.finish_node();
    }

    /// Quote, optional content, quote.
    fn bump_string_tokens(&mut self) {
        self.assert_current(SyntaxKind::DoubleQuote);
        self.bump();

        if self.currently_is(SyntaxKind::StrVal) {
            self.bump();
        }

        // the lexer only produces quotes from complete strings
        self.assert_current(SyntaxKind::DoubleQuote);
        self.bump();
    }

    /// `.`
    pub(crate) fn parse_anchor(&mut self) {
        self.start_node(SyntaxKind::Anchor);
        self.assert_current(SyntaxKind::Dot);
        self.bump();
        self.finish_node();
    }
}
