//! Tokenizer for query text.
//!
//! Tokens are spans only; text is sliced from the source on demand. Runs of
//! unrecognized characters become one `Garbage` token so malformed input
//! does not flood the parser with single-character errors.

use std::ops::Range;

use logos::Logos;
use rowan::TextRange;

use super::cst::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: Range<usize>) -> Self {
        let span = TextRange::new((span.start as u32).into(), (span.end as u32).into());
        Self { kind, span }
    }
}

pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut garbage_start: Option<usize> = None;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let Ok(kind) = result else {
            garbage_start.get_or_insert(span.start);
            continue;
        };
        if let Some(start) = garbage_start.take() {
            tokens.push(Token::new(SyntaxKind::Garbage, start..span.start));
        }
        if kind == SyntaxKind::StringLiteral {
            split_string(span, &mut tokens);
        } else {
            tokens.push(Token::new(kind, span));
        }
    }
    if let Some(start) = garbage_start {
        tokens.push(Token::new(SyntaxKind::Garbage, start..source.len()));
    }

    tokens
}

/// `"text"` becomes quote, content, quote. Empty strings have no content token.
fn split_string(span: Range<usize>, tokens: &mut Vec<Token>) {
    let Range { start, end } = span;
    tokens.push(Token::new(SyntaxKind::DoubleQuote, start..start + 1));
    if end - start > 2 {
        tokens.push(Token::new(SyntaxKind::StrVal, start + 1..end - 1));
    }
    tokens.push(Token::new(SyntaxKind::DoubleQuote, end - 1..end));
}

#[inline]
pub fn token_text<'q>(source: &'q str, token: &Token) -> &'q str {
    &source[Range::<usize>::from(token.span)]
}

/// Resolve the escapes of a string literal's content. Unknown escapes stand
/// for the escaped character itself.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
