//! Hand-written lexing for tokens a regular language cannot describe.

use std::fmt;

/// Custom lexer for a grammar's external tokens (indentation, heredocs, ...).
///
/// The scanner's state is an opaque byte string owned by the parser. It is
/// recorded on every token so the parser can tell whether a subtree from an
/// older tree was lexed under the same conditions.
pub trait ExternalScanner: Send + Sync + fmt::Debug {
    /// Try to produce one external token at the lexer's position.
    ///
    /// `valid` is indexed by external token index. On success the scanner
    /// calls [`ScanLexer::set_result`] and returns `true`; on failure the
    /// parser discards any state changes.
    fn scan(&self, lexer: &mut ScanLexer<'_>, valid: &[bool], state: &mut Vec<u8>) -> bool;
}

/// Byte cursor handed to an [`ExternalScanner`].
#[derive(Debug)]
pub struct ScanLexer<'a> {
    input: &'a [u8],
    position: usize,
    token_start: usize,
    token_end: Option<usize>,
    examined_end: usize,
    result: Option<usize>,
}

impl<'a> ScanLexer<'a> {
    pub fn new(input: &'a [u8], position: usize) -> Self {
        Self {
            input,
            position,
            token_start: position,
            token_end: None,
            examined_end: position,
            result: None,
        }
    }

    /// Current byte, or `None` at the end of input.
    pub fn lookahead(&mut self) -> Option<u8> {
        self.examined_end = self.examined_end.max(self.position + 1);
        self.input.get(self.position).copied()
    }

    pub fn eof(&mut self) -> bool {
        self.lookahead().is_none()
    }

    /// Move past the current byte. Skipped bytes become padding in front of
    /// the token instead of part of it.
    pub fn advance(&mut self, skip: bool) {
        if self.position < self.input.len() {
            self.position += 1;
            if skip {
                self.token_start = self.position;
            }
        }
    }

    /// Fix the token's end at the current position. Without a call the token
    /// ends wherever the scanner stopped.
    pub fn mark_end(&mut self) {
        self.token_end = Some(self.position);
    }

    pub fn set_result(&mut self, external_index: usize) {
        self.result = Some(external_index);
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes between the start of the current line and the position.
    pub fn column(&self) -> usize {
        let line_start = self.input[..self.position]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        self.position - line_start
    }

    pub fn result(&self) -> Option<usize> {
        self.result
    }

    pub fn token_start(&self) -> usize {
        self.token_start
    }

    pub fn token_end(&self) -> usize {
        self.token_end.unwrap_or(self.position).max(self.token_start)
    }

    pub fn examined_end(&self) -> usize {
        self.examined_end.max(self.token_end())
    }
}
