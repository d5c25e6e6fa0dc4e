//! Context-aware lexing.
//!
//! The parser asks for one token at a time and says which lex mode to use.
//! Only tokens in that mode compete; whitespace and comments are tried after
//! them, so text that is a valid token in the current context is never
//! swallowed as an extra.

use std::sync::Arc;

use sapwood_core::{Grammar, LexMode, ScanLexer, SymbolId, SymbolKind};

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub symbol: SymbolId,
    /// Offset where the padding begins.
    pub start: usize,
    pub padding: usize,
    pub size: usize,
    /// One past the last byte any matcher looked at.
    pub examined_end: usize,
    pub lex_mode: u16,
    /// A visible extra such as a comment.
    pub extra: bool,
    pub scanner_before: Arc<[u8]>,
    pub scanner_after: Arc<[u8]>,
}

impl Token {
    pub fn content_start(&self) -> usize {
        self.start + self.padding
    }

    pub fn end(&self) -> usize {
        self.start + self.padding + self.size
    }
}

pub(crate) struct Lexer<'a> {
    grammar: &'a Grammar,
    input: &'a [u8],
}

impl<'a> Lexer<'a> {
    pub fn new(grammar: &'a Grammar, input: &'a [u8]) -> Self {
        Self { grammar, input }
    }

    /// Lex the next token at `start`.
    ///
    /// Hidden extras are folded into the token's padding. When nothing in
    /// the mode matches, every terminal is tried, and failing that one
    /// character becomes an `UNKNOWN` token.
    pub fn lex(
        &self,
        start: usize,
        mode_id: u16,
        scanner: &Arc<[u8]>,
        allow_external: bool,
    ) -> Token {
        let grammar = self.grammar;
        let mode = &grammar.table().lex_modes[mode_id as usize];
        let mut examined = start;
        let mut position = start;

        let token = |symbol, content_start: usize, size, examined, extra| Token {
            symbol,
            start,
            padding: content_start - start,
            size,
            examined_end: examined,
            lex_mode: mode_id,
            extra,
            scanner_before: scanner.clone(),
            scanner_after: scanner.clone(),
        };

        loop {
            if allow_external
                && !mode.externals.is_empty()
                && let Some((symbol, content_start, size, state)) =
                    self.scan_external(position, mode, scanner, &mut examined)
            {
                let mut external = token(symbol, content_start, size, examined, false);
                external.scanner_after = state;
                return external;
            }

            if let Some((symbol, len)) = self.longest(position, &mode.terminals, &mut examined) {
                return token(symbol, position, len, examined, false);
            }

            if let Some((symbol, len)) = self.longest(position, grammar.extras(), &mut examined) {
                if grammar.is_visible(symbol) {
                    return token(symbol, position, len, examined, true);
                }
                position += len;
                continue;
            }

            if position >= self.input.len() {
                examined = examined.max(self.input.len() + 1);
                return token(Grammar::END, position, 0, examined, false);
            }

            let fallback: Vec<SymbolId> = (1..grammar.externals().start)
                .filter(|&id| {
                    !grammar.is_extra(id)
                        && grammar
                            .symbol(id)
                            .is_some_and(|s| s.kind == SymbolKind::Terminal)
                })
                .collect();
            if let Some((symbol, len)) = self.longest(position, &fallback, &mut examined) {
                return token(symbol, position, len, examined, false);
            }

            let len = char_len(&self.input[position..]);
            examined = examined.max(position + len);
            return token(Grammar::UNKNOWN, position, len, examined, false);
        }
    }

    /// Returns the symbol, content start, size and new scanner state.
    fn scan_external(
        &self,
        position: usize,
        mode: &LexMode,
        scanner_state: &Arc<[u8]>,
        examined: &mut usize,
    ) -> Option<(SymbolId, usize, usize, Arc<[u8]>)> {
        let grammar = self.grammar;
        let scanner = grammar.scanner()?;
        let mut valid = vec![false; grammar.external_count()];
        for &symbol in &mode.externals {
            if let Some(index) = grammar.external_index(symbol) {
                valid[index] = true;
            }
        }

        let mut state = scanner_state.to_vec();
        let mut lexer = ScanLexer::new(self.input, position);
        let found = scanner.scan(&mut lexer, &valid, &mut state);
        *examined = (*examined).max(lexer.examined_end());
        if !found {
            return None;
        }
        let index = lexer.result()?;
        if !valid.get(index).copied().unwrap_or(false) {
            return None;
        }
        let symbol = grammar.external_symbol(index)?;
        let content_start = lexer.token_start();
        let size = lexer.token_end() - content_start;
        Some((symbol, content_start, size, Arc::from(state)))
    }

    /// Longest match among `candidates`: ties go to literals, then to the
    /// lower symbol. Keywords only count when the word token matches exactly
    /// as much.
    fn longest(
        &self,
        position: usize,
        candidates: &[SymbolId],
        examined: &mut usize,
    ) -> Option<(SymbolId, usize)> {
        let grammar = self.grammar;
        let mut best: Option<(SymbolId, usize, bool)> = None;
        let mut word_len: Option<Option<usize>> = None;

        for &symbol in candidates {
            let Some(matcher) = grammar.token_matcher(symbol) else {
                continue;
            };
            let found = matcher.longest_match(self.input, position);
            *examined = (*examined).max(found.examined_end);
            let Some(len) = found.len.filter(|&len| len > 0) else {
                continue;
            };

            if grammar.is_keyword(symbol) {
                let word = match word_len {
                    Some(word) => word,
                    None => {
                        let word = self.word_match(position, examined);
                        word_len = Some(word);
                        word
                    }
                };
                if word != Some(len) {
                    continue;
                }
            }

            let literal = matcher.is_literal();
            let better = match best {
                None => true,
                Some((other, other_len, other_literal)) => {
                    len > other_len
                        || (len == other_len && literal && !other_literal)
                        || (len == other_len && literal == other_literal && symbol < other)
                }
            };
            if better {
                best = Some((symbol, len, literal));
            }
        }
        best.map(|(symbol, len, _)| (symbol, len))
    }

    fn word_match(&self, position: usize, examined: &mut usize) -> Option<usize> {
        let matcher = self.grammar.token_matcher(self.grammar.word_token()?)?;
        let found = matcher.longest_match(self.input, position);
        *examined = (*examined).max(found.examined_end);
        found.len
    }
}

/// Length of the UTF-8 character starting `bytes`, or 1 for a stray byte.
fn char_len(bytes: &[u8]) -> usize {
    let width = match bytes.first() {
        Some(0xC0..=0xDF) => 2,
        Some(0xE0..=0xEF) => 3,
        Some(0xF0..=0xF7) => 4,
        _ => 1,
    };
    let valid = bytes
        .iter()
        .take(width)
        .skip(1)
        .take_while(|&&b| b & 0xC0 == 0x80)
        .count();
    if valid + 1 == width { width } else { 1 }
}
