use sapwood_core::{ExternalScanner, ScanLexer};

const NEWLINE: usize = 0;
const INDENT: usize = 1;
const DEDENT: usize = 2;

const TAB_WIDTH: u16 = 8;

/// Produces `_newline`, `_indent` and `_dedent` from line structure.
///
/// All three tokens are zero-width and sit right before the line break (or
/// at the end of input), so the break and the next line's indentation stay
/// ordinary padding. The state is the indentation stack, two little-endian
/// bytes per level, with the implicit bottom level 0 left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndentScanner;

impl IndentScanner {
    fn decode(state: &[u8]) -> Vec<u16> {
        let mut stack = vec![0];
        stack.extend(
            state
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
        );
        stack
    }

    fn encode(stack: &[u16], state: &mut Vec<u8>) {
        state.clear();
        for level in stack.iter().skip(1) {
            state.extend_from_slice(&level.to_le_bytes());
        }
    }
}

impl ExternalScanner for IndentScanner {
    fn scan(&self, lexer: &mut ScanLexer<'_>, valid: &[bool], state: &mut Vec<u8>) -> bool {
        let is_valid = |index: usize| valid.get(index).copied().unwrap_or(false);
        lexer.mark_end();

        let mut found_line_end = false;
        let mut indent: u16 = 0;
        loop {
            match lexer.lookahead() {
                None => {
                    found_line_end = true;
                    indent = 0;
                    break;
                }
                Some(b'\n') => {
                    found_line_end = true;
                    indent = 0;
                    lexer.advance(false);
                }
                Some(b' ') => {
                    indent = indent.saturating_add(1);
                    lexer.advance(false);
                }
                Some(b'\t') => {
                    indent = indent.saturating_add(TAB_WIDTH);
                    lexer.advance(false);
                }
                Some(b'\r' | b'\x0c') => {
                    indent = 0;
                    lexer.advance(false);
                }
                Some(b'#') => {
                    // A trailing comment is lexed as an extra first.
                    if !found_line_end {
                        return false;
                    }
                    while !matches!(lexer.lookahead(), None | Some(b'\n')) {
                        lexer.advance(false);
                    }
                }
                Some(_) => break,
            }
        }
        if !found_line_end {
            return false;
        }

        let mut stack = Self::decode(state);
        let current = stack.last().copied().unwrap_or(0);

        if is_valid(INDENT) && indent > current {
            stack.push(indent);
            Self::encode(&stack, state);
            lexer.set_result(INDENT);
            return true;
        }
        if is_valid(DEDENT) && indent < current {
            stack.pop();
            Self::encode(&stack, state);
            lexer.set_result(DEDENT);
            return true;
        }
        if is_valid(NEWLINE) {
            lexer.set_result(NEWLINE);
            return true;
        }
        false
    }
}
