//! Token matchers.
//!
//! Each terminal gets its own matcher so the lexer can ask only the tokens
//! valid in the current parse state. Regex tokens compile to dense DFAs that
//! are stepped byte by byte: that yields the longest match and, just as
//! important for incremental reuse, how far past the token the lexer looked.

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input, MatchKind};

/// Result of running one matcher at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch {
    /// Length of the longest match, if any.
    pub len: Option<usize>,
    /// One past the last byte examined. Equals `haystack.len() + 1` when the
    /// matcher needed to know that the input ended.
    pub examined_end: usize,
}

#[derive(Debug, Clone)]
pub enum TokenMatcher {
    Literal(Box<[u8]>),
    Regex(Box<dense::DFA<Vec<u32>>>),
}

impl TokenMatcher {
    pub fn literal(text: &str) -> Self {
        Self::Literal(text.as_bytes().into())
    }

    pub fn regex(pattern: &str) -> Result<Self, String> {
        let dfa = dense::Builder::new()
            .configure(
                dense::Config::new()
                    .match_kind(MatchKind::All)
                    .start_kind(StartKind::Anchored),
            )
            .build(pattern)
            .map_err(|e| e.to_string())?;
        Ok(Self::Regex(Box::new(dfa)))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Longest match starting exactly at `at`.
    pub fn longest_match(&self, haystack: &[u8], at: usize) -> TokenMatch {
        match self {
            Self::Literal(literal) => literal_match(literal, haystack, at),
            Self::Regex(dfa) => dfa_match(dfa, haystack, at),
        }
    }

    pub fn matches_empty(&self) -> bool {
        self.longest_match(&[], 0).len == Some(0)
    }
}

fn literal_match(literal: &[u8], haystack: &[u8], at: usize) -> TokenMatch {
    let rest = haystack.get(at..).unwrap_or_default();
    let common = rest
        .iter()
        .zip(literal.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == literal.len() {
        return TokenMatch {
            len: Some(literal.len()),
            examined_end: at + literal.len(),
        };
    }
    let examined_end = if common == rest.len() {
        haystack.len() + 1
    } else {
        at + common + 1
    };
    TokenMatch {
        len: None,
        examined_end,
    }
}

fn dfa_match(dfa: &dense::DFA<Vec<u32>>, haystack: &[u8], at: usize) -> TokenMatch {
    let input = Input::new(haystack).range(at..).anchored(Anchored::Yes);
    let Ok(mut state) = dfa.start_state_forward(&input) else {
        return TokenMatch {
            len: None,
            examined_end: at + 1,
        };
    };

    // Match states are delayed by one byte: entering a match state after
    // byte `i` reports a match ending before `i`.
    let mut last = None;
    for (offset, &byte) in haystack[at..].iter().enumerate() {
        state = dfa.next_state(state, byte);
        if dfa.is_special_state(state) {
            if dfa.is_match_state(state) {
                last = Some(offset);
            } else if dfa.is_dead_state(state) || dfa.is_quit_state(state) {
                return TokenMatch {
                    len: last,
                    examined_end: at + offset + 1,
                };
            }
        }
    }

    state = dfa.next_eoi_state(state);
    if dfa.is_match_state(state) {
        last = Some(haystack.len() - at);
    }
    TokenMatch {
        len: last,
        examined_end: haystack.len() + 1,
    }
}
