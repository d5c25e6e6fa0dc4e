//! Panicking checks for parser bugs. Kept out of coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::core::Parser;
use super::cst::SyntaxKind;

/// Lookaheads allowed without consuming a token or changing depth.
pub(super) const STALL_LIMIT: u32 = 256;

impl Parser<'_> {
    /// Panics when the parser keeps peeking without making progress.
    #[inline]
    pub(super) fn ensure_progress(&self) {
        let left = self.stall_guard.get();
        assert!(left > 0, "query parser made no progress in {STALL_LIMIT} lookaheads");
        self.stall_guard.set(left - 1);
    }

    /// Grammar functions are only entered on their leading token.
    #[inline]
    pub(super) fn assert_current(&mut self, expected: SyntaxKind) {
        let found = self.current();
        assert!(
            found == expected,
            "grammar rule entered on {found:?}, its caller must check for {expected:?}"
        );
    }
}
