//! Compact binary encoding of grammar tables using postcard.

use std::sync::Arc;

use super::error::GrammarError;
use super::language::Grammar;
use super::scanner::ExternalScanner;
use super::table::GrammarTable;

impl GrammarTable {
    pub fn from_binary(bytes: &[u8]) -> Result<Self, GrammarError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, GrammarError> {
        Ok(postcard::to_allocvec(self)?)
    }
}

impl Grammar {
    /// Decode and validate a table produced by [`GrammarTable::to_binary`].
    pub fn from_binary(
        bytes: &[u8],
        scanner: Option<Arc<dyn ExternalScanner>>,
    ) -> Result<Self, GrammarError> {
        Self::new(GrammarTable::from_binary(bytes)?, scanner)
    }
}
