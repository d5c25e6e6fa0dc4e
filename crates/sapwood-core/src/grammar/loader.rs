use std::sync::Arc;

use super::error::GrammarError;
use super::language::Grammar;

/// Source of compiled grammars.
///
/// Implemented by whatever builds or ships grammar tables; the parser and
/// query compiler only ever see the resulting [`Grammar`].
pub trait GrammarLoader {
    fn load(&self, name: &str) -> Result<Arc<Grammar>, GrammarError>;

    /// Names this loader can resolve.
    fn names(&self) -> Vec<String> {
        Vec::new()
    }
}
