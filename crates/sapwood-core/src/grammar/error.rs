use thiserror::Error;

/// A grammar table that cannot be used.
///
/// Raised while loading or validating a table; a parser is never built from
/// a grammar that produced one of these.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar table decode error: {0}")]
    Binary(#[from] postcard::Error),

    #[error("grammar JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed grammar table: {0}")]
    Invalid(String),

    #[error("token `{name}` has an invalid pattern: {message}")]
    Token { name: String, message: String },

    #[error("token `{name}` matches the empty string")]
    EmptyToken { name: String },

    #[error("grammar `{grammar}` declares external tokens but no scanner was supplied")]
    MissingScanner { grammar: String },

    #[error("grammar table version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("grammar `{0}` not found")]
    NotFound(String),
}

impl GrammarError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
