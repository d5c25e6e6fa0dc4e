use sapwood_core::GrammarError;
use thiserror::Error;

/// A grammar definition that cannot be turned into a table.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("grammar `{0}` has no rules")]
    NoRules(String),

    #[error("start rule `{0}` must not be a token or an external")]
    TokenStartRule(String),

    #[error("rule `{rule}` refers to undefined symbol `{name}`")]
    UndefinedSymbol { rule: String, name: String },

    #[error("extra `{0}` is not a token")]
    NonTokenExtra(String),

    #[error("unsupported construct in `{rule}`: {message}")]
    Unsupported { rule: String, message: String },

    #[error("unknown named precedence `{0}`")]
    UnknownPrecedence(String),

    #[error("inline rule `{0}` expands to itself")]
    RecursiveInline(String),

    #[error("rule `{0}` expands to too many alternatives")]
    TooManyAlternatives(String),

    #[error("word rule `{0}` must be a lexical rule")]
    InvalidWord(String),

    #[error("token `{name}` is invalid: {message}")]
    InvalidToken { name: String, message: String },

    #[error("grammar needs {0} symbols, more than a table can index")]
    TooManySymbols(usize),
}

impl From<GenerateError> for GrammarError {
    fn from(err: GenerateError) -> Self {
        GrammarError::Invalid(err.to_string())
    }
}
