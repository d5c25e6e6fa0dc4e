/// Why query execution stopped before the tree was exhausted.
///
/// Matches yielded before the abort stay valid; nothing is yielded after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MatchAbort {
    #[error("query execution was cancelled")]
    Cancelled,

    #[error("query execution ran past its deadline")]
    DeadlineExceeded,

    #[error("query execution exceeded its limit of {0} steps")]
    StepLimitExceeded(u64),

    #[error("quantified pattern nested deeper than {0} iterations")]
    RecursionLimitExceeded(u32),
}
