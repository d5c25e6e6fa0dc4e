use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

/// Limits and filters for one query execution.
///
/// Only the nesting of quantifier iterations over structured bodies is
/// limited by default.
#[derive(Clone, Debug)]
pub struct ExecOptions {
    pub(crate) deadline: Option<Instant>,
    pub(crate) cancellation: Option<Arc<AtomicBool>>,
    /// Maximum number of node tests across the whole execution.
    pub(crate) step_limit: Option<u64>,
    /// Only nodes intersecting this byte range can start a match.
    pub(crate) byte_range: Option<Range<usize>>,
    /// Maximum live iterations of quantifiers whose body is more than one
    /// childless node (default: 512).
    pub(crate) recursion_limit: u32,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            deadline: None,
            cancellation: None,
            step_limit: None,
            byte_range: None,
            recursion_limit: 512,
        }
    }
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort with [`MatchAbort::DeadlineExceeded`](crate::MatchAbort) once
    /// `deadline` has passed.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Abort with [`MatchAbort::Cancelled`](crate::MatchAbort) once the flag
    /// is set. The flag is sampled once per visited node and periodically
    /// while matching.
    pub fn cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn byte_range(mut self, range: Range<usize>) -> Self {
        self.byte_range = Some(range);
        self
    }

    /// Abort with [`MatchAbort::RecursionLimitExceeded`](crate::MatchAbort)
    /// when a quantifier over a structured body needs more nested
    /// iterations. Runs of single childless nodes are not counted.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn get_deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn get_cancellation(&self) -> Option<&Arc<AtomicBool>> {
        self.cancellation.as_ref()
    }
    pub fn get_step_limit(&self) -> Option<u64> {
        self.step_limit
    }
    pub fn get_byte_range(&self) -> Option<&Range<usize>> {
        self.byte_range.as_ref()
    }
    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }
}
