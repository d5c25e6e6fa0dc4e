//! Step accounting and abort checks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::error::MatchAbort;
use super::options::ExecOptions;

/// Steps between clock and flag samples while matching.
const CHECK_INTERVAL: u64 = 256;

#[derive(Debug)]
pub(crate) struct Budget {
    steps: u64,
    limit: Option<u64>,
    deadline: Option<Instant>,
    cancellation: Option<Arc<AtomicBool>>,
    depth: u32,
    recursion_limit: u32,
}

impl Budget {
    pub(crate) fn new(options: &ExecOptions) -> Self {
        Self {
            steps: 0,
            limit: options.step_limit,
            deadline: options.deadline,
            cancellation: options.cancellation.clone(),
            depth: 0,
            recursion_limit: options.recursion_limit,
        }
    }

    /// Enter one nested quantifier iteration.
    pub(crate) fn descend(&mut self) -> Result<(), MatchAbort> {
        if self.depth >= self.recursion_limit {
            return Err(MatchAbort::RecursionLimitExceeded(self.recursion_limit));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Account for one node test.
    #[inline]
    pub(crate) fn step(&mut self) -> Result<(), MatchAbort> {
        self.steps += 1;
        if let Some(limit) = self.limit
            && self.steps > limit
        {
            return Err(MatchAbort::StepLimitExceeded(limit));
        }
        if self.steps % CHECK_INTERVAL == 0 {
            self.check()?;
        }
        Ok(())
    }

    /// Sample the cancellation flag and the clock.
    pub(crate) fn check(&self) -> Result<(), MatchAbort> {
        if let Some(flag) = &self.cancellation
            && flag.load(Ordering::Relaxed)
        {
            return Err(MatchAbort::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(MatchAbort::DeadlineExceeded);
        }
        Ok(())
    }

    pub(crate) fn steps(&self) -> u64 {
        self.steps
    }
}
