use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use super::ExecOptions;
use super::MatchAbort;
use super::budget::Budget;

#[test]
fn unlimited_by_default() {
    let mut budget = Budget::new(&ExecOptions::default());

    for _ in 0..10_000 {
        budget.step().unwrap();
    }
    assert_eq!(budget.steps(), 10_000);
    assert_eq!(budget.check(), Ok(()));
}

#[test]
fn step_limit_is_inclusive() {
    let mut budget = Budget::new(&ExecOptions::new().step_limit(3));

    for _ in 0..3 {
        budget.step().unwrap();
    }
    assert_eq!(budget.step(), Err(MatchAbort::StepLimitExceeded(3)));
}

#[test]
fn cancellation_is_sampled_periodically_while_stepping() {
    let flag = Arc::new(AtomicBool::new(true));
    let mut budget = Budget::new(&ExecOptions::new().cancellation(flag));

    for _ in 0..255 {
        budget.step().unwrap();
    }
    assert_eq!(budget.step(), Err(MatchAbort::Cancelled));
    assert_eq!(budget.check(), Err(MatchAbort::Cancelled));
}

#[test]
fn deadline() {
    let past = Budget::new(&ExecOptions::new().deadline(Instant::now()));
    assert_eq!(past.check(), Err(MatchAbort::DeadlineExceeded));

    let future = Budget::new(&ExecOptions::new().timeout(Duration::from_secs(3600)));
    assert_eq!(future.check(), Ok(()));
}

#[test]
fn nesting_depth_is_bounded() {
    let mut budget = Budget::new(&ExecOptions::new().recursion_limit(2));
    assert_eq!(ExecOptions::default().get_recursion_limit(), 512);

    budget.descend().unwrap();
    budget.descend().unwrap();
    assert_eq!(budget.descend(), Err(MatchAbort::RecursionLimitExceeded(2)));

    budget.ascend();
    assert_eq!(budget.descend(), Ok(()));
}
