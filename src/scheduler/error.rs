//! Scheduler error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised synchronously at submission time for API misuse
///
/// Task failures are not errors of the scheduler: a failing action is recorded
/// in the drain report and never aborts the loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Delay {delay:?} exceeds configured maximum {max:?}")]
    DelayTooLarge { delay: Duration, max: Duration },

    #[error("A task labeled '{label}' is already pending")]
    DuplicateLabel { label: String },
}
