//! Two-lane cooperative task scheduler
//!
//! Reproduces event-loop ordering as an explicit draining loop over two lanes:
//! a FIFO microtask queue (promise-continuation semantics) and a macrotask
//! queue ordered by readiness time over a logical clock. All pending
//! microtasks run before the next macrotask; task failures are isolated and
//! reported, never thrown.

mod config;
mod core;
mod error;
mod queue;

pub use config::SchedulerConfig;
pub use self::core::Scheduler;
pub use error::SchedulerError;
pub use queue::{DrainReport, QueueState, SchedulerStats, TaskAction, TaskFailure};
