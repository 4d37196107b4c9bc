//! taskloop - deterministic two-lane task scheduler
//!
//! taskloop reproduces browser event-loop ordering as an explicit, testable
//! draining loop instead of a host runtime's built-in scheduler. Work is
//! submitted to one of two lanes: microtasks (promise-continuation semantics,
//! FIFO, always drained to empty first) and macrotasks (timer semantics,
//! ordered by readiness over a logical clock).
//!
//! # Core Concepts
//!
//! - **Two lanes, one thread**: every pending microtask runs before the next
//!   macrotask; actions run serially to completion
//! - **Logical time**: the clock starts at zero and jumps to the next due
//!   macrotask, so interleavings are deterministic and fast to test
//! - **Failures reported, never thrown**: a failing or panicking action is
//!   recorded in the drain report and the drain continues
//! - **Collaborators injected**: fetch, render, and geolocation live behind
//!   plain traits the scheduler never sees into
//!
//! # Modules
//!
//! - [`scheduler`] - the two-lane draining loop and its configuration
//! - [`bridge`] - collaborator seams and the promisified request shape
//! - [`demo`] - canned collaborators and the replayed lessons
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod bridge;
pub mod cli;
pub mod config;
pub mod demo;
pub mod domain;
pub mod scheduler;

// Re-export commonly used types
pub use bridge::{FetchProvider, Position, PositionProvider, RenderSink, enqueue_request};
pub use config::{Config, DemoConfig};
pub use domain::{TaskHandle, TaskId, TaskKind};
pub use scheduler::{
    DrainReport, QueueState, Scheduler, SchedulerConfig, SchedulerError, SchedulerStats, TaskFailure,
};
