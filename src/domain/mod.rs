//! Domain types for taskloop
//!
//! Core domain types: TaskId, TaskKind, TaskHandle.
//! A task's identity and lane are fixed at submission; the scheduler owns
//! everything else about its lifecycle.

mod id;
mod task;

pub use id::TaskId;
pub use task::{TaskHandle, TaskKind};
