//! Queue types for the scheduler

use std::collections::{BinaryHeap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{TaskId, TaskKind};

/// A task's unit of work. Runs at most once; failures are recorded, not thrown.
pub type TaskAction = Box<dyn FnOnce() -> eyre::Result<()>>;

/// A submitted task waiting in one of the two lanes
pub(crate) struct QueuedTask {
    pub(crate) id: TaskId,
    pub(crate) kind: TaskKind,
    pub(crate) label: Option<String>,
    pub(crate) order: u64,
    pub(crate) ready_at: Duration,
    pub(crate) action: TaskAction,
}

impl std::fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedTask")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("order", &self.order)
            .field("ready_at", &self.ready_at)
            .finish_non_exhaustive()
    }
}

impl Eq for QueuedTask {}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Earlier ready_at runs first, then earlier submission. BinaryHeap is a
        // max-heap, so "runs first" must compare as greater.
        other
            .ready_at
            .cmp(&self.ready_at)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// FIFO lane for promise-continuation work.
///
/// Invariant: fully drained before any macrotask executes.
#[derive(Default)]
pub(crate) struct MicrotaskQueue {
    queue: VecDeque<QueuedTask>,
}

impl MicrotaskQueue {
    pub(crate) fn enqueue(&mut self, task: QueuedTask) {
        self.queue.push_back(task);
    }

    pub(crate) fn pop(&mut self) -> Option<QueuedTask> {
        self.queue.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remove a queued task by ID
    pub(crate) fn take(&mut self, id: &TaskId) -> Option<QueuedTask> {
        let pos = self.queue.iter().position(|t| &t.id == id)?;
        self.queue.remove(pos)
    }
}

/// Timer lane, ordered by (ready_at, submission order)
#[derive(Default)]
pub(crate) struct MacrotaskQueue {
    heap: BinaryHeap<QueuedTask>,
}

impl MacrotaskQueue {
    pub(crate) fn enqueue(&mut self, task: QueuedTask) {
        self.heap.push(task);
    }

    pub(crate) fn pop(&mut self) -> Option<QueuedTask> {
        self.heap.pop()
    }

    /// Readiness time of the next task to run, if any
    pub(crate) fn next_ready_at(&self) -> Option<Duration> {
        self.heap.peek().map(|t| t.ready_at)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove a queued task by ID. The heap has no keyed removal, so this
    /// drains and rebuilds it.
    pub(crate) fn take(&mut self, id: &TaskId) -> Option<QueuedTask> {
        let mut taken = None;
        let kept: Vec<_> = self
            .heap
            .drain()
            .filter_map(|t| {
                if &t.id == id {
                    taken = Some(t);
                    None
                } else {
                    Some(t)
                }
            })
            .collect();
        self.heap = kept.into_iter().collect();
        taken
    }
}

/// A task whose action returned an error or panicked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFailure {
    pub id: TaskId,
    pub label: Option<String>,
    pub error: String,
}

/// Result of a `run_until_idle` drain
#[derive(Debug, Clone, Serialize)]
pub struct DrainReport {
    /// Tasks that ran, including ones that failed
    pub executed: u64,
    pub failed: Vec<TaskFailure>,
    pub finished_at: DateTime<Utc>,
}

/// Statistics for the scheduler
#[derive(Debug, Default, Clone, Serialize)]
pub struct SchedulerStats {
    pub total_submitted: u64,
    pub total_executed: u64,
    pub total_failed: u64,
    pub total_cancelled: u64,
    pub peak_micro_depth: usize,
    pub peak_macro_depth: usize,
    pub clock_jumps: u64,
}

/// Snapshot of queue depths and the logical clock
#[derive(Debug, Clone, Serialize)]
pub struct QueueState {
    pub micro_depth: usize,
    pub macro_depth: usize,
    pub now_ms: u64,
    pub stats: SchedulerStats,
}
