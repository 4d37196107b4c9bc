//! Scheduler implementation

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::{TaskHandle, TaskId, TaskKind};

use super::config::SchedulerConfig;
use super::error::SchedulerError;
use super::queue::{
    DrainReport, MacrotaskQueue, MicrotaskQueue, QueueState, QueuedTask, SchedulerStats, TaskAction, TaskFailure,
};

/// Internal state behind the RefCell
struct SchedulerInner {
    /// Promise-continuation lane, FIFO
    micro: MicrotaskQueue,

    /// Timer lane, ordered by (ready_at, submission order)
    timers: MacrotaskQueue,

    /// Labels of still-pending named tasks, for duplicate rejection
    labels: HashSet<String>,

    /// Monotonic submission counter, tie-break for equal ready_at
    next_order: u64,

    /// Logical clock, advanced only by jumping to the next due timer
    now: Duration,

    /// Guard against run_until_idle re-entry from inside a task
    draining: bool,

    /// Statistics
    stats: SchedulerStats,
}

/// The Scheduler interleaves submitted work on a single logical thread:
/// every pending microtask drains before the next macrotask executes, and
/// macrotasks run in (ready_at, submission) order over a logical clock.
///
/// Clones are cheap handles onto the same queues, so an action can capture a
/// clone and submit follow-up work mid-drain.
#[derive(Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    /// Create a new scheduler with the given configuration
    pub fn new(config: SchedulerConfig) -> Self {
        debug!(?config, "Scheduler::new");
        Self {
            config,
            inner: Rc::new(RefCell::new(SchedulerInner {
                micro: MicrotaskQueue::default(),
                timers: MacrotaskQueue::default(),
                labels: HashSet::new(),
                next_order: 0,
                now: Duration::ZERO,
                draining: false,
                stats: SchedulerStats::default(),
            })),
        }
    }

    /// Current logical time. Starts at zero and advances only when the drain
    /// loop jumps to the next due macrotask.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// True when both lanes are empty
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.borrow();
        inner.micro.is_empty() && inner.timers.is_empty()
    }

    /// Enqueue a microtask at the tail of the microtask lane
    pub fn submit_microtask<F>(&self, action: F) -> TaskHandle
    where
        F: FnOnce() -> eyre::Result<()> + 'static,
    {
        self.push_task(None, TaskKind::Micro, Duration::ZERO, Box::new(action))
    }

    /// Enqueue a labeled microtask; a still-pending task with the same label
    /// is rejected
    pub fn submit_microtask_named<F>(&self, label: impl Into<String>, action: F) -> Result<TaskHandle, SchedulerError>
    where
        F: FnOnce() -> eyre::Result<()> + 'static,
    {
        let label = label.into();
        self.claim_label(&label)?;
        Ok(self.push_task(Some(label), TaskKind::Micro, Duration::ZERO, Box::new(action)))
    }

    /// Enqueue a macrotask with `ready_at = now() + delay`
    ///
    /// A zero delay still runs after the current drain and after all pending
    /// microtasks.
    pub fn submit_macrotask<F>(&self, action: F, delay: Duration) -> Result<TaskHandle, SchedulerError>
    where
        F: FnOnce() -> eyre::Result<()> + 'static,
    {
        self.check_delay(delay)?;
        Ok(self.push_task(None, TaskKind::Macro, delay, Box::new(action)))
    }

    /// Enqueue a labeled macrotask, rejecting duplicate pending labels
    pub fn submit_macrotask_named<F>(
        &self,
        label: impl Into<String>,
        action: F,
        delay: Duration,
    ) -> Result<TaskHandle, SchedulerError>
    where
        F: FnOnce() -> eyre::Result<()> + 'static,
    {
        self.check_delay(delay)?;
        let label = label.into();
        self.claim_label(&label)?;
        Ok(self.push_task(Some(label), TaskKind::Macro, delay, Box::new(action)))
    }

    /// Cancel a still-queued task
    ///
    /// Returns true iff the task was removed before execution. A task that
    /// already ran, is currently running, or was never queued returns false
    /// (the cancellation race is not an error).
    pub fn cancel(&self, handle: &TaskHandle) -> bool {
        let mut inner = self.inner.borrow_mut();

        let taken = match handle.kind() {
            TaskKind::Micro => inner.micro.take(handle.id()),
            TaskKind::Macro => inner.timers.take(handle.id()),
        };

        match taken {
            Some(task) => {
                if let Some(label) = &task.label {
                    inner.labels.remove(label);
                }
                inner.stats.total_cancelled += 1;
                debug!(id = %task.id, "Cancelled before execution");
                true
            }
            None => {
                debug!(id = %handle.id(), "Cancel miss: task not queued");
                false
            }
        }
    }

    /// Drive both lanes until empty
    ///
    /// Synchronous from the caller's perspective: one task action at a time,
    /// each running to completion. All pending microtasks (including ones
    /// submitted mid-drain) execute before the next macrotask; the logical
    /// clock jumps forward when no macrotask is due yet.
    ///
    /// Hazard: a microtask chain that keeps resubmitting never terminates this
    /// loop, exactly as it starves timers on a real event loop. Past the
    /// configured watermark a warning is logged, but the semantics are
    /// deliberately left intact.
    ///
    /// Action failures (error returns and panics) are caught, recorded in the
    /// report, and never halt the drain.
    pub fn run_until_idle(&self) -> DrainReport {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.draining {
                warn!("run_until_idle called from inside a running task; ignoring");
                return DrainReport {
                    executed: 0,
                    failed: Vec::new(),
                    finished_at: Utc::now(),
                };
            }
            inner.draining = true;
        }

        let mut executed = 0u64;
        let mut failed = Vec::new();
        // Microtasks executed since the last macrotask, for starvation warning
        let mut burst = 0u64;

        while let Some(task) = self.next_task(&mut burst) {
            self.execute(task, &mut executed, &mut failed);
        }

        self.inner.borrow_mut().draining = false;

        debug!(executed, failed = failed.len(), "Drain complete");
        DrainReport {
            executed,
            failed,
            finished_at: Utc::now(),
        }
    }

    /// Get current queue state
    pub fn queue_state(&self) -> QueueState {
        let inner = self.inner.borrow();
        QueueState {
            micro_depth: inner.micro.len(),
            macro_depth: inner.timers.len(),
            now_ms: inner.now.as_millis() as u64,
            stats: inner.stats.clone(),
        }
    }

    /// Get the scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        self.inner.borrow().stats.clone()
    }

    fn check_delay(&self, delay: Duration) -> Result<(), SchedulerError> {
        if delay > self.config.max_delay() {
            return Err(SchedulerError::DelayTooLarge {
                delay,
                max: self.config.max_delay(),
            });
        }
        Ok(())
    }

    fn claim_label(&self, label: &str) -> Result<(), SchedulerError> {
        let inner = self.inner.borrow();
        if inner.labels.contains(label) {
            debug!(%label, "Duplicate label, rejecting");
            return Err(SchedulerError::DuplicateLabel {
                label: label.to_string(),
            });
        }
        Ok(())
    }

    fn push_task(&self, label: Option<String>, kind: TaskKind, delay: Duration, action: TaskAction) -> TaskHandle {
        let mut inner = self.inner.borrow_mut();

        let order = inner.next_order;
        inner.next_order += 1;
        let id = TaskId::new(kind, order);
        let ready_at = inner.now + delay;

        if let Some(label) = &label {
            inner.labels.insert(label.clone());
        }

        let task = QueuedTask {
            id: id.clone(),
            kind,
            label,
            order,
            ready_at,
            action,
        };

        match kind {
            TaskKind::Micro => {
                inner.micro.enqueue(task);
                inner.stats.peak_micro_depth = inner.stats.peak_micro_depth.max(inner.micro.len());
            }
            TaskKind::Macro => {
                inner.timers.enqueue(task);
                inner.stats.peak_macro_depth = inner.stats.peak_macro_depth.max(inner.timers.len());
            }
        }
        inner.stats.total_submitted += 1;

        debug!(%id, %kind, ready_at_ms = ready_at.as_millis() as u64, "Submitted");
        TaskHandle::new(id, kind)
    }

    /// Dequeue the next task: microtasks first, then the earliest due timer,
    /// jumping the clock if nothing is due yet
    fn next_task(&self, burst: &mut u64) -> Option<QueuedTask> {
        let mut inner = self.inner.borrow_mut();

        if let Some(task) = inner.micro.pop() {
            *burst += 1;
            if *burst == self.config.starvation_warn_threshold {
                warn!(burst = *burst, "Microtask burst past watermark; macrotasks are starving");
            }
            return Some(task);
        }
        *burst = 0;

        let ready_at = inner.timers.next_ready_at()?;
        if ready_at > inner.now {
            debug!(
                from_ms = inner.now.as_millis() as u64,
                to_ms = ready_at.as_millis() as u64,
                "Clock jump"
            );
            inner.now = ready_at;
            inner.stats.clock_jumps += 1;
        }
        inner.timers.pop()
    }

    /// Run one task with its failure isolated from the rest of the drain.
    /// Borrows are released before the action runs so it can submit or cancel.
    fn execute(&self, task: QueuedTask, executed: &mut u64, failed: &mut Vec<TaskFailure>) {
        let QueuedTask {
            id, kind, label, action, ..
        } = task;

        // Free the label before running so the action can resubmit under it
        if let Some(label) = &label {
            self.inner.borrow_mut().labels.remove(label);
        }

        debug!(%id, %kind, "Executing");
        let outcome = panic::catch_unwind(AssertUnwindSafe(action));
        *executed += 1;

        let mut inner = self.inner.borrow_mut();
        inner.stats.total_executed += 1;

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(format!("{err:#}")),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        if let Some(error) = error {
            warn!(%id, %error, "Task failed");
            inner.stats.total_failed += 1;
            failed.push(TaskFailure { id, label, error });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("task panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("task panicked: {}", s)
    } else {
        "task panicked".to_string()
    }
}
