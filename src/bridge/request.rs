//! Promisify-at-the-boundary helper
//!
//! Callback-style collaborators are folded into a uniform "submit work,
//! resolve/reject" shape: the work itself runs as a macrotask once its
//! simulated latency elapses (a background task completing), and its result is
//! delivered to the continuation as a microtask. The continuation therefore
//! runs before any later macrotask, exactly like a promise `.then`.

use std::time::Duration;

use crate::domain::TaskHandle;
use crate::scheduler::{Scheduler, SchedulerError};

/// Submit background work and a continuation for its result.
///
/// The continuation receives the scheduler so chains can enqueue follow-up
/// requests, and both success and failure of the work: a rejected request is
/// the continuation's to handle, not the scheduler's. An error returned by the
/// continuation itself lands in the drain report.
pub fn enqueue_request<T, W, C>(
    scheduler: &Scheduler,
    latency: Duration,
    work: W,
    continuation: C,
) -> Result<TaskHandle, SchedulerError>
where
    T: 'static,
    W: FnOnce() -> eyre::Result<T> + 'static,
    C: FnOnce(&Scheduler, eyre::Result<T>) -> eyre::Result<()> + 'static,
{
    let sched = scheduler.clone();
    scheduler.submit_macrotask(
        move || {
            let result = work();
            let inner = sched.clone();
            // The work "settled"; deliver the result on the microtask lane
            sched.submit_microtask(move || continuation(&inner, result));
            Ok(())
        },
        latency,
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::scheduler::SchedulerConfig;

    use super::*;

    #[test]
    fn test_continuation_runs_before_later_macrotask() {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        {
            let log = log.clone();
            enqueue_request(
                &scheduler,
                Duration::from_millis(100),
                || Ok("payload".to_string()),
                move |_, result| {
                    log.borrow_mut().push(format!("then: {}", result?));
                    Ok(())
                },
            )
            .unwrap();
        }

        // A timer due at the same instant as the request, submitted later:
        // the continuation microtask must still beat it.
        {
            let log = log.clone();
            scheduler
                .submit_macrotask(
                    move || {
                        log.borrow_mut().push("timer".to_string());
                        Ok(())
                    },
                    Duration::from_millis(100),
                )
                .unwrap();
        }

        let report = scheduler.run_until_idle();
        assert!(report.failed.is_empty());
        assert_eq!(*log.borrow(), vec!["then: payload", "timer"]);
    }

    #[test]
    fn test_chained_requests_resolve_in_latency_order() {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        {
            let log = log.clone();
            enqueue_request(
                &scheduler,
                Duration::from_millis(10),
                || Ok(1u32),
                move |sched, first| {
                    let first = first?;
                    log.borrow_mut().push(format!("first={}", first));
                    let log = log.clone();
                    enqueue_request(
                        sched,
                        Duration::from_millis(10),
                        move || Ok(first + 1),
                        move |_, second| {
                            log.borrow_mut().push(format!("second={}", second?));
                            Ok(())
                        },
                    )?;
                    Ok(())
                },
            )
            .unwrap();
        }

        scheduler.run_until_idle();
        assert_eq!(*log.borrow(), vec!["first=1", "second=2"]);
        // First leg settled at 10ms, second at 20ms
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }

    #[test]
    fn test_rejection_is_delivered_to_continuation() {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        let seen: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

        {
            let seen = seen.clone();
            enqueue_request(
                &scheduler,
                Duration::ZERO,
                || Err::<(), _>(eyre::eyre!("connection refused")),
                move |_, result| {
                    *seen.borrow_mut() = result.err().map(|e| e.to_string());
                    Ok(())
                },
            )
            .unwrap();
        }

        let report = scheduler.run_until_idle();
        // Handled rejection: nothing failed from the scheduler's view
        assert!(report.failed.is_empty());
        assert_eq!(seen.borrow().as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_unhandled_continuation_error_lands_in_report() {
        let scheduler = Scheduler::new(SchedulerConfig::default());

        enqueue_request(
            &scheduler,
            Duration::ZERO,
            || Err::<(), _>(eyre::eyre!("404 not found")),
            |_, result| {
                result?;
                Ok(())
            },
        )
        .unwrap();

        let report = scheduler.run_until_idle();
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].error.contains("404"));
    }
}
