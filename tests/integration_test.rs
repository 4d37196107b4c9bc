//! Integration tests for taskloop
//!
//! These tests verify end-to-end behavior of the scheduler, the promisified
//! request boundary, and the CLI.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;

use taskloop::bridge::{FetchProvider, PositionProvider, enqueue_request};
use taskloop::demo::{CollectSink, DatasetFetch, FixedPosition, country_chain, ordering, where_am_i};
use taskloop::scheduler::{Scheduler, SchedulerConfig};

// =============================================================================
// Scheduler ordering tests
// =============================================================================

#[test]
fn test_pre_drain_microtasks_beat_all_macrotasks() {
    let scheduler = Scheduler::new(SchedulerConfig::default());
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    for i in 0..3 {
        let macro_log = log.clone();
        scheduler
            .submit_macrotask(
                move || {
                    macro_log.borrow_mut().push(format!("macro-{}", i));
                    Ok(())
                },
                Duration::ZERO,
            )
            .unwrap();

        let log = log.clone();
        scheduler.submit_microtask(move || {
            log.borrow_mut().push(format!("micro-{}", i));
            Ok(())
        });
    }

    scheduler.run_until_idle();
    assert_eq!(
        *log.borrow(),
        vec!["micro-0", "micro-1", "micro-2", "macro-0", "macro-1", "macro-2"]
    );
}

#[test]
fn test_each_macrotask_gets_its_continuations_first() {
    let scheduler = Scheduler::new(SchedulerConfig::default());
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    for name in ["a", "b"] {
        let sched = scheduler.clone();
        let log = log.clone();
        scheduler
            .submit_macrotask(
                move || {
                    log.borrow_mut().push(name);
                    let log = log.clone();
                    sched.submit_microtask(move || {
                        log.borrow_mut().push("then");
                        Ok(())
                    });
                    Ok(())
                },
                Duration::ZERO,
            )
            .unwrap();
    }

    scheduler.run_until_idle();
    assert_eq!(*log.borrow(), vec!["a", "then", "b", "then"]);
}

// =============================================================================
// Bridge tests
// =============================================================================

#[test]
fn test_request_chain_against_dataset() {
    let scheduler = Scheduler::new(SchedulerConfig::default());
    let fetch = Rc::new(DatasetFetch::new().unwrap());
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    {
        let fetch = fetch.clone();
        let seen = seen.clone();
        let first_fetch = fetch.clone();
        enqueue_request(
            &scheduler,
            Duration::from_millis(100),
            move || first_fetch.fetch("restcountries/name/Portugal"),
            move |sched, body| {
                let country: taskloop::demo::Country = serde_json::from_str(&body?)?;
                seen.borrow_mut().push(country.name.clone());
                // Chain: fetch the first border
                let code = country.borders[0].clone();
                let next_fetch = fetch.clone();
                let seen = seen.clone();
                enqueue_request(
                    sched,
                    Duration::from_millis(100),
                    move || next_fetch.fetch(&format!("restcountries/alpha/{}", code)),
                    move |_, body| {
                        let neighbour: taskloop::demo::Country = serde_json::from_str(&body?)?;
                        seen.borrow_mut().push(neighbour.name.clone());
                        Ok(())
                    },
                )?;
                Ok(())
            },
        )
        .unwrap();
    }

    let report = scheduler.run_until_idle();
    assert!(report.failed.is_empty());
    assert_eq!(*seen.borrow(), vec!["Portugal", "Spain"]);
    assert_eq!(scheduler.now(), Duration::from_millis(200));
}

// =============================================================================
// Demo scenario tests
// =============================================================================

#[test]
fn test_ordering_lesson_end_to_end() {
    let scheduler = Scheduler::new(SchedulerConfig::default());
    let (lines, report) = ordering(&scheduler).unwrap();

    assert_eq!(lines.first().map(String::as_str), Some("Test start"));
    assert_eq!(lines.last().map(String::as_str), Some("0 sec timer"));
    assert_eq!(report.executed, 3);
}

#[test]
fn test_country_and_whereami_against_same_scheduler_config() {
    let fetch: Rc<dyn FetchProvider> = Rc::new(DatasetFetch::new().unwrap());
    let latency = Duration::from_millis(25);

    let scheduler = Scheduler::new(SchedulerConfig::default());
    let sink = CollectSink::new();
    let report = country_chain(&scheduler, fetch.clone(), Rc::new(sink.clone()), "India", true, latency).unwrap();
    assert!(report.failed.is_empty());
    // India plus three neighbours
    assert_eq!(sink.records().len(), 4);

    let scheduler = Scheduler::new(SchedulerConfig::default());
    let sink = CollectSink::new();
    let positions: Rc<dyn PositionProvider> = Rc::new(FixedPosition::new(39.5, -8.0));
    let report = where_am_i(&scheduler, positions, fetch, Rc::new(sink.clone()), latency).unwrap();
    assert!(report.failed.is_empty());
    assert_eq!(sink.records().len(), 1);
    assert!(sink.records()[0].contains("Portugal"));
}

// =============================================================================
// Property tests
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Submission {
    Micro,
    Macro(u8),
}

fn submission_strategy() -> impl Strategy<Value = Submission> {
    prop_oneof![
        Just(Submission::Micro),
        (0u8..4).prop_map(Submission::Macro),
    ]
}

proptest! {
    /// For any pre-drain interleaving of submissions: microtasks run first in
    /// FIFO order, then macrotasks by (ready time, submission order).
    #[test]
    fn prop_two_lane_ordering_holds(subs in proptest::collection::vec(submission_strategy(), 0..24)) {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        let log: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));

        for (index, sub) in subs.iter().enumerate() {
            let log = log.clone();
            let action = move || {
                log.borrow_mut().push(index);
                Ok(())
            };
            match sub {
                Submission::Micro => {
                    scheduler.submit_microtask(action);
                }
                Submission::Macro(delay) => {
                    scheduler
                        .submit_macrotask(action, Duration::from_millis(u64::from(*delay)))
                        .unwrap();
                }
            }
        }

        let report = scheduler.run_until_idle();
        prop_assert_eq!(report.executed, subs.len() as u64);
        prop_assert!(report.failed.is_empty());

        let mut expected: Vec<usize> = subs
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Submission::Micro))
            .map(|(i, _)| i)
            .collect();
        let mut macros: Vec<(u8, usize)> = subs
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                Submission::Macro(d) => Some((*d, i)),
                Submission::Micro => None,
            })
            .collect();
        macros.sort();
        expected.extend(macros.into_iter().map(|(_, i)| i));

        prop_assert_eq!(log.borrow().clone(), expected);
    }

    /// A cancelled queued task never executes, whatever else is queued
    #[test]
    fn prop_cancelled_task_never_runs(delay in 0u64..8, others in 0usize..8) {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        let ran = Rc::new(RefCell::new(false));

        {
            let ran = ran.clone();
            let handle = scheduler
                .submit_macrotask(
                    move || {
                        *ran.borrow_mut() = true;
                        Ok(())
                    },
                    Duration::from_millis(delay),
                )
                .unwrap();

            for _ in 0..others {
                scheduler.submit_microtask(|| Ok(()));
                scheduler.submit_macrotask(|| Ok(()), Duration::from_millis(1)).unwrap();
            }

            prop_assert!(scheduler.cancel(&handle));
        }

        let report = scheduler.run_until_idle();
        prop_assert_eq!(report.executed, (others * 2) as u64);
        prop_assert!(!*ran.borrow());
    }
}

// =============================================================================
// CLI tests
// =============================================================================

mod cli {
    use assert_cmd::Command;
    use predicates::prelude::*;

    #[test]
    fn test_ordering_output() {
        let expected = "Test start\n\
            Test end\n\
            Resolved promise 1\n\
            Resolved promise 2\n\
            0 sec timer\n\
            executed 3 task(s), 0 failed, logical time 0ms\n";

        Command::cargo_bin("tl")
            .unwrap()
            .arg("ordering")
            .assert()
            .success()
            .stdout(expected);
    }

    #[test]
    fn test_country_renders_card() {
        Command::cargo_bin("tl")
            .unwrap()
            .args(["country", "Portugal"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Lisbon"));
    }

    #[test]
    fn test_unknown_country_fails_with_404() {
        Command::cargo_bin("tl")
            .unwrap()
            .args(["country", "Atlantis"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("404"));
    }

    #[test]
    fn test_whereami_defaults_to_germany() {
        Command::cargo_bin("tl")
            .unwrap()
            .arg("whereami")
            .assert()
            .success()
            .stdout(predicate::str::contains("Germany"));
    }

    #[test]
    fn test_json_format() {
        Command::cargo_bin("tl")
            .unwrap()
            .args(["--format", "json", "ordering"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"lines\""))
            .stdout(predicate::str::contains("Resolved promise 1"));
    }
}
