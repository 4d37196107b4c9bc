//! Demo scenarios replayed over the scheduler
//!
//! Each scenario wires canned collaborators to the two-lane scheduler and
//! drains it, so the interleavings the original page narrated against live
//! APIs reproduce deterministically here.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use eyre::Context;
use tracing::debug;

use crate::bridge::{FetchProvider, PositionProvider, RenderSink, enqueue_request};
use crate::scheduler::{DrainReport, Scheduler, SchedulerError};

use super::dataset::{Country, GeocodeRecord};
use super::render::country_card;

/// The event-loop ordering lesson: a zero-delay timer loses to resolved
/// promises because the microtask lane drains first.
///
/// Expected line order: Test start, Test end, Resolved promise 1,
/// Resolved promise 2, 0 sec timer.
pub fn ordering(scheduler: &Scheduler) -> Result<(Vec<String>, DrainReport), SchedulerError> {
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    log.borrow_mut().push("Test start".to_string());

    {
        let log = log.clone();
        scheduler.submit_macrotask(
            move || {
                log.borrow_mut().push("0 sec timer".to_string());
                Ok(())
            },
            Duration::ZERO,
        )?;
    }

    for line in ["Resolved promise 1", "Resolved promise 2"] {
        let log = log.clone();
        scheduler.submit_microtask(move || {
            log.borrow_mut().push(line.to_string());
            Ok(())
        });
    }

    log.borrow_mut().push("Test end".to_string());

    let report = scheduler.run_until_idle();
    let lines = log.borrow().clone();
    Ok((lines, report))
}

/// Fetch a country by name, render it, and optionally chain one request per
/// border to render its neighbours.
pub fn country_chain(
    scheduler: &Scheduler,
    fetch: Rc<dyn FetchProvider>,
    sink: Rc<dyn RenderSink>,
    name: &str,
    chain_neighbours: bool,
    latency: Duration,
) -> Result<DrainReport, SchedulerError> {
    debug!(%name, chain_neighbours, "country_chain");
    let url = format!("restcountries/name/{}", name);
    fetch_and_render(scheduler, fetch, sink, url, "", chain_neighbours, latency)?;
    Ok(scheduler.run_until_idle())
}

/// Geolocation lesson: position, reverse geocode, country fetch, render.
/// Three chained requests, each continuation enqueueing the next.
pub fn where_am_i(
    scheduler: &Scheduler,
    positions: Rc<dyn PositionProvider>,
    fetch: Rc<dyn FetchProvider>,
    sink: Rc<dyn RenderSink>,
    latency: Duration,
) -> Result<DrainReport, SchedulerError> {
    let work_positions = positions.clone();
    let err_sink = sink.clone();

    enqueue_request(
        scheduler,
        latency,
        move || work_positions.position(),
        move |sched, position| {
            let position = match position {
                Ok(position) => position,
                Err(err) => {
                    err_sink.render_error(&format!("{:#}", err));
                    return Err(err.wrap_err("Could not determine position"));
                }
            };
            debug!(%position, "Position acquired");

            let geocode_fetch = fetch.clone();
            let url = format!("geocode/{}", position);
            let err_url = url.clone();
            let err_sink = sink.clone();
            enqueue_request(
                sched,
                latency,
                move || geocode_fetch.fetch(&url),
                move |sched, body| {
                    let body = match body {
                        Ok(body) => body,
                        Err(err) => {
                            err_sink.render_error(&format!("{:#}", err));
                            return Err(err.wrap_err(format!("Request failed: {}", err_url)));
                        }
                    };
                    let geo: GeocodeRecord =
                        serde_json::from_str(&body).context("Failed to parse geocode payload")?;
                    let url = format!("restcountries/name/{}", geo.country);
                    fetch_and_render(sched, fetch, sink, url, "", false, latency)?;
                    Ok(())
                },
            )?;
            Ok(())
        },
    )?;

    Ok(scheduler.run_until_idle())
}

/// One promisified fetch leg: request the URL, render the country, and chain
/// a neighbour leg per border when asked. A failed fetch is surfaced through
/// the sink and recorded in the drain report.
fn fetch_and_render(
    scheduler: &Scheduler,
    fetch: Rc<dyn FetchProvider>,
    sink: Rc<dyn RenderSink>,
    url: String,
    class: &'static str,
    chain_neighbours: bool,
    latency: Duration,
) -> Result<(), SchedulerError> {
    let work_fetch = fetch.clone();
    let work_url = url.clone();

    enqueue_request(
        scheduler,
        latency,
        move || work_fetch.fetch(&work_url),
        move |sched, body| {
            let body = match body {
                Ok(body) => body,
                Err(err) => {
                    sink.render_error(&format!("{:#}", err));
                    return Err(err.wrap_err(format!("Request failed: {}", url)));
                }
            };

            let country: Country = serde_json::from_str(&body).context("Failed to parse country payload")?;
            sink.render(&country_card(&country, class));

            if chain_neighbours {
                for border in &country.borders {
                    let url = format!("restcountries/alpha/{}", border);
                    fetch_and_render(sched, fetch.clone(), sink.clone(), url, "neighbour", false, latency)?;
                }
            }
            Ok(())
        },
    )?;
    Ok(())
}
