//! taskloop - deterministic two-lane task scheduler
//!
//! CLI entry point for replaying the event-loop demos.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use eyre::{Context, Result, eyre};
use tracing::info;

use taskloop::bridge::{FetchProvider, PositionProvider, RenderSink};
use taskloop::cli::{Cli, Command, OutputFormat};
use taskloop::config::Config;
use taskloop::demo::{CollectSink, ConsoleSink, DatasetFetch, FixedPosition, country_chain, ordering, where_am_i};
use taskloop::scheduler::{DrainReport, Scheduler};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskloop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Setup tracing subscriber - write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("taskloop.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load config")?;
    let scheduler = Scheduler::new(config.scheduler.clone());
    let latency = config.demo.request_latency();

    let command = cli.command.unwrap_or(Command::Ordering);

    match command {
        Command::Ordering => {
            let (lines, report) = ordering(&scheduler)?;
            match cli.format {
                OutputFormat::Text => {
                    for line in &lines {
                        println!("{}", line);
                    }
                    print_summary(&scheduler, &report);
                }
                OutputFormat::Json => {
                    let out = serde_json::json!({ "lines": lines, "report": report });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
            finish(report)
        }
        Command::Country { name, chain_neighbours } => {
            let fetch: Rc<dyn FetchProvider> = Rc::new(DatasetFetch::new()?);
            run_render_demo(cli.format, &scheduler, |sink| {
                country_chain(&scheduler, fetch.clone(), sink, &name, chain_neighbours, latency).map_err(Into::into)
            })
        }
        Command::Whereami { lat, lng } => {
            let fetch: Rc<dyn FetchProvider> = Rc::new(DatasetFetch::new()?);
            let positions: Rc<dyn PositionProvider> = Rc::new(FixedPosition::new(lat, lng));
            run_render_demo(cli.format, &scheduler, |sink| {
                where_am_i(&scheduler, positions.clone(), fetch.clone(), sink, latency).map_err(Into::into)
            })
        }
    }
}

/// Run a card-rendering demo with the sink matching the output format
fn run_render_demo<F>(format: OutputFormat, scheduler: &Scheduler, run: F) -> Result<()>
where
    F: FnOnce(Rc<dyn RenderSink>) -> Result<DrainReport>,
{
    match format {
        OutputFormat::Text => {
            let report = run(Rc::new(ConsoleSink))?;
            print_summary(scheduler, &report);
            finish(report)
        }
        OutputFormat::Json => {
            let sink = CollectSink::new();
            let report = run(Rc::new(sink.clone()))?;
            let out = serde_json::json!({
                "rendered": sink.records(),
                "errors": sink.errors(),
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            finish(report)
        }
    }
}

fn print_summary(scheduler: &Scheduler, report: &DrainReport) {
    println!(
        "executed {} task(s), {} failed, logical time {}ms",
        report.executed,
        report.failed.len(),
        scheduler.now().as_millis()
    );
}

fn finish(report: DrainReport) -> Result<()> {
    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(eyre!("{} task(s) failed during drain", report.failed.len()))
    }
}
