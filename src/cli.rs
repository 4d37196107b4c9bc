//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// taskloop - deterministic two-lane task scheduler demos
#[derive(Parser)]
#[command(
    name = "taskloop",
    about = "Replay event-loop ordering lessons on a deterministic two-lane scheduler",
    version,
    after_help = "Logs are written to: ~/.local/share/taskloop/logs/taskloop.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the microtask-vs-timer ordering lesson
    Ordering,

    /// Fetch a country from the embedded dataset and render it
    Country {
        /// Country name to look up
        name: String,

        /// Also fetch and render each bordering country
        #[arg(long)]
        chain_neighbours: bool,
    },

    /// Locate a position and render the country it falls in
    Whereami {
        /// Latitude
        #[arg(long, default_value_t = 52.508, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude
        #[arg(long, default_value_t = 13.381, allow_hyphen_values = true)]
        lng: f64,
    },
}

/// Output format for drain reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
