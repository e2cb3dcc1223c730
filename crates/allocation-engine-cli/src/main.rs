//! `allocation` CLI — run the allocation engine on JSON from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Plan a parking assignment (stdin → stdout)
//! echo '{"startMinute":480,"attendanceMinutes":480,"chargingMinutes":120,
//!        "spots":[{"id":"charger-1","hasCharger":true},{"id":"regular-1","hasCharger":false}],
//!        "bookings":[]}' | allocation assign
//!
//! # Expand a recurring booking, capped at 20 dates
//! allocation expand -i series.json --cap 20
//!
//! # Collapse AM + PM bookings per desk
//! allocation normalize -i day.json --per-entry
//!
//! # Busy/free blocks and ring segments for an 08:00-17:00 window
//! allocation occupancy -i intervals.json --start 08:00 --end 17:00
//!
//! # Half-open overlap test
//! allocation overlaps 480 600 600 720
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG=allocation_engine=debug` or pass `-v`.

use std::io::{self, Read};
use std::path::PathBuf;

use allocation_engine::config::EngineConfig;
use allocation_engine::day_slot::{
    normalize_day_slot_bookings, normalize_day_slot_bookings_per_entry, DaySlotBooking,
};
use allocation_engine::intervals::{self, BusinessWindow, MinuteInterval};
use allocation_engine::overlap::overlaps_half_open_intervals;
use allocation_engine::planner::{build_assignment_proposal, AssignmentRequest};
use allocation_engine::recurrence::{expand_recurrence, RecurrenceDefinition};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "allocation",
    version,
    about = "Desk and parking allocation engine CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (business window, recurrence cap)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Propose resources for an attendance window
    Assign {
        /// Input request JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Expand a recurrence definition into ISO dates
    Expand {
        /// Input definition JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Maximum number of dates (overrides the configured cap)
        #[arg(long)]
        cap: Option<usize>,
    },
    /// Collapse AM + PM bookings of the same person into virtual FULL days
    Normalize {
        /// Input bookings JSON array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Normalize each resource entry separately
        #[arg(long)]
        per_entry: bool,
    },
    /// Merge busy intervals and compute free gaps and ring segments
    Occupancy {
        /// Input JSON array of {startMin, endMin} (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Business window start, HH:MM (overrides config)
        #[arg(long)]
        start: Option<String>,
        /// Business window end, HH:MM (overrides config)
        #[arg(long)]
        end: Option<String>,
    },
    /// Test whether two half-open minute intervals overlap
    Overlaps {
        #[arg(allow_negative_numbers = true)]
        left_start: i32,
        #[arg(allow_negative_numbers = true)]
        left_end: i32,
        #[arg(allow_negative_numbers = true)]
        right_start: i32,
        #[arg(allow_negative_numbers = true)]
        right_end: i32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Assign { input, output } => {
            let request: AssignmentRequest =
                parse_json(&read_input(input.as_deref())?, "assignment request")?;
            let proposal = build_assignment_proposal(&request);
            write_json(output.as_deref(), &proposal)?;
        }
        Commands::Expand { input, output, cap } => {
            let definition: RecurrenceDefinition =
                parse_json(&read_input(input.as_deref())?, "recurrence definition")?;
            let cap = cap.unwrap_or(config.recurrence_cap);
            let dates = expand_recurrence(&definition, cap);
            write_json(output.as_deref(), &dates)?;
        }
        Commands::Normalize {
            input,
            output,
            per_entry,
        } => {
            let bookings: Vec<DaySlotBooking> =
                parse_json(&read_input(input.as_deref())?, "day-slot bookings")?;
            let normalized = if per_entry {
                normalize_day_slot_bookings_per_entry(&bookings)
            } else {
                normalize_day_slot_bookings(&bookings)
            };
            write_json(output.as_deref(), &normalized)?;
        }
        Commands::Occupancy {
            input,
            output,
            start,
            end,
        } => {
            let window = resolve_window(&config, start.as_deref(), end.as_deref())?;
            let busy: Vec<MinuteInterval> =
                parse_json(&read_input(input.as_deref())?, "interval list")?;
            let occupancy = intervals::occupancy(&busy, window);
            write_json(output.as_deref(), &occupancy)?;
        }
        Commands::Overlaps {
            left_start,
            left_end,
            right_start,
            right_end,
        } => {
            let overlaps =
                overlaps_half_open_intervals(left_start, left_end, right_start, right_end);
            println!("{}", overlaps);
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` wins; otherwise `-v` selects debug.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config = EngineConfig::from_toml_str(&content)
                .with_context(|| format!("Invalid config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Business window from `--start`/`--end`, falling back to the configured bounds.
fn resolve_window(
    config: &EngineConfig,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<BusinessWindow> {
    let start = start.unwrap_or(&config.business_window.start);
    let end = end.unwrap_or(&config.business_window.end);
    BusinessWindow::parse(start, end).context("Invalid business window")
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("Failed to parse {}", what))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
