//! Command-line argument definitions.

use std::path::PathBuf;

use calrep_core::{ExcludeMode, OutputFormat, SummaryMode};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Calendar event reports.
///
/// Lists the events of a Google Calendar for a date range, optionally
/// dropping events by keyword and aggregating them per day, week or month.
#[derive(Debug, Parser)]
#[command(name = "calrep", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the events of a date range.
    Events(EventsArgs),
}

/// Arguments for `calrep events`.
#[derive(Debug, Clone, Default, Args)]
pub struct EventsArgs {
    /// First day to include (YYYY-MM-DD). Defaults to the first day of the current month.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD). Defaults to the last day of the start month.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Output format: json, csv or text.
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Aggregation: none, daily, weekly or monthly.
    #[arg(long, default_value = "none")]
    pub summary: SummaryMode,

    /// Exclude events whose title, description or location matches this keyword.
    /// May be repeated.
    #[arg(long = "exclude", value_name = "KEYWORD")]
    pub exclude: Vec<String>,

    /// How keywords match: contains, exact, word, any, all or regex.
    #[arg(long, value_name = "MODE")]
    pub exclude_mode: Option<ExcludeMode>,

    /// Calendar to read instead of the configured one.
    #[arg(long)]
    pub calendar: Option<String>,

    /// Read events from a JSON file (`-` for stdin) instead of Google Calendar.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}
