//! CLI argument definitions for the shipment reports.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use cdr_model::Stage;

#[derive(Parser)]
#[command(
    name = "cdr",
    version,
    about = "Daily shipment reports - transfer, consolidate and reconcile logistics data",
    long_about = "Builds the consolidated data report (CDR) and the reports derived from it.\n\n\
                  Each report can run on its own, or `run` executes the configured\n\
                  sequence with a fixed delay between stages."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: ./cdr.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Reference date for every window (default: today).
    #[arg(
        long = "reference-date",
        value_name = "YYYY-MM-DD",
        value_parser = parse_reference_date,
        global = true
    )]
    pub reference_date: Option<NaiveDate>,

    /// Print report summaries as JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Enrich `daily_report` and replace `current_report`.
    Transfer,

    /// Union current and archive rows into the dated CDR snapshot.
    Consolidate,

    /// Write the CDR and outbound logistics sheets.
    Logistics,

    /// Write the month-to-date BMO report and its summary.
    Bmo,

    /// Stack the raw WMS outbound exports and pick the latest stock export.
    WmsCombine,

    /// Reconcile released Europe stock against the CDR and WMS.
    Rno,

    /// Write the Final RNO and Sales RNO reports from the annotated RNO workbook.
    SalesRno,

    /// Compare BMO pieces with the WMS outbound export.
    WmsCompare,

    /// Extract current in-stock rows from the latest CDR.
    Stock,

    /// Run a sequence of stages with a fixed delay between them.
    Run(RunArgs),

    /// Print the effective configuration as TOML.
    Config,
}

impl Command {
    /// The report stage a single-report command runs.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Command::Transfer => Some(Stage::Transfer),
            Command::Consolidate => Some(Stage::Consolidate),
            Command::Logistics => Some(Stage::Logistics),
            Command::Bmo => Some(Stage::Bmo),
            Command::WmsCombine => Some(Stage::WmsCombine),
            Command::Rno => Some(Stage::Rno),
            Command::SalesRno => Some(Stage::SalesRno),
            Command::WmsCompare => Some(Stage::WmsCompare),
            Command::Stock => Some(Stage::Stock),
            Command::Run(_) | Command::Config => None,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Stages to run, in order (default: `orchestration.stages`).
    #[arg(long = "stages", value_delimiter = ',', value_name = "STAGE")]
    pub stages: Vec<Stage>,

    /// Seconds to wait between stages (default: `orchestration.delay_secs`).
    #[arg(long = "delay-secs", value_name = "SECONDS")]
    pub delay_secs: Option<u64>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_reference_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|error| format!("expected YYYY-MM-DD: {error}"))
}
