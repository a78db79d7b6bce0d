//! Daily shipment reports CLI.

use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use tracing::info_span;
use tracing::level_filters::LevelFilter;

use cdr_cli::config::{load_config, render_config};
use cdr_cli::logging::{LogConfig, LogFormat, init_logging};
use cdr_cli::orchestrate::run_sequence;
use cdr_cli::summary::{print_run, print_summary, run_json, summary_json};
use cdr_report::{ReportContext, run_stage};
use cdr_store::DirectoryTableStore;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, RunArgs};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "command failed");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let (config, _source) = load_config(cli.config.as_deref())?;
    if matches!(cli.command, Command::Config) {
        print!("{}", render_config(&config)?);
        return Ok(0);
    }

    let ctx = match cli.reference_date {
        Some(date) => ReportContext::new(&config, date),
        None => ReportContext::today(&config),
    };
    let span = info_span!("cdr", reference = %ctx.reference);
    let _guard = span.enter();
    let mut store = DirectoryTableStore::open(&config.store.directory)
        .with_context(|| format!("open table store {}", config.store.directory.display()))?;

    if let Some(stage) = cli.command.stage() {
        let summary = run_stage(stage, &ctx, &mut store)?;
        if cli.json {
            println!("{}", summary_json(&summary)?);
        } else {
            print_summary(&summary);
        }
        return Ok(0);
    }

    let Command::Run(RunArgs { stages, delay_secs }) = &cli.command else {
        return Ok(0);
    };
    let stages = if stages.is_empty() {
        config.orchestration.stages.clone()
    } else {
        stages.clone()
    };
    let delay = Duration::from_secs(delay_secs.unwrap_or(config.orchestration.delay_secs));
    let outcome = run_sequence(&stages, delay, &ctx, &mut store);
    if cli.json {
        println!("{}", run_json(&outcome)?);
    } else {
        print_run(&outcome);
    }
    Ok(outcome.exit_code())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
