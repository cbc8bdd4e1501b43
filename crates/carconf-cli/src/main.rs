//! Vehicle option configurator CLI.

use carconf_cli::logging::{LogConfig, LogFormat, init_logging};
use carconf_cli::session::{AmbiguousSelection, EngineOverrides, engine_options, open_catalog};
use carconf_cli::summary::candidates_table;
use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{Session, run_batch, run_categories, run_defaults, run_explain, run_select};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = open_session(&cli).and_then(|session| match &cli.command {
        Command::Defaults => run_defaults(&session),
        Command::Select(args) => run_select(&session, args),
        Command::Categories(args) => run_categories(&session, args),
        Command::Explain(args) => run_explain(&session, args),
        Command::Batch(args) => run_batch(&session, args),
    });

    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            if let Some(ambiguous) = error.downcast_ref::<AmbiguousSelection>() {
                println!("{}", candidates_table(&ambiguous.candidates));
            }
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn open_session(cli: &Cli) -> anyhow::Result<Session> {
    let overrides = EngineOverrides {
        no_reapply: cli.no_reapply,
        no_market_fallback: cli.no_market_fallback,
        first_style: cli.first_style,
    };
    Ok(Session {
        catalog: open_catalog(cli.catalog.as_deref())?,
        options: engine_options(cli.config.as_deref(), overrides)?,
        json: cli.json,
    })
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
