//! MovieLens loader CLI.

use clap::{ColorChoice, Parser};
use movielens_cli::logging::{LogConfig, LogFormat, init_logging};
use movielens_cli::query::render_rows;
use movielens_cli::summary::print_load_summary;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{LoadRun, run_indexes, run_list, run_load, run_query};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let schema = cli.schema.as_str();
    let exit_code = match &cli.command {
        Command::Load(args) => match run_load(args, schema).await {
            Ok(LoadRun::Hint) => 0,
            Ok(LoadRun::Completed { report, test_scale }) => {
                print_load_summary(&report);
                if test_scale {
                    println!("Test dataset load finished.");
                    println!();
                    println!("To load the complete dataset, pass false as TEST_DATA.");
                } else {
                    println!("Complete dataset load finished.");
                }
                0
            }
            Err(error) => fail(&error),
        },
        Command::Query(args) => match run_query(args, schema).await {
            Ok(report) => match render_rows(&report.rows) {
                Ok(json) => {
                    println!("{json}");
                    println!();
                    println!("{}", report.summary_line());
                    0
                }
                Err(error) => fail(&anyhow::Error::from(error)),
            },
            Err(error) => fail(&error),
        },
        Command::List(args) => match run_list(args, schema).await {
            Ok(rows) => match render_rows(&rows) {
                Ok(json) => {
                    println!("{json}");
                    0
                }
                Err(error) => fail(&anyhow::Error::from(error)),
            },
            Err(error) => fail(&error),
        },
        Command::Indexes => match run_indexes(schema).await {
            Ok(count) => {
                println!("All {count} indexes created.");
                0
            }
            Err(error) => fail(&error),
        },
    };
    std::process::exit(exit_code);
}

fn fail(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
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
