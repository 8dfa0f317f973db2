//! CLI argument definitions for the MovieLens loader.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

pub const DEFAULT_SCHEMA: &str = "t2project";

#[derive(Parser)]
#[command(
    name = "movielens",
    version,
    about = "Load the MovieLens dataset into PostgreSQL and time genre queries",
    long_about = "Load the MovieLens CSV files into a PostgreSQL schema through its \
                  stored procedures, then time the average-rating-by-genre query \
                  before and after adding indexes.\n\n\
                  Connection settings come from PGHOST, PGPORT, PGDATABASE, PGUSER, \
                  PGPASSWORD, PGPOOL_MIN and PGPOOL_MAX (a .env file is read if present)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Schema holding the tables and procedures.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_SCHEMA, global = true)]
    pub schema: String,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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
    /// Load links, movies, genres and ratings from CSV.
    Load(LoadArgs),

    /// Time the average-rating query for one genre.
    Query(QueryArgs),

    /// Print every movie or genre as JSON.
    List(ListArgs),

    /// Create the performance indexes used by the rating query.
    Indexes,
}

#[derive(Parser)]
pub struct LoadArgs {
    /// Load a test-sized subset (anything but "false") or the full dataset ("false").
    #[arg(value_name = "TEST_DATA")]
    pub test_data: Option<String>,

    /// Directory containing links.csv, movies_metadata.csv and ratings.csv.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Read at most this many movie rows.
    #[arg(long = "movie-limit", value_name = "N")]
    pub movie_limit: Option<usize>,

    /// Read at most this many rating rows.
    #[arg(long = "rating-limit", value_name = "N")]
    pub rating_limit: Option<usize>,

    /// Read at most this many link rows.
    #[arg(long = "link-limit", value_name = "N")]
    pub link_limit: Option<usize>,

    /// Record procedure calls in memory instead of connecting to the database.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Do not draw progress bars.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl LoadArgs {
    /// `None` when no scale was given.
    pub fn test_scale(&self) -> Option<bool> {
        self.test_data
            .as_deref()
            .map(|value| !value.trim().eq_ignore_ascii_case("false"))
    }
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Label for this run, e.g. BEFORE or AFTER.
    #[arg(value_name = "LABEL")]
    pub label: String,

    /// Genre name to query.
    #[arg(value_name = "GENRE")]
    pub genre: String,
}

#[derive(Parser)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub target: ListTarget,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ListTarget {
    Movies,
    Genres,
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
