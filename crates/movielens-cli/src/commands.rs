use anyhow::{Context, Result};
use tracing::{Instrument, info, info_span, warn};

use movielens_cli::indexes::create_indexes;
use movielens_cli::pipeline::{LoadOptions, LoadReport, run_load as run_pipeline};
use movielens_cli::query::{QueryReport, run_query as run_timed_query};
use movielens_db::{DatabaseConfig, MemoryGateway, MovieSchema, PgGateway};
use movielens_model::ResultRow;

use crate::cli::{ListArgs, ListTarget, LoadArgs, QueryArgs};

pub const LOAD_HINT: &str =
    "Pass true to load a test-sized subset, or false to load the complete dataset (takes hours).";

/// Result of the `load` command.
pub enum LoadRun {
    /// No scale was given; only the hint was printed.
    Hint,
    Completed { report: LoadReport, test_scale: bool },
}

pub async fn run_load(args: &LoadArgs, schema_name: &str) -> Result<LoadRun> {
    let Some(test_scale) = args.test_scale() else {
        println!("{LOAD_HINT}");
        return Ok(LoadRun::Hint);
    };
    let options = load_options(args, test_scale);
    if test_scale {
        info!("loading test-scale dataset");
    } else {
        warn!("loading the complete dataset; this may take several hours");
    }

    let span = info_span!("load", schema = schema_name, dry_run = args.dry_run);
    let report = if args.dry_run {
        let schema = MovieSchema::new(schema_name, MemoryGateway::new())
            .context("open dry-run schema")?;
        let report = run_pipeline(&schema, &options).instrument(span).await;
        info!(
            calls = schema.gateway().calls().len(),
            "dry run recorded procedure calls"
        );
        schema.close().await;
        report
    } else {
        let schema = connect(schema_name).await?;
        let report = run_pipeline(&schema, &options).instrument(span).await;
        schema.close().await;
        report
    };
    Ok(LoadRun::Completed { report, test_scale })
}

/// Scale defaults, overridden by explicit limits.
pub fn load_options(args: &LoadArgs, test_scale: bool) -> LoadOptions {
    let mut options = if test_scale {
        LoadOptions::test_scale(&args.data_dir)
    } else {
        LoadOptions::full_scale(&args.data_dir)
    };
    if args.link_limit.is_some() {
        options.link_limit = args.link_limit;
    }
    if args.movie_limit.is_some() {
        options.movie_limit = args.movie_limit;
    }
    if args.rating_limit.is_some() {
        options.rating_limit = args.rating_limit;
    }
    options.show_progress = !args.no_progress;
    options
}

pub async fn run_query(args: &QueryArgs, schema_name: &str) -> Result<QueryReport> {
    let schema = connect(schema_name).await?;
    let report = run_timed_query(&schema, &args.label, &args.genre).await;
    schema.close().await;
    report.with_context(|| format!("query average ratings for genre '{}'", args.genre))
}

pub async fn run_list(args: &ListArgs, schema_name: &str) -> Result<Vec<ResultRow>> {
    let schema = connect(schema_name).await?;
    let outcome = match args.target {
        ListTarget::Movies => schema.movie_listing().await.context("list movies"),
        ListTarget::Genres => schema.genre_listing().await.context("list genres"),
    };
    schema.close().await;
    Ok(outcome?.rows)
}

pub async fn run_indexes(schema_name: &str) -> Result<usize> {
    let schema = connect(schema_name).await?;
    let created = create_indexes(&schema).await;
    schema.close().await;
    created.context("create performance indexes")
}

async fn connect(schema_name: &str) -> Result<MovieSchema<PgGateway>> {
    let config = DatabaseConfig::from_env().context("read database configuration")?;
    MovieSchema::connect(schema_name, &config)
        .await
        .context("connect to database")
}
