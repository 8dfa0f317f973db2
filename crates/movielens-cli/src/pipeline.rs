//! Load pipeline: CSV sources to stored procedures.
//!
//! Stages run in a fixed order (links, movies, ratings) and never depend on
//! each other's success. Each row yields a `Result<RowOutcome, RowError>`;
//! failures are logged and counted in the stage report, which keeps the first
//! few for inspection, and the stage moves on to the next row.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use thiserror::Error;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};

use movielens_db::{DbError, MovieSchema, ProcedureGateway, ProcedureOutcome};
use movielens_ingest::{
    IngestError, LinkRecord, MovieRecord, RatingRecord, RowReadError, RowReadErrorKind,
    SourceReader, SourceRecord, SourceRow,
};
use movielens_model::{CreateGenreRequest, DbValue, EntityKind};
use movielens_transform::{
    SkipReason, clean_link, clean_movie, clean_movie_genre, clean_rating, movie_genres, movie_id,
};

/// Movie rows read when loading test-scale data.
pub const TEST_MOVIE_LIMIT: usize = 1_000;
/// Rating rows read when loading test-scale data.
pub const TEST_RATING_LIMIT: usize = 10_000;
/// Row errors kept per stage; later ones are only counted.
pub const RETAINED_ERRORS: usize = 100;

/// Where to read from and how many rows to take from each source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub data_dir: PathBuf,
    pub link_limit: Option<usize>,
    pub movie_limit: Option<usize>,
    pub rating_limit: Option<usize>,
    /// Draw progress bars on stderr.
    pub show_progress: bool,
}

impl LoadOptions {
    /// Every link, the first 1000 movies, the first 10000 ratings.
    pub fn test_scale(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            link_limit: None,
            movie_limit: Some(TEST_MOVIE_LIMIT),
            rating_limit: Some(TEST_RATING_LIMIT),
            show_progress: false,
        }
    }

    /// Every row of every source.
    pub fn full_scale(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            link_limit: None,
            movie_limit: None,
            rating_limit: None,
            show_progress: false,
        }
    }
}

/// A row that reached the database.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub index: usize,
    /// Status value returned by the procedure, if any.
    pub status: Option<DbValue>,
}

/// Why a row was not persisted.
#[derive(Debug, Error)]
pub enum RowErrorKind {
    /// The CSV row itself could not be parsed.
    #[error("unparseable row: {0}")]
    ParseFailure(String),

    /// The row ended before a required column.
    #[error("missing value for column '{0}'")]
    MissingKey(&'static str),

    /// Cleaning rules rejected the row.
    #[error("skipped: {0}")]
    SkipCondition(SkipReason),

    /// The procedure call failed.
    #[error("database error: {0}")]
    Database(DbError),
}

/// A row-level failure, tagged with its stage and position.
#[derive(Debug, Error)]
#[error("{stage} row {index}: {kind}")]
pub struct RowError {
    pub stage: EntityKind,
    /// Zero-based position within the stage's input.
    pub index: usize,
    pub kind: RowErrorKind,
}

impl RowError {
    fn new(stage: EntityKind, index: usize, kind: RowErrorKind) -> Self {
        Self { stage, index, kind }
    }

    fn from_read(stage: EntityKind, error: RowReadError) -> Self {
        let kind = match error.kind {
            RowReadErrorKind::Malformed(message) => RowErrorKind::ParseFailure(message),
            RowReadErrorKind::MissingField(column) => RowErrorKind::MissingKey(column),
        };
        Self::new(stage, error.index, kind)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.kind, RowErrorKind::SkipCondition(_))
    }
}

pub type RowResult = Result<RowOutcome, RowError>;

/// Counts and failures for one stage.
#[derive(Debug)]
pub struct StageReport {
    pub stage: EntityKind,
    pub rows_read: usize,
    pub persisted: usize,
    skipped: usize,
    failed: usize,
    /// The first [`RETAINED_ERRORS`] row errors, in input order.
    pub errors: Vec<RowError>,
    /// Set when the source could not be opened at all.
    pub failure: Option<IngestError>,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn new(stage: EntityKind) -> Self {
        Self {
            stage,
            rows_read: 0,
            persisted: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            failure: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Rows rejected by cleaning rules.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Rows that could not be parsed or were rejected by the database.
    pub fn failed(&self) -> usize {
        self.failed
    }

    fn record(&mut self, result: RowResult) {
        match result {
            Ok(outcome) => {
                trace!(stage = %self.stage, index = outcome.index, status = ?outcome.status, "row persisted");
                self.persisted += 1;
            }
            Err(error) => {
                if error.is_skip() {
                    debug!(%error, "row skipped");
                    self.skipped += 1;
                } else {
                    warn!(%error, "row failed");
                    self.failed += 1;
                }
                if self.errors.len() < RETAINED_ERRORS {
                    self.errors.push(error);
                }
            }
        }
    }

    fn fail(&mut self, error: IngestError) {
        error!(stage = %self.stage, %error, "stage aborted");
        self.failure = Some(error);
    }
}

/// Reports for every stage of one load run.
#[derive(Debug)]
pub struct LoadReport {
    pub links: StageReport,
    pub movies: StageReport,
    pub genres: StageReport,
    pub movie_genres: StageReport,
    pub ratings: StageReport,
}

impl LoadReport {
    /// Stages in execution order.
    pub fn stages(&self) -> [&StageReport; 5] {
        [
            &self.links,
            &self.movies,
            &self.genres,
            &self.movie_genres,
            &self.ratings,
        ]
    }

    pub fn total_persisted(&self) -> usize {
        self.stages().iter().map(|stage| stage.persisted).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.stages()
            .iter()
            .map(|stage| stage.skipped + stage.failed)
            .sum()
    }
}

/// Genres and movie-genre pairs gathered while reading movies.
#[derive(Debug, Default)]
struct GenreCollector {
    genres: BTreeSet<CreateGenreRequest>,
    associations: Vec<(Option<i64>, i64)>,
}

/// Run every stage against `schema`.
pub async fn run_load<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    options: &LoadOptions,
) -> LoadReport {
    info!(
        data_dir = %options.data_dir.display(),
        schema = schema.schema(),
        "starting load"
    );
    let links = load_links(schema, options)
        .instrument(info_span!("stage", name = "links"))
        .await;
    let (movies, collector) = load_movies(schema, options)
        .instrument(info_span!("stage", name = "movies"))
        .await;
    let genres = flush_genres(schema, &collector, options)
        .instrument(info_span!("stage", name = "genres"))
        .await;
    let movie_genres = flush_movie_genres(schema, &collector, options)
        .instrument(info_span!("stage", name = "movie_genres"))
        .await;
    let ratings = load_ratings(schema, options)
        .instrument(info_span!("stage", name = "ratings"))
        .await;
    LoadReport {
        links,
        movies,
        genres,
        movie_genres,
        ratings,
    }
}

async fn load_links<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    options: &LoadOptions,
) -> StageReport {
    let started = Instant::now();
    let mut report = StageReport::new(EntityKind::Link);
    let Some(rows) = open_source::<LinkRecord>(&options.data_dir, options.link_limit, &mut report)
    else {
        return report;
    };
    let progress = stage_progress(EntityKind::Link, options.link_limit, options.show_progress);
    for row in rows {
        progress.inc(1);
        report.rows_read += 1;
        let result = match row {
            Ok(SourceRow { index, record }) => persist_link(schema, index, &record).await,
            Err(error) => Err(RowError::from_read(EntityKind::Link, error)),
        };
        report.record(result);
    }
    finish_stage(&mut report, &progress, started);
    report
}

async fn persist_link<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    index: usize,
    record: &LinkRecord,
) -> RowResult {
    let request = clean_link(record)
        .map_err(|reason| RowError::new(EntityKind::Link, index, RowErrorKind::SkipCondition(reason)))?;
    let outcome = schema.link_create(&request).await;
    persisted(EntityKind::Link, index, outcome)
}

async fn load_movies<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    options: &LoadOptions,
) -> (StageReport, GenreCollector) {
    let started = Instant::now();
    let mut report = StageReport::new(EntityKind::Movie);
    let mut collector = GenreCollector::default();
    let Some(rows) =
        open_source::<MovieRecord>(&options.data_dir, options.movie_limit, &mut report)
    else {
        return (report, collector);
    };
    let progress = stage_progress(EntityKind::Movie, options.movie_limit, options.show_progress);
    for row in rows {
        progress.inc(1);
        report.rows_read += 1;
        let result = match row {
            Ok(SourceRow { index, record }) => {
                collect_genres(&mut collector, &record);
                persist_movie(schema, index, &record).await
            }
            Err(error) => Err(RowError::from_read(EntityKind::Movie, error)),
        };
        report.record(result);
    }
    finish_stage(&mut report, &progress, started);
    (report, collector)
}

/// Genres are gathered before the movie id is checked, so a movie without a
/// usable id still contributes its genres and a pair that is later skipped.
fn collect_genres(collector: &mut GenreCollector, record: &MovieRecord) {
    let id = movie_id(record);
    for (genre_id, name) in movie_genres(record) {
        collector.genres.insert(CreateGenreRequest { id: genre_id, name });
        collector.associations.push((id, genre_id));
    }
}

async fn persist_movie<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    index: usize,
    record: &MovieRecord,
) -> RowResult {
    let request = clean_movie(record).map_err(|reason| {
        RowError::new(EntityKind::Movie, index, RowErrorKind::SkipCondition(reason))
    })?;
    let outcome = schema.movie_create(&request).await;
    persisted(EntityKind::Movie, index, outcome)
}

async fn flush_genres<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    collector: &GenreCollector,
    options: &LoadOptions,
) -> StageReport {
    let started = Instant::now();
    let mut report = StageReport::new(EntityKind::Genre);
    let progress = stage_progress(
        EntityKind::Genre,
        Some(collector.genres.len()),
        options.show_progress,
    );
    for (index, genre) in collector.genres.iter().enumerate() {
        progress.inc(1);
        report.rows_read += 1;
        let outcome = schema.genre_create(genre).await;
        report.record(persisted(EntityKind::Genre, index, outcome));
    }
    finish_stage(&mut report, &progress, started);
    report
}

async fn flush_movie_genres<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    collector: &GenreCollector,
    options: &LoadOptions,
) -> StageReport {
    let started = Instant::now();
    let mut report = StageReport::new(EntityKind::MovieGenre);
    let progress = stage_progress(
        EntityKind::MovieGenre,
        Some(collector.associations.len()),
        options.show_progress,
    );
    for (index, &(movie, genre)) in collector.associations.iter().enumerate() {
        progress.inc(1);
        report.rows_read += 1;
        let result = match clean_movie_genre(movie, genre) {
            Ok(request) => {
                let outcome = schema.movie_genre_create(&request).await;
                persisted(EntityKind::MovieGenre, index, outcome)
            }
            Err(reason) => Err(RowError::new(
                EntityKind::MovieGenre,
                index,
                RowErrorKind::SkipCondition(reason),
            )),
        };
        report.record(result);
    }
    finish_stage(&mut report, &progress, started);
    report
}

async fn load_ratings<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    options: &LoadOptions,
) -> StageReport {
    let started = Instant::now();
    let mut report = StageReport::new(EntityKind::Rating);
    let Some(rows) =
        open_source::<RatingRecord>(&options.data_dir, options.rating_limit, &mut report)
    else {
        return report;
    };
    let progress = stage_progress(EntityKind::Rating, options.rating_limit, options.show_progress);
    for row in rows {
        progress.inc(1);
        report.rows_read += 1;
        let result = match row {
            Ok(SourceRow { index, record }) => persist_rating(schema, index, &record).await,
            Err(error) => Err(RowError::from_read(EntityKind::Rating, error)),
        };
        report.record(result);
    }
    finish_stage(&mut report, &progress, started);
    report
}

async fn persist_rating<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    index: usize,
    record: &RatingRecord,
) -> RowResult {
    let request = clean_rating(record).map_err(|reason| {
        RowError::new(EntityKind::Rating, index, RowErrorKind::SkipCondition(reason))
    })?;
    let outcome = schema.rating_create(&request).await;
    persisted(EntityKind::Rating, index, outcome)
}

/// Open a source truncated to `limit` rows, recording a failure on `report`.
fn open_source<T: SourceRecord>(
    data_dir: &Path,
    limit: Option<usize>,
    report: &mut StageReport,
) -> Option<std::iter::Take<SourceReader<T>>> {
    match SourceReader::<T>::open_in(data_dir) {
        Ok(reader) => {
            info!(path = %reader.path().display(), limit = ?limit, "reading source");
            Some(reader.take(limit.unwrap_or(usize::MAX)))
        }
        Err(error) => {
            report.fail(error);
            None
        }
    }
}

fn persisted(
    stage: EntityKind,
    index: usize,
    outcome: movielens_db::Result<ProcedureOutcome>,
) -> RowResult {
    outcome
        .map(|outcome| RowOutcome {
            index,
            status: outcome.out_param,
        })
        .map_err(|error| RowError::new(stage, index, RowErrorKind::Database(error)))
}

fn finish_stage(report: &mut StageReport, progress: &ProgressBar, started: Instant) {
    progress.finish_and_clear();
    report.elapsed = started.elapsed();
    info!(
        stage = %report.stage,
        read = report.rows_read,
        persisted = report.persisted,
        skipped = report.skipped(),
        failed = report.failed(),
        elapsed_ms = report.elapsed.as_millis(),
        "stage complete"
    );
}

fn stage_progress(stage: EntityKind, length: Option<usize>, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let progress = match length {
        Some(length) => {
            let bar = ProgressBar::new(length as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{msg:>12} [{bar:40}] {pos}/{len} ({per_sec})")
            {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg:>12} {pos} rows ({per_sec})")
            {
                spinner.set_style(style);
            }
            spinner
        }
    };
    progress.set_draw_target(ProgressDrawTarget::stderr());
    progress.set_message(stage.label());
    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_error_but_retains_a_prefix() {
        let mut report = StageReport::new(EntityKind::Rating);
        for index in 0..RETAINED_ERRORS * 3 {
            let kind = if index % 3 == 0 {
                RowErrorKind::SkipCondition(SkipReason::MissingField("rating"))
            } else {
                RowErrorKind::MissingKey("rating")
            };
            report.record(Err(RowError::new(EntityKind::Rating, index, kind)));
        }
        report.record(Ok(RowOutcome {
            index: RETAINED_ERRORS * 3,
            status: None,
        }));

        assert_eq!(report.skipped(), RETAINED_ERRORS);
        assert_eq!(report.failed(), RETAINED_ERRORS * 2);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.errors.len(), RETAINED_ERRORS);
        assert_eq!(report.errors[0].index, 0);
        assert_eq!(report.errors[RETAINED_ERRORS - 1].index, RETAINED_ERRORS - 1);
    }
}
