//! Row cleaning: raw CSV records into procedure requests.
//!
//! Each `clean_*` function either produces a request ready for the schema
//! facade or the reason the row must be skipped. Zero counts as missing for
//! identifiers and timestamps, matching how the dataset marks absent keys.

use movielens_ingest::{LinkRecord, MovieRecord, RatingRecord};
use movielens_model::{
    CreateLinkRequest, CreateMovieGenreRequest, CreateMovieRequest, CreateRatingRequest,
};
use thiserror::Error;

use crate::normalization::{
    extract_genres, normalize_bool, normalize_date, normalize_float, normalize_int,
    normalize_text, parse_structured,
};

/// Width of the numeric part of an IMDb identifier.
pub const IMDB_ID_WIDTH: usize = 7;
pub const IMDB_ID_PREFIX: &str = "tt";

/// Why a row was not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// A required field is missing, unparseable, or zero.
    #[error("required field '{0}' is missing or zero")]
    MissingField(&'static str),
}

fn required(value: Option<i64>, field: &'static str) -> Result<i64, SkipReason> {
    value
        .filter(|&id| id != 0)
        .ok_or(SkipReason::MissingField(field))
}

/// Left-pad with zeros to `width`, keeping a leading sign in front.
pub fn zero_fill(value: &str, width: usize) -> String {
    let length = value.chars().count();
    if length >= width {
        return value.to_string();
    }
    let padding = "0".repeat(width - length);
    match value.strip_prefix(['+', '-']) {
        Some(rest) => format!("{}{padding}{rest}", &value[..1]),
        None => format!("{padding}{value}"),
    }
}

/// `tt`-prefix and zero-pad an IMDb identifier unless it is already prefixed.
pub fn format_imdb_id(raw: &str) -> String {
    if raw.starts_with(IMDB_ID_PREFIX) {
        raw.to_string()
    } else {
        format!("{IMDB_ID_PREFIX}{}", zero_fill(raw, IMDB_ID_WIDTH))
    }
}

pub fn clean_link(record: &LinkRecord) -> Result<CreateLinkRequest, SkipReason> {
    let movie_id = required(normalize_int(record.movie_id.as_deref()), "movieId")?;
    let imdb_id = normalize_text(record.imdb_id.as_deref()).map(|raw| format_imdb_id(&raw));
    Ok(CreateLinkRequest {
        movie_id,
        imdb_id,
        tmdb_id: normalize_int(record.tmdb_id.as_deref()),
    })
}

/// Movie id as read from the row, before the required-field check.
pub fn movie_id(record: &MovieRecord) -> Option<i64> {
    normalize_int(record.id.as_deref())
}

/// Genres listed on a movie row, in listing order.
pub fn movie_genres(record: &MovieRecord) -> Vec<(i64, String)> {
    extract_genres(&parse_structured(record.genres.as_deref()))
}

pub fn clean_movie(record: &MovieRecord) -> Result<CreateMovieRequest, SkipReason> {
    let id = required(movie_id(record), "id")?;
    let text = |field: &Option<String>| normalize_text(field.as_deref());
    Ok(CreateMovieRequest {
        id,
        imdb_id: text(&record.imdb_id),
        title: text(&record.title),
        original_title: text(&record.original_title),
        overview: text(&record.overview),
        release_date: normalize_date(record.release_date.as_deref()),
        budget: normalize_int(record.budget.as_deref()),
        revenue: normalize_int(record.revenue.as_deref()),
        runtime: normalize_float(record.runtime.as_deref()),
        adult: normalize_bool(record.adult.as_deref()),
        popularity: normalize_float(record.popularity.as_deref()),
        vote_average: normalize_float(record.vote_average.as_deref()),
        vote_count: normalize_int(record.vote_count.as_deref()),
        status: text(&record.status),
        tagline: text(&record.tagline),
        original_language: text(&record.original_language),
        belongs_to_collection: text(&record.belongs_to_collection),
        homepage: text(&record.homepage),
        poster_path: text(&record.poster_path),
        production_companies: text(&record.production_companies),
        production_countries: text(&record.production_countries),
        spoken_languages: text(&record.spoken_languages),
        video: normalize_bool(record.video.as_deref()),
    })
}

/// Association between a movie row and one of its genres.
pub fn clean_movie_genre(
    movie_id: Option<i64>,
    genre_id: i64,
) -> Result<CreateMovieGenreRequest, SkipReason> {
    Ok(CreateMovieGenreRequest {
        movie_id: required(movie_id, "movie_id")?,
        genre_id: required(Some(genre_id), "genre_id")?,
    })
}

pub fn clean_rating(record: &RatingRecord) -> Result<CreateRatingRequest, SkipReason> {
    let user_id = required(normalize_int(record.user_id.as_deref()), "userId")?;
    let movie_id = required(normalize_int(record.movie_id.as_deref()), "movieId")?;
    let rating =
        normalize_float(record.rating.as_deref()).ok_or(SkipReason::MissingField("rating"))?;
    let timestamp = required(normalize_int(record.timestamp.as_deref()), "timestamp")?;
    Ok(CreateRatingRequest {
        user_id,
        movie_id,
        rating,
        timestamp,
    })
}
