//! Typed requests for the write procedures.
//!
//! Each struct corresponds to one `ADD_*` procedure. Fields are declared in
//! the positional order the procedure expects, so the mapping to parameters
//! at the database boundary stays mechanical.

use std::fmt;

use chrono::NaiveDate;

/// Entity kinds written by a load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Link,
    Movie,
    Genre,
    MovieGenre,
    Rating,
}

impl EntityKind {
    /// Human-readable label used in progress output and summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Link => "Links",
            Self::Movie => "Movies",
            Self::Genre => "Genres",
            Self::MovieGenre => "Movie genres",
            Self::Rating => "Ratings",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row for `ADD_MOVIE`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateMovieRequest {
    pub id: i64,
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    /// Minutes.
    pub runtime: Option<f64>,
    pub adult: bool,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub original_language: Option<String>,
    pub belongs_to_collection: Option<String>,
    pub homepage: Option<String>,
    pub poster_path: Option<String>,
    pub production_companies: Option<String>,
    pub production_countries: Option<String>,
    pub spoken_languages: Option<String>,
    pub video: bool,
}

/// Row for `ADD_GENRE`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CreateGenreRequest {
    pub id: i64,
    pub name: String,
}

/// Row for `ADD_MOVIE_GENRE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateMovieGenreRequest {
    pub movie_id: i64,
    pub genre_id: i64,
}

/// Row for `ADD_RATING`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateRatingRequest {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: f64,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

/// Row for `ADD_LINK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLinkRequest {
    pub movie_id: i64,
    /// IMDb identifier in `tt0000000` form.
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i64>,
}
