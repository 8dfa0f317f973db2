//! MovieLens data transformation utilities.
//!
//! This crate turns raw CSV records into typed procedure requests:
//!
//! - **normalization**: cell-level coercion and structured-field parsing
//! - **clean**: per-source row cleaning and skip rules

pub mod clean;
pub mod normalization;

// Re-export common functions for external use
pub use clean::{
    SkipReason, clean_link, clean_movie, clean_movie_genre, clean_rating, format_imdb_id,
    movie_genres, movie_id,
};
pub use normalization::{CleanValue, TargetType, normalize, parse_structured};
