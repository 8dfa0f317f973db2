//! Positional parameters for procedure calls.

use chrono::NaiveDate;

use movielens_model::{
    CreateGenreRequest, CreateLinkRequest, CreateMovieGenreRequest, CreateMovieRequest,
    CreateRatingRequest, Procedure,
};

/// One positional argument, typed for binding.
///
/// `None` binds SQL `NULL` of the matching type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcParam {
    Int(Option<i64>),
    Float(Option<f64>),
    Bool(bool),
    Date(Option<NaiveDate>),
    Text(Option<String>),
}

impl ProcParam {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }
}

/// A request that maps onto one write procedure.
pub trait ProcedureArgs {
    /// Procedure that receives these arguments.
    const PROCEDURE: Procedure;

    /// Arguments in the procedure's declared order.
    fn to_params(&self) -> Vec<ProcParam>;
}

impl ProcedureArgs for CreateMovieRequest {
    const PROCEDURE: Procedure = Procedure::AddMovie;

    fn to_params(&self) -> Vec<ProcParam> {
        vec![
            ProcParam::Int(Some(self.id)),
            ProcParam::Text(self.imdb_id.clone()),
            ProcParam::Text(self.title.clone()),
            ProcParam::Text(self.original_title.clone()),
            ProcParam::Text(self.overview.clone()),
            ProcParam::Date(self.release_date),
            ProcParam::Int(self.budget),
            ProcParam::Int(self.revenue),
            ProcParam::Float(self.runtime),
            ProcParam::Bool(self.adult),
            ProcParam::Float(self.popularity),
            ProcParam::Float(self.vote_average),
            ProcParam::Int(self.vote_count),
            ProcParam::Text(self.status.clone()),
            ProcParam::Text(self.tagline.clone()),
            ProcParam::Text(self.original_language.clone()),
            ProcParam::Text(self.belongs_to_collection.clone()),
            ProcParam::Text(self.homepage.clone()),
            ProcParam::Text(self.poster_path.clone()),
            ProcParam::Text(self.production_companies.clone()),
            ProcParam::Text(self.production_countries.clone()),
            ProcParam::Text(self.spoken_languages.clone()),
            ProcParam::Bool(self.video),
        ]
    }
}

impl ProcedureArgs for CreateGenreRequest {
    const PROCEDURE: Procedure = Procedure::AddGenre;

    fn to_params(&self) -> Vec<ProcParam> {
        vec![ProcParam::Int(Some(self.id)), ProcParam::text(&self.name)]
    }
}

impl ProcedureArgs for CreateMovieGenreRequest {
    const PROCEDURE: Procedure = Procedure::AddMovieGenre;

    fn to_params(&self) -> Vec<ProcParam> {
        vec![
            ProcParam::Int(Some(self.movie_id)),
            ProcParam::Int(Some(self.genre_id)),
        ]
    }
}

impl ProcedureArgs for CreateRatingRequest {
    const PROCEDURE: Procedure = Procedure::AddRating;

    fn to_params(&self) -> Vec<ProcParam> {
        vec![
            ProcParam::Int(Some(self.user_id)),
            ProcParam::Int(Some(self.movie_id)),
            ProcParam::Float(Some(self.rating)),
            ProcParam::Int(Some(self.timestamp)),
        ]
    }
}

impl ProcedureArgs for CreateLinkRequest {
    const PROCEDURE: Procedure = Procedure::AddLink;

    fn to_params(&self) -> Vec<ProcParam> {
        vec![
            ProcParam::Int(Some(self.movie_id)),
            ProcParam::Text(self.imdb_id.clone()),
            ProcParam::Int(self.tmdb_id),
        ]
    }
}
