//! Stored procedures exposed by the MovieLens schema.

use std::fmt;

/// A stored procedure in the target schema.
///
/// The database owns the procedure bodies; this crate only knows their names
/// and whether they produce a row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Procedure {
    AddMovie,
    AddGenre,
    AddMovieGenre,
    AddRating,
    AddLink,
    GetMovies,
    GetGenres,
    GetAverageRatingByGenre,
}

impl Procedure {
    /// Unqualified procedure name as declared in the database.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddMovie => "ADD_MOVIE",
            Self::AddGenre => "ADD_GENRE",
            Self::AddMovieGenre => "ADD_MOVIE_GENRE",
            Self::AddRating => "ADD_RATING",
            Self::AddLink => "ADD_LINK",
            Self::GetMovies => "GET_MOVIES",
            Self::GetGenres => "GET_GENRES",
            Self::GetAverageRatingByGenre => "GET_AVERAGE_RATING_BY_GENRE",
        }
    }

    /// Schema-qualified name, e.g. `t2project.ADD_MOVIE`.
    #[must_use]
    pub fn qualified_name(self, schema: &str) -> String {
        format!("{schema}.{}", self.name())
    }

    /// Whether the procedure returns a row set rather than a single status value.
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        matches!(
            self,
            Self::GetMovies | Self::GetGenres | Self::GetAverageRatingByGenre
        )
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
