//! Performance indexes for the rating query.

use tracing::info;

use movielens_db::{MovieSchema, ProcedureGateway};

/// DDL for every index, in creation order.
pub const PERFORMANCE_INDEXES: [&str; 7] = [
    "CREATE INDEX IDX_RATINGS_MOVIE_ID ON RATINGS(MOVIE_ID)",
    "CREATE INDEX IDX_RATINGS_RATING ON RATINGS(RATING)",
    "CREATE INDEX IDX_RATINGS_MOVIE_RATING ON RATINGS(MOVIE_ID, RATING)",
    "CREATE INDEX IDX_MOVIE_GENRES_GENRE_ID ON MOVIE_GENRES(GENRE_ID)",
    "CREATE INDEX IDX_LINKS_TMDB_ID ON LINKS(TMDB_ID)",
    "CREATE INDEX IDX_MOVIES_TITLE ON MOVIES(TITLE)",
    "CREATE INDEX IDX_MOVIES_VOTE_AVG ON MOVIES(VOTE_AVERAGE)",
];

/// Create every index in the schema, stopping at the first failure.
pub async fn create_indexes<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
) -> movielens_db::Result<usize> {
    for statement in PERFORMANCE_INDEXES {
        schema.execute(statement).await?;
        info!(statement, "index created");
    }
    Ok(PERFORMANCE_INDEXES.len())
}
