//! Schema facade over the stored procedures.

use movielens_model::{
    CreateGenreRequest, CreateLinkRequest, CreateMovieGenreRequest, CreateMovieRequest,
    CreateRatingRequest, Procedure,
};
use tracing::trace;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::gateway::{ProcedureCall, ProcedureGateway, ProcedureOutcome, validate_schema_name};
use crate::params::{ProcParam, ProcedureArgs};
use crate::postgres::PgGateway;

/// One call per procedure, bound to a schema and a single gateway.
#[derive(Debug)]
pub struct MovieSchema<G> {
    schema: String,
    gateway: G,
}

impl MovieSchema<PgGateway> {
    /// Open a PostgreSQL pool and bind it to `schema`.
    pub async fn connect(schema: impl Into<String>, config: &DatabaseConfig) -> Result<Self> {
        let schema = schema.into();
        validate_schema_name(&schema)?;
        let gateway = PgGateway::connect(config).await?;
        Ok(Self { schema, gateway })
    }
}

impl<G: ProcedureGateway> MovieSchema<G> {
    pub fn new(schema: impl Into<String>, gateway: G) -> Result<Self> {
        let schema = schema.into();
        validate_schema_name(&schema)?;
        Ok(Self { schema, gateway })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Invoke `procedure` in this schema with positional `params`.
    pub async fn call_proc(
        &self,
        procedure: Procedure,
        params: Vec<ProcParam>,
    ) -> Result<ProcedureOutcome> {
        trace!(procedure = %procedure, schema = %self.schema, "calling procedure");
        let call = ProcedureCall::new(self.schema.as_str(), procedure, params);
        self.gateway.invoke(call).await
    }

    async fn create<R: ProcedureArgs>(&self, request: &R) -> Result<ProcedureOutcome> {
        self.call_proc(R::PROCEDURE, request.to_params()).await
    }

    pub async fn movie_create(&self, request: &CreateMovieRequest) -> Result<ProcedureOutcome> {
        self.create(request).await
    }

    pub async fn genre_create(&self, request: &CreateGenreRequest) -> Result<ProcedureOutcome> {
        self.create(request).await
    }

    pub async fn movie_genre_create(
        &self,
        request: &CreateMovieGenreRequest,
    ) -> Result<ProcedureOutcome> {
        self.create(request).await
    }

    pub async fn rating_create(&self, request: &CreateRatingRequest) -> Result<ProcedureOutcome> {
        self.create(request).await
    }

    pub async fn link_create(&self, request: &CreateLinkRequest) -> Result<ProcedureOutcome> {
        self.create(request).await
    }

    pub async fn movie_listing(&self) -> Result<ProcedureOutcome> {
        self.call_proc(Procedure::GetMovies, Vec::new()).await
    }

    pub async fn genre_listing(&self) -> Result<ProcedureOutcome> {
        self.call_proc(Procedure::GetGenres, Vec::new()).await
    }

    /// Movies of `genre` whose average rating is at least 3.0.
    pub async fn average_rating_by_genre(&self, genre: &str) -> Result<ProcedureOutcome> {
        self.call_proc(
            Procedure::GetAverageRatingByGenre,
            vec![ProcParam::text(genre)],
        )
        .await
    }

    /// Run a statement with no result set in this schema.
    pub async fn execute(&self, statement: &str) -> Result<()> {
        self.gateway.execute(&self.schema, statement).await
    }

    pub async fn close(&self) {
        self.gateway.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::memory::MemoryGateway;

    #[test]
    fn rejects_missing_schema() {
        let result = MovieSchema::new("", MemoryGateway::new());
        assert!(matches!(result, Err(DbError::MissingSchema)));
    }

    #[test]
    fn rejects_unsafe_schema() {
        let result = MovieSchema::new("t2project'; --", MemoryGateway::new());
        assert!(matches!(result, Err(DbError::InvalidSchema(_))));
    }
}
