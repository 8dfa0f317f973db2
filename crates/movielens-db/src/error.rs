//! Error types for database access.

use thiserror::Error;

/// Errors raised by the gateway and the schema facade.
#[derive(Debug, Error)]
pub enum DbError {
    // === Construction Errors ===
    /// The facade was built without a schema name.
    #[error("no schema specified")]
    MissingSchema,

    /// The schema name is not a plain SQL identifier.
    #[error("invalid schema name '{0}': expected letters, digits and underscores")]
    InvalidSchema(String),

    // === Connection Errors ===
    /// The pool could not be created.
    #[error("failed to connect to {host}:{port}/{database}: {source}")]
    Connect {
        host: String,
        port: u16,
        database: String,
        #[source]
        source: sqlx::Error,
    },

    /// No connection could be checked out of the pool.
    #[error("failed to acquire pooled connection: {0}")]
    Acquire(#[source] sqlx::Error),

    // === Call Errors ===
    /// Setting the working schema failed.
    #[error("failed to set schema '{schema}': {source}")]
    SetSchema {
        schema: String,
        #[source]
        source: sqlx::Error,
    },

    /// The procedure call failed or returned undecodable data.
    #[error("procedure {procedure} failed: {source}")]
    Procedure {
        procedure: String,
        #[source]
        source: sqlx::Error,
    },

    /// A plain SQL statement failed.
    #[error("statement failed ({statement}): {source}")]
    Statement {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    /// A call rejected by a non-database gateway.
    #[error("procedure {procedure} rejected: {message}")]
    Rejected { procedure: String, message: String },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors raised while reading database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable holds a value of the wrong shape.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Pool bounds are inverted or zero.
    #[error("invalid pool bounds: min {min}, max {max}")]
    PoolBounds { min: u32, max: u32 },
}
