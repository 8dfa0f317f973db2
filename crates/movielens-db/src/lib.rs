//! Database access for the MovieLens loader.
//!
//! Procedures are reached through a [`ProcedureGateway`]. [`PgGateway`] runs
//! them on a pooled PostgreSQL connection, [`MemoryGateway`] records them for
//! dry runs and tests, and [`MovieSchema`] exposes one method per procedure.

pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod params;
pub mod postgres;
pub mod schema;

pub use config::DatabaseConfig;
pub use error::{ConfigError, DbError, Result};
pub use gateway::{ProcedureCall, ProcedureGateway, ProcedureOutcome};
pub use memory::MemoryGateway;
pub use params::{ProcParam, ProcedureArgs};
pub use postgres::PgGateway;
pub use schema::MovieSchema;
