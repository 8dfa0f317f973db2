//! PostgreSQL gateway backed by an sqlx connection pool.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{
    PgArguments, PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgRow,
};
use sqlx::query::Query;
use sqlx::{Column, Executor, Postgres, Row, TypeInfo, ValueRef};
use tracing::{debug, info};

use movielens_model::{DbValue, Procedure, ResultRow};

use crate::config::DatabaseConfig;
use crate::error::{DbError, Result};
use crate::gateway::{ProcedureCall, ProcedureGateway, ProcedureOutcome, set_schema_statement};
use crate::params::ProcParam;

/// Declared argument types of a function, in order, as cast-ready type names.
const SIGNATURE_QUERY: &str = "SELECT pg_catalog.format_type(arg.type_oid, NULL) \
     FROM pg_catalog.pg_proc AS fn, \
     unnest(fn.proargtypes::oid[]) WITH ORDINALITY AS arg(type_oid, ordinal) \
     WHERE fn.oid = pg_catalog.to_regproc($1) \
     ORDER BY arg.ordinal";

type SignatureCache = HashMap<(String, Procedure), Vec<String>>;

/// Gateway that runs procedures on a pooled PostgreSQL connection.
///
/// Parameters are bound with their natural Postgres types and cast to each
/// procedure's declared argument types, which are looked up once per schema
/// and procedure.
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: PgPool,
    signatures: Arc<Mutex<SignatureCache>>,
}

impl PgGateway {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|source| DbError::Connect {
                host: config.host.clone(),
                port: config.port,
                database: config.database.clone(),
                source,
            })?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.max_connections,
            "database pool ready"
        );
        Ok(Self {
            pool,
            signatures: Arc::default(),
        })
    }

    async fn acquire_in(&self, schema: &str) -> Result<PoolConnection<Postgres>> {
        let mut conn = self.pool.acquire().await.map_err(DbError::Acquire)?;
        let statement = set_schema_statement(schema);
        (&mut *conn)
            .execute(statement.as_str())
            .await
            .map_err(|source| DbError::SetSchema {
                schema: schema.to_string(),
                source,
            })?;
        Ok(conn)
    }

    fn lock_signatures(&self) -> MutexGuard<'_, SignatureCache> {
        self.signatures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Declared argument types for `call`, empty when the name does not
    /// resolve to exactly one function.
    async fn arg_types(
        &self,
        conn: &mut PgConnection,
        call: &ProcedureCall,
    ) -> Result<Vec<String>> {
        let key = (call.schema.clone(), call.procedure);
        if let Some(cached) = self.lock_signatures().get(&key) {
            return Ok(cached.clone());
        }
        let procedure = call.qualified_name();
        let arg_types: Vec<String> = sqlx::query_scalar(SIGNATURE_QUERY)
            .bind(procedure.as_str())
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| DbError::Procedure {
                procedure: procedure.clone(),
                source,
            })?;
        debug!(procedure = %procedure, ?arg_types, "resolved procedure signature");
        self.lock_signatures().insert(key, arg_types.clone());
        Ok(arg_types)
    }
}

impl ProcedureGateway for PgGateway {
    async fn invoke(&self, call: ProcedureCall) -> Result<ProcedureOutcome> {
        let started = Instant::now();
        let procedure = call.qualified_name();
        let mut conn = self.acquire_in(&call.schema).await?;

        let arg_types = self.arg_types(&mut *conn, &call).await?;
        let sql = call.sql_with_casts(&arg_types);
        let query = call.params.iter().fold(sqlx::query(&sql), bind_param);
        let fetched = query
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| DbError::Procedure {
                procedure: procedure.clone(),
                source,
            })?;

        let outcome = decode_outcome(&fetched, call.expect_rows, call.lowercase_keys)
            .map_err(|source| DbError::Procedure {
                procedure: procedure.clone(),
                source,
            })?;
        debug!(
            procedure = %procedure,
            rows = outcome.row_count,
            elapsed_ms = started.elapsed().as_millis(),
            "procedure call complete"
        );
        Ok(outcome)
    }

    async fn execute(&self, schema: &str, statement: &str) -> Result<()> {
        let mut conn = self.acquire_in(schema).await?;
        (&mut *conn)
            .execute(statement)
            .await
            .map_err(|source| DbError::Statement {
                statement: statement.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("database pool closed");
    }
}

fn bind_param<'q>(
    query: Query<'q, Postgres, PgArguments>,
    param: &ProcParam,
) -> Query<'q, Postgres, PgArguments> {
    match param {
        ProcParam::Int(value) => query.bind(*value),
        ProcParam::Float(value) => query.bind(*value),
        ProcParam::Bool(value) => query.bind(*value),
        ProcParam::Date(value) => query.bind(*value),
        ProcParam::Text(value) => query.bind(value.clone()),
    }
}

fn decode_outcome(
    fetched: &[PgRow],
    expect_rows: bool,
    lowercase_keys: bool,
) -> std::result::Result<ProcedureOutcome, sqlx::Error> {
    if expect_rows {
        let rows = fetched
            .iter()
            .map(|row| decode_row(row, lowercase_keys))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(ProcedureOutcome {
            out_param: None,
            row_count: rows.len(),
            rows,
        });
    }
    let out_param = match fetched.first() {
        Some(row) if !row.columns().is_empty() => Some(decode_value(row, 0)?),
        _ => None,
    };
    Ok(ProcedureOutcome {
        out_param,
        row_count: 0,
        rows: Vec::new(),
    })
}

fn decode_row(row: &PgRow, lowercase_keys: bool) -> std::result::Result<ResultRow, sqlx::Error> {
    let mut result = ResultRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let name = if lowercase_keys {
            column.name().to_lowercase()
        } else {
            column.name().to_string()
        };
        result.push(name, decode_value(row, index)?);
    }
    Ok(result)
}

/// Decode one column by its server-side type name.
///
/// NUMERIC keeps its exact decimal form. Unrecognized types fall back to
/// their text representation when it is valid UTF-8.
fn decode_value(row: &PgRow, index: usize) -> std::result::Result<DbValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(DbValue::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        "VOID" => DbValue::Null,
        "BOOL" => DbValue::Bool(row.try_get(index)?),
        "INT2" => DbValue::Int(i64::from(row.try_get::<i16, _>(index)?)),
        "INT4" => DbValue::Int(i64::from(row.try_get::<i32, _>(index)?)),
        "INT8" => DbValue::Int(row.try_get(index)?),
        "FLOAT4" => DbValue::Float(f64::from(row.try_get::<f32, _>(index)?)),
        "FLOAT8" => DbValue::Float(row.try_get(index)?),
        "NUMERIC" => DbValue::Decimal(row.try_get::<Decimal, _>(index)?),
        "DATE" => DbValue::Date(row.try_get::<NaiveDate, _>(index)?),
        "TIMESTAMP" => DbValue::Timestamp(row.try_get::<NaiveDateTime, _>(index)?),
        "TIMESTAMPTZ" => DbValue::Timestamp(row.try_get::<DateTime<Utc>, _>(index)?.naive_utc()),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => DbValue::Text(row.try_get(index)?),
        _ => row
            .try_get_unchecked::<String, _>(index)
            .map_or(DbValue::Null, DbValue::Text),
    };
    Ok(value)
}
