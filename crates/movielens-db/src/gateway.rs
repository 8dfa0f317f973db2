//! The stored-procedure gateway seam.

use std::future::Future;

use movielens_model::{DbValue, Procedure, ResultRow};

use crate::error::{DbError, Result};
use crate::params::ProcParam;

/// A single stored-procedure invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub schema: String,
    pub procedure: Procedure,
    /// Collect every result row instead of the first column of the first row.
    pub expect_rows: bool,
    /// Lower-case result column names.
    pub lowercase_keys: bool,
    pub params: Vec<ProcParam>,
}

impl ProcedureCall {
    pub fn new(schema: impl Into<String>, procedure: Procedure, params: Vec<ProcParam>) -> Self {
        Self {
            schema: schema.into(),
            procedure,
            expect_rows: procedure.returns_rows(),
            lowercase_keys: true,
            params,
        }
    }

    pub fn qualified_name(&self) -> String {
        self.procedure.qualified_name(&self.schema)
    }

    /// SQL text that invokes the procedure with `$n` placeholders.
    pub fn sql(&self) -> String {
        self.sql_with_casts(&[])
    }

    /// Like [`sql`](Self::sql), casting each placeholder to the declared
    /// argument type.
    ///
    /// Casts apply only when `arg_types` has one entry per parameter;
    /// otherwise the placeholders are left bare.
    pub fn sql_with_casts(&self, arg_types: &[String]) -> String {
        let cast = arg_types.len() == self.params.len();
        let placeholders = (1..=self.params.len())
            .map(|index| {
                if cast {
                    format!("${index}::{}", arg_types[index - 1])
                } else {
                    format!("${index}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT * FROM {}({placeholders})", self.qualified_name())
    }
}

/// What a procedure call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureOutcome {
    /// First column of the first row, for status-returning procedures.
    pub out_param: Option<DbValue>,
    /// Number of rows returned.
    pub row_count: usize,
    /// Rows, collected only when the call expects a row set.
    pub rows: Vec<ResultRow>,
}

/// Executes procedure calls against a backing store.
///
/// Calls are awaited one at a time on a single-threaded runtime, so the
/// returned futures need not be `Send`. Every call runs with its schema set
/// as the working schema.
pub trait ProcedureGateway {
    fn invoke(&self, call: ProcedureCall) -> impl Future<Output = Result<ProcedureOutcome>>;

    /// Run a statement that returns no rows, such as DDL.
    fn execute(&self, schema: &str, statement: &str) -> impl Future<Output = Result<()>>;

    /// Release pooled resources. Later calls fail.
    fn close(&self) -> impl Future<Output = ()>;
}

/// `SET SCHEMA` statement for a validated schema name.
pub fn set_schema_statement(schema: &str) -> String {
    format!("SET SCHEMA '{schema}'")
}

/// Check that `schema` is safe to splice into SQL text.
pub fn validate_schema_name(schema: &str) -> Result<()> {
    if schema.is_empty() {
        return Err(DbError::MissingSchema);
    }
    let mut chars = schema.chars();
    let leading_ok = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !leading_ok || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(DbError::InvalidSchema(schema.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_numbers_placeholders() {
        let call = ProcedureCall::new(
            "t2project",
            Procedure::AddMovieGenre,
            vec![ProcParam::Int(Some(1)), ProcParam::Int(Some(18))],
        );
        assert_eq!(call.sql(), "SELECT * FROM t2project.ADD_MOVIE_GENRE($1, $2)");
        assert!(!call.expect_rows);
    }

    #[test]
    fn sql_casts_to_declared_argument_types() {
        let call = ProcedureCall::new(
            "t2project",
            Procedure::AddRating,
            vec![
                ProcParam::Int(Some(1)),
                ProcParam::Int(Some(31)),
                ProcParam::Float(Some(2.5)),
                ProcParam::Int(Some(1_260_759_144)),
            ],
        );
        let arg_types = ["integer", "integer", "numeric", "bigint"].map(String::from);
        assert_eq!(
            call.sql_with_casts(&arg_types),
            "SELECT * FROM t2project.ADD_RATING($1::integer, $2::integer, $3::numeric, $4::bigint)"
        );
    }

    #[test]
    fn mismatched_signature_leaves_placeholders_bare() {
        let call = ProcedureCall::new(
            "t2project",
            Procedure::AddMovieGenre,
            vec![ProcParam::Int(Some(1)), ProcParam::Int(Some(18))],
        );
        let arg_types = vec!["integer".to_string()];
        assert_eq!(
            call.sql_with_casts(&arg_types),
            "SELECT * FROM t2project.ADD_MOVIE_GENRE($1, $2)"
        );
    }

    #[test]
    fn sql_without_params() {
        let call = ProcedureCall::new("t2project", Procedure::GetGenres, Vec::new());
        assert_eq!(call.sql(), "SELECT * FROM t2project.GET_GENRES()");
        assert!(call.expect_rows);
        assert!(call.lowercase_keys);
    }

    #[test]
    fn schema_names_are_identifiers() {
        assert!(validate_schema_name("t2project").is_ok());
        assert!(validate_schema_name("_staging2").is_ok());
        assert!(matches!(
            validate_schema_name(""),
            Err(DbError::MissingSchema)
        ));
        assert!(matches!(
            validate_schema_name("public; DROP TABLE movies"),
            Err(DbError::InvalidSchema(_))
        ));
        assert!(matches!(
            validate_schema_name("2fast"),
            Err(DbError::InvalidSchema(_))
        ));
    }
}
