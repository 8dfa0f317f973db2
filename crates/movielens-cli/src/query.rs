//! Timed average-rating query and its report.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use movielens_db::{MovieSchema, ProcedureGateway};
use movielens_model::ResultRow;

/// Rows returned by one timed query, plus what is needed to describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    /// Free-form label for the run, e.g. `BEFORE` or `AFTER`.
    pub label: String,
    pub genre: String,
    pub rows: Vec<ResultRow>,
    /// Time spent in the procedure call alone.
    pub elapsed: Duration,
}

impl QueryReport {
    pub fn result_count(&self) -> usize {
        self.rows.len()
    }

    /// One-line timing summary printed after the rows.
    pub fn summary_line(&self) -> String {
        format!(
            "{} INDEX QUERY -- for genre '{}' - {} results - Query executed in {:.4} seconds.",
            self.label,
            self.genre,
            self.result_count(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Call the average-rating procedure for `genre`, timing only the call.
pub async fn run_query<G: ProcedureGateway>(
    schema: &MovieSchema<G>,
    label: &str,
    genre: &str,
) -> movielens_db::Result<QueryReport> {
    let started = Instant::now();
    let outcome = schema.average_rating_by_genre(genre).await?;
    let elapsed = started.elapsed();
    info!(
        label,
        genre,
        results = outcome.row_count,
        elapsed_ms = elapsed.as_millis(),
        "query complete"
    );
    Ok(QueryReport {
        label: label.to_string(),
        genre: genre.to_string(),
        rows: outcome.rows,
        elapsed,
    })
}

/// Serialize rows as a JSON array indented by four spaces.
pub fn render_rows(rows: &[ResultRow]) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    rows.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_uses_four_decimals() {
        let report = QueryReport {
            label: "BEFORE".to_string(),
            genre: "Drama".to_string(),
            rows: vec![ResultRow::new(), ResultRow::new()],
            elapsed: Duration::from_micros(12_345),
        };
        assert_eq!(
            report.summary_line(),
            "BEFORE INDEX QUERY -- for genre 'Drama' - 2 results - Query executed in 0.0123 seconds."
        );
    }

    #[test]
    fn empty_rows_render_as_empty_array() {
        assert_eq!(render_rows(&[]).expect("render"), "[]");
    }
}
