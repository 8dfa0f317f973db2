//! Header normalization and column-to-field mapping.

use csv::StringRecord;

/// Tokens read as missing values, matching the pandas `read_csv` defaults the
/// dataset was prepared with.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true if the raw cell should be treated as missing.
pub fn is_na(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

/// Converts a raw cell into an owned value, mapping NA tokens to `None`.
pub fn cell_value(raw: &str) -> Option<String> {
    if is_na(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

pub(crate) fn normalize_header(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

/// Positions of the expected columns within a CSV header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: &'static [&'static str],
    positions: Vec<usize>,
}

impl ColumnMap {
    /// Resolve every expected column against the header row.
    ///
    /// Returns the first missing column name on failure. Matching is exact
    /// after trimming whitespace and a UTF-8 BOM; extra columns are ignored.
    pub fn resolve(
        headers: &StringRecord,
        columns: &'static [&'static str],
    ) -> Result<Self, &'static str> {
        let names: Vec<&str> = headers.iter().map(normalize_header).collect();
        let mut positions = Vec::with_capacity(columns.len());
        for &column in columns {
            let Some(position) = names.iter().position(|name| *name == column) else {
                return Err(column);
            };
            positions.push(position);
        }
        Ok(Self { columns, positions })
    }

    /// Extract the mapped cells, in expected-column order.
    ///
    /// Returns the first column whose position lies past the end of the row.
    pub fn extract(&self, record: &StringRecord) -> Result<Vec<Option<String>>, &'static str> {
        self.positions
            .iter()
            .zip(self.columns)
            .map(|(&position, &column)| record.get(position).map(cell_value).ok_or(column))
            .collect()
    }

    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["movieId", "imdbId"];

    #[test]
    fn resolves_columns_out_of_order() {
        let headers = StringRecord::from(vec!["imdbId", "extra", "\u{feff}movieId"]);
        let map = ColumnMap::resolve(&headers, COLUMNS).expect("resolve");
        let row = StringRecord::from(vec!["114709", "x", "1"]);
        assert_eq!(
            map.extract(&row).expect("extract"),
            vec![Some("1".to_string()), Some("114709".to_string())]
        );
    }

    #[test]
    fn reports_missing_column() {
        let headers = StringRecord::from(vec!["movieId"]);
        assert_eq!(ColumnMap::resolve(&headers, COLUMNS), Err("imdbId"));
    }

    #[test]
    fn short_row_reports_column() {
        let headers = StringRecord::from(vec!["movieId", "imdbId"]);
        let map = ColumnMap::resolve(&headers, COLUMNS).expect("resolve");
        let row = StringRecord::from(vec!["1"]);
        assert_eq!(map.extract(&row), Err("imdbId"));
    }

    #[test]
    fn na_tokens_become_none() {
        assert_eq!(cell_value("NaN"), None);
        assert_eq!(cell_value(""), None);
        assert_eq!(cell_value("nan"), None);
        assert_eq!(cell_value("Drama"), Some("Drama".to_string()));
        assert_eq!(cell_value(" NaN"), Some(" NaN".to_string()));
    }
}
