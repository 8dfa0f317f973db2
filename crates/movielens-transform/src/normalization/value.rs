//! Scalar cell normalization.
//!
//! Every function here is total: malformed input becomes `None` (or `false`
//! for booleans) instead of an error, so a bad cell never aborts a row.

use std::fmt;

use chrono::NaiveDate;

/// Target type for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Int,
    Float,
    Bool,
    Date,
    Text,
}

/// A normalized cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

impl CleanValue {
    /// Python-style truthiness: null, zero, `false` and empty text are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Bool(value) => *value,
            Self::Date(_) => true,
            Self::Text(value) => !value.is_empty(),
        }
    }
}

impl fmt::Display for CleanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Returns true for values treated as absent: missing, empty, or `NaN`.
pub fn is_blank(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(raw) => raw.is_empty() || raw == "NaN",
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    if is_blank(value) { None } else { value }
}

/// Normalize a raw cell into the requested type.
pub fn normalize(value: Option<&str>, target: TargetType) -> CleanValue {
    match target {
        TargetType::Int => normalize_int(value).map_or(CleanValue::Null, CleanValue::Int),
        TargetType::Float => normalize_float(value).map_or(CleanValue::Null, CleanValue::Float),
        TargetType::Bool => CleanValue::Bool(normalize_bool(value)),
        TargetType::Date => normalize_date(value).map_or(CleanValue::Null, CleanValue::Date),
        TargetType::Text => normalize_text(value).map_or(CleanValue::Null, CleanValue::Text),
    }
}

fn parse_decimal_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.contains('_') {
        // Underscores are only valid between digits.
        if trimmed.starts_with('_') || trimmed.ends_with('_') || trimmed.contains("__") {
            return None;
        }
        return trimmed.replace('_', "").parse::<f64>().ok();
    }
    trimmed.parse::<f64>().ok()
}

/// Integer via float-then-truncate, so `"81.0"` and `"1e3"` are accepted.
pub fn normalize_int(value: Option<&str>) -> Option<i64> {
    let parsed = parse_decimal_text(present(value)?)?;
    // i64::MAX is not exactly representable; stay strictly inside the range.
    if !parsed.is_finite() || parsed.abs() >= 9.223_372_036_854_775e18 {
        return None;
    }
    Some(parsed.trunc() as i64)
}

pub fn normalize_float(value: Option<&str>) -> Option<f64> {
    parse_decimal_text(present(value)?).filter(|parsed| !parsed.is_nan())
}

/// True iff the text is case-insensitively `true`, `1` or `yes`.
pub fn normalize_bool(value: Option<&str>) -> bool {
    present(value).is_some_and(|raw| {
        let lowered = raw.to_lowercase();
        matches!(lowered.as_str(), "true" | "1" | "yes")
    })
}

/// Date from the first ten characters, which must be `YYYY-MM-DD`.
pub fn normalize_date(value: Option<&str>) -> Option<NaiveDate> {
    let raw = present(value)?;
    if raw.chars().count() < 10 {
        return None;
    }
    let prefix: String = raw.chars().take(10).collect();
    NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").ok()
}

pub fn normalize_text(value: Option<&str>) -> Option<String> {
    present(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_inputs() {
        for raw in [None, Some(""), Some("NaN")] {
            assert_eq!(normalize(raw, TargetType::Int), CleanValue::Null);
            assert_eq!(normalize(raw, TargetType::Float), CleanValue::Null);
            assert_eq!(normalize(raw, TargetType::Date), CleanValue::Null);
            assert_eq!(normalize(raw, TargetType::Text), CleanValue::Null);
            assert_eq!(normalize(raw, TargetType::Bool), CleanValue::Bool(false));
        }
    }

    #[test]
    fn int_truncates_floats() {
        assert_eq!(normalize_int(Some("81.9")), Some(81));
        assert_eq!(normalize_int(Some("-2.5")), Some(-2));
        assert_eq!(normalize_int(Some(" 862 ")), Some(862));
        assert_eq!(normalize_int(Some("1e3")), Some(1000));
        assert_eq!(normalize_int(Some("1_000")), Some(1000));
    }

    #[test]
    fn int_rejects_garbage() {
        assert_eq!(normalize_int(Some("1997-08-20")), None);
        assert_eq!(normalize_int(Some("inf")), None);
        assert_eq!(normalize_int(Some("nan")), None);
        assert_eq!(normalize_int(Some("_1")), None);
    }

    #[test]
    fn float_parses() {
        assert_eq!(normalize_float(Some("7.7")), Some(7.7));
        assert_eq!(normalize_float(Some("abc")), None);
        assert_eq!(normalize_float(Some("nan")), None);
    }

    #[test]
    fn text_passes_through() {
        assert_eq!(
            normalize(Some("Released"), TargetType::Text),
            CleanValue::Text("Released".to_string())
        );
    }

    #[test]
    fn truthiness() {
        assert!(!CleanValue::Int(0).is_truthy());
        assert!(CleanValue::Int(3).is_truthy());
        assert!(!CleanValue::Null.is_truthy());
        assert!(!CleanValue::Float(0.0).is_truthy());
    }
}
