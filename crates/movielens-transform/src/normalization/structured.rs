//! Permissive parsing of structured text embedded in CSV cells.
//!
//! The metadata export stores nested values (genre lists, collections) as
//! Python reprs: single-quoted keys and strings, `None`/`True`/`False`.
//! Parsing first rewrites those into JSON and tries `serde_json`; if that
//! fails, the rewritten text is parsed as a Python literal. Anything still
//! unparseable becomes an empty list.

use serde_json::Value;
use tracing::trace;

use super::literal::parse_literal;
use super::value::is_blank;

/// Rewrite a Python repr into JSON syntax by plain substitution.
///
/// Quote characters inside string values are rewritten too, so a name like
/// `"Dragon's Lair"` does not survive this step.
pub fn pythonic_to_json(raw: &str) -> String {
    raw.replace('\'', "\"")
        .replace("None", "null")
        .replace("False", "false")
        .replace("True", "true")
}

/// Parse a structured cell, never failing.
pub fn parse_structured(field: Option<&str>) -> Value {
    let Some(raw) = field.filter(|raw| !is_blank(Some(*raw))) else {
        return Value::Array(Vec::new());
    };
    let rewritten = pythonic_to_json(raw);
    match serde_json::from_str::<Value>(&rewritten) {
        Ok(value) => value,
        Err(json_error) => match parse_literal(&rewritten) {
            Ok(value) => value,
            Err(literal_error) => {
                trace!(%json_error, %literal_error, "unparseable structured field");
                Value::Array(Vec::new())
            }
        },
    }
}

/// `(id, name)` pairs from a parsed genre list.
///
/// Entries that are not objects with an integral `id` and a string `name`
/// are ignored.
pub fn extract_genres(value: &Value) -> Vec<(i64, String)> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let object = entry.as_object()?;
            let id = object.get("id").and_then(integral)?;
            let name = object.get("name")?.as_str()?;
            Some((id, name.to_string()))
        })
        .collect()
}

fn integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|float| float.fract() == 0.0 && float.abs() < 9.0e15)
            .map(|float| float as i64)
    })
}
