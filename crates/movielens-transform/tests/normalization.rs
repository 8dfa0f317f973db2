//! Tests for cell normalization and structured parsing.

use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::json;

use movielens_transform::normalization::{
    CleanValue, TargetType, extract_genres, normalize, normalize_bool, normalize_date,
};
use movielens_transform::parse_structured;

#[test]
fn bool_true_spellings() {
    for raw in ["true", "True", "1", "yes", "YES"] {
        assert!(normalize_bool(Some(raw)), "{raw} should be true");
    }
}

#[test]
fn bool_false_spellings() {
    for raw in ["false", "0", "no", "maybe", "False"] {
        assert!(!normalize_bool(Some(raw)), "{raw} should be false");
    }
}

#[test]
fn date_uses_first_ten_characters() {
    assert_eq!(
        normalize(Some("1995-10-30"), TargetType::Date),
        CleanValue::Date(NaiveDate::from_ymd_opt(1995, 10, 30).unwrap())
    );
    assert_eq!(
        normalize_date(Some("2015-03-07T12:00:00Z")),
        NaiveDate::from_ymd_opt(2015, 3, 7)
    );
}

#[test]
fn date_rejects_short_and_invalid() {
    assert_eq!(normalize_date(Some("2015-03")), None);
    assert_eq!(normalize_date(Some("2015-13-40")), None);
    assert_eq!(normalize_date(Some("not a date at all")), None);
}

#[test]
fn parse_structured_single_genre() {
    let value = parse_structured(Some("[{'id': 18, 'name': 'Drama'}]"));
    assert_eq!(value, json!([{"id": 18, "name": "Drama"}]));
    assert_eq!(extract_genres(&value), vec![(18, "Drama".to_string())]);
}

#[test]
fn parse_structured_garbage_is_empty() {
    assert_eq!(parse_structured(Some("[{'id': ")), json!([]));
    assert_eq!(parse_structured(Some("Drama, Comedy")), json!([]));
}

#[test]
fn parse_structured_deep_nesting_is_empty() {
    let nested = "[".repeat(200_000);
    assert_eq!(parse_structured(Some(nested.as_str())), json!([]));
    let balanced = format!("{}{}", "[{'a': ".repeat(100_000), "}]".repeat(100_000));
    assert_eq!(parse_structured(Some(balanced.as_str())), json!([]));
}

proptest! {
    #[test]
    fn date_ignores_any_suffix(suffix in ".*") {
        let raw = format!("2015-03-07{suffix}");
        prop_assert_eq!(normalize_date(Some(raw.as_str())), NaiveDate::from_ymd_opt(2015, 3, 7));
    }

    #[test]
    fn short_text_is_never_a_date(raw in ".{0,9}") {
        prop_assume!(raw.chars().count() < 10);
        prop_assert_eq!(normalize_date(Some(raw.as_str())), None);
    }

    #[test]
    fn integers_round_trip(value in -1_000_000_000i64..1_000_000_000) {
        prop_assert_eq!(
            normalize(Some(value.to_string().as_str()), TargetType::Int),
            CleanValue::Int(value)
        );
    }

    #[test]
    fn arbitrary_text_never_panics(raw in "\\PC*") {
        let _ = normalize(Some(raw.as_str()), TargetType::Int);
        let _ = normalize(Some(raw.as_str()), TargetType::Float);
        let _ = normalize(Some(raw.as_str()), TargetType::Date);
        let _ = parse_structured(Some(raw.as_str()));
    }
}
