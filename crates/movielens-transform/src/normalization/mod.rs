//! Normalization functions for MovieLens CSV cells.
//!
//! - **value**: scalar coercion (int, float, bool, date, text) with null handling
//! - **structured**: Python-repr/JSON parsing for nested fields such as genres
//! - **literal**: the Python literal parser used as the structured fallback

pub mod literal;
pub mod structured;
pub mod value;

// Re-export commonly used items
pub use literal::{LiteralError, parse_literal};
pub use structured::{extract_genres, parse_structured, pythonic_to_json};
pub use value::{
    CleanValue, TargetType, is_blank, normalize, normalize_bool, normalize_date, normalize_float,
    normalize_int, normalize_text,
};
