//! CLI library components for the MovieLens loader.

pub mod indexes;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod summary;
