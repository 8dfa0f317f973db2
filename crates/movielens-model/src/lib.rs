//! Shared data model for the MovieLens loader.

pub mod procedure;
pub mod request;
pub mod value;

pub use procedure::Procedure;
pub use request::{
    CreateGenreRequest, CreateLinkRequest, CreateMovieGenreRequest, CreateMovieRequest,
    CreateRatingRequest, EntityKind,
};
pub use value::{DbValue, ResultRow};
