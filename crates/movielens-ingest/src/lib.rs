//! MovieLens data ingestion utilities.
//!
//! This crate reads the three MovieLens CSV sources into statically typed
//! raw records:
//!
//! - **Records**: one struct per source (`LinkRecord`, `MovieRecord`, `RatingRecord`)
//! - **Header mapping**: expected columns are located by name when a file is
//!   opened, so a missing column fails fast with its name
//! - **Streaming**: rows are parsed lazily; malformed rows surface as
//!   [`RowReadError`] without stopping the iterator
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use movielens_ingest::{LinkRecord, SourceReader};
//!
//! let reader = SourceReader::<LinkRecord>::open_in(Path::new("data"))?;
//! for row in reader.take(10) {
//!     let row = row?;
//!     println!("{}: {:?}", row.index, row.record.imdb_id);
//! }
//! ```

mod error;
mod header;
mod reader;
mod records;

// === Error Types ===
pub use error::{IngestError, Result, RowReadError, RowReadErrorKind};

// === CSV Reading ===
pub use header::{ColumnMap, NA_TOKENS, cell_value, is_na};
pub use reader::{SourceReader, SourceRow};

// === Records ===
pub use records::{LinkRecord, MovieRecord, RatingRecord, SourceRecord};
