//! Streaming reader that yields typed records from a CSV source.

use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecordsIntoIter};
use tracing::debug;

use crate::error::{IngestError, Result, RowReadError, RowReadErrorKind};
use crate::header::ColumnMap;
use crate::records::SourceRecord;

/// A successfully read data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow<T> {
    /// Zero-based data row index (header excluded).
    pub index: usize,
    pub record: T,
}

/// Iterator over the rows of one CSV source.
///
/// The header is validated when the reader is opened; rows are parsed lazily
/// so arbitrarily large files are streamed rather than loaded up front.
pub struct SourceReader<T> {
    path: PathBuf,
    records: StringRecordsIntoIter<File>,
    columns: ColumnMap,
    next_index: usize,
    _record: PhantomData<T>,
}

impl<T: SourceRecord> SourceReader<T> {
    /// Open `path` and check that every column `T` needs is present.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|error| IngestError::from_io(path, error))?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader
            .headers()
            .map_err(|error| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?
            .clone();
        let columns =
            ColumnMap::resolve(&headers, T::COLUMNS).map_err(|column| IngestError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })?;
        debug!(
            path = %path.display(),
            header_count = headers.len(),
            "opened csv source"
        );
        Ok(Self {
            path: path.to_path_buf(),
            records: reader.into_records(),
            columns,
            next_index: 0,
            _record: PhantomData,
        })
    }

    /// Open `T::FILE_NAME` inside `data_dir`.
    pub fn open_in(data_dir: &Path) -> Result<Self> {
        Self::open(&data_dir.join(T::FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: SourceRecord> Iterator for SourceReader<T> {
    type Item = std::result::Result<SourceRow<T>, RowReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        let index = self.next_index;
        self.next_index += 1;
        let row = result
            .map_err(|error| RowReadError {
                index,
                kind: RowReadErrorKind::Malformed(error.to_string()),
            })
            .and_then(|record| {
                self.columns
                    .extract(&record)
                    .map_err(|column| RowReadError {
                        index,
                        kind: RowReadErrorKind::MissingField(column),
                    })
            })
            .map(|cells| SourceRow {
                index,
                record: T::from_cells(cells),
            });
        Some(row)
    }
}
