//! Error type shared by all mapd-io parsers and writers.

use thiserror::Error;

/// Parse or write failure in any benchmark file format.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("missing header field `{0}` in map file")]
    MissingHeader(&'static str),

    #[error("invalid header value for {field}: {value}")]
    InvalidHeader { field: &'static str, value: String },

    #[error("map row {row} has {got} cells, expected {expected}")]
    RowWidthMismatch { row: u32, expected: u32, got: u32 },

    #[error("map has {got} rows, expected {expected}")]
    RowCountMismatch { expected: u32, got: u32 },

    #[error("scenario holds {got} usable entries, {requested} requested")]
    NotEnoughEntries { requested: usize, got: usize },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
