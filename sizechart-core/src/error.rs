//! Error types for chart editing operations.

use thiserror::Error;

/// Result type for chart operations.
pub type ChartResult<T> = Result<T, ChartError>;

/// Errors that can occur while editing a chart.
///
/// These are local validation failures: the operation does not proceed and
/// the caller reports the message inline.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Row index outside the table.
    #[error("Row {index} out of range (table has {len} rows)")]
    RowOutOfRange {
        /// Requested index.
        index: usize,
        /// Current row count.
        len: usize,
    },

    /// Column index outside the header list.
    #[error("Column {index} out of range (table has {len} columns)")]
    ColumnOutOfRange {
        /// Requested index.
        index: usize,
        /// Current column count.
        len: usize,
    },

    /// A header name that does not exist in the table.
    #[error("Unknown header: {0}")]
    UnknownHeader(String),

    /// A header rename would produce two columns with the same name.
    #[error("Duplicate header: {0}")]
    DuplicateHeader(String),

    /// A row reorder that is not a permutation of the current rows.
    #[error("Invalid row order: {0}")]
    InvalidPermutation(String),

    /// Note item index outside the notes block.
    #[error("Note item {index} out of range (block has {len} items)")]
    NoteOutOfRange {
        /// Requested index.
        index: usize,
        /// Current item count.
        len: usize,
    },

    /// Generic user-input validation failure.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Durable preset storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
