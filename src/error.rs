use thiserror::Error;

use crate::types::{ChunkId, ColumnId};

/// Every failure the storage engine and its operators can report.
///
/// None of these are retried internally: the operation that raised the error is
/// aborted and nothing partial is published.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No table is registered under this name.
    #[error("table {0:?} does not exist")]
    TableNotFound(String),

    /// No column with this name exists in the table.
    #[error("column {0:?} does not exist")]
    ColumnNotFound(String),

    #[error("chunk {chunk_id} is out of range (table has {chunk_count} chunks)")]
    ChunkOutOfRange { chunk_id: ChunkId, chunk_count: u32 },

    #[error("column {column_id} is out of range (table has {column_count} columns)")]
    ColumnOutOfRange {
        column_id: ColumnId,
        column_count: u16,
    },

    #[error("offset {offset} is out of range (segment has {size} rows)")]
    OffsetOutOfRange { offset: usize, size: usize },

    #[error("table {0:?} already exists")]
    DuplicateTable(String),

    #[error("column {0:?} already exists")]
    DuplicateColumn(String),

    /// Columns can only be added while the table holds no rows.
    #[error("columns may only be added to an empty table")]
    TableNotEmpty,

    /// Dictionary and reference segments never change after construction.
    #[error("{0} segments are immutable")]
    ImmutableSegment(&'static str),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("unsupported scan type {0:?}")]
    UnsupportedScanType(String),

    #[error("unknown data type {0:?}")]
    UnknownDataType(String),

    /// The dictionary would need more entries than a 32 bit value id can address.
    #[error("a dictionary cannot hold {distinct_values} distinct values")]
    CapacityOverflow { distinct_values: usize },

    /// Every segment of a chunk must hold the same number of rows.
    #[error("segment has {actual} rows but the chunk has {expected}")]
    SegmentSizeMismatch { expected: usize, actual: usize },

    #[error("row has {actual} values but the table has {expected} columns")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operator {0} was already executed")]
    AlreadyExecuted(&'static str),

    #[error("operator {0} has not been executed yet")]
    NotExecuted(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
