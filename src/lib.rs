//! In-memory, chunked, column-oriented table storage.
//!
//! Tables are split horizontally into [Chunk]s of a bounded number of rows; each chunk stores
//! one [Segment] per column. Segments start out as plain vectors, can be dictionary-encoded per
//! chunk, and scans produce lightweight reference segments pointing back into their input.

pub mod attribute_vector;
pub mod chunk;
pub mod column_type;
pub mod data_type;
pub mod dictionary_segment;
pub mod error;
pub mod operators;
pub mod reference_segment;
pub mod segment;
pub mod storage_manager;
pub mod table;
pub mod types;
pub mod value;
pub mod value_segment;

pub use attribute_vector::{AttributeVector, AttributeWidth};
pub use chunk::Chunk;
pub use column_type::ColumnType;
pub use data_type::DataType;
pub use dictionary_segment::DictionarySegment;
pub use error::{Error, Result};
pub use operators::{GetTable, Operator, ScanType, TableScan, TableWrapper};
pub use reference_segment::ReferenceSegment;
pub use segment::{AnyDictionarySegment, AnyValueSegment, Segment};
pub use storage_manager::StorageManager;
pub use table::{ColumnDef, DEFAULT_MAX_CHUNK_SIZE, Table};
pub use types::{ChunkId, ChunkOffset, ColumnId, INVALID_VALUE_ID, PosList, RowId, ValueId};
pub use value::Value;
pub use value_segment::ValueSegment;
