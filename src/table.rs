use std::collections::HashMap;

use crate::{
    chunk::Chunk,
    data_type::DataType,
    error::{Error, Result},
    segment::Segment,
    types::{ChunkId, ChunkOffset, ColumnId, RowId},
    value::Value,
};

/// Chunk size used by [Table::default]: large enough that a table never splits.
pub const DEFAULT_MAX_CHUNK_SIZE: ChunkOffset = ChunkOffset::MAX;

/// Column definition in the schema
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
}

/// An append-only sequence of [Chunk]s sharing one schema.
///
/// Every chunk but the last holds exactly `max_chunk_size` rows. The schema is fixed before the
/// first row is appended; afterwards the only way to rewrite data is to replace a whole chunk
/// with [Table::compress_chunk].
#[derive(Debug, Clone)]
pub struct Table {
    max_chunk_size: ChunkOffset,
    chunks: Vec<Chunk>,
    columns: Vec<ColumnDef>,
    column_ids: HashMap<String, ColumnId>,
}

impl Default for Table {
    fn default() -> Self {
        Self::with_max_chunk_size(DEFAULT_MAX_CHUNK_SIZE)
    }
}

impl Table {
    /// Creates an empty table whose chunks hold at most `max_chunk_size` rows.
    ///
    /// # Errors
    /// A chunk size of zero is rejected.
    pub fn new(max_chunk_size: ChunkOffset) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(Error::InvalidArgument(
                "the maximum chunk size must be positive".into(),
            ));
        }
        Ok(Self::with_max_chunk_size(max_chunk_size))
    }

    fn with_max_chunk_size(max_chunk_size: ChunkOffset) -> Self {
        Self {
            max_chunk_size,
            chunks: vec![Chunk::new()],
            columns: Vec::new(),
            column_ids: HashMap::new(),
        }
    }

    /// Adds a column to a table that has no rows yet.
    ///
    /// # Errors
    /// Returns an error if the table already holds rows or if the name is taken.
    ///
    /// # Example
    /// ```
    /// use chunkdb::{DataType, Table, Value};
    ///
    /// let mut table = Table::new(2).unwrap();
    /// table.add_column("id", DataType::Int).unwrap();
    /// table.add_column("name", DataType::String).unwrap();
    /// table.append(&[Value::Int(1), Value::from("a")]).unwrap();
    ///
    /// assert!(table.add_column("age", DataType::Int).is_err());
    /// ```
    pub fn add_column(&mut self, name: &str, data_type: DataType) -> Result<()> {
        if !self.is_empty() {
            return Err(Error::TableNotEmpty);
        }
        self.add_column_definition(name, data_type)?;
        for chunk in &mut self.chunks {
            chunk.add_segment(Segment::new_value(data_type))?;
        }
        Ok(())
    }

    /// Registers a column in the schema without creating segments for it.
    /// Used when the chunks are assembled separately, as for scan results.
    pub fn add_column_definition(&mut self, name: &str, data_type: DataType) -> Result<()> {
        if self.column_ids.contains_key(name) {
            return Err(Error::DuplicateColumn(name.to_string()));
        }
        let column_id = u16::try_from(self.columns.len())
            .map(ColumnId)
            .map_err(|_| Error::InvalidArgument("too many columns".into()))?;
        self.column_ids.insert(name.to_string(), column_id);
        self.columns.push(ColumnDef {
            name: name.to_string(),
            data_type,
        });
        Ok(())
    }

    /// Appends one row; each value is cast to its column's type.
    ///
    /// A new chunk is started once the last one is full.
    pub fn append(&mut self, values: &[Value]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        if self.is_new_chunk_needed() {
            let mut chunk = Chunk::new();
            for column in &self.columns {
                chunk.add_segment(Segment::new_value(column.data_type))?;
            }
            self.chunks.push(chunk);
        }
        self.last_chunk_mut().append(values)
    }

    fn is_new_chunk_needed(&self) -> bool {
        self.chunks
            .last()
            .is_none_or(|chunk| chunk.size() >= self.max_chunk_size as usize)
    }

    fn last_chunk_mut(&mut self) -> &mut Chunk {
        if self.chunks.is_empty() {
            self.chunks.push(Chunk::new());
        }
        let last = self.chunks.len() - 1;
        &mut self.chunks[last]
    }

    /// Installs `chunk` as the table's next chunk, replacing the initial chunk while it is empty.
    pub fn emplace_chunk(&mut self, chunk: Chunk) {
        if self.chunks.len() == 1 && self.chunks[0].size() == 0 {
            self.chunks[0] = chunk;
        } else {
            self.chunks.push(chunk);
        }
    }

    pub fn column_count(&self) -> u16 {
        self.columns.len() as u16
    }

    /// Number of rows over all chunks.
    pub fn row_count(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.size() as u64).sum()
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunks.len() as u32
    }

    pub fn max_chunk_size(&self) -> ChunkOffset {
        self.max_chunk_size
    }

    /// True while the table holds a single chunk without rows.
    pub fn is_empty(&self) -> bool {
        self.chunks.len() == 1 && self.chunks[0].size() == 0
    }

    pub fn column_id_by_name(&self, name: &str) -> Result<ColumnId> {
        self.column_ids
            .get(name)
            .copied()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    fn column(&self, column_id: ColumnId) -> Result<&ColumnDef> {
        self.columns
            .get(column_id.index())
            .ok_or(Error::ColumnOutOfRange {
                column_id,
                column_count: self.column_count(),
            })
    }

    pub fn column_name(&self, column_id: ColumnId) -> Result<&str> {
        self.column(column_id).map(|c| c.name.as_str())
    }

    pub fn column_type(&self, column_id: ColumnId) -> Result<DataType> {
        self.column(column_id).map(|c| c.data_type)
    }

    pub fn get_chunk(&self, chunk_id: ChunkId) -> Result<&Chunk> {
        self.chunks
            .get(chunk_id.index())
            .ok_or(Error::ChunkOutOfRange {
                chunk_id,
                chunk_count: self.chunk_count(),
            })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Materializes the row identified by `row_id`.
    pub fn get_row(&self, row_id: RowId) -> Result<Vec<Value>> {
        self.get_chunk(row_id.chunk_id)?
            .get_row(row_id.chunk_offset as usize)
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.chunks.iter().map(Chunk::estimate_memory_usage).sum()
    }

    /// Replaces every segment of chunk `chunk_id` by its dictionary-encoded equivalent.
    ///
    /// The columns are encoded concurrently, one task per column; the new chunk is installed
    /// only after every task has finished. Scans must not run over the chunk meanwhile, which
    /// the `&mut self` receiver enforces.
    ///
    /// # Errors
    /// Fails if the chunk does not exist or holds reference segments.
    pub fn compress_chunk(&mut self, chunk_id: ChunkId) -> Result<()> {
        let chunk = self.get_chunk(chunk_id)?;
        let segments = chunk.segments();

        let mut encoded: Vec<Option<Result<Segment>>> = Vec::with_capacity(segments.len());
        encoded.resize_with(segments.len(), || None);
        rayon::scope(|scope| {
            for (slot, segment) in encoded.iter_mut().zip(segments) {
                scope.spawn(move |_| *slot = Some(segment.to_dictionary()));
            }
        });

        let mut compressed = Chunk::new();
        for segment in encoded.into_iter().flatten() {
            compressed.add_segment(segment?)?;
        }
        debug_assert_eq!(compressed.column_count(), chunk.column_count());

        let before = chunk.estimate_memory_usage();
        let after = compressed.estimate_memory_usage();
        tracing::debug!(
            chunk_id = %chunk_id,
            columns = compressed.column_count(),
            bytes_before = before,
            bytes_after = after,
            "compressed chunk"
        );

        self.chunks[chunk_id.index()] = compressed;
        Ok(())
    }
}
