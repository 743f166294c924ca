use std::sync::Arc;

use crate::{
    error::{Error, Result},
    table::Table,
    types::{ColumnId, PosList},
    value::Value,
};

/// A column of a scan result: positions into a column of another table, without data of its own.
///
/// All reference segments of one result chunk share the same [PosList] and referenced table, so
/// together they describe one coherent set of rows.
#[derive(Debug, Clone)]
pub struct ReferenceSegment {
    referenced_table: Arc<Table>,
    referenced_column_id: ColumnId,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    pub fn new(
        referenced_table: Arc<Table>,
        referenced_column_id: ColumnId,
        pos_list: Arc<PosList>,
    ) -> Self {
        Self {
            referenced_table,
            referenced_column_id,
            pos_list,
        }
    }

    /// Returns the referenced value for position `offset` of this segment
    /// (not row `offset` of the referenced table).
    pub fn get(&self, offset: usize) -> Result<Value> {
        let row_id = self.pos_list.get(offset).ok_or(Error::OffsetOutOfRange {
            offset,
            size: self.pos_list.len(),
        })?;
        self.referenced_table
            .get_chunk(row_id.chunk_id)?
            .get_segment(self.referenced_column_id)?
            .get(row_id.chunk_offset as usize)
    }

    /// Reference segments cannot be appended to.
    pub fn append(&mut self, _value: &Value) -> Result<()> {
        Err(Error::ImmutableSegment("reference"))
    }

    /// Number of referenced rows; may exceed the table's chunk size.
    pub fn size(&self) -> usize {
        self.pos_list.len()
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.referenced_column_id
    }

    /// Estimates the size of the column once materialized, not of the positions themselves.
    pub fn estimate_memory_usage(&self) -> usize {
        if self.pos_list.is_empty() {
            return 0;
        }
        self.pos_list.len() * self.estimate_memory_usage_per_element()
    }

    /// Per-row estimate taken from the referenced column's first chunk.
    pub fn estimate_memory_usage_per_element(&self) -> usize {
        self.referenced_table
            .chunks()
            .first()
            .and_then(|chunk| chunk.get_segment(self.referenced_column_id).ok())
            .map_or(0, |segment| segment.estimate_memory_usage_per_element())
    }
}
