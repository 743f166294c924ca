use crate::{
    error::{Error, Result},
    segment::Segment,
    types::ColumnId,
    value::Value,
};

/// A horizontal slice of a table holding one [Segment] per column.
///
/// All segments of a chunk have the same number of rows.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    segments: Vec<Segment>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment as the next column of the chunk.
    ///
    /// # Errors
    /// Returns [Error::SegmentSizeMismatch] if the segment's row count differs from the chunk's.
    pub fn add_segment(&mut self, segment: Segment) -> Result<()> {
        if let Some(first) = self.segments.first() {
            if first.size() != segment.size() {
                return Err(Error::SegmentSizeMismatch {
                    expected: first.size(),
                    actual: segment.size(),
                });
            }
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Appends one row, one value per segment.
    ///
    /// # Errors
    /// Returns an error if the row size does not match the column count, or if a segment rejects
    /// its value. A failed append is rolled back, leaving the chunk unchanged.
    pub fn append(&mut self, values: &[Value]) -> Result<()> {
        if values.len() != self.segments.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.segments.len(),
                actual: values.len(),
            });
        }
        if let Some(segment) = self.segments.iter().find(|s| !matches!(s, Segment::Value(_))) {
            return Err(Error::ImmutableSegment(segment.kind()));
        }

        let size = self.size();
        for (segment, value) in self.segments.iter_mut().zip(values) {
            if let Err(err) = segment.append(value) {
                self.truncate_value_segments(size);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Drops rows past `size` added by a partially applied append.
    fn truncate_value_segments(&mut self, size: usize) {
        for segment in &mut self.segments {
            if let Segment::Value(values) = segment {
                values.truncate(size);
            }
        }
    }

    pub fn get_segment(&self, column_id: ColumnId) -> Result<&Segment> {
        self.segments
            .get(column_id.index())
            .ok_or(Error::ColumnOutOfRange {
                column_id,
                column_count: self.column_count(),
            })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn column_count(&self) -> u16 {
        self.segments.len() as u16
    }

    /// Number of rows, taken from the first segment.
    pub fn size(&self) -> usize {
        self.segments.first().map_or(0, Segment::size)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Materializes the row at `offset`.
    pub fn get_row(&self, offset: usize) -> Result<Vec<Value>> {
        self.segments
            .iter()
            .map(|segment| segment.get(offset))
            .collect()
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.segments.iter().map(Segment::estimate_memory_usage).sum()
    }
}
