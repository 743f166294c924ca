use std::mem;

use crate::{
    column_type::ColumnType,
    error::{Error, Result},
    value::Value,
};

/// Unencoded storage of one column within one chunk.
///
/// Values are kept in a contiguous `Vec<T>`; this is the only segment kind that accepts appends.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSegment<T: ColumnType> {
    values: Vec<T>,
}

impl<T: ColumnType> Default for ValueSegment<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ColumnType> ValueSegment<T> {
    /// Creates a new, empty segment.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends a new value to the end of the segment.
    ///
    /// # Errors
    /// Returns an error if the value cannot be cast to the segment's type.
    ///
    /// # Example
    /// ```
    /// # use chunkdb::{Value, ValueSegment};
    /// let mut segment = ValueSegment::<i64>::new();
    /// segment.append(&Value::Long(30)).unwrap();
    /// segment.append(&Value::Int(12)).unwrap();
    ///
    /// assert_eq!(segment.size(), 2);
    /// assert_eq!(segment.get(1).unwrap(), Value::Long(12));
    /// assert!(segment.append(&Value::from("not a number")).is_err());
    /// ```
    pub fn append(&mut self, value: &Value) -> Result<()> {
        self.values.push(T::from_value(value)?);
        Ok(())
    }

    /// Appends an already typed value.
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    /// Returns the number of rows currently stored in the segment.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there is no row in the segment, else false.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Retrieves the value at `offset` as a [Value].
    ///
    /// # Errors
    /// Returns [Error::OffsetOutOfRange] if the offset is past the end of the segment.
    pub fn get(&self, offset: usize) -> Result<Value> {
        self.get_typed(offset).cloned().map(T::into_value)
    }

    /// Retrieves a reference to the typed value at `offset`.
    pub fn get_typed(&self, offset: usize) -> Result<&T> {
        self.values.get(offset).ok_or(Error::OffsetOutOfRange {
            offset,
            size: self.values.len(),
        })
    }

    /// All values in row order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Allocated bytes of the value buffer (string payloads are shared and not counted).
    pub fn estimate_memory_usage(&self) -> usize {
        allocative::size_of_unique_allocated_data(&self.values)
    }

    pub fn estimate_memory_usage_per_element(&self) -> usize {
        mem::size_of::<T>()
    }
}

impl<T: ColumnType> FromIterator<T> for ValueSegment<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Test 1 : Creation
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_segment_new() {
        let segment = ValueSegment::<i32>::new();

        assert_eq!(segment.size(), 0);
        assert!(segment.is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : Basic Append & Get
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_append_and_get() {
        let mut segment = ValueSegment::<i32>::new();

        segment.append(&Value::Int(42)).unwrap();

        assert_eq!(segment.size(), 1);
        assert_eq!(segment.get(0), Ok(Value::Int(42)));
        assert_eq!(segment.get_typed(0), Ok(&42));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : Values are cast to the segment type
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_append_casts() {
        let mut segment = ValueSegment::<f64>::new();
        segment.append(&Value::Int(3)).unwrap();
        segment.append(&Value::from("2.5")).unwrap();

        assert_eq!(segment.values(), &[3.0, 2.5]);

        let mut strings = ValueSegment::<Arc<str>>::new();
        strings.append(&Value::Long(9)).unwrap();
        assert_eq!(strings.get(0), Ok(Value::from("9")));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : Type mismatch
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_type_mismatch() {
        let mut segment = ValueSegment::<i32>::new();

        let result = segment.append(&Value::from("hello"));

        assert!(matches!(result, Err(Error::TypeMismatch(_))));
        assert_eq!(segment.size(), 0); // nothing appended
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : Out of bounds
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_out_of_bounds() {
        let segment = ValueSegment::<i64>::new();

        assert_eq!(
            segment.get(0),
            Err(Error::OffsetOutOfRange { offset: 0, size: 0 })
        );
        assert!(segment.get(100).is_err());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6: Large Segment
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_large_segment() {
        let segment: ValueSegment<i64> = (0..10_000).collect();

        assert_eq!(segment.size(), 10_000);
        assert_eq!(segment.get(5_000), Ok(Value::Long(5_000)));
        assert_eq!(segment.get(9_999), Ok(Value::Long(9_999)));
    }

    #[test]
    fn test_memory_usage() {
        let segment: ValueSegment<i32> = (0..100).collect();

        assert!(segment.estimate_memory_usage() >= 100 * mem::size_of::<i32>());
        assert_eq!(segment.estimate_memory_usage_per_element(), 4);
    }
}
