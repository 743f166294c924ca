use std::{cmp::Ordering, sync::Arc};

use crate::{
    attribute_vector::{AttributeVector, AttributeWidth},
    column_type::ColumnType,
    error::{Error, Result},
    types::{INVALID_VALUE_ID, ValueId},
    value::Value,
    value_segment::ValueSegment,
};

/// Dictionary-encoded storage of one column within one chunk.
///
/// The dictionary holds every distinct value exactly once, sorted ascending; the attribute vector
/// stores the dictionary position of each row. Value to id lookups are binary searches and id to
/// value lookups are plain indexing. The segment is immutable once built.
#[derive(Debug, Clone)]
pub struct DictionarySegment<T: ColumnType> {
    dictionary: Arc<Vec<T>>,
    attribute_vector: Arc<AttributeVector>,
}

impl<T: ColumnType> DictionarySegment<T> {
    /// Encodes the rows of `segment`.
    ///
    /// # Errors
    /// Returns [Error::CapacityOverflow] if the segment holds more distinct values than a
    /// 32 bit value id can address.
    ///
    /// # Example
    /// ```
    /// # use chunkdb::{DictionarySegment, ValueId, ValueSegment};
    /// let values: ValueSegment<i32> = [30, 10, 30, 20].into_iter().collect();
    /// let segment = DictionarySegment::from_value_segment(&values).unwrap();
    ///
    /// assert_eq!(segment.dictionary(), &[10, 20, 30]);
    /// assert_eq!(segment.attribute_vector().get(0), Some(ValueId(2)));
    /// assert_eq!(segment.lower_bound(&25), ValueId(2));
    /// ```
    pub fn from_value_segment(segment: &ValueSegment<T>) -> Result<Self> {
        Self::from_values(segment.values())
    }

    /// Encodes `values`. Entries are stored [normalized](ColumnType::normalize), so a `-0.0`
    /// row reads back as `0.0`.
    pub fn from_values(values: &[T]) -> Result<Self> {
        let normalized: Vec<T> = values.iter().cloned().map(T::normalize).collect();
        let mut dictionary = normalized.clone();
        dictionary.sort_unstable_by(T::total_cmp);
        dictionary.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
        dictionary.shrink_to_fit();

        let width = AttributeWidth::for_dictionary_len(dictionary.len())?;
        let mut attribute_vector = AttributeVector::with_capacity(width, values.len());
        for value in &normalized {
            let position = dictionary.partition_point(|entry| entry.total_cmp(value) == Ordering::Less);
            attribute_vector.push(ValueId(position as u32));
        }

        Ok(Self {
            dictionary: Arc::new(dictionary),
            attribute_vector: Arc::new(attribute_vector),
        })
    }

    /// Returns the value of row `offset` as a [Value].
    pub fn get(&self, offset: usize) -> Result<Value> {
        self.get_typed(offset).cloned().map(T::into_value)
    }

    /// Returns the typed value of row `offset`.
    pub fn get_typed(&self, offset: usize) -> Result<&T> {
        let value_id = self
            .attribute_vector
            .get(offset)
            .ok_or(Error::OffsetOutOfRange {
                offset,
                size: self.size(),
            })?;
        self.value_by_value_id(value_id)
    }

    /// Dictionary segments cannot be appended to.
    pub fn append(&mut self, _value: &Value) -> Result<()> {
        Err(Error::ImmutableSegment("dictionary"))
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &AttributeVector {
        &self.attribute_vector
    }

    /// Returns the value represented by `value_id`.
    pub fn value_by_value_id(&self, value_id: ValueId) -> Result<&T> {
        self.dictionary
            .get(value_id.index())
            .ok_or(Error::OffsetOutOfRange {
                offset: value_id.index(),
                size: self.dictionary.len(),
            })
    }

    /// Returns the first value id whose value is `>= value`,
    /// or [INVALID_VALUE_ID] if every entry is smaller.
    pub fn lower_bound(&self, value: &T) -> ValueId {
        let value = value.clone().normalize();
        let position = self
            .dictionary
            .partition_point(|entry| entry.total_cmp(&value) == Ordering::Less);
        self.to_value_id(position)
    }

    /// Returns the first value id whose value is `> value`,
    /// or [INVALID_VALUE_ID] if every entry is smaller or equal.
    pub fn upper_bound(&self, value: &T) -> ValueId {
        let value = value.clone().normalize();
        let position = self
            .dictionary
            .partition_point(|entry| entry.total_cmp(&value) != Ordering::Greater);
        self.to_value_id(position)
    }

    /// [lower_bound](Self::lower_bound) for a dynamically typed value.
    pub fn lower_bound_value(&self, value: &Value) -> Result<ValueId> {
        Ok(self.lower_bound(&T::from_value(value)?))
    }

    /// [upper_bound](Self::upper_bound) for a dynamically typed value.
    pub fn upper_bound_value(&self, value: &Value) -> Result<ValueId> {
        Ok(self.upper_bound(&T::from_value(value)?))
    }

    fn to_value_id(&self, position: usize) -> ValueId {
        if position == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            ValueId(position as u32)
        }
    }

    /// Number of dictionary entries.
    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.attribute_vector.len()
    }

    /// Bytes of the dictionary buffer plus the attribute vector.
    pub fn estimate_memory_usage(&self) -> usize {
        allocative::size_of_unique_allocated_data(&*self.dictionary)
            + self.attribute_vector.estimate_memory_usage()
    }

    pub fn estimate_memory_usage_per_element(&self) -> usize {
        self.attribute_vector.width().bytes()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn encode<T: ColumnType>(values: Vec<T>) -> DictionarySegment<T> {
        let segment: ValueSegment<T> = values.into_iter().collect();
        DictionarySegment::from_value_segment(&segment).unwrap()
    }

    #[test]
    fn test_dictionary_is_sorted_and_unique() {
        let segment = encode::<Arc<str>>(
            ["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"]
                .into_iter()
                .map(Arc::from)
                .collect(),
        );

        let dictionary: Vec<&str> = segment.dictionary().iter().map(|s| &**s).collect();
        assert_eq!(dictionary, vec!["Alexander", "Bill", "Hasso", "Steve"]);
        assert_eq!(segment.unique_values_count(), 4);
        assert_eq!(segment.size(), 6);
        assert_eq!(segment.get(0), Ok(Value::from("Bill")));
        assert_eq!(segment.get(4), Ok(Value::from("Hasso")));
    }

    #[test]
    fn test_rows_resolve_through_dictionary() {
        let values = vec![5_i64, -3, 5, 12, 0, -3];
        let segment = encode(values.clone());

        for (offset, expected) in values.iter().enumerate() {
            let value_id = segment.attribute_vector().get(offset).unwrap();
            assert_eq!(segment.value_by_value_id(value_id), Ok(expected));
        }
    }

    #[test]
    fn test_lower_upper_bound() {
        let segment = encode(vec![0_i32, 2, 4, 6, 8, 10, 4, 2]);

        assert_eq!(segment.lower_bound(&4), ValueId(2));
        assert_eq!(segment.upper_bound(&4), ValueId(3));
        assert_eq!(segment.lower_bound(&5), ValueId(3));
        assert_eq!(segment.upper_bound(&5), ValueId(3));
        assert_eq!(segment.lower_bound(&-1), ValueId(0));
        assert_eq!(segment.upper_bound(&-1), ValueId(0));
        assert_eq!(segment.lower_bound(&10), ValueId(5));
        assert_eq!(segment.upper_bound(&10), INVALID_VALUE_ID);
        assert_eq!(segment.lower_bound(&15), INVALID_VALUE_ID);
        assert_eq!(segment.upper_bound(&15), INVALID_VALUE_ID);

        assert_eq!(segment.lower_bound_value(&Value::Long(6)), Ok(ValueId(3)));
        assert!(segment.lower_bound_value(&Value::from("six")).is_err());
    }

    #[test]
    fn test_dictionary_is_immutable() {
        let mut segment = encode(vec![1.5_f32, 2.5]);

        assert_eq!(
            segment.append(&Value::Float(3.5)),
            Err(Error::ImmutableSegment("dictionary"))
        );
        assert_eq!(segment.size(), 2);
    }

    #[test]
    fn test_width_follows_dictionary_size() {
        let small = encode((0..200_i32).collect());
        assert_eq!(small.attribute_vector().width(), AttributeWidth::U8);
        assert_eq!(small.estimate_memory_usage_per_element(), 1);

        let medium = encode((0..1_000_i32).collect());
        assert_eq!(medium.attribute_vector().width(), AttributeWidth::U16);

        let large = encode((0..70_000_i32).collect());
        assert_eq!(large.attribute_vector().width(), AttributeWidth::U32);
        assert_eq!(large.get(69_999), Ok(Value::Int(69_999)));
    }

    #[test]
    fn test_memory_usage() {
        let segment = encode(vec![7_i32; 100]);

        // one dictionary entry plus one byte per row
        assert_eq!(segment.estimate_memory_usage(), 4 + 100);
    }

    #[test]
    fn test_signed_zero_shares_one_entry() {
        let segment = encode(vec![-0.0_f64, 1.0, 0.0, f64::NAN, -f64::NAN]);

        assert_eq!(segment.unique_values_count(), 3);
        assert_eq!(segment.attribute_vector().get(0), segment.attribute_vector().get(2));
        assert_eq!(segment.get(0), Ok(Value::Double(0.0)));
        assert_eq!(segment.lower_bound(&-0.0), ValueId(0));
        assert_eq!(segment.upper_bound(&-0.0), ValueId(1));
        assert_eq!(segment.lower_bound(&f64::NAN), ValueId(2));
        assert!(segment.get_typed(3).unwrap().is_nan());
    }

    #[test]
    fn test_out_of_bounds() {
        let segment = encode(vec![1_i32]);

        assert!(segment.get(1).is_err());
        assert!(segment.value_by_value_id(INVALID_VALUE_ID).is_err());
    }

    #[test]
    fn test_empty_segment() {
        let segment = encode(Vec::<f64>::new());

        assert_eq!(segment.size(), 0);
        assert_eq!(segment.lower_bound(&1.0), INVALID_VALUE_ID);
    }
}
