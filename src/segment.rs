use std::sync::Arc;

use crate::{
    column_type::ColumnType,
    data_type::DataType,
    dictionary_segment::DictionarySegment,
    error::{Error, Result},
    reference_segment::ReferenceSegment,
    resolve_column_type,
    value::Value,
    value_segment::ValueSegment,
};

macro_rules! typed_segment_enum {
    ($(#[$meta:meta])* $name:ident, $inner:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub enum $name {
            Int($inner<i32>),
            Long($inner<i64>),
            Float($inner<f32>),
            Double($inner<f64>),
            String($inner<Arc<str>>),
        }

        impl $name {
            pub fn data_type(&self) -> DataType {
                match self {
                    Self::Int(_) => DataType::Int,
                    Self::Long(_) => DataType::Long,
                    Self::Float(_) => DataType::Float,
                    Self::Double(_) => DataType::Double,
                    Self::String(_) => DataType::String,
                }
            }
        }
    };
}

/// Evaluates `$body` with `$segment` bound to the typed segment inside any variant of `$enum`.
macro_rules! with_typed_segment {
    ($value:expr, $enum:ident, |$segment:ident| $body:expr) => {
        match $value {
            $enum::Int($segment) => $body,
            $enum::Long($segment) => $body,
            $enum::Float($segment) => $body,
            $enum::Double($segment) => $body,
            $enum::String($segment) => $body,
        }
    };
}

typed_segment_enum!(
    /// A [ValueSegment] of any column type.
    AnyValueSegment,
    ValueSegment
);

typed_segment_enum!(
    /// A [DictionarySegment] of any column type.
    AnyDictionarySegment,
    DictionarySegment
);

impl AnyValueSegment {
    /// Creates an empty segment for columns of `data_type`.
    pub fn new(data_type: DataType) -> Self {
        resolve_column_type!(data_type, |T| T::wrap_value_segment(ValueSegment::<T>::new()))
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        with_typed_segment!(self, AnyValueSegment, |segment| segment.truncate(len))
    }

    /// Builds the dictionary-encoded equivalent of this segment.
    pub fn encode(&self) -> Result<AnyDictionarySegment> {
        with_typed_segment!(self, AnyValueSegment, |segment| {
            DictionarySegment::from_value_segment(segment).map(ColumnType::wrap_dictionary_segment)
        })
    }
}

/// One column's worth of data for exactly one chunk.
///
/// The set of representations is closed; scans match on it instead of probing types.
#[derive(Debug, Clone)]
pub enum Segment {
    Value(AnyValueSegment),
    Dictionary(AnyDictionarySegment),
    Reference(ReferenceSegment),
}

impl Segment {
    /// Creates an empty, appendable segment for columns of `data_type`.
    pub fn new_value(data_type: DataType) -> Self {
        Segment::Value(AnyValueSegment::new(data_type))
    }

    /// Returns the number of rows in the segment.
    pub fn size(&self) -> usize {
        match self {
            Segment::Value(segment) => with_typed_segment!(segment, AnyValueSegment, |s| s.size()),
            Segment::Dictionary(segment) => {
                with_typed_segment!(segment, AnyDictionarySegment, |s| s.size())
            }
            Segment::Reference(segment) => segment.size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the value at `offset`. Convenient, but far too slow for operators.
    pub fn get(&self, offset: usize) -> Result<Value> {
        match self {
            Segment::Value(segment) => {
                with_typed_segment!(segment, AnyValueSegment, |s| s.get(offset))
            }
            Segment::Dictionary(segment) => {
                with_typed_segment!(segment, AnyDictionarySegment, |s| s.get(offset))
            }
            Segment::Reference(segment) => segment.get(offset),
        }
    }

    /// Appends one value, cast to the segment's type.
    ///
    /// # Errors
    /// Fails with [Error::ImmutableSegment] for dictionary and reference segments and with
    /// [Error::TypeMismatch] if the value cannot be cast.
    pub fn append(&mut self, value: &Value) -> Result<()> {
        match self {
            Segment::Value(segment) => {
                with_typed_segment!(segment, AnyValueSegment, |s| s.append(value))
            }
            Segment::Dictionary(segment) => {
                with_typed_segment!(segment, AnyDictionarySegment, |s| s.append(value))
            }
            Segment::Reference(segment) => segment.append(value),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            Segment::Value(segment) => {
                with_typed_segment!(segment, AnyValueSegment, |s| s.estimate_memory_usage())
            }
            Segment::Dictionary(segment) => {
                with_typed_segment!(segment, AnyDictionarySegment, |s| s
                    .estimate_memory_usage())
            }
            Segment::Reference(segment) => segment.estimate_memory_usage(),
        }
    }

    pub fn estimate_memory_usage_per_element(&self) -> usize {
        match self {
            Segment::Value(segment) => with_typed_segment!(segment, AnyValueSegment, |s| s
                .estimate_memory_usage_per_element()),
            Segment::Dictionary(segment) => with_typed_segment!(segment, AnyDictionarySegment, |s| s
                .estimate_memory_usage_per_element()),
            Segment::Reference(segment) => segment.estimate_memory_usage_per_element(),
        }
    }

    /// Returns the dictionary-encoded version of this segment.
    ///
    /// Already encoded segments are returned as they are (their buffers are shared).
    ///
    /// # Errors
    /// Reference segments have no data to encode and fail with [Error::TypeMismatch].
    pub fn to_dictionary(&self) -> Result<Segment> {
        match self {
            Segment::Value(segment) => segment.encode().map(Segment::Dictionary),
            Segment::Dictionary(segment) => Ok(Segment::Dictionary(segment.clone())),
            Segment::Reference(_) => Err(Error::TypeMismatch(
                "reference segments cannot be dictionary-encoded".into(),
            )),
        }
    }

    /// Short name of the representation, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Value(_) => "value",
            Segment::Dictionary(_) => "dictionary",
            Segment::Reference(_) => "reference",
        }
    }
}
