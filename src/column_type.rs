use std::{cmp::Ordering, fmt, sync::Arc};

use allocative::Allocative;

use crate::{
    data_type::DataType,
    dictionary_segment::DictionarySegment,
    error::{Error, Result},
    segment::{AnyDictionarySegment, AnyValueSegment},
    value::Value,
    value_segment::ValueSegment,
};

/// A Rust type that can back a column.
///
/// There is exactly one implementation per [DataType]; [resolve_column_type!](crate::resolve_column_type)
/// maps the runtime tag to it. Besides casting values in and out of the [Value] boundary, the
/// trait provides the typed views onto the type-erased segment enums so that generic code never
/// has to match on the column type itself.
pub trait ColumnType:
    Clone + PartialEq + PartialOrd + fmt::Debug + Send + Sync + Allocative + 'static
{
    /// The tag of columns storing this type.
    const DATA_TYPE: DataType;

    /// Casts a dynamically typed value to this type.
    ///
    /// # Errors
    /// Returns [Error::TypeMismatch] if the value cannot be represented without loss
    /// (out-of-range integers, fractional floats into integers, unparsable strings).
    fn from_value(value: &Value) -> Result<Self>;

    fn into_value(self) -> Value;

    /// A total order over [normalized](ColumnType::normalize) values. It agrees with
    /// `PartialOrd` on every pair that `PartialOrd` orders. Dictionaries are sorted and searched
    /// with it.
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Canonical form of a value as stored in a dictionary.
    ///
    /// Floats fold `-0.0` into `0.0` and every NaN into one positive NaN, so values equal under
    /// `PartialEq` share one entry and NaN sorts after everything else.
    fn normalize(self) -> Self {
        self
    }

    /// True for values `PartialOrd` does not order against anything (NaN).
    fn is_unordered(&self) -> bool {
        false
    }

    fn value_segment(segment: &AnyValueSegment) -> Option<&ValueSegment<Self>>;

    fn dictionary_segment(segment: &AnyDictionarySegment) -> Option<&DictionarySegment<Self>>;

    fn wrap_value_segment(segment: ValueSegment<Self>) -> AnyValueSegment;

    fn wrap_dictionary_segment(segment: DictionarySegment<Self>) -> AnyDictionarySegment;
}

fn cast_error(value: &Value, target: DataType) -> Error {
    Error::TypeMismatch(format!("cannot cast {value:?} to {target}"))
}

/// Converts a float to an integer type only when it is integral and in range.
fn integral<I: TryFrom<i64>>(value: f64) -> Option<I> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    // i64::MAX is not representable, 2^63 is the first float past the range.
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    I::try_from(value as i64).ok()
}

macro_rules! segment_casts {
    ($variant:ident) => {
        fn value_segment(segment: &AnyValueSegment) -> Option<&ValueSegment<Self>> {
            match segment {
                AnyValueSegment::$variant(segment) => Some(segment),
                _ => None,
            }
        }

        fn dictionary_segment(segment: &AnyDictionarySegment) -> Option<&DictionarySegment<Self>> {
            match segment {
                AnyDictionarySegment::$variant(segment) => Some(segment),
                _ => None,
            }
        }

        fn wrap_value_segment(segment: ValueSegment<Self>) -> AnyValueSegment {
            AnyValueSegment::$variant(segment)
        }

        fn wrap_dictionary_segment(segment: DictionarySegment<Self>) -> AnyDictionarySegment {
            AnyDictionarySegment::$variant(segment)
        }
    };
}

macro_rules! integer_column_type {
    ($ty:ty, $variant:ident) => {
        impl ColumnType for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn from_value(value: &Value) -> Result<Self> {
                let cast = match value {
                    Value::Int(i) => <$ty>::try_from(*i).ok(),
                    Value::Long(l) => <$ty>::try_from(*l).ok(),
                    Value::Float(f) => integral(f64::from(*f)),
                    Value::Double(d) => integral(*d),
                    Value::String(s) => s.trim().parse::<$ty>().ok(),
                };
                cast.ok_or_else(|| cast_error(value, Self::DATA_TYPE))
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn total_cmp(&self, other: &Self) -> Ordering {
                Ord::cmp(self, other)
            }

            segment_casts!($variant);
        }
    };
}

macro_rules! float_column_type {
    ($ty:ty, $variant:ident) => {
        impl ColumnType for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn from_value(value: &Value) -> Result<Self> {
                let cast = match value {
                    Value::Int(i) => Some(*i as $ty),
                    Value::Long(l) => Some(*l as $ty),
                    Value::Float(f) => Some(*f as $ty),
                    Value::Double(d) => Some(*d as $ty),
                    Value::String(s) => s.trim().parse::<$ty>().ok(),
                };
                cast.ok_or_else(|| cast_error(value, Self::DATA_TYPE))
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn total_cmp(&self, other: &Self) -> Ordering {
                <$ty>::total_cmp(self, other)
            }

            fn normalize(self) -> Self {
                if self.is_nan() {
                    <$ty>::NAN
                } else if self == 0.0 {
                    0.0
                } else {
                    self
                }
            }

            fn is_unordered(&self) -> bool {
                self.is_nan()
            }

            segment_casts!($variant);
        }
    };
}

integer_column_type!(i32, Int);
integer_column_type!(i64, Long);
float_column_type!(f32, Float);
float_column_type!(f64, Double);

impl ColumnType for Arc<str> {
    const DATA_TYPE: DataType = DataType::String;

    fn from_value(value: &Value) -> Result<Self> {
        Ok(match value {
            Value::String(s) => Arc::clone(s),
            other => Arc::from(other.to_string()),
        })
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(self, other)
    }

    segment_casts!(String);
}
