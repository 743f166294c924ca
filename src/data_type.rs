use std::{fmt, str::FromStr};

use crate::error::Error;

/// Represents the supported column types of a table.
/// The tag decides which typed segment implementation backs a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A 32-bit signed integer.
    Int,
    /// A 64-bit signed integer.
    Long,
    /// A 32-bit floating-point number.
    Float,
    /// A 64-bit floating-point number.
    Double,
    /// A variable-length UTF-8 character string.
    String,
}

impl DataType {
    /// Every supported type, in declaration order.
    pub const ALL: [DataType; 5] = [
        DataType::Int,
        DataType::Long,
        DataType::Float,
        DataType::Double,
        DataType::String,
    ];

    /// The lowercase type name used by `add_column` and the command line.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|data_type| data_type.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownDataType(s.to_string()))
    }
}

/// Runs `$body` with `$T` bound to the Rust type stored in columns of `$data_type`.
///
/// This is the single place where a runtime [DataType] tag becomes a compile-time type, so
/// everything inside `$body` is monomorphized once per column type.
///
/// ```
/// use chunkdb::{ColumnType, DataType, resolve_column_type};
///
/// let name = resolve_column_type!(DataType::Long, |T| <T as ColumnType>::DATA_TYPE.name());
/// assert_eq!(name, "long");
/// ```
#[macro_export]
macro_rules! resolve_column_type {
    ($data_type:expr, |$T:ident| $body:expr) => {
        match $data_type {
            $crate::DataType::Int => {
                type $T = i32;
                $body
            }
            $crate::DataType::Long => {
                type $T = i64;
                $body
            }
            $crate::DataType::Float => {
                type $T = f32;
                $body
            }
            $crate::DataType::Double => {
                type $T = f64;
                $body
            }
            $crate::DataType::String => {
                type $T = ::std::sync::Arc<str>;
                $body
            }
        }
    };
}
