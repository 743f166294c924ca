use std::fmt;

macro_rules! strong_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub $inner);

        impl $name {
            /// Returns the id as a `usize` suitable for indexing.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

strong_id!(
    /// Position of a chunk inside a table.
    ChunkId(u32)
);
strong_id!(
    /// Position of a column inside a table's schema.
    ColumnId(u16)
);
strong_id!(
    /// Index into the dictionary of a dictionary segment.
    ValueId(u32)
);

/// Row position inside one chunk.
pub type ChunkOffset = u32;

/// Returned by dictionary lookups when no entry satisfies the bound.
pub const INVALID_VALUE_ID: ValueId = ValueId(u32::MAX);

/// Identifies one row of one chunk of a specific table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    pub fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        Self {
            chunk_id,
            chunk_offset,
        }
    }
}

/// Selected rows in scan order. Shared behind an `Arc` once a scan publishes it.
pub type PosList = Vec<RowId>;
