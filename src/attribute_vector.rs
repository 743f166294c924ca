use allocative::Allocative;

use crate::{
    error::{Error, Result},
    types::ValueId,
};

/// Bit-width of the value ids stored in an [AttributeVector].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeWidth {
    U8,
    U16,
    U32,
}

impl AttributeWidth {
    /// Picks the narrowest width able to index a dictionary of `dictionary_len` entries.
    ///
    /// The maximum of each width stays unused so that it can never collide with
    /// [INVALID_VALUE_ID](crate::types::INVALID_VALUE_ID) after narrowing.
    ///
    /// # Errors
    /// Returns [Error::CapacityOverflow] for dictionaries beyond `u32::MAX` entries.
    pub fn for_dictionary_len(dictionary_len: usize) -> Result<Self> {
        if dictionary_len <= u8::MAX as usize {
            Ok(Self::U8)
        } else if dictionary_len <= u16::MAX as usize {
            Ok(Self::U16)
        } else if dictionary_len <= u32::MAX as usize {
            Ok(Self::U32)
        } else {
            Err(Error::CapacityOverflow {
                distinct_values: dictionary_len,
            })
        }
    }

    /// Size of one entry in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    fn max_value_id(self) -> u32 {
        match self {
            Self::U8 => u8::MAX.into(),
            Self::U16 => u16::MAX.into(),
            Self::U32 => u32::MAX,
        }
    }
}

/// Per-row dictionary indices, stored with a width chosen once from the dictionary size.
#[derive(Debug, Clone, PartialEq, Eq, Allocative)]
pub enum AttributeVector {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl AttributeVector {
    pub fn with_capacity(width: AttributeWidth, rows: usize) -> Self {
        match width {
            AttributeWidth::U8 => Self::U8(Vec::with_capacity(rows)),
            AttributeWidth::U16 => Self::U16(Vec::with_capacity(rows)),
            AttributeWidth::U32 => Self::U32(Vec::with_capacity(rows)),
        }
    }

    pub fn width(&self) -> AttributeWidth {
        match self {
            Self::U8(_) => AttributeWidth::U8,
            Self::U16(_) => AttributeWidth::U16,
            Self::U32(_) => AttributeWidth::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U8(ids) => ids.len(),
            Self::U16(ids) => ids.len(),
            Self::U32(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value id stored for `offset`, or `None` if it is out of bounds.
    pub fn get(&self, offset: usize) -> Option<ValueId> {
        let id = match self {
            Self::U8(ids) => ids.get(offset).copied().map(u32::from),
            Self::U16(ids) => ids.get(offset).copied().map(u32::from),
            Self::U32(ids) => ids.get(offset).copied(),
        };
        id.map(ValueId)
    }

    /// Appends the id of the next row. The id must fit the vector's width.
    pub(crate) fn push(&mut self, value_id: ValueId) {
        debug_assert!(value_id.0 < self.width().max_value_id());
        match self {
            Self::U8(ids) => ids.push(value_id.0 as u8),
            Self::U16(ids) => ids.push(value_id.0 as u16),
            Self::U32(ids) => ids.push(value_id.0),
        }
    }

    /// Overwrites the id stored for `offset`.
    ///
    /// # Errors
    /// Fails if the offset is out of bounds or the id does not fit the width.
    pub fn set(&mut self, offset: usize, value_id: ValueId) -> Result<()> {
        let size = self.len();
        if offset >= size {
            return Err(Error::OffsetOutOfRange { offset, size });
        }
        if value_id.0 >= self.width().max_value_id() {
            return Err(Error::InvalidArgument(format!(
                "value id {value_id} does not fit a {} byte attribute vector",
                self.width().bytes()
            )));
        }
        match self {
            Self::U8(ids) => ids[offset] = value_id.0 as u8,
            Self::U16(ids) => ids[offset] = value_id.0 as u16,
            Self::U32(ids) => ids[offset] = value_id.0,
        }
        Ok(())
    }

    /// Calls `emit` with the offset of every row whose value id satisfies `keep`, in row order.
    pub fn select(&self, keep: impl FnMut(ValueId) -> bool, emit: impl FnMut(usize)) {
        match self {
            Self::U8(ids) => select_ids(ids, keep, emit),
            Self::U16(ids) => select_ids(ids, keep, emit),
            Self::U32(ids) => select_ids(ids, keep, emit),
        }
    }

    /// Allocated bytes of the id buffer.
    pub fn estimate_memory_usage(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }
}

fn select_ids<I: Copy + Into<u32>>(
    ids: &[I],
    mut keep: impl FnMut(ValueId) -> bool,
    mut emit: impl FnMut(usize),
) {
    for (offset, id) in ids.iter().enumerate() {
        if keep(ValueId((*id).into())) {
            emit(offset);
        }
    }
}
