use std::{cmp::Ordering, fmt, str::FromStr, sync::Arc};

use super::{Operator, OperatorOutput};
use crate::{
    attribute_vector::AttributeVector,
    chunk::Chunk,
    column_type::ColumnType,
    dictionary_segment::DictionarySegment,
    error::{Error, Result},
    reference_segment::ReferenceSegment,
    resolve_column_type,
    segment::{AnyDictionarySegment, AnyValueSegment, Segment},
    table::Table,
    types::{ChunkId, ChunkOffset, ColumnId, INVALID_VALUE_ID, PosList, RowId, ValueId},
    value::Value,
    value_segment::ValueSegment,
};

/// The comparison a [TableScan] applies between a column and its search value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanType {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl ScanType {
    pub const ALL: [ScanType; 6] = [
        ScanType::Equals,
        ScanType::NotEquals,
        ScanType::LessThan,
        ScanType::LessThanEquals,
        ScanType::GreaterThan,
        ScanType::GreaterThanEquals,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            ScanType::Equals => "=",
            ScanType::NotEquals => "!=",
            ScanType::LessThan => "<",
            ScanType::LessThanEquals => "<=",
            ScanType::GreaterThan => ">",
            ScanType::GreaterThanEquals => ">=",
        }
    }

    /// Applies the comparison `lhs <op> rhs` with the type's native operators.
    pub fn evaluate<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            ScanType::Equals => lhs == rhs,
            ScanType::NotEquals => lhs != rhs,
            ScanType::LessThan => lhs < rhs,
            ScanType::LessThanEquals => lhs <= rhs,
            ScanType::GreaterThan => lhs > rhs,
            ScanType::GreaterThanEquals => lhs >= rhs,
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ScanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "=" | "==" => Ok(ScanType::Equals),
            "!=" | "<>" => Ok(ScanType::NotEquals),
            "<" => Ok(ScanType::LessThan),
            "<=" => Ok(ScanType::LessThanEquals),
            ">" => Ok(ScanType::GreaterThan),
            ">=" => Ok(ScanType::GreaterThanEquals),
            other => Err(Error::UnsupportedScanType(other.to_string())),
        }
    }
}

/// Filters the rows of its input on a single comparison against one column.
///
/// The result is a single-chunk table of [ReferenceSegment]s sharing one position list, in chunk
/// order and then offset order. Scanning a scan result references the base table directly, so
/// chains of scans never stack more than one level of indirection.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use chunkdb::operators::{Operator, ScanType, TableScan, TableWrapper};
/// use chunkdb::{ChunkId, DataType, RowId, Segment, Table, Value};
///
/// let mut table = Table::new(2).unwrap();
/// table.add_column("id", DataType::Int).unwrap();
/// for id in [1, 2, 3] {
///     table.append(&[Value::Int(id)]).unwrap();
/// }
///
/// let mut input = TableWrapper::new(Arc::new(table));
/// input.execute().unwrap();
/// let mut scan = TableScan::new(&input, 0.into(), ScanType::GreaterThan, Value::Int(1));
/// scan.execute().unwrap();
///
/// let result = scan.output().unwrap();
/// let Segment::Reference(ids) = &result.chunks()[0].segments()[0] else { unreachable!() };
/// assert_eq!(
///     ids.pos_list().as_slice(),
///     &[RowId::new(ChunkId(0), 1), RowId::new(ChunkId(1), 0)]
/// );
/// ```
pub struct TableScan<'a> {
    input: &'a dyn Operator,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: Value,
    output: OperatorOutput,
}

impl<'a> TableScan<'a> {
    /// Creates a scan over the output of `input`, which must have been executed before this
    /// scan runs.
    pub fn new(
        input: &'a dyn Operator,
        column_id: ColumnId,
        scan_type: ScanType,
        search_value: Value,
    ) -> Self {
        Self {
            input,
            column_id,
            scan_type,
            search_value,
            output: OperatorOutput::default(),
        }
    }

    /// The column the comparison is evaluated on.
    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    /// The value table elements are compared against.
    pub fn search_value(&self) -> &Value {
        &self.search_value
    }

    fn on_execute(&self) -> Result<Arc<Table>> {
        let table = self.input.output()?;
        // Without columns there are no segments to look at.
        if table.column_count() == 0 {
            return Ok(Arc::new(Table::default()));
        }

        let data_type = table.column_type(self.column_id)?;
        let (referenced_table, referenced_columns) = self.referenced_columns(&table)?;
        let reference_target = (!Arc::ptr_eq(&referenced_table, &table)).then_some(&referenced_table);

        let pos_list = resolve_column_type!(data_type, |T| {
            TypedScan::<T>::new(self.column_id, self.scan_type, &self.search_value)?
                .scan_table(&table, reference_target)?
        });
        tracing::debug!(
            column = %self.column_id,
            scan_type = %self.scan_type,
            chunks = table.chunk_count(),
            matched = pos_list.len(),
            "table scan finished"
        );

        let pos_list = Arc::new(pos_list);
        let mut chunk = Chunk::new();
        let mut output = Table::default();
        for (column, referenced_column_id) in table.columns().iter().zip(referenced_columns) {
            output.add_column_definition(&column.name, column.data_type)?;
            chunk.add_segment(Segment::Reference(ReferenceSegment::new(
                Arc::clone(&referenced_table),
                referenced_column_id,
                Arc::clone(&pos_list),
            )))?;
        }
        output.emplace_chunk(chunk);
        Ok(Arc::new(output))
    }

    /// Determines which table and columns the result must reference.
    ///
    /// A base table is referenced as is. If the input is itself made of reference segments, the
    /// result points through to the table those segments reference instead.
    fn referenced_columns(&self, table: &Arc<Table>) -> Result<(Arc<Table>, Vec<ColumnId>)> {
        let first_chunk = table.get_chunk(ChunkId(0))?;
        let Segment::Reference(reference) = first_chunk.get_segment(self.column_id)? else {
            let columns = (0..table.column_count()).map(ColumnId).collect();
            return Ok((Arc::clone(table), columns));
        };

        let target = Arc::clone(reference.referenced_table());
        let columns = first_chunk
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Reference(reference)
                    if Arc::ptr_eq(reference.referenced_table(), &target) =>
                {
                    Ok(reference.referenced_column_id())
                }
                other => Err(Error::TypeMismatch(format!(
                    "{} segment next to reference segments of another table",
                    other.kind()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((target, columns))
    }
}

impl Operator for TableScan<'_> {
    fn name(&self) -> &'static str {
        "TableScan"
    }

    fn execute(&mut self) -> Result<()> {
        self.output.ensure_pending(self.name())?;
        let table = self.on_execute()?;
        self.output.set(table);
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}

/// Row selection over value ids of one dictionary segment, derived once from the search value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueIdPredicate {
    All,
    Nothing,
    Equals(ValueId),
    NotEquals(ValueId),
    /// Ids strictly below the bound.
    Below(ValueId),
    /// Ids from the first bound up to, not including, the second.
    Between(ValueId, ValueId),
}

impl ValueIdPredicate {
    fn new<T: ColumnType>(
        segment: &DictionarySegment<T>,
        scan_type: ScanType,
        search_value: &T,
    ) -> Self {
        // NaN compares false against everything, so only `!=` holds.
        if search_value.is_unordered() {
            return match scan_type {
                ScanType::NotEquals => Self::All,
                _ => Self::Nothing,
            };
        }

        let search_value = &search_value.clone().normalize();
        let lower = segment.lower_bound(search_value);
        if lower == INVALID_VALUE_ID {
            // Every dictionary entry is smaller than the search value.
            return match scan_type {
                ScanType::Equals | ScanType::GreaterThan | ScanType::GreaterThanEquals => {
                    Self::Nothing
                }
                ScanType::NotEquals | ScanType::LessThan | ScanType::LessThanEquals => Self::All,
            };
        }

        let exact = segment
            .value_by_value_id(lower)
            .is_ok_and(|value| value.total_cmp(search_value) == Ordering::Equal);
        let past_lower = ValueId(lower.0 + 1);
        // NaN entries sort last and never satisfy an ordering comparison.
        let ordered_end = ValueId(
            segment
                .dictionary()
                .partition_point(|entry| !entry.is_unordered()) as u32,
        );
        match (scan_type, exact) {
            (ScanType::Equals, true) => Self::Equals(lower),
            (ScanType::Equals, false) => Self::Nothing,
            (ScanType::NotEquals, true) => Self::NotEquals(lower),
            (ScanType::NotEquals, false) => Self::All,
            (ScanType::LessThan, _) => Self::Below(lower),
            (ScanType::LessThanEquals, true) => Self::Below(past_lower),
            (ScanType::LessThanEquals, false) => Self::Below(lower),
            (ScanType::GreaterThan, true) => Self::Between(past_lower, ordered_end),
            (ScanType::GreaterThan, false) => Self::Between(lower, ordered_end),
            (ScanType::GreaterThanEquals, _) => Self::Between(lower, ordered_end),
        }
    }

    fn matches(self, value_id: ValueId) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Equals(bound) => value_id == bound,
            Self::NotEquals(bound) => value_id != bound,
            Self::Below(bound) => value_id < bound,
            Self::Between(low, high) => low <= value_id && value_id < high,
        }
    }
}

/// A segment of the referenced table, resolved once per chunk while walking a position list.
enum ResolvedSegment<'t, T: ColumnType> {
    Value(&'t ValueSegment<T>),
    Dictionary {
        attribute_vector: &'t AttributeVector,
        predicate: ValueIdPredicate,
    },
}

/// The scan for one concrete column type; comparisons use `T`'s own operators.
struct TypedScan<T: ColumnType> {
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: T,
}

impl<T: ColumnType> TypedScan<T> {
    fn new(column_id: ColumnId, scan_type: ScanType, search_value: &Value) -> Result<Self> {
        Ok(Self {
            column_id,
            scan_type,
            search_value: T::from_value(search_value)?,
        })
    }

    /// Collects the matching rows of every non-empty chunk, in chunk order.
    ///
    /// `reference_target` is the table the input's reference segments point to, or `None` when
    /// the input is a base table; chunks that disagree with it are rejected.
    fn scan_table(&self, table: &Table, reference_target: Option<&Arc<Table>>) -> Result<PosList> {
        let mut pos_list = PosList::new();
        for (index, chunk) in table.chunks().iter().enumerate() {
            if chunk.is_empty() {
                continue;
            }
            let chunk_id = ChunkId(index as u32);
            match (chunk.get_segment(self.column_id)?, reference_target) {
                (Segment::Value(segment), None) => {
                    self.scan_value_segment(typed_value_segment(segment)?, chunk_id, &mut pos_list)
                }
                (Segment::Dictionary(segment), None) => self.scan_dictionary_segment(
                    typed_dictionary_segment(segment)?,
                    chunk_id,
                    &mut pos_list,
                ),
                (Segment::Reference(segment), Some(target))
                    if Arc::ptr_eq(segment.referenced_table(), target) =>
                {
                    self.scan_reference_segment(segment, &mut pos_list)?
                }
                (segment, _) => {
                    return Err(Error::TypeMismatch(format!(
                        "unexpected {} segment in chunk {chunk_id}",
                        segment.kind()
                    )));
                }
            }
        }
        Ok(pos_list)
    }

    fn scan_value_segment(&self, segment: &ValueSegment<T>, chunk_id: ChunkId, out: &mut PosList) {
        let search = &self.search_value;
        let values = segment.values();
        match self.scan_type {
            ScanType::Equals => select_values(values, chunk_id, out, |v| v == search),
            ScanType::NotEquals => select_values(values, chunk_id, out, |v| v != search),
            ScanType::LessThan => select_values(values, chunk_id, out, |v| v < search),
            ScanType::LessThanEquals => select_values(values, chunk_id, out, |v| v <= search),
            ScanType::GreaterThan => select_values(values, chunk_id, out, |v| v > search),
            ScanType::GreaterThanEquals => select_values(values, chunk_id, out, |v| v >= search),
        }
    }

    /// Compares value ids instead of values: one binary search per segment, then an integer
    /// test per row.
    fn scan_dictionary_segment(
        &self,
        segment: &DictionarySegment<T>,
        chunk_id: ChunkId,
        out: &mut PosList,
    ) {
        let predicate = ValueIdPredicate::new(segment, self.scan_type, &self.search_value);
        let attribute_vector = segment.attribute_vector();
        let emit = |offset: usize| out.push(RowId::new(chunk_id, offset as ChunkOffset));
        match predicate {
            ValueIdPredicate::Nothing => {}
            ValueIdPredicate::All => (0..segment.size()).for_each(emit),
            ValueIdPredicate::Equals(bound) => attribute_vector.select(|id| id == bound, emit),
            ValueIdPredicate::NotEquals(bound) => attribute_vector.select(|id| id != bound, emit),
            ValueIdPredicate::Below(bound) => attribute_vector.select(|id| id < bound, emit),
            ValueIdPredicate::Between(low, high) => {
                attribute_vector.select(|id| low <= id && id < high, emit)
            }
        }
    }

    /// Walks the referenced positions in order and keeps the ones whose base value matches.
    ///
    /// The base segment (and for dictionaries the derived value id predicate) is cached while
    /// consecutive positions stay in the same chunk. The cache is keyed by chunk id, so any
    /// position order gives the right answer; grouping by chunk only makes it faster.
    fn scan_reference_segment(&self, segment: &ReferenceSegment, out: &mut PosList) -> Result<()> {
        let table = segment.referenced_table();
        let column_id = segment.referenced_column_id();
        let mut cached: Option<(ChunkId, ResolvedSegment<'_, T>)> = None;

        for row_id in segment.pos_list().iter() {
            let resolved = match &mut cached {
                Some((chunk_id, resolved)) if *chunk_id == row_id.chunk_id => resolved,
                slot => {
                    let resolved = self.resolve_segment(table, row_id.chunk_id, column_id)?;
                    &mut slot.insert((row_id.chunk_id, resolved)).1
                }
            };

            let offset = row_id.chunk_offset as usize;
            let selected = match resolved {
                ResolvedSegment::Value(values) => self
                    .scan_type
                    .evaluate(values.get_typed(offset)?, &self.search_value),
                ResolvedSegment::Dictionary {
                    attribute_vector,
                    predicate,
                } => {
                    let value_id =
                        attribute_vector
                            .get(offset)
                            .ok_or(Error::OffsetOutOfRange {
                                offset,
                                size: attribute_vector.len(),
                            })?;
                    predicate.matches(value_id)
                }
            };
            if selected {
                out.push(*row_id);
            }
        }
        Ok(())
    }

    fn resolve_segment<'t>(
        &self,
        table: &'t Table,
        chunk_id: ChunkId,
        column_id: ColumnId,
    ) -> Result<ResolvedSegment<'t, T>> {
        match table.get_chunk(chunk_id)?.get_segment(column_id)? {
            Segment::Value(segment) => Ok(ResolvedSegment::Value(typed_value_segment(segment)?)),
            Segment::Dictionary(segment) => {
                let segment = typed_dictionary_segment(segment)?;
                Ok(ResolvedSegment::Dictionary {
                    attribute_vector: segment.attribute_vector(),
                    predicate: ValueIdPredicate::new(segment, self.scan_type, &self.search_value),
                })
            }
            Segment::Reference(_) => Err(Error::TypeMismatch(
                "reference segments must not reference other reference segments".into(),
            )),
        }
    }
}

fn select_values<T>(
    values: &[T],
    chunk_id: ChunkId,
    out: &mut PosList,
    predicate: impl Fn(&T) -> bool,
) {
    out.extend(
        values
            .iter()
            .enumerate()
            .filter(|(_, value)| predicate(value))
            .map(|(offset, _)| RowId::new(chunk_id, offset as ChunkOffset)),
    );
}

fn typed_value_segment<T: ColumnType>(segment: &AnyValueSegment) -> Result<&ValueSegment<T>> {
    T::value_segment(segment).ok_or_else(|| {
        Error::TypeMismatch(format!(
            "{} value segment does not match search type {}",
            segment.data_type(),
            T::DATA_TYPE
        ))
    })
}

fn typed_dictionary_segment<T: ColumnType>(
    segment: &AnyDictionarySegment,
) -> Result<&DictionarySegment<T>> {
    T::dictionary_segment(segment).ok_or_else(|| {
        Error::TypeMismatch(format!(
            "{} dictionary segment does not match search type {}",
            segment.data_type(),
            T::DATA_TYPE
        ))
    })
}
