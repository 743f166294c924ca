use std::sync::Arc;

use chunkdb::{
    AttributeWidth, ChunkId, ColumnId, DataType, DictionarySegment, INVALID_VALUE_ID, Operator,
    RowId, ScanType, Segment, Table, TableScan, TableWrapper, Value, ValueId, ValueSegment,
};
use proptest::prelude::*;

fn int_values() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-50i32..50, 0..200)
}

fn string_values() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-d]{0,3}", 0..120)
}

fn float_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(-0.0),
        Just(0.0),
        Just(f64::NAN),
        (-8i32..8).prop_map(|v| f64::from(v) / 2.0),
    ]
}

fn float_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(float_value(), 0..150)
}

fn scan_type() -> impl Strategy<Value = ScanType> {
    prop::sample::select(ScanType::ALL.to_vec())
}

fn table_of(data_type: DataType, values: &[Value], max_chunk_size: u32) -> Table {
    let mut table = Table::new(max_chunk_size).unwrap();
    table.add_column("v", data_type).unwrap();
    for value in values {
        table.append(std::slice::from_ref(value)).unwrap();
    }
    table
}

fn compressed(mut table: Table) -> Table {
    for chunk_id in 0..table.chunk_count() {
        table.compress_chunk(ChunkId(chunk_id)).unwrap();
    }
    table
}

fn scan_positions(table: Table, scan_type: ScanType, search: Value) -> Vec<RowId> {
    let mut input = TableWrapper::new(Arc::new(table));
    input.execute().unwrap();
    let mut scan = TableScan::new(&input, ColumnId(0), scan_type, search);
    scan.execute().unwrap();
    let result = scan.output().unwrap();
    match &result.chunks()[0].segments()[0] {
        Segment::Reference(segment) => segment.pos_list().to_vec(),
        other => panic!("scan produced a {} segment", other.kind()),
    }
}

fn expected_positions<T: PartialOrd>(
    values: &[T],
    max_chunk_size: u32,
    scan_type: ScanType,
    search: &T,
) -> Vec<RowId> {
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| scan_type.evaluate(*value, search))
        .map(|(row, _)| {
            let row = row as u32;
            RowId::new(ChunkId(row / max_chunk_size), row % max_chunk_size)
        })
        .collect()
}

#[test]
fn three_rows_in_chunks_of_two() {
    let values = [1, 2, 3].map(Value::Int);
    let table = table_of(DataType::Int, &values, 2);

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.chunk_count(), 2);
    assert_eq!(
        scan_positions(table, ScanType::GreaterThan, Value::Int(1)),
        vec![RowId::new(ChunkId(0), 1), RowId::new(ChunkId(1), 0)]
    );
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn dictionary_reproduces_every_row(values in int_values()) {
        let segment: ValueSegment<i32> = values.iter().copied().collect();
        let dictionary = DictionarySegment::from_value_segment(&segment).unwrap();

        prop_assert_eq!(dictionary.size(), values.len());
        for (offset, value) in values.iter().enumerate() {
            prop_assert_eq!(dictionary.get(offset).unwrap(), Value::Int(*value));
        }
    }

    #[test]
    fn dictionary_is_sorted_and_unique(values in string_values()) {
        let segment: ValueSegment<Arc<str>> = values.iter().map(|s| Arc::from(s.as_str())).collect();
        let dictionary = DictionarySegment::from_value_segment(&segment).unwrap();
        let entries = dictionary.dictionary();

        prop_assert!(entries.windows(2).all(|pair| pair[0] < pair[1]));
        for value in &values {
            prop_assert!(entries.iter().any(|entry| &**entry == value.as_str()));
        }
        prop_assert_eq!(dictionary.attribute_vector().width(), AttributeWidth::U8);
        prop_assert_eq!(dictionary.unique_values_count(), entries.len());
    }

    #[test]
    fn bounds_agree_with_linear_search(values in int_values(), search in -60i32..60) {
        let dictionary = DictionarySegment::from_values(&values).unwrap();
        let entries = dictionary.dictionary();
        let to_value_id = |position: Option<usize>| {
            position.map_or(INVALID_VALUE_ID, |p| ValueId(p as u32))
        };

        prop_assert_eq!(
            dictionary.lower_bound(&search),
            to_value_id(entries.iter().position(|entry| *entry >= search))
        );
        prop_assert_eq!(
            dictionary.upper_bound(&search),
            to_value_id(entries.iter().position(|entry| *entry > search))
        );
    }

    #[test]
    fn chunks_split_at_the_maximum_size(count in 0usize..100, max_chunk_size in 1u32..12) {
        let values: Vec<Value> = (0..count as i32).map(Value::Int).collect();
        let table = table_of(DataType::Int, &values, max_chunk_size);
        let chunks = table.chunks();

        prop_assert_eq!(table.row_count(), count as u64);
        prop_assert_eq!(
            table.chunk_count() as usize,
            count.div_ceil(max_chunk_size as usize).max(1)
        );
        for chunk in &chunks[..chunks.len() - 1] {
            prop_assert_eq!(chunk.size(), max_chunk_size as usize);
        }
    }

    #[test]
    fn int_scans_match_reference_results(
        values in int_values(),
        max_chunk_size in 1u32..40,
        scan_type in scan_type(),
        search in -60i32..60,
    ) {
        let cells: Vec<Value> = values.iter().copied().map(Value::Int).collect();
        let plain = table_of(DataType::Int, &cells, max_chunk_size);
        let encoded = compressed(plain.clone());
        let expected = expected_positions(&values, max_chunk_size, scan_type, &search);

        prop_assert_eq!(scan_positions(plain, scan_type, Value::Int(search)), expected.clone());
        prop_assert_eq!(scan_positions(encoded, scan_type, Value::Int(search)), expected);
    }

    #[test]
    fn string_scans_match_reference_results(
        values in string_values(),
        max_chunk_size in 1u32..40,
        scan_type in scan_type(),
        search in "[a-d]{0,3}",
    ) {
        let cells: Vec<Value> = values.iter().map(|s| Value::from(s.as_str())).collect();
        let plain = table_of(DataType::String, &cells, max_chunk_size);
        let encoded = compressed(plain.clone());
        let expected = expected_positions(&values, max_chunk_size, scan_type, &search);

        prop_assert_eq!(
            scan_positions(plain, scan_type, Value::from(search.as_str())),
            expected.clone()
        );
        prop_assert_eq!(
            scan_positions(encoded, scan_type, Value::from(search.as_str())),
            expected
        );
    }

    #[test]
    fn float_scans_match_reference_results(
        values in float_values(),
        max_chunk_size in 1u32..40,
        scan_type in scan_type(),
        search in float_value(),
    ) {
        let cells: Vec<Value> = values.iter().copied().map(Value::Double).collect();
        let plain = table_of(DataType::Double, &cells, max_chunk_size);
        let encoded = compressed(plain.clone());
        let expected = expected_positions(&values, max_chunk_size, scan_type, &search);

        prop_assert_eq!(scan_positions(plain, scan_type, Value::Double(search)), expected.clone());
        prop_assert_eq!(scan_positions(encoded, scan_type, Value::Double(search)), expected);
    }

    #[test]
    fn chained_scans_reference_the_base_table(
        values in int_values(),
        max_chunk_size in 1u32..40,
        lower in -60i32..60,
        upper in -60i32..60,
    ) {
        let cells: Vec<Value> = values.iter().copied().map(Value::Int).collect();
        let base = Arc::new(table_of(DataType::Int, &cells, max_chunk_size));
        let mut input = TableWrapper::new(Arc::clone(&base));
        input.execute().unwrap();

        let mut first = TableScan::new(&input, ColumnId(0), ScanType::GreaterThanEquals, Value::Int(lower));
        first.execute().unwrap();
        let mut second = TableScan::new(&first, ColumnId(0), ScanType::LessThan, Value::Int(upper));
        second.execute().unwrap();
        let result = second.output().unwrap();

        let Segment::Reference(segment) = &result.chunks()[0].segments()[0] else {
            panic!("scan produced a non-reference segment");
        };
        prop_assert!(Arc::ptr_eq(segment.referenced_table(), &base));

        let expected: Vec<RowId> = expected_positions(&values, max_chunk_size, ScanType::GreaterThanEquals, &lower)
            .into_iter()
            .filter(|row_id| {
                let row = row_id.chunk_id.0 * max_chunk_size + row_id.chunk_offset;
                values[row as usize] < upper
            })
            .collect();
        prop_assert_eq!(segment.pos_list().to_vec(), expected);
    }
}
