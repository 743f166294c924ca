use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use chunkdb::{
    ChunkId, ColumnId, DataType, DictionarySegment, Operator, ScanType, Table, TableScan,
    TableWrapper, Value, ValueSegment,
};
use std::hint::black_box;
use std::sync::Arc;

const CHUNK_SIZE: u32 = 10_000;

fn setup_table(n: u32, compressed: bool) -> Table {
    let mut table = Table::new(CHUNK_SIZE).unwrap();
    table.add_column("id", DataType::Int).unwrap();
    table.add_column("name", DataType::String).unwrap();

    for i in 0..n {
        table
            .append(&[
                Value::Int((i % 100) as i32),
                Value::from(format!("user{}", i % 1000)),
            ])
            .unwrap();
    }
    if compressed {
        for chunk_id in 0..table.chunk_count() {
            table.compress_chunk(ChunkId(chunk_id)).unwrap();
        }
    }
    table
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("Append");
    group.bench_function("append_single_row", |b| {
        let mut table = Table::new(CHUNK_SIZE).unwrap();
        table.add_column("id", DataType::Int).unwrap();
        b.iter(|| {
            table.append(black_box(&[Value::Int(42)])).unwrap();
        });
    });
    group.finish();
}

fn bench_dictionary_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dictionary_Encoding");

    for n in [1000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let segment: ValueSegment<i32> = (0..n as i32).map(|i| i % 997).collect();
            b.iter(|| {
                black_box(DictionarySegment::from_value_segment(&segment).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_compress_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compress_Chunk");
    group.bench_function("two_columns", |b| {
        b.iter_with_setup(
            || setup_table(CHUNK_SIZE, false),
            |mut table| {
                table.compress_chunk(ChunkId(0)).unwrap();
                black_box(table);
            },
        );
    });
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scan_Performance");

    for compressed in [false, true] {
        for n in [10_000, 100_000].iter() {
            let label = if compressed { "dictionary" } else { "value" };
            let mut input = TableWrapper::new(Arc::new(setup_table(*n, compressed)));
            input.execute().unwrap();

            group.bench_with_input(BenchmarkId::new(label, n), n, |b, _| {
                b.iter(|| {
                    let mut scan =
                        TableScan::new(&input, ColumnId(0), ScanType::LessThan, Value::Int(42));
                    scan.execute().unwrap();
                    black_box(scan.output().unwrap());
                });
            });
        }
    }
    group.finish();
}

fn bench_scan_of_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scan_Of_Scan");
    let mut input = TableWrapper::new(Arc::new(setup_table(100_000, true)));
    input.execute().unwrap();
    let mut first = TableScan::new(&input, ColumnId(0), ScanType::GreaterThanEquals, Value::Int(50));
    first.execute().unwrap();

    group.bench_function("reference_input", |b| {
        b.iter(|| {
            let mut scan =
                TableScan::new(&first, ColumnId(1), ScanType::Equals, Value::from("user150"));
            scan.execute().unwrap();
            black_box(scan.output().unwrap());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_dictionary_encoding,
    bench_compress_chunk,
    bench_scan,
    bench_scan_of_scan
);
criterion_main!(benches);
