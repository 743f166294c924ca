//! Builds a sample table, optionally compresses it, and runs one scan over it.
//!
//! Usage:
//!   chunkdb --rows 100000 --chunk-size 10000 --compress --column a --op '>=' --value 500
//!
//! Set `RUST_LOG=chunkdb=debug` to see compression and scan events.

use std::{process, sync::Arc};

use clap::Parser;

use chunkdb::{
    ChunkId, DataType, GetTable, Operator, Result, ScanType, Segment, StorageManager, Table,
    TableScan, Value,
};

const TABLE_NAME: &str = "sample";

#[derive(Parser, Debug)]
#[command(name = "chunkdb")]
#[command(about = "Chunked columnar storage: build, compress and scan a sample table")]
#[command(version)]
struct Args {
    /// Maximum number of rows per chunk
    #[arg(long, default_value_t = 10_000)]
    chunk_size: u32,

    /// Number of rows to generate
    #[arg(long, default_value_t = 100_000)]
    rows: u32,

    /// Column to filter on (a: int, b: long, c: double, d: string)
    #[arg(long, default_value = "a")]
    column: String,

    /// Comparison operator: =, !=, <, <=, >, >=
    #[arg(long, default_value = ">=")]
    op: ScanType,

    /// Search value, cast to the column's type
    #[arg(long, default_value = "500")]
    value: String,

    /// Dictionary-encode every full chunk before scanning
    #[arg(long)]
    compress: bool,

    /// Worker threads used for compression (defaults to the number of cores)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            eprintln!("Failed to configure the thread pool: {e}");
            process::exit(1);
        }
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn build_table(args: &Args) -> Result<Table> {
    let mut table = Table::new(args.chunk_size)?;
    table.add_column("a", DataType::Int)?;
    table.add_column("b", DataType::Long)?;
    table.add_column("c", DataType::Double)?;
    table.add_column("d", DataType::String)?;

    for i in 0..args.rows {
        table.append(&[
            Value::Int((i % 1000) as i32),
            Value::Long(i64::from(i) * 7),
            Value::Double(f64::from(i % 100) / 4.0),
            Value::from(format!("str{}", i % 250)),
        ])?;
    }

    if args.compress {
        let full_chunks = table.chunk_count() - u32::from(args.rows % args.chunk_size != 0);
        for chunk_id in 0..full_chunks {
            table.compress_chunk(ChunkId(chunk_id))?;
        }
    }
    Ok(table)
}

fn run(args: &Args) -> Result<()> {
    let table = build_table(args)?;
    let column_id = table.column_id_by_name(&args.column)?;

    let mut storage = StorageManager::new();
    storage.add_table(TABLE_NAME, Arc::new(table))?;
    print!("{storage}");

    let mut get_table = GetTable::new(&storage, TABLE_NAME);
    get_table.execute()?;
    let input = get_table.output()?;

    let mut scan = TableScan::new(&get_table, column_id, args.op, Value::from(args.value.as_str()));
    scan.execute()?;
    let result = scan.output()?;

    println!(
        "{} {} {}: {} of {} rows",
        args.column,
        args.op,
        args.value,
        result.row_count(),
        input.row_count()
    );
    println!("table memory: {} bytes", input.estimate_memory_usage());
    println!("result memory: {} bytes", result.estimate_memory_usage());

    if let Some(Segment::Reference(segment)) = result.chunks()[0].segments().first() {
        for row_id in segment.pos_list().iter().take(5) {
            let row = input.get_row(*row_id)?;
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            println!("  {}", cells.join(" | "));
        }
    }
    Ok(())
}
