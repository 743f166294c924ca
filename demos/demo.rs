use std::sync::Arc;

use chunkdb::*;

fn print_rows(title: &str, table: &Table) -> Result<()> {
    println!("{title}:");
    println!("{:<5} {:<10} {:<5}", "ID", "NAME", "AGE");
    println!("{}", "-".repeat(25));

    for chunk in table.chunks() {
        for offset in 0..chunk.size() {
            let row = chunk.get_row(offset)?;
            println!("{:<5} {:<10} {:<5}", row[0], row[1], row[2]);
        }
    }
    println!();
    Ok(())
}

fn main() -> Result<()> {
    println!("Chunked Storage Demo\n");

    // Create table "users" with two rows per chunk
    let mut users = Table::new(2)?;
    users.add_column("id", DataType::Int)?;
    users.add_column("name", DataType::String)?;
    users.add_column("age", DataType::Int)?;

    // Insert data
    println!("Inserting data...");
    for (id, name, age) in [(1, "Alice", 30), (2, "Bob", 41), (3, "Charlie", 25)] {
        users.append(&[Value::Int(id), Value::from(name), Value::Int(age)])?;
    }
    println!(
        "Inserted {} rows into {} chunks\n",
        users.row_count(),
        users.chunk_count()
    );

    // The first chunk is full and can be dictionary-encoded
    let before = users.estimate_memory_usage();
    users.compress_chunk(ChunkId(0))?;
    println!(
        "Compressed chunk 0: {before} -> {} bytes\n",
        users.estimate_memory_usage()
    );

    let mut storage = StorageManager::new();
    storage.add_table("users", Arc::new(users))?;

    let mut get_table = GetTable::new(&storage, "users");
    get_table.execute()?;
    let all_users = get_table.output()?;
    print_rows("All users", &all_users)?;

    // age > 26, then name != 'Bob' on the result
    let mut adults = TableScan::new(&get_table, ColumnId(2), ScanType::GreaterThan, Value::Int(26));
    adults.execute()?;
    let older = adults.output()?;
    print_rows("Older than 26", &older)?;

    let mut not_bob = TableScan::new(&adults, ColumnId(1), ScanType::NotEquals, Value::from("Bob"));
    not_bob.execute()?;
    let older_not_bob = not_bob.output()?;
    print_rows("Older than 26 and not Bob", &older_not_bob)?;

    // List tables
    println!("Tables in storage:");
    print!("{storage}");

    Ok(())
}
