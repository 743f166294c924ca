use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    error::{Error, Result},
    table::Table,
};

/// Registry of named tables.
///
/// The registry is an ordinary value owned by the caller and handed to whatever builds
/// operators (see [GetTable](crate::operators::GetTable)); there is no process-wide instance.
#[derive(Debug, Default)]
pub struct StorageManager {
    /// A map of table names to their shared [Table]s.
    tables: HashMap<String, Arc<Table>>,
}

impl StorageManager {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            tables: HashMap::default(),
        }
    }

    /// Registers `table` under `name`.
    ///
    /// # Errors
    /// Returns an error if a table with the same name already exists.
    pub fn add_table(&mut self, name: &str, table: Arc<Table>) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::DuplicateTable(name.to_string()));
        }
        tracing::trace!(table = name, "registering table");
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    /// Removes a table from the registry by its name.
    ///
    /// # Errors
    /// Returns an error if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        match self.tables.remove(name) {
            Some(_) => {
                tracing::trace!(table = name, "dropped table");
                Ok(())
            }
            None => Err(Error::TableNotFound(name.to_string())),
        }
    }

    /// Retrieves a shared handle to a table by name.
    pub fn get_table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the names of all registered tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Removes every table.
    pub fn reset(&mut self) {
        self.tables.clear();
    }
}

/// One line per table: `name | columns | rows | chunks`.
impl fmt::Display for StorageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in self.table_names() {
            let table = &self.tables[&name];
            writeln!(
                f,
                "{name} | {} | {} | {}",
                table.column_count(),
                table.row_count(),
                table.chunk_count()
            )?;
        }
        Ok(())
    }
}
