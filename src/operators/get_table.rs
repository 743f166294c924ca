use std::sync::Arc;

use super::{Operator, OperatorOutput};
use crate::{error::Result, storage_manager::StorageManager, table::Table};

/// Operator to retrieve a registered table by name.
#[derive(Debug)]
pub struct GetTable<'a> {
    storage: &'a StorageManager,
    table_name: String,
    output: OperatorOutput,
}

impl<'a> GetTable<'a> {
    pub fn new(storage: &'a StorageManager, table_name: impl Into<String>) -> Self {
        Self {
            storage,
            table_name: table_name.into(),
            output: OperatorOutput::default(),
        }
    }

    /// The name of the table the operator is looking for.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl Operator for GetTable<'_> {
    fn name(&self) -> &'static str {
        "GetTable"
    }

    /// # Errors
    /// Fails with [TableNotFound](crate::Error::TableNotFound) for unknown names.
    fn execute(&mut self) -> Result<()> {
        self.output.ensure_pending(self.name())?;
        let table = self.storage.get_table(&self.table_name)?;
        self.output.set(table);
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_get_registered_table() {
        let mut sm = StorageManager::new();
        let table = Arc::new(Table::new(2).unwrap());
        sm.add_table("aNiceTestTable", Arc::clone(&table)).unwrap();

        let mut get_table = GetTable::new(&sm, "aNiceTestTable");
        assert_eq!(get_table.table_name(), "aNiceTestTable");
        get_table.execute().unwrap();

        assert!(Arc::ptr_eq(&get_table.output().unwrap(), &table));
    }

    #[test]
    fn test_unknown_table() {
        let sm = StorageManager::new();
        let mut get_table = GetTable::new(&sm, "anUglyTestTable");

        assert_eq!(
            get_table.execute(),
            Err(Error::TableNotFound("anUglyTestTable".into()))
        );
        assert!(get_table.output().is_err());
    }
}
