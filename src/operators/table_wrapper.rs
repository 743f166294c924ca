use std::sync::Arc;

use super::{Operator, OperatorOutput};
use crate::{error::Result, table::Table};

/// Operator that outputs a table it was given, so the table can feed other operators.
#[derive(Debug)]
pub struct TableWrapper {
    table: Arc<Table>,
    output: OperatorOutput,
}

impl TableWrapper {
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            output: OperatorOutput::default(),
        }
    }
}

impl Operator for TableWrapper {
    fn name(&self) -> &'static str {
        "TableWrapper"
    }

    fn execute(&mut self) -> Result<()> {
        self.output.ensure_pending(self.name())?;
        self.output.set(Arc::clone(&self.table));
        Ok(())
    }

    fn output(&self) -> Result<Arc<Table>> {
        self.output.get(self.name())
    }
}
