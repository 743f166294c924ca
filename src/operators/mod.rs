//! Pull-based operators producing tables.
//!
//! An operator computes its whole output in [Operator::execute]; consumers borrow an executed
//! operator and read its [Operator::output].

mod get_table;
mod table_scan;
mod table_wrapper;

use std::sync::Arc;

use crate::{
    error::{Error, Result},
    table::Table,
};

pub use get_table::GetTable;
pub use table_scan::{ScanType, TableScan};
pub use table_wrapper::TableWrapper;

/// The contract shared by every operator.
pub trait Operator {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Computes the output table.
    ///
    /// # Errors
    /// Fails with [Error::AlreadyExecuted] on a second call, or with whatever error the
    /// operator's own work raises.
    fn execute(&mut self) -> Result<()>;

    /// Returns the output table produced by [Operator::execute].
    ///
    /// # Errors
    /// Fails with [Error::NotExecuted] if the operator has not run yet.
    fn output(&self) -> Result<Arc<Table>>;
}

/// Holds an operator's output and enforces the execute-once lifecycle.
#[derive(Debug, Default)]
pub(crate) struct OperatorOutput(Option<Arc<Table>>);

impl OperatorOutput {
    pub(crate) fn ensure_pending(&self, operator: &'static str) -> Result<()> {
        if self.0.is_some() {
            return Err(Error::AlreadyExecuted(operator));
        }
        Ok(())
    }

    pub(crate) fn set(&mut self, table: Arc<Table>) {
        self.0 = Some(table);
    }

    pub(crate) fn get(&self, operator: &'static str) -> Result<Arc<Table>> {
        self.0.clone().ok_or(Error::NotExecuted(operator))
    }
}
