use crate::backends::backend_trait::{Factory, QueryCompiler};
use crate::utils::{
    config::{NATIVE_ENGINE, ROWS_STORAGE_FORMAT},
    types::{Execution, Label, Row, Table, Value},
    error::{FrameResult, KernelError},
};

/// Row-major in-memory representation
#[derive(Debug, Clone)]
pub struct RowStore {
    execution: Execution,
    columns: Vec<Label>,
    index: Vec<Label>,
    rows: Vec<Row>,
}

impl RowStore {
    /// Create a row store for the default `Rows on Native` execution
    pub fn new(table: Table) -> Self {
        Self::with_execution(table, Execution::new(ROWS_STORAGE_FORMAT, NATIVE_ENGINE))
    }

    /// Create a row store that reports a custom execution
    pub fn with_execution(table: Table, execution: Execution) -> Self {
        let rows = table.rows().into_iter().map(Row::new).collect();
        Self {
            execution,
            columns: table.columns,
            index: table.index,
            rows,
        }
    }

    /// Access the stored rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl QueryCompiler for RowStore {
    fn execution(&self) -> Execution {
        self.execution.clone()
    }

    fn columns(&self) -> Vec<Label> {
        self.columns.clone()
    }

    fn set_columns(&mut self, columns: Vec<Label>) -> FrameResult<()> {
        if columns.len() != self.columns.len() {
            return Err(KernelError::ShapeMismatch(format!(
                "expected {} column labels, got {}",
                self.columns.len(),
                columns.len()
            ))
            .into());
        }
        self.columns = columns;
        Ok(())
    }

    fn index(&self) -> Vec<Label> {
        self.index.clone()
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn column(&self, label: &Label) -> Option<Vec<Value>> {
        let position = self.columns.iter().position(|c| c == label)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(position).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    fn to_table(&self) -> Table {
        let data = (0..self.columns.len())
            .map(|position| {
                self.rows
                    .iter()
                    .map(|row| row.get(position).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Table {
            columns: self.columns.clone(),
            index: self.index.clone(),
            data,
        }
    }

    fn rebuild(&self, table: Table) -> FrameResult<Box<dyn QueryCompiler>> {
        Ok(Box::new(RowStore::with_execution(table, self.execution.clone())))
    }

    fn clone_box(&self) -> Box<dyn QueryCompiler> {
        Box::new(self.clone())
    }
}

/// Factory producing [`RowStore`]s
#[derive(Debug, Clone)]
pub struct RowStoreFactory {
    execution: Execution,
}

impl RowStoreFactory {
    /// Factory for `Rows on Native`
    pub fn new() -> Self {
        Self::for_execution(Execution::new(ROWS_STORAGE_FORMAT, NATIVE_ENGINE))
    }

    /// Factory whose row stores report `execution`, for backends that reuse
    /// the row layout under another name
    pub fn for_execution(execution: Execution) -> Self {
        Self { execution }
    }
}

impl Default for RowStoreFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for RowStoreFactory {
    fn execution(&self) -> Execution {
        self.execution.clone()
    }

    fn from_table(&self, table: Table) -> FrameResult<Box<dyn QueryCompiler>> {
        Ok(Box::new(RowStore::with_execution(table, self.execution.clone())))
    }
}
