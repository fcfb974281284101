use crate::backends::backend_trait::{Factory, QueryCompiler};
use crate::utils::{
    config::{COLUMNS_STORAGE_FORMAT, NATIVE_ENGINE},
    types::{Execution, Label, Table, Value},
    error::{FrameResult, KernelError},
};

/// A named column of values
#[derive(Debug, Clone, PartialEq)]
struct StoredColumn {
    label: Label,
    values: Vec<Value>,
}

/// Column-major in-memory representation
#[derive(Debug, Clone)]
pub struct ColumnStore {
    columns: Vec<StoredColumn>,
    index: Vec<Label>,
}

impl ColumnStore {
    pub fn new(table: Table) -> Self {
        let columns = table
            .columns
            .into_iter()
            .zip(table.data)
            .map(|(label, values)| StoredColumn { label, values })
            .collect();
        Self {
            columns,
            index: table.index,
        }
    }
}

impl QueryCompiler for ColumnStore {
    fn execution(&self) -> Execution {
        Execution::new(COLUMNS_STORAGE_FORMAT, NATIVE_ENGINE)
    }

    fn columns(&self) -> Vec<Label> {
        self.columns.iter().map(|c| c.label.clone()).collect()
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
        for (column, label) in self.columns.iter_mut().zip(columns) {
            column.label = label;
        }
        Ok(())
    }

    fn index(&self) -> Vec<Label> {
        self.index.clone()
    }

    fn num_rows(&self) -> usize {
        self.index.len()
    }

    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn column(&self, label: &Label) -> Option<Vec<Value>> {
        self.columns
            .iter()
            .find(|c| &c.label == label)
            .map(|c| c.values.clone())
    }

    fn to_table(&self) -> Table {
        Table {
            columns: self.columns(),
            index: self.index.clone(),
            data: self.columns.iter().map(|c| c.values.clone()).collect(),
        }
    }

    fn rebuild(&self, table: Table) -> FrameResult<Box<dyn QueryCompiler>> {
        Ok(Box::new(ColumnStore::new(table)))
    }

    fn clone_box(&self) -> Box<dyn QueryCompiler> {
        Box::new(self.clone())
    }
}

/// Factory producing [`ColumnStore`]s
#[derive(Debug, Clone, Default)]
pub struct ColumnStoreFactory;

impl ColumnStoreFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Factory for ColumnStoreFactory {
    fn execution(&self) -> Execution {
        Execution::new(COLUMNS_STORAGE_FORMAT, NATIVE_ENGINE)
    }

    fn from_table(&self, table: Table) -> FrameResult<Box<dyn QueryCompiler>> {
        Ok(Box::new(ColumnStore::new(table)))
    }
}
