use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use crate::utils::{
    types::{Execution, Label, Table, Value},
    error::{ConfigurationError, FrameResult},
};

/// Backend-specific representation of a frame's data
pub trait QueryCompiler: Send + Sync + fmt::Debug {
    /// Execution this representation is compiled for
    fn execution(&self) -> Execution;

    /// Column labels
    fn columns(&self) -> Vec<Label>;

    /// Replace the column labels; the count must match
    fn set_columns(&mut self, columns: Vec<Label>) -> FrameResult<()>;

    /// Row labels
    fn index(&self) -> Vec<Label>;

    /// Number of rows
    fn num_rows(&self) -> usize;

    /// Number of columns
    fn num_columns(&self) -> usize {
        self.columns().len()
    }

    /// Values of a single column
    fn column(&self, label: &Label) -> Option<Vec<Value>>;

    /// Materialise the logical content
    fn to_table(&self) -> Table;

    /// Build a representation of the same kind holding `table`
    fn rebuild(&self, table: Table) -> FrameResult<Box<dyn QueryCompiler>>;

    fn clone_box(&self) -> Box<dyn QueryCompiler>;
}

impl Clone for Box<dyn QueryCompiler> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Produces query compilers for one execution
pub trait Factory: Send + Sync {
    /// Execution this factory builds for
    fn execution(&self) -> Execution;

    /// One-time setup, run before the factory is first handed out
    fn prepare(&self) -> FrameResult<()> {
        Ok(())
    }

    /// Convert logical content into this backend's representation
    fn from_table(&self, table: Table) -> FrameResult<Box<dyn QueryCompiler>>;
}

/// Registry key for an execution, e.g. `RowsOnNativeFactory`
pub fn factory_key(execution: &Execution) -> String {
    format!("{}On{}Factory", execution.storage_format, execution.engine)
}

struct FactoryEntry {
    factory: Arc<dyn Factory>,
    /// Held while `prepare()` runs; `true` once it has succeeded
    prepared: Mutex<bool>,
}

/// Registry mapping executions to their factories
pub struct FactoryRegistry {
    factories: DashMap<String, Arc<FactoryEntry>>,
}

impl FactoryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Install a factory for an execution, replacing any previous one.
    /// Returns `true` if a factory was replaced.
    pub fn register(&self, execution: &Execution, factory: Arc<dyn Factory>) -> bool {
        let key = factory_key(execution);
        let entry = Arc::new(FactoryEntry {
            factory,
            prepared: Mutex::new(false),
        });
        let replaced = self.factories.insert(key.clone(), entry).is_some();
        info!(factory = %key, replaced, "registered factory");
        replaced
    }

    /// Get the factory for an execution, preparing it on first use
    pub fn get(&self, execution: &Execution) -> FrameResult<Arc<dyn Factory>> {
        let key = factory_key(execution);
        let entry = self
            .factories
            .get(&key)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| ConfigurationError::MissingFactory(key.clone()))?;

        let mut prepared = entry.prepared.lock().unwrap_or_else(PoisonError::into_inner);
        if !*prepared {
            debug!(factory = %key, "preparing factory");
            entry.factory.prepare().map_err(|e| ConfigurationError::FactoryPreparation {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            *prepared = true;
        }
        drop(prepared);

        Ok(Arc::clone(&entry.factory))
    }

    /// Check if a factory is registered for an execution
    pub fn contains(&self, execution: &Execution) -> bool {
        self.factories.contains_key(&factory_key(execution))
    }

    /// Remove the factory for an execution
    pub fn unregister(&self, execution: &Execution) -> bool {
        self.factories.remove(&factory_key(execution)).is_some()
    }

    /// Registered factory keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry").field("keys", &self.keys()).finish()
    }
}
