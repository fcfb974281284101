use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};
use crate::utils::{
    types::{normalize_component, Execution},
    error::{ConfigurationError, FrameResult},
};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid name pattern"));

fn validate_name(kind: &str, name: &str) -> FrameResult<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidName(format!("{} name '{}' is not a valid identifier", kind, name)).into())
    }
}

/// Registry of storage formats, engines, and the backends built from them
#[derive(Debug, Default)]
pub struct BackendRegistry {
    storage_formats: DashSet<String>,
    engines: DashSet<String>,
    backends: DashMap<String, Execution>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a valid storage format. Re-adding is a no-op. Returns the normalised name.
    pub fn add_storage_format(&self, name: &str) -> FrameResult<String> {
        validate_name("Storage format", name)?;
        let normalized = normalize_component(name);
        if self.storage_formats.insert(normalized.clone()) {
            debug!(storage_format = %normalized, "added storage format");
        }
        Ok(normalized)
    }

    /// Add a valid engine. Re-adding is a no-op. Returns the normalised name.
    pub fn add_engine(&self, name: &str) -> FrameResult<String> {
        validate_name("Engine", name)?;
        let normalized = normalize_component(name);
        if self.engines.insert(normalized.clone()) {
            debug!(engine = %normalized, "added engine");
        }
        Ok(normalized)
    }

    pub fn has_storage_format(&self, name: &str) -> bool {
        self.storage_formats.contains(&normalize_component(name))
    }

    pub fn has_engine(&self, name: &str) -> bool {
        self.engines.contains(&normalize_component(name))
    }

    /// Fail if `name` or a component of `execution` is not a valid identifier,
    /// or if `name` is already bound to a different execution. Changes nothing.
    pub fn check_binding(&self, name: &str, execution: &Execution) -> FrameResult<()> {
        validate_name("Backend", name)?;
        validate_name("Storage format", &execution.storage_format)?;
        validate_name("Engine", &execution.engine)?;
        match self.backends.get(name) {
            Some(existing) if existing.value() != execution => Err(ConfigurationError::ConflictingBackend {
                name: name.to_string(),
                existing: existing.value().clone(),
                requested: execution.clone(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    /// Bind a backend name to an execution.
    ///
    /// Binding the same name to the same execution again is a no-op; binding it
    /// to a different one is a configuration error. Both components must have
    /// been added beforehand.
    pub fn register_backend(&self, name: &str, execution: Execution) -> FrameResult<()> {
        validate_name("Backend", name)?;
        if !self.storage_formats.contains(&execution.storage_format) {
            return Err(ConfigurationError::UnknownStorageFormat(execution.storage_format).into());
        }
        if !self.engines.contains(&execution.engine) {
            return Err(ConfigurationError::UnknownEngine(execution.engine).into());
        }

        match self.backends.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                if existing.get() != &execution {
                    return Err(ConfigurationError::ConflictingBackend {
                        name: name.to_string(),
                        existing: existing.get().clone(),
                        requested: execution,
                    }
                    .into());
                }
            }
            Entry::Vacant(slot) => {
                info!(backend = %name, execution = %execution, "registered backend");
                slot.insert(execution);
            }
        }
        Ok(())
    }

    /// Valid backend names, sorted
    pub fn choices(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Check if a backend name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Execution bound to a backend name
    pub fn execution_for(&self, name: &str) -> Option<Execution> {
        self.backends.get(name).map(|e| e.value().clone())
    }

    /// Backend name bound to an execution. If several names share one
    /// execution the alphabetically first is returned.
    pub fn backend_for(&self, execution: &Execution) -> Option<String> {
        self.backends
            .iter()
            .filter(|e| e.value() == execution)
            .map(|e| e.key().clone())
            .min()
    }

    /// Registered storage formats, sorted
    pub fn storage_formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self.storage_formats.iter().map(|f| f.key().clone()).collect();
        formats.sort();
        formats
    }

    /// Registered engines, sorted
    pub fn engines(&self) -> Vec<String> {
        let mut engines: Vec<String> = self.engines.iter().map(|e| e.key().clone()).collect();
        engines.sort();
        engines
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
