use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::utils::error::{ConfigurationError, FrameResult};
use crate::utils::types::{normalize_component, Execution};

/// Environment variable overriding the default backend
pub const BACKEND_ENV_VAR: &str = "FRAME_DISPATCH_BACKEND";

pub const ROWS_STORAGE_FORMAT: &str = "Rows";
pub const COLUMNS_STORAGE_FORMAT: &str = "Columns";
pub const NATIVE_ENGINE: &str = "Native";

pub const NATIVE_BACKEND: &str = "Native";
pub const COLUMNAR_BACKEND: &str = "Columnar";

/// Runtime configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Backend new frames are bound to
    pub default_backend: String,
    /// Storage formats registered in addition to the built-in ones
    #[serde(default)]
    pub storage_formats: Vec<String>,
    /// Engines registered in addition to the built-in ones
    #[serde(default)]
    pub engines: Vec<String>,
    /// Named backends
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// A named backend declared in configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendConfig {
    pub name: String,
    pub storage_format: String,
    pub engine: String,
}

impl BackendConfig {
    pub fn new(name: &str, storage_format: &str, engine: &str) -> Self {
        Self {
            name: name.to_string(),
            storage_format: storage_format.to_string(),
            engine: engine.to_string(),
        }
    }

    pub fn execution(&self) -> Execution {
        Execution::new(&self.storage_format, &self.engine)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_backend: NATIVE_BACKEND.to_string(),
            storage_formats: Vec::new(),
            engines: Vec::new(),
            backends: vec![
                BackendConfig::new(NATIVE_BACKEND, ROWS_STORAGE_FORMAT, NATIVE_ENGINE),
                BackendConfig::new(COLUMNAR_BACKEND, COLUMNS_STORAGE_FORMAT, NATIVE_ENGINE),
            ],
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. The built-in `Native` and `Columnar`
    /// backends are always available and need not be declared.
    pub fn from_json_str(json: &str) -> FrameResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ConfigurationError::InvalidConfig(format!("Failed to parse configuration: {}", e)).into())
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> FrameResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Apply `FRAME_DISPATCH_BACKEND` if it is set
    pub fn with_env_overrides(self) -> Self {
        let backend = std::env::var(BACKEND_ENV_VAR).ok();
        self.with_backend_override(backend)
    }

    /// Replace the default backend when an override is present and non-empty
    pub fn with_backend_override(mut self, backend: Option<String>) -> Self {
        if let Some(backend) = backend.filter(|b| !b.trim().is_empty()) {
            self.default_backend = backend.trim().to_string();
        }
        self
    }

    /// Built-in storage formats plus the configured ones, normalised
    pub fn all_storage_formats(&self) -> Vec<String> {
        let mut formats = vec![ROWS_STORAGE_FORMAT.to_string(), COLUMNS_STORAGE_FORMAT.to_string()];
        for format in self.storage_formats.iter().map(|f| normalize_component(f)) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    /// Built-in engines plus the configured ones, normalised
    pub fn all_engines(&self) -> Vec<String> {
        let mut engines = vec![NATIVE_ENGINE.to_string()];
        for engine in self.engines.iter().map(|e| normalize_component(e)) {
            if !engines.contains(&engine) {
                engines.push(engine);
            }
        }
        engines
    }

    /// Check the configuration is self-consistent
    pub fn validate(&self) -> FrameResult<()> {
        let formats = self.all_storage_formats();
        let engines = self.all_engines();

        for backend in &self.backends {
            let execution = backend.execution();
            if !formats.contains(&execution.storage_format) {
                return Err(ConfigurationError::UnknownStorageFormat(format!(
                    "'{}' used by backend '{}'",
                    backend.storage_format, backend.name
                ))
                .into());
            }
            if !engines.contains(&execution.engine) {
                return Err(ConfigurationError::UnknownEngine(format!(
                    "'{}' used by backend '{}'",
                    backend.engine, backend.name
                ))
                .into());
            }
        }

        let mut names: Vec<&str> = self.backends.iter().map(|b| b.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ConfigurationError::InvalidConfig(format!(
                "Backend '{}' is declared more than once",
                pair[0]
            ))
            .into());
        }

        let builtin = [NATIVE_BACKEND, COLUMNAR_BACKEND].contains(&self.default_backend.as_str());
        if !builtin && !self.backends.iter().any(|b| b.name == self.default_backend) {
            return Err(ConfigurationError::UnknownDefaultBackend(self.default_backend.clone()).into());
        }

        Ok(())
    }
}
