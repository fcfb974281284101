use std::sync::{Arc, OnceLock};
use tracing::{info, warn};
use crate::backends::{ColumnStoreFactory, Factory, FactoryRegistry, RowStoreFactory};
use crate::engine::backend_registry::BackendRegistry;
use crate::engine::builtins;
use crate::engine::extensions::{Accessor, ExtensionRegistry, TargetType};
use crate::engine::frame::{Frame, FrameKind};
use crate::utils::{
    config::{RuntimeConfig, COLUMNS_STORAGE_FORMAT, NATIVE_ENGINE},
    types::{Execution, Label, Table, Value},
    error::{BackendError, ConfigurationError, FrameResult, KernelError},
};

/// Owner of the backend, factory and extension registries.
///
/// Every frame holds the runtime it was created by, and all attribute
/// resolution and backend switching goes through it.
#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    backends: BackendRegistry,
    factories: FactoryRegistry,
    extensions: ExtensionRegistry,
}

static GLOBAL: OnceLock<Arc<Runtime>> = OnceLock::new();

/// Process-wide runtime, created on first use from the default configuration
/// and `FRAME_DISPATCH_BACKEND`
pub fn global() -> &'static Arc<Runtime> {
    GLOBAL.get_or_init(|| {
        let config = RuntimeConfig::default().with_env_overrides();
        Runtime::with_config(config).unwrap_or_else(|e| {
            warn!(error = %e, "invalid runtime configuration, using defaults");
            Runtime::new()
        })
    })
}

impl Runtime {
    /// Runtime with the default configuration
    pub fn new() -> Arc<Self> {
        Self::with_config(RuntimeConfig::default()).expect("default runtime configuration is valid")
    }

    /// Runtime with the built-in backends plus everything `config` declares
    pub fn with_config(config: RuntimeConfig) -> FrameResult<Arc<Self>> {
        config.validate()?;

        let runtime = Self {
            config,
            backends: BackendRegistry::new(),
            factories: FactoryRegistry::new(),
            extensions: ExtensionRegistry::new(),
        };

        for format in runtime.config.all_storage_formats() {
            runtime.backends.add_storage_format(&format)?;
        }
        for engine in runtime.config.all_engines() {
            runtime.backends.add_engine(&engine)?;
        }

        for backend in &runtime.config.backends {
            let execution = backend.execution();
            runtime.backends.register_backend(&backend.name, execution.clone())?;
            if !runtime.factories.contains(&execution) {
                runtime.factories.register(&execution, default_factory(&execution));
            }
        }
        runtime.install_builtin_backends()?;

        if !runtime.backends.contains(&runtime.config.default_backend) {
            return Err(ConfigurationError::UnknownDefaultBackend(runtime.config.default_backend.clone()).into());
        }

        info!(
            default_backend = %runtime.config.default_backend,
            backends = runtime.backends.len(),
            "runtime initialised"
        );
        Ok(Arc::new(runtime))
    }

    fn install_builtin_backends(&self) -> FrameResult<()> {
        for backend in RuntimeConfig::default().backends {
            if self.backends.contains(&backend.name) {
                continue;
            }
            let execution = backend.execution();
            self.backends.register_backend(&backend.name, execution.clone())?;
            if !self.factories.contains(&execution) {
                self.factories.register(&execution, default_factory(&execution));
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Backend new frames are bound to
    pub fn default_backend(&self) -> &str {
        &self.config.default_backend
    }

    /// Register an extension on DataFrame, for `backend` or for every backend
    pub fn register_dataframe_accessor(&self, name: &str, backend: Option<&str>) -> FrameResult<Accessor<'_>> {
        self.extensions.accessor(TargetType::DataFrame, name, backend)
    }

    /// Register an extension on Series, for `backend` or for every backend
    pub fn register_series_accessor(&self, name: &str, backend: Option<&str>) -> FrameResult<Accessor<'_>> {
        self.extensions.accessor(TargetType::Series, name, backend)
    }

    /// Register an extension shared by DataFrame and Series
    pub fn register_base_accessor(&self, name: &str, backend: Option<&str>) -> FrameResult<Accessor<'_>> {
        self.extensions.accessor(TargetType::Base, name, backend)
    }

    /// Add a backend together with the factory that builds its query compilers.
    ///
    /// The binding is checked before anything is added, so binding an existing
    /// name to another execution fails without registering its storage format,
    /// engine or factory.
    pub fn register_backend(&self, name: &str, execution: Execution, factory: Arc<dyn Factory>) -> FrameResult<()> {
        self.backends.check_binding(name, &execution)?;
        self.backends.add_storage_format(&execution.storage_format)?;
        self.backends.add_engine(&execution.engine)?;
        self.backends.register_backend(name, execution.clone())?;
        self.factories.register(&execution, factory);
        Ok(())
    }

    /// DataFrame holding `table` on the default backend
    pub fn dataframe(self: &Arc<Self>, table: Table) -> FrameResult<Frame> {
        self.frame_on(FrameKind::DataFrame, table, self.default_backend())
    }

    /// Series named `name` on the default backend
    pub fn series(self: &Arc<Self>, name: impl Into<Label>, values: Vec<Value>) -> FrameResult<Frame> {
        let mut table = Table::from_values(values);
        table.columns = vec![name.into()];
        self.frame_on(FrameKind::Series, table, self.default_backend())
    }

    /// Frame of `kind` holding `table`, built by the factory of `backend`
    pub fn frame_on(self: &Arc<Self>, kind: FrameKind, table: Table, backend: &str) -> FrameResult<Frame> {
        if kind == FrameKind::Series && table.num_columns() != 1 {
            return Err(KernelError::ShapeMismatch(format!(
                "a Series holds exactly one column, got {}",
                table.num_columns()
            ))
            .into());
        }

        let execution = self
            .backends
            .execution_for(backend)
            .ok_or_else(|| BackendError::UnknownBackend {
                name: backend.to_string(),
                available: self.backends.choices(),
            })?;
        let query_compiler = self.factories.get(&execution)?.from_table(table)?;
        Ok(Frame::from_parts(kind, backend.to_string(), query_compiler, Arc::clone(self)))
    }

    /// Whether `name` is defined on `kind` itself: a default attribute or an
    /// extension under any backend
    pub fn is_attribute_defined(&self, kind: FrameKind, name: &str) -> bool {
        builtins::lookup(kind, name).is_some()
            || self.extensions.is_registered(kind.target_type(), name)
            || self.extensions.is_registered(TargetType::Base, name)
    }
}

/// Factory used for configured backends that were not given one explicitly
fn default_factory(execution: &Execution) -> Arc<dyn Factory> {
    if execution == &Execution::new(COLUMNS_STORAGE_FORMAT, NATIVE_ENGINE) {
        Arc::new(ColumnStoreFactory::new())
    } else {
        Arc::new(RowStoreFactory::for_execution(execution.clone()))
    }
}

/// [`Runtime::register_dataframe_accessor`] on the global runtime
pub fn register_dataframe_accessor(name: &str, backend: Option<&str>) -> FrameResult<Accessor<'static>> {
    global().register_dataframe_accessor(name, backend)
}

/// [`Runtime::register_series_accessor`] on the global runtime
pub fn register_series_accessor(name: &str, backend: Option<&str>) -> FrameResult<Accessor<'static>> {
    global().register_series_accessor(name, backend)
}

/// [`Runtime::register_base_accessor`] on the global runtime
pub fn register_base_accessor(name: &str, backend: Option<&str>) -> FrameResult<Accessor<'static>> {
    global().register_base_accessor(name, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{
        config::{BackendConfig, COLUMNAR_BACKEND, NATIVE_BACKEND},
        FrameError, Object,
    };

    #[test]
    fn test_default_runtime() {
        let runtime = Runtime::new();
        assert_eq!(runtime.default_backend(), NATIVE_BACKEND);
        assert_eq!(
            runtime.backends().choices(),
            vec![COLUMNAR_BACKEND.to_string(), NATIVE_BACKEND.to_string()]
        );
        assert_eq!(runtime.factories().len(), 2);
        assert!(runtime.extensions().is_empty());
    }

    #[test]
    fn test_config_backends_get_a_factory() {
        let config = RuntimeConfig {
            default_backend: "Custom".to_string(),
            storage_formats: vec!["custom_rows".to_string()],
            engines: vec![],
            backends: vec![BackendConfig::new("Custom", "custom_rows", "native")],
        };
        let runtime = Runtime::with_config(config).unwrap();

        assert!(runtime.backends().contains(NATIVE_BACKEND));
        assert!(runtime.backends().contains(COLUMNAR_BACKEND));
        let df = runtime
            .dataframe(Table::from_values(vec![Value::Integer(1)]))
            .unwrap();
        assert_eq!(df.backend(), "Custom");
        assert_eq!(df.execution(), Execution::new("Custom_Rows", "Native"));
    }

    #[test]
    fn test_unknown_default_backend() {
        let config = RuntimeConfig::default().with_backend_override(Some("Missing".to_string()));
        assert!(matches!(
            Runtime::with_config(config),
            Err(FrameError::Configuration(_))
        ));
    }

    #[test]
    fn test_register_backend_adds_components() {
        let runtime = Runtime::new();
        let execution = Execution::new("Test1_storage_format", "Test1_engine");
        runtime
            .register_backend("Backend1", execution.clone(), Arc::new(RowStoreFactory::for_execution(execution.clone())))
            .unwrap();

        assert!(runtime.backends().has_storage_format("Test1_Storage_Format"));
        assert!(runtime.backends().has_engine("Test1_Engine"));
        assert_eq!(runtime.backends().execution_for("Backend1"), Some(execution.clone()));
        assert!(runtime.factories().contains(&execution));
    }

    #[test]
    fn test_series_requires_one_column() {
        let runtime = Runtime::new();
        let table = Table::new(
            vec![Label::Int(0), Label::Int(1)],
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
        )
        .unwrap();
        assert!(runtime.frame_on(FrameKind::Series, table, NATIVE_BACKEND).is_err());

        let series = runtime.series("s", vec![Value::Integer(1)]).unwrap();
        assert_eq!(series.get("name").unwrap(), Object::from("s"));
    }

    #[test]
    fn test_is_attribute_defined() {
        let runtime = Runtime::new();
        assert!(runtime.is_attribute_defined(FrameKind::DataFrame, "sum"));
        assert!(!runtime.is_attribute_defined(FrameKind::DataFrame, "new_method"));

        runtime
            .register_base_accessor("new_method", Some("Columnar"))
            .unwrap()
            .method(|_, _| Ok(Object::None));
        assert!(runtime.is_attribute_defined(FrameKind::DataFrame, "new_method"));
        assert!(runtime.is_attribute_defined(FrameKind::Series, "new_method"));
    }
}
