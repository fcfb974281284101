use frame_dispatch::{
    BackendConfig, ConfigurationError, Execution, FrameError, Runtime, RuntimeConfig, Table, Value,
    COLUMNAR_BACKEND, NATIVE_BACKEND,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_runtime_from_config_file() {
    let file = write_config(
        r#"{
            "default_backend": "Backend1",
            "storage_formats": ["Test1_storage_format"],
            "engines": ["Test1_engine"],
            "backends": [
                {"name": "Backend1", "storage_format": "Test1_storage_format", "engine": "Test1_engine"}
            ]
        }"#,
    );

    let config = RuntimeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.backends, vec![BackendConfig::new("Backend1", "Test1_storage_format", "Test1_engine")]);

    let runtime = Runtime::with_config(config).unwrap();
    assert_eq!(runtime.default_backend(), "Backend1");
    assert_eq!(
        runtime.backends().choices(),
        vec!["Backend1".to_string(), COLUMNAR_BACKEND.to_string(), NATIVE_BACKEND.to_string()]
    );

    let df = runtime.dataframe(Table::from_values(vec![Value::Integer(1)])).unwrap();
    assert_eq!(df.get_backend(), "Backend1");
    assert_eq!(df.execution(), Execution::new("Test1_Storage_Format", "Test1_Engine"));
}

#[test]
fn test_minimal_config_keeps_builtin_backends() {
    let config = RuntimeConfig::from_json_str(r#"{"default_backend": "Columnar"}"#).unwrap();
    let runtime = Runtime::with_config(config).unwrap();

    assert_eq!(runtime.default_backend(), COLUMNAR_BACKEND);
    assert!(runtime.backends().contains(NATIVE_BACKEND));
    let df = runtime.dataframe(Table::from_values(vec![Value::Integer(1)])).unwrap();
    assert_eq!(df.execution(), Execution::new("Columns", "Native"));
}

#[test]
fn test_backend_override() {
    let config = RuntimeConfig::default().with_backend_override(Some(COLUMNAR_BACKEND.to_string()));
    let runtime = Runtime::with_config(config).unwrap();
    assert_eq!(runtime.default_backend(), COLUMNAR_BACKEND);

    let config = RuntimeConfig::default().with_backend_override(Some("  ".to_string()));
    assert_eq!(config.default_backend, NATIVE_BACKEND);
}

#[test]
fn test_invalid_config_file() {
    let file = write_config("{ not json");
    assert!(matches!(
        RuntimeConfig::from_file(file.path()),
        Err(FrameError::Configuration(ConfigurationError::InvalidConfig(_)))
    ));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(matches!(
        RuntimeConfig::from_file(&missing),
        Err(FrameError::Configuration(ConfigurationError::InvalidConfig(_)))
    ));
}

#[test]
fn test_undeclared_engine_rejected() {
    let config = RuntimeConfig::from_json_str(
        r#"{
            "default_backend": "Native",
            "backends": [{"name": "Gpu", "storage_format": "Rows", "engine": "Cuda"}]
        }"#,
    )
    .unwrap();

    assert!(matches!(
        Runtime::with_config(config),
        Err(FrameError::Configuration(ConfigurationError::UnknownEngine(_)))
    ));
}

#[test]
fn test_unknown_default_backend_rejected() {
    let config = RuntimeConfig::from_json_str(r#"{"default_backend": "Nowhere"}"#).unwrap();
    assert!(matches!(Runtime::with_config(config), Err(FrameError::Configuration(_))));
}
