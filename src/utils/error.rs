use thiserror::Error;
use crate::utils::types::Execution;

/// Main error type for frame dispatch
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Attribute error: {0}")]
    Attribute(#[from] AttributeError),

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Extension registration errors
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Cannot register an extension with the reserved name {0}.")]
    ReservedName(String),
}

/// Backend switching errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Unknown backend '{name}'. Available backends: {available:?}")]
    UnknownBackend {
        name: String,
        available: Vec<String>,
    },
}

/// Backend, factory and configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Backend '{name}' is already bound to {existing}, cannot rebind it to {requested}")]
    ConflictingBackend {
        name: String,
        existing: Execution,
        requested: Execution,
    },

    #[error("Unknown storage format: {0}")]
    UnknownStorageFormat(String),

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("No factory registered for '{0}'")]
    MissingFactory(String),

    #[error("Factory '{key}' failed to prepare: {reason}")]
    FactoryPreparation {
        key: String,
        reason: String,
    },

    #[error("Default backend '{0}' is not declared")]
    UnknownDefaultBackend(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Attribute resolution errors
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("'{owner}' object has no attribute '{name}'")]
    NotFound {
        owner: String,
        name: String,
    },

    #[error("Attribute '{0}' is not readable")]
    NotReadable(String),

    #[error("Attribute '{0}' is not settable")]
    NotSettable(String),

    #[error("Attribute '{0}' is not deletable")]
    NotDeletable(String),

    #[error("Attribute '{0}' is not callable")]
    NotCallable(String),

    #[error("Attribute '{0}' is a method and must be called")]
    IsMethod(String),
}

/// Errors raised by the default kernels
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl FrameError {
    /// Whether this error means the attribute does not exist at all
    pub fn is_attribute_not_found(&self) -> bool {
        matches!(self, FrameError::Attribute(AttributeError::NotFound { .. }))
    }

    /// Whether this error corresponds to a bad value handed to the API
    pub fn is_value_error(&self) -> bool {
        matches!(self, FrameError::Registration(_) | FrameError::Backend(_))
    }

    /// Whether this error is any kind of attribute error
    pub fn is_attribute_error(&self) -> bool {
        matches!(self, FrameError::Attribute(_))
    }
}

/// Result type alias for frame dispatch operations
pub type FrameResult<T> = Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_from_registration_error() {
        let error: FrameError = RegistrationError::ReservedName("set_backend".to_string()).into();

        match &error {
            FrameError::Registration(RegistrationError::ReservedName(name)) => {
                assert_eq!(name, "set_backend");
            }
            _ => panic!("Expected Registration error"),
        }
        assert!(error.is_value_error());
        assert!(error
            .to_string()
            .contains("Cannot register an extension with the reserved name set_backend."));
    }

    #[test]
    fn test_frame_error_from_attribute_error() {
        let error: FrameError = AttributeError::NotFound {
            owner: "DataFrame".to_string(),
            name: "missing".to_string(),
        }
        .into();

        assert!(error.is_attribute_not_found());
        assert!(error.is_attribute_error());
        assert!(error.to_string().contains("'DataFrame' object has no attribute 'missing'"));
    }

    #[test]
    fn test_capability_errors_are_not_not_found() {
        let error: FrameError = AttributeError::NotSettable("prop".to_string()).into();
        assert!(error.is_attribute_error());
        assert!(!error.is_attribute_not_found());
    }

    #[test]
    fn test_conflicting_backend_display() {
        let error = ConfigurationError::ConflictingBackend {
            name: "Fast".to_string(),
            existing: Execution::new("Rows", "Native"),
            requested: Execution::new("Columns", "Native"),
        };
        let message = error.to_string();
        assert!(message.contains("Fast"));
        assert!(message.contains("Rows on Native"));
        assert!(message.contains("Columns on Native"));
    }

    #[test]
    fn test_unknown_backend_display() {
        let error: FrameError = BackendError::UnknownBackend {
            name: "Nope".to_string(),
            available: vec!["Native".to_string()],
        }
        .into();
        assert!(error.is_value_error());
        assert!(error.to_string().contains("Unknown backend 'Nope'"));
    }
}
