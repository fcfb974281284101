use std::sync::Arc;
use tracing::{debug, info};
use crate::engine::frame::Frame;
use crate::utils::error::{BackendError, FrameResult};

/// Equivalent copy of `frame` bound to `backend`.
///
/// The data is converted through the backend-neutral table by the factory
/// registered for the target execution. `frame` itself is left untouched.
pub fn switch_backend(frame: &Frame, backend: &str) -> FrameResult<Frame> {
    let runtime = frame.runtime();
    let execution = runtime
        .backends()
        .execution_for(backend)
        .ok_or_else(|| BackendError::UnknownBackend {
            name: backend.to_string(),
            available: runtime.backends().choices(),
        })?;

    if frame.backend() == backend {
        debug!(backend = %backend, kind = %frame.kind(), "frame already on requested backend");
        return Ok(frame.clone());
    }

    let factory = runtime.factories().get(&execution)?;
    let query_compiler = factory.from_table(frame.to_table())?;

    info!(
        kind = %frame.kind(),
        from = %frame.backend(),
        to = %backend,
        execution = %execution,
        "switched backend"
    );
    Ok(Frame::from_parts(
        frame.kind(),
        backend.to_string(),
        query_compiler,
        Arc::clone(runtime),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::runtime::Runtime;
    use crate::utils::{
        config::{COLUMNAR_BACKEND, NATIVE_BACKEND},
        types::{Execution, Label, Table, Value},
        FrameError,
    };

    fn frame() -> Frame {
        let table = Table::new(vec![Label::from("v")], vec![vec![Value::Integer(1), Value::Null]]).unwrap();
        Runtime::new().dataframe(table).unwrap()
    }

    #[test]
    fn test_switch_converts_storage() {
        let df = frame();
        let switched = switch_backend(&df, COLUMNAR_BACKEND).unwrap();

        assert_eq!(switched.backend(), COLUMNAR_BACKEND);
        assert_eq!(switched.execution(), Execution::new("Columns", "Native"));
        assert_eq!(switched.to_table(), df.to_table());
        assert_eq!(df.backend(), NATIVE_BACKEND);
        assert_eq!(df.execution(), Execution::new("Rows", "Native"));
    }

    #[test]
    fn test_switch_to_unknown_backend() {
        let df = frame();
        match switch_backend(&df, "Nope") {
            Err(FrameError::Backend(BackendError::UnknownBackend { name, available })) => {
                assert_eq!(name, "Nope");
                assert_eq!(available, vec![COLUMNAR_BACKEND.to_string(), NATIVE_BACKEND.to_string()]);
            }
            other => panic!("Expected UnknownBackend error, got {:?}", other),
        }
    }

    #[test]
    fn test_switch_to_same_backend_copies() {
        let df = frame();
        let same = switch_backend(&df, NATIVE_BACKEND).unwrap();
        assert_eq!(same.backend(), NATIVE_BACKEND);
        assert_eq!(same, df);
    }
}
