use std::fmt;
use tracing::debug;
use crate::engine::builtins::{self, Builtin, BuiltinMethod};
use crate::engine::extensions::{is_reserved, Extension, MethodFn, Scope, TargetType};
use crate::engine::frame::{Frame, FrameKind};
use crate::engine::runtime::Runtime;
use crate::utils::{
    types::{Label, Object},
    error::{AttributeError, FrameResult},
};

/// Methods reached through fixed entry points on [`Frame`] rather than by name
pub const SPECIAL_METHODS: &[&str] = &["__len__", "__repr__", "__str__", "__contains__", "__getitem__", "__eq__"];

pub fn is_special(name: &str) -> bool {
    SPECIAL_METHODS.contains(&name)
}

#[derive(Clone)]
pub enum Callable {
    Extension(MethodFn),
    Builtin(BuiltinMethod),
}

/// A method together with the frame it was looked up on
#[derive(Clone)]
pub struct BoundMethod<'a> {
    receiver: &'a Frame,
    name: String,
    callable: Callable,
}

impl<'a> BoundMethod<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> &'a Frame {
        self.receiver
    }

    pub fn is_extension(&self) -> bool {
        matches!(self.callable, Callable::Extension(_))
    }

    pub fn call(&self, args: &[Object]) -> FrameResult<Object> {
        match &self.callable {
            Callable::Extension(method) => method(self.receiver, args),
            Callable::Builtin(method) => method(self.receiver, args),
        }
    }
}

impl fmt::Debug for BoundMethod<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("name", &self.name)
            .field("extension", &self.is_extension())
            .finish()
    }
}

/// Result of an attribute lookup
#[derive(Debug, Clone)]
pub enum Attribute<'a> {
    Value(Object),
    Method(BoundMethod<'a>),
}

impl<'a> Attribute<'a> {
    /// The value, or `IsMethod` if the attribute is a method
    pub fn into_value(self) -> FrameResult<Object> {
        match self {
            Attribute::Value(value) => Ok(value),
            Attribute::Method(method) => Err(AttributeError::IsMethod(method.name).into()),
        }
    }

    /// Call a method attribute. Values are not callable.
    pub fn call(self, name: &str, args: &[Object]) -> FrameResult<Object> {
        match self {
            Attribute::Method(method) => method.call(args),
            Attribute::Value(_) => Err(AttributeError::NotCallable(name.to_string()).into()),
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Attribute::Method(_))
    }
}

/// First extension matching `name` for a `target` frame bound to `backend`
pub fn find_extension(runtime: &Runtime, target: TargetType, backend: &str, name: &str) -> Option<Extension> {
    let bound = Scope::Backend(backend.to_string());
    let extensions = runtime.extensions();

    let found = [
        (target, &bound),
        (target, &Scope::Global),
        (TargetType::Base, &bound),
        (TargetType::Base, &Scope::Global),
    ]
    .into_iter()
    .find_map(|(target, scope)| extensions.lookup(target, scope, name));
    found
}

fn not_found(frame: &Frame, name: &str) -> AttributeError {
    AttributeError::NotFound {
        owner: frame.kind().to_string(),
        name: name.to_string(),
    }
}

/// Resolve `name` on `frame`.
///
/// Extensions are tried at `(T, B)`, `(T, global)`, `(Base, B)`, `(Base, global)`,
/// then the default attributes of the kind, then private `_` slots, and for
/// DataFrames a column among the frame's resolved `columns`. A property getter
/// failing with `NotFound` defers to the rest of the chain; any other getter
/// error is returned as is.
pub fn get_attr<'a>(frame: &'a Frame, name: &str) -> FrameResult<Attribute<'a>> {
    if let Some(extension) = find_extension(frame.runtime(), frame.target_type(), frame.backend(), name) {
        match extension {
            Extension::Method(method) => {
                return Ok(Attribute::Method(BoundMethod {
                    receiver: frame,
                    name: name.to_string(),
                    callable: Callable::Extension(method),
                }))
            }
            Extension::Value(value) => return Ok(Attribute::Value(value)),
            Extension::Property(property) => {
                let getter = property
                    .getter()
                    .ok_or_else(|| AttributeError::NotReadable(name.to_string()))?;
                match getter(frame) {
                    Ok(value) => return Ok(Attribute::Value(value)),
                    Err(e) if e.is_attribute_not_found() => {
                        debug!(name = %name, backend = %frame.backend(), "extension getter deferred to default lookup");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    match builtins::lookup(frame.kind(), name) {
        Some(Builtin::Method(method)) => {
            return Ok(Attribute::Method(BoundMethod {
                receiver: frame,
                name: name.to_string(),
                callable: Callable::Builtin(method),
            }))
        }
        Some(Builtin::Property { get, .. }) => return get(frame).map(Attribute::Value),
        None => {}
    }

    if let Some(value) = frame.slot(name) {
        return Ok(Attribute::Value(value.clone()));
    }

    if frame.kind() == FrameKind::DataFrame && name != "columns" && !name.starts_with('_') {
        let label = Label::from(name);
        if frame.resolved_columns()?.contains(&label) {
            if let Some(series) = frame.try_column_series(&label)? {
                return Ok(Attribute::Value(Object::Frame(series)));
            }
        }
    }

    Err(not_found(frame, name).into())
}

pub fn set_attr(frame: &mut Frame, name: &str, value: Object) -> FrameResult<()> {
    if let Some(extension) = find_extension(frame.runtime(), frame.target_type(), frame.backend(), name) {
        return match extension {
            Extension::Property(property) => match property.setter() {
                Some(setter) => setter(frame, value),
                None => Err(AttributeError::NotSettable(name.to_string()).into()),
            },
            _ => Err(AttributeError::NotSettable(name.to_string()).into()),
        };
    }

    match builtins::lookup(frame.kind(), name) {
        Some(Builtin::Property { set: Some(set), .. }) => set(frame, value),
        Some(_) => Err(AttributeError::NotSettable(name.to_string()).into()),
        None if is_reserved(name) => Err(AttributeError::NotSettable(name.to_string()).into()),
        None if name.starts_with('_') => {
            debug!(name = %name, "stored private attribute");
            frame.set_slot(name, value);
            Ok(())
        }
        None => Err(not_found(frame, name).into()),
    }
}

pub fn del_attr(frame: &mut Frame, name: &str) -> FrameResult<()> {
    if let Some(extension) = find_extension(frame.runtime(), frame.target_type(), frame.backend(), name) {
        return match extension {
            Extension::Property(property) => match property.deleter() {
                Some(deleter) => deleter(frame),
                None => Err(AttributeError::NotDeletable(name.to_string()).into()),
            },
            _ => Err(AttributeError::NotDeletable(name.to_string()).into()),
        };
    }

    if frame.remove_slot(name).is_some() {
        return Ok(());
    }
    if builtins::lookup(frame.kind(), name).is_some() {
        return Err(AttributeError::NotDeletable(name.to_string()).into());
    }
    Err(not_found(frame, name).into())
}

/// Run the default attribute `name`, ignoring every extension
pub fn call_builtin(frame: &Frame, name: &str, args: &[Object]) -> FrameResult<Object> {
    match builtins::lookup(frame.kind(), name) {
        Some(Builtin::Method(method)) => method(frame, args),
        Some(Builtin::Property { get, .. }) if args.is_empty() => get(frame),
        Some(Builtin::Property { .. }) => Err(AttributeError::NotCallable(name.to_string()).into()),
        None => Err(not_found(frame, name).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::extensions::Property;
    use crate::utils::{types::Value, FrameError, Table};

    fn frame() -> Frame {
        let runtime = Runtime::new();
        let table = Table::new(
            vec![Label::from("a"), Label::from("b")],
            vec![vec![Value::Integer(1), Value::Integer(2)], vec![Value::Integer(3), Value::Integer(4)]],
        )
        .unwrap();
        runtime.dataframe(table).unwrap()
    }

    #[test]
    fn test_special_methods() {
        assert!(is_special("__len__"));
        assert!(!is_special("__init__"));
        assert!(!is_special("sum"));
    }

    #[test]
    fn test_backend_scope_beats_global_and_base() {
        let df = frame();
        let runtime = df.runtime();
        runtime.extensions().register(TargetType::Base, "x", None, Object::from("base")).unwrap();
        assert_eq!(get_attr(&df, "x").unwrap().into_value().unwrap(), Object::from("base"));

        runtime.extensions().register(TargetType::Base, "x", Some("Native"), Object::from("base-native")).unwrap();
        assert_eq!(get_attr(&df, "x").unwrap().into_value().unwrap(), Object::from("base-native"));

        runtime.extensions().register(TargetType::DataFrame, "x", None, Object::from("frame")).unwrap();
        assert_eq!(get_attr(&df, "x").unwrap().into_value().unwrap(), Object::from("frame"));

        runtime.extensions().register(TargetType::DataFrame, "x", Some("Native"), Object::from("frame-native")).unwrap();
        assert_eq!(get_attr(&df, "x").unwrap().into_value().unwrap(), Object::from("frame-native"));
    }

    #[test]
    fn test_other_backend_scope_is_invisible() {
        let df = frame();
        df.runtime()
            .extensions()
            .register(TargetType::DataFrame, "x", Some("Columnar"), Object::from(1))
            .unwrap();
        assert!(matches!(get_attr(&df, "x"), Err(e) if e.is_attribute_not_found()));
    }

    #[test]
    fn test_getter_not_found_falls_through() {
        let df = frame();
        df.runtime()
            .extensions()
            .register(
                TargetType::DataFrame,
                "sum",
                None,
                Property::readonly(|frame| {
                    Err(AttributeError::NotFound {
                        owner: frame.kind().to_string(),
                        name: "sum".to_string(),
                    }
                    .into())
                }),
            )
            .unwrap();

        let attribute = get_attr(&df, "sum").unwrap();
        assert!(attribute.is_method());
    }

    #[test]
    fn test_getter_other_errors_propagate() {
        let df = frame();
        df.runtime()
            .extensions()
            .register(
                TargetType::DataFrame,
                "broken",
                None,
                Property::readonly(|_| Err(FrameError::Internal("boom".to_string()))),
            )
            .unwrap();

        assert!(matches!(get_attr(&df, "broken"), Err(FrameError::Internal(_))));
    }

    #[test]
    fn test_property_without_getter_is_not_readable() {
        let df = frame();
        df.runtime()
            .extensions()
            .register(TargetType::DataFrame, "write_only", None, Property::new().with_setter(|_, _| Ok(())))
            .unwrap();

        assert!(matches!(
            get_attr(&df, "write_only"),
            Err(FrameError::Attribute(AttributeError::NotReadable(_)))
        ));
    }

    #[test]
    fn test_private_slots() {
        let mut df = frame();
        set_attr(&mut df, "_cache", Object::from(3)).unwrap();
        assert_eq!(get_attr(&df, "_cache").unwrap().into_value().unwrap(), Object::from(3));

        del_attr(&mut df, "_cache").unwrap();
        assert!(matches!(get_attr(&df, "_cache"), Err(e) if e.is_attribute_not_found()));
        assert!(matches!(del_attr(&mut df, "_cache"), Err(e) if e.is_attribute_not_found()));
    }

    #[test]
    fn test_set_unknown_public_attribute_fails() {
        let mut df = frame();
        assert!(matches!(set_attr(&mut df, "unknown", Object::from(1)), Err(e) if e.is_attribute_not_found()));
        assert!(matches!(
            set_attr(&mut df, "_query_compiler", Object::None),
            Err(FrameError::Attribute(AttributeError::NotSettable(_)))
        ));
    }

    #[test]
    fn test_builtin_capabilities() {
        let mut df = frame();
        assert!(matches!(
            set_attr(&mut df, "index", Object::None),
            Err(FrameError::Attribute(AttributeError::NotSettable(_)))
        ));
        assert!(matches!(
            del_attr(&mut df, "columns"),
            Err(FrameError::Attribute(AttributeError::NotDeletable(_)))
        ));
    }

    #[test]
    fn test_column_lookup() {
        let df = frame();
        let column = get_attr(&df, "b").unwrap().into_value().unwrap().into_frame().unwrap();
        assert_eq!(column.kind(), FrameKind::Series);
        assert_eq!(column.to_table().data, vec![vec![Value::Integer(3), Value::Integer(4)]]);
    }

    #[test]
    fn test_call_builtin_ignores_extensions() {
        let df = frame();
        df.runtime()
            .register_dataframe_accessor("__len__", None)
            .unwrap()
            .method(|_, _| Ok(Object::from(-1)));

        assert_eq!(call_builtin(&df, "__len__", &[]).unwrap(), Object::from(2));
        assert!(matches!(call_builtin(&df, "index", &[Object::from(1)]), Err(FrameError::Attribute(AttributeError::NotCallable(_)))));
        assert!(matches!(call_builtin(&df, "missing", &[]), Err(e) if e.is_attribute_not_found()));
    }

    #[test]
    fn test_values_are_not_callable() {
        let df = frame();
        let attribute = get_attr(&df, "index").unwrap();
        assert!(matches!(
            attribute.call("index", &[]),
            Err(FrameError::Attribute(AttributeError::NotCallable(_)))
        ));

        let method = get_attr(&df, "sum").unwrap();
        assert!(matches!(method.into_value(), Err(FrameError::Attribute(AttributeError::IsMethod(_)))));
    }
}
