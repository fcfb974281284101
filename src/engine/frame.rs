use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use crate::backends::QueryCompiler;
use crate::engine::extensions::TargetType;
use crate::engine::resolver::{self, Attribute};
use crate::engine::runtime::Runtime;
use crate::engine::switcher;
use crate::utils::{
    types::{Execution, Label, Object, Table, Value},
    error::{FrameResult, KernelError},
};

/// The two kinds of frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    DataFrame,
    Series,
}

impl FrameKind {
    /// Extension table target for this kind
    pub fn target_type(self) -> TargetType {
        match self {
            FrameKind::DataFrame => TargetType::DataFrame,
            FrameKind::Series => TargetType::Series,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::DataFrame => write!(f, "DataFrame"),
            FrameKind::Series => write!(f, "Series"),
        }
    }
}

/// A DataFrame or Series bound to a backend.
///
/// Attribute access goes through [`Frame::get_attr`], [`Frame::set_attr`] and
/// [`Frame::del_attr`], which consult the runtime's extension table for the
/// frame's current backend before the default attributes.
#[derive(Clone)]
pub struct Frame {
    kind: FrameKind,
    backend: String,
    query_compiler: Box<dyn QueryCompiler>,
    slots: HashMap<String, Object>,
    runtime: Arc<Runtime>,
}

impl Frame {
    pub(crate) fn from_parts(
        kind: FrameKind,
        backend: String,
        query_compiler: Box<dyn QueryCompiler>,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            kind,
            backend,
            query_compiler,
            slots: HashMap::new(),
            runtime,
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn target_type(&self) -> TargetType {
        self.kind.target_type()
    }

    /// Name of the backend this frame is bound to
    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn get_backend(&self) -> &str {
        self.backend()
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn query_compiler(&self) -> &dyn QueryCompiler {
        self.query_compiler.as_ref()
    }

    pub fn query_compiler_mut(&mut self) -> &mut dyn QueryCompiler {
        self.query_compiler.as_mut()
    }

    pub fn execution(&self) -> Execution {
        self.query_compiler.execution()
    }

    /// Backend-neutral copy of the frame's content
    pub fn to_table(&self) -> Table {
        self.query_compiler.to_table()
    }

    pub fn get_attr(&self, name: &str) -> FrameResult<Attribute<'_>> {
        resolver::get_attr(self, name)
    }

    /// Value of a non-method attribute
    pub fn get(&self, name: &str) -> FrameResult<Object> {
        self.get_attr(name)?.into_value()
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<Object>) -> FrameResult<()> {
        resolver::set_attr(self, name, value.into())
    }

    pub fn del_attr(&mut self, name: &str) -> FrameResult<()> {
        resolver::del_attr(self, name)
    }

    /// Whether `name` resolves. Errors other than attribute errors propagate.
    pub fn has_attr(&self, name: &str) -> FrameResult<bool> {
        match self.get_attr(name) {
            Ok(_) => Ok(true),
            Err(e) if e.is_attribute_error() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Resolve `name` and call it
    pub fn call(&self, name: &str, args: &[Object]) -> FrameResult<Object> {
        self.get_attr(name)?.call(name, args)
    }

    /// Call the default implementation of `name`, skipping extensions
    pub fn call_builtin(&self, name: &str, args: &[Object]) -> FrameResult<Object> {
        resolver::call_builtin(self, name, args)
    }

    /// Number of rows, through `__len__`
    pub fn len(&self) -> FrameResult<usize> {
        let length = self.call("__len__", &[])?.as_i64()?;
        usize::try_from(length)
            .map_err(|_| KernelError::InvalidArgument(format!("__len__ returned {}", length)).into())
    }

    pub fn is_empty(&self) -> FrameResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Text representation, through `__repr__`
    pub fn repr(&self) -> FrameResult<String> {
        Ok(self.call("__repr__", &[])?.as_text()?.to_string())
    }

    /// Membership test, through `__contains__`
    pub fn contains(&self, key: impl Into<Object>) -> FrameResult<bool> {
        self.call("__contains__", &[key.into()])?.as_bool()
    }

    /// Item access, through `__getitem__`
    pub fn get_item(&self, key: impl Into<Object>) -> FrameResult<Object> {
        self.call("__getitem__", &[key.into()])
    }

    /// Copy of this frame converted to `backend`
    pub fn set_backend(&self, backend: &str) -> FrameResult<Frame> {
        switcher::switch_backend(self, backend)
    }

    pub fn move_to(&self, backend: &str) -> FrameResult<Frame> {
        self.set_backend(backend)
    }

    /// Convert this frame to `backend` in place, keeping its private slots
    pub fn set_backend_inplace(&mut self, backend: &str) -> FrameResult<()> {
        let converted = switcher::switch_backend(self, backend)?;
        self.query_compiler = converted.query_compiler;
        self.backend = converted.backend;
        Ok(())
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&Object> {
        self.slots.get(name)
    }

    pub(crate) fn set_slot(&mut self, name: &str, value: Object) {
        self.slots.insert(name.to_string(), value);
    }

    pub(crate) fn remove_slot(&mut self, name: &str) -> Option<Object> {
        self.slots.remove(name)
    }

    /// Column labels as seen through attribute resolution, so a `columns`
    /// extension is honoured
    pub fn resolved_columns(&self) -> FrameResult<Vec<Label>> {
        self.get("columns")?.into_labels()
    }

    pub(crate) fn try_column_series(&self, label: &Label) -> FrameResult<Option<Frame>> {
        let values = match self.query_compiler.column(label) {
            Some(values) => values,
            None => return Ok(None),
        };
        let table = Table::with_index(vec![label.clone()], self.query_compiler.index(), vec![values])?;
        self.derive(FrameKind::Series, table).map(Some)
    }

    /// One column as a Series on the same backend
    pub fn column_series(&self, label: &Label) -> FrameResult<Frame> {
        self.try_column_series(label)?
            .ok_or_else(|| KernelError::MissingColumn(label.to_string()).into())
    }

    /// Same kind and same logical content, whatever the backend
    pub(crate) fn same_content(&self, other: &Frame) -> bool {
        self.kind == other.kind && self.to_table() == other.to_table()
    }

    /// New frame of `kind` holding `table`, on this frame's backend
    pub(crate) fn derive(&self, kind: FrameKind, table: Table) -> FrameResult<Frame> {
        let query_compiler = self.query_compiler.rebuild(table)?;
        Ok(Frame::from_parts(kind, self.backend.clone(), query_compiler, Arc::clone(&self.runtime)))
    }
}

impl PartialEq for Frame {
    /// Runs `__eq__` through the resolver; anything but `true` is inequality
    fn eq(&self, other: &Self) -> bool {
        matches!(
            self.call("__eq__", &[Object::Frame(other.clone())]),
            Ok(Object::Scalar(Value::Boolean(true)))
        )
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("kind", &self.kind)
            .field("backend", &self.backend)
            .field("execution", &self.query_compiler.execution())
            .field("rows", &self.query_compiler.num_rows())
            .field("columns", &self.query_compiler.columns())
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.call("__str__", &[]) {
            Ok(Object::Scalar(Value::Text(text))) => write!(f, "{}", text),
            Ok(Object::Scalar(value)) => write!(f, "{}", value),
            Ok(other) => write!(f, "{:?}", other),
            Err(e) => write!(f, "<{} on {}: {}>", self.kind, self.backend, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::{COLUMNAR_BACKEND, NATIVE_BACKEND};

    fn sample(runtime: &Arc<Runtime>) -> Frame {
        let table = Table::new(
            vec![Label::from("x")],
            vec![vec![Value::Integer(2), Value::Integer(1)]],
        )
        .unwrap();
        runtime.dataframe(table).unwrap()
    }

    #[test]
    fn test_frame_defaults() {
        let runtime = Runtime::new();
        let df = sample(&runtime);

        assert_eq!(df.kind(), FrameKind::DataFrame);
        assert_eq!(df.get_backend(), NATIVE_BACKEND);
        assert_eq!(df.len().unwrap(), 2);
        assert!(!df.is_empty().unwrap());
        assert!(df.has_attr("sum").unwrap());
        assert!(df.has_attr("x").unwrap());
        assert!(!df.has_attr("y").unwrap());
        assert!(df.contains("x").unwrap());
        assert!(!df.contains("y").unwrap());
    }

    #[test]
    fn test_repr_and_display() {
        let runtime = Runtime::new();
        let df = sample(&runtime);

        assert_eq!(df.repr().unwrap(), "   x\n0  2\n1  1\n[2 rows x 1 columns]");
        assert_eq!(df.to_string(), df.repr().unwrap());
    }

    #[test]
    fn test_set_backend_inplace_keeps_slots() {
        let runtime = Runtime::new();
        let mut df = sample(&runtime);
        df.set_attr("_tag", "kept").unwrap();

        df.set_backend_inplace(COLUMNAR_BACKEND).unwrap();
        assert_eq!(df.get_backend(), COLUMNAR_BACKEND);
        assert_eq!(df.execution(), Execution::new("Columns", "Native"));
        assert_eq!(df.get("_tag").unwrap(), Object::from("kept"));
    }

    #[test]
    fn test_equality_ignores_backend() {
        let runtime = Runtime::new();
        let df = sample(&runtime);
        let moved = df.move_to(COLUMNAR_BACKEND).unwrap();

        assert_eq!(df, moved);
        assert_ne!(df.backend(), moved.backend());
    }

    #[test]
    fn test_get_item_on_series() {
        let runtime = Runtime::new();
        let df = sample(&runtime);
        let series = df.get_item("x").unwrap().into_frame().unwrap();

        assert_eq!(series.kind(), FrameKind::Series);
        assert_eq!(series.get_item(1i64).unwrap(), Object::from(1));
        assert!(series.get_item(5i64).is_err());
        assert!(df.get_item("missing").is_err());
    }
}
