use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use crate::engine::Frame;
use crate::utils::error::{FrameResult, KernelError};

/// Individual cell values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Null,
}

impl Value {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Boolean(_) => 0,
            Value::Integer(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Null => 3,
        }
    }

    /// Total order used by sorting kernels. Nulls sort last.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.type_rank().cmp(&b.type_rank()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        match label {
            Label::Int(i) => Value::Integer(i),
            Label::Str(s) => Value::Text(s),
        }
    }
}

/// Row or column label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Int(i64),
    Str(String),
}

impl Label {
    /// Positional labels `0..n`, the default index and default column labels
    pub fn range(n: usize) -> Vec<Label> {
        (0..n as i64).map(Label::Int).collect()
    }
}

impl TryFrom<&Value> for Label {
    type Error = KernelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Integer(i) => Ok(Label::Int(*i)),
            Value::Text(s) => Ok(Label::Str(s.clone())),
            other => Err(KernelError::InvalidArgument(format!(
                "{:?} cannot be used as a label",
                other
            ))),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{}", i),
            Label::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

/// A row of data in a row-major store
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    /// Create a new row with the given values
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Get a value by column position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// Normalise a storage format or engine name: every `_`-separated segment is
/// capitalised, so `test1_storage_format` becomes `Test1_Storage_Format`.
pub fn normalize_component(name: &str) -> String {
    name.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("_")
}

/// Execution descriptor: the storage format and compute engine of a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Execution {
    pub storage_format: String,
    pub engine: String,
}

impl Execution {
    /// Create a descriptor; both components are normalised
    pub fn new(storage_format: &str, engine: &str) -> Self {
        Self {
            storage_format: normalize_component(storage_format),
            engine: normalize_component(engine),
        }
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.storage_format, self.engine)
    }
}

/// Backend-neutral logical content of a frame. Data is stored column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Label>,
    pub index: Vec<Label>,
    pub data: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from column labels and column data, with a positional index
    pub fn new(columns: Vec<Label>, data: Vec<Vec<Value>>) -> FrameResult<Self> {
        let rows = data.first().map(Vec::len).unwrap_or(0);
        Self::with_index(columns, Label::range(rows), data)
    }

    /// Build a table with an explicit row index
    pub fn with_index(columns: Vec<Label>, index: Vec<Label>, data: Vec<Vec<Value>>) -> FrameResult<Self> {
        if columns.len() != data.len() {
            return Err(KernelError::ShapeMismatch(format!(
                "{} column labels for {} columns",
                columns.len(),
                data.len()
            ))
            .into());
        }
        if let Some(bad) = data.iter().find(|column| column.len() != index.len()) {
            return Err(KernelError::ShapeMismatch(format!(
                "column of length {} does not match index of length {}",
                bad.len(),
                index.len()
            ))
            .into());
        }
        Ok(Self { columns, index, data })
    }

    /// Build a table from rows
    pub fn from_rows(columns: Vec<Label>, rows: Vec<Vec<Value>>) -> FrameResult<Self> {
        let mut data = vec![Vec::with_capacity(rows.len()); columns.len()];
        for (position, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(KernelError::ShapeMismatch(format!(
                    "row {} has {} values, expected {}",
                    position,
                    row.len(),
                    columns.len()
                ))
                .into());
            }
            for (column, value) in data.iter_mut().zip(row) {
                column.push(value);
            }
        }
        let rows = data.first().map(Vec::len).unwrap_or(0);
        Ok(Self {
            columns,
            index: Label::range(rows),
            data,
        })
    }

    /// A single unnamed column holding `values`, labelled `0`
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            columns: vec![Label::Int(0)],
            index: Label::range(values.len()),
            data: vec![values],
        }
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_position(&self, label: &Label) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn column(&self, label: &Label) -> Option<&[Value]> {
        self.column_position(label).map(|i| self.data[i].as_slice())
    }

    /// Value at a row and column position
    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.data.get(column).and_then(|c| c.get(row))
    }

    pub fn row(&self, row: usize) -> Vec<Value> {
        self.data.iter().filter_map(|c| c.get(row).cloned()).collect()
    }

    pub fn rows(&self) -> Vec<Vec<Value>> {
        (0..self.num_rows()).map(|r| self.row(r)).collect()
    }
}

/// Dynamic value produced and consumed by attribute dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    None,
    Scalar(Value),
    Labels(Vec<Label>),
    Frame(Frame),
    List(Vec<Object>),
}

impl Object {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Object::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Object::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn into_frame(self) -> FrameResult<Frame> {
        match self {
            Object::Frame(frame) => Ok(frame),
            other => Err(KernelError::InvalidArgument(format!("expected a frame, got {:?}", other)).into()),
        }
    }

    pub fn as_label(&self) -> FrameResult<Label> {
        match self {
            Object::Scalar(value) => Ok(Label::try_from(value)?),
            other => Err(KernelError::InvalidArgument(format!("expected a label, got {:?}", other)).into()),
        }
    }

    pub fn as_bool(&self) -> FrameResult<bool> {
        match self {
            Object::Scalar(Value::Boolean(b)) => Ok(*b),
            other => Err(KernelError::InvalidArgument(format!("expected a boolean, got {:?}", other)).into()),
        }
    }

    pub fn as_i64(&self) -> FrameResult<i64> {
        match self {
            Object::Scalar(Value::Integer(i)) => Ok(*i),
            other => Err(KernelError::InvalidArgument(format!("expected an integer, got {:?}", other)).into()),
        }
    }

    pub fn as_text(&self) -> FrameResult<&str> {
        match self {
            Object::Scalar(Value::Text(s)) => Ok(s),
            other => Err(KernelError::InvalidArgument(format!("expected text, got {:?}", other)).into()),
        }
    }

    /// Labels from either a label sequence or a list of scalar labels
    pub fn into_labels(self) -> FrameResult<Vec<Label>> {
        match self {
            Object::Labels(labels) => Ok(labels),
            Object::List(items) => items.iter().map(Object::as_label).collect(),
            other => Err(KernelError::InvalidArgument(format!("expected labels, got {:?}", other)).into()),
        }
    }
}

impl From<Value> for Object {
    fn from(value: Value) -> Self {
        Object::Scalar(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Scalar(Value::Integer(value))
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Scalar(Value::Float(value))
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Scalar(Value::Boolean(value))
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::Scalar(Value::Text(value.to_string()))
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::Scalar(Value::Text(value))
    }
}

impl From<Label> for Object {
    fn from(label: Label) -> Self {
        Object::Scalar(label.into())
    }
}

impl From<Vec<Label>> for Object {
    fn from(labels: Vec<Label>) -> Self {
        Object::Labels(labels)
    }
}

impl From<Frame> for Object {
    fn from(frame: Frame) -> Self {
        Object::Frame(frame)
    }
}
