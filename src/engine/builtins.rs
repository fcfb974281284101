use crate::backends::kernels;
use crate::engine::frame::{Frame, FrameKind};
use crate::utils::{
    types::{Label, Object, Table, Value},
    error::{FrameResult, KernelError},
};

pub type BuiltinMethod = fn(&Frame, &[Object]) -> FrameResult<Object>;
pub type BuiltinGetter = fn(&Frame) -> FrameResult<Object>;
pub type BuiltinSetter = fn(&mut Frame, Object) -> FrameResult<()>;

/// A default attribute
#[derive(Clone, Copy)]
pub enum Builtin {
    Method(BuiltinMethod),
    Property {
        get: BuiltinGetter,
        set: Option<BuiltinSetter>,
    },
}

const SHARED: &[&str] = &[
    "index",
    "shape",
    "sum",
    "count",
    "mean",
    "sort_values",
    "head",
    "equals",
    "get_backend",
    "set_backend",
    "move_to",
    "__len__",
    "__repr__",
    "__str__",
    "__contains__",
    "__getitem__",
    "__eq__",
];

/// Default attribute `name` of a frame kind, consulted once no extension matches
pub fn lookup(kind: FrameKind, name: &str) -> Option<Builtin> {
    let shared = match name {
        "index" => Some(Builtin::Property { get: index, set: None }),
        "shape" => Some(Builtin::Property { get: shape, set: None }),
        "sum" => Some(Builtin::Method(sum)),
        "count" => Some(Builtin::Method(count)),
        "mean" => Some(Builtin::Method(mean)),
        "sort_values" => Some(Builtin::Method(sort_values)),
        "head" => Some(Builtin::Method(head)),
        "equals" => Some(Builtin::Method(equals)),
        "get_backend" => Some(Builtin::Method(get_backend)),
        "set_backend" | "move_to" => Some(Builtin::Method(set_backend)),
        "__len__" => Some(Builtin::Method(len)),
        "__repr__" => Some(Builtin::Method(repr)),
        "__str__" => Some(Builtin::Method(to_str)),
        "__contains__" => Some(Builtin::Method(contains)),
        "__getitem__" => Some(Builtin::Method(get_item)),
        "__eq__" => Some(Builtin::Method(eq)),
        _ => None,
    };

    shared.or(match (kind, name) {
        (FrameKind::DataFrame, "columns") => Some(Builtin::Property {
            get: columns,
            set: Some(set_columns),
        }),
        (FrameKind::Series, "name") => Some(Builtin::Property {
            get: series_name,
            set: Some(set_series_name),
        }),
        _ => None,
    })
}

/// Names of every default attribute of a frame kind, sorted
pub fn names(kind: FrameKind) -> Vec<&'static str> {
    let mut names = SHARED.to_vec();
    match kind {
        FrameKind::DataFrame => names.push("columns"),
        FrameKind::Series => names.push("name"),
    }
    names.sort_unstable();
    names
}

fn arg<'a>(args: &'a [Object], position: usize, method: &str) -> FrameResult<&'a Object> {
    args.get(position).ok_or_else(|| {
        KernelError::InvalidArgument(format!("{}() missing argument at position {}", method, position)).into()
    })
}

fn index(frame: &Frame) -> FrameResult<Object> {
    Ok(Object::Labels(frame.query_compiler().index()))
}

fn shape(frame: &Frame) -> FrameResult<Object> {
    let rows = frame.query_compiler().num_rows() as i64;
    Ok(match frame.kind() {
        FrameKind::DataFrame => Object::List(vec![
            Object::from(rows),
            Object::from(frame.query_compiler().num_columns() as i64),
        ]),
        FrameKind::Series => Object::List(vec![Object::from(rows)]),
    })
}

fn columns(frame: &Frame) -> FrameResult<Object> {
    Ok(Object::Labels(frame.query_compiler().columns()))
}

fn set_columns(frame: &mut Frame, value: Object) -> FrameResult<()> {
    let labels = value.into_labels()?;
    frame.query_compiler_mut().set_columns(labels)
}

fn series_name(frame: &Frame) -> FrameResult<Object> {
    Ok(frame
        .query_compiler()
        .columns()
        .into_iter()
        .next()
        .map(Object::from)
        .unwrap_or(Object::None))
}

fn set_series_name(frame: &mut Frame, value: Object) -> FrameResult<()> {
    let label = value.as_label()?;
    frame.query_compiler_mut().set_columns(vec![label])
}

/// DataFrame reductions become a Series indexed by column; Series reductions a scalar
fn reduction(frame: &Frame, name: &str, values: Vec<Value>) -> FrameResult<Object> {
    match frame.kind() {
        FrameKind::DataFrame => {
            let table = Table::with_index(
                vec![Label::from(name)],
                frame.query_compiler().columns(),
                vec![values],
            )?;
            Ok(Object::Frame(frame.derive(FrameKind::Series, table)?))
        }
        FrameKind::Series => Ok(Object::Scalar(values.into_iter().next().unwrap_or(Value::Null))),
    }
}

fn sum(frame: &Frame, _args: &[Object]) -> FrameResult<Object> {
    let values = kernels::sum(&frame.to_table())?;
    reduction(frame, "sum", values)
}

fn count(frame: &Frame, _args: &[Object]) -> FrameResult<Object> {
    let values = kernels::count(&frame.to_table());
    reduction(frame, "count", values)
}

fn mean(frame: &Frame, _args: &[Object]) -> FrameResult<Object> {
    let values = kernels::mean(&frame.to_table())?;
    reduction(frame, "mean", values)
}

/// DataFrame: `sort_values(by, ascending = true)`; Series: `sort_values(ascending = true)`
fn sort_values(frame: &Frame, args: &[Object]) -> FrameResult<Object> {
    let table = frame.to_table();
    let (by, rest) = match frame.kind() {
        FrameKind::DataFrame => (arg(args, 0, "sort_values")?.as_label()?, args.get(1)),
        FrameKind::Series => {
            let by = table
                .columns
                .first()
                .cloned()
                .ok_or_else(|| KernelError::Unsupported("sort_values on an empty series".to_string()))?;
            (by, args.first())
        }
    };
    let ascending = match rest {
        Some(flag) => flag.as_bool()?,
        None => true,
    };

    let sorted = kernels::sort_values(&table, &by, ascending)?;
    Ok(Object::Frame(frame.derive(frame.kind(), sorted)?))
}

fn head(frame: &Frame, args: &[Object]) -> FrameResult<Object> {
    let n = match args.first() {
        Some(n) => usize::try_from(n.as_i64()?)
            .map_err(|_| KernelError::InvalidArgument("head() needs a non-negative row count".to_string()))?,
        None => 5,
    };
    let table = kernels::head(&frame.to_table(), n)?;
    Ok(Object::Frame(frame.derive(frame.kind(), table)?))
}

fn equals(frame: &Frame, args: &[Object]) -> FrameResult<Object> {
    let other = arg(args, 0, "equals")?;
    frame.call("__eq__", std::slice::from_ref(other))
}

fn eq(frame: &Frame, args: &[Object]) -> FrameResult<Object> {
    let other = arg(args, 0, "__eq__")?;
    Ok(Object::from(other.as_frame().is_some_and(|o| frame.same_content(o))))
}

fn get_backend(frame: &Frame, _args: &[Object]) -> FrameResult<Object> {
    Ok(Object::from(frame.get_backend()))
}

fn set_backend(frame: &Frame, args: &[Object]) -> FrameResult<Object> {
    let backend = arg(args, 0, "set_backend")?.as_text()?;
    Ok(Object::Frame(frame.set_backend(backend)?))
}

fn len(frame: &Frame, _args: &[Object]) -> FrameResult<Object> {
    Ok(Object::from(frame.query_compiler().num_rows() as i64))
}

fn repr(frame: &Frame, _args: &[Object]) -> FrameResult<Object> {
    let table = frame.to_table();
    Ok(Object::from(match frame.kind() {
        FrameKind::DataFrame => kernels::format_frame(&table),
        FrameKind::Series => kernels::format_series(&table),
    }))
}

fn to_str(frame: &Frame, _args: &[Object]) -> FrameResult<Object> {
    Ok(Object::from(frame.repr()?))
}

/// DataFrame: membership in the (possibly overridden) columns; Series: in the index
fn contains(frame: &Frame, args: &[Object]) -> FrameResult<Object> {
    let label = arg(args, 0, "__contains__")?.as_label()?;
    let found = match frame.kind() {
        FrameKind::DataFrame => frame.resolved_columns()?.contains(&label),
        FrameKind::Series => frame.query_compiler().index().contains(&label),
    };
    Ok(Object::from(found))
}

fn get_item(frame: &Frame, args: &[Object]) -> FrameResult<Object> {
    let label = arg(args, 0, "__getitem__")?.as_label()?;
    match frame.kind() {
        FrameKind::DataFrame => Ok(Object::Frame(frame.column_series(&label)?)),
        FrameKind::Series => {
            let qc = frame.query_compiler();
            let position = qc
                .index()
                .iter()
                .position(|l| l == &label)
                .ok_or_else(|| KernelError::KeyNotFound(label.to_string()))?;
            let values = qc.to_table().data.into_iter().next().unwrap_or_default();
            Ok(Object::Scalar(values.get(position).cloned().unwrap_or(Value::Null)))
        }
    }
}
