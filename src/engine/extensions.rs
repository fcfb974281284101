use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use crate::engine::frame::Frame;
use crate::utils::{
    types::Object,
    error::{FrameResult, RegistrationError},
};

/// Names that drive dispatch itself and can never be extended
pub const RESERVED_NAMES: &[&str] = &[
    "__getattribute__",
    "__getattr__",
    "__setattr__",
    "__delattr__",
    "__dict__",
    "__class__",
    "__init__",
    "__new__",
    "_query_compiler",
    "_get_extension",
    "_copy_into",
    "get_backend",
    "set_backend",
    "move_to",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Types whose instances can be extended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetType {
    DataFrame,
    Series,
    /// Shared by DataFrame and Series
    Base,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::DataFrame => write!(f, "DataFrame"),
            TargetType::Series => write!(f, "Series"),
            TargetType::Base => write!(f, "Base"),
        }
    }
}

/// Which backends an extension applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Global,
    Backend(String),
}

impl Scope {
    pub fn from_backend(backend: Option<&str>) -> Self {
        match backend {
            Some(name) => Scope::Backend(name.to_string()),
            None => Scope::Global,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Backend(name) => write!(f, "{}", name),
        }
    }
}

pub type MethodFn = Arc<dyn Fn(&Frame, &[Object]) -> FrameResult<Object> + Send + Sync>;
pub type GetterFn = Arc<dyn Fn(&Frame) -> FrameResult<Object> + Send + Sync>;
pub type SetterFn = Arc<dyn Fn(&mut Frame, Object) -> FrameResult<()> + Send + Sync>;
pub type DeleterFn = Arc<dyn Fn(&mut Frame) -> FrameResult<()> + Send + Sync>;

/// Getter/setter/deleter triple; each part is optional
#[derive(Clone, Default)]
pub struct Property {
    getter: Option<GetterFn>,
    setter: Option<SetterFn>,
    deleter: Option<DeleterFn>,
}

impl Property {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only property
    pub fn readonly<G>(getter: G) -> Self
    where
        G: Fn(&Frame) -> FrameResult<Object> + Send + Sync + 'static,
    {
        Self::new().with_getter(getter)
    }

    pub fn with_getter<G>(mut self, getter: G) -> Self
    where
        G: Fn(&Frame) -> FrameResult<Object> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn with_setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(&mut Frame, Object) -> FrameResult<()> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn with_deleter<D>(mut self, deleter: D) -> Self
    where
        D: Fn(&mut Frame) -> FrameResult<()> + Send + Sync + 'static,
    {
        self.deleter = Some(Arc::new(deleter));
        self
    }

    pub fn getter(&self) -> Option<&GetterFn> {
        self.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&SetterFn> {
        self.setter.as_ref()
    }

    pub fn deleter(&self) -> Option<&DeleterFn> {
        self.deleter.as_ref()
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .field("deleter", &self.deleter.is_some())
            .finish()
    }
}

/// A registered override
#[derive(Clone)]
pub enum Extension {
    /// Callable, bound to the receiving frame on lookup
    Method(MethodFn),
    /// Invoked on get, set and delete
    Property(Property),
    /// Returned verbatim
    Value(Object),
}

impl Extension {
    pub fn method<F>(method: F) -> Self
    where
        F: Fn(&Frame, &[Object]) -> FrameResult<Object> + Send + Sync + 'static,
    {
        Extension::Method(Arc::new(method))
    }

    pub fn property(property: Property) -> Self {
        Extension::Property(property)
    }

    pub fn value(value: impl Into<Object>) -> Self {
        Extension::Value(value.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Extension::Method(_) => "method",
            Extension::Property(_) => "property",
            Extension::Value(_) => "value",
        }
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extension::Method(_) => write!(f, "Extension::Method(..)"),
            Extension::Property(property) => write!(f, "Extension::{:?}", property),
            Extension::Value(value) => write!(f, "Extension::Value({:?})", value),
        }
    }
}

impl From<Property> for Extension {
    fn from(property: Property) -> Self {
        Extension::Property(property)
    }
}

impl From<Object> for Extension {
    fn from(value: Object) -> Self {
        Extension::Value(value)
    }
}

/// Location of an extension in the table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionKey {
    pub target: TargetType,
    pub scope: Scope,
    pub name: String,
}

impl ExtensionKey {
    pub fn new(target: TargetType, scope: Scope, name: &str) -> Self {
        Self {
            target,
            scope,
            name: name.to_string(),
        }
    }
}

/// Saved copy of an extension table
#[derive(Debug, Clone, Default)]
pub struct ExtensionSnapshot {
    entries: HashMap<ExtensionKey, Extension>,
}

impl ExtensionSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table of extensions keyed by target type, backend scope and name
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    entries: DashMap<ExtensionKey, Extension>,
}

impl ExtensionRegistry {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a registration. Fails if `name` is reserved.
    pub fn accessor(&self, target: TargetType, name: &str, backend: Option<&str>) -> FrameResult<Accessor<'_>> {
        if is_reserved(name) {
            return Err(RegistrationError::ReservedName(name.to_string()).into());
        }
        Ok(Accessor {
            registry: self,
            key: ExtensionKey::new(target, Scope::from_backend(backend), name),
        })
    }

    /// Store `value` under `(target, backend or global, name)`, replacing any
    /// previous entry, and hand it back
    pub fn register(
        &self,
        target: TargetType,
        name: &str,
        backend: Option<&str>,
        value: impl Into<Extension>,
    ) -> FrameResult<Extension> {
        Ok(self.accessor(target, name, backend)?.register(value))
    }

    fn insert(&self, key: ExtensionKey, value: Extension) {
        debug!(
            target = %key.target,
            scope = %key.scope,
            name = %key.name,
            kind = value.kind_name(),
            "registered extension"
        );
        self.entries.insert(key, value);
    }

    /// Entry stored exactly at `(target, scope, name)`
    pub fn lookup(&self, target: TargetType, scope: &Scope, name: &str) -> Option<Extension> {
        let key = ExtensionKey::new(target, scope.clone(), name);
        self.entries.get(&key).map(|e| e.value().clone())
    }

    /// Whether `name` is extended on `target` under any scope
    pub fn is_registered(&self, target: TargetType, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.key().target == target && e.key().name == name)
    }

    /// Names registered under one scope, sorted
    pub fn names(&self, target: TargetType, scope: &Scope) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().target == target && &e.key().scope == scope)
            .map(|e| e.key().name.clone())
            .collect();
        names.sort();
        names
    }

    /// Every key in the table, sorted
    pub fn keys(&self) -> Vec<ExtensionKey> {
        let mut keys: Vec<ExtensionKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn remove(&self, target: TargetType, scope: &Scope, name: &str) -> Option<Extension> {
        let key = ExtensionKey::new(target, scope.clone(), name);
        self.entries.remove(&key).map(|(_, value)| value)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> ExtensionSnapshot {
        ExtensionSnapshot {
            entries: self
                .entries
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        }
    }

    /// Replace the whole table with a snapshot.
    ///
    /// Snapshot entries are written before stale ones are dropped, so a
    /// concurrent lookup of a name present in both never misses.
    pub fn restore(&self, snapshot: ExtensionSnapshot) {
        let keep: HashSet<ExtensionKey> = snapshot.entries.iter().map(|(key, _)| key.clone()).collect();
        for (key, value) in snapshot.entries {
            self.entries.insert(key, value);
        }
        self.entries.retain(|key, _| keep.contains(key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pending registration returned by `register_*_accessor`
#[derive(Debug)]
pub struct Accessor<'a> {
    registry: &'a ExtensionRegistry,
    key: ExtensionKey,
}

impl<'a> Accessor<'a> {
    pub fn key(&self) -> &ExtensionKey {
        &self.key
    }

    /// Store the value and return it unchanged
    pub fn register(self, value: impl Into<Extension>) -> Extension {
        let value = value.into();
        self.registry.insert(self.key, value.clone());
        value
    }

    pub fn method<F>(self, method: F) -> Extension
    where
        F: Fn(&Frame, &[Object]) -> FrameResult<Object> + Send + Sync + 'static,
    {
        self.register(Extension::method(method))
    }

    pub fn property(self, property: Property) -> Extension {
        self.register(Extension::Property(property))
    }

    pub fn value(self, value: impl Into<Object>) -> Extension {
        self.register(Extension::Value(value.into()))
    }
}
