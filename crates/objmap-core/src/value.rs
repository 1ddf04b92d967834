//! Runtime values walked by the transformation engine
//!
//! Objects are the only reference values: they are shared through [`ObjectRef`]
//! and compared by identity. Every other variant is a plain value type and is
//! compared structurally.
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A dynamically shaped value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Immutable temporal value, never cached by identity
    DateTime(DateTime<Utc>),
    /// Integer-keyed sequence
    List(Vec<Value>),
    /// Ordered key/value pairs; keys may be any value
    Map(Vec<(Value, Value)>),
    Object(ObjectRef),
}

impl Value {
    /// Whether this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The object reference, if this value is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short human-readable label for diagnostics (`int`, `list`, or the class name)
    pub fn debug_type(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::DateTime(_) => crate::types::DATETIME_CLASS.to_string(),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Object(object) => object.class(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// Object state behind an [`ObjectRef`]
#[derive(Debug, Clone)]
pub struct Object {
    class: String,
    fields: BTreeMap<String, Value>,
}

/// Shared handle to an object with reference identity
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Object>>);

impl ObjectRef {
    /// Allocate a new, field-less object of the given class
    pub fn new(class: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(Object {
            class: class.into(),
            fields: BTreeMap::new(),
        })))
    }

    /// Builder-style field assignment
    pub fn with_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Identity of the referenced object; stable while any handle is alive
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn class(&self) -> String {
        self.read(|object| object.class.clone())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.read(|object| object.fields.get(name).cloned())
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        guard.fields.insert(name, value);
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.read(|object| object.fields.contains_key(name))
    }

    /// Snapshot of all fields; the lock is released before the caller recurses
    pub fn fields(&self) -> Vec<(String, Value)> {
        self.read(|object| {
            object
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Object) -> T) -> T {
        let guard = self.0.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// Object graphs may be cyclic, so fields are not printed.
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("class", &self.class())
            .field("id", &format_args!("{:#x}", self.id()))
            .finish()
    }
}
