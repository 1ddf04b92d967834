//! Type descriptors and their canonical string keys
//!
//! A [`Type`] describes the shape of a value: a scalar kind, a class, or a
//! collection with key and value type variants. Descriptors are immutable and
//! compare by their canonical key, which is also their `Display` form:
//!
//! | Descriptor                         | Canonical key              |
//! |------------------------------------|----------------------------|
//! | `Type::int()`                      | `int`                      |
//! | `Type::class("Dog")`               | `Dog`                      |
//! | `Type::class("Dog").nullable()`    | `?Dog`                     |
//! | `Type::array()`                    | `array`                    |
//! | `Type::array_of(int, Dog)`         | `array<int,Dog>`           |
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

pub mod hierarchy;
pub mod parser;
pub mod resolver;

use std::fmt;
use std::hash::{Hash, Hasher};

pub use hierarchy::{ClassDef, ClassRegistry, PropertyDef};
pub use parser::parse_union;
pub use resolver::TypeResolver;

/// Class of [`crate::Value::DateTime`] values
pub const DATETIME_CLASS: &str = "DateTime";

/// Builtin kind of a type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
    /// Wildcard matching any value
    Mixed,
}

impl Builtin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Builtin::Null => "null",
            Builtin::Bool => "bool",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::String => "string",
            Builtin::Array => "array",
            Builtin::Object => "object",
            Builtin::Mixed => "mixed",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "null" => Some(Builtin::Null),
            "bool" => Some(Builtin::Bool),
            "int" => Some(Builtin::Int),
            "float" => Some(Builtin::Float),
            "string" => Some(Builtin::String),
            "array" => Some(Builtin::Array),
            "object" => Some(Builtin::Object),
            "mixed" => Some(Builtin::Mixed),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Builtin::Bool | Builtin::Int | Builtin::Float | Builtin::String
        )
    }
}

/// Type descriptor
#[derive(Debug, Clone)]
pub struct Type {
    builtin: Builtin,
    nullable: bool,
    class: Option<String>,
    key_types: Vec<Type>,
    value_types: Vec<Type>,
}

impl Type {
    fn builtin(builtin: Builtin) -> Self {
        Self {
            builtin,
            nullable: false,
            class: None,
            key_types: Vec::new(),
            value_types: Vec::new(),
        }
    }

    pub fn null() -> Self {
        Self::builtin(Builtin::Null)
    }

    pub fn bool() -> Self {
        Self::builtin(Builtin::Bool)
    }

    pub fn int() -> Self {
        Self::builtin(Builtin::Int)
    }

    pub fn float() -> Self {
        Self::builtin(Builtin::Float)
    }

    pub fn string() -> Self {
        Self::builtin(Builtin::String)
    }

    pub fn mixed() -> Self {
        Self::builtin(Builtin::Mixed)
    }

    /// Any object, regardless of class
    pub fn object() -> Self {
        Self::builtin(Builtin::Object)
    }

    /// Object of a declared class or interface
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            class: Some(name.into()),
            ..Self::builtin(Builtin::Object)
        }
    }

    /// Untyped array
    pub fn array() -> Self {
        Self::builtin(Builtin::Array)
    }

    /// Array with a single key type and a single value type
    pub fn array_of(key: Type, value: Type) -> Self {
        Self::array()
            .with_key_types(vec![key])
            .with_value_types(vec![value])
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn non_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_key_types(mut self, key_types: Vec<Type>) -> Self {
        self.key_types = key_types;
        self
    }

    pub fn with_value_types(mut self, value_types: Vec<Type>) -> Self {
        self.value_types = value_types;
        self
    }

    pub fn builtin_kind(&self) -> Builtin {
        self.builtin
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_mixed(&self) -> bool {
        self.builtin == Builtin::Mixed
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn key_types(&self) -> &[Type] {
        &self.key_types
    }

    pub fn value_types(&self) -> &[Type] {
        &self.value_types
    }

    /// Whether key or value type parameters are present
    pub fn is_generic(&self) -> bool {
        !self.key_types.is_empty() || !self.value_types.is_empty()
    }

    /// Name of the outer type without parameters (`int`, `array`, `Dog`)
    pub fn outer_name(&self) -> &str {
        match &self.class {
            Some(class) => class,
            None => self.builtin.as_str(),
        }
    }

    /// Canonical key used for indexing and matching
    pub fn canonical_key(&self) -> String {
        self.to_string()
    }
}

fn write_variants(f: &mut fmt::Formatter<'_>, variants: &[Type]) -> fmt::Result {
    if variants.is_empty() {
        return f.write_str(Builtin::Mixed.as_str());
    }
    for (i, variant) in variants.iter().enumerate() {
        if i > 0 {
            f.write_str("|")?;
        }
        write!(f, "{}", variant)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable && self.builtin != Builtin::Null && self.builtin != Builtin::Mixed {
            f.write_str("?")?;
        }
        f.write_str(self.outer_name())?;
        if self.is_generic() {
            f.write_str("<")?;
            write_variants(f, &self.key_types)?;
            f.write_str(",")?;
            write_variants(f, &self.value_types)?;
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}
