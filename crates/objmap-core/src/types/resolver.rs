//! Type resolution: classification, simplification and ancestor expansion
//!
//! The resolver turns runtime values into [`Type`] descriptors and expands
//! descriptors into the canonical keys the mapping registry is indexed by.
//! Registering a strategy for an interface is enough for every implementing
//! class to match, because [`TypeResolver::applicable_type_strings`] walks the
//! declared ancestors of every class position, including nested key and value
//! positions of collections.
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use super::{Builtin, ClassRegistry, Type, DATETIME_CLASS};
use crate::Value;
use std::collections::HashSet;

const MIXED: &str = "mixed";

/// Resolves and expands type descriptors against a class hierarchy
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    classes: ClassRegistry,
}

impl TypeResolver {
    pub fn new(classes: ClassRegistry) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Most specific type descriptor for a runtime value
    pub fn classify_value(&self, value: &Value) -> Type {
        match value {
            Value::Null => Type::null(),
            Value::Bool(_) => Type::bool(),
            Value::Int(_) => Type::int(),
            Value::Float(_) => Type::float(),
            Value::String(_) => Type::string(),
            Value::DateTime(_) => Type::class(DATETIME_CLASS),
            Value::Object(object) => Type::class(object.class()),
            Value::List(items) => {
                if items.is_empty() {
                    return Type::array();
                }
                let value_type = self.common_type(items.iter());
                Type::array_of(Type::int(), value_type)
            }
            Value::Map(entries) => {
                if entries.is_empty() {
                    return Type::array();
                }
                let key_type = self.common_type(entries.iter().map(|(k, _)| k));
                let value_type = self.common_type(entries.iter().map(|(_, v)| v));
                Type::array_of(key_type, value_type)
            }
        }
    }

    // Element type shared by every item, or `mixed` for heterogeneous input
    fn common_type<'v>(&self, mut items: impl Iterator<Item = &'v Value>) -> Type {
        let Some(first) = items.next() else {
            return Type::mixed();
        };
        let first_type = self.classify_value(first);
        for item in items {
            if self.classify_value(item) != first_type {
                return Type::mixed();
            }
        }
        first_type
    }

    /// Deterministic string key identifying the type
    pub fn canonical_key(&self, ty: &Type) -> String {
        ty.canonical_key()
    }

    /// Non-nullable, at most one key type and at most one value type
    pub fn is_simple(&self, ty: &Type) -> bool {
        !ty.is_nullable() && ty.key_types().len() <= 1 && ty.value_types().len() <= 1
    }

    /// Expand descriptors into the simple types they represent
    ///
    /// Nullability is dropped, and every combination of key and value variants
    /// becomes its own descriptor. Nested positions are expanded recursively.
    /// Duplicates are removed, first occurrence wins.
    pub fn to_simple_types(&self, types: &[Type]) -> Vec<Type> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();

        for ty in types {
            for simple in self.expand_simple(ty) {
                if seen.insert(simple.canonical_key()) {
                    result.push(simple);
                }
            }
        }

        result
    }

    fn expand_simple(&self, ty: &Type) -> Vec<Type> {
        let base = ty.clone().non_nullable();
        if !ty.is_generic() {
            return vec![base];
        }

        let keys: Vec<Option<Type>> = if ty.key_types().is_empty() {
            vec![None]
        } else {
            self.to_simple_types(ty.key_types()).into_iter().map(Some).collect()
        };
        let values: Vec<Option<Type>> = if ty.value_types().is_empty() {
            vec![None]
        } else {
            self.to_simple_types(ty.value_types()).into_iter().map(Some).collect()
        };

        let mut result = Vec::with_capacity(keys.len() * values.len());
        for key in &keys {
            for value in &values {
                let simple = base
                    .clone()
                    .with_key_types(key.iter().cloned().collect())
                    .with_value_types(value.iter().cloned().collect());
                result.push(simple);
            }
        }
        result
    }

    /// Canonical keys a value of `ty` can be matched under, most specific first
    ///
    /// For `array<int,Dog>` where `Dog` extends `Animal`, the result starts
    /// with `array<int,Dog>`, continues with `array<int,Animal>`,
    /// `array<int,object>`, `array<int,mixed>`, `array<mixed,Dog>` and so
    /// on, and ends with `array` and `mixed`.
    pub fn applicable_type_strings(&self, ty: &Type) -> Vec<String> {
        let ty = ty.clone().non_nullable();
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |key: String| {
            if seen.insert(key.clone()) {
                result.push(key);
            }
        };

        push(ty.canonical_key());

        let outer = self.outer_names(&ty);
        if ty.is_generic() {
            let keys = self.position_strings(ty.key_types());
            let values = self.position_strings(ty.value_types());
            for name in outer.iter().filter(|n| n.as_str() != "object") {
                for key in &keys {
                    for value in &values {
                        push(format!("{}<{},{}>", name, key, value));
                    }
                }
            }
        }

        for name in outer {
            push(name);
        }
        push(MIXED.to_string());

        result
    }

    // Applicable strings of a nested position; an empty position is `mixed`
    fn position_strings(&self, variants: &[Type]) -> Vec<String> {
        if variants.is_empty() {
            return vec![MIXED.to_string()];
        }
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        for variant in variants {
            for key in self.applicable_type_strings(variant) {
                if seen.insert(key.clone()) {
                    result.push(key);
                }
            }
        }
        result
    }

    fn outer_names(&self, ty: &Type) -> Vec<String> {
        match (ty.builtin_kind(), ty.class_name()) {
            (Builtin::Object, Some(class)) => {
                let mut names = vec![class.to_string()];
                names.extend(self.classes.ancestors(class));
                names.push(Builtin::Object.as_str().to_string());
                names
            }
            (builtin, _) => vec![builtin.as_str().to_string()],
        }
    }

    /// Class names referenced anywhere in the descriptor that are not declared
    pub fn unknown_classes(&self, ty: &Type) -> Vec<String> {
        let mut unknown = Vec::new();
        self.collect_unknown(ty, &mut unknown);
        unknown
    }

    fn collect_unknown(&self, ty: &Type, unknown: &mut Vec<String>) {
        if let Some(class) = ty.class_name() {
            if !self.classes.contains(class) && !unknown.iter().any(|u| u == class) {
                unknown.push(class.to_string());
            }
        }
        for nested in ty.key_types().iter().chain(ty.value_types()) {
            self.collect_unknown(nested, unknown);
        }
    }
}
