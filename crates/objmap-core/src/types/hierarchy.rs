//! Declared class hierarchy
//!
//! Matching across class hierarchies needs to know what each class extends or
//! implements. Classes are declared up front together with their ordered
//! ancestors and the typed properties that property-copying strategies use.

use super::{Builtin, Type, DATETIME_CLASS};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// A typed property of a declared class
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    /// Accepted types; more than one means a union
    pub types: Vec<Type>,
}

/// Declaration of a class or interface
#[derive(Debug, Clone)]
pub struct ClassDef {
    name: String,
    ancestors: Vec<String>,
    properties: Vec<PropertyDef>,
    value_type: bool,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ancestors: Vec::new(),
            properties: Vec::new(),
            value_type: false,
        }
    }

    /// Add a direct parent class or implemented interface
    pub fn extends(mut self, ancestor: impl Into<String>) -> Self {
        self.ancestors.push(ancestor.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            types: vec![ty],
        });
        self
    }

    pub fn property_union(mut self, name: impl Into<String>, types: Vec<Type>) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            types,
        });
        self
    }

    /// Mark instances as immutable values exempt from identity caching
    pub fn value_type(mut self) -> Self {
        self.value_type = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direct_ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn own_properties(&self) -> &[PropertyDef] {
        &self.properties
    }
}

/// Registry of declared classes
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDef>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Create a registry seeded with the builtin `DateTime` value class
    pub fn new() -> Self {
        let mut classes = HashMap::new();
        classes.insert(
            DATETIME_CLASS.to_string(),
            ClassDef::new(DATETIME_CLASS).value_type(),
        );
        Self { classes }
    }

    /// Add a class; builtin keywords such as `int` or `mixed` are not valid names
    pub fn declare(&mut self, class: ClassDef) -> Result<()> {
        if Builtin::from_keyword(&class.name).is_some() {
            return Err(Error::configuration(format!(
                "Class name '{}' is reserved for a builtin type",
                class.name
            )));
        }
        if self.classes.contains_key(&class.name) {
            return Err(Error::configuration(format!(
                "Class '{}' is already declared",
                class.name
            )));
        }
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    /// Flag an already declared class as a value type
    pub fn mark_value_type(&mut self, name: &str) -> Result<()> {
        let class = self
            .classes
            .get_mut(name)
            .ok_or_else(|| Error::configuration(format!("Class '{}' does not exist", name)))?;
        class.value_type = true;
        Ok(())
    }

    /// Check that every declared ancestor exists
    pub fn validate(&self) -> Result<()> {
        let mut names: Vec<&String> = self.classes.keys().collect();
        names.sort();
        for name in names {
            for ancestor in &self.classes[name].ancestors {
                if !self.classes.contains_key(ancestor) {
                    return Err(Error::configuration(format!(
                        "Class '{}' declares unknown ancestor '{}'",
                        name, ancestor
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All ancestors, breadth-first in declaration order, without the class itself
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::from([name]);
        let mut result = Vec::new();
        let mut queue: VecDeque<&str> = VecDeque::from([name]);

        while let Some(current) = queue.pop_front() {
            let Some(class) = self.classes.get(current) else {
                continue;
            };
            for ancestor in &class.ancestors {
                if seen.insert(ancestor.as_str()) {
                    result.push(ancestor.clone());
                    queue.push_back(ancestor.as_str());
                }
            }
        }

        result
    }

    /// Whether `name` is `ancestor` or descends from it
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        name == ancestor || self.ancestors(name).iter().any(|a| a == ancestor)
    }

    pub fn is_value_type(&self, name: &str) -> bool {
        let flagged = |n: &str| self.classes.get(n).is_some_and(|c| c.value_type);
        flagged(name) || self.ancestors(name).iter().any(|a| flagged(a.as_str()))
    }

    /// Own properties first, then inherited ones not redeclared closer
    pub fn properties(&self, name: &str) -> Vec<PropertyDef> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let lineage = std::iter::once(name.to_string()).chain(self.ancestors(name));

        for class_name in lineage {
            let Some(class) = self.classes.get(&class_name) else {
                continue;
            };
            for property in &class.properties {
                if seen.insert(property.name.clone()) {
                    result.push(property.clone());
                }
            }
        }

        result
    }
}
