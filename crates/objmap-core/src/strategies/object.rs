//! Object to object mapping by declared target properties
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use crate::context::TransformContext;
use crate::strategy::{Strategy, TypeMapping};
use crate::types::Type;
use crate::{Error, ObjectRef, Result, Value};

/// Copies the declared properties of the target class from the source object
///
/// The target object is allocated (or taken from `target`) and marked in
/// flight in the object cache before any property is transformed, so a
/// property that leads back to the same source object for the same target
/// type fails with [`Error::CircularReference`]. A source object already
/// transformed to the same target type in this tree yields the same target
/// object. Properties the source does not have are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyMappingStrategy;

impl Strategy for PropertyMappingStrategy {
    fn supported_transformations(&self) -> Vec<TypeMapping> {
        vec![TypeMapping::new(Type::object(), Type::object())]
    }

    fn transform(
        &self,
        source: &Value,
        target: Option<Value>,
        _source_type: &Type,
        target_type: &Type,
        context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        let Some(object) = source.as_object() else {
            return Err(Error::invalid_argument(format!(
                "Source must be an object, '{}' given",
                source.debug_type()
            )));
        };
        let Some(class) = target_type.class_name() else {
            return Err(Error::invalid_argument(format!(
                "Target type must name a class, '{}' given",
                target_type
            )));
        };

        let properties = {
            let classes = context.transformer().resolver().classes();
            if !classes.contains(class) {
                return Err(Error::invalid_argument(format!(
                    "Target class '{}' is not declared",
                    class
                )));
            }
            classes.properties(class)
        };

        let cache = context.object_cache();
        if cache.contains_target(source, target_type)? || cache.is_pre_cached(source, target_type)? {
            return cache.get_target(source, target_type);
        }

        let target = match target {
            Some(Value::Object(existing)) => existing,
            None | Some(Value::Null) => ObjectRef::new(class),
            Some(other) => {
                return Err(Error::invalid_argument(format!(
                    "If target is provided, it must be an object, '{}' given",
                    other.debug_type()
                )))
            }
        };

        context.object_cache().pre_cache(source, target_type)?;

        for property in &properties {
            let Some(value) = object.get(&property.name) else {
                continue;
            };
            let previous = target.get(&property.name).filter(|v| v.as_object().is_some());
            let transformed = context.transform(&value, previous, Some(&property.types))?;
            target.set(property.name.clone(), transformed);
        }

        let target = Value::Object(target);
        context
            .object_cache()
            .save_target(source, target_type, target.clone())?;
        Ok(target)
    }

    fn class_name(&self) -> &'static str {
        "PropertyMappingStrategy"
    }
}
