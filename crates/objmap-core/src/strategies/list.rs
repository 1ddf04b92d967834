//! Element-wise transformation of lists and maps
//!
//! The shape of the result follows the target key type: `int` produces a list
//! (map keys are dropped), any other key type produces a map whose keys are
//! transformed to that type. Elements are transformed to the target value
//! type. A position that is empty or only `mixed` is unconstrained: its keys
//! keep the shape of the source and its elements are copied unchanged.
//!
//! When an existing collection is given as target, its object elements are
//! passed down as the targets of the matching source elements, by index for
//! lists and by key for maps.

use crate::context::TransformContext;
use crate::strategy::{Strategy, TypeMapping};
use crate::types::{Builtin, Type};
use crate::{Error, Result, Value};

/// Transforms `array` values into `array` values
#[derive(Debug, Clone, Copy, Default)]
pub struct ListStrategy;

impl Strategy for ListStrategy {
    fn supported_transformations(&self) -> Vec<TypeMapping> {
        vec![TypeMapping::new(Type::array(), Type::array())]
    }

    fn transform(
        &self,
        source: &Value,
        target: Option<Value>,
        _source_type: &Type,
        target_type: &Type,
        context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        let members: Vec<(Value, &Value)> = match source {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| (Value::Int(index as i64), item))
                .collect(),
            Value::Map(entries) => entries.iter().map(|(key, value)| (key.clone(), value)).collect(),
            other => {
                return Err(Error::invalid_argument(format!(
                    "Source must be a list or a map, '{}' given",
                    other.debug_type()
                )))
            }
        };

        let existing = match target {
            None | Some(Value::Null) => None,
            Some(value @ (Value::List(_) | Value::Map(_))) => Some(value),
            Some(other) => {
                return Err(Error::invalid_argument(format!(
                    "If target is provided, it must be a list or a map, '{}' given",
                    other.debug_type()
                )))
            }
        };

        let key_types = target_type.key_types();
        let value_types = target_type.value_types();
        let keyed = !unconstrained(key_types)
            && key_types
                .first()
                .is_some_and(|key| key.builtin_kind() != Builtin::Int);
        let as_map =
            keyed || (unconstrained(key_types) && matches!(source, Value::Map(_)));

        let mut list = Vec::new();
        let mut map = Vec::new();

        for (key, member) in members {
            let element = if unconstrained(value_types) {
                member.clone()
            } else {
                let previous = existing
                    .as_ref()
                    .and_then(|collection| existing_object(collection, &key));
                context.transform(member, previous, Some(value_types))?
            };

            if keyed {
                let key = context.transform(&key, None, Some(key_types))?;
                map.push((key, element));
            } else if as_map {
                map.push((key, element));
            } else {
                list.push(element);
            }
        }

        if as_map {
            Ok(Value::Map(map))
        } else {
            Ok(Value::List(list))
        }
    }

    fn class_name(&self) -> &'static str {
        "ListStrategy"
    }
}

fn unconstrained(types: &[Type]) -> bool {
    types.iter().all(Type::is_mixed)
}

// Only objects are updated in place; anything else is rebuilt
fn existing_object(collection: &Value, key: &Value) -> Option<Value> {
    let found = match (collection, key) {
        (Value::List(items), Value::Int(index)) => {
            usize::try_from(*index).ok().and_then(|i| items.get(i))
        }
        (Value::Map(entries), key) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        _ => None,
    };
    found.filter(|value| value.as_object().is_some()).cloned()
}
