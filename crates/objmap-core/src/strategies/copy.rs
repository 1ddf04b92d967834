//! Identity fallback for the `mixed` wildcard
//!
//! Declared as `mixed` to `mixed`, so every lookup reaches it once nothing
//! more specific matched. A value is copied when the target is `mixed` or the
//! source type already satisfies the target; anything else is reported as
//! having no route.

use crate::context::TransformContext;
use crate::strategy::{Strategy, TypeMapping};
use crate::types::Type;
use crate::{Error, Result, Value};

/// Returns the source unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyStrategy;

impl Strategy for CopyStrategy {
    fn supported_transformations(&self) -> Vec<TypeMapping> {
        vec![TypeMapping::new(Type::mixed(), Type::mixed())]
    }

    fn transform(
        &self,
        source: &Value,
        _target: Option<Value>,
        source_type: &Type,
        target_type: &Type,
        context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        if target_type.is_mixed() || satisfies(context, source_type, target_type) {
            return Ok(source.clone());
        }
        Err(Error::NoSuitableTransformer {
            source_type: source_type.to_string(),
            target_types: vec![target_type.to_string()],
        })
    }

    fn class_name(&self) -> &'static str {
        "CopyStrategy"
    }
}

fn satisfies(context: &TransformContext<'_>, source_type: &Type, target_type: &Type) -> bool {
    let wanted = target_type.clone().non_nullable().canonical_key();
    context
        .transformer()
        .resolver()
        .applicable_type_strings(source_type)
        .contains(&wanted)
}
