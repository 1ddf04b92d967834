//! The dispatcher: routes a value to the strategy registered for its types
//!
//! Each call resolves the requested target types, classifies the source value,
//! and asks the mapping table for candidates over the applicable type strings
//! of both sides. The first candidate found for the first simple target type
//! that has any is invoked. Its result, or its error, is the result of the
//! call. There is no fallback to lower ranked candidates.
//!
//! ```
//! use objmap_core::{MainTransformerBuilder, Type, Value};
//!
//! let transformer = MainTransformerBuilder::new()
//!     .with_builtin_strategies()
//!     .build()
//!     .unwrap();
//!
//! let result = transformer
//!     .transform(&Value::Int(42), None, Some(&[Type::string()]))
//!     .unwrap();
//! assert_eq!(result, Value::from("42"));
//! ```
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

pub mod builder;

#[cfg(test)]
mod tests;

pub use builder::MainTransformerBuilder;

use crate::config::MapperConfig;
use crate::context::TransformContext;
use crate::mapping::{MappingEntry, MappingFactory, MappingTable};
use crate::strategy::StrategyRegistry;
use crate::types::{Builtin, Type, TypeResolver};
use crate::{Error, Result, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Main transformer dispatching values to registered strategies
#[derive(Debug)]
pub struct MainTransformer {
    resolver: Arc<TypeResolver>,
    strategies: Arc<StrategyRegistry>,
    factory: MappingFactory,
    config: MapperConfig,
}

impl MainTransformer {
    pub(crate) fn from_parts(
        resolver: Arc<TypeResolver>,
        strategies: Arc<StrategyRegistry>,
        factory: MappingFactory,
        config: MapperConfig,
    ) -> Self {
        Self {
            resolver,
            strategies,
            factory,
            config,
        }
    }

    pub fn builder() -> MainTransformerBuilder {
        MainTransformerBuilder::new()
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Shared handle to the resolver, for caches that outlive a borrow
    pub fn resolver_handle(&self) -> Arc<TypeResolver> {
        Arc::clone(&self.resolver)
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Fresh context for a new transformation tree
    pub fn new_context(&self) -> TransformContext<'_> {
        TransformContext::new(self)
    }

    /// The mapping table, built on first use
    pub fn mapping(&self) -> Result<Arc<MappingTable>> {
        self.factory.mapping()
    }

    /// Build and persist the mapping table ahead of the first transformation
    pub fn warm_up(&self) -> Result<Arc<MappingTable>> {
        self.factory.warm_up()
    }

    /// Drop the built table and its persisted copy
    pub fn invalidate_mapping(&self) -> Result<()> {
        self.factory.invalidate()
    }

    /// Transform `source` as the root of a new tree
    ///
    /// `target` is an existing value to update. When `target_types` is absent
    /// the target type is classified from `target`, which must then be given
    /// and not null.
    pub fn transform(
        &self,
        source: &Value,
        target: Option<Value>,
        target_types: Option<&[Type]>,
    ) -> Result<Value> {
        let mut context = self.new_context();
        self.transform_with_context(source, target, target_types, &mut context)
    }

    /// Transform `source` within an existing tree
    pub fn transform_with_context(
        &self,
        source: &Value,
        target: Option<Value>,
        target_types: Option<&[Type]>,
        context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        let requested = self.requested_target_types(target.as_ref(), target_types)?;
        context.object_cache();

        if source.is_null() && requested.iter().any(accepts_null) {
            tracing::trace!(depth = context.depth(), "null source accepted as null");
            return Ok(Value::Null);
        }

        let source_type = self.resolver.classify_value(source);
        let source_keys = self.resolver.applicable_type_strings(&source_type);
        let simple_targets = self.resolver.to_simple_types(&requested);
        let table = self.mapping()?;

        for target_type in &simple_targets {
            let target_keys = self.resolver.applicable_type_strings(target_type);
            let candidates = table.lookup(&source_keys, &target_keys);
            let Some(entry) = candidates.first() else {
                continue;
            };

            let strategy = self.strategies.get(&entry.id).ok_or_else(|| {
                Error::configuration(format!(
                    "Mapping entry {} names strategy '{}' which is not registered",
                    entry.order, entry.id
                ))
            })?;

            tracing::debug!(
                source_type = %source_type,
                target_type = %target_type,
                strategy = %entry.id,
                order = entry.order,
                depth = context.depth(),
                "dispatching transformation"
            );

            context.enter();
            let result = strategy.transform(source, target, &source_type, target_type, context);
            context.leave();
            return result;
        }

        Err(Error::NoSuitableTransformer {
            source_type: source_type.to_string(),
            target_types: simple_targets.iter().map(Type::to_string).collect(),
        })
    }

    fn requested_target_types(
        &self,
        target: Option<&Value>,
        target_types: Option<&[Type]>,
    ) -> Result<Vec<Type>> {
        match (target_types, target) {
            (Some(types), _) if !types.is_empty() => Ok(types.to_vec()),
            (_, Some(target)) if !target.is_null() => Ok(vec![self.resolver.classify_value(target)]),
            _ => Err(Error::invalid_argument(
                "Either the target value or the target type is required",
            )),
        }
    }

    /// Candidates for a type pair, in the order dispatch would try them
    ///
    /// Candidates of each simple target type follow those of the previous one.
    pub fn transformer_mapping(
        &self,
        source_type: &Type,
        target_type: &Type,
    ) -> Result<Vec<MappingEntry>> {
        let table = self.mapping()?;
        let source_keys = self.resolver.applicable_type_strings(source_type);
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for simple in self.resolver.to_simple_types(std::slice::from_ref(target_type)) {
            let target_keys = self.resolver.applicable_type_strings(&simple);
            for entry in table.lookup(&source_keys, &target_keys) {
                if seen.insert(entry.order) {
                    result.push(entry);
                }
            }
        }

        Ok(result)
    }

    /// [`MainTransformer::transformer_mapping`] over type strings such as `?array<int,Dog>`
    pub fn try_mapping(&self, source_type: &str, target_type: &str) -> Result<Vec<MappingEntry>> {
        let source: Type = source_type.parse()?;
        let target: Type = target_type.parse()?;
        self.transformer_mapping(&source, &target)
    }
}

fn accepts_null(ty: &Type) -> bool {
    ty.is_nullable() || ty.is_mixed() || ty.builtin_kind() == Builtin::Null
}
