//! Builder for creating a configured dispatcher
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use super::MainTransformer;
use crate::config::MapperConfig;
use crate::mapping::{FileMappingCache, MappingCache, MappingFactory};
use crate::strategies::{
    CopyStrategy, DateTimeStrategy, ListStrategy, PropertyMappingStrategy, ScalarStrategy,
};
use crate::strategy::{Strategy, StrategyRegistry};
use crate::types::{ClassDef, ClassRegistry, TypeResolver};
use crate::Result;
use std::sync::Arc;

/// Priorities of the bundled strategies
pub const DATETIME_PRIORITY: i32 = 10;
pub const SCALAR_PRIORITY: i32 = 0;
pub const LIST_PRIORITY: i32 = 0;
/// Generic object copying yields to anything more specific
pub const PROPERTY_MAPPING_PRIORITY: i32 = -10;
/// Last resort for `mixed` targets
pub const COPY_PRIORITY: i32 = -100;

/// Builder for [`MainTransformer`]
///
/// Registration problems such as duplicate ids or unknown ancestors are
/// reported by [`MainTransformerBuilder::build`].
pub struct MainTransformerBuilder {
    classes: Vec<ClassDef>,
    strategies: Vec<(String, Arc<dyn Strategy>, i32)>,
    cache: Option<Box<dyn MappingCache>>,
    config: MapperConfig,
}

impl Default for MainTransformerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MainTransformerBuilder {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            strategies: Vec::new(),
            cache: None,
            config: MapperConfig::default(),
        }
    }

    /// Declare a class or interface
    pub fn class(mut self, class: ClassDef) -> Self {
        self.classes.push(class);
        self
    }

    pub fn classes(mut self, classes: impl IntoIterator<Item = ClassDef>) -> Self {
        self.classes.extend(classes);
        self
    }

    /// Register a strategy with the default priority
    pub fn strategy(self, id: impl Into<String>, strategy: impl Strategy + 'static) -> Self {
        self.strategy_with_priority(id, strategy, 0)
    }

    /// Register a strategy; higher priorities are tried first
    pub fn strategy_with_priority(
        mut self,
        id: impl Into<String>,
        strategy: impl Strategy + 'static,
        priority: i32,
    ) -> Self {
        self.strategies.push((id.into(), Arc::new(strategy), priority));
        self
    }

    /// Register the bundled strategies
    pub fn with_builtin_strategies(self) -> Self {
        self.strategy_with_priority("objmap.datetime", DateTimeStrategy, DATETIME_PRIORITY)
            .strategy_with_priority("objmap.scalar", ScalarStrategy, SCALAR_PRIORITY)
            .strategy_with_priority("objmap.list", ListStrategy, LIST_PRIORITY)
            .strategy_with_priority(
                "objmap.property_mapping",
                PropertyMappingStrategy,
                PROPERTY_MAPPING_PRIORITY,
            )
            .strategy_with_priority("objmap.copy", CopyStrategy, COPY_PRIORITY)
    }

    /// Persist the mapping table through `cache`
    ///
    /// Takes precedence over a cache path set in the configuration.
    pub fn mapping_cache(mut self, cache: impl MappingCache + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the dispatcher
    ///
    /// The mapping table itself is built lazily on the first transformation,
    /// or eagerly with [`MainTransformer::warm_up`].
    pub fn build(self) -> Result<MainTransformer> {
        let mut classes = ClassRegistry::new();
        for class in self.classes {
            classes.declare(class)?;
        }
        for name in &self.config.value_classes {
            classes.mark_value_type(name)?;
        }
        classes.validate()?;

        let mut strategies = StrategyRegistry::new();
        for (id, strategy, priority) in self.strategies {
            strategies.register(id, strategy, priority)?;
        }

        let resolver = Arc::new(TypeResolver::new(classes));
        let strategies = Arc::new(strategies);
        let mut factory = MappingFactory::new(Arc::clone(&strategies), Arc::clone(&resolver));

        let cache = self.cache.or_else(|| {
            self.config
                .mapping_cache_path
                .clone()
                .map(|path| Box::new(FileMappingCache::new(path)) as Box<dyn MappingCache>)
        });
        if let Some(cache) = cache {
            factory = factory.with_cache(cache);
        }

        tracing::debug!(
            classes = resolver.classes().len(),
            strategies = strategies.len(),
            "built transformer"
        );

        Ok(MainTransformer::from_parts(
            resolver,
            strategies,
            factory,
            self.config,
        ))
    }
}
