//! Transform context threaded through one transformation tree
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use crate::object_cache::ObjectCache;
use crate::transformer::MainTransformer;
use crate::types::Type;
use crate::{Result, Value};
use std::collections::HashMap;

/// Mutable state shared by every call of one top-level transformation
///
/// The context is created for the first call of a tree and passed by `&mut`
/// to every strategy invoked below it. It owns the tree's [`ObjectCache`] and
/// borrows the dispatcher, so strategies recurse with
/// [`TransformContext::transform`]. Contexts are never shared between trees.
pub struct TransformContext<'a> {
    transformer: &'a MainTransformer,
    object_cache: Option<ObjectCache>,
    depth: usize,

    /// Custom context data for strategies
    pub attributes: HashMap<String, serde_json::Value>,
}

impl<'a> TransformContext<'a> {
    /// Create a fresh context for a new transformation tree
    pub fn new(transformer: &'a MainTransformer) -> Self {
        Self {
            transformer,
            object_cache: None,
            depth: 0,
            attributes: HashMap::new(),
        }
    }

    /// The dispatcher this tree runs on
    pub fn transformer(&self) -> &'a MainTransformer {
        self.transformer
    }

    /// Transform a nested value within this tree
    pub fn transform(
        &mut self,
        source: &Value,
        target: Option<Value>,
        target_types: Option<&[Type]>,
    ) -> Result<Value> {
        let transformer = self.transformer;
        transformer.transform_with_context(source, target, target_types, self)
    }

    /// The tree's object cache, created on first access
    pub fn object_cache(&mut self) -> &mut ObjectCache {
        let resolver = self.transformer.resolver_handle();
        self.object_cache
            .get_or_insert_with(|| ObjectCache::new(resolver))
    }

    pub fn has_object_cache(&self) -> bool {
        self.object_cache.is_some()
    }

    /// Current nesting depth of dispatcher calls
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Add custom data to the context
    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Get custom data from the context
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }
}
