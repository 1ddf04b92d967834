//! Per-tree memoization of transformed objects with cycle detection
//!
//! The cache maps (source object identity, target type key) to a record that is
//! either in flight or committed. A strategy that must allocate its target
//! before recursing into the target's fields marks the pair with
//! [`ObjectCache::pre_cache`] first and commits it with
//! [`ObjectCache::save_target`] once populated. Asking for the target of an
//! in-flight pair means the source graph loops back onto an ancestor that is
//! still being built, which is reported as [`Error::CircularReference`].
//!
//! Only objects are cached. Scalars, collections, temporal values and objects
//! of value-type classes are exempt: every operation is a no-op or reports
//! "not cached" for them.
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use crate::types::{Type, TypeResolver};
use crate::{Error, ObjectRef, Result, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_id: usize,
    target_type: String,
}

#[derive(Debug)]
enum CacheRecord {
    InFlight,
    Committed(Value),
}

/// Object cache scoped to one top-level transformation
#[derive(Debug)]
pub struct ObjectCache {
    resolver: Arc<TypeResolver>,
    records: HashMap<CacheKey, CacheRecord>,
    // Keeps source objects alive so their identities are not reused mid-tree
    anchors: HashMap<usize, ObjectRef>,
}

impl ObjectCache {
    pub fn new(resolver: Arc<TypeResolver>) -> Self {
        Self {
            resolver,
            records: HashMap::new(),
            anchors: HashMap::new(),
        }
    }

    /// The cacheable object behind `source`, if any
    fn cacheable<'v>(&self, source: &'v Value) -> Option<&'v ObjectRef> {
        let object = source.as_object()?;
        if self.resolver.classes().is_value_type(&object.class()) {
            return None;
        }
        Some(object)
    }

    fn key(&self, object: &ObjectRef, target_type: &Type) -> Result<CacheKey> {
        if !self.resolver.is_simple(target_type) {
            return Err(Error::invalid_argument(format!(
                "Target type must be a simple type, '{}' given",
                target_type
            )));
        }
        Ok(CacheKey {
            source_id: object.id(),
            target_type: self.resolver.canonical_key(target_type),
        })
    }

    /// Mark (source, target type) as in flight
    pub fn pre_cache(&mut self, source: &Value, target_type: &Type) -> Result<()> {
        let Some(object) = self.cacheable(source) else {
            return Ok(());
        };
        let key = self.key(object, target_type)?;
        self.anchors
            .entry(key.source_id)
            .or_insert_with(|| object.clone());
        self.records.entry(key).or_insert(CacheRecord::InFlight);
        Ok(())
    }

    /// Whether the pair is in flight and not yet committed
    pub fn is_pre_cached(&self, source: &Value, target_type: &Type) -> Result<bool> {
        let Some(object) = self.cacheable(source) else {
            return Ok(false);
        };
        let key = self.key(object, target_type)?;
        Ok(matches!(self.records.get(&key), Some(CacheRecord::InFlight)))
    }

    /// Whether a target has been committed for the pair
    pub fn contains_target(&self, source: &Value, target_type: &Type) -> Result<bool> {
        let Some(object) = self.cacheable(source) else {
            return Ok(false);
        };
        let key = self.key(object, target_type)?;
        Ok(matches!(self.records.get(&key), Some(CacheRecord::Committed(_))))
    }

    /// The committed target for the pair
    pub fn get_target(&self, source: &Value, target_type: &Type) -> Result<Value> {
        let not_found = || Error::NotFoundInCache {
            source_type: source.debug_type(),
            target_type: target_type.to_string(),
        };
        let Some(object) = self.cacheable(source) else {
            return Err(not_found());
        };
        let key = self.key(object, target_type)?;
        match self.records.get(&key) {
            Some(CacheRecord::Committed(target)) => Ok(target.clone()),
            Some(CacheRecord::InFlight) => Err(Error::CircularReference {
                source_type: source.debug_type(),
                target_type: key.target_type,
            }),
            None => Err(not_found()),
        }
    }

    /// Commit the target for the pair, clearing its in-flight mark
    ///
    /// Committing a different target for an already committed pair is a
    /// strategy bug and fails with [`Error::CacheConsistency`]. Committing the
    /// same target again is accepted.
    pub fn save_target(&mut self, source: &Value, target_type: &Type, target: Value) -> Result<()> {
        let Some(object) = self.cacheable(source) else {
            return Ok(());
        };
        let key = self.key(object, target_type)?;

        if let Some(CacheRecord::Committed(existing)) = self.records.get(&key) {
            if *existing == target {
                return Ok(());
            }
            return Err(Error::CacheConsistency {
                message: format!(
                    "Target object for source object '{}' and target type '{}' already exists",
                    source.debug_type(),
                    key.target_type
                ),
            });
        }

        self.anchors
            .entry(key.source_id)
            .or_insert_with(|| object.clone());
        self.records.insert(key, CacheRecord::Committed(target));
        Ok(())
    }

    /// Number of tracked (source, target type) pairs
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
