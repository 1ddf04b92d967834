//! Build-once holder of the process mapping table

use super::cache::MappingCache;
use super::table::MappingTable;
use crate::strategy::StrategyRegistry;
use crate::types::TypeResolver;
use crate::Result;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Lazily builds the mapping table once and serves it read-only afterwards
///
/// The first caller builds under the write lock; later callers only take the
/// read lock and share the same `Arc`. When a [`MappingCache`] is attached, a
/// stored table is tried before building, and a freshly built one is stored.
/// A stored table naming a class the resolver does not know is discarded.
pub struct MappingFactory {
    strategies: Arc<StrategyRegistry>,
    resolver: Arc<TypeResolver>,
    cache: Option<Box<dyn MappingCache>>,
    table: RwLock<Option<Arc<MappingTable>>>,
}

impl fmt::Debug for MappingFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingFactory")
            .field("strategies", &self.strategies.len())
            .field("cached", &self.cache.is_some())
            .field("built", &self.is_built())
            .finish()
    }
}

impl MappingFactory {
    pub fn new(strategies: Arc<StrategyRegistry>, resolver: Arc<TypeResolver>) -> Self {
        Self {
            strategies,
            resolver,
            cache: None,
            table: RwLock::new(None),
        }
    }

    /// Attach an external store for the built table
    pub fn with_cache(mut self, cache: Box<dyn MappingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn is_built(&self) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The mapping table, building or restoring it on first use
    pub fn mapping(&self) -> Result<Arc<MappingTable>> {
        {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = table.as_ref() {
                return Ok(Arc::clone(table));
            }
        }

        let mut slot = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.restore_or_build()?);
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Build a fresh table, replace the current one and persist it
    pub fn warm_up(&self) -> Result<Arc<MappingTable>> {
        let mut slot = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let table = Arc::new(self.build_and_store()?);
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Forget the current table and clear the external store
    ///
    /// The next [`MappingFactory::mapping`] call rebuilds.
    pub fn invalidate(&self) -> Result<()> {
        let mut slot = self.table.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        if let Some(cache) = &self.cache {
            cache.clear()?;
        }
        Ok(())
    }

    fn restore_or_build(&self) -> Result<MappingTable> {
        if let Some(cache) = &self.cache {
            let restored = cache
                .load(&self.strategies.fingerprint())
                .and_then(|table| match table {
                    Some(table) => table.validate(&self.resolver).map(|()| Some(table)),
                    None => Ok(None),
                });
            match restored {
                Ok(Some(table)) => {
                    tracing::debug!(entries = table.len(), "restored mapping table from cache");
                    return Ok(table);
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Discarding unusable mapping cache: {}", e);
                    if let Err(e) = cache.clear() {
                        log::warn!("Failed to clear mapping cache: {}", e);
                    }
                }
            }
        }

        self.build_and_store()
    }

    fn build_and_store(&self) -> Result<MappingTable> {
        let table = MappingTable::build(&self.strategies, &self.resolver)?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&self.strategies.fingerprint(), &table) {
                log::warn!("Failed to store mapping cache: {}", e);
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TransformContext;
    use crate::mapping::cache::{self, FileMappingCache};
    use crate::mapping::table::MappingEntry;
    use crate::strategy::{Strategy, TypeMapping};
    use crate::types::{ClassDef, ClassRegistry, Type};
    use crate::{Error, Value};
    use std::fs;
    use tempfile::TempDir;

    struct Declares(Vec<TypeMapping>);

    impl Strategy for Declares {
        fn supported_transformations(&self) -> Vec<TypeMapping> {
            self.0.clone()
        }

        fn transform(
            &self,
            _source: &Value,
            _target: Option<Value>,
            _source_type: &Type,
            _target_type: &Type,
            _context: &mut TransformContext<'_>,
        ) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn strategies(mappings: Vec<TypeMapping>) -> Arc<StrategyRegistry> {
        let mut strategies = StrategyRegistry::new();
        strategies
            .register("declares", Arc::new(Declares(mappings)), 0)
            .unwrap();
        Arc::new(strategies)
    }

    fn factory() -> MappingFactory {
        MappingFactory::new(
            strategies(vec![TypeMapping::new(Type::int(), Type::string())]),
            Arc::new(TypeResolver::default()),
        )
    }

    fn entry(order: u32, source: &str, target: &str) -> MappingEntry {
        MappingEntry {
            order,
            id: "declares".to_string(),
            class: "stored".to_string(),
            source_type: source.to_string(),
            target_type: target.to_string(),
        }
    }

    #[test]
    fn test_builds_once() {
        let factory = factory();

        assert!(!factory.is_built());
        let first = factory.mapping().unwrap();
        let second = factory.mapping().unwrap();
        assert!(factory.is_built());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_first_use_builds_once() {
        let factory = Arc::new(factory());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = Arc::clone(&factory);
                std::thread::spawn(move || factory.mapping().unwrap())
            })
            .collect();
        let tables: Vec<Arc<MappingTable>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(tables.iter().all(|t| Arc::ptr_eq(t, &tables[0])));
        assert_eq!(tables[0].len(), 1);
    }

    #[test]
    fn test_invalidate_rebuilds() {
        let factory = factory();

        let first = factory.mapping().unwrap();
        factory.invalidate().unwrap();
        let second = factory.mapping().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_restores_from_cache_without_building() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        let factory = factory().with_cache(Box::new(FileMappingCache::new(&path)));

        // Differs from what a build would produce, so only a restore yields it
        let stored = MappingTable::from_entries(vec![
            entry(0, "int", "string"),
            entry(1, "bool", "string"),
        ])
        .unwrap();
        fs::write(
            &path,
            cache::encode(&factory.strategies.fingerprint(), &stored).unwrap(),
        )
        .unwrap();

        let table = factory.mapping().unwrap();
        assert_eq!(*table, stored);
        assert_eq!(table.entries()[1].class, "stored");
    }

    #[test]
    fn test_restored_table_with_unknown_class_is_rebuilt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        let factory = factory().with_cache(Box::new(FileMappingCache::new(&path)));

        let stale = MappingTable::from_entries(vec![entry(0, "Ghost", "string")]).unwrap();
        fs::write(
            &path,
            cache::encode(&factory.strategies.fingerprint(), &stale).unwrap(),
        )
        .unwrap();

        let table = factory.mapping().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].source_type, "int");
        assert!(!fs::read_to_string(&path).unwrap().contains("Ghost"));
    }

    #[test]
    fn test_removed_class_fails_like_a_cold_build() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        let ghostly = || vec![TypeMapping::new(Type::class("Ghost"), Type::string())];

        let mut classes = ClassRegistry::new();
        classes.declare(ClassDef::new("Ghost")).unwrap();
        let warm = MappingFactory::new(strategies(ghostly()), Arc::new(TypeResolver::new(classes)))
            .with_cache(Box::new(FileMappingCache::new(&path)));
        warm.warm_up().unwrap();
        assert!(path.exists());

        let cold = MappingFactory::new(strategies(ghostly()), Arc::new(TypeResolver::default()))
            .with_cache(Box::new(FileMappingCache::new(&path)));
        let err = cold.mapping().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(!cold.is_built());
    }

    #[test]
    fn test_corrupt_cache_triggers_rebuild() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        fs::write(&path, "definitely not a mapping table").unwrap();

        let factory = factory().with_cache(Box::new(FileMappingCache::new(&path)));

        let table = factory.mapping().unwrap();
        assert_eq!(table.len(), 1);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("\"format_version\""));
    }
}
