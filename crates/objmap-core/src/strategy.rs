//! Strategy contract consumed by the dispatcher
//!
//! A strategy advertises the (source, target) type pairs it can handle and
//! performs the transformation for one value. Strategies that need to
//! transform nested values call back into the dispatcher through
//! [`TransformContext::transform`], sharing the context and its object cache.

use crate::context::TransformContext;
use crate::types::Type;
use crate::{Error, Result, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One declared (source, target) capability of a strategy
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    pub source: Type,
    pub target: Type,
}

impl TypeMapping {
    pub fn new(source: Type, target: Type) -> Self {
        Self { source, target }
    }
}

/// A registered unit capable of transforming specific type pairs
pub trait Strategy: Send + Sync {
    /// Declarative capability advertisement, read once when the registry is built
    fn supported_transformations(&self) -> Vec<TypeMapping>;

    /// Produce the target value for `source`
    ///
    /// `target` is an existing instance to update, when the caller has one.
    /// `target_type` is always a simple type.
    fn transform(
        &self,
        source: &Value,
        target: Option<Value>,
        source_type: &Type,
        target_type: &Type,
        context: &mut TransformContext<'_>,
    ) -> Result<Value>;

    /// Diagnostic label stored in mapping entries
    fn class_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A strategy together with its registration metadata
#[derive(Clone)]
pub struct StrategyRegistration {
    pub id: String,
    /// Higher priorities are indexed first
    pub priority: i32,
    pub strategy: Arc<dyn Strategy>,
    /// Declared transformations, read once at registration
    pub declared: Vec<TypeMapping>,
}

impl fmt::Debug for StrategyRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistration")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("class", &self.strategy.class_name())
            .field("declared", &self.declared.len())
            .finish()
    }
}

/// In-memory registry resolving strategy ids to instances
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    registrations: Vec<StrategyRegistration>,
    by_id: HashMap<String, usize>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under a unique id
    pub fn register(
        &mut self,
        id: impl Into<String>,
        strategy: Arc<dyn Strategy>,
        priority: i32,
    ) -> Result<()> {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            return Err(Error::configuration(format!(
                "Strategy id '{}' is already registered",
                id
            )));
        }
        let declared = strategy.supported_transformations();
        self.by_id.insert(id.clone(), self.registrations.len());
        self.registrations.push(StrategyRegistration {
            id,
            priority,
            strategy,
            declared,
        });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Strategy>> {
        self.by_id
            .get(id)
            .map(|&index| &self.registrations[index].strategy)
    }

    /// Registrations sorted by priority, highest first, ties in registration order
    pub fn ordered(&self) -> Vec<&StrategyRegistration> {
        let mut ordered: Vec<&StrategyRegistration> = self.registrations.iter().collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        ordered
    }

    /// Identifies the registered set; a persisted table is valid only for the same fingerprint
    ///
    /// One line per strategy in dispatch order:
    /// `id=class@priority:source->target;...` over its declared transformations.
    pub fn fingerprint(&self) -> Vec<String> {
        self.ordered()
            .into_iter()
            .map(|r| {
                let declared: Vec<String> = r
                    .declared
                    .iter()
                    .map(|m| format!("{}->{}", m.source, m.target))
                    .collect();
                format!(
                    "{}={}@{}:{}",
                    r.id,
                    r.strategy.class_name(),
                    r.priority,
                    declared.join(";")
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
