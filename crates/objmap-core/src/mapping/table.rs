//! Mapping table indexing strategies by (source type, target type) keys

use crate::strategy::StrategyRegistry;
use crate::types::{Type, TypeResolver};
use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One (source type, target type) association with a strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Priority sequence; lower runs first
    pub order: u32,
    /// Strategy id used to resolve the instance
    pub id: String,
    /// Diagnostic label of the strategy implementation
    pub class: String,
    pub source_type: String,
    pub target_type: String,
}

/// Read-only index of mapping entries
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
    index: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl PartialEq for MappingTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from every registered strategy's declared transformations
    ///
    /// Fails with [`Error::Configuration`] when a declared type names a class
    /// that is not part of the resolver's hierarchy.
    pub fn build(strategies: &StrategyRegistry, resolver: &TypeResolver) -> Result<Self> {
        let mut table = Self::new();

        for registration in strategies.ordered() {
            let class = registration.strategy.class_name();

            for mapping in &registration.declared {
                for declared in [&mapping.source, &mapping.target] {
                    let unknown = resolver.unknown_classes(declared);
                    if !unknown.is_empty() {
                        return Err(Error::configuration(format!(
                            "Strategy '{}' declares transformation '{}' -> '{}' referencing unknown class '{}'",
                            registration.id,
                            mapping.source,
                            mapping.target,
                            unknown.join("', '")
                        )));
                    }
                }

                let sources = resolver.to_simple_types(std::slice::from_ref(&mapping.source));
                let targets = resolver.to_simple_types(std::slice::from_ref(&mapping.target));

                for source in &sources {
                    for target in &targets {
                        table.add_entry(&registration.id, class, source, target);
                    }
                }
            }
        }

        tracing::debug!(
            entries = table.len(),
            strategies = strategies.len(),
            "built mapping table"
        );
        Ok(table)
    }

    fn add_entry(&mut self, id: &str, class: &str, source: &Type, target: &Type) {
        let order = self.entries.len() as u32;
        self.push(MappingEntry {
            order,
            id: id.to_string(),
            class: class.to_string(),
            source_type: source.canonical_key(),
            target_type: target.canonical_key(),
        });
    }

    fn push(&mut self, entry: MappingEntry) {
        let position = self.entries.len();
        self.index
            .entry(entry.source_type.clone())
            .or_default()
            .entry(entry.target_type.clone())
            .or_default()
            .push(position);
        self.entries.push(entry);
    }

    /// Rebuild a table from stored entries
    ///
    /// Entries must be in strictly ascending `order`.
    pub fn from_entries(entries: Vec<MappingEntry>) -> Result<Self> {
        let mut table = Self::new();
        for entry in entries {
            if let Some(last) = table.entries.last() {
                if entry.order <= last.order {
                    return Err(Error::invalid_argument(format!(
                        "Mapping entry order {} does not follow order {}",
                        entry.order, last.order
                    )));
                }
            }
            table.push(entry);
        }
        Ok(table)
    }

    /// Check stored entries against the resolver's class hierarchy
    ///
    /// Fails with [`Error::Configuration`] when a type string does not parse
    /// or names a class that is not declared, the same way [`MappingTable::build`]
    /// fails for a declared transformation.
    pub fn validate(&self, resolver: &TypeResolver) -> Result<()> {
        for entry in &self.entries {
            for key in [&entry.source_type, &entry.target_type] {
                let ty: Type = key.parse().map_err(|e| {
                    Error::configuration(format!(
                        "Mapping entry {} has an unreadable type '{}': {}",
                        entry.order, key, e
                    ))
                })?;
                let unknown = resolver.unknown_classes(&ty);
                if !unknown.is_empty() {
                    return Err(Error::configuration(format!(
                        "Mapping entry {} of strategy '{}' references unknown class '{}'",
                        entry.order,
                        entry.id,
                        unknown.join("', '")
                    )));
                }
            }
        }
        Ok(())
    }

    /// All entries in ascending order
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching any (source, target) combination, ascending by order
    pub fn lookup(&self, source_types: &[String], target_types: &[String]) -> Vec<MappingEntry> {
        let mut positions = Vec::new();
        let mut seen = HashSet::new();

        for source in source_types {
            let Some(by_target) = self.index.get(source) else {
                continue;
            };
            for target in target_types {
                let Some(found) = by_target.get(target) else {
                    continue;
                };
                for &position in found {
                    if seen.insert(position) {
                        positions.push(position);
                    }
                }
            }
        }

        let mut result: Vec<MappingEntry> = positions
            .into_iter()
            .map(|position| self.entries[position].clone())
            .collect();
        result.sort_by_key(|entry| entry.order);
        result
    }

    /// Entries whose types or strategy match every given pattern
    pub fn filter(&self, filter: &MappingFilter) -> Result<Vec<&MappingEntry>> {
        let source = compile(filter.source.as_deref())?;
        let target = compile(filter.target.as_deref())?;
        let class = compile(filter.class.as_deref())?;

        Ok(self
            .entries
            .iter()
            .filter(|entry| source.as_ref().map_or(true, |re| re.is_match(&entry.source_type)))
            .filter(|entry| target.as_ref().map_or(true, |re| re.is_match(&entry.target_type)))
            .filter(|entry| {
                class
                    .as_ref()
                    .map_or(true, |re| re.is_match(&entry.class) || re.is_match(&entry.id))
            })
            .collect())
    }
}

impl<'a> IntoIterator for &'a MappingTable {
    type Item = &'a MappingEntry;
    type IntoIter = std::slice::Iter<'a, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Case-insensitive substring filters for table inspection
#[derive(Debug, Clone, Default)]
pub struct MappingFilter {
    pub source: Option<String>,
    pub target: Option<String>,
    /// Matched against both the strategy class and its id
    pub class: Option<String>,
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .filter(|p| !p.is_empty())
        .map(|p| {
            RegexBuilder::new(&regex::escape(p))
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::invalid_argument(format!("Invalid filter '{}': {}", p, e)))
        })
        .transpose()
}
