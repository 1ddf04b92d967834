//! Mapper configuration

use crate::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming the mapping table cache file
pub const MAPPING_CACHE_ENV: &str = "OBJMAP_MAPPING_CACHE";

/// Settings applied by [`crate::MainTransformerBuilder::build`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Where to persist the built mapping table; `None` keeps it in memory only
    pub mapping_cache_path: Option<PathBuf>,

    /// Classes transformed by value and never tracked in the object cache
    pub value_classes: Vec<String>,
}

impl MapperConfig {
    /// Defaults with environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_with_env();
        config
    }

    /// Apply environment overrides on top of the current values
    pub fn merge_with_env(&mut self) {
        if let Ok(path) = std::env::var(MAPPING_CACHE_ENV) {
            if !path.trim().is_empty() {
                self.mapping_cache_path = Some(PathBuf::from(path));
            }
        }
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
