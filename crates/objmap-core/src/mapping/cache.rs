//! Persistence of built mapping tables
//!
//! A stored table is only trusted when it deserializes cleanly, carries the
//! current format version and was built from the same strategy fingerprint.
//! Anything else is treated as a cold cache by the factory.
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use super::table::{MappingEntry, MappingTable};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Version of the stored table layout
pub const FORMAT_VERSION: u32 = 1;

/// External store for a built mapping table
pub trait MappingCache: Send + Sync {
    /// Restore a table; `Ok(None)` means nothing is stored yet
    fn load(&self, fingerprint: &[String]) -> Result<Option<MappingTable>>;

    fn store(&self, fingerprint: &[String], table: &MappingTable) -> Result<()>;

    /// Drop whatever is stored
    fn clear(&self) -> Result<()>;
}

#[derive(Serialize)]
struct StoredMappingRef<'a> {
    format_version: u32,
    fingerprint: &'a [String],
    entries: &'a [MappingEntry],
}

#[derive(Deserialize)]
struct StoredMapping {
    format_version: u32,
    fingerprint: Vec<String>,
    entries: Vec<MappingEntry>,
}

/// Serialize a table with its fingerprint
pub fn encode(fingerprint: &[String], table: &MappingTable) -> Result<String> {
    let stored = StoredMappingRef {
        format_version: FORMAT_VERSION,
        fingerprint,
        entries: table.entries(),
    };
    Ok(serde_json::to_string_pretty(&stored)?)
}

/// Deserialize and validate a stored table
pub fn decode(fingerprint: &[String], data: &str) -> Result<MappingTable> {
    let stored: StoredMapping = serde_json::from_str(data)?;
    if stored.format_version != FORMAT_VERSION {
        return Err(Error::invalid_argument(format!(
            "Stored mapping has format version {}, expected {}",
            stored.format_version, FORMAT_VERSION
        )));
    }
    if stored.fingerprint != fingerprint {
        return Err(Error::invalid_argument(
            "Stored mapping was built from a different strategy set",
        ));
    }
    MappingTable::from_entries(stored.entries)
}

/// JSON file backed mapping cache
#[derive(Debug, Clone)]
pub struct FileMappingCache {
    path: PathBuf,
}

impl FileMappingCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingCache for FileMappingCache {
    fn load(&self, fingerprint: &[String]) -> Result<Option<MappingTable>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(fingerprint, &data).map(Some)
    }

    fn store(&self, fingerprint: &[String], table: &MappingTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, encode(fingerprint, table)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
