//! Mapping registry: which strategy handles which type pair
//!
//! Strategies declare the (source, target) type pairs they support. The
//! registry expands each declaration into simple types once, and indexes one
//! [`MappingEntry`] per simple source × simple target combination. Lookups at
//! dispatch time are then plain hash lookups over the applicable type strings
//! of the concrete source and target.
//!
//! - [`table`] - entries, the index, lookup and inspection
//! - [`factory`] - build-once guard owning the process table
//! - [`cache`] - persistence of a built table
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod factory;
pub mod table;

pub use cache::{FileMappingCache, MappingCache};
pub use factory::MappingFactory;
pub use table::{MappingEntry, MappingFilter, MappingTable};
