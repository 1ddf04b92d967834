//! Objmap Core - Type-directed object graph transformation engine
//!
//! This crate converts values from one type to another by dispatching each
//! value to a strategy registered for its (source type, target type) pair.
//! Strategies transform nested values by calling back into the dispatcher, so
//! whole object graphs are traversed without the dispatcher walking structure
//! itself.
//!
//! # Main Components
//!
//! - **Type Resolver**: Classifies runtime values and expands type descriptors
//!   over the declared class hierarchy
//! - **Mapping Registry**: Pre-built, priority ordered index from type pairs to
//!   strategies, optionally persisted
//! - **Dispatcher**: [`MainTransformer`], selecting the first matching strategy
//! - **Object Cache**: Per-tree memoization of transformed objects with cycle
//!   detection
//!
//! # Example
//!
//! ```
//! use objmap_core::{ClassDef, MainTransformerBuilder, ObjectRef, Type, Value};
//!
//! fn example() -> objmap_core::Result<()> {
//!     let transformer = MainTransformerBuilder::new()
//!         .class(ClassDef::new("Person").property("age", Type::int()))
//!         .class(ClassDef::new("PersonDto").property("age", Type::string()))
//!         .with_builtin_strategies()
//!         .build()?;
//!
//!     let person = ObjectRef::new("Person").with_field("age", 42i64);
//!     let dto = transformer.transform(
//!         &Value::Object(person),
//!         None,
//!         Some(&[Type::class("PersonDto")]),
//!     )?;
//!
//!     let dto = dto.as_object().expect("object");
//!     assert_eq!(dto.get("age"), Some(Value::from("42")));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod mapping;
pub mod object_cache;
pub mod strategies;
pub mod strategy;
pub mod transformer;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use config::MapperConfig;
pub use context::TransformContext;
pub use error::{Error, Result};
pub use mapping::{
    FileMappingCache, MappingCache, MappingEntry, MappingFactory, MappingFilter, MappingTable,
};
pub use object_cache::ObjectCache;
pub use strategy::{Strategy, StrategyRegistry, TypeMapping};
pub use transformer::{MainTransformer, MainTransformerBuilder};
pub use types::{ClassDef, ClassRegistry, PropertyDef, Type, TypeResolver};
pub use value::{ObjectRef, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
