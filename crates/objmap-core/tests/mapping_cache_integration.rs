//! Integration tests for persisting the mapping table between processes


use objmap_core::{
    ClassDef, Error, FileMappingCache, MainTransformerBuilder, MapperConfig, MappingCache, Type,
    TypeMapping, Value,
};
use std::fs;
use tempfile::TempDir;
use test_support::{zoo_builder, zoo_classes, Fixed};

fn config_with_cache(path: &std::path::Path) -> MapperConfig {
    MapperConfig {
        mapping_cache_path: Some(path.to_path_buf()),
        ..MapperConfig::default()
    }
}

#[test]
fn test_corrupt_cache_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(&path, "{\"format_version\": 1, \"entries\": [").unwrap();

    let transformer = zoo_builder().config(config_with_cache(&path)).build().unwrap();
    let result = transformer
        .transform(&Value::Int(7), None, Some(&[Type::string()]))
        .unwrap();
    assert_eq!(result, Value::from("7"));

    let stored = fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(parsed["format_version"], 1);
    assert_eq!(
        parsed["entries"].as_array().unwrap().len(),
        transformer.mapping().unwrap().len()
    );
}

#[test]
fn test_warm_cache_is_restored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("mapping.json");

    let first = zoo_builder().config(config_with_cache(&path)).build().unwrap();
    let built = first.warm_up().unwrap();
    assert!(path.exists());

    let second = zoo_builder().config(config_with_cache(&path)).build().unwrap();
    assert_eq!(*second.mapping().unwrap(), *built);
}

#[test]
fn test_changed_strategy_set_invalidates_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");

    let before = zoo_builder().config(config_with_cache(&path)).build().unwrap();
    before.warm_up().unwrap();

    let after = MainTransformerBuilder::new()
        .classes(zoo_classes())
        .strategy("only", Fixed::new("only", Type::int(), Type::string()))
        .config(config_with_cache(&path))
        .build()
        .unwrap();

    let table = after.mapping().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.entries()[0].id, "only");
    assert_eq!(
        after
            .transform(&Value::Int(1), None, Some(&[Type::string()]))
            .unwrap(),
        Value::from("only")
    );
}

#[test]
fn test_invalidate_clears_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    let cache = FileMappingCache::new(&path);

    let transformer = zoo_builder().mapping_cache(cache.clone()).build().unwrap();
    transformer.warm_up().unwrap();
    assert!(path.exists());

    transformer.invalidate_mapping().unwrap();
    assert!(!path.exists());
    assert!(cache.load(&transformer.strategies().fingerprint()).unwrap().is_none());

    transformer.mapping().unwrap();
    assert!(path.exists());
}

#[test]
fn test_restored_table_is_checked_against_declared_classes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    let ghostly = || Fixed::new("ghost", Type::class("Ghost"), Type::string());

    let haunted = MainTransformerBuilder::new()
        .class(ClassDef::new("Ghost"))
        .strategy("ghost", ghostly())
        .config(config_with_cache(&path))
        .build()
        .unwrap();
    assert_eq!(haunted.warm_up().unwrap().len(), 1);

    let exorcised = MainTransformerBuilder::new()
        .strategy("ghost", ghostly())
        .config(config_with_cache(&path))
        .build()
        .unwrap();
    let err = exorcised.mapping().unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.to_string().contains("Ghost"));
    assert!(!path.exists());
}

#[test]
fn test_changed_declarations_invalidate_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");

    let before = MainTransformerBuilder::new()
        .strategy("fixed", Fixed::new("fixed", Type::int(), Type::string()))
        .config(config_with_cache(&path))
        .build()
        .unwrap();
    before.warm_up().unwrap();

    let after = MainTransformerBuilder::new()
        .strategy(
            "fixed",
            Fixed {
                label: "fixed",
                mappings: vec![TypeMapping::new(Type::bool(), Type::string())],
            },
        )
        .config(config_with_cache(&path))
        .build()
        .unwrap();

    let table = after.mapping().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.entries()[0].source_type, "bool");
}
