//! Tests for dispatch decisions
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

use super::*;
use crate::strategy::{Strategy, TypeMapping};
use crate::types::ClassDef;
use crate::ObjectRef;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns its label and records how often it ran
struct Labelled {
    label: &'static str,
    mappings: Vec<TypeMapping>,
    calls: Arc<AtomicUsize>,
}

impl Labelled {
    fn new(label: &'static str, source: Type, target: Type) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Self {
            label,
            mappings: vec![TypeMapping::new(source, target)],
            calls: Arc::clone(&calls),
        };
        (strategy, calls)
    }
}

impl Strategy for Labelled {
    fn supported_transformations(&self) -> Vec<TypeMapping> {
        self.mappings.clone()
    }

    fn transform(
        &self,
        _source: &Value,
        _target: Option<Value>,
        _source_type: &Type,
        _target_type: &Type,
        _context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Value::from(self.label))
    }
}

struct Failing;

impl Strategy for Failing {
    fn supported_transformations(&self) -> Vec<TypeMapping> {
        vec![TypeMapping::new(Type::int(), Type::string())]
    }

    fn transform(
        &self,
        _source: &Value,
        _target: Option<Value>,
        _source_type: &Type,
        _target_type: &Type,
        _context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        Err(Error::Strategy {
            strategy: "failing".to_string(),
            message: "refused".to_string(),
            source: None,
        })
    }
}

#[test]
fn test_missing_target_type_is_invalid_argument() {
    let transformer = MainTransformerBuilder::new().build().unwrap();

    for target in [None, Some(Value::Null)] {
        let err = transformer.transform(&Value::Int(1), target, None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
    let err = transformer.transform(&Value::Int(1), None, Some(&[])).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_target_type_classified_from_target() {
    let (strategy, calls) = Labelled::new("to-string", Type::int(), Type::string());
    let transformer = MainTransformerBuilder::new()
        .strategy("to-string", strategy)
        .build()
        .unwrap();

    let result = transformer
        .transform(&Value::Int(1), Some(Value::from("old")), None)
        .unwrap();
    assert_eq!(result, Value::from("to-string"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failure_does_not_fall_back() {
    let (fallback, calls) = Labelled::new("fallback", Type::mixed(), Type::mixed());
    let transformer = MainTransformerBuilder::new()
        .strategy_with_priority("failing", Failing, 5)
        .strategy("fallback", fallback)
        .build()
        .unwrap();

    let err = transformer
        .transform(&Value::Int(1), None, Some(&[Type::string()]))
        .unwrap_err();
    assert!(matches!(err, Error::Strategy { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_target_types_tried_in_order() {
    let (to_int, int_calls) = Labelled::new("int", Type::string(), Type::int());
    let transformer = MainTransformerBuilder::new()
        .strategy("int", to_int)
        .build()
        .unwrap();

    let result = transformer
        .transform(&Value::from("1"), None, Some(&[Type::bool(), Type::int()]))
        .unwrap();
    assert_eq!(result, Value::from("int"));
    assert_eq!(int_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_null_source() {
    let (strategy, calls) = Labelled::new("null", Type::null(), Type::string());
    let transformer = MainTransformerBuilder::new()
        .strategy("null", strategy)
        .build()
        .unwrap();

    for accepting in [Type::string().nullable(), Type::mixed(), Type::null()] {
        let result = transformer
            .transform(&Value::Null, None, Some(&[accepting]))
            .unwrap();
        assert_eq!(result, Value::Null);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let result = transformer
        .transform(&Value::Null, None, Some(&[Type::string()]))
        .unwrap();
    assert_eq!(result, Value::from("null"));
}

#[test]
fn test_no_suitable_transformer_names_types() {
    let transformer = MainTransformerBuilder::new().build().unwrap();
    let err = transformer
        .transform(
            &Value::from("x"),
            None,
            Some(&[Type::int().nullable(), Type::class("DateTime")]),
        )
        .unwrap_err();

    match err {
        Error::NoSuitableTransformer {
            source_type,
            target_types,
        } => {
            assert_eq!(source_type, "string");
            assert_eq!(target_types, vec!["int", "DateTime"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_transformer_mapping_matches_dispatch_order() {
    let transformer = MainTransformerBuilder::new()
        .class(ClassDef::new("Animal"))
        .class(ClassDef::new("Dog").extends("Animal"))
        .strategy("any", Labelled::new("any", Type::object(), Type::string()).0)
        .strategy_with_priority("animal", Labelled::new("animal", Type::class("Animal"), Type::string()).0, 1)
        .build()
        .unwrap();

    let ids: Vec<String> = transformer
        .try_mapping("Dog", "?string")
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["animal", "any"]);

    let result = transformer
        .transform(&Value::Object(ObjectRef::new("Dog")), None, Some(&[Type::string()]))
        .unwrap();
    assert_eq!(result, Value::from("animal"));
}

#[test]
fn test_builder_rejects_bad_configuration() {
    let duplicate = MainTransformerBuilder::new()
        .strategy("same", Failing)
        .strategy("same", Failing)
        .build();
    assert!(matches!(duplicate, Err(Error::Configuration { .. })));

    let orphan = MainTransformerBuilder::new()
        .class(ClassDef::new("Dog").extends("Animal"))
        .build();
    assert!(matches!(orphan, Err(Error::Configuration { .. })));

    let unknown_value_class = MainTransformerBuilder::new()
        .config(MapperConfig {
            value_classes: vec!["Money".to_string()],
            ..MapperConfig::default()
        })
        .build();
    assert!(matches!(unknown_value_class, Err(Error::Configuration { .. })));
}

#[test]
fn test_unknown_class_in_strategy_fails_on_first_use() {
    let transformer = MainTransformerBuilder::new()
        .strategy("ghost", Labelled::new("ghost", Type::class("Ghost"), Type::string()).0)
        .build()
        .unwrap();

    let err = transformer
        .transform(&Value::Int(1), None, Some(&[Type::string()]))
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_depth_restored_after_dispatch() {
    let transformer = MainTransformerBuilder::new()
        .with_builtin_strategies()
        .build()
        .unwrap();

    let mut context = transformer.new_context();
    let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
    let result = context
        .transform(&list, None, Some(&[Type::array_of(Type::int(), Type::string())]))
        .unwrap();

    assert_eq!(result, Value::List(vec![Value::from("1"), Value::from("2")]));
    assert_eq!(context.depth(), 0);
    assert!(context.has_object_cache());
}
