//! Date-time conversions

use crate::context::TransformContext;
use crate::strategy::{Strategy, TypeMapping};
use crate::types::{Builtin, Type, DATETIME_CLASS};
use crate::{Error, Result, Value};
use chrono::{DateTime, SecondsFormat, Utc};

const NAME: &str = "datetime";

/// Converts date-times to and from RFC 3339 strings and copies them
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeStrategy;

impl Strategy for DateTimeStrategy {
    fn supported_transformations(&self) -> Vec<TypeMapping> {
        let datetime = Type::class(DATETIME_CLASS);
        vec![
            TypeMapping::new(datetime.clone(), Type::string()),
            TypeMapping::new(Type::string(), datetime.clone()),
            TypeMapping::new(datetime.clone(), datetime),
        ]
    }

    fn transform(
        &self,
        source: &Value,
        _target: Option<Value>,
        _source_type: &Type,
        target_type: &Type,
        _context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        match (source, target_type.builtin_kind()) {
            (Value::DateTime(dt), Builtin::String) => Ok(Value::String(
                dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )),
            (Value::DateTime(dt), Builtin::Object) => Ok(Value::DateTime(*dt)),
            (Value::String(s), Builtin::Object) => parse(s).map(Value::DateTime),
            _ => Err(Error::invalid_argument(format!(
                "Cannot transform '{}' to '{}'",
                source.debug_type(),
                target_type
            ))),
        }
    }

    fn class_name(&self) -> &'static str {
        "DateTimeStrategy"
    }
}

fn parse(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Strategy {
            strategy: NAME.to_string(),
            message: format!("'{}' is not an RFC 3339 date-time", s),
            source: Some(anyhow::Error::new(e)),
        })
}
