//! Scalar coercions

use super::strategy_error;
use crate::context::TransformContext;
use crate::strategy::{Strategy, TypeMapping};
use crate::types::{Builtin, Type};
use crate::{Error, Result, Value};

const NAME: &str = "scalar";

/// Converts between `int`, `float`, `string` and `bool`
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarStrategy;

fn scalar_types() -> [Type; 4] {
    [Type::int(), Type::float(), Type::string(), Type::bool()]
}

impl Strategy for ScalarStrategy {
    fn supported_transformations(&self) -> Vec<TypeMapping> {
        let mut mappings = Vec::with_capacity(16);
        for source in scalar_types() {
            for target in scalar_types() {
                mappings.push(TypeMapping::new(source.clone(), target));
            }
        }
        mappings
    }

    fn transform(
        &self,
        source: &Value,
        _target: Option<Value>,
        _source_type: &Type,
        target_type: &Type,
        _context: &mut TransformContext<'_>,
    ) -> Result<Value> {
        match target_type.builtin_kind() {
            Builtin::String => to_string(source),
            Builtin::Int => to_int(source),
            Builtin::Float => to_float(source),
            Builtin::Bool => to_bool(source),
            _ => Err(Error::invalid_argument(format!(
                "Target type must be a scalar type, '{}' given",
                target_type
            ))),
        }
    }

    fn class_name(&self) -> &'static str {
        "ScalarStrategy"
    }
}

fn not_scalar(source: &Value) -> Error {
    Error::invalid_argument(format!(
        "Source must be a scalar value, '{}' given",
        source.debug_type()
    ))
}

fn to_string(source: &Value) -> Result<Value> {
    let s = match source {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return Err(not_scalar(other)),
    };
    Ok(Value::String(s))
}

fn to_int(source: &Value) -> Result<Value> {
    match source {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => float_to_int(*f),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) => float_to_int(f),
                Err(_) => Err(strategy_error(
                    NAME,
                    format!("Cannot convert string '{}' to int", s),
                )),
            }
        }
        other => Err(not_scalar(other)),
    }
}

fn float_to_int(f: f64) -> Result<Value> {
    let truncated = f.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(strategy_error(
            NAME,
            format!("Float {} is out of the int range", f),
        ));
    }
    Ok(Value::Int(truncated as i64))
}

fn to_float(source: &Value) -> Result<Value> {
    match source {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            strategy_error(NAME, format!("Cannot convert string '{}' to float", s))
        }),
        other => Err(not_scalar(other)),
    }
}

fn to_bool(source: &Value) -> Result<Value> {
    match source {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(i) => Ok(Value::Bool(*i != 0)),
        Value::Float(f) => Ok(Value::Bool(*f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
            "" | "0" | "false" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(strategy_error(
                NAME,
                format!("Cannot convert string '{}' to bool", s),
            )),
        },
        other => Err(not_scalar(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(&Value::Int(7)).unwrap(), Value::from("7"));
        assert_eq!(to_string(&Value::Float(1.5)).unwrap(), Value::from("1.5"));
        assert_eq!(to_string(&Value::Bool(false)).unwrap(), Value::from("false"));
        assert!(matches!(
            to_string(&Value::List(vec![])),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_float_at_int_bounds() {
        // i64::MAX is not representable, its f64 cast rounds up to 2^63
        assert!(float_to_int(2f64.powi(63)).is_err());
        assert_eq!(float_to_int(-(2f64.powi(63))).unwrap(), Value::Int(i64::MIN));
        assert!(to_int(&Value::from("9223372036854775808.0")).is_err());
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(&Value::from(" 12 ")).unwrap(), Value::Int(12));
        assert_eq!(to_int(&Value::from("3.9")).unwrap(), Value::Int(3));
        assert_eq!(to_int(&Value::Float(-2.7)).unwrap(), Value::Int(-2));
        assert_eq!(to_int(&Value::Bool(true)).unwrap(), Value::Int(1));
        assert!(matches!(
            to_int(&Value::from("twelve")),
            Err(Error::Strategy { .. })
        ));
        assert!(to_int(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_to_float_and_bool() {
        assert_eq!(to_float(&Value::Int(2)).unwrap(), Value::Float(2.0));
        assert_eq!(to_float(&Value::from("0.25")).unwrap(), Value::Float(0.25));
        assert_eq!(to_bool(&Value::from("Yes")).unwrap(), Value::Bool(true));
        assert_eq!(to_bool(&Value::Int(0)).unwrap(), Value::Bool(false));
        assert!(to_bool(&Value::from("maybe")).is_err());
    }

    #[test]
    fn test_declares_every_scalar_pair() {
        let mappings = ScalarStrategy.supported_transformations();
        assert_eq!(mappings.len(), 16);
        assert!(mappings.contains(&TypeMapping::new(Type::bool(), Type::string())));
    }
}
