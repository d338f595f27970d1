//! The conversion bridge between [`Value`] variants.
//!
//! Expressions name target types by string (`?value.int`, `=:decimal:5`). The evaluator
//! never interprets those names itself; it hands them to a [`Converter`]. Hosts that own
//! a tree codec can install their own converter to render nodes as text.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::node::NodePath;
use crate::value::Value;

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot convert {value} to '{target}': {reason}")]
pub struct ConvertError {
    /// Debug rendering of the source value
    pub value: String,
    pub target: String,
    pub reason: String,
}

impl ConvertError {
    pub fn new(value: &Value, target: &str, reason: impl Into<String>) -> Self {
        ConvertError {
            value: format!("{:?}", value),
            target: target.to_string(),
            reason: reason.into(),
        }
    }
}

/// Converts values to named types.
pub trait Converter {
    /// Converts `value` to the type named `type_name`. `Null` stays `Null`.
    fn convert(&self, value: &Value, type_name: &str) -> Result<Value, ConvertError>;

    /// The type name `value` converts back to losslessly.
    fn type_name_of(&self, value: &Value) -> &'static str {
        value.type_name()
    }
}

/// Converter for the built-in type names.
///
/// | Type name | Result |
/// |---|---|
/// | `string` | `Value::String` |
/// | `int`, `long` | `Value::Integer` |
/// | `float`, `double` | `Value::Float` |
/// | `decimal` | `Value::Decimal` |
/// | `bool` | `Value::Boolean` |
/// | `blob` | `Value::Bytes` |
/// | `node` | `Value::Node` (only from a node) |
/// | `path` | `Value::Path` |
///
/// Rendering a node as text needs a tree codec, so `node` to `string` fails here.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConverter;

impl Converter for StandardConverter {
    fn convert(&self, value: &Value, type_name: &str) -> Result<Value, ConvertError> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match type_name {
            "string" => to_string(value, type_name).map(Value::String),
            "int" | "long" => to_integer(value, type_name).map(Value::Integer),
            "float" | "double" => to_float(value, type_name).map(Value::Float),
            "decimal" => to_decimal(value, type_name).map(Value::Decimal),
            "bool" => to_bool(value, type_name).map(Value::Boolean),
            "blob" => match value {
                Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
                other => to_string(other, type_name).map(|s| Value::Bytes(s.into_bytes())),
            },
            "node" => match value {
                Value::Node(n) => Ok(Value::Node(n.clone())),
                other => Err(ConvertError::new(other, type_name, "only nodes convert to node")),
            },
            "path" => match value {
                Value::Path(p) => Ok(Value::Path(p.clone())),
                Value::String(s) => NodePath::from_str(s)
                    .map(Value::Path)
                    .map_err(|e| ConvertError::new(value, type_name, e.to_string())),
                other => Err(ConvertError::new(other, type_name, "not a path")),
            },
            unknown => Err(ConvertError::new(
                value,
                unknown,
                format!("unknown type '{}'", unknown),
            )),
        }
    }
}

fn to_string(value: &Value, target: &str) -> Result<String, ConvertError> {
    match value {
        Value::Bytes(b) => String::from_utf8(b.clone())
            .map_err(|_| ConvertError::new(value, target, "bytes are not valid UTF-8")),
        Value::Node(_) => Err(ConvertError::new(
            value,
            target,
            "rendering a node as text needs a tree codec",
        )),
        other => Ok(other.to_string()),
    }
}

fn to_integer(value: &Value, target: &str) -> Result<i64, ConvertError> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::Float(x) if x.fract() == 0.0 => {
            Decimal::from_f64(*x)
                .and_then(|d| d.to_i64())
                .ok_or_else(|| ConvertError::new(value, target, "out of range"))
        }
        Value::Float(_) => Err(ConvertError::new(value, target, "has a fractional part")),
        Value::Decimal(d) if d.fract().is_zero() => d
            .to_i64()
            .ok_or_else(|| ConvertError::new(value, target, "out of range")),
        Value::Decimal(_) => Err(ConvertError::new(value, target, "has a fractional part")),
        Value::String(_) | Value::Bytes(_) => {
            let text = to_string(value, target)?;
            text.trim()
                .parse::<i64>()
                .map_err(|e| ConvertError::new(value, target, e.to_string()))
        }
        other => Err(ConvertError::new(other, target, "not a number")),
    }
}

fn to_float(value: &Value, target: &str) -> Result<f64, ConvertError> {
    match value {
        Value::Float(x) => Ok(*x),
        Value::Integer(i) => Ok(*i as f64),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Decimal(d) => d
            .to_f64()
            .ok_or_else(|| ConvertError::new(value, target, "out of range")),
        Value::String(_) | Value::Bytes(_) => {
            let text = to_string(value, target)?;
            text.trim()
                .parse::<f64>()
                .map_err(|e| ConvertError::new(value, target, e.to_string()))
        }
        other => Err(ConvertError::new(other, target, "not a number")),
    }
}

fn to_decimal(value: &Value, target: &str) -> Result<Decimal, ConvertError> {
    match value {
        Value::Decimal(d) => Ok(*d),
        Value::Integer(i) => Ok(Decimal::from(*i)),
        Value::Boolean(b) => Ok(Decimal::from(i64::from(*b))),
        Value::Float(x) => {
            Decimal::from_f64(*x).ok_or_else(|| ConvertError::new(value, target, "out of range"))
        }
        Value::String(_) | Value::Bytes(_) => {
            let text = to_string(value, target)?;
            let text = text.trim();
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map_err(|e| ConvertError::new(value, target, e.to_string()))
        }
        other => Err(ConvertError::new(other, target, "not a number")),
    }
}

fn to_bool(value: &Value, target: &str) -> Result<bool, ConvertError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::String(_) | Value::Bytes(_) => {
            let text = to_string(value, target)?;
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConvertError::new(value, target, "expected true or false")),
            }
        }
        other => Err(ConvertError::new(other, target, "not a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_null_stays_null() {
        let c = StandardConverter;
        for target in ["string", "int", "decimal", "node", "nonsense"] {
            assert_eq!(c.convert(&Value::Null, target).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_node_to_string_needs_codec() {
        let err = StandardConverter
            .convert(&Value::Node(Node::new("x")), "string")
            .unwrap_err();
        assert_eq!(err.target, "string");
    }

    #[test]
    fn test_decimal_keeps_scale() {
        let v = StandardConverter.convert(&Value::from("5.50"), "decimal").unwrap();
        assert_eq!(v.to_string(), "5.50");
    }
}
