//! JSON rendering of evaluation results.
//!
//! Results are rendered through `serde_json::Value`, so compact and pretty output
//! share one shape:
//!
//! - values map to the closest JSON type. Decimals, paths and bytes render as strings.
//! - nodes render as `{"name": ..., "value": ..., "children": [...]}`.
//! - a `?count` match renders as its count, any other match as an array of values.
//!
//! # Examples
//!
//! ```
//! use nodex_lang::{Evaluator, Node, Value};
//! use nodex_lang::output::to_json;
//!
//! let root = Node::with_children("root", Value::Null, [Node::with_value("a", 1)]);
//!
//! let names = Evaluator::new().evaluate("@/*?name", &root).unwrap();
//! assert_eq!(to_json(&names).unwrap(), r#"["a"]"#);
//!
//! let count = Evaluator::new().evaluate("@/*?count", &root).unwrap();
//! assert_eq!(to_json(&count).unwrap(), "1");
//! ```

use serde_json::{Map, Number, json};

use crate::{
    ast::MatchType, evaluator::EvalError, matching::Match, node::Node, value::Value,
};

/// Compact JSON for a match.
pub fn to_json(result: &Match) -> Result<String, EvalError> {
    Ok(match_to_json(result)?.to_string())
}

/// Indented JSON for a match.
pub fn to_json_pretty(result: &Match) -> Result<String, EvalError> {
    Ok(format!("{:#}", match_to_json(result)?))
}

pub fn match_to_json(result: &Match) -> Result<serde_json::Value, EvalError> {
    if result.kind() == MatchType::Count {
        return Ok(json!(result.count()));
    }
    let values = result
        .iter()
        .map(|entity| entity.value().map(|v| value_to_json(&v)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::Value::Array(values))
}

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Node(node) => node_to_json(node),
        other => scalar_to_json(other),
    }
}

/// Renders a subtree. Node-valued values inside it render as `{"ref": path}`.
pub fn node_to_json(node: &Node) -> serde_json::Value {
    let value = match node.value() {
        Value::Node(referenced) => json!({ "ref": referenced.path().to_string() }),
        other => scalar_to_json(&other),
    };
    let children: Vec<_> = node.children().iter().map(node_to_json).collect();

    let mut object = Map::new();
    object.insert("name".to_string(), json!(node.name()));
    object.insert("value".to_string(), value);
    if !children.is_empty() {
        object.insert("children".to_string(), serde_json::Value::Array(children));
    }
    serde_json::Value::Object(object)
}

fn scalar_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(x) => Number::from_f64(*x)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Decimal(d) => serde_json::Value::String(d.to_string()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
        Value::Path(p) => serde_json::Value::String(p.to_string()),
        Value::Node(n) => json!({ "ref": n.path().to_string() }),
    }
}
