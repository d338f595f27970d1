//! JSON documents as node trees
//!
//! Objects become named children, arrays become children with empty names and
//! scalars become values:
//!
//! ```text
//! {"user": {"name": "Ada"}, "tags": ["a", "b"]}
//!
//! ""
//!   user
//!     name: "Ada"
//!   tags
//!     "": "a"
//!     "": "b"
//! ```

use crate::{Node, Value};

/// Builds a tree whose root, named `""`, holds `document`.
pub fn json_to_node(document: serde_json::Value) -> Node {
    build("", document)
}

fn build(name: &str, json: serde_json::Value) -> Node {
    match json {
        serde_json::Value::Object(object) => Node::with_children(
            name,
            Value::Null,
            object
                .into_iter()
                .map(|(key, value)| build(&key, value))
                .collect::<Vec<_>>(),
        ),
        serde_json::Value::Array(items) => Node::with_children(
            name,
            Value::Null,
            items
                .into_iter()
                .map(|item| build("", item))
                .collect::<Vec<_>>(),
        ),
        scalar => Node::with_value(name, json_to_value(scalar)),
    }
}

/// Maps a JSON scalar to a value. Containers map to `Null`.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(s) => Value::String(s),
        _ => Value::Null,
    }
}
