use std::fmt;

use rust_decimal::Decimal;

use crate::node::{Node, NodePath};

/// The value carried by a [`Node`].
///
/// The set of variants is closed. Equality is typed, so a string never equals the
/// integer it spells: `Value::from("5") != Value::Integer(5)`. Converting between
/// variants is the job of a [`Converter`](crate::convert::Converter).
///
/// # Examples
///
/// ```
/// use nodex_lang::Value;
///
/// let null = Value::Null;
/// let integer = Value::from(42);
/// let text = Value::from("hello");
///
/// assert_eq!(integer.type_name(), "int");
/// assert_eq!(text.to_string(), "hello");
/// assert!(null.is_null());
/// assert_ne!(Value::from("5"), Value::Integer(5));
/// ```
#[derive(Clone, PartialEq, Default)]
pub enum Value {
    /// No value
    #[default]
    Null,

    Boolean(bool),

    /// 64-bit signed integer (`int` / `long`)
    Integer(i64),

    /// Double precision float (`float` / `double`)
    Float(f64),

    /// Fixed-point decimal (`decimal`)
    Decimal(Decimal),

    /// UTF-8 text
    String(String),

    /// Raw bytes (`blob`)
    Bytes(Vec<u8>),

    /// A reference to another node, followed by the `#` step
    Node(Node),

    /// A positional address, produced by `?path`
    Path(NodePath),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The conversion type name that produces this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Bytes(_) => "blob",
            Value::Node(_) => "node",
            Value::Path(_) => "path",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Text used by value regexes and string concatenation. `Null` has none.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// Node values print the referenced node's name only; a node may reference one of its
// own ancestors.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Integer(i) => write!(f, "Integer({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Decimal(d) => write!(f, "Decimal({})", d),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Bytes(b) => write!(f, "Bytes({:?})", b),
            Value::Node(n) => write!(f, "Node({:?})", n.name()),
            Value::Path(p) => write!(f, "Path({})", p),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Node(n) => f.write_str(&n.name()),
            Value::Path(p) => write!(f, "{}", p),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Node> for Value {
    fn from(n: Node) -> Self {
        Value::Node(n)
    }
}

impl From<NodePath> for Value {
    fn from(p: NodePath) -> Self {
        Value::Path(p)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
