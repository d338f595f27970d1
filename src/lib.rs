//! A path expression language for selecting and combining nodes of an ordered,
//! named tree.
//!
//! ```
//! use nodex_lang::{Evaluator, Node, Value};
//!
//! let root = Node::with_children(
//!     "root",
//!     Value::Null,
//!     [Node::new("succ"), Node::new("error"), Node::new("ess")],
//! );
//!
//! let result = Evaluator::new().evaluate("@/*/!/*/error?name", &root).unwrap();
//! let names: Vec<_> = result.values().unwrap();
//! assert_eq!(names, [Value::from("succ"), Value::from("ess")]);
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod combinator;
pub mod convert;
pub mod evaluator;
pub mod format;
pub mod lexer;
pub mod matching;
pub mod node;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{Expression, IteratorKind, LogicalKind, MatchType, Token};
pub use combinator::NodeIter;
pub use convert::{ConvertError, Converter, StandardConverter};
pub use evaluator::{EvalError, EvalOptions, Evaluator};
pub use format::{apply_format, is_expression, is_formatted};
pub use lexer::{LexError, Lexer, Position};
pub use matching::{Match, MatchEntity};
pub use node::{Node, NodePath, TreeError};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use value::Value;
