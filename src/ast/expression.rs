use std::fmt;
use std::str::FromStr;

use crate::ast::IteratorKind;
use crate::parser::{ParseError, Parser};

/// A compiled path expression.
///
/// Compiled expressions are immutable. Evaluating one builds a fresh iterator
/// pipeline every time, so the same expression can be evaluated against any number
/// of context nodes.
///
/// # Examples
///
/// ```
/// use nodex_lang::{Expression, MatchType};
///
/// let expr: Expression = "@/*/success?value.int".parse().unwrap();
/// assert_eq!(expr.kind, MatchType::Value);
/// assert_eq!(expr.convert.as_deref(), Some("int"));
/// assert!(!expr.referenced);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The text the expression was compiled from
    pub source: String,

    /// `@@`: the results are themselves expressions to evaluate
    pub referenced: bool,

    pub chain: Chain,

    /// What each matched node projects to
    pub kind: MatchType,

    /// Type name from a `.typename` suffix
    pub convert: Option<String>,
}

impl Expression {
    pub fn compile(text: &str) -> Result<Self, ParseError> {
        Parser::new(text)?.parse_expression()
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::compile(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A sequence of steps followed by the logicals that combine with its result.
///
/// The top level of an expression is a chain, and so is every group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chain {
    pub steps: Vec<Step>,
    pub logicals: Vec<Logical>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Iterator(IteratorKind),

    /// A parenthesized chain rooted at the enclosing chain's output
    ///
    /// # Example
    /// ```text
    /// @/(/*/a/|/*/b/)/0?name
    /// ```
    Group(Chain),
}

/// A boolean operator and the steps forming its right-hand side.
///
/// The operand is evaluated from the enclosing chain's root, not from the result
/// accumulated so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    pub kind: LogicalKind,
    pub operand: Vec<Step>,
}

/// Set operation applied by a [`Logical`].
///
/// All operations compare nodes by identity and keep source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKind {
    /// `|`: left, then right nodes not already on the left
    Or,

    /// `&`: left nodes also on the right
    And,

    /// `^`: nodes on exactly one side
    Xor,

    /// `!`: left nodes not on the right
    Not,
}

impl LogicalKind {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "|" => Some(LogicalKind::Or),
            "&" => Some(LogicalKind::And),
            "^" => Some(LogicalKind::Xor),
            "!" => Some(LogicalKind::Not),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            LogicalKind::Or => '|',
            LogicalKind::And => '&',
            LogicalKind::Xor => '^',
            LogicalKind::Not => '!',
        }
    }
}

/// The projection selected by an expression's `?` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    Name,
    Value,
    Count,
    Path,
    Node,
}

impl MatchType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(MatchType::Name),
            "value" => Some(MatchType::Value),
            "count" => Some(MatchType::Count),
            "path" => Some(MatchType::Path),
            "node" => Some(MatchType::Node),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Name => "name",
            MatchType::Value => "value",
            MatchType::Count => "count",
            MatchType::Path => "path",
            MatchType::Node => "node",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
