//! Formatted nodes and single-value resolution.
//!
//! A *formatted node* has a string value and at least one child with an empty name.
//! Its value is a template whose `{0}`, `{1}`, ... placeholders are filled from those
//! children, in order:
//!
//! ```text
//! root: "@/*/{0}?value"
//!   "": "success"
//! ```
//!
//! formats to `@/*/success?value`, which is then evaluated like any other expression.

use tracing::debug;

use crate::{
    ast::{Expression, MatchType},
    evaluator::{EvalError, Evaluator, describe_node},
    matching::Match,
    node::Node,
    value::Value,
};

/// Whether `text` looks like an expression: `@`, optional whitespace, then one of
/// `/ ? @ { (`.
///
/// ```
/// use nodex_lang::is_expression;
///
/// assert!(is_expression("@/*?name"));
/// assert!(is_expression("@\n  /*?name"));
/// assert!(!is_expression("@home"));
/// assert!(!is_expression("plain text"));
/// ```
pub fn is_expression(text: &str) -> bool {
    let Some(rest) = text.trim_start().strip_prefix('@') else {
        return false;
    };
    rest.trim_start()
        .starts_with(|c| matches!(c, '/' | '?' | '@' | '{' | '('))
}

/// Whether `node` is a formatted node.
pub fn is_formatted(node: &Node) -> bool {
    matches!(node.value(), Value::String(_)) && node.find(|c| c.has_name("")).is_some()
}

/// Substitutes `{N}` placeholders in `template`. `{{` and `}}` produce literal braces.
///
/// ```
/// use nodex_lang::apply_format;
///
/// let args = ["su".to_string(), "ess".to_string()];
/// assert_eq!(apply_format("{0}cc{1}", &args).unwrap(), "success");
/// assert_eq!(apply_format("{{{0}}}", &args).unwrap(), "{su}");
/// assert!(apply_format("{2}", &args).is_err());
/// ```
pub fn apply_format(template: &str, args: &[String]) -> Result<String, EvalError> {
    let error = |message: String| EvalError::Format {
        template: template.to_string(),
        message,
    };

    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                result.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                result.push('}');
            }
            '{' => {
                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => index.push(c),
                        None => return Err(error("unterminated placeholder".to_string())),
                    }
                }
                let position: usize = index
                    .trim()
                    .parse()
                    .map_err(|_| error(format!("'{{{}}}' is not a positional placeholder", index)))?;
                let arg = args.get(position).ok_or_else(|| {
                    error(format!(
                        "placeholder {{{}}} has no argument, {} given",
                        position,
                        args.len()
                    ))
                })?;
                result.push_str(arg);
            }
            '}' => return Err(error("unmatched '}'".to_string())),
            other => result.push(other),
        }
    }

    Ok(result)
}

impl Evaluator {
    /// Formats a formatted node.
    ///
    /// Arguments are resolved recursively: formatted children are formatted,
    /// expression children are reduced with [`Evaluator::single`] against
    /// `data_source`, others are rendered as text. When `data_source` is `node`
    /// itself, each argument child serves as its own data source.
    pub fn format_node(&self, node: &Node, data_source: &Node) -> Result<String, EvalError> {
        self.format_at(node, data_source, 0)
    }

    /// Compiles and evaluates the expression held by `node`, formatting it first if
    /// it is a formatted node.
    pub fn evaluate_node(&self, node: &Node, data_source: &Node) -> Result<Match, EvalError> {
        let text = match self.resolve_template(node, data_source, 0)? {
            Value::String(text) if is_expression(&text) => text,
            _ => return Err(EvalError::NotAnExpression(describe_node(node))),
        };
        let expression = Expression::compile(&text).map_err(|source| EvalError::Syntax {
            node: Some(describe_node(node)),
            source,
        })?;
        self.evaluate_at(&expression, data_source, 0)
    }

    /// Reduces a constant or an expression to one value.
    ///
    /// - `Null` and expressions matching nothing give `Null`.
    /// - A single result is returned as is.
    /// - Several results are concatenated as text.
    /// - A `?count` expression gives the count.
    pub fn single(&self, value: &Value, data_source: &Node) -> Result<Value, EvalError> {
        self.single_at(value, data_source, 0)
    }

    /// [`Evaluator::single`], converted to `type_name`.
    pub fn single_as(
        &self,
        value: &Value,
        data_source: &Node,
        type_name: &str,
    ) -> Result<Value, EvalError> {
        let single = self.single(value, data_source)?;
        Ok(self.converter().convert(&single, type_name)?)
    }

    /// Reduces a node to one value.
    ///
    /// A node with a value is resolved through its value, formatted first when it is
    /// a formatted node. A node without a value contributes its children's values.
    pub fn single_node(&self, node: &Node, data_source: &Node) -> Result<Value, EvalError> {
        let values = self.node_values(node, data_source, 0)?;
        self.reduce(values)
    }

    /// Every value an expression or constant stands for.
    ///
    /// Expressions contribute each entity's value, or their count for `?count`.
    /// `Null` contributes nothing and other constants contribute themselves.
    pub fn values(&self, value: &Value, data_source: &Node) -> Result<Vec<Value>, EvalError> {
        self.values_at(value, data_source, 0)
    }

    fn values_at(
        &self,
        value: &Value,
        data_source: &Node,
        depth: usize,
    ) -> Result<Vec<Value>, EvalError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::String(text) if is_expression(text) => {
                let expression = Expression::compile(text)?;
                let result = self.evaluate_at(&expression, data_source, depth)?;
                if result.kind() == MatchType::Count {
                    Ok(vec![Value::Integer(result.count() as i64)])
                } else {
                    result.values()
                }
            }
            other => Ok(vec![other.clone()]),
        }
    }

    fn node_values(
        &self,
        node: &Node,
        data_source: &Node,
        depth: usize,
    ) -> Result<Vec<Value>, EvalError> {
        if node.value().is_null() {
            return Ok(node.children().iter().map(Node::value).collect());
        }
        let resolved = self.resolve_template(node, data_source, depth)?;
        self.values_at(&resolved, data_source, depth)
    }

    fn single_at(&self, value: &Value, data_source: &Node, depth: usize) -> Result<Value, EvalError> {
        let values = self.values_at(value, data_source, depth)?;
        self.reduce(values)
    }

    /// One value stays untouched; several are joined as text.
    fn reduce(&self, values: Vec<Value>) -> Result<Value, EvalError> {
        let mut values = values.into_iter();
        let Some(first) = values.next() else {
            return Ok(Value::Null);
        };
        let Some(second) = values.next() else {
            return Ok(first);
        };

        let mut joined = self.text_of(&first)?;
        let mut previous_was_node = matches!(first, Value::Node(_));
        for value in std::iter::once(second).chain(values) {
            let is_node = matches!(value, Value::Node(_));
            if is_node || previous_was_node {
                joined.push_str("\r\n");
            }
            joined.push_str(&self.text_of(&value)?);
            previous_was_node = is_node;
        }
        Ok(Value::String(joined))
    }

    fn text_of(&self, value: &Value) -> Result<String, EvalError> {
        Ok(match self.converter().convert(value, "string")? {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => other.to_string(),
        })
    }

    /// The node's value, formatted if it is a formatted node.
    fn resolve_template(
        &self,
        node: &Node,
        data_source: &Node,
        depth: usize,
    ) -> Result<Value, EvalError> {
        if is_formatted(node) {
            Ok(Value::String(self.format_at(node, data_source, depth)?))
        } else {
            Ok(node.value())
        }
    }

    fn format_at(&self, node: &Node, data_source: &Node, depth: usize) -> Result<String, EvalError> {
        self.check_depth(depth)?;

        let Value::String(template) = node.value() else {
            return Err(EvalError::Format {
                template: node.value().to_string(),
                message: "only string values can be formatted".to_string(),
            });
        };
        if !is_formatted(node) {
            return Err(EvalError::Format {
                template,
                message: format!("{} has no formatting children", describe_node(node)),
            });
        }
        debug!(node = %node.name(), depth, "formatting node");

        let args = node
            .find_all(|c| c.has_name(""))
            .map(|child| {
                let source = if node == data_source { &child } else { data_source };
                self.format_argument(&child, source, depth + 1)
            })
            .collect::<Result<Vec<_>, _>>()?;

        apply_format(&template, &args)
    }

    fn format_argument(
        &self,
        node: &Node,
        data_source: &Node,
        depth: usize,
    ) -> Result<String, EvalError> {
        let formatted = is_formatted(node);
        let value = node.value();
        let expression = value.as_str().is_some_and(is_expression);

        match (formatted, expression) {
            (true, true) => {
                let text = self.format_at(node, data_source, depth)?;
                let single = self.single_at(&Value::String(text), data_source, depth + 1)?;
                self.text_of(&single)
            }
            (true, false) => self.format_at(node, data_source, depth),
            (false, true) => {
                let single = self.single_at(&value, data_source, depth + 1)?;
                self.text_of(&single)
            }
            (false, false) => self.text_of(&value),
        }
    }
}
