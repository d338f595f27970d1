use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    ast::{Chain, Expression, IteratorKind, MatchType, Step, ValueLiteral},
    combinator::{NodeIter, combine},
    convert::{ConvertError, Converter, StandardConverter},
    matching::Match,
    node::{Node, TreeError},
    parser::ParseError,
    value::Value,
};

/// Limits applied while evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// How deep referenced expressions and formatted nodes may nest
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions { max_depth: 64 }
    }
}

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    /// Expression text failed to compile. `node` names the node the text came from,
    /// when there was one.
    #[error("{}{source}", node_prefix(.node))]
    Syntax {
        node: Option<String>,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Conversion(#[from] ConvertError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Referenced expressions or formatted nodes nested too deeply
    #[error("expressions nested deeper than {depth} levels")]
    RecursionLimit { depth: usize },

    /// A node's value was used as an expression but is not one
    #[error("value of node '{0}' is not an expression")]
    NotAnExpression(String),

    #[error("cannot format '{template}': {message}")]
    Format { template: String, message: String },

    /// Assignment through a count or path entity
    #[error("{kind} results are read-only")]
    ReadOnlyProjection { kind: MatchType },
}

fn node_prefix(node: &Option<String>) -> String {
    match node {
        Some(node) => format!("in node {}: ", node),
        None => String::new(),
    }
}

impl From<ParseError> for EvalError {
    fn from(source: ParseError) -> Self {
        EvalError::Syntax { node: None, source }
    }
}

/// Evaluates compiled expressions against document trees.
///
/// The evaluator holds no per-document state. One instance can evaluate any number
/// of expressions against any number of trees.
///
/// # Examples
///
/// ```
/// use nodex_lang::{Evaluator, Node, Value};
///
/// let root = Node::with_children(
///     "root",
///     Value::Null,
///     [Node::with_value("error", "no"), Node::with_value("success", "yes")],
/// );
///
/// let result = Evaluator::new().evaluate("@/*/success?value", &root).unwrap();
/// assert_eq!(result.count(), 1);
/// assert_eq!(result.get(0).unwrap().value().unwrap(), Value::from("yes"));
/// ```
#[derive(Clone)]
pub struct Evaluator {
    converter: Rc<dyn Converter>,
    options: EvalOptions,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator using the [`StandardConverter`].
    pub fn new() -> Self {
        Self::with_converter(Rc::new(StandardConverter))
    }

    pub fn with_converter(converter: Rc<dyn Converter>) -> Self {
        Evaluator {
            converter,
            options: EvalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    pub fn converter(&self) -> &Rc<dyn Converter> {
        &self.converter
    }

    /// Compiles `text` and evaluates it with `context` as the `@` node.
    pub fn evaluate(&self, text: &str, context: &Node) -> Result<Match, EvalError> {
        let expression = Expression::compile(text)?;
        self.evaluate_expression(&expression, context)
    }

    pub fn evaluate_expression(
        &self,
        expression: &Expression,
        context: &Node,
    ) -> Result<Match, EvalError> {
        self.evaluate_at(expression, context, 0)
    }

    /// The selected nodes as a lazy sequence.
    ///
    /// Nothing past the nodes you pull is evaluated, except that a group containing
    /// logicals collects its input first. Referenced expressions are expanded up
    /// front, since expanding one means reading values.
    pub fn stream<'a>(
        &'a self,
        expression: &'a Expression,
        context: &Node,
    ) -> Result<NodeIter<'a>, EvalError> {
        if expression.referenced {
            let expanded = self.evaluate_expression(expression, context)?;
            let nodes: Vec<Node> = expanded.nodes().cloned().collect();
            return Ok(Box::new(nodes.into_iter()));
        }
        self.build_chain(&expression.chain, Box::new(std::iter::once(context.clone())))
    }

    /// Counts the selected nodes without building entities.
    pub fn count(&self, expression: &Expression, context: &Node) -> Result<usize, EvalError> {
        Ok(self.stream(expression, context)?.count())
    }

    pub(crate) fn evaluate_at(
        &self,
        expression: &Expression,
        context: &Node,
        depth: usize,
    ) -> Result<Match, EvalError> {
        self.check_depth(depth)?;
        debug!(expression = %expression.source, depth, "evaluating expression");

        let nodes: Vec<Node> = self
            .build_chain(&expression.chain, Box::new(std::iter::once(context.clone())))?
            .collect();
        let result = Match::new(
            expression.kind,
            expression.convert.clone(),
            nodes,
            Rc::clone(&self.converter),
        );

        if expression.referenced {
            self.expand_references(result, depth)
        } else {
            Ok(result)
        }
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), EvalError> {
        if depth > self.options.max_depth {
            return Err(EvalError::RecursionLimit {
                depth: self.options.max_depth,
            });
        }
        Ok(())
    }

    /// Replaces every entity whose unconverted name or value is an expression with
    /// that expression's entities, evaluated from the entity's node. An outer
    /// `.typename` suffix carries over to the expanded entities.
    fn expand_references(&self, result: Match, depth: usize) -> Result<Match, EvalError> {
        let (kind, convert) = (result.kind(), result.convert().map(str::to_string));
        let mut entities = Vec::with_capacity(result.count());

        for entity in result {
            let reference = entity.unconverted();
            match reference
                .as_ref()
                .and_then(Value::as_str)
                .filter(|text| crate::format::is_expression(text))
            {
                Some(text) => {
                    let inner = Expression::compile(text).map_err(|source| EvalError::Syntax {
                        node: Some(describe_node(entity.node())),
                        source,
                    })?;
                    debug!(expression = %inner.source, depth = depth + 1, "expanding reference");
                    let expanded = self.evaluate_at(&inner, entity.node(), depth + 1)?;
                    match &convert {
                        Some(type_name) => entities
                            .extend(expanded.into_iter().map(|e| e.with_convert(type_name))),
                        None => entities.extend(expanded),
                    }
                }
                None => entities.push(entity),
            }
        }

        Ok(Match::from_entities(kind, convert, entities))
    }

    /// Builds the pipeline for a chain fed by `input`.
    ///
    /// Without logicals the steps simply wrap `input`. With logicals, `input` is the
    /// chain's root and is replayed for the steps and for every operand.
    fn build_chain<'a>(
        &'a self,
        chain: &'a Chain,
        input: NodeIter<'a>,
    ) -> Result<NodeIter<'a>, EvalError> {
        if chain.logicals.is_empty() {
            return self.build_steps(&chain.steps, input);
        }

        let root: Rc<[Node]> = input.collect();
        let mut result = self.build_steps(&chain.steps, replay(&root))?;
        for logical in &chain.logicals {
            trace!(operator = %logical.kind.symbol(), "building logical");
            let operand = self.build_steps(&logical.operand, replay(&root))?;
            result = combine(logical.kind, result, operand);
        }
        Ok(result)
    }

    fn build_steps<'a>(
        &'a self,
        steps: &'a [Step],
        input: NodeIter<'a>,
    ) -> Result<NodeIter<'a>, EvalError> {
        steps.iter().try_fold(input, |current, step| match step {
            Step::Iterator(kind) => self.apply_iterator(kind, current),
            Step::Group(chain) => self.build_chain(chain, current),
        })
    }

    /// Wraps `input` in the transformer for a single step.
    fn apply_iterator<'a>(
        &'a self,
        kind: &'a IteratorKind,
        input: NodeIter<'a>,
    ) -> Result<NodeIter<'a>, EvalError> {
        trace!(step = ?kind, "building step");

        let output: NodeIter<'a> = match kind {
            IteratorKind::Children => Box::new(input.flat_map(|n| n.children())),
            IteratorKind::Descendants => Box::new(input.flat_map(|n| n.descendants())),
            IteratorKind::Parent => Box::new(input.filter_map(|n| n.parent())),
            IteratorKind::Root => Box::new(input.map(|n| n.root())),
            IteratorKind::Ancestor(name) => {
                Box::new(input.filter_map(move |n| nearest_named(&n, name)))
            }
            IteratorKind::Numbered(index) => Box::new(input.filter_map(move |n| n.child(*index))),
            IteratorKind::Sibling(offset) => {
                Box::new(input.filter_map(move |n| n.sibling(*offset)))
            }
            IteratorKind::Previous => Box::new(input.filter_map(|n| n.previous_in_document())),
            IteratorKind::Next => Box::new(input.filter_map(|n| n.next_in_document())),
            IteratorKind::Reference => Box::new(input.filter_map(|n| match n.value() {
                Value::Node(referenced) => Some(referenced),
                _ => None,
            })),
            IteratorKind::Named(name) => Box::new(input.filter(move |n| n.has_name(name))),
            IteratorKind::ValueEquals(literal) => {
                let expected = match literal {
                    ValueLiteral::Plain(text) => Value::String(text.clone()),
                    ValueLiteral::Typed { type_name, text } => self
                        .converter
                        .convert(&Value::String(text.clone()), type_name)?,
                };
                Box::new(input.filter(move |n| n.value() == expected))
            }
            IteratorKind::NameRegex(pattern) => {
                Box::new(input.filter(move |n| pattern.is_match(&n.name())))
            }
            IteratorKind::ValueRegex(pattern) => Box::new(input.filter(move |n| {
                n.value()
                    .to_text()
                    .is_some_and(|text| pattern.is_match(&text))
            })),
            IteratorKind::Range { start, end } => {
                let start = start.unwrap_or(0);
                match end {
                    Some(end) => Box::new(input.skip(start).take(end.saturating_sub(start))),
                    None => Box::new(input.skip(start)),
                }
            }
            IteratorKind::Modulo(step) => Box::new(
                input
                    .enumerate()
                    .filter(move |(i, _)| i % step == 0)
                    .map(|(_, n)| n),
            ),
        };
        Ok(output)
    }
}

fn replay<'a>(root: &Rc<[Node]>) -> NodeIter<'a> {
    let root = Rc::clone(root);
    Box::new((0..root.len()).map(move |i| root[i].clone()))
}

/// Walks upward from `node` itself to the first node named `name`.
fn nearest_named(node: &Node, name: &str) -> Option<Node> {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if candidate.has_name(name) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// `name at /0/1`, for error messages.
pub(crate) fn describe_node(node: &Node) -> String {
    format!("'{}' at {}", node.name(), node.path())
}
