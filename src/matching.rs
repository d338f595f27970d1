//! Evaluation results.
//!
//! A [`Match`] is the ordered list of nodes an expression selected, together with the
//! projection its type suffix asked for. Projections are computed when an entity's
//! value is read, so evaluating `?value.int` against nodes that do not hold numbers
//! only fails for the entities you actually look at.

use std::fmt;
use std::rc::Rc;

use crate::ast::MatchType;
use crate::convert::{ConvertError, Converter};
use crate::evaluator::EvalError;
use crate::node::Node;
use crate::value::Value;

/// How the entities of one evaluation project their node.
pub struct Projection {
    kind: MatchType,
    convert: Option<String>,
    count: usize,
    converter: Rc<dyn Converter>,
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("kind", &self.kind)
            .field("convert", &self.convert)
            .field("count", &self.count)
            .finish()
    }
}

/// One matched node.
#[derive(Debug, Clone)]
pub struct MatchEntity {
    node: Node,
    projection: Rc<Projection>,
}

impl MatchEntity {
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn kind(&self) -> MatchType {
        self.projection.kind
    }

    /// The projected value.
    ///
    /// - name: the node's name
    /// - value: the node's value
    /// - count: the number of entities in the owning match
    /// - path: the node's [`NodePath`](crate::NodePath)
    /// - node: the node itself
    ///
    /// Name and value projections are converted when the expression carries a
    /// `.typename` suffix.
    pub fn value(&self) -> Result<Value, EvalError> {
        let projection = &self.projection;
        let raw = match projection.kind {
            MatchType::Name => Value::String(self.node.name()),
            MatchType::Value => self.node.value(),
            MatchType::Count => return Ok(Value::Integer(projection.count as i64)),
            MatchType::Path => return Ok(Value::Path(self.node.path())),
            MatchType::Node => return Ok(Value::Node(self.node.clone())),
        };
        match &projection.convert {
            Some(type_name) => Ok(projection.converter.convert(&raw, type_name)?),
            None => Ok(raw),
        }
    }

    /// The name or value this entity projects, before any `.typename` conversion.
    /// `None` for the other projections.
    pub(crate) fn unconverted(&self) -> Option<Value> {
        match self.projection.kind {
            MatchType::Name => Some(Value::String(self.node.name())),
            MatchType::Value => Some(self.node.value()),
            MatchType::Count | MatchType::Path | MatchType::Node => None,
        }
    }

    /// The same node and projection, converted to `type_name` on access.
    pub(crate) fn with_convert(self, type_name: &str) -> MatchEntity {
        let projection = Rc::new(Projection {
            kind: self.projection.kind,
            convert: Some(type_name.to_string()),
            count: self.projection.count,
            converter: Rc::clone(&self.projection.converter),
        });
        MatchEntity {
            node: self.node,
            projection,
        }
    }

    /// Writes through to the matched node.
    ///
    /// A name entity renames its node. A value entity assigns its node's value,
    /// converting first when the expression carries a `.typename` suffix. A node entity
    /// replaces its node with a deep copy of the given node, or detaches it when given
    /// `Value::Null`. Count and path entities are read-only.
    pub fn set_value(&self, value: Value) -> Result<(), EvalError> {
        let projection = &self.projection;
        match projection.kind {
            MatchType::Name => {
                let name = match projection.converter.convert(&value, "string")? {
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                self.node.set_name(name);
            }
            MatchType::Value => {
                let value = match &projection.convert {
                    Some(type_name) => projection.converter.convert(&value, type_name)?,
                    None => value,
                };
                self.node.set_value(value);
            }
            MatchType::Node => match projection.converter.convert(&value, "node")? {
                Value::Null => {
                    self.node.untie();
                }
                Value::Node(replacement) => self.replace_node(&replacement)?,
                other => {
                    return Err(ConvertError::new(
                        &other,
                        "node",
                        "converter did not produce a node",
                    )
                    .into());
                }
            },
            kind @ (MatchType::Count | MatchType::Path) => {
                return Err(EvalError::ReadOnlyProjection { kind });
            }
        }
        Ok(())
    }

    fn replace_node(&self, replacement: &Node) -> Result<(), EvalError> {
        let copy = replacement.deep_clone();
        match (self.node.parent(), self.node.index()) {
            (Some(parent), Some(position)) => {
                self.node.untie();
                parent.insert(position, copy)?;
            }
            // A root keeps its identity and takes over the copy's content.
            _ => {
                self.node.set_name(copy.name());
                self.node.set_value(copy.value());
                self.node.untie_children();
                for child in copy.untie_children() {
                    self.node.add(child)?;
                }
            }
        }
        Ok(())
    }
}

/// The result of evaluating an expression.
#[derive(Debug, Clone)]
pub struct Match {
    kind: MatchType,
    convert: Option<String>,
    entities: Vec<MatchEntity>,
}

impl Match {
    pub(crate) fn new(
        kind: MatchType,
        convert: Option<String>,
        nodes: Vec<Node>,
        converter: Rc<dyn Converter>,
    ) -> Self {
        let projection = Rc::new(Projection {
            kind,
            convert: convert.clone(),
            count: nodes.len(),
            converter,
        });
        let entities = nodes
            .into_iter()
            .map(|node| MatchEntity {
                node,
                projection: Rc::clone(&projection),
            })
            .collect();
        Match {
            kind,
            convert,
            entities,
        }
    }

    /// A match assembled from the entities of several evaluations, as produced by
    /// referenced expressions. Each entity keeps the projection it was created with,
    /// apart from the conversion an outer suffix imposes.
    pub(crate) fn from_entities(
        kind: MatchType,
        convert: Option<String>,
        entities: Vec<MatchEntity>,
    ) -> Self {
        Match {
            kind,
            convert,
            entities,
        }
    }

    /// Number of entities. Never converts anything.
    pub fn count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn kind(&self) -> MatchType {
        self.kind
    }

    pub fn convert(&self) -> Option<&str> {
        self.convert.as_deref()
    }

    pub fn get(&self, index: usize) -> Option<&MatchEntity> {
        self.entities.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchEntity> {
        self.entities.iter()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.entities.iter().map(MatchEntity::node)
    }

    /// Every entity's projected value, stopping at the first conversion failure.
    pub fn values(&self) -> Result<Vec<Value>, EvalError> {
        self.entities.iter().map(MatchEntity::value).collect()
    }
}

impl IntoIterator for Match {
    type Item = MatchEntity;
    type IntoIter = std::vec::IntoIter<MatchEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a Match {
    type Item = &'a MatchEntity;
    type IntoIter = std::slice::Iter<'a, MatchEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
