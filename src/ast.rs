//! # Path Expressions - Abstract Syntax Tree
//!
//! This module defines the compiled form of a path expression.
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[steps]** - The step kinds a chain is built from
//! - **[expression]** - Chains, groups, logicals and the compiled [`Expression`]
//!
//! ## Quick Start
//!
//! ```text
//! @/*/success?value
//! ```
//!
//! Starting at the context node, take its children, keep those named `success` and
//! project their values.
//!
//! ## Core Concepts
//!
//! ### Chains
//!
//! Every expression starts with `@`, the context node, followed by steps separated
//! by `/` and a type suffix:
//!
//! ```text
//! @/step/step/...?kind
//! ```
//!
//! Each step consumes the sequence produced by the step before it. Evaluation is
//! lazy; nothing runs until the result is consumed.
//!
//! ### Type Suffix
//!
//! - `?name`, `?value`, `?path`, `?node` - project each matched node
//! - `?count` - the number of matched nodes
//! - `?value.int` - project, converting to a named type on access
//!
//! ### Logicals
//!
//! `|`, `&`, `^` and `!` combine the result so far with the steps that follow them.
//! Those steps start again from the root of the enclosing chain:
//!
//! ```text
//! @/*/success/|/*/error?name
//! ```
//!
//! Groups restart from the output of the steps before them and give explicit
//! precedence:
//!
//! ```text
//! @/*/(/succ/|/ess/)?name
//! ```
//!
//! ### Literals
//!
//! Quoting lets a step contain separators and unlocks regex filters:
//!
//! ```text
//! @/*/"/^su.*/i"?name
//! @/*/"=/^\d+$/"?value
//! @/*/@"=multi
//! line"?name
//! ```
//!
//! A leading backslash forces a literal name: `\*` matches a node named `*`.
//!
//! ### Referenced Expressions
//!
//! `@@` evaluates the inner expression, then evaluates every resulting string that is
//! itself an expression:
//!
//! ```text
//! @@/0?value
//! ```
pub mod expression;
pub mod steps;
pub mod tokens;

pub use expression::{Chain, Expression, Logical, LogicalKind, MatchType, Step};
pub use steps::{IteratorKind, Pattern, ValueLiteral};
pub use tokens::Token;
