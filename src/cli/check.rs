//! Evaluate expressions against JSON input

use super::{CliError, json_to_node};
use crate::{Evaluator, Expression, output::match_to_json};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated successfully with JSON output
    Success(serde_json::Value),
}

/// Execute a nodex check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let expression = Expression::compile(&options.expression)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let document: serde_json::Value = serde_json::from_str(json_str)?;
    let root = json_to_node(document);

    let result = Evaluator::new().evaluate_expression(&expression, &root)?;
    Ok(CheckResult::Success(match_to_json(&result)?))
}
