// tests/cli_tests.rs
#![cfg(feature = "cli")]

use nodex_lang::Value;
use nodex_lang::cli::{
    CheckOptions, CheckResult, CliError, DocCategory, execute_check, get_doc_category,
    get_docs_overview, json_to_node,
};
use serde_json::json;

fn check(expression: &str, input: &str) -> Result<CheckResult, CliError> {
    execute_check(&CheckOptions {
        expression: expression.to_string(),
        input: Some(input.to_string()),
        ..Default::default()
    })
}

fn success(expression: &str, input: &str) -> serde_json::Value {
    match check(expression, input) {
        Ok(CheckResult::Success(output)) => output,
        other => panic!("{} did not evaluate: {:?}", expression, other),
    }
}

// ============================================================================
// JSON documents
// ============================================================================

#[test]
fn test_json_to_node_shape() {
    let root = json_to_node(json!({
        "user": {"name": "Ada", "age": 36},
        "tags": ["a", "b"],
        "active": true
    }));

    assert_eq!(root.name(), "");
    // object keys come back sorted
    let names: Vec<String> = root.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["active", "tags", "user"]);

    let user = root.child(2).unwrap();
    assert_eq!(user.child(0).unwrap().value(), Value::Integer(36));
    assert_eq!(user.child(1).unwrap().value(), Value::from("Ada"));

    let tags = root.child(1).unwrap();
    assert!(tags.children().iter().all(|c| c.name().is_empty()));
    assert_eq!(tags.child(1).unwrap().value(), Value::from("b"));
    assert_eq!(root.child(0).unwrap().value(), Value::Boolean(true));
}

#[test]
fn test_json_scalars() {
    let root = json_to_node(json!({"f": 1.5, "n": null}));
    assert_eq!(root.child(0).unwrap().value(), Value::Float(1.5));
    assert!(root.child(1).unwrap().value().is_null());
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_values() {
    let output = success(
        "@/*/users/*/*/name?value",
        r#"{"users": [{"name": "Ada"}, {"name": "Grace"}]}"#,
    );
    assert_eq!(output, json!(["Ada", "Grace"]));
}

#[test]
fn test_check_count() {
    let output = success("@/*/users/*?count", r#"{"users": [1, 2, 3]}"#);
    assert_eq!(output, json!(3));
}

#[test]
fn test_check_nodes() {
    let output = success("@/*/user?node", r#"{"user": {"id": 7}}"#);
    assert_eq!(
        output,
        json!([{"name": "user", "value": null, "children": [{"name": "id", "value": 7}]}])
    );
}

#[test]
fn test_check_paths() {
    let output = success("@/**/=:int:2?path", r#"{"a": [1, 2], "b": 2}"#);
    assert_eq!(output, json!(["/0/1", "/1"]));
}

#[test]
fn test_syntax_only_needs_no_input() {
    let result = execute_check(&CheckOptions {
        expression: "@/*/!/error?name".to_string(),
        syntax_only: true,
        ..Default::default()
    });
    assert!(matches!(result, Ok(CheckResult::SyntaxValid)));
}

#[test]
fn test_check_errors() {
    assert!(matches!(check("@/*", "{}"), Err(CliError::Parse(_))));
    assert!(matches!(check("@/*?name", "{not json"), Err(CliError::Json(_))));
    assert!(matches!(
        check("@/*?value.int", r#"{"a": "x"}"#),
        Err(CliError::Eval(_))
    ));

    let missing = execute_check(&CheckOptions {
        expression: "@?name".to_string(),
        ..Default::default()
    });
    assert!(matches!(missing, Err(CliError::NoInput)));
}

// ============================================================================
// docs
// ============================================================================

#[test]
fn test_doc_categories() {
    assert_eq!(DocCategory::from_name("Logical"), Some(DocCategory::Logicals));
    assert_eq!(DocCategory::from_name("nav"), Some(DocCategory::Navigation));
    assert_eq!(DocCategory::from_name("nothing"), None);

    assert!(get_docs_overview().contains("NODEX DOCUMENTATION"));
    for name in [
        "syntax",
        "navigation",
        "filters",
        "positional",
        "logicals",
        "types",
        "references",
    ] {
        assert!(!get_doc_category(name).unwrap().is_empty(), "{}", name);
    }
    assert!(matches!(
        get_doc_category("nothing"),
        Err(CliError::UnknownCategory(_))
    ));
}
