// tests/parser_tests.rs

use nodex_lang::ast::{
    Chain, Expression, IteratorKind, Logical, LogicalKind, MatchType, Step, ValueLiteral,
};
use nodex_lang::parser::ParseError;
use rstest::rstest;

fn compile(text: &str) -> Expression {
    Expression::compile(text).unwrap_or_else(|e| panic!("{} failed to compile: {}", text, e))
}

fn single_step(text: &str) -> IteratorKind {
    let expression = compile(&format!("@/{}?node", text));
    match expression.chain.steps.as_slice() {
        [Step::Iterator(kind)] => kind.clone(),
        other => panic!("expected one step, got {:?}", other),
    }
}

fn it(kind: IteratorKind) -> Step {
    Step::Iterator(kind)
}

// ============================================================================
// Step classification
// ============================================================================

#[rstest]
#[case("*", IteratorKind::Children)]
#[case("**", IteratorKind::Descendants)]
#[case(".", IteratorKind::Parent)]
#[case("..", IteratorKind::Root)]
#[case(".._start", IteratorKind::Ancestor("_start".to_string()))]
#[case("0", IteratorKind::Numbered(0))]
#[case("12", IteratorKind::Numbered(12))]
#[case("+", IteratorKind::Sibling(1))]
#[case("-", IteratorKind::Sibling(-1))]
#[case("+2", IteratorKind::Sibling(2))]
#[case("-3", IteratorKind::Sibling(-3))]
#[case("<", IteratorKind::Previous)]
#[case(">", IteratorKind::Next)]
#[case("#", IteratorKind::Reference)]
#[case("success", IteratorKind::Named("success".to_string()))]
#[case("-foo", IteratorKind::Named("-foo".to_string()))]
#[case("%2", IteratorKind::Modulo(2))]
fn test_word_steps(#[case] text: &str, #[case] expected: IteratorKind) {
    assert_eq!(single_step(text), expected);
}

#[rstest]
#[case("[1,5]", Some(1), Some(5))]
#[case("[1,]", Some(1), None)]
#[case("[,4]", None, Some(4))]
#[case("[,]", None, None)]
fn test_range_steps(#[case] text: &str, #[case] start: Option<usize>, #[case] end: Option<usize>) {
    assert_eq!(single_step(text), IteratorKind::Range { start, end });
}

#[test]
fn test_value_equality_steps() {
    assert_eq!(
        single_step("=query"),
        IteratorKind::ValueEquals(ValueLiteral::Plain("query".to_string()))
    );
    assert_eq!(
        single_step("=:int:5"),
        IteratorKind::ValueEquals(ValueLiteral::Typed {
            type_name: "int".to_string(),
            text: "5".to_string(),
        })
    );
    assert_eq!(
        single_step("="),
        IteratorKind::ValueEquals(ValueLiteral::Plain(String::new()))
    );
}

#[rstest]
#[case(r"\*", "*")]
#[case(r"\..", "..")]
#[case(r"\\", "\\")]
#[case(r"\0", "0")]
#[case(r"\|", "|")]
#[case(r#""\\/""#, "/")]
#[case(r#""a b""#, "a b")]
fn test_escaped_steps_are_names(#[case] text: &str, #[case] name: &str) {
    assert_eq!(single_step(text), IteratorKind::Named(name.to_string()));
}

#[test]
fn test_regex_literals() {
    match single_step(r#""/^s/i""#) {
        IteratorKind::NameRegex(pattern) => {
            assert_eq!(pattern.source(), "/^s/i");
            assert!(pattern.is_match("Success"));
        }
        other => panic!("expected name regex, got {:?}", other),
    }
    match single_step(r#""=/^\d+$/""#) {
        IteratorKind::ValueRegex(pattern) => {
            assert!(pattern.is_match("123"));
            assert!(!pattern.is_match("12a"));
        }
        other => panic!("expected value regex, got {:?}", other),
    }
}

#[test]
fn test_literal_without_regex_form_is_classified_like_a_word() {
    assert_eq!(single_step(r#""*""#), IteratorKind::Children);
    assert_eq!(single_step(r#""/""#), IteratorKind::Named("/".to_string()));
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_type_suffix() {
    let expression = compile("@?value.decimal");
    assert_eq!(expression.kind, MatchType::Value);
    assert_eq!(expression.convert.as_deref(), Some("decimal"));

    for (suffix, kind) in [
        ("name", MatchType::Name),
        ("value", MatchType::Value),
        ("count", MatchType::Count),
        ("path", MatchType::Path),
        ("node", MatchType::Node),
    ] {
        let expression = compile(&format!("@?{}", suffix));
        assert_eq!(expression.kind, kind);
        assert_eq!(expression.convert, None);
    }
}

#[test]
fn test_referenced_flag() {
    assert!(compile("@@/0?value").referenced);
    assert!(!compile("@/0?value").referenced);
}

#[test]
fn test_source_is_kept() {
    let text = "@/*/success?name";
    assert_eq!(compile(text).source, text);
    assert_eq!(compile(text).to_string(), text);
}

#[test]
fn test_logical_consumes_following_steps() {
    let chain = compile("@/*/!/error/0?name").chain;
    assert_eq!(
        chain,
        Chain {
            steps: vec![it(IteratorKind::Children)],
            logicals: vec![Logical {
                kind: LogicalKind::Not,
                operand: vec![
                    it(IteratorKind::Named("error".to_string())),
                    it(IteratorKind::Numbered(0)),
                ],
            }],
        }
    );
}

#[test]
fn test_logicals_apply_in_sequence() {
    let chain = compile("@/*/(/_1/|/_2/|/_3/&/_3/)?value").chain;
    let Step::Group(group) = &chain.steps[1] else {
        panic!("expected group, got {:?}", chain.steps[1]);
    };
    let kinds: Vec<_> = group.logicals.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        [LogicalKind::Or, LogicalKind::Or, LogicalKind::And]
    );
    assert_eq!(group.steps, vec![it(IteratorKind::Named("_1".to_string()))]);
}

#[test]
fn test_operator_between_groups() {
    let chain = compile("@/*/((/succ/|/error/)^(/ess/|/error/))?name").chain;
    let Step::Group(outer) = &chain.steps[1] else {
        panic!("expected group");
    };
    assert!(matches!(outer.steps.as_slice(), [Step::Group(_)]));
    assert_eq!(outer.logicals.len(), 1);
    assert_eq!(outer.logicals[0].kind, LogicalKind::Xor);
    assert!(matches!(outer.logicals[0].operand.as_slice(), [Step::Group(_)]));
}

#[test]
fn test_group_starting_with_operator() {
    let chain = compile("@/*/(!/error/)?name").chain;
    let Step::Group(group) = &chain.steps[1] else {
        panic!("expected group");
    };
    assert!(group.steps.is_empty());
    assert_eq!(group.logicals[0].kind, LogicalKind::Not);
}

#[test]
fn test_multiline_expression() {
    let text = "@/..\n    /*\n      /_mammal\n        /*\n           (\n              /**/smart/.\n              !\n              /land/*/humans\n           )\n?node";
    let chain = compile(text).chain;
    assert_eq!(chain.steps.len(), 5);
    let Step::Group(group) = &chain.steps[4] else {
        panic!("expected group");
    };
    assert_eq!(group.steps.len(), 3);
    assert_eq!(group.logicals[0].kind, LogicalKind::Not);
    assert_eq!(group.logicals[0].operand.len(), 3);
}

#[test]
fn test_empty_steps() {
    assert_eq!(compile("@/-/?node").chain.steps, vec![it(IteratorKind::Sibling(-1))]);
    assert!(compile("@//?node").chain.steps.is_empty());
    let chain = compile("@/succ/|?name").chain;
    assert!(chain.logicals[0].operand.is_empty());
}

#[test]
fn test_from_str() {
    let expression: Expression = "@/0?name".parse().unwrap();
    assert_eq!(expression.chain.steps, vec![it(IteratorKind::Numbered(0))]);
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
#[case::missing_sentinel("/*?name")]
#[case::missing_suffix("@/*")]
#[case::unknown_kind("@/*?names")]
#[case::empty_type_name("@/*?value.")]
#[case::triple_sentinel("@@@/0?value")]
#[case::unterminated_group("@/(/a?name")]
#[case::stray_close("@/a/)?name")]
#[case::fused_not("@/*/!error?name")]
#[case::fused_or("@/*/|x?name")]
#[case::step_without_separator("@foo?name")]
#[case::bad_range("@/[1,x]?name")]
#[case::unclosed_range("@/[1,2?name")]
#[case::range_without_comma("@/[1]?name")]
#[case::zero_modulo("@/%0?name")]
#[case::bad_modulo("@/%x?name")]
#[case::bad_typed_literal("@/=:int?name")]
#[case::empty_type_in_literal("@/=::5?name")]
#[case::invalid_regex(r#"@/"/(/"?name"#)]
#[case::unknown_regex_flag(r#"@/"/a/q"?name"#)]
#[case::overflow("@/99999999999999999999999?name")]
#[case::inner_sentinel("@/a/@/b?name")]
#[case::unterminated_literal(r#"@/"abc?name"#)]
fn test_syntax_errors(#[case] text: &str) {
    assert!(
        Expression::compile(text).is_err(),
        "{} should not compile",
        text
    );
}

#[test]
fn test_error_names_fragment_and_position() {
    let err = Expression::compile("@/*\n  /!error?name").unwrap_err();
    match &err {
        ParseError::Syntax {
            fragment,
            position,
            ..
        } => {
            assert_eq!(fragment, "!error");
            assert_eq!(position.line, 2);
            assert_eq!(position.column, 4);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.position().line, 2);
    assert!(err.to_string().contains("!error"));
}

#[test]
fn test_lex_errors_convert() {
    let err = Expression::compile("@/abc\\").unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));
}
