use std::collections::HashSet;

use carconf_expr::{Expr, ExpressionError, evaluate, parse};
use proptest::prelude::*;

fn selected(codes: &[&str]) -> HashSet<String> {
    codes.iter().map(|code| (*code).to_string()).collect()
}

#[test]
fn empty_expression_is_true() {
    assert!(evaluate("", &selected(&[])).unwrap());
    assert!(evaluate("   ", &selected(&["a"])).unwrap());
    assert!(parse("").unwrap().is_always());
}

#[test]
fn evaluates_against_selection() {
    let codes = selected(&["US", "T1", "red"]);
    assert!(evaluate("US&T1", &codes).unwrap());
    assert!(evaluate("EU|T1", &codes).unwrap());
    assert!(!evaluate("US&~red", &codes).unwrap());
    assert!(evaluate("US&(blue|red)&~W9", &codes).unwrap());
    assert!(!evaluate("(EU|CA)&T1", &codes).unwrap());
}

#[test]
fn codes_keep_source_order() {
    let expr = parse("W1&(red|~blue)|L2").unwrap();
    assert_eq!(expr.codes(), vec!["W1", "red", "blue", "L2"]);
}

#[test]
fn malformed_expression_reports_error() {
    let error = evaluate("US&&T1", &selected(&["US"])).unwrap_err();
    assert_eq!(
        error,
        ExpressionError::UnexpectedToken {
            offset: 3,
            found: "'&'".to_string()
        }
    );
    assert!(matches!(
        evaluate("US&(T1", &selected(&[])),
        Err(ExpressionError::UnclosedParen { offset: 3 })
    ));
}

#[test]
fn slices_are_selections() {
    let codes = vec!["a".to_string(), "b".to_string()];
    assert!(evaluate("a&b", &codes).unwrap());
    let borrowed: &[&str] = &["a"];
    assert!(!evaluate("a&b", borrowed).unwrap());
}

#[test]
fn display_round_trips_through_parser() {
    let expr = parse("a&(b|~c)").unwrap();
    assert_eq!(parse(&expr.to_string()).unwrap(), expr);
}

fn code_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string)
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = code_strategy().prop_map(Expr::Code);
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|expr| Expr::Not(Box::new(expr))),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::And),
            prop::collection::vec(inner, 2..4).prop_map(Expr::Or),
        ]
    })
}

proptest! {
    #[test]
    fn printed_expressions_evaluate_like_the_tree(
        expr in expr_strategy(),
        picked in prop::collection::hash_set(code_strategy(), 0..4),
    ) {
        let text = expr.to_string();
        let parsed = parse(&text).unwrap();
        prop_assert_eq!(parsed.evaluate(&picked), expr.evaluate(&picked));
    }

    #[test]
    fn de_morgan_holds(picked in prop::collection::hash_set(code_strategy(), 0..4)) {
        let left = evaluate("~(a&b)", &picked).unwrap();
        let right = evaluate("~a|~b", &picked).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn arbitrary_input_never_panics(input in "[a-c&|~() $]{0,16}") {
        let _ = parse(&input);
    }
}
