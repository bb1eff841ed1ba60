//! Integration tests for parsing, including the precedence/associativity
//! invariants and the parse round-trip property.

use bundle_expr::ast::{Expr, ExprKind};
use bundle_expr::parser::parse;

fn kind(src: &str) -> ExprKind {
    parse(src).unwrap().kind
}

#[test]
fn precedence_examples() {
    assert!(matches!(kind("1 + 2 * 3"), ExprKind::Binary { .. }));
    let e = parse("1 + 2 * 3").unwrap();
    if let ExprKind::Binary { left, op, right } = &e.kind {
        assert_eq!(*op, bundle_expr::ast::BinaryOp::Add);
        assert!(matches!(left.kind, ExprKind::Literal(_)));
        assert!(matches!(right.kind, ExprKind::Binary { .. }));
    } else {
        panic!("expected Binary");
    }
}

#[test]
fn power_is_right_associative_and_unary_minus_binds_looser() {
    // 2 ** 3 ** 2 -> Binary(2, Pow, Binary(3, Pow, 2))
    let e = parse("2 ** 3 ** 2").unwrap();
    if let ExprKind::Binary { right, .. } = &e.kind {
        assert!(matches!(right.kind, ExprKind::Binary { .. }));
    } else {
        panic!("expected Binary");
    }
    // -2 ** 2 -> Unary(Neg, Binary(2, Pow, 2))
    let e = parse("-2 ** 2").unwrap();
    assert!(matches!(e.kind, ExprKind::Unary { .. }));
    if let ExprKind::Unary { operand, .. } = &e.kind {
        assert!(matches!(operand.kind, ExprKind::Binary { .. }));
    }
}

#[test]
fn pipe_binds_tighter_than_unary_not() {
    // !x | f -> Unary(Not, Pipe(x, f))
    let e = parse("!x | f").unwrap();
    assert!(matches!(e.kind, ExprKind::Unary { .. }));
    if let ExprKind::Unary { operand, .. } = &e.kind {
        assert!(matches!(operand.kind, ExprKind::Pipe { .. }));
    }
}

#[test]
fn lambda_sugar_forms_parse_to_the_same_shape() {
    let bare = parse("x => x + 1").unwrap();
    let parens = parse("(x) => x + 1").unwrap();
    assert_eq!(bare, parens);
}

#[test]
fn zero_param_lambda_parses() {
    assert!(matches!(kind("() => 1"), ExprKind::Lambda { .. }));
}

#[test]
fn empty_grouping_without_arrow_is_a_parse_error() {
    assert!(parse("()").is_err());
}

#[test]
fn grouping_without_arrow_is_grouping_not_lambda() {
    assert!(matches!(kind("(1 + 2)"), ExprKind::Grouping(_)));
}

#[test]
fn trailing_tokens_after_root_expression_is_an_error() {
    assert!(parse("1 + 2 3").is_err());
}

#[test]
fn optional_chaining_produces_distinct_member_op() {
    let e = parse("a?.b").unwrap();
    if let ExprKind::Member { op, .. } = &e.kind {
        assert_eq!(*op, bundle_expr::ast::MemberOp::OptionalDot);
    } else {
        panic!("expected Member");
    }
}

#[test]
fn computed_object_keys_parse() {
    assert!(matches!(kind(r#"{ [k]: 1 }"#), ExprKind::Object(_)));
}

#[test]
fn string_interpolation_hole_parses_into_parts() {
    let e = parse(r#""hello ${name}!""#).unwrap();
    assert!(matches!(e.kind, ExprKind::Interpolation(_)));
}

#[test]
fn plain_string_without_holes_is_a_literal() {
    assert!(matches!(kind(r#""plain""#), ExprKind::Literal(_)));
}

#[test]
fn parse_round_trip_preserves_tree_shape() {
    let sources = [
        "1 + 2 * 3",
        "a.b.c",
        "a?.b(1, 2)",
        "[1, 2, 3]",
        r#"{ a: 1, b: [2, 3] }"#,
        "x => x + 1",
        "(a, b) => a + b",
        "cond ? 1 : 2",
        r#"items | filter(x => x.active) | map(x => x.name)"#,
        "-2 ** 2",
        "2 ** 3 ** 2",
    ];
    for src in sources {
        let original = parse(src).unwrap();
        let printed = original.to_string();
        let reparsed = parse(&printed).unwrap_or_else(|e| panic!("re-parsing {printed:?} (from {src:?}) failed: {e}"));
        assert_eq!(original, reparsed, "round trip mismatch for {src:?} (printed {printed:?})");
    }
}

#[test]
fn array_call_index_chain_parses_left_to_right() {
    let e: Expr = parse("f(1)[0].x").unwrap();
    assert!(matches!(e.kind, ExprKind::Member { .. }));
}
