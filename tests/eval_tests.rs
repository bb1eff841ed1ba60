//! End-to-end evaluator scenarios, run through the full
//! lex → parse → evaluate pipeline via `evaluate_source_with`.

use bundle_expr::{evaluate_source, evaluate_source_with, EvaluationContext, Value};

fn obj(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[test]
fn membership_and_comparison_scenario() {
    let ctx = EvaluationContext::new();
    ctx.bind("user", obj(vec![("name", Value::String("John".into()))]));
    ctx.bind("age", Value::Integer(20));
    assert_eq!(
        evaluate_source_with(r#"user.name == "John" and age >= 18"#, &ctx).unwrap(),
        Value::Bool(true)
    );

    let ctx = EvaluationContext::new();
    ctx.bind("user", obj(vec![("name", Value::String("John".into()))]));
    ctx.bind("age", Value::Integer(17));
    assert_eq!(
        evaluate_source_with(r#"user.name == "John" and age >= 18"#, &ctx).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn pipe_filter_chain_over_a_collection() {
    let ctx = EvaluationContext::new();
    let items = Value::Array(vec![
        obj(vec![("name", Value::String("a".into())), ("active", Value::Bool(true))]),
        obj(vec![("name", Value::String("b".into())), ("active", Value::Bool(false))]),
        obj(vec![("name", Value::String("c".into())), ("active", Value::Bool(true))]),
    ]);
    ctx.bind("items", items);
    let result = evaluate_source_with(
        r#"items | filter(x => x.active) | map(x => x.name) | join(", ")"#,
        &ctx,
    )
    .unwrap();
    assert_eq!(result, Value::String("a, c".to_string()));
}

#[test]
fn optional_chaining_through_nested_nulls() {
    let ctx = EvaluationContext::new();
    ctx.bind("user", Value::Null);
    assert_eq!(evaluate_source_with("user?.profile?.email", &ctx).unwrap(), Value::Null);

    let ctx = EvaluationContext::new();
    ctx.bind("user", obj(vec![("profile", Value::Null)]));
    assert_eq!(evaluate_source_with("user?.profile?.email", &ctx).unwrap(), Value::Null);

    let ctx = EvaluationContext::new();
    ctx.bind(
        "user",
        obj(vec![("profile", obj(vec![("email", Value::String("x@y".into()))]))]),
    );
    assert_eq!(
        evaluate_source_with("user?.profile?.email", &ctx).unwrap(),
        Value::String("x@y".to_string())
    );
}

#[test]
fn switch_with_and_without_a_matching_case() {
    let ctx = EvaluationContext::new();
    ctx.bind("kind", Value::String("b".into()));
    assert_eq!(
        evaluate_source_with(r#"switch(kind, "a", 1, "b", 2, 0)"#, &ctx).unwrap(),
        Value::Integer(2)
    );

    let ctx = EvaluationContext::new();
    ctx.bind("kind", Value::String("z".into()));
    assert_eq!(
        evaluate_source_with(r#"switch(kind, "a", 1, "b", 2, 0)"#, &ctx).unwrap(),
        Value::Integer(0)
    );
}

#[test]
fn short_circuit_and_never_evaluates_the_right_side() {
    // `fail()` is not a registered built-in; if the right side were
    // evaluated this would error instead of short-circuiting to `false`.
    assert_eq!(evaluate_source("false and fail()").unwrap(), Value::Bool(false));
    assert_eq!(evaluate_source("true or fail()").unwrap(), Value::Bool(true));
}

#[test]
fn string_interpolation_end_to_end() {
    let ctx = EvaluationContext::new();
    ctx.bind("name", Value::String("world".into()));
    ctx.bind("count", Value::Integer(3));
    assert_eq!(
        evaluate_source_with(r#""hello ${name}, you have ${count} items""#, &ctx).unwrap(),
        Value::String("hello world, you have 3 items".to_string())
    );
}

#[test]
fn lambda_closures_capture_their_defining_scope() {
    let ctx = EvaluationContext::new();
    ctx.bind("factor", Value::Integer(10));
    let result = evaluate_source_with("[1, 2, 3].map(x => x * factor)", &ctx).unwrap();
    assert_eq!(
        result,
        Value::Array(vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)])
    );
}

#[test]
fn reduce_sums_a_collection() {
    assert_eq!(
        evaluate_source("[1, 2, 3, 4].reduce((acc, x) => acc + x, 0)").unwrap(),
        Value::Integer(10)
    );
}

#[test]
fn unknown_identifier_is_an_eval_error() {
    assert!(evaluate_source("nope + 1").is_err());
}

#[test]
fn calling_an_unknown_registry_function_is_an_eval_error() {
    assert!(evaluate_source("totallyMadeUp(1)").is_err());
}
