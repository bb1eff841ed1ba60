//! The tree-walking evaluator.
//!
//! [`evaluate`] computes a [`Value`] from an [`Expr`] and an
//! [`EvaluationContext`], matching one arm per [`ExprKind`] variant.
//! [`evaluate_or_throw`] is the same computation with the `Result` unwrapped
//! into a panic, for embedders who genuinely want host-language "throw"
//! semantics instead of a tagged result — most callers want [`evaluate`].

use crate::ast::{BinaryOp, Expr, ExprKind, InterpolationPart, LogicalOp, MemberOp, ObjectKey, UnaryOp};
use crate::environment::{EvaluationContext, Scope};
use crate::error::EvalError;
use crate::eval::{methods, numeric};
use crate::value::{Lambda, Value};

/// Evaluates `expr` against `ctx`, returning the computed [`Value`] or the
/// first [`EvalError`] encountered.
pub fn evaluate(expr: &Expr, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    match &expr.kind {
        ExprKind::Literal(v) => Ok(v.clone()),
        ExprKind::Identifier(name) => eval_identifier(name, ctx),
        ExprKind::Unary { op, operand } => eval_unary(*op, operand, ctx),
        ExprKind::Binary { left, op, right } => eval_binary(left, *op, right, ctx),
        ExprKind::Logical { left, op, right } => eval_logical(left, *op, right, ctx),
        ExprKind::Grouping(inner) => evaluate(inner, ctx),
        ExprKind::Call { callee, args } => eval_call(callee, args, ctx),
        ExprKind::Member { object, op, name } => eval_member(object, *op, name, ctx),
        ExprKind::Index { object, index } => eval_index(object, index, ctx),
        ExprKind::Conditional { cond, then, else_ } => eval_conditional(cond, then, else_, ctx),
        ExprKind::Array(elements) => eval_array(elements, ctx),
        ExprKind::Object(entries) => eval_object(entries, ctx),
        ExprKind::Interpolation(parts) => eval_interpolation(parts, ctx),
        ExprKind::Pipe { value, filter_name, filter_args } => {
            eval_pipe(value, filter_name, filter_args, ctx)
        }
        ExprKind::Lambda { params, body } => Ok(eval_lambda(params, body, ctx)),
    }
}

/// Like [`evaluate`], but panics with the error's `Display` message on
/// failure rather than returning a `Result`.
pub fn evaluate_or_throw(expr: &Expr, ctx: &EvaluationContext) -> Value {
    match evaluate(expr, ctx) {
        Ok(v) => v,
        Err(e) => panic!("{e}"),
    }
}

fn eval_identifier(name: &str, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    ctx.lookup(name).ok_or_else(|| EvalError::undefined_identifier(name))
}

fn eval_unary(op: UnaryOp, operand: &Expr, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let value = evaluate(operand, ctx)?;
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg => match value {
            Value::Integer(n) => Ok(Value::Integer(-n)),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(EvalError::type_error("Integer or Float", other.type_name())),
        },
    }
}

fn eval_binary(left: &Expr, op: BinaryOp, right: &Expr, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let l = evaluate(left, ctx)?;
    let r = evaluate(right, ctx)?;
    match op {
        BinaryOp::Add => add(l, r),
        BinaryOp::Sub => arith(l, r, |a, b| a - b),
        BinaryOp::Mul => arith(l, r, |a, b| a * b),
        BinaryOp::Div => {
            let (a, b) = numeric_pair(&l, &r)?;
            if b == 0.0 {
                return Err(EvalError::division_by_zero());
            }
            Ok(narrow(a / b))
        }
        BinaryOp::Mod => {
            let (a, b) = numeric_pair(&l, &r)?;
            if b == 0.0 {
                return Err(EvalError::division_by_zero());
            }
            Ok(narrow(a % b))
        }
        BinaryOp::Pow => {
            let (a, b) = numeric_pair(&l, &r)?;
            Ok(narrow(numeric::pow(a, b)))
        }
        BinaryOp::Eq => Ok(Value::Bool(l == r)),
        BinaryOp::Ne => Ok(Value::Bool(l != r)),
        BinaryOp::Lt => compare(&l, &r, |o| o == std::cmp::Ordering::Less),
        BinaryOp::Le => compare(&l, &r, |o| o != std::cmp::Ordering::Greater),
        BinaryOp::Gt => compare(&l, &r, |o| o == std::cmp::Ordering::Greater),
        BinaryOp::Ge => compare(&l, &r, |o| o != std::cmp::Ordering::Less),
    }
}

fn add(l: Value, r: Value) -> Result<Value, EvalError> {
    match (&l, &r) {
        (Value::Array(a), Value::Array(b)) => {
            let mut result = a.clone();
            result.extend(b.clone());
            Ok(Value::Array(result))
        }
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::String(format!("{}{}", stringify_for_concat(&l), stringify_for_concat(&r))))
        }
        _ => arith(l, r, |a, b| a + b),
    }
}

fn stringify_for_concat(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        other => other.to_display_string(),
    }
}

fn arith(l: Value, r: Value, f: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    let (a, b) = numeric_pair(&l, &r)?;
    Ok(narrow(f(a, b)))
}

fn numeric_pair(l: &Value, r: &Value) -> Result<(f64, f64), EvalError> {
    let a = l.as_f64().ok_or_else(|| EvalError::type_error("Integer or Float", l.type_name()))?;
    let b = r.as_f64().ok_or_else(|| EvalError::type_error("Integer or Float", r.type_name()))?;
    Ok((a, b))
}

/// Narrows an arithmetic result back to `Integer` when it is an exact,
/// in-range integral value, mirroring [`crate::lexer::narrow_number`] so
/// `2 + 2` stays an `Integer` rather than becoming a `Float`.
fn narrow(n: f64) -> Value {
    crate::lexer::narrow_number(n)
}

fn compare(l: &Value, r: &Value, accept: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value, EvalError> {
    let ordering = match (l, r) {
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            let (a, b) = numeric_pair(l, r)?;
            a.partial_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    };
    match ordering {
        Some(o) => Ok(Value::Bool(accept(o))),
        None => Err(EvalError::type_error(
            "two numbers, two strings, or two DateTimes",
            &format!("{} and {}", l.type_name(), r.type_name()),
        )),
    }
}

fn eval_logical(left: &Expr, op: LogicalOp, right: &Expr, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let l = evaluate(left, ctx)?;
    match op {
        LogicalOp::And => {
            if !l.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate(right, ctx)?.is_truthy()))
        }
        LogicalOp::Or => {
            if l.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate(right, ctx)?.is_truthy()))
        }
    }
}

fn eval_conditional(cond: &Expr, then: &Expr, else_: &Expr, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if evaluate(cond, ctx)?.is_truthy() {
        evaluate(then, ctx)
    } else {
        evaluate(else_, ctx)
    }
}

fn eval_array(elements: &[Expr], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let mut values = Vec::with_capacity(elements.len());
    for e in elements {
        values.push(evaluate(e, ctx)?);
    }
    Ok(Value::Array(values))
}

fn eval_object(entries: &[(ObjectKey, Expr)], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let mut fields = Vec::with_capacity(entries.len());
    for (key, value_expr) in entries {
        let key = match key {
            ObjectKey::Literal(name) => name.clone(),
            ObjectKey::Computed(expr) => evaluate(expr, ctx)?.to_display_string(),
        };
        let value = evaluate(value_expr, ctx)?;
        fields.push((key, value));
    }
    Ok(Value::Object(fields))
}

fn eval_interpolation(parts: &[InterpolationPart], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let mut out = String::new();
    for part in parts {
        match part {
            InterpolationPart::Literal(text) => out.push_str(text),
            InterpolationPart::Expr(expr) => {
                let value = evaluate(expr, ctx)?;
                out.push_str(&stringify_for_concat(&value));
            }
        }
    }
    Ok(Value::String(out))
}

fn eval_lambda(params: &[String], body: &Expr, ctx: &EvaluationContext) -> Value {
    Value::Lambda(Lambda {
        params: params.to_vec(),
        body: std::rc::Rc::new(body.clone()),
        captured: ctx.scope.clone(),
    })
}

/// Invokes a [`Lambda`] value with `args`, sharing `ctx`'s registry.
/// Parameters bind positionally; extra arguments are ignored, missing ones
/// bind to `Null`.
pub fn invoke_lambda(lambda: &Lambda, args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let call_scope = Scope::child(&lambda.captured);
    for (i, param) in lambda.params.iter().enumerate() {
        call_scope.bind(param.clone(), args.get(i).cloned().unwrap_or(Value::Null));
    }
    let call_ctx = EvaluationContext {
        scope: call_scope,
        registry: ctx.registry.clone(),
    };
    evaluate(&lambda.body, &call_ctx)
}

/// Call evaluation: an `Identifier` callee resolves in the
/// `FunctionRegistry`; a `Member` callee is a method invocation dispatched
/// against the receiver's runtime type. No other callee shape is callable —
/// a scope-bound `Lambda` value is invoked only through [`invoke_lambda`],
/// from a method or filter that already holds a `Lambda` argument (this
/// language has exactly these two call shapes, not a third "call an arbitrary
/// expression" form).
fn eval_call(callee: &Expr, args: &[Expr], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    match &callee.kind {
        ExprKind::Identifier(name) => {
            let values = eval_args(args, ctx)?;
            ctx.registry.call(name, &values, ctx)
        }
        ExprKind::Member { object, op, name } => {
            let receiver = evaluate(object, ctx)?;
            if *op == MemberOp::OptionalDot && receiver == Value::Null {
                return Ok(Value::Null);
            }
            let values = eval_args(args, ctx)?;
            methods::call_method(&receiver, name, &values, ctx)
        }
        _ => Err(EvalError::type_error("an identifier or member expression", "a non-callable expression")),
    }
}

fn eval_args(args: &[Expr], ctx: &EvaluationContext) -> Result<Vec<Value>, EvalError> {
    let mut values = Vec::with_capacity(args.len());
    for a in args {
        values.push(evaluate(a, ctx)?);
    }
    Ok(values)
}

/// Member access: field lookup on `Object`, the
/// reserved pseudo-properties on `Array`/`String`, and `?.`'s short-circuit
/// to `Null` on a null receiver.
fn eval_member(object: &Expr, op: MemberOp, name: &str, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let receiver = evaluate(object, ctx)?;
    if op == MemberOp::OptionalDot && receiver == Value::Null {
        return Ok(Value::Null);
    }
    match &receiver {
        Value::Object(_) => Ok(receiver.object_get(name).cloned().unwrap_or(Value::Null)),
        Value::Array(items) => array_property(items, name),
        Value::String(s) => string_property(s, name),
        _ => Err(EvalError::type_error("Object, Array, or String", receiver.type_name())),
    }
}

fn array_property(items: &[Value], name: &str) -> Result<Value, EvalError> {
    match name {
        "length" => Ok(Value::Integer(items.len() as i64)),
        "first" => Ok(items.first().cloned().unwrap_or(Value::Null)),
        "last" => Ok(items.last().cloned().unwrap_or(Value::Null)),
        "isEmpty" => Ok(Value::Bool(items.is_empty())),
        "isNotEmpty" => Ok(Value::Bool(!items.is_empty())),
        other => Err(EvalError::unknown_method("Array", other)),
    }
}

fn string_property(s: &str, name: &str) -> Result<Value, EvalError> {
    match name {
        "length" => Ok(Value::Integer(s.chars().count() as i64)),
        "isEmpty" => Ok(Value::Bool(s.is_empty())),
        "isNotEmpty" => Ok(Value::Bool(!s.is_empty())),
        other => Err(EvalError::unknown_method("String", other)),
    }
}

/// Index access: `Array[Integer]`,
/// `Object[Value]`, `String[Integer]`.
fn eval_index(object: &Expr, index: &Expr, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let receiver = evaluate(object, ctx)?;
    let index_value = evaluate(index, ctx)?;
    match &receiver {
        Value::Array(items) => {
            let i = require_index(&index_value)?;
            let pos = usize_index(i, items.len())?;
            Ok(items[pos].clone())
        }
        Value::Object(_) => {
            let key = index_value.to_display_string();
            Ok(receiver.object_get(&key).cloned().unwrap_or(Value::Null))
        }
        Value::String(s) => {
            let i = require_index(&index_value)?;
            let chars: Vec<char> = s.chars().collect();
            let pos = usize_index(i, chars.len())?;
            Ok(Value::String(chars[pos].to_string()))
        }
        _ => Err(EvalError::type_error("Array, Object, or String", receiver.type_name())),
    }
}

fn require_index(v: &Value) -> Result<i64, EvalError> {
    match v {
        Value::Integer(n) => Ok(*n),
        other => Err(EvalError::type_error("Integer", other.type_name())),
    }
}

fn usize_index(i: i64, len: usize) -> Result<usize, EvalError> {
    if i < 0 || i as usize >= len {
        return Err(EvalError::index_out_of_range(i, len));
    }
    Ok(i as usize)
}

/// Pipe evaluation: `v | f` / `v | f(args...)`.
fn eval_pipe(value: &Expr, filter_name: &str, filter_args: &[Expr], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let v = evaluate(value, ctx)?;
    let args = eval_args(filter_args, ctx)?;
    crate::eval::filters::apply_filter(filter_name, v, &args, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval_src(src: &str) -> Value {
        let ctx = EvaluationContext::new();
        let expr = parse(src).unwrap();
        evaluate(&expr, &ctx).unwrap_or_else(|e| panic!("{src:?}: {e}"))
    }

    #[test]
    fn precedence_examples() {
        assert_eq!(eval_src("1 + 2 * 3"), Value::Integer(7));
        assert_eq!(eval_src("(1 + 2) * 3"), Value::Integer(9));
        assert_eq!(eval_src("2 ** 3 ** 2"), Value::Integer(512));
        assert_eq!(eval_src("!false"), Value::Bool(true));
        assert_eq!(eval_src("-2 ** 2"), Value::Integer(-4));
    }

    #[test]
    fn short_circuit_returns_bool_not_operand() {
        assert_eq!(eval_src("1 and 2"), Value::Bool(true));
        assert_eq!(eval_src("0 and 2"), Value::Bool(false));
        assert_eq!(eval_src("0 or 5"), Value::Bool(true));
    }

    #[test]
    fn string_concatenation_coerces_null_to_empty() {
        assert_eq!(eval_src(r#""a" + null"#), Value::String("a".to_string()));
    }

    #[test]
    fn array_concatenation() {
        assert_eq!(
            eval_src("[1, 2] + [3]"),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let ctx = EvaluationContext::new();
        let expr = parse("1 / 0").unwrap();
        assert!(evaluate(&expr, &ctx).is_err());
    }

    #[test]
    fn optional_chaining_short_circuits_to_null() {
        assert_eq!(eval_src("null?.x"), Value::Null);
    }

    #[test]
    fn member_access_on_object() {
        assert_eq!(eval_src(r#"{ a: 1 }.a"#), Value::Integer(1));
        assert_eq!(eval_src(r#"{ a: 1 }.b"#), Value::Null);
    }

    #[test]
    fn array_reserved_properties() {
        assert_eq!(eval_src("[1,2,3].length"), Value::Integer(3));
        assert_eq!(eval_src("[1,2,3].first"), Value::Integer(1));
        assert_eq!(eval_src("[].isEmpty"), Value::Bool(true));
    }

    #[test]
    fn array_index_out_of_range_errors() {
        let ctx = EvaluationContext::new();
        let expr = parse("[1,2][5]").unwrap();
        assert!(evaluate(&expr, &ctx).is_err());
    }

    #[test]
    fn conditional_evaluates_one_branch() {
        assert_eq!(eval_src("true ? 1 : 2"), Value::Integer(1));
        assert_eq!(eval_src("false ? 1 : 2"), Value::Integer(2));
    }

    #[test]
    fn string_interpolation_renders_and_concatenates() {
        let ctx = EvaluationContext::new();
        ctx.bind("name", Value::String("world".to_string()));
        let expr = parse(r#""hello ${name}!""#).unwrap();
        assert_eq!(evaluate(&expr, &ctx).unwrap(), Value::String("hello world!".to_string()));
    }

    #[test]
    fn lambda_literal_is_invocable_via_invoke_lambda() {
        let ctx = EvaluationContext::new();
        let expr = parse("x => x + 1").unwrap();
        let value = evaluate(&expr, &ctx).unwrap();
        let lambda = match value {
            Value::Lambda(l) => l,
            other => panic!("expected Lambda, got {other:?}"),
        };
        let result = invoke_lambda(&lambda, &[Value::Integer(41)], &ctx).unwrap();
        assert_eq!(result, Value::Integer(42));
    }

    #[test]
    fn bare_identifier_call_resolves_registry_not_scope() {
        let ctx = EvaluationContext::new();
        ctx.bind(
            "double",
            Value::Lambda(Lambda {
                params: vec!["x".into()],
                body: std::rc::Rc::new(parse("x * 2").unwrap()),
                captured: ctx.scope.clone(),
            }),
        );
        let expr = parse("double(5)").unwrap();
        assert!(evaluate(&expr, &ctx).is_err());
    }
}
