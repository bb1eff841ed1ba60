//! Receiver-typed method dispatch.
//!
//! `callee(args)` where `callee` is a `Member` expression is a method call:
//! the receiver's runtime type and the member name together select one
//! entry from a fixed table. This mirrors how `eval/builtins.rs` dispatches
//! free functions by name, but keyed additionally by receiver kind.

use crate::environment::EvaluationContext;
use crate::error::EvalError;
use crate::eval::interpreter::invoke_lambda;
use crate::value::Value;

/// Dispatches a method call for `receiver.name(args...)`.
pub fn call_method(receiver: &Value, name: &str, args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    match receiver {
        Value::String(s) => string_method(s, name, args),
        Value::Array(items) => array_method(items, name, args, ctx),
        Value::Object(fields) => object_method(fields, name, args),
        other => Err(EvalError::unknown_method(other.type_name(), name)),
    }
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Null)
}

fn expect_lambda<'a>(args: &'a [Value], i: usize, method: &str) -> Result<&'a crate::value::Lambda, EvalError> {
    match args.get(i) {
        Some(Value::Lambda(l)) => Ok(l),
        Some(other) => Err(EvalError::type_error("Lambda", other.type_name())),
        None => Err(EvalError::type_error("Lambda", &format!("missing argument to {method}"))),
    }
}

// ---- String methods --------------------------------------------------

fn string_method(s: &str, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "uppercase" => Ok(Value::String(s.to_uppercase())),
        "lowercase" => Ok(Value::String(s.to_lowercase())),
        "trim" => Ok(Value::String(s.trim().to_string())),
        "split" => {
            let sep = arg(args, 0).to_display_string();
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect()
            };
            Ok(Value::Array(parts))
        }
        "substring" => {
            let chars: Vec<char> = s.chars().collect();
            let start = as_usize_clamped(&arg(args, 0), chars.len());
            let end = match args.get(1) {
                Some(v) => as_usize_clamped(v, chars.len()),
                None => chars.len(),
            };
            let end = end.max(start);
            Ok(Value::String(chars[start..end].iter().collect()))
        }
        "contains" => Ok(Value::Bool(s.contains(&arg(args, 0).to_display_string()))),
        "startsWith" => Ok(Value::Bool(s.starts_with(&arg(args, 0).to_display_string()))),
        "endsWith" => Ok(Value::Bool(s.ends_with(&arg(args, 0).to_display_string()))),
        "replace" => {
            let from = arg(args, 0).to_display_string();
            let to = arg(args, 1).to_display_string();
            Ok(Value::String(s.replace(&from, &to)))
        }
        "indexOf" => {
            let needle = arg(args, 0).to_display_string();
            match s.find(&needle) {
                Some(byte_pos) => Ok(Value::Integer(s[..byte_pos].chars().count() as i64)),
                None => Ok(Value::Integer(-1)),
            }
        }
        other => Err(EvalError::unknown_method("String", other)),
    }
}

fn as_usize_clamped(v: &Value, len: usize) -> usize {
    match v {
        Value::Integer(n) if *n < 0 => 0,
        Value::Integer(n) => (*n as usize).min(len),
        _ => 0,
    }
}

// ---- Array methods ------------------------------------------------------

fn array_method(items: &[Value], name: &str, args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    match name {
        "join" => {
            let sep = if args.is_empty() { ",".to_string() } else { arg(args, 0).to_display_string() };
            let rendered: Vec<String> = items.iter().map(|v| v.to_display_string()).collect();
            Ok(Value::String(rendered.join(&sep)))
        }
        "contains" => Ok(Value::Bool(items.iter().any(|v| *v == arg(args, 0)))),
        "indexOf" => {
            let needle = arg(args, 0);
            match items.iter().position(|v| *v == needle) {
                Some(i) => Ok(Value::Integer(i as i64)),
                None => Ok(Value::Integer(-1)),
            }
        }
        "map" => {
            let lambda = expect_lambda(args, 0, "map")?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(invoke_lambda(lambda, &[item.clone()], ctx)?);
            }
            Ok(Value::Array(out))
        }
        "filter" | "where" => {
            let lambda = expect_lambda(args, 0, name)?;
            let mut out = Vec::new();
            for item in items {
                if invoke_lambda(lambda, &[item.clone()], ctx)?.is_truthy() {
                    out.push(item.clone());
                }
            }
            Ok(Value::Array(out))
        }
        "reduce" => {
            let lambda = expect_lambda(args, 0, "reduce")?;
            let mut acc = arg(args, 1);
            for item in items {
                acc = invoke_lambda(lambda, &[acc, item.clone()], ctx)?;
            }
            Ok(acc)
        }
        "slice" => {
            let start = as_usize_clamped(&arg(args, 0), items.len());
            let end = match args.get(1) {
                Some(v) => as_usize_clamped(v, items.len()),
                None => items.len(),
            };
            Ok(Value::Array(items[start..end.max(start)].to_vec()))
        }
        "reverse" => {
            let mut out = items.to_vec();
            out.reverse();
            Ok(Value::Array(out))
        }
        "sort" => {
            let mut out = items.to_vec();
            if let Some(Value::Lambda(lambda)) = args.first() {
                let mut err = None;
                out.sort_by(|a, b| {
                    if err.is_some() {
                        return std::cmp::Ordering::Equal;
                    }
                    match invoke_lambda(lambda, &[a.clone(), b.clone()], ctx) {
                        Ok(v) => v
                            .as_f64()
                            .map(|n| n.partial_cmp(&0.0).unwrap_or(std::cmp::Ordering::Equal))
                            .unwrap_or(std::cmp::Ordering::Equal),
                        Err(e) => {
                            err = Some(e);
                            std::cmp::Ordering::Equal
                        }
                    }
                });
                if let Some(e) = err {
                    return Err(e);
                }
            } else {
                out.sort_by(default_order);
            }
            Ok(Value::Array(out))
        }
        "find" => {
            let lambda = expect_lambda(args, 0, "find")?;
            for item in items {
                if invoke_lambda(lambda, &[item.clone()], ctx)?.is_truthy() {
                    return Ok(item.clone());
                }
            }
            Ok(Value::Null)
        }
        "every" => {
            let lambda = expect_lambda(args, 0, "every")?;
            for item in items {
                if !invoke_lambda(lambda, &[item.clone()], ctx)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        "some" | "any" => {
            let lambda = expect_lambda(args, 0, name)?;
            for item in items {
                if invoke_lambda(lambda, &[item.clone()], ctx)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        other => Err(EvalError::unknown_method("Array", other)),
    }
}

fn default_order(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            a.as_f64().unwrap_or(0.0).partial_cmp(&b.as_f64().unwrap_or(0.0)).unwrap_or(std::cmp::Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => std::cmp::Ordering::Equal,
    }
}

// ---- Object methods ------------------------------------------------------

fn object_method(fields: &[(String, Value)], name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "keys" => Ok(Value::Array(fields.iter().map(|(k, _)| Value::String(k.clone())).collect())),
        "values" => Ok(Value::Array(fields.iter().map(|(_, v)| v.clone()).collect())),
        "entries" => Ok(Value::Array(
            fields
                .iter()
                .map(|(k, v)| Value::Array(vec![Value::String(k.clone()), v.clone()]))
                .collect(),
        )),
        "containsKey" => {
            let key = arg(args, 0).to_display_string();
            Ok(Value::Bool(fields.iter().any(|(k, _)| *k == key)))
        }
        "containsValue" => {
            let needle = arg(args, 0);
            Ok(Value::Bool(fields.iter().any(|(_, v)| *v == needle)))
        }
        other => Err(EvalError::unknown_method("Object", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval_method(src: &str) -> Value {
        let ctx = EvaluationContext::new();
        let expr = parse(src).unwrap();
        crate::eval::interpreter::evaluate(&expr, &ctx).unwrap_or_else(|e| panic!("{src:?}: {e}"))
    }

    #[test]
    fn string_methods_basic() {
        assert_eq!(eval_method(r#""Hello".uppercase()"#), Value::String("HELLO".into()));
        assert_eq!(eval_method(r#""  hi  ".trim()"#), Value::String("hi".into()));
        assert_eq!(eval_method(r#""abc".startsWith("a")"#), Value::Bool(true));
    }

    #[test]
    fn array_map_filter_reduce() {
        assert_eq!(
            eval_method("[1,2,3].map(x => x * 2)"),
            Value::Array(vec![Value::Integer(2), Value::Integer(4), Value::Integer(6)])
        );
        assert_eq!(
            eval_method("[1,2,3,4].filter(x => x % 2 == 0)"),
            Value::Array(vec![Value::Integer(2), Value::Integer(4)])
        );
        assert_eq!(eval_method("[1,2,3].reduce((acc, x) => acc + x, 0)"), Value::Integer(6));
    }

    #[test]
    fn array_sort_default_and_with_comparator() {
        assert_eq!(
            eval_method("[3,1,2].sort()"),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
        assert_eq!(
            eval_method("[1,2,3].sort((a, b) => b - a)"),
            Value::Array(vec![Value::Integer(3), Value::Integer(2), Value::Integer(1)])
        );
    }

    #[test]
    fn array_find_every_some() {
        assert_eq!(eval_method("[1,2,3].find(x => x > 1)"), Value::Integer(2));
        assert_eq!(eval_method("[2,4,6].every(x => x % 2 == 0)"), Value::Bool(true));
        assert_eq!(eval_method("[1,3,5].some(x => x % 2 == 0)"), Value::Bool(false));
    }

    #[test]
    fn object_methods_basic() {
        assert_eq!(
            eval_method(r#"{ a: 1, b: 2 }.keys()"#),
            Value::Array(vec![Value::String("a".into()), Value::String("b".into())])
        );
        assert_eq!(eval_method(r#"{ a: 1 }.containsKey("a")"#), Value::Bool(true));
    }
}
