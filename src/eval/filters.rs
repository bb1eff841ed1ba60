//! Pipe filters.
//!
//! `v | f` / `v | f(args...)` looks `f` up in this table first; a name not
//! found here falls back to the `FunctionRegistry` with `v` prepended to
//! `args` (the collision order is method → filter → registry function).
//! Filters are syntactic sugar, not lazy streams — each one is a plain,
//! eager function of `(value, ...args)`.

use crate::environment::EvaluationContext;
use crate::error::EvalError;
use crate::value::Value;

/// Applies filter `name` to `value` with `args`, falling back to the
/// function registry (with `value` prepended) when `name` is not a
/// reserved filter.
pub fn apply_filter(name: &str, value: Value, args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    match name {
        "uppercase" => Ok(Value::String(as_string(&value)?.to_uppercase())),
        "lowercase" => Ok(Value::String(as_string(&value)?.to_lowercase())),
        "trim" => Ok(Value::String(as_string(&value)?.trim().to_string())),
        "default" => {
            if value == Value::Null {
                Ok(args.first().cloned().unwrap_or(Value::Null))
            } else {
                Ok(value)
            }
        }
        "json" => Ok(Value::String(crate::canon::canonicalize(&value))),
        "length" => length_of(&value),
        "first" => first_of(&value),
        "last" => last_of(&value),
        "reverse" => reverse_of(&value),
        "sort" => sort_of(value, args, ctx),
        "unique" => unique_of(&value),
        "join" => {
            let items = as_array(&value)?;
            let sep = args.first().map(|v| v.to_display_string()).unwrap_or_else(|| ",".to_string());
            let rendered: Vec<String> = items.iter().map(|v| v.to_display_string()).collect();
            Ok(Value::String(rendered.join(&sep)))
        }
        "split" => {
            let s = as_string(&value)?;
            let sep = args.first().map(|v| v.to_display_string()).unwrap_or_default();
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect()
            };
            Ok(Value::Array(parts))
        }
        "slice" => slice_of(&value, args),
        "keys" => match &value {
            Value::Object(fields) => Ok(Value::Array(fields.iter().map(|(k, _)| Value::String(k.clone())).collect())),
            other => Err(EvalError::type_error("Object", other.type_name())),
        },
        "values" => match &value {
            Value::Object(fields) => Ok(Value::Array(fields.iter().map(|(_, v)| v.clone()).collect())),
            other => Err(EvalError::type_error("Object", other.type_name())),
        },
        "round" => {
            let n = value.as_f64().ok_or_else(|| EvalError::type_error("Integer or Float", value.type_name()))?;
            let places = args.first().and_then(|v| v.as_f64()).unwrap_or(0.0) as i32;
            let factor = 10f64.powi(places);
            Ok(crate::lexer::narrow_number((n * factor).round() / factor))
        }
        "abs" => {
            let n = value.as_f64().ok_or_else(|| EvalError::type_error("Integer or Float", value.type_name()))?;
            Ok(crate::lexer::narrow_number(n.abs()))
        }
        "format" => {
            let template = as_string(&value)?;
            Ok(Value::String(format_positional(&template, args)))
        }
        _ => {
            let mut registry_args = Vec::with_capacity(args.len() + 1);
            registry_args.push(value);
            registry_args.extend_from_slice(args);
            ctx.registry.call(name, &registry_args, ctx)
        }
    }
}

fn as_string(v: &Value) -> Result<String, EvalError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        other => Err(EvalError::type_error("String", other.type_name())),
    }
}

fn as_array(v: &Value) -> Result<Vec<Value>, EvalError> {
    match v {
        Value::Array(items) => Ok(items.clone()),
        other => Err(EvalError::type_error("Array", other.type_name())),
    }
}

fn length_of(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Array(items) => Ok(Value::Integer(items.len() as i64)),
        Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
        Value::Object(fields) => Ok(Value::Integer(fields.len() as i64)),
        other => Err(EvalError::type_error("Array, String, or Object", other.type_name())),
    }
}

fn first_of(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Array(items) => Ok(items.first().cloned().unwrap_or(Value::Null)),
        Value::String(s) => Ok(Value::String(s.chars().next().map(|c| c.to_string()).unwrap_or_default())),
        other => Err(EvalError::type_error("Array or String", other.type_name())),
    }
}

fn last_of(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Array(items) => Ok(items.last().cloned().unwrap_or(Value::Null)),
        Value::String(s) => Ok(Value::String(s.chars().last().map(|c| c.to_string()).unwrap_or_default())),
        other => Err(EvalError::type_error("Array or String", other.type_name())),
    }
}

fn reverse_of(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Array(items) => {
            let mut out = items.clone();
            out.reverse();
            Ok(Value::Array(out))
        }
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        other => Err(EvalError::type_error("Array or String", other.type_name())),
    }
}

fn sort_of(value: Value, args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let items = as_array(&value)?;
    if let Some(Value::Lambda(lambda)) = args.first() {
        let mut out = items;
        let mut err = None;
        out.sort_by(|a, b| {
            if err.is_some() {
                return std::cmp::Ordering::Equal;
            }
            match crate::eval::interpreter::invoke_lambda(lambda, &[a.clone(), b.clone()], ctx) {
                Ok(v) => v.as_f64().map(|n| n.partial_cmp(&0.0).unwrap_or(std::cmp::Ordering::Equal)).unwrap_or(std::cmp::Ordering::Equal),
                Err(e) => {
                    err = Some(e);
                    std::cmp::Ordering::Equal
                }
            }
        });
        if let Some(e) = err {
            return Err(e);
        }
        Ok(Value::Array(out))
    } else {
        let mut out = items;
        out.sort_by(|a, b| match (a, b) {
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => a
                .as_f64()
                .unwrap_or(0.0)
                .partial_cmp(&b.as_f64().unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => std::cmp::Ordering::Equal,
        });
        Ok(Value::Array(out))
    }
}

fn unique_of(v: &Value) -> Result<Value, EvalError> {
    let items = as_array(v)?;
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|existing| *existing == item) {
            out.push(item);
        }
    }
    Ok(Value::Array(out))
}

fn slice_of(v: &Value, args: &[Value]) -> Result<Value, EvalError> {
    match v {
        Value::Array(items) => {
            let start = clamp_index(args.first(), items.len());
            let end = clamp_index(args.get(1), items.len()).max(start).min(items.len());
            Ok(Value::Array(items[start.min(items.len())..end].to_vec()))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let start = clamp_index(args.first(), chars.len());
            let end = clamp_index(args.get(1), chars.len()).max(start).min(chars.len());
            Ok(Value::String(chars[start.min(chars.len())..end].iter().collect()))
        }
        other => Err(EvalError::type_error("Array or String", other.type_name())),
    }
}

fn clamp_index(v: Option<&Value>, len: usize) -> usize {
    match v.and_then(Value::as_f64) {
        Some(n) if n < 0.0 => 0,
        Some(n) => (n as usize).min(len),
        None => 0,
    }
}

/// `{0}`, `{1}`, ... positional substitution, used by the `format` filter
/// and the `format` registry function.
pub fn format_positional(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(close) = template[i..].find('}') {
                let digits = &template[i + 1..i + close];
                if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    if let Ok(index) = digits.parse::<usize>() {
                        out.push_str(&args.get(index).map(|v| v.to_display_string()).unwrap_or_default());
                        i += close + 1;
                        continue;
                    }
                }
            }
        }
        let ch = template[i..].chars().next().expect("i < bytes.len()");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval_pipe(src: &str) -> Value {
        let ctx = EvaluationContext::new();
        let expr = parse(src).unwrap();
        crate::eval::interpreter::evaluate(&expr, &ctx).unwrap_or_else(|e| panic!("{src:?}: {e}"))
    }

    #[test]
    fn uppercase_and_trim_filters() {
        assert_eq!(eval_pipe(r#""abc" | uppercase"#), Value::String("ABC".into()));
        assert_eq!(eval_pipe(r#""  x  " | trim"#), Value::String("x".into()));
    }

    #[test]
    fn default_filter_only_replaces_null() {
        assert_eq!(eval_pipe("null | default(5)"), Value::Integer(5));
        assert_eq!(eval_pipe("1 | default(5)"), Value::Integer(1));
    }

    #[test]
    fn round_filter_respects_decimal_places() {
        assert_eq!(eval_pipe("3.14159 | round(2)"), Value::Float(3.14));
    }

    #[test]
    fn unique_filter_preserves_first_occurrence_order() {
        assert_eq!(
            eval_pipe("[1,2,1,3,2] | unique"),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
    }

    #[test]
    fn unknown_filter_falls_back_to_registry() {
        assert_eq!(eval_pipe("4 | sqrt"), Value::Float(2.0));
    }

    #[test]
    fn format_positional_substitution() {
        assert_eq!(format_positional("{0} and {1}", &[Value::Integer(1), Value::Integer(2)]), "1 and 2");
    }
}
