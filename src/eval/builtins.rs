//! The standard library of registry built-ins.
//!
//! One function per name across the Strings, Math, Arrays, Objects, Types,
//! Dates, and Utility families. A bare-identifier call (`f(x)`) resolves
//! exclusively through this table — see `eval::interpreter::eval_call`.
//! Every function shares the `BuiltinFn` signature and therefore takes an
//! `&EvaluationContext` even though most ignore it; only the Array
//! higher-order functions invoke a `Lambda` argument and need it.

use rand::Rng;

use crate::environment::{EvaluationContext, FunctionRegistryBuilder};
use crate::error::EvalError;
use crate::eval::interpreter::invoke_lambda;
use crate::lexer::narrow_number;
use crate::value::Value;

/// Registers every standard-library built-in onto `builder`.
pub fn register_all(builder: FunctionRegistryBuilder) -> FunctionRegistryBuilder {
    builder
        // Strings
        .register("length", string_length)
        .register("upper", upper)
        .register("lower", lower)
        .register("trim", trim)
        .register("trimStart", trim_start)
        .register("trimEnd", trim_end)
        .register("substring", substring)
        .register("replace", replace)
        .register("replaceAll", replace_all)
        .register("split", split)
        .register("join", join)
        .register("startsWith", starts_with)
        .register("endsWith", ends_with)
        .register("contains", contains)
        .register("indexOf", index_of)
        .register("padStart", pad_start)
        .register("padEnd", pad_end)
        // Math
        .register("abs", abs)
        .register("ceil", ceil)
        .register("floor", floor)
        .register("round", round)
        .register("min", min)
        .register("max", max)
        .register("sum", sum)
        .register("avg", avg)
        .register("pow", pow)
        .register("sqrt", sqrt)
        .register("log", log_fn)
        .register("sin", sin)
        .register("cos", cos)
        .register("tan", tan)
        .register("random", random)
        .register("clamp", clamp)
        // Arrays
        .register("first", first)
        .register("last", last)
        .register("at", at)
        .register("slice", slice)
        .register("reverse", reverse)
        .register("sort", sort)
        .register("unique", unique)
        .register("flatten", flatten)
        .register("map", map_fn)
        .register("filter", filter_fn)
        .register("reduce", reduce_fn)
        .register("find", find_fn)
        .register("findIndex", find_index_fn)
        .register("every", every_fn)
        .register("some", some_fn)
        .register("count", count_fn)
        .register("groupBy", group_by_fn)
        .register("sortBy", sort_by_fn)
        .register("pluck", pluck)
        .register("zip", zip)
        .register("range", range)
        // Objects
        .register("keys", keys)
        .register("values", values)
        .register("entries", entries)
        .register("fromEntries", from_entries)
        .register("merge", merge)
        .register("pick", pick)
        .register("omit", omit)
        .register("get", get)
        .register("has", has)
        // Types
        .register("type", type_of)
        .register("isNull", is_null)
        .register("isNumber", is_number)
        .register("isString", is_string)
        .register("isBool", is_bool)
        .register("isArray", is_array)
        .register("isObject", is_object)
        .register("toNumber", to_number)
        .register("toString", to_string_fn)
        .register("toBool", to_bool)
        .register("toArray", to_array)
        // Dates
        .register("now", now)
        .register("today", today)
        .register("parseDate", parse_date)
        .register("formatDate", format_date)
        .register("addDays", add_days)
        .register("addMonths", add_months)
        .register("addYears", add_years)
        .register("diffDays", diff_days)
        .register("year", year)
        .register("month", month)
        .register("day", day)
        .register("hour", hour)
        .register("minute", minute)
        .register("second", second)
        .register("dayOfWeek", day_of_week)
        // Utility
        .register("coalesce", coalesce)
        .register("default", default_fn)
        .register("if", if_fn)
        .register("switch", switch_fn)
        .register("format", format_fn)
        .register("json", json_fn)
        .register("parseJson", parse_json_fn)
}

fn arity(expected: usize, args: &[Value]) -> Result<(), EvalError> {
    if args.len() != expected {
        Err(EvalError::arity_mismatch(expected, args.len()))
    } else {
        Ok(())
    }
}

fn number(v: &Value) -> Result<f64, EvalError> {
    v.as_f64().ok_or_else(|| EvalError::type_error("Integer or Float", v.type_name()))
}

fn string(v: &Value) -> Result<&str, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_error("String", other.type_name())),
    }
}

fn array(v: &Value) -> Result<&[Value], EvalError> {
    match v {
        Value::Array(items) => Ok(items),
        other => Err(EvalError::type_error("Array", other.type_name())),
    }
}

fn object(v: &Value) -> Result<&[(String, Value)], EvalError> {
    match v {
        Value::Object(fields) => Ok(fields),
        other => Err(EvalError::type_error("Object", other.type_name())),
    }
}

fn lambda(v: &Value) -> Result<&crate::value::Lambda, EvalError> {
    match v {
        Value::Lambda(l) => Ok(l),
        other => Err(EvalError::type_error("Lambda", other.type_name())),
    }
}

// ---- Strings --------------------------------------------------------------

/// length(value) - Character count of a string, element count of an array,
/// or field count of an object.
fn string_length(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    match &args[0] {
        Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
        Value::Array(items) => Ok(Value::Integer(items.len() as i64)),
        Value::Object(fields) => Ok(Value::Integer(fields.len() as i64)),
        other => Err(EvalError::type_error("String, Array, or Object", other.type_name())),
    }
}

/// upper(s) - Uppercases a string.
fn upper(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(string(&args[0])?.to_uppercase()))
}

/// lower(s) - Lowercases a string.
fn lower(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(string(&args[0])?.to_lowercase()))
}

/// trim(s) - Strips leading and trailing whitespace.
fn trim(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(string(&args[0])?.trim().to_string()))
}

/// trimStart(s) - Strips leading whitespace only.
fn trim_start(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(string(&args[0])?.trim_start().to_string()))
}

/// trimEnd(s) - Strips trailing whitespace only.
fn trim_end(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(string(&args[0])?.trim_end().to_string()))
}

/// substring(s, start, end?) - Character-indexed substring, clamped to bounds.
fn substring(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(EvalError::arity_mismatch(2, args.len()));
    }
    let chars: Vec<char> = string(&args[0])?.chars().collect();
    let start = clamp_usize(number(&args[1])?, chars.len());
    let end = match args.get(2) {
        Some(v) => clamp_usize(number(v)?, chars.len()),
        None => chars.len(),
    };
    let end = end.max(start);
    Ok(Value::String(chars[start..end].iter().collect()))
}

/// replace(s, from, to) - Replaces the first occurrence of `from` with `to`.
fn replace(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(3, args)?;
    let s = string(&args[0])?;
    let from = string(&args[1])?;
    let to = string(&args[2])?;
    Ok(Value::String(s.replacen(from, to, 1)))
}

/// replaceAll(s, from, to) - Replaces every occurrence of `from` with `to`.
fn replace_all(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(3, args)?;
    let s = string(&args[0])?;
    let from = string(&args[1])?;
    let to = string(&args[2])?;
    Ok(Value::String(s.replace(from, to)))
}

/// split(s, sep) - Splits a string on `sep`; an empty separator splits into
/// individual characters.
fn split(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let s = string(&args[0])?;
    let sep = string(&args[1])?;
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(sep).map(|p| Value::String(p.to_string())).collect()
    };
    Ok(Value::Array(parts))
}

/// join(array, sep) - Joins an array's elements' display forms with `sep`.
fn join(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let sep = string(&args[1])?;
    let rendered: Vec<String> = items.iter().map(|v| v.to_display_string()).collect();
    Ok(Value::String(rendered.join(sep)))
}

/// startsWith(s, prefix) - True if `s` begins with `prefix`.
fn starts_with(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    Ok(Value::Bool(string(&args[0])?.starts_with(string(&args[1])?)))
}

/// endsWith(s, suffix) - True if `s` ends with `suffix`.
fn ends_with(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    Ok(Value::Bool(string(&args[0])?.ends_with(string(&args[1])?)))
}

/// contains(haystack, needle) - Substring test for strings, membership test
/// for arrays.
fn contains(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    match &args[0] {
        Value::String(s) => Ok(Value::Bool(s.contains(string(&args[1])?))),
        Value::Array(items) => Ok(Value::Bool(items.iter().any(|v| *v == args[1]))),
        other => Err(EvalError::type_error("String or Array", other.type_name())),
    }
}

/// indexOf(haystack, needle) - First character index of `needle` in a string,
/// or first position of a value in an array; `-1` if absent.
fn index_of(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    match &args[0] {
        Value::String(s) => {
            let needle = string(&args[1])?;
            match s.find(needle) {
                Some(byte_pos) => Ok(Value::Integer(s[..byte_pos].chars().count() as i64)),
                None => Ok(Value::Integer(-1)),
            }
        }
        Value::Array(items) => match items.iter().position(|v| *v == args[1]) {
            Some(i) => Ok(Value::Integer(i as i64)),
            None => Ok(Value::Integer(-1)),
        },
        other => Err(EvalError::type_error("String or Array", other.type_name())),
    }
}

/// padStart(s, width, pad?) - Left-pads `s` to `width` characters, default
/// pad character is a space.
fn pad_start(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(EvalError::arity_mismatch(2, args.len()));
    }
    let s = string(&args[0])?;
    let width = number(&args[1])? as usize;
    let pad = match args.get(2) {
        Some(v) => string(v)?.chars().next().unwrap_or(' '),
        None => ' ',
    };
    let len = s.chars().count();
    if len >= width {
        return Ok(Value::String(s.to_string()));
    }
    let padding: String = std::iter::repeat(pad).take(width - len).collect();
    Ok(Value::String(format!("{padding}{s}")))
}

/// padEnd(s, width, pad?) - Right-pads `s` to `width` characters, default pad
/// character is a space.
fn pad_end(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(EvalError::arity_mismatch(2, args.len()));
    }
    let s = string(&args[0])?;
    let width = number(&args[1])? as usize;
    let pad = match args.get(2) {
        Some(v) => string(v)?.chars().next().unwrap_or(' '),
        None => ' ',
    };
    let len = s.chars().count();
    if len >= width {
        return Ok(Value::String(s.to_string()));
    }
    let padding: String = std::iter::repeat(pad).take(width - len).collect();
    Ok(Value::String(format!("{s}{padding}")))
}

fn clamp_usize(n: f64, len: usize) -> usize {
    if n < 0.0 {
        0
    } else {
        (n as usize).min(len)
    }
}

// ---- Math -------------------------------------------------------------

/// abs(n) - Absolute value.
fn abs(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(narrow_number(number(&args[0])?.abs()))
}

/// ceil(n) - Rounds up to the nearest integer.
fn ceil(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(number(&args[0])?.ceil() as i64))
}

/// floor(n) - Rounds down to the nearest integer.
fn floor(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(number(&args[0])?.floor() as i64))
}

/// round(n, places?) - Rounds to `places` decimal places (default 0).
fn round(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.is_empty() || args.len() > 2 {
        return Err(EvalError::arity_mismatch(1, args.len()));
    }
    let n = number(&args[0])?;
    let places = match args.get(1) {
        Some(v) => number(v)? as i32,
        None => 0,
    };
    let factor = 10f64.powi(places);
    Ok(narrow_number((n * factor).round() / factor))
}

/// min(...values) - The smallest of one or more numbers, or of a single
/// array argument's elements.
fn min(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let numbers = numeric_varargs(args)?;
    if numbers.is_empty() {
        return Err(EvalError::new("min requires at least one value"));
    }
    let m = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
    Ok(narrow_number(m))
}

/// max(...values) - The largest of one or more numbers, or of a single array
/// argument's elements.
fn max(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let numbers = numeric_varargs(args)?;
    if numbers.is_empty() {
        return Err(EvalError::new("max requires at least one value"));
    }
    let m = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Ok(narrow_number(m))
}

/// sum(array) - Sum of an array of numbers.
fn sum(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let items = array(&args[0])?;
    let mut total = 0.0;
    for item in items {
        total += number(item)?;
    }
    Ok(narrow_number(total))
}

/// avg(array) - Arithmetic mean of an array of numbers.
fn avg(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let items = array(&args[0])?;
    if items.is_empty() {
        return Err(EvalError::new("avg of an empty array"));
    }
    let mut total = 0.0;
    for item in items {
        total += number(item)?;
    }
    Ok(narrow_number(total / items.len() as f64))
}

/// pow(base, exponent) - Raises `base` to `exponent`.
fn pow(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    Ok(narrow_number(number(&args[0])?.powf(number(&args[1])?)))
}

/// sqrt(n) - Square root.
fn sqrt(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(narrow_number(number(&args[0])?.sqrt()))
}

/// log(n, base?) - Logarithm, natural by default.
fn log_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.is_empty() || args.len() > 2 {
        return Err(EvalError::arity_mismatch(1, args.len()));
    }
    let n = number(&args[0])?;
    let result = match args.get(1) {
        Some(base) => n.log(number(base)?),
        None => n.ln(),
    };
    Ok(narrow_number(result))
}

/// sin(radians) - Sine.
fn sin(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(narrow_number(number(&args[0])?.sin()))
}

/// cos(radians) - Cosine.
fn cos(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(narrow_number(number(&args[0])?.cos()))
}

/// tan(radians) - Tangent.
fn tan(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(narrow_number(number(&args[0])?.tan()))
}

/// random() - A uniformly distributed Float in `[0, 1)`.
fn random(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(0, args)?;
    Ok(Value::Float(rand::thread_rng().gen_range(0.0..1.0)))
}

/// clamp(n, min, max) - Restricts `n` to the closed range `[min, max]`.
fn clamp(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(3, args)?;
    let n = number(&args[0])?;
    let lo = number(&args[1])?;
    let hi = number(&args[2])?;
    Ok(narrow_number(n.max(lo).min(hi)))
}

fn numeric_varargs(args: &[Value]) -> Result<Vec<f64>, EvalError> {
    if args.len() == 1 {
        if let Value::Array(items) = &args[0] {
            return items.iter().map(number).collect();
        }
    }
    args.iter().map(number).collect()
}

// ---- Arrays -------------------------------------------------------------

/// first(array) - The first element, or Null if empty.
fn first(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(array(&args[0])?.first().cloned().unwrap_or(Value::Null))
}

/// last(array) - The last element, or Null if empty.
fn last(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(array(&args[0])?.last().cloned().unwrap_or(Value::Null))
}

/// at(array, index) - The element at `index`, or Null if out of range.
/// Negative indices count from the end.
fn at(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let i = number(&args[1])? as i64;
    let resolved = if i < 0 { items.len() as i64 + i } else { i };
    if resolved < 0 || resolved as usize >= items.len() {
        Ok(Value::Null)
    } else {
        Ok(items[resolved as usize].clone())
    }
}

/// slice(array, start, end?) - A sub-array, clamped to bounds.
fn slice(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(EvalError::arity_mismatch(2, args.len()));
    }
    let items = array(&args[0])?;
    let start = clamp_usize(number(&args[1])?, items.len());
    let end = match args.get(2) {
        Some(v) => clamp_usize(number(v)?, items.len()),
        None => items.len(),
    };
    Ok(Value::Array(items[start..end.max(start)].to_vec()))
}

/// reverse(array) - A new array with elements in reverse order.
fn reverse(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let mut out = array(&args[0])?.to_vec();
    out.reverse();
    Ok(Value::Array(out))
}

/// sort(array) - Ascending sort by natural ordering (numbers, then strings).
fn sort(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let mut out = array(&args[0])?.to_vec();
    out.sort_by(natural_order);
    Ok(Value::Array(out))
}

fn natural_order(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            a.as_f64().unwrap_or(0.0).partial_cmp(&b.as_f64().unwrap_or(0.0)).unwrap_or(std::cmp::Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => std::cmp::Ordering::Equal,
    }
}

/// unique(array) - Removes duplicates, keeping first-occurrence order.
fn unique(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let items = array(&args[0])?;
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|existing| existing == item) {
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

/// flatten(array) - Flattens one level of nested arrays.
fn flatten(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let items = array(&args[0])?;
    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Array(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::Array(out))
}

/// map(array, fn) - Applies `fn` to each element, collecting the results.
fn map_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(invoke_lambda(f, &[item.clone()], ctx)?);
    }
    Ok(Value::Array(out))
}

/// filter(array, fn) - Keeps elements for which `fn` returns a truthy value.
fn filter_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    let mut out = Vec::new();
    for item in items {
        if invoke_lambda(f, &[item.clone()], ctx)?.is_truthy() {
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

/// reduce(array, fn, initial) - Folds `array` left to right through `fn(acc, item)`.
fn reduce_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(3, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    let mut acc = args[2].clone();
    for item in items {
        acc = invoke_lambda(f, &[acc, item.clone()], ctx)?;
    }
    Ok(acc)
}

/// find(array, fn) - The first element for which `fn` is truthy, or Null.
fn find_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    for item in items {
        if invoke_lambda(f, &[item.clone()], ctx)?.is_truthy() {
            return Ok(item.clone());
        }
    }
    Ok(Value::Null)
}

/// findIndex(array, fn) - The index of the first element for which `fn` is
/// truthy, or `-1`.
fn find_index_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    for (i, item) in items.iter().enumerate() {
        if invoke_lambda(f, &[item.clone()], ctx)?.is_truthy() {
            return Ok(Value::Integer(i as i64));
        }
    }
    Ok(Value::Integer(-1))
}

/// every(array, fn) - True if `fn` is truthy for every element.
fn every_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    for item in items {
        if !invoke_lambda(f, &[item.clone()], ctx)?.is_truthy() {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

/// some(array, fn) - True if `fn` is truthy for at least one element.
fn some_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    for item in items {
        if invoke_lambda(f, &[item.clone()], ctx)?.is_truthy() {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

/// count(array, fn) - The number of elements for which `fn` is truthy.
fn count_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    let mut n = 0i64;
    for item in items {
        if invoke_lambda(f, &[item.clone()], ctx)?.is_truthy() {
            n += 1;
        }
    }
    Ok(Value::Integer(n))
}

/// groupBy(array, fn) - Partitions `array` into an object keyed by the
/// stringified result of `fn` applied to each element.
fn group_by_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    for item in items {
        let key = invoke_lambda(f, &[item.clone()], ctx)?.to_display_string();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.push(item.clone()),
            None => groups.push((key, vec![item.clone()])),
        }
    }
    Ok(Value::Object(groups.into_iter().map(|(k, v)| (k, Value::Array(v))).collect()))
}

/// sortBy(array, fn) - Ascending sort by the natural ordering of `fn`'s result.
fn sort_by_fn(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let f = lambda(&args[1])?;
    let mut keyed: Vec<(Value, Value)> = Vec::with_capacity(items.len());
    for item in items {
        keyed.push((invoke_lambda(f, &[item.clone()], ctx)?, item.clone()));
    }
    keyed.sort_by(|a, b| natural_order(&a.0, &b.0));
    Ok(Value::Array(keyed.into_iter().map(|(_, v)| v).collect()))
}

/// pluck(array, key) - Maps an array of objects to the value at `key` in each.
fn pluck(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let items = array(&args[0])?;
    let key = string(&args[1])?;
    let out = items.iter().map(|item| item.object_get(key).cloned().unwrap_or(Value::Null)).collect();
    Ok(Value::Array(out))
}

/// zip(a, b) - Pairs elements of `a` and `b` positionally, truncating to the
/// shorter array.
fn zip(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let a = array(&args[0])?;
    let b = array(&args[1])?;
    let out = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| Value::Array(vec![x.clone(), y.clone()]))
        .collect();
    Ok(Value::Array(out))
}

/// range(start, end) - An array of integers from `start` (inclusive) to
/// `end` (exclusive).
fn range(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let start = number(&args[0])? as i64;
    let end = number(&args[1])? as i64;
    Ok(Value::Array((start..end).map(Value::Integer).collect()))
}

// ---- Objects --------------------------------------------------------------

/// keys(object) - The object's field names, in insertion order.
fn keys(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Array(object(&args[0])?.iter().map(|(k, _)| Value::String(k.clone())).collect()))
}

/// values(object) - The object's field values, in insertion order.
fn values(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Array(object(&args[0])?.iter().map(|(_, v)| v.clone()).collect()))
}

/// entries(object) - An array of `[key, value]` pairs.
fn entries(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Array(
        object(&args[0])?
            .iter()
            .map(|(k, v)| Value::Array(vec![Value::String(k.clone()), v.clone()]))
            .collect(),
    ))
}

/// fromEntries(array) - Builds an object from an array of `[key, value]` pairs.
fn from_entries(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let items = array(&args[0])?;
    let mut fields = Vec::with_capacity(items.len());
    for item in items {
        let pair = array(item)?;
        if pair.len() != 2 {
            return Err(EvalError::new("fromEntries expects [key, value] pairs"));
        }
        fields.push((string(&pair[0])?.to_string(), pair[1].clone()));
    }
    Ok(Value::Object(fields))
}

/// merge(a, b) - Combines two objects; `b`'s fields win on key collision.
fn merge(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let a = object(&args[0])?;
    let b = object(&args[1])?;
    let mut out: Vec<(String, Value)> = a.to_vec();
    for (k, v) in b {
        match out.iter_mut().find(|(existing, _)| existing == k) {
            Some((_, slot)) => *slot = v.clone(),
            None => out.push((k.clone(), v.clone())),
        }
    }
    Ok(Value::Object(out))
}

/// pick(object, keys) - A new object containing only the named fields.
fn pick(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let fields = object(&args[0])?;
    let wanted = array(&args[1])?;
    let mut out = Vec::new();
    for key in wanted {
        let key = string(key)?;
        if let Some((k, v)) = fields.iter().find(|(k, _)| k == key) {
            out.push((k.clone(), v.clone()));
        }
    }
    Ok(Value::Object(out))
}

/// omit(object, keys) - A new object excluding the named fields.
fn omit(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let fields = object(&args[0])?;
    let excluded = array(&args[1])?;
    let mut excluded_names = Vec::with_capacity(excluded.len());
    for key in excluded {
        excluded_names.push(string(key)?.to_string());
    }
    let out = fields.iter().filter(|(k, _)| !excluded_names.contains(k)).cloned().collect();
    Ok(Value::Object(out))
}

/// get(object, path, default?) - Dotted-path lookup (`"a.b.c"`), returning
/// `default` (or Null) if any segment is absent.
fn get(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(EvalError::arity_mismatch(2, args.len()));
    }
    let path = string(&args[1])?;
    let mut current = args[0].clone();
    for segment in path.split('.') {
        match current.object_get(segment) {
            Some(next) => current = next.clone(),
            None => return Ok(args.get(2).cloned().unwrap_or(Value::Null)),
        }
    }
    Ok(current)
}

/// has(object, key) - True if `key` is a field of `object`.
fn has(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let fields = object(&args[0])?;
    let key = string(&args[1])?;
    Ok(Value::Bool(fields.iter().any(|(k, _)| k == key)))
}

// ---- Types ------------------------------------------------------------

/// type(value) - The runtime type name of `value`.
fn type_of(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(args[0].type_name().to_string()))
}

/// isNull(value) - True if `value` is Null.
fn is_null(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Bool(matches!(args[0], Value::Null)))
}

/// isNumber(value) - True if `value` is an Integer or Float.
fn is_number(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Bool(args[0].is_number()))
}

/// isString(value) - True if `value` is a String.
fn is_string(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Bool(matches!(args[0], Value::String(_))))
}

/// isBool(value) - True if `value` is a Bool.
fn is_bool(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Bool(matches!(args[0], Value::Bool(_))))
}

/// isArray(value) - True if `value` is an Array.
fn is_array(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Bool(matches!(args[0], Value::Array(_))))
}

/// isObject(value) - True if `value` is an Object.
fn is_object(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Bool(matches!(args[0], Value::Object(_))))
}

/// toNumber(value) - Parses a String to a number, passes numbers through, or
/// maps Bool to 0/1.
fn to_number(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    match &args[0] {
        Value::Integer(_) | Value::Float(_) => Ok(args[0].clone()),
        Value::Bool(b) => Ok(Value::Integer(if *b { 1 } else { 0 })),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(narrow_number)
            .map_err(|_| EvalError::new(format!("cannot convert '{s}' to a number"))),
        other => Err(EvalError::type_error("Integer, Float, Bool, or String", other.type_name())),
    }
}

/// toString(value) - Renders `value` the way string interpolation would.
fn to_string_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(args[0].to_display_string()))
}

/// toBool(value) - `value`'s truthiness as a Bool.
fn to_bool(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Bool(args[0].is_truthy()))
}

/// toArray(value) - Passes an Array through, wraps anything else in a
/// one-element Array; Null becomes an empty Array.
fn to_array(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    match &args[0] {
        Value::Array(items) => Ok(Value::Array(items.clone())),
        Value::Null => Ok(Value::Array(vec![])),
        other => Ok(Value::Array(vec![other.clone()])),
    }
}

// ---- Dates ------------------------------------------------------------

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};

fn as_datetime(v: &Value) -> Result<chrono::DateTime<Utc>, EvalError> {
    match v {
        Value::DateTime(dt) => Ok(*dt),
        other => Err(EvalError::type_error("DateTime", other.type_name())),
    }
}

/// now() - The current instant, UTC.
fn now(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(0, args)?;
    Ok(Value::DateTime(Utc::now()))
}

/// today() - The current date at midnight UTC.
fn today(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(0, args)?;
    let now = Utc::now();
    Ok(Value::DateTime(
        Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0).single().unwrap_or(now),
    ))
}

/// parseDate(s) - Parses an RFC 3339 / ISO 8601 string into a DateTime.
fn parse_date(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    let s = string(&args[0])?;
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
        .map_err(|_| EvalError::new(format!("cannot parse '{s}' as a date")))
}

/// formatDate(date, pattern) - Renders `date` with `strftime`-compatible
/// tokens (`yyyy`, `MM`, `dd`, `HH`, `mm`, `ss` are translated to `%Y %m %d
/// %H %M %S`).
fn format_date(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let dt = as_datetime(&args[0])?;
    let pattern = string(&args[1])?;
    let strftime_pattern = pattern
        .replace("yyyy", "%Y")
        .replace("MM", "%m")
        .replace("dd", "%d")
        .replace("HH", "%H")
        .replace("mm", "%M")
        .replace("ss", "%S");
    Ok(Value::String(dt.format(&strftime_pattern).to_string()))
}

/// addDays(date, n) - `date` shifted by `n` days.
fn add_days(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let dt = as_datetime(&args[0])?;
    let n = number(&args[1])? as i64;
    Ok(Value::DateTime(dt + Duration::days(n)))
}

/// addMonths(date, n) - `date` shifted by `n` calendar months, clamping the
/// day of month if the target month is shorter.
fn add_months(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let dt = as_datetime(&args[0])?;
    let n = number(&args[1])? as i32;
    let total_months = dt.year() * 12 + dt.month() as i32 - 1 + n;
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;
    let day = dt.day().min(days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| EvalError::new("invalid resulting date"))?;
    let naive = date.and_hms_opt(dt.hour(), dt.minute(), dt.second()).unwrap();
    Ok(Value::DateTime(Utc.from_utc_datetime(&naive)))
}

/// addYears(date, n) - `date` shifted by `n` years.
fn add_years(args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let n = number(&args[1])? as i32;
    add_months(&[args[0].clone(), Value::Integer((n * 12) as i64)], ctx)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { NaiveDate::from_ymd_opt(year + 1, 1, 1) } else { NaiveDate::from_ymd_opt(year, month + 1, 1) };
    next_month
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// diffDays(a, b) - The number of whole days between `a` and `b` (`a - b`).
fn diff_days(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    let a = as_datetime(&args[0])?;
    let b = as_datetime(&args[1])?;
    Ok(Value::Integer((a - b).num_days()))
}

/// year(date) - The calendar year.
fn year(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(as_datetime(&args[0])?.year() as i64))
}

/// month(date) - The calendar month, `1..=12`.
fn month(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(as_datetime(&args[0])?.month() as i64))
}

/// day(date) - The day of month, `1..=31`.
fn day(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(as_datetime(&args[0])?.day() as i64))
}

/// hour(date) - The hour of day, `0..=23`.
fn hour(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(as_datetime(&args[0])?.hour() as i64))
}

/// minute(date) - The minute of the hour, `0..=59`.
fn minute(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(as_datetime(&args[0])?.minute() as i64))
}

/// second(date) - The second of the minute, `0..=59`.
fn second(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(as_datetime(&args[0])?.second() as i64))
}

/// dayOfWeek(date) - ISO weekday number, `1` (Monday) through `7` (Sunday).
fn day_of_week(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::Integer(as_datetime(&args[0])?.weekday().number_from_monday() as i64))
}

// ---- Utility ------------------------------------------------------------

/// coalesce(...values) - The first non-Null argument, or Null if all are.
fn coalesce(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    Ok(args.iter().find(|v| !matches!(v, Value::Null)).cloned().unwrap_or(Value::Null))
}

/// default(value, fallback) - `fallback` if `value` is Null, else `value`.
fn default_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(2, args)?;
    if matches!(args[0], Value::Null) {
        Ok(args[1].clone())
    } else {
        Ok(args[0].clone())
    }
}

/// if(condition, then, else) - Strict (non-short-circuiting) conditional;
/// prefer the `?:` operator when short-circuiting matters.
fn if_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(3, args)?;
    if args[0].is_truthy() {
        Ok(args[1].clone())
    } else {
        Ok(args[2].clone())
    }
}

/// switch(value, match1, result1, ..., default?) - Returns the result paired
/// with the first `match` equal to `value`, or `default` (or Null) if none
/// match.
fn switch_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_mismatch(1, args.len()));
    }
    let value = &args[0];
    let rest = &args[1..];
    let pair_count = rest.len() / 2;
    for i in 0..pair_count {
        if rest[i * 2] == *value {
            return Ok(rest[i * 2 + 1].clone());
        }
    }
    if rest.len() % 2 == 1 {
        Ok(rest[rest.len() - 1].clone())
    } else {
        Ok(Value::Null)
    }
}

/// format(template, ...args) - `{0}`, `{1}`, ... positional substitution.
fn format_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_mismatch(1, args.len()));
    }
    let template = string(&args[0])?;
    Ok(Value::String(crate::eval::filters::format_positional(template, &args[1..])))
}

/// json(value) - Canonical JSON encoding of `value`.
fn json_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    Ok(Value::String(crate::canon::canonicalize(&args[0])))
}

/// parseJson(s) - Parses a JSON document into a Value.
fn parse_json_fn(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, EvalError> {
    arity(1, args)?;
    crate::canon::parse_json(string(&args[0])?).map_err(EvalError::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval(src: &str) -> Value {
        let ctx = EvaluationContext::new();
        let expr = parse(src).unwrap();
        crate::eval::interpreter::evaluate(&expr, &ctx).unwrap_or_else(|e| panic!("{src:?}: {e}"))
    }

    #[test]
    fn string_family() {
        assert_eq!(eval(r#"upper("hi")"#), Value::String("HI".into()));
        assert_eq!(eval(r#"padStart("7", 3, "0")"#), Value::String("007".into()));
        assert_eq!(eval(r#"replaceAll("a-a", "a", "b")"#), Value::String("b-b".into()));
    }

    #[test]
    fn math_family() {
        assert_eq!(eval("pow(2, 10)"), Value::Float(1024.0));
        assert_eq!(eval("clamp(15, 0, 10)"), Value::Integer(10));
        assert_eq!(eval("sum([1,2,3])"), Value::Integer(6));
        assert_eq!(eval("avg([2,4])"), Value::Float(3.0));
    }

    #[test]
    fn random_is_within_unit_interval() {
        let ctx = EvaluationContext::new();
        for _ in 0..20 {
            let v = random(&[], &ctx).unwrap();
            let n = v.as_f64().unwrap();
            assert!((0.0..1.0).contains(&n));
        }
    }

    #[test]
    fn array_higher_order_family() {
        assert_eq!(eval("range(0, 3)"), Value::Array(vec![Value::Integer(0), Value::Integer(1), Value::Integer(2)]));
        assert_eq!(eval("map([1,2,3], x => x + 1)"), Value::Array(vec![Value::Integer(2), Value::Integer(3), Value::Integer(4)]));
        assert_eq!(eval("sortBy([3,1,2], x => x)"), Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]));
        assert_eq!(
            eval("groupBy([1,2,3,4], x => x % 2)"),
            Value::Object(vec![
                ("1".into(), Value::Array(vec![Value::Integer(1), Value::Integer(3)])),
                ("0".into(), Value::Array(vec![Value::Integer(2), Value::Integer(4)])),
            ])
        );
    }

    #[test]
    fn object_family() {
        assert_eq!(eval(r#"get({ a: { b: 1 } }, "a.b")"#), Value::Integer(1));
        assert_eq!(eval(r#"get({ a: 1 }, "x.y", 42)"#), Value::Integer(42));
        assert_eq!(eval(r#"merge({ a: 1 }, { a: 2, b: 3 })"#), Value::Object(vec![("a".into(), Value::Integer(2)), ("b".into(), Value::Integer(3))]));
    }

    #[test]
    fn type_family() {
        assert_eq!(eval("type(1)"), Value::String("Integer".into()));
        assert_eq!(eval(r#"toNumber("3.5")"#), Value::Float(3.5));
        assert_eq!(eval("toBool(0)"), Value::Bool(false));
    }

    #[test]
    fn utility_family() {
        assert_eq!(eval("coalesce(null, null, 3)"), Value::Integer(3));
        assert_eq!(eval(r#"switch(2, 1, "one", 2, "two", "other")"#), Value::String("two".into()));
        assert_eq!(eval(r#"switch(9, 1, "one", "fallback")"#), Value::String("fallback".into()));
        assert_eq!(eval(r#"format("{0} of {1}", 1, 2)"#), Value::String("1 of 2".into()));
    }

    #[test]
    fn date_family_round_trips_through_format() {
        assert_eq!(eval(r#"year(parseDate("2024-03-15T00:00:00Z"))"#), Value::Integer(2024));
        assert_eq!(eval(r#"dayOfWeek(parseDate("2024-03-15T00:00:00Z"))"#), Value::Integer(5));
        assert_eq!(
            eval(r#"formatDate(parseDate("2024-03-15T10:30:00Z"), "yyyy-MM-dd")"#),
            Value::String("2024-03-15".into())
        );
    }
}
