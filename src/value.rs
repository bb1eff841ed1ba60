//! The dynamically-typed runtime value.
//!
//! `Value` is a tagged union with one arm per supported runtime type:
//! `Null`, `Bool`, `Integer`, `Float`, `String`, `Array`, `Object`, `DateTime`,
//! `Lambda`, and `Function` (a reference to a registered built-in). Integer
//! and Float are distinct arms but numerically promote to a common type for
//! arithmetic and comparison — see [`Value::as_f64`] and the binary-operator
//! rules in `eval::interpreter`.

use std::fmt;
use std::rc::Rc;

use chrono::{DateTime as ChronoDateTime, Utc};

use crate::ast::Expr;
use crate::environment::Scope;

/// A closure: parameter names, a body expression, and the lexical scope
/// captured at the point the lambda literal was evaluated. Cloning a
/// `Lambda` is cheap — the body and scope are shared via `Rc`.
#[derive(Debug, Clone)]
pub struct Lambda {
    /// Parameter names, in declaration order.
    pub params: Vec<String>,
    /// The lambda's body expression.
    pub body: Rc<Expr>,
    /// The scope active when the lambda literal was evaluated.
    pub captured: Rc<Scope>,
}

impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && Rc::ptr_eq(&self.body, &other.body)
    }
}

/// The dynamically-typed value every expression evaluates to.
///
/// Not serde-serializable: a `Lambda` captures a live `Rc<Scope>`, which has
/// no meaningful wire representation. Embedders who need to move data across
/// a process boundary serialize `Token`/`Span` (tokenizer output) instead, or
/// round-trip through [`crate::canon::canonicalize`] for the JSON-shaped
/// subset of values.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An IEEE-754 double.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An ordered string-keyed mapping; keys are unique within one object.
    Object(Vec<(String, Value)>),
    /// A wall-clock instant, UTC.
    DateTime(ChronoDateTime<Utc>),
    /// A closure value, capturing its defining scope.
    Lambda(Lambda),
    /// A reference to a named built-in registered in the `FunctionRegistry`.
    Function(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// The type name used by `type()`/`typeof`-style introspection and in
    /// error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::DateTime(_) => "DateTime",
            Value::Lambda(_) => "Lambda",
            Value::Function(_) => "Function",
        }
    }

    /// Truthiness: null/false are falsy, zero numbers are falsy,
    /// empty strings/arrays/objects are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
            Value::DateTime(_) | Value::Lambda(_) | Value::Function(_) => true,
        }
    }

    /// Returns `true` for `Integer` or `Float`.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Numeric promotion to `f64`, for arithmetic between an `Integer` and a
    /// `Float` operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Looks up a field on an `Object` by key, or `None` if this isn't an
    /// object or the key is absent.
    pub fn object_get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Renders a value as a plain (unquoted) display string: used by string
    /// interpolation, `toString`/`format`, and the canonicalizer's fallback
    /// for values with no JSON shape.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::String(s) => s.clone(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_json_like()).collect();
                format!("[{}]", rendered.join(","))
            }
            Value::Object(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("\"{k}\":{}", v.to_json_like()))
                    .collect();
                format!("{{{}}}", rendered.join(","))
            }
            Value::Lambda(_) => "<lambda>".to_string(),
            Value::Function(name) => format!("<function:{name}>"),
        }
    }

    /// Like [`Value::to_display_string`] but quotes strings, for use inside a
    /// containing array/object's display form (not the byte-stable
    /// canonicalizer, which has its own escaping in `canon`).
    fn to_json_like(&self) -> String {
        match self {
            Value::String(s) => format!("\"{s}\""),
            other => other.to_display_string(),
        }
    }
}

/// Formats a float the way numeric literals round-trip: integral floats
/// print without a fractional part (matching the canonicalizer's rule for
/// mathematically-integer floats), everything else uses Rust's
/// shortest-round-trip `Display`.
pub fn format_float(n: f64) -> String {
    if n.is_nan() || n.is_infinite() {
        return "null".to_string();
    }
    if n == n.trunc() && n.abs() < 1e18 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(!Value::Array(vec![]).is_truthy());
        assert!(!Value::Object(vec![]).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
        assert!(Value::String("0".into()).is_truthy());
    }

    #[test]
    fn null_equals_only_null() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::Integer(0));
        assert_ne!(Value::Integer(0), Value::Null);
    }

    #[test]
    fn numeric_equality_promotes() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_eq!(Value::Float(2.0), Value::Integer(2));
    }

    #[test]
    fn object_equality_is_order_independent() {
        let a = Value::Object(vec![
            ("a".into(), Value::Integer(1)),
            ("b".into(), Value::Integer(2)),
        ]);
        let b = Value::Object(vec![
            ("b".into(), Value::Integer(2)),
            ("a".into(), Value::Integer(1)),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn integer_floats_display_without_fraction() {
        assert_eq!(format_float(4.0), "4");
        assert_eq!(format_float(4.5), "4.5");
    }

    #[test]
    fn nan_and_infinity_display_as_null() {
        assert_eq!(format_float(f64::NAN), "null");
        assert_eq!(format_float(f64::INFINITY), "null");
    }
}
