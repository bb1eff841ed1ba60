//! # bundle-expr
//!
//! An embeddable expression language: a small, pure, side-effect-free DSL for
//! filtering, transforming, and deriving values over JSON-shaped data, plus a
//! canonical JSON serializer and content-hashing utility for the same
//! JSON-shaped values.
//!
//! ## Quick start
//!
//! ```rust
//! use bundle_expr::evaluate_source;
//!
//! let result = evaluate_source("[1, 2, 3].map(x => x * 2) | sum").unwrap();
//! assert_eq!(result.to_string(), "12");
//! ```
//!
//! ## Pipeline
//!
//! A source string passes through three independent stages:
//!
//! 1. [`lexer`] tokenizes source text into a finite token stream.
//! 2. [`parser`] consumes that stream and produces one [`ast::Expr`] root.
//! 3. [`eval`] walks the AST against an [`environment::EvaluationContext`]
//!    (a lexically nested scope plus a [`environment::FunctionRegistry`]) and
//!    yields a [`value::Value`] or a typed [`error::EvalError`].
//!
//! [`canon`] is independent of the expression pipeline: it consumes any
//! JSON-shaped `Value` and produces a byte-stable encoding and content hash.
//!
//! ## Modules
//!
//! - [`lexer`]: tokenization
//! - [`parser`]: recursive-descent parsing into an [`ast::Expr`]
//! - [`ast`]: the expression AST
//! - [`value`]: the dynamically-typed runtime [`value::Value`]
//! - [`environment`]: lexical scopes, [`environment::EvaluationContext`], and
//!   [`environment::FunctionRegistry`]
//! - [`eval`]: the tree-walking evaluator, method/filter/built-in dispatch
//! - [`canon`]: canonical JSON serialization and content hashing
//! - [`error`]: error types for every pipeline stage

#![doc(html_root_url = "https://docs.rs/bundle-expr/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
pub mod canon;
pub mod environment;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use environment::EvaluationContext;
pub use error::{CoreError, EvalError, LexError, ParseError};
pub use value::Value;

/// Lexes, parses, and evaluates `source` against a fresh top-level context in
/// one call.
///
/// # Example
///
/// ```rust
/// use bundle_expr::evaluate_source;
///
/// assert_eq!(evaluate_source("1 + 2").unwrap().to_string(), "3");
/// ```
pub fn evaluate_source(source: &str) -> Result<Value, CoreError> {
    let expr = parser::parse(source)?;
    let ctx = EvaluationContext::new();
    Ok(eval::evaluate(&expr, &ctx)?)
}

/// Like [`evaluate_source`] but evaluates against a caller-supplied context,
/// so host-bound variables can be in scope.
pub fn evaluate_source_with(source: &str, ctx: &EvaluationContext) -> Result<Value, CoreError> {
    let expr = parser::parse(source)?;
    Ok(eval::evaluate(&expr, ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_source_runs_the_full_pipeline() {
        assert_eq!(evaluate_source("1 + 2 * 3").unwrap(), Value::Integer(7));
    }

    #[test]
    fn evaluate_source_surfaces_parse_errors() {
        assert!(evaluate_source("(").is_err());
    }

    #[test]
    fn evaluate_source_surfaces_eval_errors() {
        assert!(evaluate_source("1 / 0").is_err());
    }

    #[test]
    fn evaluate_source_with_sees_bound_variables() {
        let ctx = EvaluationContext::new();
        ctx.bind("x", Value::Integer(10));
        assert_eq!(evaluate_source_with("x * 2", &ctx).unwrap(), Value::Integer(20));
    }
}
