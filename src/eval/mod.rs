//! Evaluation of parsed expressions against an [`crate::environment::EvaluationContext`].
//!
//! [`interpreter::evaluate`] is the single entry point; it dispatches to
//! [`methods`] for receiver-typed method calls, [`filters`] for pipe
//! filters, [`builtins`] for the standard function registry, and
//! [`numeric`] for the `**`/`sqrt`/`log` fallback math.

pub mod builtins;
pub mod filters;
pub mod interpreter;
pub mod methods;
pub mod numeric;

pub use interpreter::{evaluate, evaluate_or_throw};
