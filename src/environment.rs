//! Lexical scopes and the evaluation context.
//!
//! A `Scope` is one frame of the lexical chain; `EvaluationContext` pairs the
//! innermost scope with a shared, read-only `FunctionRegistry`. A new `Scope`
//! is pushed for every lambda invocation; lookup walks from innermost
//! outward and the first definition wins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::EvalError;
use crate::value::Value;

/// One frame of the lexical scope chain.
///
/// Bindings are stored in a `RefCell` because a lambda's captured scope must
/// remain mutable through an `Rc` shared with the scope that defined it (a
/// closure and its defining block share the same frame). `Scope`s form a
/// singly-linked chain via `parent`; nothing ever points back down the
/// chain, so plain `Rc` (no cycles) is sufficient.
#[derive(Debug)]
pub struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// Creates a new root scope with no parent.
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a child scope nested under `parent`.
    pub fn child(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Binds (or rebinds) `name` in this frame only.
    pub fn bind(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up `name`, walking from this frame outward. Returns a clone of
    /// the bound value since `Value` may be shared across scopes.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.borrow().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }
}

/// Signature shared by every built-in function. Receives the active
/// [`EvaluationContext`] (not just the argument list) because a handful of
/// Array built-ins (`map`, `filter`, `reduce`, `find`, `every`, `some`) take
/// a `Lambda` argument and must invoke it, which needs a registry to build
/// the closure's call-time context.
pub type BuiltinFn = fn(&[Value], &EvaluationContext) -> Result<Value, EvalError>;

/// Name → callable mapping for built-in functions. Lookup is pure; the
/// registry is append-only at construction time via [`FunctionRegistryBuilder`]
/// and then shared read-only, so concurrent evaluators may hold the same
/// `Arc<FunctionRegistry>` safely.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, BuiltinFn>,
}

impl FunctionRegistry {
    /// Builds the registry with every standard-library built-in registered.
    pub fn with_defaults() -> Arc<FunctionRegistry> {
        let registry = FunctionRegistryBuilder::new()
            .with_standard_library()
            .build();
        log::debug!(
            "function registry initialised with {} built-ins",
            registry.functions.len()
        );
        Arc::new(registry)
    }

    /// Starts an empty builder for embedders who want a custom or extended
    /// set of built-ins instead of the standard library.
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::new()
    }

    /// Looks up a built-in by exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        self.functions.get(name).copied()
    }

    /// Invokes a built-in by name, or fails with [`EvalError::unknown_function`].
    pub fn call(&self, name: &str, args: &[Value], ctx: &EvaluationContext) -> Result<Value, EvalError> {
        match self.get(name) {
            Some(f) => f(args, ctx),
            None => Err(EvalError::unknown_function(name)),
        }
    }

    /// Whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

/// Construction-time builder for a [`FunctionRegistry`].
#[derive(Debug, Default)]
pub struct FunctionRegistryBuilder {
    functions: HashMap<&'static str, BuiltinFn>,
}

impl FunctionRegistryBuilder {
    /// Starts an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overrides) a single built-in.
    pub fn register(mut self, name: &'static str, f: BuiltinFn) -> Self {
        self.functions.insert(name, f);
        self
    }

    /// Registers every standard-library built-in.
    pub fn with_standard_library(self) -> Self {
        crate::eval::builtins::register_all(self)
    }

    /// Finishes construction.
    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry {
            functions: self.functions,
        }
    }
}

/// The lexically-nested scope chain plus the shared function registry used
/// while evaluating one expression. Created once per top-level evaluation;
/// never shared across threads (a `FunctionRegistry`
/// may be, via `Arc`, but an `EvaluationContext`'s scopes are not `Sync`).
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    /// The innermost active scope.
    pub scope: Rc<Scope>,
    /// The shared, read-only function registry.
    pub registry: Arc<FunctionRegistry>,
}

impl EvaluationContext {
    /// Creates a fresh top-level context with an empty root scope and the
    /// standard-library registry.
    pub fn new() -> Self {
        Self {
            scope: Scope::root(),
            registry: FunctionRegistry::with_defaults(),
        }
    }

    /// Creates a context sharing `registry` but with a fresh root scope
    /// pre-populated with `bindings`.
    pub fn with_registry(registry: Arc<FunctionRegistry>, bindings: Vec<(String, Value)>) -> Self {
        let scope = Scope::root();
        for (name, value) in bindings {
            scope.bind(name, value);
        }
        Self { scope, registry }
    }

    /// Returns a new context one scope deeper, sharing the same registry.
    pub fn child(&self) -> Self {
        Self {
            scope: Scope::child(&self.scope),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Binds `name` in the current (innermost) scope.
    pub fn bind(&self, name: impl Into<String>, value: Value) {
        self.scope.bind(name, value);
    }

    /// Looks up `name`, walking outward from the current scope.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.scope.lookup(name)
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_shadows_parent() {
        let ctx = EvaluationContext::new();
        ctx.bind("x", Value::Integer(1));
        let child = ctx.child();
        child.bind("x", Value::Integer(2));
        assert_eq!(child.lookup("x"), Some(Value::Integer(2)));
        assert_eq!(ctx.lookup("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn lookup_walks_to_parent_when_absent_in_child() {
        let ctx = EvaluationContext::new();
        ctx.bind("y", Value::Integer(7));
        let child = ctx.child();
        assert_eq!(child.lookup("y"), Some(Value::Integer(7)));
    }

    #[test]
    fn lookup_missing_name_is_none() {
        let ctx = EvaluationContext::new();
        assert_eq!(ctx.lookup("nope"), None);
    }

    #[test]
    fn registries_are_shared_across_child_contexts() {
        let ctx = EvaluationContext::new();
        let child = ctx.child();
        assert!(Arc::ptr_eq(&ctx.registry, &child.registry));
    }
}
