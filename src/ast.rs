//! Abstract syntax tree for the expression language.
//!
//! Nodes are immutable once built; the parser is the only producer. Every
//! node that the evaluator can fail on carries a [`Span`] so errors can point
//! back at source text, but `Expr` equality (used only in tests and by the
//! pretty-printer round-trip check) ignores spans — two trees built from
//! differently-formatted but semantically identical source compare equal.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::value::Value;

/// A source location: a half-open byte range plus 1-indexed line/column of
/// its start, carried by tokens and AST nodes for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: usize,
    /// Ending byte offset (exclusive).
    pub end: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Span {
    /// Creates a new span with the given positions.
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Merges two spans, producing one that covers both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            column: if self.start <= other.start {
                self.column
            } else {
                other.column
            },
        }
    }
}

/// Binary arithmetic/comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Short-circuiting logical operators. Kept distinct from
/// [`BinaryOp`] because their evaluation rule (conditional, not eager,
/// evaluation of the right operand) is different in kind, not just value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&` / `and`
    And,
    /// `||` / `or`
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        })
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!` / `not`
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        })
    }
}

/// Whether a member access short-circuits to null on a null receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOp {
    /// `.` — fails on a null receiver the same way any other non-object does.
    Dot,
    /// `?.` — evaluates to null when the receiver is null.
    OptionalDot,
}

impl fmt::Display for MemberOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberOp::Dot => ".",
            MemberOp::OptionalDot => "?.",
        })
    }
}

/// One part of an `Object` literal: either a literal key (identifier or
/// string) or an arbitrary expression whose evaluated result is stringified.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    /// A bare identifier or quoted string used literally as the key.
    Literal(String),
    /// An expression evaluated and stringified to produce the key.
    Computed(Box<Expr>),
}

/// One piece of a string interpolation: literal text, or an embedded
/// expression whose stringified result is spliced in.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationPart {
    /// Literal source text between `${...}` holes.
    Literal(String),
    /// An embedded `${expression}`.
    Expr(Box<Expr>),
}

/// A parsed expression node. Immutable once constructed; `span` locates the
/// node in source for diagnostics and is ignored by `PartialEq`.
#[derive(Debug, Clone)]
pub struct Expr {
    /// The node's shape.
    pub kind: ExprKind,
    /// Where this node's tokens began and ended in the source.
    pub span: Span,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Expr {
    /// Wraps a kind with a span.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The sum type of expression node shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A literal value: number, string, bool, or null.
    Literal(Value),
    /// A bare name, resolved against the lexical scope chain.
    Identifier(String),
    /// A prefix unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// A binary arithmetic/comparison operation.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// A short-circuiting logical operation.
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// A parenthesised sub-expression, kept distinct only so the
    /// pretty-printer can preserve the parentheses on round-trip.
    Grouping(Box<Expr>),
    /// A function call: `callee(args...)`.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// Member access: `object.name` or `object?.name`.
    Member {
        object: Box<Expr>,
        op: MemberOp,
        name: String,
    },
    /// Indexing: `object[index]`.
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `cond ? then : else_`.
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        else_: Box<Expr>,
    },
    /// An array literal.
    Array(Vec<Expr>),
    /// An object literal, entries evaluated in declaration order.
    Object(Vec<(ObjectKey, Expr)>),
    /// A `${...}`-style string interpolation.
    Interpolation(Vec<InterpolationPart>),
    /// `value | filter` or `value | filter(args...)`.
    Pipe {
        value: Box<Expr>,
        filter_name: String,
        filter_args: Vec<Expr>,
    },
    /// A lambda literal: `(params) => body` or `x => body`.
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self)
    }
}

/// Renders an AST back to source-like text, always fully parenthesising
/// binary/logical/conditional nodes. Used by the "parse round-trip" property:
/// `parse(pretty_print(parse(s)))` must reproduce the same tree shape.
fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match &expr.kind {
        ExprKind::Literal(v) => write!(f, "{}", v.to_display_string()),
        ExprKind::Identifier(name) => f.write_str(name),
        ExprKind::Unary { op, operand } => write!(f, "({op}{operand})"),
        ExprKind::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
        ExprKind::Logical { left, op, right } => write!(f, "({left} {op} {right})"),
        ExprKind::Grouping(inner) => write!(f, "({inner})"),
        ExprKind::Call { callee, args } => {
            write!(f, "{callee}(")?;
            write_comma_separated(f, args)?;
            write!(f, ")")
        }
        ExprKind::Member { object, op, name } => write!(f, "{object}{op}{name}"),
        ExprKind::Index { object, index } => write!(f, "{object}[{index}]"),
        ExprKind::Conditional { cond, then, else_ } => {
            write!(f, "({cond} ? {then} : {else_})")
        }
        ExprKind::Array(elements) => {
            write!(f, "[")?;
            write_comma_separated(f, elements)?;
            write!(f, "]")
        }
        ExprKind::Object(entries) => {
            write!(f, "{{")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                match key {
                    ObjectKey::Literal(name) => write!(f, "{name}: {value}")?,
                    ObjectKey::Computed(expr) => write!(f, "[{expr}]: {value}")?,
                }
            }
            write!(f, "}}")
        }
        ExprKind::Interpolation(parts) => {
            write!(f, "\"")?;
            for part in parts {
                match part {
                    InterpolationPart::Literal(text) => f.write_str(text)?,
                    InterpolationPart::Expr(expr) => write!(f, "${{{expr}}}")?,
                }
            }
            write!(f, "\"")
        }
        ExprKind::Pipe {
            value,
            filter_name,
            filter_args,
        } => {
            write!(f, "({value} | {filter_name}")?;
            if !filter_args.is_empty() {
                write!(f, "(")?;
                write_comma_separated(f, filter_args)?;
                write!(f, ")")?;
            }
            write!(f, ")")
        }
        ExprKind::Lambda { params, body } => {
            write!(f, "(")?;
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                f.write_str(p)?;
            }
            write!(f, ") => {body}")
        }
    }
}

fn write_comma_separated(f: &mut fmt::Formatter<'_>, exprs: &[Expr]) -> fmt::Result {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{e}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: Value) -> Expr {
        Expr::new(ExprKind::Literal(v), Span::default())
    }

    #[test]
    fn span_merge_takes_outer_bounds() {
        let a = Span::new(5, 10, 1, 6);
        let b = Span::new(0, 3, 1, 1);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 10);
    }

    #[test]
    fn display_parenthesises_binary() {
        let expr = Expr::new(
            ExprKind::Binary {
                left: Box::new(lit(Value::Integer(1))),
                op: BinaryOp::Add,
                right: Box::new(lit(Value::Integer(2))),
            },
            Span::default(),
        );
        assert_eq!(expr.to_string(), "(1 + 2)");
    }

    #[test]
    fn equality_ignores_span() {
        let a = Expr::new(ExprKind::Identifier("x".into()), Span::new(0, 1, 1, 1));
        let b = Expr::new(ExprKind::Identifier("x".into()), Span::new(9, 10, 2, 2));
        assert_eq!(a, b);
    }
}
