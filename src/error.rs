//! Error types for the lex/parse/eval pipeline.
//!
//! Each stage has exactly one error type. All three carry enough context to
//! reproduce the textual forms fixed by the external interface: lex and parse
//! errors carry a source location, eval errors carry a message only (the
//! evaluator has no notion of "current token").

use std::fmt;

use crate::ast::Span;

/// Failure raised while tokenizing source text.
///
/// Renders as `"LexerException at <line>:<col>: <msg>"`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LexError {
    /// An unrecognised character was encountered.
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Where it occurred.
        span: Span,
    },
    /// A string literal was not closed before end-of-input or a newline.
    UnterminatedString {
        /// Where the string started.
        span: Span,
    },
    /// A numeric literal was malformed (e.g. a trailing exponent sign with no digits).
    InvalidNumber {
        /// The text that failed to parse.
        lexeme: String,
        /// Where it occurred.
        span: Span,
    },
}

impl LexError {
    /// The span at which this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        match self {
            LexError::UnexpectedChar { ch, .. } => write!(
                f,
                "LexerException at {}:{}: unexpected character '{}'",
                span.line, span.column, ch
            ),
            LexError::UnterminatedString { .. } => write!(
                f,
                "LexerException at {}:{}: unterminated string literal",
                span.line, span.column
            ),
            LexError::InvalidNumber { lexeme, .. } => write!(
                f,
                "LexerException at {}:{}: invalid number literal '{}'",
                span.line, span.column, lexeme
            ),
        }
    }
}

impl std::error::Error for LexError {}

/// Failure raised while parsing a token stream into an AST.
///
/// Renders as `"ParserException at <line>:<col>: <msg>"`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// A token appeared where it could not be handled.
    UnexpectedToken {
        /// The lexeme of the offending token.
        found: String,
        /// What was expected instead, if known.
        expected: Option<String>,
        /// Where it occurred.
        span: Span,
    },
    /// End-of-input was reached while more tokens were required.
    UnexpectedEof {
        /// What was expected instead, if known.
        expected: Option<String>,
        /// Where input ran out.
        span: Span,
    },
    /// Tokens remained after the root expression was parsed.
    TrailingInput {
        /// The lexeme of the first unconsumed token.
        found: String,
        /// Where it occurred.
        span: Span,
    },
    /// An empty grouping, e.g. `()` not followed by `=>`.
    EmptyGrouping {
        /// Where it occurred.
        span: Span,
    },
}

impl ParseError {
    /// The span at which this error occurred.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::TrailingInput { span, .. }
            | ParseError::EmptyGrouping { span } => *span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        match self {
            ParseError::UnexpectedToken {
                found, expected, ..
            } => {
                write!(
                    f,
                    "ParserException at {}:{}: unexpected token '{}'",
                    span.line, span.column, found
                )?;
                if let Some(expected) = expected {
                    write!(f, ", expected {expected}")?;
                }
                Ok(())
            }
            ParseError::UnexpectedEof { expected, .. } => {
                write!(
                    f,
                    "ParserException at {}:{}: unexpected end of input",
                    span.line, span.column
                )?;
                if let Some(expected) = expected {
                    write!(f, ", expected {expected}")?;
                }
                Ok(())
            }
            ParseError::TrailingInput { found, .. } => write!(
                f,
                "ParserException at {}:{}: trailing input after expression: '{}'",
                span.line, span.column, found
            ),
            ParseError::EmptyGrouping { .. } => write!(
                f,
                "ParserException at {}:{}: empty grouping is not a valid expression",
                span.line, span.column
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Failure raised while evaluating an AST against an `EvaluationContext`.
///
/// Renders as `"EvaluationException: <msg>"`. Eval errors are not located —
/// the evaluator does not track a "current token", only a message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl EvalError {
    /// Builds an error with an arbitrary message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Name lookup failed in every enclosing scope.
    pub fn undefined_identifier(name: &str) -> Self {
        Self::new(format!("undefined identifier '{name}'"))
    }

    /// A registry or method lookup by name failed.
    pub fn unknown_function(name: &str) -> Self {
        Self::new(format!("unknown function '{name}'"))
    }

    /// No method named `method` exists for `receiver_kind`.
    pub fn unknown_method(receiver_kind: &str, method: &str) -> Self {
        Self::new(format!("no method '{method}' on {receiver_kind}"))
    }

    /// An operator or built-in received a value of the wrong shape.
    pub fn type_error(expected: &str, found: &str) -> Self {
        Self::new(format!("expected {expected}, found {found}"))
    }

    /// A built-in received the wrong number of arguments.
    pub fn arity_mismatch(expected: usize, found: usize) -> Self {
        Self::new(format!("expected {expected} argument(s), found {found}"))
    }

    /// Division or modulo by a zero divisor.
    pub fn division_by_zero() -> Self {
        Self::new("division by zero")
    }

    /// An array or string index fell outside its valid range.
    pub fn index_out_of_range(index: i64, len: usize) -> Self {
        Self::new(format!("index {index} out of range for length {len}"))
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvaluationException: {}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// A single failure type spanning all three pipeline stages, for call sites
/// that lex, parse, and evaluate in one step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Failure during tokenization.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Failure during parsing.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Failure during evaluation.
    #[error(transparent)]
    Eval(#[from] EvalError),
}
