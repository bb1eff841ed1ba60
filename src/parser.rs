//! Recursive-descent parser for the expression language.
//!
//! Consumes the full token stream produced by [`crate::lexer::Lexer`] and
//! produces one [`Expr`] root. One method per grammar production, from
//! [`Parser::parse_expression`] (lowest precedence) down to
//! [`Parser::parse_primary`] (highest). The only production not handled by a
//! strict top-down descent is the parenthesised lambda-vs-grouping form,
//! which uses bounded lookahead with backtracking.

use crate::ast::{
    BinaryOp, Expr, ExprKind, InterpolationPart, LogicalOp, MemberOp, ObjectKey, Span, UnaryOp,
};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind, TokenLiteral};
use crate::value::Value;

/// Parses `source` into a single expression AST, failing on any trailing
/// tokens after the root expression.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = Lexer::tokenize(source).map_err(|e| ParseError::UnexpectedToken {
        found: e.to_string(),
        expected: None,
        span: e.span(),
    })?;
    Parser::new(tokens).parse()
}

/// A recursive-descent parser over a pre-scanned token vector.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Creates a parser over an already-tokenized stream (must end in `Eof`).
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0 }
    }

    /// Parses the whole token stream as one root expression, failing if any
    /// non-`Eof` token remains afterward.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        let trailing = self.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(ParseError::TrailingInput {
                found: trailing.lexeme.clone(),
                span: trailing.span,
            });
        }
        Ok(expr)
    }

    // ---- token stream helpers ----------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .unwrap_or_else(|| self.tokens.last().expect("stream always ends in Eof"))
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else if self.check(TokenKind::Eof) {
            Err(ParseError::UnexpectedEof {
                expected: Some(expected.to_string()),
                span: self.peek().span,
            })
        } else {
            let found = self.peek().clone();
            Err(ParseError::UnexpectedToken {
                found: found.lexeme,
                expected: Some(expected.to_string()),
                span: found.span,
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::Identifier, "identifier")?;
        Ok(token.lexeme)
    }

    // ---- grammar: expression ← conditional -----------------------------

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_conditional()
    }

    /// `conditional ← logicalOr ( "?" expression ":" expression )?`
    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_logical_or()?;
        if self.match_token(TokenKind::Question) {
            let then = self.parse_expression()?;
            self.expect(TokenKind::Colon, "':'")?;
            let else_ = self.parse_expression()?;
            let span = cond.span.merge(&else_.span);
            return Ok(Expr::new(
                ExprKind::Conditional {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    else_: Box::new(else_),
                },
                span,
            ));
        }
        Ok(cond)
    }

    /// `logicalOr ← logicalAnd ( ("||"|"or") logicalAnd )*`
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;
        while self.check(TokenKind::Or) {
            self.advance();
            let right = self.parse_logical_and()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Logical {
                    left: Box::new(left),
                    op: LogicalOp::Or,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `logicalAnd ← equality ( ("&&"|"and") equality )*`
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::And) {
            self.advance();
            let right = self.parse_equality()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Logical {
                    left: Box::new(left),
                    op: LogicalOp::And,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `equality ← comparison ( ("=="|"!=") comparison )*`
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Equal => BinaryOp::Eq,
                TokenKind::NotEqual => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `comparison ← term ( ("<"|"<="|">"|">=") term )*`
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `term ← factor ( ("+"|"-") factor )*`
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `factor ← power ( ("*"|"/"|"%") power )*`
    ///
    /// "power" here is the whole unary/power/pipe/postfix/primary chain —
    /// see [`Parser::parse_unary`] for why that chain is entered there
    /// rather than at a separate `parse_power`.
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Multiply => BinaryOp::Mul,
                TokenKind::Divide => BinaryOp::Div,
                TokenKind::Modulo => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// `unary ← ("!"|"-"|"not") unary | pipe`
    ///
    /// The grammar lists `power` below `unary`, but the
    /// worked example right below it (`-2 ** 2` parses as `-(2 ** 2) ==
    /// -4`) only holds if a bare operand is first given the chance to bind
    /// a trailing `**` *before* any enclosing unary minus wraps it — i.e.
    /// `unary`'s no-prefix case must fall through to `power`, and `power`'s
    /// own base must come from `pipe`, not the reverse. This matches the
    /// usual resolution of the same ambiguity in other expression
    /// languages with the same `-x ** y` precedence contract.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let op_token = self.advance();
            let operand = self.parse_unary()?;
            let span = op_token.span.merge(&operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_power()
    }

    /// `power ← unary ( "**" unary )*` — right-associative: the exponent is
    /// parsed by recursing into `unary` (which falls back into `power`
    /// again if there is no prefix operator), so `2 ** 3 ** 2` nests as
    /// `2 ** (3 ** 2)` rather than looping left-associatively.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_pipe()?;
        if self.check(TokenKind::Power) {
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.merge(&right.span);
            return Ok(Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op: BinaryOp::Pow,
                    right: Box::new(right),
                },
                span,
            ));
        }
        Ok(left)
    }

    /// `pipe ← postfix ( "|" postfix )*`
    fn parse_pipe(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_postfix()?;
        while self.check(TokenKind::Pipe) {
            self.advance();
            let name_token = self.expect(TokenKind::Identifier, "filter name")?;
            let filter_args = if self.check(TokenKind::LParen) {
                self.advance();
                self.parse_call_args()?
            } else {
                Vec::new()
            };
            let end_span = filter_args
                .last()
                .map(|e| e.span)
                .unwrap_or(name_token.span);
            let span = left.span.merge(&end_span);
            left = Expr::new(
                ExprKind::Pipe {
                    value: Box::new(left),
                    filter_name: name_token.lexeme,
                    filter_args,
                },
                span,
            );
        }
        Ok(left)
    }

    /// `postfix ← primary ( call | member | index )*`
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    let close = self.expect(TokenKind::RParen, "')'")?;
                    let span = expr.span.merge(&close.span);
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    )
                }
                TokenKind::Dot | TokenKind::QuestionDot => {
                    let op = if self.peek().kind == TokenKind::Dot {
                        MemberOp::Dot
                    } else {
                        MemberOp::OptionalDot
                    };
                    self.advance();
                    let name_token = self.expect(TokenKind::Identifier, "member name")?;
                    let span = expr.span.merge(&name_token.span);
                    Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            op,
                            name: name_token.lexeme,
                        },
                        span,
                    )
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let close = self.expect(TokenKind::RBracket, "']'")?;
                    let span = expr.span.merge(&close.span);
                    Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    )
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    /// `"(" (expression ("," expression)*)? ")"` with the opening `(`
    /// already consumed by the caller; stops at (but does not consume) the
    /// matching `)`.
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.match_token(TokenKind::Comma) {
                continue;
            }
            break;
        }
        Ok(args)
    }

    /// `primary ← NUMBER | STRING | BOOL | NULL | IDENT (lambdaTail?) |
    /// "${" expression "}" | "[" ... "]" | "{" ... "}" | "(" lambdaOrGrouping ")"`
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = match &token.literal {
                    Some(TokenLiteral::Number(n)) => crate::lexer::narrow_number(*n),
                    _ => unreachable!("Number token always carries a TokenLiteral::Number"),
                };
                Ok(Expr::new(ExprKind::Literal(value), token.span))
            }
            TokenKind::String => {
                self.advance();
                let content = match &token.literal {
                    Some(TokenLiteral::Str(s)) => s.clone(),
                    _ => unreachable!("String token always carries a TokenLiteral::Str"),
                };
                self.parse_string_body(&content, token.span)
            }
            TokenKind::Boolean => {
                self.advance();
                let value = match &token.literal {
                    Some(TokenLiteral::Bool(b)) => Value::Bool(*b),
                    _ => unreachable!("Boolean token always carries a TokenLiteral::Bool"),
                };
                Ok(Expr::new(ExprKind::Literal(value), token.span))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Value::Null), token.span))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::Arrow) {
                    self.advance();
                    let body = self.parse_expression()?;
                    let span = token.span.merge(&body.span);
                    return Ok(Expr::new(
                        ExprKind::Lambda {
                            params: vec![token.lexeme],
                            body: Box::new(body),
                        },
                        span,
                    ));
                }
                Ok(Expr::new(ExprKind::Identifier(token.lexeme), token.span))
            }
            TokenKind::DollarBrace => {
                self.advance();
                let inner = self.parse_expression()?;
                let close = self.expect(TokenKind::RBrace, "'}'")?;
                let span = token.span.merge(&close.span);
                Ok(Expr::new(
                    ExprKind::Interpolation(vec![InterpolationPart::Expr(Box::new(inner))]),
                    span,
                ))
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_object(),
            TokenKind::LParen => self.parse_paren_or_lambda(),
            _ => Err(ParseError::UnexpectedToken {
                found: token.lexeme,
                expected: Some("an expression".to_string()),
                span: token.span,
            }),
        }
    }

    /// Scans a string's already-unescaped content for `${...}` holes,
    /// recursively lexing and parsing each one, and assembles an
    /// `Interpolation` node when at least one hole is present. A string
    /// with no hole is a plain `Literal(String)` — most strings take this
    /// path. Brace depth is tracked so a hole may itself contain a
    /// `{ ... }` object literal.
    fn parse_string_body(&mut self, content: &str, span: Span) -> Result<Expr, ParseError> {
        if !content.contains("${") {
            return Ok(Expr::new(ExprKind::Literal(Value::String(content.to_string())), span));
        }

        let mut parts = Vec::new();
        let mut literal = String::new();
        let bytes = content.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
                if !literal.is_empty() {
                    parts.push(InterpolationPart::Literal(std::mem::take(&mut literal)));
                }
                let hole_start = i + 2;
                let mut depth = 1;
                let mut j = hole_start;
                while j < bytes.len() && depth > 0 {
                    match bytes[j] {
                        b'{' => depth += 1,
                        b'}' => depth -= 1,
                        _ => {}
                    }
                    if depth > 0 {
                        j += 1;
                    }
                }
                if depth != 0 {
                    return Err(ParseError::UnexpectedEof {
                        expected: Some("'}' to close interpolation hole".to_string()),
                        span,
                    });
                }
                let sub_source = &content[hole_start..j];
                let sub_expr = parse(sub_source).map_err(|e| reposition(e, span))?;
                parts.push(InterpolationPart::Expr(Box::new(sub_expr)));
                i = j + 1;
            } else {
                // content is already UTF-8; pushing byte-at-a-time across a
                // multi-byte char would split it, so advance by char here.
                let rest = &content[i..];
                let ch = rest.chars().next().expect("i < bytes.len()");
                literal.push(ch);
                i += ch.len_utf8();
            }
        }
        if !literal.is_empty() {
            parts.push(InterpolationPart::Literal(literal));
        }
        Ok(Expr::new(ExprKind::Interpolation(parts), span))
    }

    /// `"[" (expression ("," expression)*)? "]"`
    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if self.match_token(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        let close = self.expect(TokenKind::RBracket, "']'")?;
        let span = open.span.merge(&close.span);
        Ok(Expr::new(ExprKind::Array(elements), span))
    }

    /// `"{" (entry ("," entry)*)? "}"`, `entry ← (IDENT | STRING) ":"
    /// expression`, extended with a bracketed `"[" expression "]" ":"
    /// expression` computed-key form, allowing arbitrary expressions whose
    /// result is stringified as an object key beyond the literal `entry`
    /// production, via `ObjectKey`'s `Computed` arm.
    fn parse_object(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        let mut entries = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let key = self.parse_object_key()?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_expression()?;
                entries.push((key, value));
                if self.match_token(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        let span = open.span.merge(&close.span);
        Ok(Expr::new(ExprKind::Object(entries), span))
    }

    fn parse_object_key(&mut self) -> Result<ObjectKey, ParseError> {
        match self.peek().kind {
            TokenKind::Identifier => Ok(ObjectKey::Literal(self.advance().lexeme)),
            TokenKind::String => {
                let token = self.advance();
                match token.literal {
                    Some(TokenLiteral::Str(s)) => Ok(ObjectKey::Literal(s)),
                    _ => unreachable!("String token always carries a TokenLiteral::Str"),
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(ObjectKey::Computed(Box::new(expr)))
            }
            _ => {
                let found = self.peek().clone();
                Err(ParseError::UnexpectedToken {
                    found: found.lexeme,
                    expected: Some("an object key".to_string()),
                    span: found.span,
                })
            }
        }
    }

    /// `"(" lambdaOrGrouping ")"`. Tentatively scans a comma-separated
    /// identifier list up to the matching `)`; if that is immediately
    /// followed by `=>`, it is a parameter list. Otherwise the position is
    /// rewound and the contents are parsed as one grouped expression. `()`
    /// not followed by `=>` is a parse error (an empty grouping has no
    /// value).
    fn parse_paren_or_lambda(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();

        if let Some(params) = self.try_scan_lambda_params() {
            self.expect(TokenKind::Arrow, "'=>'")?;
            let body = self.parse_expression()?;
            let span = open.span.merge(&body.span);
            return Ok(Expr::new(
                ExprKind::Lambda {
                    params,
                    body: Box::new(body),
                },
                span,
            ));
        }

        if self.check(TokenKind::RParen) {
            let close = self.advance();
            return Err(ParseError::EmptyGrouping {
                span: open.span.merge(&close.span),
            });
        }

        let inner = self.parse_expression()?;
        let close = self.expect(TokenKind::RParen, "')'")?;
        let span = open.span.merge(&close.span);
        Ok(Expr::new(ExprKind::Grouping(Box::new(inner)), span))
    }

    /// Looks ahead from just after an already-consumed `(` for a
    /// comma-separated identifier list immediately followed by `) =>`.
    /// Returns `Some(params)` and leaves the cursor just past the `)` (so
    /// the caller only needs to consume `=>`) on a match; returns `None`
    /// and leaves the cursor untouched otherwise.
    fn try_scan_lambda_params(&mut self) -> Option<Vec<String>> {
        let start = self.position;

        if self.check(TokenKind::RParen) {
            if self.peek_at(1).kind == TokenKind::Arrow {
                self.advance();
                return Some(Vec::new());
            }
            return None;
        }

        let mut params = Vec::new();
        loop {
            if self.check(TokenKind::Identifier) {
                params.push(self.advance().lexeme);
            } else {
                self.position = start;
                return None;
            }
            if self.match_token(TokenKind::Comma) {
                continue;
            }
            break;
        }

        if self.check(TokenKind::RParen) && self.peek_at(1).kind == TokenKind::Arrow {
            self.advance();
            Some(params)
        } else {
            self.position = start;
            None
        }
    }
}

/// Rewrites a nested-parse error's span to the enclosing string literal's
/// span, since byte offsets inside an extracted hole substring are not
/// addresses into the original source.
fn reposition(err: ParseError, outer: Span) -> ParseError {
    match err {
        ParseError::UnexpectedToken { found, expected, .. } => {
            ParseError::UnexpectedToken { found, expected, span: outer }
        }
        ParseError::UnexpectedEof { expected, .. } => {
            ParseError::UnexpectedEof { expected, span: outer }
        }
        ParseError::TrailingInput { found, .. } => ParseError::TrailingInput { found, span: outer },
        ParseError::EmptyGrouping { .. } => ParseError::EmptyGrouping { span: outer },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Expr {
        parse(src).unwrap_or_else(|e| panic!("expected {src:?} to parse, got {e}"))
    }

    #[test]
    fn precedence_matches_arithmetic_convention() {
        assert_eq!(parse_ok("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
        assert_eq!(parse_ok("(1 + 2) * 3").to_string(), "((1 + 2) * 3)");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(parse_ok("2 ** 3 ** 2").to_string(), "(2 ** (3 ** 2))");
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        assert_eq!(parse_ok("-2 ** 2").to_string(), "(-(2 ** 2))");
    }

    #[test]
    fn pipe_binds_tighter_than_unary_not() {
        assert_eq!(parse_ok("!x | f").to_string(), "(!(x | f))");
    }

    #[test]
    fn optional_chaining_short_circuit_shape() {
        let expr = parse_ok("a?.b?.c");
        assert!(matches!(expr.kind, ExprKind::Member { op: MemberOp::OptionalDot, .. }));
    }

    #[test]
    fn bare_identifier_lambda_sugar() {
        let expr = parse_ok("x => x + 1");
        match expr.kind {
            ExprKind::Lambda { params, .. } => assert_eq!(params, vec!["x".to_string()]),
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn parenthesised_multi_param_lambda() {
        let expr = parse_ok("(a, b) => a + b");
        match expr.kind {
            ExprKind::Lambda { params, .. } => {
                assert_eq!(params, vec!["a".to_string(), "b".to_string()])
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn zero_param_lambda() {
        let expr = parse_ok("() => 1");
        match expr.kind {
            ExprKind::Lambda { params, .. } => assert!(params.is_empty()),
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn grouping_without_arrow_is_grouping_not_lambda() {
        let expr = parse_ok("(a)");
        assert!(matches!(expr.kind, ExprKind::Grouping(_)));
    }

    #[test]
    fn empty_grouping_without_arrow_is_parse_error() {
        assert!(parse("()").is_err());
    }

    #[test]
    fn nested_ternary_is_right_nested() {
        let expr = parse_ok("a ? b : c ? d : e");
        match expr.kind {
            ExprKind::Conditional { else_, .. } => {
                assert!(matches!(else_.kind, ExprKind::Conditional { .. }));
            }
            other => panic!("expected Conditional, got {other:?}"),
        }
    }

    #[test]
    fn trailing_tokens_after_root_expression_is_error() {
        assert!(parse("1 + 2 3").is_err());
    }

    #[test]
    fn string_with_interpolation_hole() {
        let expr = parse_ok(r#""hello ${name}!""#);
        match expr.kind {
            ExprKind::Interpolation(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected Interpolation, got {other:?}"),
        }
    }

    #[test]
    fn plain_string_without_holes_is_literal() {
        let expr = parse_ok(r#""no holes here""#);
        assert!(matches!(expr.kind, ExprKind::Literal(Value::String(_))));
    }

    #[test]
    fn computed_object_key() {
        let expr = parse_ok(r#"{ [k]: 1 }"#);
        match expr.kind {
            ExprKind::Object(entries) => {
                assert!(matches!(entries[0].0, ObjectKey::Computed(_)));
            }
            other => panic!("expected Object, got {other:?}"),
        }
    }

    #[test]
    fn array_and_call_and_index_chain() {
        let expr = parse_ok("a[0].b(c)");
        assert!(matches!(expr.kind, ExprKind::Call { .. }));
    }

    #[test]
    fn pipe_with_filter_arguments() {
        let expr = parse_ok("x | round(2)");
        match expr.kind {
            ExprKind::Pipe { filter_name, filter_args, .. } => {
                assert_eq!(filter_name, "round");
                assert_eq!(filter_args.len(), 1);
            }
            other => panic!("expected Pipe, got {other:?}"),
        }
    }
}
