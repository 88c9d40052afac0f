//! Expression parsing (Pratt parsing)

use crate::ast::*;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::parser::{Parser, Precedence};
use crate::span::Span;
use crate::stack;
use crate::token::{Token, TokenKind};

impl Parser {
    /// Parse an expression, including assignment
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ()> {
        if self.check(TokenKind::Identifier) {
            let assigns = self.peek_next().is_some_and(|next| {
                matches!(
                    next.kind,
                    TokenKind::Equal
                        | TokenKind::PlusEqual
                        | TokenKind::MinusEqual
                        | TokenKind::StarEqual
                        | TokenKind::SlashEqual
                )
            });
            if assigns {
                let entry = self.depth;
                let result = self.parse_assignment();
                self.depth = entry;
                return result;
            }
        }

        if self.check(TokenKind::Constant)
            && self
                .peek_next()
                .is_some_and(|next| next.kind == TokenKind::Equal)
        {
            self.error("Constants cannot be assigned from scripts");
            return Err(());
        }

        self.parse_precedence(Precedence::Lowest)
    }

    /// Parse expression with given precedence
    pub(super) fn parse_precedence(&mut self, precedence: Precedence) -> Result<Expr, ()> {
        let entry = self.depth;
        let result = stack::guarded(|| self.parse_operators(precedence));
        self.depth = entry;
        result
    }

    fn parse_operators(&mut self, precedence: Precedence) -> Result<Expr, ()> {
        self.enter()?;
        let mut left = self.parse_prefix()?;

        while precedence < self.current_precedence() {
            // Each operator wraps `left` one level deeper
            self.enter()?;
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    /// Parse prefix expression
    fn parse_prefix(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Integer | TokenKind::Float => {
                let token = self.advance().clone();
                self.number_literal(&token, false)
            }
            TokenKind::String => {
                let token = self.advance();
                Ok(Expr::Literal(
                    Literal::String(token.lexeme.clone()),
                    token.span,
                ))
            }
            TokenKind::Symbol => {
                let token = self.advance();
                Ok(Expr::Literal(
                    Literal::Symbol(token.lexeme.clone()),
                    token.span,
                ))
            }
            TokenKind::Nil => Ok(Expr::Literal(Literal::Nil, self.advance().span)),
            TokenKind::True => Ok(Expr::Literal(Literal::Bool(true), self.advance().span)),
            TokenKind::False => Ok(Expr::Literal(Literal::Bool(false), self.advance().span)),
            TokenKind::SelfKw => Ok(Expr::SelfRef(self.advance().span)),
            TokenKind::StringBegin => self.parse_interpolated(),
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::Constant => {
                let token = self.advance();
                Ok(Expr::Constant(Identifier {
                    name: token.lexeme.clone(),
                    span: token.span,
                }))
            }
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::Minus => self.parse_unary_minus(),
            TokenKind::Bang => {
                let start = self.advance().span;
                let expr = self.parse_precedence(Precedence::Unary)?;
                let span = start.merge(expr.span());
                Ok(Expr::Not(NotExpr {
                    expr: Box::new(expr),
                    span,
                }))
            }
            TokenKind::Not => {
                let start = self.advance().span;
                let expr = self.parse_expression()?;
                let span = start.merge(expr.span());
                Ok(Expr::Not(NotExpr {
                    expr: Box::new(expr),
                    span,
                }))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::Unless => self.parse_unless(),
            TokenKind::While | TokenKind::Until => self.parse_while(),
            TokenKind::Def => self.parse_def(),
            TokenKind::Break | TokenKind::Next | TokenKind::Return => self.parse_jump(),
            // The lexer has already reported this token
            TokenKind::Error => Err(()),
            _ => {
                self.error_unexpected("where an expression was expected");
                Err(())
            }
        }
    }

    /// Parse infix expression
    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ()> {
        let kind = self.peek().kind;
        match kind {
            TokenKind::Dot => self.parse_method_call(left),
            TokenKind::AmpAmp | TokenKind::PipePipe => {
                let precedence = self.current_precedence();
                self.advance();
                self.skip_newlines();
                let right = self.parse_precedence(precedence)?;
                let span = left.span().merge(right.span());
                let op = if kind == TokenKind::AmpAmp {
                    LogicalOp::And
                } else {
                    LogicalOp::Or
                };
                Ok(Expr::Logical(LogicalExpr {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }))
            }
            TokenKind::StarStar => {
                let op = self.advance().clone();
                self.skip_newlines();
                // Right-associative: 2 ** 3 ** 2 is 2 ** (3 ** 2)
                let right = self.parse_precedence(Precedence::UnaryMinus)?;
                Ok(binary(left, &op, right))
            }
            _ => {
                let precedence = self.current_precedence();
                let op = self.advance().clone();
                self.skip_newlines();
                let right = self.parse_precedence(precedence)?;
                Ok(binary(left, &op, right))
            }
        }
    }

    /// Get current token precedence
    pub(super) fn current_precedence(&self) -> Precedence {
        self.token_precedence(self.peek())
    }

    /// Get precedence for a token
    pub(super) fn token_precedence(&self, token: &Token) -> Precedence {
        match token.kind {
            TokenKind::PipePipe => Precedence::Or,
            TokenKind::AmpAmp => Precedence::And,
            TokenKind::EqualEqual | TokenKind::BangEqual | TokenKind::Spaceship => {
                Precedence::Equality
            }
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual => Precedence::Comparison,
            TokenKind::Pipe | TokenKind::Caret => Precedence::BitOr,
            TokenKind::Amp => Precedence::BitAnd,
            TokenKind::ShiftLeft => Precedence::Shift,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
            TokenKind::StarStar => Precedence::Power,
            TokenKind::Dot => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }

    /// `x = value` and compound forms
    fn parse_assignment(&mut self) -> Result<Expr, ()> {
        self.enter()?;
        let name_token = self.advance().clone();
        let op_token = self.advance().clone();
        self.skip_newlines();

        let target = Identifier {
            name: name_token.lexeme.clone(),
            span: name_token.span,
        };

        if target.name.ends_with(['?', '!']) {
            self.diagnostics.push(
                Diagnostic::error_with_code(
                    error_codes::UNEXPECTED_TOKEN,
                    format!("Cannot assign to method name '{}'", target.name),
                    name_token.span,
                )
                .with_label("syntax error"),
            );
            return Err(());
        }

        // The name is a local from here on, even inside its own initializer
        self.declare(&target.name);
        let value = self.parse_expression()?;
        let span = name_token.span.merge(value.span());

        let op = match op_token.kind {
            TokenKind::Equal => {
                return Ok(Expr::Assign(Assign {
                    target,
                    value: Box::new(value),
                    span,
                }))
            }
            TokenKind::PlusEqual => CompoundOp::AddAssign,
            TokenKind::MinusEqual => CompoundOp::SubAssign,
            TokenKind::StarEqual => CompoundOp::MulAssign,
            _ => CompoundOp::DivAssign,
        };

        Ok(Expr::CompoundAssign(CompoundAssign {
            target,
            op,
            value: Box::new(value),
            span,
        }))
    }

    fn number_literal(&mut self, token: &Token, negate: bool) -> Result<Expr, ()> {
        let sign = if negate { "-" } else { "" };
        let text = format!("{}{}", sign, token.lexeme);
        let literal = if token.kind == TokenKind::Float {
            text.parse::<f64>().map(Literal::Float).ok()
        } else {
            text.parse::<i64>().map(Literal::Integer).ok()
        };

        match literal {
            Some(literal) => Ok(Expr::Literal(literal, token.span)),
            None => {
                let message = if token.kind == TokenKind::Integer {
                    format!("Integer literal '{}' is out of range", text)
                } else {
                    format!("Invalid number literal '{}'", text)
                };
                self.diagnostics.push(
                    Diagnostic::error_with_code(
                        error_codes::UNEXPECTED_CHARACTER,
                        message,
                        token.span,
                    )
                    .with_label("syntax error"),
                );
                Err(())
            }
        }
    }

    /// Unary minus
    ///
    /// A minus glued to a numeric literal makes a negative literal
    /// (`-2.abs` is 2), except that `**` still binds tighter (`-2 ** 2` is -4).
    fn parse_unary_minus(&mut self) -> Result<Expr, ()> {
        let minus = self.advance().clone();
        let next = self.peek().clone();

        if !next.spaced && matches!(next.kind, TokenKind::Integer | TokenKind::Float) {
            self.advance();
            if self.check(TokenKind::StarStar) {
                let positive = self.number_literal(&next, false)?;
                let op = self.advance().clone();
                self.skip_newlines();
                let exponent = self.parse_precedence(Precedence::UnaryMinus)?;
                let power = binary(positive, &op, exponent);
                return Ok(negate(minus.span, power));
            }
            let literal = self.number_literal(&next, true)?;
            return Ok(match literal {
                Expr::Literal(value, span) => Expr::Literal(value, minus.span.merge(span)),
                other => other,
            });
        }

        let operand = self.parse_precedence(Precedence::UnaryMinus)?;
        Ok(negate(minus.span, operand))
    }

    /// Parenthesised sequence
    fn parse_group(&mut self) -> Result<Expr, ()> {
        let open = self.advance().span;
        let body = self.body_until(&[TokenKind::RightParen])?;
        let close = self
            .consume(TokenKind::RightParen, "Expected ')' to close '('")?
            .span;

        Ok(Expr::Group(Body {
            exprs: body.exprs,
            span: open.merge(close),
        }))
    }

    /// Double-quoted string with interpolation
    fn parse_interpolated(&mut self) -> Result<Expr, ()> {
        let start = self.advance().span;
        let mut parts = Vec::new();

        loop {
            match self.peek().kind {
                TokenKind::StringContent => {
                    parts.push(StrPart::Text(self.advance().lexeme.clone()));
                }
                TokenKind::InterpolationStart => {
                    self.advance();
                    let body = self.body_until(&[TokenKind::InterpolationEnd])?;
                    self.consume(
                        TokenKind::InterpolationEnd,
                        "Expected '}' to close interpolation",
                    )?;
                    parts.push(StrPart::Code(body));
                }
                TokenKind::StringEnd => {
                    let end = self.advance().span;
                    return Ok(Expr::Interpolated(InterpolatedStr {
                        parts,
                        span: start.merge(end),
                    }));
                }
                _ => {
                    self.error("Unterminated string interpolation");
                    return Err(());
                }
            }
        }
    }

    /// Identifier: local variable read or receiverless method call
    fn parse_identifier(&mut self) -> Result<Expr, ()> {
        let token = self.advance().clone();
        let method = Identifier {
            name: token.lexeme.clone(),
            span: token.span,
        };

        if self.check(TokenKind::LeftParen) && !self.peek().spaced {
            let args = self.parse_paren_args()?;
            return Ok(self.finish_call(None, method, args));
        }

        if self.is_local(&method.name) {
            return Ok(Expr::Local(method));
        }

        let args = if self.can_start_command_arg() {
            self.parse_command_args()?
        } else {
            Vec::new()
        };
        Ok(self.finish_call(None, method, args))
    }

    /// `receiver.name`, `receiver.name(args)`, `receiver.name args`
    fn parse_method_call(&mut self, receiver: Expr) -> Result<Expr, ()> {
        self.advance(); // .
        self.skip_newlines();

        let token = self.peek().clone();
        let callable = matches!(
            token.kind,
            TokenKind::Identifier
                | TokenKind::Constant
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::StarStar
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::EqualEqual
                | TokenKind::BangEqual
                | TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::Spaceship
                | TokenKind::ShiftLeft
                | TokenKind::Amp
                | TokenKind::Pipe
                | TokenKind::Caret
                | TokenKind::Bang
        ) || token.kind.is_keyword_kind();
        if !callable {
            self.error_unexpected("after '.', expected a method name");
            return Err(());
        }
        self.advance();

        let method = Identifier {
            name: token.lexeme.clone(),
            span: token.span,
        };

        let args = if self.check(TokenKind::LeftParen) && !self.peek().spaced {
            self.parse_paren_args()?
        } else if self.can_start_command_arg() {
            self.parse_command_args()?
        } else {
            Vec::new()
        };

        Ok(self.finish_call(Some(receiver), method, args))
    }

    fn finish_call(&self, receiver: Option<Expr>, method: Identifier, args: Vec<Expr>) -> Expr {
        let start = receiver.as_ref().map_or(method.span, |r| r.span());
        let span = start.merge(self.previous().span);
        Expr::Call(CallExpr {
            receiver: receiver.map(Box::new),
            method,
            args,
            span,
        })
    }

    /// `(a, b)` argument list
    fn parse_paren_args(&mut self) -> Result<Vec<Expr>, ()> {
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        self.skip_newlines();

        let mut args = Vec::new();
        if self.match_token(TokenKind::RightParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            self.skip_newlines();
            if !self.match_token(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }

        self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    /// Arguments without parentheses: `puts a, b`
    fn parse_command_args(&mut self) -> Result<Vec<Expr>, ()> {
        let mut args = vec![self.parse_expression()?];
        while self.match_token(TokenKind::Comma) {
            self.skip_newlines();
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    /// Whether the current token starts an unparenthesised argument
    ///
    /// Requires a space before it, and for `-` no space after it, so that
    /// `foo -1` passes an argument while `foo - 1` subtracts.
    pub(super) fn can_start_command_arg(&self) -> bool {
        let token = self.peek();
        if !token.spaced {
            return false;
        }
        match token.kind {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::String
            | TokenKind::StringBegin
            | TokenKind::Symbol
            | TokenKind::Identifier
            | TokenKind::Constant
            | TokenKind::Nil
            | TokenKind::True
            | TokenKind::False
            | TokenKind::SelfKw
            | TokenKind::LeftParen
            | TokenKind::Bang => true,
            TokenKind::Minus => self.peek_next().is_some_and(|next| {
                !next.spaced && !matches!(next.kind, TokenKind::Newline | TokenKind::Eof)
            }),
            _ => false,
        }
    }
}

fn binary(left: Expr, op: &Token, right: Expr) -> Expr {
    let span = left.span().merge(right.span());
    Expr::Call(CallExpr {
        receiver: Some(Box::new(left)),
        method: Identifier {
            name: op.lexeme.clone(),
            span: op.span,
        },
        args: vec![right],
        span,
    })
}

fn negate(minus: Span, operand: Expr) -> Expr {
    let span = minus.merge(operand.span());
    Expr::Call(CallExpr {
        receiver: Some(Box::new(operand)),
        method: Identifier {
            name: "-@".to_string(),
            span: minus,
        },
        args: Vec::new(),
        span,
    })
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Render an expression as a fully parenthesised s-expression
    fn sexp(expr: &Expr) -> String {
        match expr {
            Expr::Literal(Literal::Integer(n), _) => n.to_string(),
            Expr::Literal(Literal::Float(f), _) => format!("{:?}", f),
            Expr::Literal(Literal::String(s), _) => format!("{:?}", s),
            Expr::Literal(Literal::Symbol(s), _) => format!(":{}", s),
            Expr::Literal(Literal::Bool(b), _) => b.to_string(),
            Expr::Literal(Literal::Nil, _) => "nil".to_string(),
            Expr::SelfRef(_) => "self".to_string(),
            Expr::Local(id) => id.name.clone(),
            Expr::Constant(id) => id.name.clone(),
            Expr::Assign(a) => format!("(= {} {})", a.target.name, sexp(&a.value)),
            Expr::CompoundAssign(a) => format!(
                "({}= {} {})",
                a.op.method_name(),
                a.target.name,
                sexp(&a.value)
            ),
            Expr::Call(c) => {
                let mut out = format!("({}", c.method.name);
                match &c.receiver {
                    Some(r) => out.push_str(&format!(" {}", sexp(r))),
                    None => out.push_str(" _"),
                }
                for arg in &c.args {
                    out.push_str(&format!(" {}", sexp(arg)));
                }
                out.push(')');
                out
            }
            Expr::Not(n) => format!("(not {})", sexp(&n.expr)),
            Expr::Logical(l) => format!(
                "({} {} {})",
                if l.op == LogicalOp::And { "and" } else { "or" },
                sexp(&l.left),
                sexp(&l.right)
            ),
            Expr::Group(b) => {
                let inner: Vec<_> = b.exprs.iter().map(sexp).collect();
                format!("[{}]", inner.join("; "))
            }
            other => format!("{:?}", std::mem::discriminant(other)),
        }
    }

    fn parse_one(source: &str) -> String {
        let (tokens, lex_diags) = Lexer::new(source).tokenize();
        assert!(lex_diags.is_empty(), "{:?}", lex_diags);
        let (program, diagnostics) = Parser::new(tokens).parse();
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(program.body.exprs.len(), 1);
        sexp(&program.body.exprs[0])
    }

    #[rstest]
    #[case("1 + 2 * 3", "(+ 1 (* 2 3))")]
    #[case("(1 + 2) * 3", "(* [(+ 1 2)] 3)")]
    #[case("2 ** 3 ** 2", "(** 2 (** 3 2))")]
    #[case("-2 ** 2", "(-@ (** 2 2))")]
    #[case("-2.abs", "(abs -2)")]
    #[case("10 - 2 - 3", "(- (- 10 2) 3)")]
    #[case("1 < 2 == true", "(== (< 1 2) true)")]
    #[case("a && b || c", "(or (and (a _) (b _)) (c _))")]
    #[case("!x.nil?", "(not (nil? (x _)))")]
    #[case("1 <=> 2", "(<=> 1 2)")]
    #[case("'a' << 'b' + 'c'", "(<< \"a\" (+ \"b\" \"c\"))")]
    #[case("1 +\n 2", "(+ 1 2)")]
    fn test_operator_precedence(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(parse_one(source), expected);
    }

    #[rstest]
    #[case("puts 1, 2", "(puts _ 1 2)")]
    #[case("puts(1)", "(puts _ 1)")]
    #[case("puts (1 + 2) * 3", "(puts _ (* [(+ 1 2)] 3))")]
    #[case("puts -x", "(puts _ (-@ (x _)))")]
    #[case("s.include? 'a'", "(include? (s _) \"a\")")]
    #[case("s.upcase!", "(upcase! (s _))")]
    #[case("1.+(2)", "(+ 1 2)")]
    #[case("x = y = 3", "(= x (= y 3))")]
    #[case("n += 1", "(+= n 1)")]
    #[case("send(:upcase)", "(send _ :upcase)")]
    fn test_calls_and_assignment(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(parse_one(source), expected);
    }

    #[test]
    fn test_interpolated_string() {
        let (tokens, _) = Lexer::new("\"a#{1 + 2}b\"").tokenize();
        let (program, diagnostics) = Parser::new(tokens).parse();
        assert!(diagnostics.is_empty());
        let Expr::Interpolated(s) = &program.body.exprs[0] else {
            panic!("expected interpolated string");
        };
        assert_eq!(s.parts.len(), 3);
        assert!(matches!(s.parts[1], StrPart::Code(_)));
    }

    #[test]
    fn test_constant_assignment_rejected() {
        let (tokens, _) = Lexer::new("FOO = 1").tokenize();
        let (_, diagnostics) = Parser::new(tokens).parse();
        assert_eq!(diagnostics[0].code, "GR1100");
    }
}
