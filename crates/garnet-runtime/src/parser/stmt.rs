//! Statement-level parsing: modifiers, `and`/`or`/`not`, and keyword forms

use crate::ast::*;
use crate::parser::Parser;
use crate::span::Span;
use crate::token::TokenKind;

impl Parser {
    /// Parse a statement: an expression followed by any number of modifiers
    pub(super) fn parse_statement(&mut self) -> Result<Expr, ()> {
        let entry = self.depth;
        let result = self.parse_modified();
        self.depth = entry;
        result
    }

    fn parse_modified(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_expr_stmt()?;

        loop {
            let kind = self.peek().kind;
            match kind {
                TokenKind::If | TokenKind::Unless => {
                    self.enter()?;
                    self.advance();
                    let cond = self.parse_expr_stmt()?;
                    let span = expr.span().merge(cond.span());
                    let body = Body {
                        span: expr.span(),
                        exprs: vec![expr],
                    };
                    let (then_body, else_body) = if kind == TokenKind::If {
                        (body, None)
                    } else {
                        (Body::empty(span), Some(body))
                    };
                    expr = Expr::If(IfExpr {
                        cond: Box::new(cond),
                        then_body,
                        else_body,
                        span,
                    });
                }
                TokenKind::While | TokenKind::Until => {
                    self.enter()?;
                    self.advance();
                    let cond = self.parse_expr_stmt()?;
                    let span = expr.span().merge(cond.span());
                    expr = Expr::While(WhileExpr {
                        cond: Box::new(cond),
                        negated: kind == TokenKind::Until,
                        body: Body {
                            span: expr.span(),
                            exprs: vec![expr],
                        },
                        span,
                    });
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `a and b`, `a or b` (equal precedence, left-associative)
    pub(super) fn parse_expr_stmt(&mut self) -> Result<Expr, ()> {
        let mut left = self.parse_not_expr()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::And => LogicalOp::And,
                TokenKind::Or => LogicalOp::Or,
                _ => return Ok(left),
            };
            self.enter()?;
            self.advance();
            self.skip_newlines();
            let right = self.parse_not_expr()?;
            let span = left.span().merge(right.span());
            left = Expr::Logical(LogicalExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
    }

    fn parse_not_expr(&mut self) -> Result<Expr, ()> {
        if self.check(TokenKind::Not) {
            self.enter()?;
            let start = self.advance().span;
            let expr = self.parse_not_expr()?;
            let span = start.merge(expr.span());
            return Ok(Expr::Not(NotExpr {
                expr: Box::new(expr),
                span,
            }));
        }
        self.parse_expression()
    }

    /// `then`, or a line break, after a condition
    fn parse_then(&mut self) -> Result<(), ()> {
        if self.match_token(TokenKind::Then) {
            self.skip_terminators();
            Ok(())
        } else if self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) {
            self.skip_terminators();
            Ok(())
        } else {
            self.error_unexpected("after condition, expected 'then' or a newline");
            Err(())
        }
    }

    /// `if cond ... elsif cond ... else ... end`
    pub(super) fn parse_if(&mut self) -> Result<Expr, ()> {
        let opener = self.advance().clone();
        self.parse_if_tail(&opener, opener.span)
    }

    /// Condition and branches after `if`/`elsif`; consumes the final `end`
    fn parse_if_tail(&mut self, opener: &crate::token::Token, start: Span) -> Result<Expr, ()> {
        let cond = self.parse_expr_stmt()?;
        self.parse_then()?;
        let then_body =
            self.body_until(&[TokenKind::Elsif, TokenKind::Else, TokenKind::End])?;

        if self.check(TokenKind::Elsif) {
            self.enter()?;
            let elsif_start = self.advance().span;
            let nested = self.parse_if_tail(opener, elsif_start)?;
            let span = start.merge(nested.span());
            return Ok(Expr::If(IfExpr {
                cond: Box::new(cond),
                then_body,
                else_body: Some(Body {
                    span: nested.span(),
                    exprs: vec![nested],
                }),
                span,
            }));
        }

        let else_body = if self.match_token(TokenKind::Else) {
            Some(self.body_until(&[TokenKind::End])?)
        } else {
            None
        };
        let end = self.expect_end(opener)?;

        Ok(Expr::If(IfExpr {
            cond: Box::new(cond),
            then_body,
            else_body,
            span: start.merge(end),
        }))
    }

    /// `unless cond ... else ... end`, stored as an `if` with swapped branches
    pub(super) fn parse_unless(&mut self) -> Result<Expr, ()> {
        let opener = self.advance().clone();
        let cond = self.parse_expr_stmt()?;
        self.parse_then()?;
        let body = self.body_until(&[TokenKind::Else, TokenKind::End])?;
        let else_body = if self.match_token(TokenKind::Else) {
            self.body_until(&[TokenKind::End])?
        } else {
            Body::empty(body.span)
        };
        let end = self.expect_end(&opener)?;

        Ok(Expr::If(IfExpr {
            cond: Box::new(cond),
            then_body: else_body,
            else_body: Some(body),
            span: opener.span.merge(end),
        }))
    }

    /// `while cond ... end` and `until cond ... end`
    pub(super) fn parse_while(&mut self) -> Result<Expr, ()> {
        let opener = self.advance().clone();
        let cond = self.parse_expr_stmt()?;
        if self.match_token(TokenKind::Do) {
            self.skip_terminators();
        } else {
            self.parse_then_terminator()?;
        }
        let body = self.body_until(&[TokenKind::End])?;
        let end = self.expect_end(&opener)?;

        Ok(Expr::While(WhileExpr {
            cond: Box::new(cond),
            negated: opener.kind == TokenKind::Until,
            body,
            span: opener.span.merge(end),
        }))
    }

    fn parse_then_terminator(&mut self) -> Result<(), ()> {
        if self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) {
            self.skip_terminators();
            Ok(())
        } else {
            self.error_unexpected("after loop condition, expected 'do' or a newline");
            Err(())
        }
    }

    /// `def name(params) ... end`
    ///
    /// The body gets a fresh local scope holding only the parameters.
    pub(super) fn parse_def(&mut self) -> Result<Expr, ()> {
        let opener = self.advance().clone();

        let name_token = self.peek().clone();
        if !matches!(name_token.kind, TokenKind::Identifier | TokenKind::Constant) {
            self.error_unexpected("after 'def', expected a method name");
            return Err(());
        }
        self.advance();
        let name = Identifier {
            name: name_token.lexeme.clone(),
            span: name_token.span,
        };

        self.scopes.push(Default::default());
        let result = self.parse_def_rest(&opener, name);
        self.scopes.pop();
        result
    }

    fn parse_def_rest(&mut self, opener: &crate::token::Token, name: Identifier) -> Result<Expr, ()> {
        let mut params: Vec<Identifier> = Vec::new();
        let parenthesised = self.check(TokenKind::LeftParen) && !self.peek().spaced;

        if parenthesised || self.check(TokenKind::Identifier) {
            if parenthesised {
                self.advance();
                self.skip_newlines();
            }
            let empty = parenthesised && self.check(TokenKind::RightParen);
            if !empty {
                loop {
                    let token = self.consume_identifier("a parameter name")?;
                    if params.iter().any(|p| p.name == token.lexeme) {
                        self.diagnostics.push(
                            crate::diagnostic::Diagnostic::error_with_code(
                                crate::diagnostic::error_codes::UNEXPECTED_TOKEN,
                                format!("Duplicated argument name '{}'", token.lexeme),
                                token.span,
                            )
                            .with_label("syntax error"),
                        );
                        return Err(());
                    }
                    self.declare(&token.lexeme);
                    params.push(Identifier {
                        name: token.lexeme.clone(),
                        span: token.span,
                    });
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                    self.skip_newlines();
                }
            }
            if parenthesised {
                self.skip_newlines();
                self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;
            }
        }

        let body = self.body_until(&[TokenKind::End])?;
        let end = self.expect_end(opener)?;

        Ok(Expr::Def(MethodDef {
            name,
            params,
            body,
            span: opener.span.merge(end),
        }))
    }

    /// `break`, `next`, `return` with an optional value
    pub(super) fn parse_jump(&mut self) -> Result<Expr, ()> {
        let token = self.advance().clone();

        let value = if self.starts_value() {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        let span = match &value {
            Some(v) => token.span.merge(v.span()),
            None => token.span,
        };
        let jump = JumpExpr { value, span };

        Ok(match token.kind {
            TokenKind::Break => Expr::Break(jump),
            TokenKind::Next => Expr::Next(jump),
            _ => Expr::Return(jump),
        })
    }

    /// Whether the current token can begin the value of a jump
    fn starts_value(&self) -> bool {
        !self.is_at_end()
            && !matches!(
                self.peek().kind,
                TokenKind::Newline
                    | TokenKind::Semicolon
                    | TokenKind::End
                    | TokenKind::Else
                    | TokenKind::Elsif
                    | TokenKind::If
                    | TokenKind::Unless
                    | TokenKind::While
                    | TokenKind::Until
                    | TokenKind::Then
                    | TokenKind::Do
                    | TokenKind::And
                    | TokenKind::Or
                    | TokenKind::RightParen
                    | TokenKind::InterpolationEnd
                    | TokenKind::Comma
            )
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::diagnostic::Diagnostic;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn parse_source(source: &str) -> (Program, Vec<Diagnostic>) {
        let (tokens, _) = Lexer::new(source).tokenize();
        Parser::new(tokens).parse()
    }

    fn parse_single(source: &str) -> Expr {
        let (program, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
        assert_eq!(program.body.exprs.len(), 1);
        program.body.exprs.into_iter().next().unwrap()
    }

    #[test]
    fn test_if_elsif_else() {
        let expr = parse_single("if a\n 1\nelsif b then 2\nelse\n 3\nend");
        let Expr::If(outer) = expr else {
            panic!("expected if");
        };
        let else_body = outer.else_body.unwrap();
        let Expr::If(inner) = &else_body.exprs[0] else {
            panic!("expected nested if");
        };
        assert_eq!(inner.else_body.as_ref().map(|b| b.exprs.len()), Some(1));
    }

    #[test]
    fn test_unless_swaps_branches() {
        let Expr::If(expr) = parse_single("unless x then 1 else 2 end") else {
            panic!("expected if");
        };
        assert!(matches!(
            expr.then_body.exprs[0],
            Expr::Literal(Literal::Integer(2), _)
        ));
        assert!(matches!(
            expr.else_body.unwrap().exprs[0],
            Expr::Literal(Literal::Integer(1), _)
        ));
    }

    #[test]
    fn test_modifiers_chain() {
        let expr = parse_single("puts 1 if a unless b");
        let Expr::If(outer) = expr else {
            panic!("expected if");
        };
        assert!(outer.then_body.exprs.is_empty());
        assert!(matches!(outer.else_body.unwrap().exprs[0], Expr::If(_)));
    }

    #[test]
    fn test_while_and_until() {
        let Expr::While(w) = parse_single("while i < 3 do i += 1 end") else {
            panic!("expected while");
        };
        assert!(!w.negated);

        let Expr::While(u) = parse_single("until done\n  step\nend") else {
            panic!("expected until");
        };
        assert!(u.negated);
    }

    #[test]
    fn test_def_scopes_params() {
        let (program, diagnostics) = parse_source("def add(a, b)\n  a + b\nend\na");
        assert!(diagnostics.is_empty());
        let Expr::Def(def) = &program.body.exprs[0] else {
            panic!("expected def");
        };
        assert_eq!(def.params.len(), 2);
        assert!(matches!(def.body.exprs[0], Expr::Call(_)));
        // `a` outside the method is not a local
        assert!(matches!(program.body.exprs[1], Expr::Call(_)));
    }

    #[test]
    fn test_def_without_parens() {
        let Expr::Def(def) = parse_single("def greet name\n  name\nend") else {
            panic!("expected def");
        };
        assert_eq!(def.params[0].name, "name");
        assert!(matches!(def.body.exprs[0], Expr::Local(_)));
    }

    #[test]
    fn test_jump_values() {
        let Expr::Def(def) = parse_single("def f\n  return 1 if x\n  return\nend") else {
            panic!("expected def");
        };
        let Expr::If(guard) = &def.body.exprs[0] else {
            panic!("expected modifier if");
        };
        assert!(matches!(&guard.then_body.exprs[0], Expr::Return(j) if j.value.is_some()));
        assert!(matches!(&def.body.exprs[1], Expr::Return(j) if j.value.is_none()));
    }

    #[test]
    fn test_and_or_not() {
        let expr = parse_single("not a and b");
        let Expr::Logical(l) = expr else {
            panic!("expected logical");
        };
        assert_eq!(l.op, LogicalOp::And);
        assert!(matches!(*l.left, Expr::Not(_)));
    }

    #[test]
    fn test_duplicate_param() {
        let (_, diagnostics) = parse_source("def f(a, a)\nend");
        assert!(diagnostics[0].message.contains("Duplicated argument"));
    }

    #[test]
    fn test_keyword_as_param() {
        let (_, diagnostics) = parse_source("def f(end)\nend");
        assert!(diagnostics[0].message.contains("reserved keyword 'end'"));
    }

    #[test]
    fn test_def_missing_end() {
        let (_, diagnostics) = parse_source("def f\n  1\n");
        assert_eq!(diagnostics[0].code, "GR1101");
        assert!(diagnostics[0].help.as_deref().unwrap().contains("line 1"));
    }
}
