//! Parsing (tokens to AST)
//!
//! The parser converts a stream of tokens into an Abstract Syntax Tree (AST).
//! Uses Pratt parsing for operators and recursive descent for keyword forms.
//!
//! Like Ruby, the parser tracks which names have been assigned in the current
//! scope: a bare `foo` is a local variable read if `foo` was assigned earlier,
//! and a receiverless method call otherwise.

mod expr;
mod stmt;

use crate::ast::*;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};
use std::collections::HashSet;

/// Deepest expression nesting accepted before parsing gives up (GR1102)
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parser state for building AST from tokens
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Local variable names per method scope, innermost last
    pub(super) scopes: Vec<HashSet<String>>,
    /// Current expression nesting
    pub(super) depth: usize,
}

/// Operator precedence levels for Pratt parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    Lowest,
    Or,         // ||
    And,        // &&
    Equality,   // == != <=>
    Comparison, // < <= > >=
    BitOr,      // | ^
    BitAnd,     // &
    Shift,      // <<
    Term,       // + -
    Factor,     // * / %
    UnaryMinus, // -x
    Power,      // **
    Unary,      // !
    Call,       // .
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
            scopes: vec![HashSet::new()],
            depth: 0,
        }
    }

    /// Treat the given names as already-assigned top-level locals
    pub fn with_locals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(scope) = self.scopes.first_mut() {
            scope.extend(names.into_iter().map(Into::into));
        }
        self
    }

    /// Parse tokens into an AST
    pub fn parse(&mut self) -> (Program, Vec<Diagnostic>) {
        let start = self.peek().span;
        let mut exprs = Vec::new();

        self.skip_terminators();
        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(expr) => {
                    exprs.push(expr);
                    if !self.end_statement(&[]) {
                        self.synchronize();
                    }
                }
                Err(()) => self.synchronize(),
            }
        }

        let span = body_span(&exprs, start);
        (
            Program {
                body: Body { exprs, span },
            },
            std::mem::take(&mut self.diagnostics),
        )
    }

    // === Bodies ===

    /// Parse statements until one of `enders` (not consumed) or end of input
    pub(super) fn body_until(&mut self, enders: &[TokenKind]) -> Result<Body, ()> {
        let start = self.peek().span;
        let mut exprs = Vec::new();

        self.skip_terminators();
        while !self.is_at_end() && !self.check_any(enders) {
            exprs.push(self.parse_statement()?);
            if !self.end_statement(enders) {
                return Err(());
            }
        }

        let span = body_span(&exprs, start);
        Ok(Body { exprs, span })
    }

    /// After a statement: consume terminators, or accept an upcoming ender
    fn end_statement(&mut self, enders: &[TokenKind]) -> bool {
        if self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) {
            self.skip_terminators();
            true
        } else if self.is_at_end() || self.check_any(enders) {
            true
        } else {
            self.error_unexpected("after expression");
            false
        }
    }

    // === Scopes ===

    pub(super) fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    pub(super) fn is_local(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|scope| scope.contains(name))
    }

    // === Helper methods ===

    /// Advance to next token and return reference to previous
    pub(super) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    /// Peek at current token
    pub(super) fn peek(&self) -> &Token {
        let index = self.current.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    /// Peek one token past the current one
    pub(super) fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    /// Most recently consumed token
    pub(super) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Check if current token matches kind
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    pub(super) fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|kind| self.check(*kind))
    }

    /// Match and consume token if it matches
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume token of given kind or error
    pub(super) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(message);
            Err(())
        }
    }

    pub(super) fn skip_newlines(&mut self) {
        while self.match_token(TokenKind::Newline) {}
    }

    pub(super) fn skip_terminators(&mut self) {
        while self.match_token(TokenKind::Newline) || self.match_token(TokenKind::Semicolon) {}
    }

    /// Check if at end of token stream
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.tokens[self.current].kind == TokenKind::Eof
    }

    /// Record an error at the current token
    pub(super) fn error(&mut self, message: &str) {
        let token = self.peek();
        if token.kind == TokenKind::Error {
            // Already reported by the lexer
            return;
        }
        let span = token.span;
        self.diagnostics.push(
            Diagnostic::error_with_code(error_codes::UNEXPECTED_TOKEN, message, span)
                .with_label("syntax error"),
        );
    }

    /// Go one nesting level deeper, or report GR1102 past the limit
    ///
    /// Callers that own a level restore `depth` when they return.
    pub(super) fn enter(&mut self) -> Result<(), ()> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_too_deep();
            return Err(());
        }
        self.depth += 1;
        Ok(())
    }

    fn error_too_deep(&mut self) {
        let span = self.peek().span;
        self.diagnostics.push(
            Diagnostic::error_with_code(
                error_codes::NESTING_TOO_DEEP,
                "Expression nested too deeply",
                span,
            )
            .with_label("syntax error")
            .with_help(format!(
                "expressions may nest at most {} levels",
                MAX_NESTING_DEPTH
            )),
        );
    }

    /// Record an "unexpected token" error describing the current token
    pub(super) fn error_unexpected(&mut self, context: &str) {
        let message = match self.peek().kind {
            TokenKind::Eof => format!("Unexpected end of input {}", context),
            TokenKind::Newline => format!("Unexpected newline {}", context),
            _ => format!("Unexpected '{}' {}", self.peek().lexeme, context),
        };
        self.error(&message);
    }

    /// Consume a plain identifier, with a clearer message for keywords
    pub(super) fn consume_identifier(&mut self, context: &str) -> Result<Token, ()> {
        let current = self.peek().clone();

        if current.kind.is_keyword_kind() {
            self.error(&format!(
                "Cannot use reserved keyword '{}' as {}",
                current.lexeme, context
            ));
            Err(())
        } else if current.kind == TokenKind::Identifier
            && !current.lexeme.ends_with(['?', '!'])
        {
            self.advance();
            Ok(current)
        } else {
            self.error(&format!("Expected {}", context));
            Err(())
        }
    }

    /// Require the `end` closing a block opened by `opener`
    pub(super) fn expect_end(&mut self, opener: &Token) -> Result<Span, ()> {
        if self.check(TokenKind::End) {
            return Ok(self.advance().span);
        }

        let token = self.peek();
        if token.kind == TokenKind::Error {
            return Err(());
        }
        let span = token.span;
        self.diagnostics.push(
            Diagnostic::error_with_code(
                error_codes::MISSING_END,
                format!("Expected 'end' to close '{}'", opener.lexeme),
                span,
            )
            .with_label("block is still open here")
            .with_help(format!(
                "'{}' opened on line {} needs a matching 'end'",
                opener.lexeme, opener.span.line
            )),
        );
        Err(())
    }

    /// Synchronize after error: skip to the start of the next line
    pub(super) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if matches!(
                self.previous().kind,
                TokenKind::Newline | TokenKind::Semicolon
            ) {
                return;
            }
            self.advance();
        }
    }
}

fn body_span(exprs: &[Expr], fallback: Span) -> Span {
    match (exprs.first(), exprs.last()) {
        (Some(first), Some(last)) => first.span().merge(last.span()),
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_source(source: &str) -> (Program, Vec<Diagnostic>) {
        let mut lexer = Lexer::new(source);
        let (tokens, _) = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    fn parse_ok(source: &str) -> Vec<Expr> {
        let (program, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
        program.body.exprs
    }

    fn method_of(expr: &Expr) -> &str {
        match expr {
            Expr::Call(call) => &call.method.name,
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("\n;\n").is_empty());
    }

    #[test]
    fn test_statements_split_by_newline_and_semicolon() {
        assert_eq!(parse_ok("1\n2; 3").len(), 3);
    }

    #[test]
    fn test_grouped_method_call() {
        let exprs = parse_ok("(2*21).to_s");
        let Expr::Call(call) = &exprs[0] else {
            panic!("expected call");
        };
        assert_eq!(call.method.name, "to_s");
        let Some(receiver) = &call.receiver else {
            panic!("expected receiver");
        };
        let Expr::Group(body) = receiver.as_ref() else {
            panic!("expected group");
        };
        assert_eq!(method_of(&body.exprs[0]), "*");
    }

    #[test]
    fn test_command_call_with_string() {
        let exprs = parse_ok("puts 'hola, mundo!'");
        let Expr::Call(call) = &exprs[0] else {
            panic!("expected call");
        };
        assert!(call.receiver.is_none());
        assert_eq!(call.method.name, "puts");
        assert_eq!(
            call.args,
            vec![Expr::Literal(
                Literal::String("hola, mundo!".to_string()),
                call.args[0].span()
            )]
        );
    }

    #[test]
    fn test_assignment_declares_local() {
        let exprs = parse_ok("x = 1\nx");
        assert!(matches!(exprs[0], Expr::Assign(_)));
        assert!(matches!(exprs[1], Expr::Local(_)));
    }

    #[test]
    fn test_unknown_bare_name_is_call() {
        let exprs = parse_ok("foo");
        let Expr::Call(call) = &exprs[0] else {
            panic!("expected call");
        };
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_seeded_locals() {
        let (tokens, _) = Lexer::new("x - 1").tokenize();
        let (program, diagnostics) = Parser::new(tokens).with_locals(["x"]).parse();
        assert!(diagnostics.is_empty());
        assert_eq!(method_of(&program.body.exprs[0]), "-");
    }

    #[test]
    fn test_local_minus_vs_command_argument() {
        // `foo -1` passes -1 to foo; `x -1` subtracts from the local
        let exprs = parse_ok("foo -1");
        assert_eq!(method_of(&exprs[0]), "foo");

        let exprs = parse_ok("x = 3\nx -1");
        assert_eq!(method_of(&exprs[1]), "-");
    }

    #[test]
    fn test_missing_end() {
        let (_, diagnostics) = parse_source("if true\n  1\n");
        assert_eq!(diagnostics[0].code, "GR1101");
        assert!(diagnostics[0].message.contains("'if'"));
    }

    #[test]
    fn test_unexpected_token() {
        let (_, diagnostics) = parse_source("1 +");
        assert_eq!(diagnostics[0].code, "GR1100");
    }

    #[test]
    fn test_recovery_reports_later_errors() {
        let (program, diagnostics) = parse_source("1 + )\n2\n)");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(program.body.exprs.len(), 1);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        let (_, diagnostics) = parse_source(&deep);
        assert_eq!(diagnostics[0].code, "GR1102");

        let shallow = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse_ok(&shallow).len(), 1);

        let chain = format!("1{}", " ** 1".repeat(300));
        let (_, diagnostics) = parse_source(&chain);
        assert_eq!(diagnostics[0].code, "GR1102");
    }

    #[test]
    fn test_siblings_do_not_add_nesting() {
        // Depth is per path, not per statement or argument
        let body = format!("({})", "x = 1 if true; ".repeat(400));
        assert_eq!(parse_ok(&body).len(), 1);

        let args = format!("foo({}1)", "a = 1, ".repeat(400));
        assert_eq!(parse_ok(&args).len(), 1);
    }

    #[test]
    fn test_integer_literal_bounds() {
        assert_eq!(parse_ok("-9223372036854775808").len(), 1);

        // Only valid with the sign glued on
        let (_, diagnostics) = parse_source("9223372036854775808");
        assert_eq!(diagnostics[0].code, "GR1001");
        assert!(diagnostics[0].message.contains("out of range"));

        let (_, lex_diags) = Lexer::new("-9223372036854775809").tokenize();
        assert!(lex_diags[0].message.contains("out of range"));
    }

    #[test]
    fn test_lexer_errors_not_duplicated() {
        let mut lexer = Lexer::new("x = @");
        let (tokens, lex_diags) = lexer.tokenize();
        let (_, parse_diags) = Parser::new(tokens).parse();
        assert_eq!(lex_diags.len(), 1);
        assert!(parse_diags.is_empty());
    }
}
