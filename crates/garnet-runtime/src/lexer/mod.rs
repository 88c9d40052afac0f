//! Lexical analysis (tokenization)
//!
//! The lexer converts Garnet source code into a stream of tokens with accurate
//! span information. Line breaks are significant (they terminate statements)
//! and are emitted as `Newline` tokens. Double-quoted strings containing
//! `#{...}` are split into begin/content/interpolation/end pieces so the
//! parser can treat the embedded code as ordinary expressions.

use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};
use std::collections::VecDeque;

mod literals;

pub(crate) use literals::OPERATOR_SYMBOLS;

/// What the lexer is currently scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    /// Literal text of an interpolated string
    StringBody,
    /// Code inside `#{ ... }`
    Interpolation,
}

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Original source code
    pub(super) source: String,
    /// Characters of source code
    pub(super) chars: Vec<char>,
    /// Current position in chars
    pub(super) current: usize,
    /// Current line number (1-indexed)
    pub(super) line: u32,
    /// Current column number (1-indexed)
    pub(super) column: u32,
    /// Start position of current token
    pub(super) start_pos: usize,
    /// Start line of current token
    pub(super) start_line: u32,
    /// Start column of current token
    pub(super) start_column: u32,
    /// Whether whitespace preceded the current token
    pub(super) spaced: bool,
    /// Collected diagnostics
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Nested string/interpolation modes, innermost last
    pub(super) modes: Vec<Mode>,
    /// Tokens produced ahead of time (string pieces)
    pub(super) pending: VecDeque<Token>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let chars: Vec<char> = source.chars().collect();
        Self {
            source,
            chars,
            current: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            spaced: false,
            diagnostics: Vec::new(),
            modes: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Tokenize the source code, returning tokens and any diagnostics
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        (tokens, std::mem::take(&mut self.diagnostics))
    }

    /// Scan the next token
    fn next_token(&mut self) -> Token {
        if let Some(token) = self.pending.pop_front() {
            return token;
        }

        if self.modes.last() == Some(&Mode::StringBody) {
            self.mark_start();
            self.spaced = false;
            return self.string_body();
        }

        self.skip_whitespace_and_comments();
        self.mark_start();

        if self.is_at_end() {
            if !self.modes.is_empty() {
                self.modes.clear();
                return self.error_unterminated_string();
            }
            return self.make_token(TokenKind::Eof, "");
        }

        let c = self.advance();

        match c {
            '\n' => self.newline(),

            '(' => self.make_token(TokenKind::LeftParen, "("),
            ')' => self.make_token(TokenKind::RightParen, ")"),
            ',' => self.make_token(TokenKind::Comma, ","),
            ';' => self.make_token(TokenKind::Semicolon, ";"),
            '.' => self.make_token(TokenKind::Dot, "."),
            '^' => self.make_token(TokenKind::Caret, "^"),

            '}' if self.modes.last() == Some(&Mode::Interpolation) => {
                self.modes.pop();
                self.make_token(TokenKind::InterpolationEnd, "}")
            }

            '+' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::PlusEqual, "+=")
                } else {
                    self.make_token(TokenKind::Plus, "+")
                }
            }
            '-' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::MinusEqual, "-=")
                } else {
                    self.make_token(TokenKind::Minus, "-")
                }
            }
            '*' => {
                if self.match_char('*') {
                    self.make_token(TokenKind::StarStar, "**")
                } else if self.match_char('=') {
                    self.make_token(TokenKind::StarEqual, "*=")
                } else {
                    self.make_token(TokenKind::Star, "*")
                }
            }
            '/' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::SlashEqual, "/=")
                } else {
                    self.make_token(TokenKind::Slash, "/")
                }
            }
            '%' => self.make_token(TokenKind::Percent, "%"),
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqualEqual, "==")
                } else {
                    self.make_token(TokenKind::Equal, "=")
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::BangEqual, "!=")
                } else {
                    self.make_token(TokenKind::Bang, "!")
                }
            }
            '<' => {
                if self.match_char('=') {
                    if self.match_char('>') {
                        self.make_token(TokenKind::Spaceship, "<=>")
                    } else {
                        self.make_token(TokenKind::LessEqual, "<=")
                    }
                } else if self.match_char('<') {
                    self.make_token(TokenKind::ShiftLeft, "<<")
                } else {
                    self.make_token(TokenKind::Less, "<")
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::GreaterEqual, ">=")
                } else {
                    self.make_token(TokenKind::Greater, ">")
                }
            }
            '&' => {
                if self.match_char('&') {
                    self.make_token(TokenKind::AmpAmp, "&&")
                } else {
                    self.make_token(TokenKind::Amp, "&")
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.make_token(TokenKind::PipePipe, "||")
                } else {
                    self.make_token(TokenKind::Pipe, "|")
                }
            }

            '\'' => self.single_quoted(),
            '"' => self.double_quoted(),
            ':' => self.symbol(),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => self.error_token(&format!("Unexpected character '{}'", c)),
        }
    }

    /// Emit a statement-terminating newline
    ///
    /// A line whose first non-blank character is a lone `.` continues the
    /// previous expression (`foo\n  .bar`), so no newline is produced for it.
    fn newline(&mut self) -> Token {
        let token = self.make_token(TokenKind::Newline, "\n");

        let mut look = self.current;
        while look < self.chars.len() && matches!(self.chars[look], ' ' | '\t' | '\r' | '\n') {
            look += 1;
        }
        let continues = look < self.chars.len()
            && self.chars[look] == '.'
            && self.chars.get(look + 1).is_some_and(|c| *c != '.');
        if continues {
            while self.current < look {
                self.advance();
            }
            return self.next_token();
        }

        token
    }

    /// Skip blanks, comments, and backslash line continuations
    fn skip_whitespace_and_comments(&mut self) {
        self.spaced = false;
        loop {
            if self.is_at_end() {
                return;
            }

            match self.peek() {
                ' ' | '\r' | '\t' => {
                    self.advance();
                    self.spaced = true;
                }
                '\\' if self.peek_next() == Some('\n') => {
                    self.advance();
                    self.advance();
                    self.spaced = true;
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                    self.spaced = true;
                }
                _ => return,
            }
        }
    }

    // === Character navigation ===

    /// Advance to next character and return it
    pub(super) fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    /// Peek at current character without advancing
    pub(super) fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    /// Peek at next character (current + 1)
    pub(super) fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    /// Check if current character matches expected, and advance if so
    pub(super) fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    /// Check if we've reached the end of source
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    // === Token creation ===

    pub(super) fn current_span(&self) -> Span {
        Span::at(self.start_pos, self.current, self.start_line, self.start_column)
    }

    /// Create a token with the given kind and lexeme
    pub(super) fn make_token(&self, kind: TokenKind, lexeme: &str) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            span: self.current_span(),
            spaced: self.spaced,
        }
    }

    /// Create an error token and record a diagnostic with a specific code
    pub(super) fn error_token_with_code(&mut self, code: &str, message: &str) -> Token {
        let span = Span::at(
            self.start_pos,
            self.current.max(self.start_pos + 1),
            self.start_line,
            self.start_column,
        );

        let snippet = self.get_line_snippet(self.start_line);

        self.diagnostics.push(
            Diagnostic::error_with_code(code, message, span)
                .with_snippet(snippet)
                .with_label("lexer error"),
        );

        Token {
            kind: TokenKind::Error,
            lexeme: message.to_string(),
            span,
            spaced: self.spaced,
        }
    }

    /// Create an error token for invalid/unexpected characters (GR1001)
    pub(super) fn error_token(&mut self, message: &str) -> Token {
        self.error_token_with_code(error_codes::UNEXPECTED_CHARACTER, message)
    }

    /// Create an error token for unterminated strings (GR1002)
    pub(super) fn error_unterminated_string(&mut self) -> Token {
        self.error_token_with_code(
            error_codes::UNTERMINATED_STRING,
            "Unterminated string literal",
        )
    }

    /// Create an error token for invalid escape sequences (GR1003)
    pub(super) fn error_invalid_escape(&mut self, escape_char: char) -> Token {
        self.error_token_with_code(
            error_codes::INVALID_ESCAPE,
            &format!("Invalid escape sequence '\\{}'", escape_char),
        )
    }

    /// Get the source line for a given line number
    fn get_line_snippet(&self, line: u32) -> String {
        self.source
            .lines()
            .nth(line.saturating_sub(1) as usize)
            .unwrap_or("")
            .to_string()
    }
}
