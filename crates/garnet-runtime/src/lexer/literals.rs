//! Literal parsing for the lexer

use crate::lexer::{Lexer, Mode};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Where a run of string content stopped
enum Stop {
    Quote,
    Interpolation,
    Eof,
}

/// Operator names accepted after `:`, longest first
pub(crate) const OPERATOR_SYMBOLS: &[&str] = &[
    "<=>", "**", "==", "!=", "<=", ">=", "<<", "-@", "+", "-", "*", "/", "%", "<", ">", "!", "&",
    "|", "^",
];

impl Lexer {
    /// Scan a single-quoted string; only `\'` and `\\` are escapes
    pub(super) fn single_quoted(&mut self) -> Token {
        let mut value = String::new();

        loop {
            if self.is_at_end() {
                return self.error_unterminated_string();
            }
            match self.advance() {
                '\'' => break,
                '\\' if matches!(self.peek(), '\'' | '\\') => value.push(self.advance()),
                c => value.push(c),
            }
        }

        self.make_token(TokenKind::String, &value)
    }

    /// Scan a double-quoted string
    ///
    /// Without interpolation this yields a single `String` token. Otherwise it
    /// yields `StringBegin`, queues the leading content and `InterpolationStart`,
    /// and switches into interpolation mode.
    pub(super) fn double_quoted(&mut self) -> Token {
        let (text, stop, error) = self.scan_string_content();

        match stop {
            Stop::Eof => self.error_unterminated_string(),
            Stop::Quote => match error {
                Some(err) => err,
                None => self.make_token(TokenKind::String, &text),
            },
            Stop::Interpolation => {
                let begin = Token {
                    kind: TokenKind::StringBegin,
                    lexeme: "\"".to_string(),
                    span: Span::at(
                        self.start_pos,
                        self.start_pos + 1,
                        self.start_line,
                        self.start_column,
                    ),
                    spaced: self.spaced,
                };
                self.spaced = false;
                if !text.is_empty() {
                    let content = self.make_token(TokenKind::StringContent, &text);
                    self.pending.push_back(content);
                }
                let start = self.make_token(TokenKind::InterpolationStart, "#{");
                self.pending.push_back(start);
                self.modes.push(Mode::StringBody);
                self.modes.push(Mode::Interpolation);
                begin
            }
        }
    }

    /// Continue an interpolated string after a closing `}`
    pub(super) fn string_body(&mut self) -> Token {
        let (text, stop, _) = self.scan_string_content();

        let next = match stop {
            Stop::Eof => {
                self.modes.clear();
                return self.error_unterminated_string();
            }
            Stop::Quote => {
                self.modes.pop();
                self.make_token(TokenKind::StringEnd, "\"")
            }
            Stop::Interpolation => {
                self.modes.push(Mode::Interpolation);
                self.make_token(TokenKind::InterpolationStart, "#{")
            }
        };

        if text.is_empty() {
            next
        } else {
            self.pending.push_back(next);
            self.make_token(TokenKind::StringContent, &text)
        }
    }

    /// Read double-quoted content up to `"`, `#{`, or end of input
    ///
    /// Invalid escapes are reported but scanning continues to the end of the
    /// literal; the first one is returned as an error token.
    fn scan_string_content(&mut self) -> (String, Stop, Option<Token>) {
        let mut value = String::new();
        let mut error = None;

        loop {
            if self.is_at_end() {
                return (value, Stop::Eof, error);
            }

            match self.peek() {
                '"' => {
                    self.advance();
                    return (value, Stop::Quote, error);
                }
                '#' if self.peek_next() == Some('{') => {
                    self.advance();
                    self.advance();
                    return (value, Stop::Interpolation, error);
                }
                '\\' => {
                    self.advance();
                    if self.is_at_end() {
                        return (value, Stop::Eof, error);
                    }
                    let escape_char = self.advance();
                    let escaped = match escape_char {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        's' => ' ',
                        'e' => '\x1b',
                        'a' => '\x07',
                        'b' => '\x08',
                        'f' => '\x0c',
                        'v' => '\x0b',
                        '\\' | '"' | '#' | '\'' => escape_char,
                        '\n' => continue,
                        'u' => match self.unicode_escape() {
                            Some(c) => c,
                            None => {
                                let err = self.error_invalid_escape('u');
                                error.get_or_insert(err);
                                continue;
                            }
                        },
                        other => {
                            let err = self.error_invalid_escape(other);
                            error.get_or_insert(err);
                            continue;
                        }
                    };
                    value.push(escaped);
                }
                _ => value.push(self.advance()),
            }
        }
    }

    /// `\uXXXX` with exactly four hex digits
    fn unicode_escape(&mut self) -> Option<char> {
        let digits: String = self.chars.get(self.current..self.current + 4)?.iter().collect();
        let code = u32::from_str_radix(&digits, 16).ok()?;
        let c = char::from_u32(code)?;
        for _ in 0..4 {
            self.advance();
        }
        Some(c)
    }

    /// Scan a symbol literal after its `:`
    pub(super) fn symbol(&mut self) -> Token {
        let c = self.peek();

        if c.is_alphabetic() || c == '_' {
            let start = self.current;
            while !self.is_at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
                self.advance();
            }
            if matches!(self.peek(), '?' | '!') && self.peek_next() != Some('=') {
                self.advance();
            }
            let name: String = self.chars[start..self.current].iter().collect();
            return self.make_token(TokenKind::Symbol, &name);
        }

        if c == '"' {
            self.advance();
            let (text, stop, error) = self.scan_string_content();
            return match (stop, error) {
                (Stop::Quote, None) => self.make_token(TokenKind::Symbol, &text),
                (Stop::Quote, Some(err)) => err,
                (Stop::Interpolation, _) => {
                    self.error_token("Interpolation is not supported in symbol literals")
                }
                (Stop::Eof, _) => self.error_unterminated_string(),
            };
        }

        for op in OPERATOR_SYMBOLS {
            let len = op.chars().count();
            let matches = self
                .chars
                .get(self.current..self.current + len)
                .is_some_and(|window| window.iter().copied().eq(op.chars()));
            if matches {
                for _ in 0..len {
                    self.advance();
                }
                return self.make_token(TokenKind::Symbol, op);
            }
        }

        self.error_token("Unexpected character ':'")
    }

    /// Scan a number literal (integer, float, or scientific notation)
    ///
    /// Underscores between digits are separators and are dropped from the lexeme.
    pub(super) fn number(&mut self) -> Token {
        let start = self.current - 1; // -1 because we already advanced past first digit
        let mut is_float = false;

        self.digits();

        // A dot only belongs to the number when a digit follows (`1.5` vs `1.to_s`)
        if self.peek() == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.digits();
        }

        if matches!(self.peek(), 'e' | 'E') {
            let sign = matches!(self.peek_next(), Some('+') | Some('-'));
            let digit_at = if sign { self.current + 2 } else { self.current + 1 };
            if self.chars.get(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.advance();
                if sign {
                    self.advance();
                }
                self.digits();
            } else {
                self.advance();
                return self.error_token("Invalid number: exponent requires digits");
            }
        }

        let lexeme: String = self.chars[start..self.current]
            .iter()
            .filter(|c| **c != '_')
            .collect();

        if is_float {
            self.make_token(TokenKind::Float, &lexeme)
        } else if lexeme
            .parse::<u64>()
            .map_or(true, |n| n > i64::MIN.unsigned_abs())
        {
            // |i64::MIN| is let through; only a glued minus makes it valid
            self.error_token(&format!("Integer literal '{}' is out of range", lexeme))
        } else {
            self.make_token(TokenKind::Integer, &lexeme)
        }
    }

    fn digits(&mut self) {
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '_' && self.peek_next().is_some_and(|n| n.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scan an identifier, constant, or keyword
    ///
    /// Method-style names may end in `?` or `!` (`empty?`, `upcase!`), unless
    /// the suffix is really the start of `!=`.
    pub(super) fn identifier(&mut self) -> Token {
        let start = self.current - 1; // -1 because we already advanced past first char

        while !self.is_at_end() {
            let c = self.peek();
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let mut suffixed = false;
        if matches!(self.peek(), '?' | '!') && self.peek_next() != Some('=') {
            self.advance();
            suffixed = true;
        }

        let lexeme: String = self.chars[start..self.current].iter().collect();

        if !suffixed {
            if let Some(kind) = TokenKind::is_keyword(&lexeme) {
                return self.make_token(kind, &lexeme);
            }
        }

        let kind = if lexeme.starts_with(|c: char| c.is_uppercase()) {
            TokenKind::Constant
        } else {
            TokenKind::Identifier
        };

        self.make_token(kind, &lexeme)
    }
}
