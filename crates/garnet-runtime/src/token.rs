//! Token types for lexical analysis
//!
//! Defines all token types recognized by the Garnet lexer.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Token type produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token (decoded text for string pieces)
    pub lexeme: String,
    /// Source location
    pub span: Span,
    /// Whether whitespace separated this token from the previous one.
    /// The parser needs it to tell `foo (1)` from `foo(1)` and `foo -1` from `foo - 1`.
    pub spaced: bool,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            spaced: false,
        }
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal (42, 1_000)
    Integer,
    /// Float literal (3.14, 2.0e3)
    Float,
    /// String literal without interpolation ('hi', "hi\n")
    String,
    /// Opening quote of an interpolated string
    StringBegin,
    /// Literal text inside an interpolated string
    StringContent,
    /// `#{` inside a double-quoted string
    InterpolationStart,
    /// `}` closing an interpolation
    InterpolationEnd,
    /// Closing quote of an interpolated string
    StringEnd,
    /// Symbol literal (:name); lexeme is the name without the colon
    Symbol,
    /// Identifier (may end in `?` or `!`)
    Identifier,
    /// Capitalised identifier
    Constant,

    // Keywords
    Def,
    End,
    If,
    Elsif,
    Else,
    Unless,
    While,
    Until,
    Then,
    Do,
    Return,
    Break,
    Next,
    Nil,
    True,
    False,
    SelfKw,
    And,
    Or,
    Not,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<=>`
    Spaceship,
    /// `<<`
    ShiftLeft,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,

    // Assignment
    /// `=`
    Equal,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `/=`
    SlashEqual,

    // Punctuation
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// Line break (statement terminator)
    Newline,

    // Special
    /// End of file
    Eof,
    /// Lexer error
    Error,
}

impl TokenKind {
    /// Check if a string is a keyword and return its token kind
    pub fn is_keyword(s: &str) -> Option<TokenKind> {
        match s {
            "def" => Some(TokenKind::Def),
            "end" => Some(TokenKind::End),
            "if" => Some(TokenKind::If),
            "elsif" => Some(TokenKind::Elsif),
            "else" => Some(TokenKind::Else),
            "unless" => Some(TokenKind::Unless),
            "while" => Some(TokenKind::While),
            "until" => Some(TokenKind::Until),
            "then" => Some(TokenKind::Then),
            "do" => Some(TokenKind::Do),
            "return" => Some(TokenKind::Return),
            "break" => Some(TokenKind::Break),
            "next" => Some(TokenKind::Next),
            "nil" => Some(TokenKind::Nil),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "self" => Some(TokenKind::SelfKw),
            "and" => Some(TokenKind::And),
            "or" => Some(TokenKind::Or),
            "not" => Some(TokenKind::Not),
            _ => None,
        }
    }

    /// Whether this kind is a reserved word
    pub fn is_keyword_kind(&self) -> bool {
        matches!(
            self,
            TokenKind::Def
                | TokenKind::End
                | TokenKind::If
                | TokenKind::Elsif
                | TokenKind::Else
                | TokenKind::Unless
                | TokenKind::While
                | TokenKind::Until
                | TokenKind::Then
                | TokenKind::Do
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Next
                | TokenKind::Nil
                | TokenKind::True
                | TokenKind::False
                | TokenKind::SelfKw
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
        )
    }

    /// Get the string representation of this token kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::StringBegin => "string begin",
            TokenKind::StringContent => "string content",
            TokenKind::InterpolationStart => "#{",
            TokenKind::InterpolationEnd => "}",
            TokenKind::StringEnd => "string end",
            TokenKind::Symbol => "symbol",
            TokenKind::Identifier => "identifier",
            TokenKind::Constant => "constant",
            TokenKind::Def => "def",
            TokenKind::End => "end",
            TokenKind::If => "if",
            TokenKind::Elsif => "elsif",
            TokenKind::Else => "else",
            TokenKind::Unless => "unless",
            TokenKind::While => "while",
            TokenKind::Until => "until",
            TokenKind::Then => "then",
            TokenKind::Do => "do",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Next => "next",
            TokenKind::Nil => "nil",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::SelfKw => "self",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::StarStar => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Spaceship => "<=>",
            TokenKind::ShiftLeft => "<<",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Equal => "=",
            TokenKind::PlusEqual => "+=",
            TokenKind::MinusEqual => "-=",
            TokenKind::StarEqual => "*=",
            TokenKind::SlashEqual => "/=",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "error",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::is_keyword("def"), Some(TokenKind::Def));
        assert_eq!(TokenKind::is_keyword("self"), Some(TokenKind::SelfKw));
        assert_eq!(TokenKind::is_keyword("puts"), None);
    }

    #[test]
    fn test_keyword_kind_matches_lookup() {
        for word in ["def", "end", "elsif", "until", "not", "nil"] {
            let kind = TokenKind::is_keyword(word).unwrap();
            assert!(kind.is_keyword_kind());
            assert_eq!(kind.as_str(), word);
        }
        assert!(!TokenKind::Identifier.is_keyword_kind());
    }
}
