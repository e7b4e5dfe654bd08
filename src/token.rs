use log::trace;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Lox scanner.
///
/// Decoded literal payloads do not live here; they are carried by
/// [`Token::literal`] so that kinds stay `Copy` and compare by variant.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal
    STRING,

    /// A numeric literal
    NUMBER,

    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    /// End‑of‑file marker
    EOF,
}

/// Decoded value of a `NUMBER` or `STRING` token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Number(f64),

    /// Contents between the quotes, no escape processing.
    Str(String),
}

/// A scanned token, including its type, the original lexeme, the decoded
/// literal (numbers and strings only) and the line number where it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: String,

    /// Decoded value for `NUMBER` and `STRING`, `None` otherwise.
    pub literal: Option<Literal>,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        lexeme: impl Into<String>,
        literal: Option<Literal>,
        line: usize,
    ) -> Self {
        let lexeme: String = lexeme.into();

        trace!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type,
            lexeme,
            line
        );

        Self {
            token_type,
            lexeme,
            literal,
            line,
        }
    }

    /// Shorthand for a token without a literal payload.
    pub fn simple(token_type: TokenType, lexeme: impl Into<String>, line: usize) -> Self {
        Self::new(token_type, lexeme, None, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Variant names double as the upper-case display form.
        write!(f, "{:?} {} ", self.token_type, self.lexeme)?;

        match &self.literal {
            Some(Literal::Str(s)) => write!(f, "{}", s),

            // 3 → "3.0", 3.14 → "3.14"
            Some(Literal::Number(n)) if n.fract() == 0.0 && n.abs() < 1e15 => {
                let mut buf = itoa::Buffer::new();
                write!(f, "{}.0", buf.format(*n as i64))
            }

            Some(Literal::Number(n)) if n.fract() == 0.0 => write!(f, "{:.1}", n),

            Some(Literal::Number(n)) => write!(f, "{}", n),

            None => write!(f, "null"),
        }
    }
}
