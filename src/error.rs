//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here.  Compile‑time
//! diagnostics are collected by a [`Reporter`] so that every pass can keep going
//! after a problem; runtime errors unwind the evaluator and are reported once.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::{debug, info};

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is either empty, ` at end`
    /// or ` at '<lexeme>'`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        location: String,
    },

    /// Static‑analysis failure (self‑initialisation, duplicate local,
    /// top‑level return).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error, tagged with the line of the faulting token.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Renders the ` at ...` part of a diagnostic for `token`.
fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**; the location is taken from the
    /// offending token.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Resolve error: line={}, msg={}",
            token.line, message
        );

        LoxError::Resolve {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Side‑channel error sink shared by the scanner, parser and resolver.
///
/// Reporting never aborts a pass; callers inspect [`Reporter::had_error`]
/// after parsing and resolution and must not execute when it is set.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<LoxError>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and raise the matching flag.
    pub fn report(&mut self, err: LoxError) {
        debug!("Reported: {}", err);

        if let LoxError::Runtime { .. } = err {
            self.had_runtime_error = true;
        } else {
            self.had_error = true;
        }

        self.diagnostics.push(err);
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Diagnostics recorded since the last [`Reporter::take`].
    pub fn diagnostics(&self) -> &[LoxError] {
        &self.diagnostics
    }

    /// Drain recorded diagnostics, leaving the flags untouched.
    pub fn take(&mut self) -> Vec<LoxError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear both flags; used between REPL lines.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_compile_time_locations() {
        let ident = Token::simple(TokenType::IDENTIFIER, "x", 3);
        let eof = Token::simple(TokenType::EOF, "", 7);

        assert_eq!(
            LoxError::parse(&ident, "Expect ';' after value.").to_string(),
            "[line 3] Error at 'x': Expect ';' after value."
        );
        assert_eq!(
            LoxError::parse(&eof, "Expect expression.").to_string(),
            "[line 7] Error at end: Expect expression."
        );
        assert_eq!(
            LoxError::lex(2, "Unexpected character.").to_string(),
            "[line 2] Error: Unexpected character."
        );
    }

    #[test]
    fn formats_runtime_error_with_trailing_line() {
        let plus = Token::simple(TokenType::PLUS, "+", 4);
        let err = LoxError::runtime(&plus, "Operands must be numbers.");

        assert_eq!(err.to_string(), "Operands must be numbers.\n[line 4]");
    }

    #[test]
    fn reporter_tracks_flags_separately() {
        let mut reporter = Reporter::new();
        let tok = Token::simple(TokenType::MINUS, "-", 1);

        reporter.report(LoxError::lex(1, "Unterminated string."));
        assert!(reporter.had_error());
        assert!(!reporter.had_runtime_error());

        reporter.report(LoxError::runtime(&tok, "Operand must be a number."));
        assert!(reporter.had_runtime_error());
        assert_eq!(reporter.take().len(), 2);
        assert!(reporter.diagnostics().is_empty());

        reporter.reset();
        assert!(!reporter.had_error());
    }
}
