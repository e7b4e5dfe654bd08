//! One interpreter session: scan → parse → resolve → interpret, with every
//! diagnostic routed to a single [`Reporter`].

use std::io::Write;

use log::{debug, info};

use crate::error::{LoxError, Reporter};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::value::Value;

/// How a call to [`Lox::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Scan, parse or resolve errors; nothing was executed.
    CompileError,
    /// Execution started and was aborted by a runtime error.
    RuntimeError,
}

impl RunStatus {
    /// Conventional process exit code (sysexits `EX_DATAERR` / `EX_SOFTWARE`).
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::CompileError => 65,
            RunStatus::RuntimeError => 70,
        }
    }
}

/// Globals and resolved locals persist across [`Lox::run`] calls, which is
/// what the REPL relies on.
pub struct Lox {
    interpreter: Interpreter,
    reporter: Reporter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// A session printing to standard output.
    pub fn new() -> Self {
        Self::from_interpreter(Interpreter::new())
    }

    /// A session printing to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::from_interpreter(Interpreter::with_output(out))
    }

    fn from_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            reporter: Reporter::new(),
        }
    }

    /// Run a complete program.  Diagnostics are left in the reporter.
    pub fn run(&mut self, source: &str) -> RunStatus {
        self.reporter.reset();

        let tokens = scan_tokens(source, &mut self.reporter);
        let statements = Parser::new(&tokens, &mut self.reporter).parse();

        if self.reporter.had_error() {
            info!("Parse phase failed; skipping execution");
            return RunStatus::CompileError;
        }

        Resolver::new(&mut self.interpreter, &mut self.reporter).resolve(&statements);

        if self.reporter.had_error() {
            info!("Resolve phase failed; skipping execution");
            return RunStatus::CompileError;
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => RunStatus::Completed,
            Err(err) => {
                debug!("Runtime error: {}", err);
                self.reporter.report(err);
                RunStatus::RuntimeError
            }
        }
    }

    /// Parse `source` as a single expression and evaluate it against globals.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, RunStatus> {
        self.reporter.reset();

        let tokens = scan_tokens(source, &mut self.reporter);
        let expr = Parser::new(&tokens, &mut self.reporter).parse_expression();

        let expr = match expr {
            Some(expr) if !self.reporter.had_error() => expr,
            _ => return Err(RunStatus::CompileError),
        };

        self.interpreter.evaluate(&expr).map_err(|err| {
            self.reporter.report(err);
            RunStatus::RuntimeError
        })
    }

    /// Drain diagnostics collected so far, in the order they were reported.
    pub fn take_diagnostics(&mut self) -> Vec<LoxError> {
        self.reporter.take()
    }
}
