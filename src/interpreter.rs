use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info, trace};
use thiserror::Error;

use crate::ast::{Expr, ExprId, ExprKind, Stmt};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::token::{Token, TokenType};
use crate::value::{Callable, NativeFn, NativeFunction, Value};

/// Non‑local exits from statement execution.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error(transparent)]
    Runtime(#[from] LoxError),

    /// Not an error: carries a `return` value up to the nearest call frame.
    #[error("Return signal with value: {0}")]
    Return(Value),
}

/// Convenient alias for statement execution results.
pub type IResult<T> = std::result::Result<T, InterpretError>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Hop counts for local variable references, filled in by the resolver.
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// An interpreter whose `print` statements write to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_ref();

        let mut interpreter = Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        };

        interpreter.define_native("clock", 0, |_args: &[Value]| {
            let millis = Utc::now().timestamp_millis();
            Ok(Value::Number(millis as f64 / 1000.0))
        });

        interpreter
    }

    /// Expose a host function as a global.
    pub fn define_native(
        &mut self,
        name: &'static str,
        arity: usize,
        func: NativeFn,
    ) {
        debug!("Defining native function '{}'", name);

        let native = NativeFunction { name, arity, func };
        self.globals
            .borrow_mut()
            .define(name, Value::Callable(Callable::Native(Rc::new(native))));
    }

    /// Record that the variable reference `id` binds `depth` scopes out.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        trace!("Local {:?} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// Hop count recorded for `id`, `None` for globals.
    pub fn local_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Runs a program.  The first runtime error aborts the batch and is
    /// returned to the caller.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        info!("Interpreting {} statements", statements.len());

        let mut outcome = Ok(());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(InterpretError::Runtime(err)) => {
                    debug!("Runtime error: {}", err);
                    outcome = Err(err);
                    break;
                }
                // Rejected by the resolver; stop quietly if it slips through.
                Err(InterpretError::Return(_)) => break,
            }
        }

        // Output printed before a runtime error must reach the sink first.
        self.out.flush()?;

        info!("Interpretation completed");
        outcome
    }

    // ───────────────────────────── statements ─────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> IResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value).map_err(LoxError::from)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, scope.into_ref())?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)?;
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function = LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment));
                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Err(InterpretError::Return(value));
            }
        }

        Ok(())
    }

    /// Run `statements` inside `scope`, restoring the current scope on every
    /// exit path.
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], scope: EnvRef) -> IResult<()> {
        let previous = std::mem::replace(&mut self.environment, scope);

        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;
        result
    }

    // ───────────────────────────── expressions ────────────────────────────

    /// Evaluates an expression in the current scope.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
                    },
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
                }
            }

            ExprKind::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }

            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            ExprKind::Variable(name) => self.look_up_variable(name, expr.id),

            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(&expr.id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            ExprKind::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call_value(callee, paren, values)
            }
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn call_value(&mut self, callee: Value, paren: &Token, arguments: Vec<Value>) -> Result<Value> {
        let Value::Callable(callable) = callee else {
            return Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            ));
        };

        if arguments.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            ));
        }

        callable.call(self, arguments, paren)
    }
}

/// Apply an arithmetic, comparison or equality operator to evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    use TokenType::*;

    match (operator.token_type, left, right) {
        (EQUAL_EQUAL, l, r) => Ok(Value::Bool(l == r)),
        (BANG_EQUAL, l, r) => Ok(Value::Bool(l != r)),

        (PLUS, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (PLUS, Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (PLUS, _, _) => Err(LoxError::runtime(
            operator,
            "Operands must be two numbers or two strings.",
        )),

        (MINUS, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (STAR, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (SLASH, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        (GREATER, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
        (GREATER_EQUAL, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
        (LESS, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
        (LESS_EQUAL, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

        (MINUS | STAR | SLASH | GREATER | GREATER_EQUAL | LESS | LESS_EQUAL, _, _) => {
            Err(LoxError::runtime(operator, "Operands must be numbers."))
        }

        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}
