use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::{EnvRef, Environment};
use crate::error::Result;
use crate::interpreter::{InterpretError, Interpreter};
use crate::value::Value;

/// A user‑defined function: its declaration plus the scope it closed over.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef) -> Self {
        Self {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Bind `arguments` in a fresh scope under the closure and run the body.
    /// A `return` anywhere inside ends the call with its value; falling off
    /// the end yields `nil`.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let mut scope = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            scope.define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, scope.into_ref()) {
            Ok(()) => Ok(Value::Nil),
            Err(InterpretError::Return(value)) => {
                debug!("Function '{}' returned: {}", self.name(), value);
                Ok(value)
            }
            Err(InterpretError::Runtime(err)) => Err(err),
        }
    }
}

impl fmt::Debug for LoxFunction {
    // The closure may contain this very function; never print it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
