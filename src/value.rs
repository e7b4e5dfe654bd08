use std::fmt;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::interpreter::Interpreter;
use crate::token::Token;

/// Signature of a host function exposed to Lox code.
pub type NativeFn = fn(&[Value]) -> std::result::Result<Value, String>;

/// A built‑in function such as `clock`.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({}/{})", self.name, self.arity)
    }
}

/// Anything that can appear on the left of a call expression.
#[derive(Debug, Clone)]
pub enum Callable {
    Function(Rc<LoxFunction>),
    Native(Rc<NativeFunction>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Function(function) => function.arity(),
            Callable::Native(native) => native.arity,
        }
    }

    /// Invoke with already‑evaluated arguments.  Arity is checked by the caller.
    pub(crate) fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        match self {
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Native(native) => {
                (native.func)(&arguments).map_err(|msg| LoxError::runtime(paren, msg))
            }
        }
    }
}

impl PartialEq for Callable {
    /// Callables compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Dynamically‑typed runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Callable(Callable),
}

impl Value {
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Render a number the way `print` shows it: integral values without `.0`,
/// everything else in shortest round‑trip form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n.fract() == 0.0 {
        if n.abs() < 1e15 && !(n == 0.0 && n.is_sign_negative()) {
            let mut buf = itoa::Buffer::new();
            buf.format(n as i64).to_owned()
        } else {
            format!("{:.0}", n)
        }
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => write!(f, "{}", format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::Callable(Callable::Function(function)) => {
                write!(f, "<fn {}>", function.name())
            }

            Value::Callable(Callable::Native(_)) => write!(f, "<native fn>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-12.0).to_string(), "-12");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Number(-0.0).to_string(), "-0");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::from("").is_truthy());
    }

    #[test]
    fn equality_is_by_kind_and_content() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_ne!(Value::Number(1.0), Value::from("1"));
    }

    #[test]
    fn number_equality_follows_ieee() {
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
    }

    #[test]
    fn natives_compare_by_identity() {
        fn zero(_: &[Value]) -> std::result::Result<Value, String> {
            Ok(Value::Number(0.0))
        }

        let make = || {
            Rc::new(NativeFunction {
                name: "zero",
                arity: 0,
                func: zero,
            })
        };
        let a = make();

        let left = Value::Callable(Callable::Native(a.clone()));
        assert_eq!(left, Value::Callable(Callable::Native(a)));
        assert_ne!(left, Value::Callable(Callable::Native(make())));
        assert_eq!(left.to_string(), "<native fn>");
    }
}
