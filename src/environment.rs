use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Closures and pending calls keep scopes alive.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: a name → value map plus a link to the enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// A root (global) scope.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap in the shared handle used everywhere else.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name`, silently replacing any existing binding in this scope.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define {} = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up along the chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Rebind an existing `name` along the chain.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from exactly the scope `distance` hops out.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        let scope = Self::ancestor(env, distance, name)?;
        let value = scope.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| undefined(name))
    }

    /// Write `name` in exactly the scope `distance` hops out.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let scope = Self::ancestor(env, distance, name)?;
        scope.borrow_mut().values.insert(name.lexeme.clone(), value);

        Ok(())
    }

    fn ancestor(env: &EnvRef, distance: usize, name: &Token) -> Result<EnvRef> {
        let mut scope = Rc::clone(env);

        for _ in 0..distance {
            let next = scope.borrow().enclosing.clone();

            // Only reachable if the resolver and the runtime disagree.
            scope = next.ok_or_else(|| undefined(name))?;
        }

        Ok(scope)
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::simple(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn lookup_walks_enclosing_chain() {
        let globals = Environment::new().into_ref();
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner = Environment::with_enclosing(globals.clone()).into_ref();
        assert_eq!(inner.borrow().get(&ident("a")).unwrap(), Value::Number(1.0));

        inner
            .borrow_mut()
            .assign(&ident("a"), Value::Number(2.0))
            .unwrap();
        assert_eq!(globals.borrow().get(&ident("a")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn undefined_names_are_runtime_errors() {
        let env = Environment::new();
        let err = env.get(&ident("missing")).unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable 'missing'.\n[line 1]");

        let mut env = Environment::new();
        assert!(env.assign(&ident("missing"), Value::Nil).is_err());
    }

    #[test]
    fn redefinition_overwrites() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.define("x", Value::from("two"));
        assert_eq!(env.get(&ident("x")).unwrap(), Value::from("two"));
    }

    #[test]
    fn distance_addressing_skips_shadowing_scopes() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("x", Value::from("outer"));
        let inner = Environment::with_enclosing(outer.clone()).into_ref();
        inner.borrow_mut().define("x", Value::from("inner"));

        assert_eq!(
            Environment::get_at(&inner, 1, &ident("x")).unwrap(),
            Value::from("outer")
        );

        Environment::assign_at(&inner, 1, &ident("x"), Value::Nil).unwrap();
        assert_eq!(outer.borrow().get(&ident("x")).unwrap(), Value::Nil);
        assert_eq!(
            Environment::get_at(&inner, 0, &ident("x")).unwrap(),
            Value::from("inner")
        );
    }
}
