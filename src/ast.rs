//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Expressions carry an [`ExprId`] so that the resolver can annotate a
//! particular *occurrence* of a variable, independent of how the subtree looks.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;
use crate::value::Value;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Stable identity of an expression node.
///
/// Ids come from a process‑wide counter, so trees parsed at different times
/// (e.g. successive REPL lines feeding one interpreter) never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(Value),

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// Prefix `!` or `-`.
    Unary { operator: Token, right: Box<Expr> },

    /// Arithmetic, comparison and equality operators.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Variable(Token),

    Assign { name: Token, value: Box<Expr> },

    Call {
        callee: Box<Expr>,
        /// The closing `)`, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },
}

impl Expr {
    /// Wrap `kind` in a node with a fresh identity.
    pub fn new(kind: ExprKind) -> Self {
        Self {
            id: ExprId::fresh(),
            kind,
        }
    }

    pub fn literal(value: Value) -> Self {
        Self::new(ExprKind::Literal(value))
    }

    pub fn grouping(inner: Expr) -> Self {
        Self::new(ExprKind::Grouping(Box::new(inner)))
    }

    pub fn unary(operator: Token, right: Expr) -> Self {
        Self::new(ExprKind::Unary {
            operator,
            right: Box::new(right),
        })
    }

    pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn logical(left: Expr, operator: Token, right: Expr) -> Self {
        Self::new(ExprKind::Logical {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn variable(name: Token) -> Self {
        Self::new(ExprKind::Variable(name))
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Self::new(ExprKind::Assign {
            name,
            value: Box::new(value),
        })
    }

    pub fn call(callee: Expr, paren: Token, arguments: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }
}

/// A function declaration.  Shared between the statement tree and every
/// function object created from it.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens.
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// Also the target of `for` desugaring.
    While { condition: Expr, body: Box<Stmt> },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword token.
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },
}
