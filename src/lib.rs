//! A tree‑walking interpreter for **Lox**: scanner, recursive‑descent parser,
//! static resolver and evaluator over a chain of lexical environments.
//!
//! ```rust
//! use rox::lox::{Lox, RunStatus};
//! use rox::output::SharedBuffer;
//!
//! let out = SharedBuffer::new();
//! let mut lox = Lox::with_output(Box::new(out.clone()));
//!
//! assert_eq!(lox.run("print 1 + 2 * 3;"), RunStatus::Completed);
//! assert_eq!(out.contents(), "7\n");
//! ```

pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod lox;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;
