use crate::ast::{Expr, ExprKind, Stmt};
use crate::value::{format_number, Value};

/// Renders trees in parenthesised prefix form, e.g. `(+ 1 (* 2 3))`.
pub struct Ast;

impl Ast {
    pub fn print(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Binary {
                left,
                operator,
                right,
            }
            | ExprKind::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            ExprKind::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            ExprKind::Literal(value) => match value {
                // Literals keep a visible fraction: `1.0`, `2.5`.
                Value::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                    format!("{}.0", format_number(*n))
                }
                other => other.to_string(),
            },

            ExprKind::Grouping(inner) => format!("(group {})", self.print(inner)),

            ExprKind::Variable(name) => name.lexeme.clone(),

            ExprKind::Assign { name, value } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            ExprKind::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print(callee));
                for argument in arguments {
                    out.push(' ');
                    out.push_str(&self.print(argument));
                }
                out.push(')');
                out
            }
        }
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", self.print(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(expr) => format!("(var {} {})", name.lexeme, self.print(expr)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut out = String::from("(block");
                for s in statements {
                    out.push(' ');
                    out.push_str(&self.print_stmt(s));
                }
                out.push(')');
                out
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print(condition),
                self.print_stmt(body)
            ),

            Stmt::Function(declaration) => {
                let params: Vec<&str> = declaration
                    .params
                    .iter()
                    .map(|p| p.lexeme.as_str())
                    .collect();

                let mut out = format!("(fun {} ({})", declaration.name.lexeme, params.join(" "));
                for s in &declaration.body {
                    out.push(' ');
                    out.push_str(&self.print_stmt(s));
                }
                out.push(')');
                out
            }

            Stmt::Return { value, .. } => match value {
                Some(expr) => format!("(return {})", self.print(expr)),
                None => "(return)".to_string(),
            },
        }
    }
}
