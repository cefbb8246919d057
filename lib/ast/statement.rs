use crate::ast::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A statement in the AST.
///
/// `If`, `While` and `Do` are control statements, and each holds exactly one
/// condition.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Statement {
    Compound(Vec<Statement>),
    If {
        condition: Expression,
        then: Box<Statement>,
        else_: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    Do {
        body: Box<Statement>,
        condition: Expression,
    },
    Expr(Expression),
    Return(Option<Expression>),
    Break,
    Continue,
}

impl Statement {
    pub fn compound(statements: Vec<Statement>) -> Statement {
        Statement::Compound(statements)
    }

    pub fn if_(condition: Expression, then: Statement, else_: Option<Statement>) -> Statement {
        Statement::If {
            condition,
            then: Box::new(then),
            else_: else_.map(Box::new),
        }
    }

    pub fn while_(condition: Expression, body: Statement) -> Statement {
        Statement::While {
            condition,
            body: Box::new(body),
        }
    }

    pub fn do_(body: Statement, condition: Expression) -> Statement {
        Statement::Do {
            body: Box::new(body),
            condition,
        }
    }

    pub fn expr(expression: Expression) -> Statement {
        Statement::Expr(expression)
    }

    pub fn return_(expression: Option<Expression>) -> Statement {
        Statement::Return(expression)
    }

    /// Returns true for `If`, `While` and `Do`.
    pub fn is_control(&self) -> bool {
        matches!(
            *self,
            Statement::If { .. } | Statement::While { .. } | Statement::Do { .. }
        )
    }

    /// Retrieve the condition of a control statement.
    pub fn condition(&self) -> Option<&Expression> {
        match *self {
            Statement::If { ref condition, .. }
            | Statement::While { ref condition, .. }
            | Statement::Do { ref condition, .. } => Some(condition),
            _ => None,
        }
    }

    /// Retrieve a mutable reference to the condition of a control statement.
    pub fn condition_mut(&mut self) -> Option<&mut Expression> {
        match *self {
            Statement::If {
                ref mut condition, ..
            }
            | Statement::While {
                ref mut condition, ..
            }
            | Statement::Do {
                ref mut condition, ..
            } => Some(condition),
            _ => None,
        }
    }

    /// A short name for the kind of this statement.
    pub fn kind_name(&self) -> &'static str {
        match *self {
            Statement::Compound(_) => "compound",
            Statement::If { .. } => "if",
            Statement::While { .. } => "while",
            Statement::Do { .. } => "do",
            Statement::Expr(_) => "expression",
            Statement::Return(_) => "return",
            Statement::Break => "break",
            Statement::Continue => "continue",
        }
    }

    /// Every expression held directly or indirectly by this statement, in
    /// source order.
    pub fn expressions(&self) -> Vec<&Expression> {
        let mut expressions = Vec::new();
        match *self {
            Statement::Compound(ref statements) => {
                for statement in statements {
                    expressions.append(&mut statement.expressions());
                }
            }
            Statement::If {
                ref condition,
                ref then,
                ref else_,
            } => {
                expressions.push(condition);
                expressions.append(&mut then.expressions());
                if let Some(ref else_) = *else_ {
                    expressions.append(&mut else_.expressions());
                }
            }
            Statement::While {
                ref condition,
                ref body,
            } => {
                expressions.push(condition);
                expressions.append(&mut body.expressions());
            }
            Statement::Do {
                ref body,
                ref condition,
            } => {
                expressions.append(&mut body.expressions());
                expressions.push(condition);
            }
            Statement::Expr(ref expression) | Statement::Return(Some(ref expression)) => {
                expressions.push(expression)
            }
            Statement::Return(None) | Statement::Break | Statement::Continue => {}
        }
        expressions
    }

    fn fmt_indent(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match *self {
            Statement::Compound(ref statements) => {
                writeln!(f, "{}{{", indent)?;
                for statement in statements {
                    statement.fmt_indent(f, depth + 1)?;
                }
                writeln!(f, "{}}}", indent)
            }
            Statement::If {
                ref condition,
                ref then,
                ref else_,
            } => {
                writeln!(f, "{}if ({})", indent, condition)?;
                then.fmt_indent(f, depth)?;
                if let Some(ref else_) = *else_ {
                    writeln!(f, "{}else", indent)?;
                    else_.fmt_indent(f, depth)?;
                }
                Ok(())
            }
            Statement::While {
                ref condition,
                ref body,
            } => {
                writeln!(f, "{}while ({})", indent, condition)?;
                body.fmt_indent(f, depth)
            }
            Statement::Do {
                ref body,
                ref condition,
            } => {
                writeln!(f, "{}do", indent)?;
                body.fmt_indent(f, depth)?;
                writeln!(f, "{}while ({});", indent, condition)
            }
            Statement::Expr(ref expression) => writeln!(f, "{}{};", indent, expression),
            Statement::Return(Some(ref expression)) => {
                writeln!(f, "{}return {};", indent, expression)
            }
            Statement::Return(None) => writeln!(f, "{}return;", indent),
            Statement::Break => writeln!(f, "{}break;", indent),
            Statement::Continue => writeln!(f, "{}continue;", indent),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indent(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_slots() {
        let mut builder = AstBuilder::new();
        let c = builder.true_();
        let mut loop_ = Statement::while_(c, Statement::Break);
        assert!(loop_.is_control());
        assert!(loop_.condition().unwrap().is_true());

        *loop_.condition_mut().unwrap() = builder.false_();
        assert!(loop_.condition().unwrap().is_false());

        let mut ret = Statement::return_(None);
        assert!(ret.condition_mut().is_none());
    }

    #[test]
    fn display() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::int(32, true));
        let statement = Statement::if_(
            x.clone(),
            Statement::compound(vec![Statement::expr(x)]),
            Some(Statement::Break),
        );
        assert_eq!(statement.to_string(), "if (x)\n{\n  x;\n}\nelse\nbreak;\n");
    }
}
