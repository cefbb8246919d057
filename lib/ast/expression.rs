use crate::ast::*;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one `Expression` node.
///
/// Ids are allocated from a single counter shared by the whole process, so no
/// two nodes created by any `AstBuilder` share an id. A deserialized id is
/// discarded and replaced by a fresh one. Two nodes with the same id always
/// have the same content.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

impl NodeId {
    /// Allocate an id never handed out before in this process.
    pub(crate) fn fresh() -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn index(&self) -> u64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<NodeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer)?;
        Ok(NodeId::fresh())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum UnaryOp {
    /// Logical not, `!`.
    LNot,
    /// Bitwise not, `~`.
    Not,
    /// Arithmetic negation, `-`.
    Neg,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match *self {
            UnaryOp::LNot => "!",
            UnaryOp::Not => "~",
            UnaryOp::Neg => "-",
        }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LAnd,
    LOr,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match *self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
        }
    }

    /// Returns true for `==`, `!=`, `<`, `<=`, `>` and `>=`.
    pub fn is_comparison(&self) -> bool {
        matches!(
            *self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
        )
    }

    /// Returns true for `&&` and `||`.
    pub fn is_logical(&self) -> bool {
        matches!(*self, BinaryOp::LAnd | BinaryOp::LOr)
    }
}

/// The shape of an `Expression` node.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ExpressionKind {
    Variable(Variable),
    Constant(Constant),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
    /// `condition ? then : else`
    Ternary(Box<Expression>, Box<Expression>, Box<Expression>),
    Paren(Box<Expression>),
    Cast(Type, Box<Expression>),
    /// A call to an opaque function, with the function's return type.
    Call(String, Type, Vec<Expression>),
}

/// An expression node in the AST.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Expression {
    id: NodeId,
    kind: ExpressionKind,
}

impl Expression {
    pub(crate) fn new(id: NodeId, kind: ExpressionKind) -> Expression {
        Expression { id, kind }
    }

    /// The id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The shape of this node.
    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    /// Consume this node, returning its shape.
    pub fn into_kind(self) -> ExpressionKind {
        self.kind
    }

    /// The type this expression evaluates to.
    pub fn ty(&self) -> Type {
        match self.kind {
            ExpressionKind::Variable(ref variable) => variable.ty(),
            ExpressionKind::Constant(ref constant) => constant.ty(),
            ExpressionKind::Unary(UnaryOp::LNot, _) => Type::Bool,
            ExpressionKind::Unary(_, ref operand) => operand.ty(),
            ExpressionKind::Binary(op, ref lhs, _) => {
                if op.is_comparison() || op.is_logical() {
                    Type::Bool
                } else {
                    lhs.ty()
                }
            }
            ExpressionKind::Ternary(_, ref then, _) => then.ty(),
            ExpressionKind::Paren(ref expr) => expr.ty(),
            ExpressionKind::Cast(ty, _) => ty,
            ExpressionKind::Call(_, ty, _) => ty,
        }
    }

    /// If this expression is the literal `true` or `false`, get its value.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ExpressionKind::Constant(ref constant) => constant.as_bool(),
            _ => None,
        }
    }

    /// Returns true if this expression is the literal `true`.
    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(true)
    }

    /// Returns true if this expression is the literal `false`.
    pub fn is_false(&self) -> bool {
        self.as_bool() == Some(false)
    }

    /// The immediate children of this expression, left to right.
    pub fn children(&self) -> Vec<&Expression> {
        match self.kind {
            ExpressionKind::Variable(_) | ExpressionKind::Constant(_) => Vec::new(),
            ExpressionKind::Unary(_, ref operand) => vec![operand],
            ExpressionKind::Binary(_, ref lhs, ref rhs) => vec![lhs, rhs],
            ExpressionKind::Ternary(ref condition, ref then, ref else_) => {
                vec![condition, then, else_]
            }
            ExpressionKind::Paren(ref expr) | ExpressionKind::Cast(_, ref expr) => vec![expr],
            ExpressionKind::Call(_, _, ref args) => args.iter().collect(),
        }
    }

    /// Returns all variables used in the expression
    pub fn variables(&self) -> Vec<&Variable> {
        match self.kind {
            ExpressionKind::Variable(ref variable) => vec![variable],
            _ => self
                .children()
                .into_iter()
                .flat_map(|child| child.variables())
                .collect(),
        }
    }

    /// Returns true if this expression contains a call anywhere.
    ///
    /// Calls may have side effects, so an expression which contains one may
    /// not be discarded.
    pub fn has_call(&self) -> bool {
        match self.kind {
            ExpressionKind::Call(..) => true,
            _ => self.children().into_iter().any(|child| child.has_call()),
        }
    }

    /// The number of nodes in this tree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }
}

// An operand of an operator. Binary and ternary operands are printed in
// parentheses, which the tree may not hold as `Paren` nodes.
struct Operand<'e>(&'e Expression);

impl<'e> fmt::Display for Operand<'e> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.kind {
            ExpressionKind::Binary(..) | ExpressionKind::Ternary(..) => write!(f, "({})", self.0),
            _ => self.0.fmt(f),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ExpressionKind::Variable(ref v) => v.fmt(f),
            ExpressionKind::Constant(ref c) => c.fmt(f),
            ExpressionKind::Unary(op, ref operand) => {
                write!(f, "{}{}", op.symbol(), Operand(operand))
            }
            ExpressionKind::Binary(op, ref lhs, ref rhs) => {
                write!(f, "{} {} {}", Operand(lhs), op.symbol(), Operand(rhs))
            }
            ExpressionKind::Ternary(ref condition, ref then, ref else_) => write!(
                f,
                "{} ? {} : {}",
                Operand(condition),
                Operand(then),
                Operand(else_)
            ),
            ExpressionKind::Paren(ref expr) => write!(f, "({})", expr),
            ExpressionKind::Cast(ty, ref expr) => write!(f, "({}){}", ty, Operand(expr)),
            ExpressionKind::Call(ref name, _, ref args) => write!(
                f,
                "{}({})",
                name,
                args.iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i32_() -> Type {
        Type::int(32, true)
    }

    #[test]
    fn types() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i32_());
        let one = builder.int(1, i32_());
        let sum = builder.binary(BinaryOp::Add, x.clone(), one.clone());
        assert_eq!(sum.ty(), i32_());

        let cmp = builder.binary(BinaryOp::Lt, x, one);
        assert_eq!(cmp.ty(), Type::Bool);

        let not = builder.lnot(sum.clone());
        assert_eq!(not.ty(), Type::Bool);

        let cast = builder.cast(Type::int(8, false), sum);
        assert_eq!(cast.ty(), Type::int(8, false));
    }

    #[test]
    fn display() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i32_());
        let zero = builder.int(0, i32_());
        let gt = builder.binary(BinaryOp::Gt, x.clone(), zero);
        let paren = builder.paren(gt);
        let not = builder.lnot(paren);
        assert_eq!(not.to_string(), "!(x > 0)");

        let call = builder.call("f", i32_(), vec![x]);
        assert_eq!(call.to_string(), "f(x)");
        assert!(call.has_call());
        assert!(!not.has_call());
    }

    #[test]
    fn compound_operands_are_parenthesized() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i32_());
        let zero = builder.int(0, i32_());
        let gt = builder.binary(BinaryOp::Gt, x.clone(), zero.clone());
        let not = builder.lnot(gt.clone());
        assert_eq!(not.to_string(), "!(x > 0)");

        let y = builder.variable("y", Type::Bool);
        let and = builder.land(gt.clone(), y.clone());
        assert_eq!(and.to_string(), "(x > 0) && y");

        let select = builder.ternary(y, x.clone(), zero);
        let cast = builder.cast(Type::int(8, true), select);
        assert_eq!(cast.to_string(), "(int8_t)(y ? x : 0)");

        // Existing parentheses are not doubled.
        let paren = builder.paren(gt);
        let not = builder.lnot(paren);
        assert_eq!(not.to_string(), "!(x > 0)");

        let neg = builder.unary(UnaryOp::Neg, x);
        let not = builder.lnot(neg);
        assert_eq!(not.to_string(), "!-x");
    }

    #[test]
    fn variables_and_counts() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i32_());
        let y = builder.variable("y", i32_());
        let eq = builder.binary(BinaryOp::Eq, x, y);
        let names: Vec<&str> = eq.variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(eq.node_count(), 3);
    }
}
