//! Creation of `Expression` nodes.
//!
//! All expression nodes are created through an `AstBuilder`. Every node gets
//! a `NodeId` from one process-wide allocator, so builders never need to know
//! about each other: trees made by separate builders, or by the simplifier,
//! never share an id.

use crate::ast::*;

/// Creates `Expression` nodes with fresh `NodeId`s.
#[derive(Clone, Debug, Default)]
pub struct AstBuilder {}

impl AstBuilder {
    pub fn new() -> AstBuilder {
        AstBuilder {}
    }

    /// Create a new node with the given shape.
    pub fn expression(&mut self, kind: ExpressionKind) -> Expression {
        Expression::new(NodeId::fresh(), kind)
    }

    pub fn variable<S>(&mut self, name: S, ty: Type) -> Expression
    where
        S: Into<String>,
    {
        self.expression(ExpressionKind::Variable(Variable::new(name, ty)))
    }

    pub fn constant(&mut self, constant: Constant) -> Expression {
        self.expression(ExpressionKind::Constant(constant))
    }

    /// Create an integer literal.
    pub fn int(&mut self, value: u64, ty: Type) -> Expression {
        self.constant(Constant::new(value, ty))
    }

    /// Create a boolean literal.
    pub fn bool_(&mut self, value: bool) -> Expression {
        self.constant(Constant::bool_(value))
    }

    pub fn true_(&mut self) -> Expression {
        self.bool_(true)
    }

    pub fn false_(&mut self) -> Expression {
        self.bool_(false)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expression) -> Expression {
        self.expression(ExpressionKind::Unary(op, Box::new(operand)))
    }

    pub fn lnot(&mut self, operand: Expression) -> Expression {
        self.unary(UnaryOp::LNot, operand)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
        self.expression(ExpressionKind::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    pub fn land(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.binary(BinaryOp::LAnd, lhs, rhs)
    }

    pub fn lor(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.binary(BinaryOp::LOr, lhs, rhs)
    }

    pub fn ternary(
        &mut self,
        condition: Expression,
        then: Expression,
        else_: Expression,
    ) -> Expression {
        self.expression(ExpressionKind::Ternary(
            Box::new(condition),
            Box::new(then),
            Box::new(else_),
        ))
    }

    pub fn paren(&mut self, expr: Expression) -> Expression {
        self.expression(ExpressionKind::Paren(Box::new(expr)))
    }

    pub fn cast(&mut self, ty: Type, expr: Expression) -> Expression {
        self.expression(ExpressionKind::Cast(ty, Box::new(expr)))
    }

    pub fn call<S>(&mut self, name: S, ty: Type, args: Vec<Expression>) -> Expression
    where
        S: Into<String>,
    {
        self.expression(ExpressionKind::Call(name.into(), ty, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids() {
        let mut builder = AstBuilder::new();
        let a = builder.true_();
        let b = builder.true_();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn separate_builders_never_share_ids() {
        let mut first = AstBuilder::new();
        let x = first.variable("x", Type::int(32, true));
        let y = first.variable("y", Type::int(32, true));
        let eq = first.binary(BinaryOp::Eq, x, y);

        let mut second = AstBuilder::new();
        let z = second.variable("z", Type::int(32, true));
        let w = second.true_();

        let mut ids: Vec<NodeId> = vec![z.id(), w.id()];
        ids.push(eq.id());
        ids.extend(eq.children().iter().map(|child| child.id()));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn deserialized_ids_are_fresh() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::Bool);
        let not = builder.lnot(x);

        let json = serde_json::to_string(&not).unwrap();
        let first: Expression = serde_json::from_str(&json).unwrap();
        let second: Expression = serde_json::from_str(&json).unwrap();
        assert_eq!(first.to_string(), not.to_string());
        assert_ne!(first.id(), not.id());
        assert_ne!(first.id(), second.id());
        assert_ne!(first.children()[0].id(), second.children()[0].id());
    }
}
