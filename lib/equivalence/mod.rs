//! Structural hashing and semantic equality of expressions.
//!
//! Two expressions are *semantically equal* when they have the same shape
//! once source-irrelevant wrapping is ignored. Parenthesis, and casts to the
//! type an expression already has, are transparent. Everything else must
//! match exactly: operator kinds, operand order, literal values and types,
//! and variables.
//!
//! Semantic equality is not logical equivalence. `a && b` and `b && a` are
//! logically equivalent, but are not semantically equal.
//!
//! The structural hash of an expression depends only on its content, never on
//! node ids or addresses, so independently built trees of the same shape hash
//! identically. Semantically equal expressions always hash equal. Expressions
//! with equal hashes must still be compared with `is_equivalent` before being
//! treated as interchangeable.

use crate::ast::{Expression, ExpressionKind, NodeId};
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};

/// Skip parenthesis and no-op casts.
pub fn strip_transparent(expression: &Expression) -> &Expression {
    let mut expression = expression;
    loop {
        match *expression.kind() {
            ExpressionKind::Paren(ref inner) => expression = &**inner,
            ExpressionKind::Cast(ty, ref inner) if inner.ty() == ty => expression = &**inner,
            _ => return expression,
        }
    }
}

/// Decide whether two expressions are semantically equal.
pub fn is_equivalent(lhs: &Expression, rhs: &Expression) -> bool {
    let lhs = strip_transparent(lhs);
    let rhs = strip_transparent(rhs);

    match (lhs.kind(), rhs.kind()) {
        (ExpressionKind::Variable(l), ExpressionKind::Variable(r)) => l == r,
        (ExpressionKind::Constant(l), ExpressionKind::Constant(r)) => l == r,
        (ExpressionKind::Unary(lop, l), ExpressionKind::Unary(rop, r)) => {
            lop == rop && is_equivalent(l, r)
        }
        (ExpressionKind::Binary(lop, ll, lr), ExpressionKind::Binary(rop, rl, rr)) => {
            lop == rop && is_equivalent(ll, rl) && is_equivalent(lr, rr)
        }
        (ExpressionKind::Ternary(lc, lt, le), ExpressionKind::Ternary(rc, rt, re)) => {
            is_equivalent(lc, rc) && is_equivalent(lt, rt) && is_equivalent(le, re)
        }
        (ExpressionKind::Cast(lty, l), ExpressionKind::Cast(rty, r)) => {
            lty == rty && is_equivalent(l, r)
        }
        (ExpressionKind::Call(lname, lty, largs), ExpressionKind::Call(rname, rty, rargs)) => {
            lname == rname
                && lty == rty
                && largs.len() == rargs.len()
                && largs
                    .iter()
                    .zip(rargs.iter())
                    .all(|(l, r)| is_equivalent(l, r))
        }
        _ => false,
    }
}

/// Compute the structural hash of an expression, without memoization.
pub fn structural_hash(expression: &Expression) -> u64 {
    EquivalenceEngine::new().hash(expression)
}

/// Structural hashing, memoized per node, and semantic equality.
///
/// Node ids identify node content, so a hash is computed at most once per
/// node id for the lifetime of the engine.
#[derive(Clone, Debug, Default)]
pub struct EquivalenceEngine {
    hashes: FxHashMap<NodeId, u64>,
}

impl EquivalenceEngine {
    pub fn new() -> EquivalenceEngine {
        EquivalenceEngine {
            hashes: FxHashMap::default(),
        }
    }

    /// Get the structural hash of an expression.
    pub fn hash(&mut self, expression: &Expression) -> u64 {
        if let Some(hash) = self.hashes.get(&expression.id()) {
            return *hash;
        }
        let hash = self.compute(expression);
        self.hashes.insert(expression.id(), hash);
        hash
    }

    /// Decide whether two expressions are semantically equal.
    ///
    /// When both hashes are already known and differ, the expressions are
    /// known to differ without a walk of either tree.
    pub fn equivalent(&self, lhs: &Expression, rhs: &Expression) -> bool {
        if let (Some(l), Some(r)) = (self.hashes.get(&lhs.id()), self.hashes.get(&rhs.id())) {
            if l != r {
                return false;
            }
        }
        is_equivalent(lhs, rhs)
    }

    /// The number of nodes with a memoized hash.
    pub fn memoized(&self) -> usize {
        self.hashes.len()
    }

    fn compute(&mut self, expression: &Expression) -> u64 {
        let stripped = strip_transparent(expression);
        if stripped.id() != expression.id() {
            return self.hash(stripped);
        }

        let mut hasher = FxHasher::default();
        match *expression.kind() {
            ExpressionKind::Variable(ref variable) => {
                0u8.hash(&mut hasher);
                variable.hash(&mut hasher);
            }
            ExpressionKind::Constant(ref constant) => {
                1u8.hash(&mut hasher);
                constant.hash(&mut hasher);
            }
            ExpressionKind::Unary(op, ref operand) => {
                2u8.hash(&mut hasher);
                op.hash(&mut hasher);
                self.hash(operand).hash(&mut hasher);
            }
            ExpressionKind::Binary(op, ref lhs, ref rhs) => {
                3u8.hash(&mut hasher);
                op.hash(&mut hasher);
                self.hash(lhs).hash(&mut hasher);
                self.hash(rhs).hash(&mut hasher);
            }
            ExpressionKind::Ternary(ref condition, ref then, ref else_) => {
                4u8.hash(&mut hasher);
                self.hash(condition).hash(&mut hasher);
                self.hash(then).hash(&mut hasher);
                self.hash(else_).hash(&mut hasher);
            }
            ExpressionKind::Cast(ty, ref operand) => {
                5u8.hash(&mut hasher);
                ty.hash(&mut hasher);
                self.hash(operand).hash(&mut hasher);
            }
            ExpressionKind::Call(ref name, ty, ref args) => {
                6u8.hash(&mut hasher);
                name.hash(&mut hasher);
                ty.hash(&mut hasher);
                args.len().hash(&mut hasher);
                for arg in args {
                    self.hash(arg).hash(&mut hasher);
                }
            }
            // Stripped above.
            ExpressionKind::Paren(_) => unreachable!(),
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn i32_() -> Type {
        Type::int(32, true)
    }

    fn a_and_b(builder: &mut AstBuilder) -> Expression {
        let a = builder.variable("a", Type::Bool);
        let b = builder.variable("b", Type::Bool);
        builder.land(a, b)
    }

    #[test]
    fn independent_trees_hash_equal() {
        let mut builder = AstBuilder::new();
        let first = a_and_b(&mut builder);
        let second = a_and_b(&mut builder);
        assert_ne!(first.id(), second.id());
        assert_eq!(structural_hash(&first), structural_hash(&second));
        assert!(is_equivalent(&first, &second));
    }

    #[test]
    fn parenthesis_is_transparent() {
        let mut builder = AstBuilder::new();
        let bare = a_and_b(&mut builder);
        let inner = a_and_b(&mut builder);
        let paren = builder.paren(inner);
        let paren = builder.paren(paren);

        assert!(is_equivalent(&bare, &paren));
        assert_eq!(structural_hash(&bare), structural_hash(&paren));
    }

    #[test]
    fn noop_casts_are_transparent() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i32_());
        let cast = builder.cast(i32_(), x.clone());
        assert!(is_equivalent(&x, &cast));
        assert_eq!(structural_hash(&x), structural_hash(&cast));

        let narrowing = builder.cast(Type::int(8, true), x.clone());
        assert!(!is_equivalent(&x, &narrowing));
    }

    #[test]
    fn operand_order_matters() {
        let mut builder = AstBuilder::new();
        let a = builder.variable("a", Type::Bool);
        let b = builder.variable("b", Type::Bool);
        let ab = builder.land(a.clone(), b.clone());
        let ba = builder.land(b, a);
        assert!(!is_equivalent(&ab, &ba));
    }

    #[test]
    fn literals_compare_value_and_type() {
        let mut builder = AstBuilder::new();
        let one_signed = builder.int(1, i32_());
        let one_unsigned = builder.int(1, Type::int(32, false));
        let another_one = builder.int(1, i32_());
        assert!(!is_equivalent(&one_signed, &one_unsigned));
        assert!(is_equivalent(&one_signed, &another_one));
    }

    #[test]
    fn kind_mismatch() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::Bool);
        let not = builder.lnot(x.clone());
        assert!(!is_equivalent(&x, &not));
    }

    #[test]
    fn hashes_are_memoized_per_node() {
        let mut builder = AstBuilder::new();
        let expression = a_and_b(&mut builder);
        let mut engine = EquivalenceEngine::new();
        let first = engine.hash(&expression);
        assert_eq!(engine.memoized(), 3);
        assert_eq!(engine.hash(&expression), first);
        assert_eq!(engine.memoized(), 3);
        assert_eq!(first, structural_hash(&expression));
    }

    #[test]
    fn engine_equivalent_uses_known_hashes() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::Bool);
        let y = builder.variable("y", Type::Bool);
        let mut engine = EquivalenceEngine::new();
        engine.hash(&x);
        engine.hash(&y);
        assert!(!engine.equivalent(&x, &y));
        assert!(engine.equivalent(&x, &x.clone()));
    }
}
