//! Translation of AST expressions into solver terms.
//!
//! Translation is a collaborator of the simplifier, which only depends on the
//! `Translate` trait. `BitVecTranslator` is the default implementation. It
//! models integers as fixed-width bit-vectors with C's wraparound, truncation
//! and extension rules, and rejects calls, which have no meaning in the
//! theory.

use crate::ast::{BinaryOp, Expression, ExpressionKind, Type, UnaryOp};
use crate::formula::*;
use crate::Error;
use rustc_hash::FxHashMap;

/// Translates expressions into solver terms.
pub trait Translate {
    /// Translate a boolean-valued expression into a `Bool` term.
    ///
    /// # Error
    /// `Error::UnsupportedExpression` when `expression` uses a construct the
    /// theory cannot represent.
    fn translate(&mut self, expression: &Expression) -> Result<Term, Error>;
}

/// Translates expressions into terms over booleans and bit-vectors.
#[derive(Clone, Debug, Default)]
pub struct BitVecTranslator {
    // Sorts of the variables seen during the current translation.
    variables: FxHashMap<String, Sort>,
}

fn sort_of(ty: Type) -> Sort {
    match ty {
        Type::Bool => Sort::Bool,
        Type::Int { bits, .. } => Sort::BitVec(bits),
    }
}

fn unsupported(expression: &Expression, reason: &str) -> Error {
    Error::UnsupportedExpression(format!("{}: {}", expression, reason))
}

impl BitVecTranslator {
    pub fn new() -> BitVecTranslator {
        BitVecTranslator {
            variables: FxHashMap::default(),
        }
    }

    /// Translate an expression used in a boolean position. Integers are true
    /// when they are not zero.
    fn boolean(&mut self, expression: &Expression) -> Result<Term, Error> {
        let term = self.term(expression)?;
        match expression.ty() {
            Type::Bool => Ok(term),
            Type::Int { bits, .. } => Ok(Term::not(Term::eq(term, Term::bv(0, bits)))),
        }
    }

    /// Translate an expression, producing a term of the sort of its type.
    fn term(&mut self, expression: &Expression) -> Result<Term, Error> {
        if !expression.ty().has_valid_width() {
            return Err(unsupported(expression, "unsupported integer width"));
        }
        match *expression.kind() {
            ExpressionKind::Variable(ref variable) => {
                let sort = sort_of(variable.ty());
                match self.variables.get(variable.name()) {
                    Some(existing) if *existing != sort => {
                        return Err(unsupported(expression, "variable used with two types"))
                    }
                    Some(_) => {}
                    None => {
                        self.variables.insert(variable.name().to_string(), sort);
                    }
                }
                Ok(Term::constant(variable.name(), sort))
            }
            ExpressionKind::Constant(ref constant) => Ok(match constant.ty() {
                Type::Bool => Term::Bool(constant.is_nonzero()),
                Type::Int { bits, .. } => Term::bv(constant.value(), bits),
            }),
            ExpressionKind::Unary(UnaryOp::LNot, ref operand) => {
                Ok(Term::not(self.boolean(operand)?))
            }
            ExpressionKind::Unary(op, ref operand) => {
                if operand.ty().is_bool() {
                    return Err(unsupported(expression, "arithmetic on a boolean"));
                }
                let op = match op {
                    UnaryOp::Not => BvUnaryOp::Not,
                    UnaryOp::Neg => BvUnaryOp::Neg,
                    UnaryOp::LNot => unreachable!(),
                };
                Ok(Term::BvUnary(op, Box::new(self.term(operand)?)))
            }
            ExpressionKind::Binary(BinaryOp::LAnd, ref lhs, ref rhs) => {
                Ok(Term::and(self.boolean(lhs)?, self.boolean(rhs)?))
            }
            ExpressionKind::Binary(BinaryOp::LOr, ref lhs, ref rhs) => {
                Ok(Term::or(self.boolean(lhs)?, self.boolean(rhs)?))
            }
            ExpressionKind::Binary(op, ref lhs, ref rhs) if op.is_comparison() => {
                self.comparison(expression, op, lhs, rhs)
            }
            ExpressionKind::Binary(op, ref lhs, ref rhs) => {
                self.arithmetic(expression, op, lhs, rhs)
            }
            ExpressionKind::Ternary(ref condition, ref then, ref else_) => {
                let condition = self.boolean(condition)?;
                let then = self.term(then)?;
                let else_ = self.term(else_)?;
                if then.sort()? != else_.sort()? {
                    return Err(unsupported(expression, "ternary arms of different types"));
                }
                Ok(Term::ite(condition, then, else_))
            }
            ExpressionKind::Paren(ref inner) => self.term(inner),
            ExpressionKind::Cast(ty, ref inner) => self.cast(ty, inner),
            ExpressionKind::Call(..) => Err(unsupported(expression, "opaque call")),
        }
    }

    fn comparison(
        &mut self,
        expression: &Expression,
        op: BinaryOp,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Term, Error> {
        let ty = lhs.ty();
        let l = self.term(lhs)?;
        let r = self.term(rhs)?;
        if l.sort()? != r.sort()? {
            return Err(unsupported(expression, "comparison of different types"));
        }

        // Booleans order as false < true.
        let (l, r) = if ty.is_bool() {
            match op {
                BinaryOp::Eq => return Ok(Term::eq(l, r)),
                BinaryOp::Ne => return Ok(Term::not(Term::eq(l, r))),
                _ => (
                    Term::ite(l, Term::bv(1, 1), Term::bv(0, 1)),
                    Term::ite(r, Term::bv(1, 1), Term::bv(0, 1)),
                ),
            }
        } else {
            (l, r)
        };

        let signed = ty.is_signed();
        let op = match (op, signed) {
            (BinaryOp::Eq, _) => return Ok(Term::eq(l, r)),
            (BinaryOp::Ne, _) => return Ok(Term::not(Term::eq(l, r))),
            (BinaryOp::Lt, true) => BvCompareOp::Slt,
            (BinaryOp::Lt, false) => BvCompareOp::Ult,
            (BinaryOp::Le, true) => BvCompareOp::Sle,
            (BinaryOp::Le, false) => BvCompareOp::Ule,
            (BinaryOp::Gt, true) => BvCompareOp::Sgt,
            (BinaryOp::Gt, false) => BvCompareOp::Ugt,
            (BinaryOp::Ge, true) => BvCompareOp::Sge,
            (BinaryOp::Ge, false) => BvCompareOp::Uge,
            _ => return Err(unsupported(expression, "not a comparison")),
        };
        Ok(Term::bv_compare(op, l, r))
    }

    fn arithmetic(
        &mut self,
        expression: &Expression,
        op: BinaryOp,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Term, Error> {
        let ty = lhs.ty();

        if ty.is_bool() {
            let l = self.boolean(lhs)?;
            let r = self.boolean(rhs)?;
            return match op {
                BinaryOp::And => Ok(Term::and(l, r)),
                BinaryOp::Or => Ok(Term::or(l, r)),
                BinaryOp::Xor => Ok(Term::Xor(Box::new(l), Box::new(r))),
                _ => Err(unsupported(expression, "arithmetic on a boolean")),
            };
        }

        let l = self.term(lhs)?;
        let r = match op {
            // The shift count is converted to the width of the value shifted.
            BinaryOp::Shl | BinaryOp::Shr => self.convert(rhs, ty)?,
            _ => self.term(rhs)?,
        };
        if l.sort()? != r.sort()? {
            return Err(unsupported(expression, "operands of different types"));
        }

        let signed = ty.is_signed();
        let op = match op {
            BinaryOp::Add => BvBinaryOp::Add,
            BinaryOp::Sub => BvBinaryOp::Sub,
            BinaryOp::Mul => BvBinaryOp::Mul,
            BinaryOp::Div if signed => BvBinaryOp::Sdiv,
            BinaryOp::Div => BvBinaryOp::Udiv,
            BinaryOp::Rem if signed => BvBinaryOp::Srem,
            BinaryOp::Rem => BvBinaryOp::Urem,
            BinaryOp::And => BvBinaryOp::And,
            BinaryOp::Or => BvBinaryOp::Or,
            BinaryOp::Xor => BvBinaryOp::Xor,
            BinaryOp::Shl => BvBinaryOp::Shl,
            BinaryOp::Shr if signed => BvBinaryOp::Ashr,
            BinaryOp::Shr => BvBinaryOp::Lshr,
            _ => return Err(unsupported(expression, "not an arithmetic operator")),
        };
        Ok(Term::bv_binary(op, l, r))
    }

    fn cast(&mut self, ty: Type, inner: &Expression) -> Result<Term, Error> {
        match ty {
            Type::Bool => self.boolean(inner),
            Type::Int { .. } => self.convert(inner, ty),
        }
    }

    /// Translate `expression` and convert it to the integer type `ty`.
    fn convert(&mut self, expression: &Expression, ty: Type) -> Result<Term, Error> {
        let from = expression.ty();
        let term = self.term(expression)?;
        let to_bits = ty.bits();
        Ok(match from {
            Type::Bool => Term::ite(term, Term::bv(1, to_bits), Term::bv(0, to_bits)),
            Type::Int { bits, signed } => {
                if bits == to_bits {
                    term
                } else if bits > to_bits {
                    Term::Extract {
                        high: to_bits - 1,
                        low: 0,
                        term: Box::new(term),
                    }
                } else if signed {
                    Term::SignExtend(to_bits - bits, Box::new(term))
                } else {
                    Term::ZeroExtend(to_bits - bits, Box::new(term))
                }
            }
        })
    }
}

impl Translate for BitVecTranslator {
    fn translate(&mut self, expression: &Expression) -> Result<Term, Error> {
        self.variables.clear();
        let term = self.boolean(expression)?;
        trace!("translated {} to {}", expression, term);
        Ok(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn i32_() -> Type {
        Type::int(32, true)
    }

    #[test]
    fn signed_comparison() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i32_());
        let zero = builder.int(0, i32_());
        let gt = builder.binary(BinaryOp::Gt, x, zero);
        let term = BitVecTranslator::new().translate(&gt).unwrap();
        assert_eq!(term.to_string(), "(bvsgt x #x00000000)");
    }

    #[test]
    fn unsigned_comparison() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::int(8, false));
        let y = builder.variable("y", Type::int(8, false));
        let lt = builder.binary(BinaryOp::Lt, x, y);
        let term = BitVecTranslator::new().translate(&lt).unwrap();
        assert_eq!(term.to_string(), "(bvult x y)");
    }

    #[test]
    fn integer_in_boolean_position() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::int(8, true));
        let not = builder.lnot(x);
        let term = BitVecTranslator::new().translate(&not).unwrap();
        assert_eq!(term.to_string(), "(not (not (= x #x00)))");
    }

    #[test]
    fn casts() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::int(32, true));
        let narrow = builder.cast(Type::int(8, true), x.clone());
        let wide = builder.cast(Type::int(64, true), narrow);
        let zero = builder.int(0, Type::int(64, true));
        let eq = builder.binary(BinaryOp::Eq, wide, zero);
        let term = BitVecTranslator::new().translate(&eq).unwrap();
        assert_eq!(
            term.to_string(),
            "(= ((_ sign_extend 56) ((_ extract 7 0) x)) #x0000000000000000)"
        );
    }

    #[test]
    fn calls_are_unsupported() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i32_());
        let call = builder.call("f", i32_(), vec![x]);
        let zero = builder.int(0, i32_());
        let gt = builder.binary(BinaryOp::Gt, call, zero);
        match BitVecTranslator::new().translate(&gt) {
            Err(Error::UnsupportedExpression(_)) => {}
            other => panic!("expected UnsupportedExpression, got {:?}", other),
        }
    }

    #[test]
    fn conflicting_variable_types() {
        let mut builder = AstBuilder::new();
        let x8 = builder.variable("x", Type::int(8, true));
        let x32 = builder.variable("x", i32_());
        let wide = builder.cast(i32_(), x8);
        let eq = builder.binary(BinaryOp::Eq, wide, x32);
        assert!(BitVecTranslator::new().translate(&eq).is_err());
    }

    #[test]
    fn ternary() {
        let mut builder = AstBuilder::new();
        let c = builder.variable("c", Type::Bool);
        let x = builder.variable("x", Type::int(8, true));
        let y = builder.variable("y", Type::int(8, true));
        let select = builder.ternary(c.clone(), x.clone(), y);
        let zero = builder.int(0, Type::int(8, true));
        let eq = builder.binary(BinaryOp::Eq, select, zero);
        let term = BitVecTranslator::new().translate(&eq).unwrap();
        assert_eq!(term.to_string(), "(= (ite c x y) #x00)");

        let z = builder.variable("z", i32_());
        let mixed = builder.ternary(c, x, z);
        match BitVecTranslator::new().translate(&mixed) {
            Err(Error::UnsupportedExpression(_)) => {}
            other => panic!("expected UnsupportedExpression, got {:?}", other),
        }
    }

    #[test]
    fn shift_count_takes_the_width_of_the_value() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::int(8, true));
        let n = builder.variable("n", Type::int(32, false));
        let shr = builder.binary(BinaryOp::Shr, x, n);
        let term = BitVecTranslator::new().translate(&shr).unwrap();
        assert_eq!(
            term.to_string(),
            "(not (= (bvashr x ((_ extract 7 0) n)) #x00))"
        );

        let x = builder.variable("x", Type::int(32, false));
        let n = builder.variable("n", Type::int(8, false));
        let shl = builder.binary(BinaryOp::Shl, x, n);
        let term = BitVecTranslator::new().translate(&shl).unwrap();
        assert_eq!(
            term.to_string(),
            "(not (= (bvshl x ((_ zero_extend 24) n)) #x00000000))"
        );
    }

    #[test]
    fn bitwise_operators_on_booleans() {
        let mut builder = AstBuilder::new();
        let a = builder.variable("a", Type::Bool);
        let b = builder.variable("b", Type::Bool);
        let mut translator = BitVecTranslator::new();
        for (op, expected) in [
            (BinaryOp::And, "(and a b)"),
            (BinaryOp::Or, "(or a b)"),
            (BinaryOp::Xor, "(xor a b)"),
        ] {
            let expression = builder.binary(op, a.clone(), b.clone());
            assert_eq!(translator.translate(&expression).unwrap().to_string(), expected);
        }

        let sum = builder.binary(BinaryOp::Add, a, b);
        assert!(translator.translate(&sum).is_err());
    }

    #[test]
    fn invalid_widths_are_unsupported() {
        for bits in [0, 65, 128] {
            let mut builder = AstBuilder::new();
            let ty = Type::int(bits, true);
            let x = builder.variable("x", ty);
            let zero = builder.int(0, ty);
            let lt = builder.binary(BinaryOp::Lt, x, zero);
            match BitVecTranslator::new().translate(&lt) {
                Err(Error::UnsupportedExpression(_)) => {}
                other => panic!("expected UnsupportedExpression, got {:?}", other),
            }
        }
    }
}
