use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The sort of a `Term`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Sort {
    Bool,
    BitVec(usize),
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Sort::Bool => write!(f, "Bool"),
            Sort::BitVec(bits) => write!(f, "(_ BitVec {})", bits),
        }
    }
}

/// Unary bit-vector operators.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BvUnaryOp {
    Not,
    Neg,
}

/// Binary bit-vector operators.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BvBinaryOp {
    Add,
    Sub,
    Mul,
    Udiv,
    Sdiv,
    Urem,
    Srem,
    And,
    Or,
    Xor,
    Shl,
    Lshr,
    Ashr,
}

impl BvBinaryOp {
    fn name(&self) -> &'static str {
        match *self {
            BvBinaryOp::Add => "bvadd",
            BvBinaryOp::Sub => "bvsub",
            BvBinaryOp::Mul => "bvmul",
            BvBinaryOp::Udiv => "bvudiv",
            BvBinaryOp::Sdiv => "bvsdiv",
            BvBinaryOp::Urem => "bvurem",
            BvBinaryOp::Srem => "bvsrem",
            BvBinaryOp::And => "bvand",
            BvBinaryOp::Or => "bvor",
            BvBinaryOp::Xor => "bvxor",
            BvBinaryOp::Shl => "bvshl",
            BvBinaryOp::Lshr => "bvlshr",
            BvBinaryOp::Ashr => "bvashr",
        }
    }
}

/// Bit-vector comparisons.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BvCompareOp {
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl BvCompareOp {
    fn name(&self) -> &'static str {
        match *self {
            BvCompareOp::Ult => "bvult",
            BvCompareOp::Ule => "bvule",
            BvCompareOp::Ugt => "bvugt",
            BvCompareOp::Uge => "bvuge",
            BvCompareOp::Slt => "bvslt",
            BvCompareOp::Sle => "bvsle",
            BvCompareOp::Sgt => "bvsgt",
            BvCompareOp::Sge => "bvsge",
        }
    }
}

/// A solver term over booleans and fixed-width bit-vectors.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Term {
    Bool(bool),
    /// A bit-vector literal. `value` never has bits set above `bits`.
    BitVec {
        value: u64,
        bits: usize,
    },
    /// A free constant.
    Const(String, Sort),
    Not(Box<Term>),
    And(Box<Term>, Box<Term>),
    Or(Box<Term>, Box<Term>),
    Xor(Box<Term>, Box<Term>),
    Eq(Box<Term>, Box<Term>),
    Ite(Box<Term>, Box<Term>, Box<Term>),
    BvUnary(BvUnaryOp, Box<Term>),
    BvBinary(BvBinaryOp, Box<Term>, Box<Term>),
    BvCompare(BvCompareOp, Box<Term>, Box<Term>),
    Extract {
        high: usize,
        low: usize,
        term: Box<Term>,
    },
    ZeroExtend(usize, Box<Term>),
    SignExtend(usize, Box<Term>),
}

fn mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

impl Term {
    /// Create a bit-vector literal, discarding bits of `value` above `bits`.
    pub fn bv(value: u64, bits: usize) -> Term {
        Term::BitVec {
            value: value & mask(bits),
            bits,
        }
    }

    pub fn constant<S>(name: S, sort: Sort) -> Term
    where
        S: Into<String>,
    {
        Term::Const(name.into(), sort)
    }

    pub fn not(term: Term) -> Term {
        Term::Not(Box::new(term))
    }

    pub fn and(lhs: Term, rhs: Term) -> Term {
        Term::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Term, rhs: Term) -> Term {
        Term::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn eq(lhs: Term, rhs: Term) -> Term {
        Term::Eq(Box::new(lhs), Box::new(rhs))
    }

    pub fn ite(condition: Term, then: Term, else_: Term) -> Term {
        Term::Ite(Box::new(condition), Box::new(then), Box::new(else_))
    }

    pub fn bv_binary(op: BvBinaryOp, lhs: Term, rhs: Term) -> Term {
        Term::BvBinary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn bv_compare(op: BvCompareOp, lhs: Term, rhs: Term) -> Term {
        Term::BvCompare(op, Box::new(lhs), Box::new(rhs))
    }

    /// Get the sort of this term.
    ///
    /// # Error
    /// The operands of this term have sorts this term cannot accept.
    pub fn sort(&self) -> Result<Sort, Error> {
        match *self {
            Term::Bool(_) => Ok(Sort::Bool),
            Term::BitVec { bits, .. } => Ok(Sort::BitVec(bits)),
            Term::Const(_, sort) => Ok(sort),
            Term::Not(ref term) => {
                expect_sort(term, Sort::Bool)?;
                Ok(Sort::Bool)
            }
            Term::And(ref lhs, ref rhs) | Term::Or(ref lhs, ref rhs) | Term::Xor(ref lhs, ref rhs) => {
                expect_sort(lhs, Sort::Bool)?;
                expect_sort(rhs, Sort::Bool)?;
                Ok(Sort::Bool)
            }
            Term::Eq(ref lhs, ref rhs) => {
                expect_sort(rhs, lhs.sort()?)?;
                Ok(Sort::Bool)
            }
            Term::Ite(ref condition, ref then, ref else_) => {
                expect_sort(condition, Sort::Bool)?;
                let sort = then.sort()?;
                expect_sort(else_, sort)?;
                Ok(sort)
            }
            Term::BvUnary(_, ref term) => bitvec_sort(term),
            Term::BvBinary(_, ref lhs, ref rhs) => {
                let sort = bitvec_sort(lhs)?;
                expect_sort(rhs, sort)?;
                Ok(sort)
            }
            Term::BvCompare(_, ref lhs, ref rhs) => {
                let sort = bitvec_sort(lhs)?;
                expect_sort(rhs, sort)?;
                Ok(Sort::Bool)
            }
            Term::Extract {
                high,
                low,
                ref term,
            } => match bitvec_sort(term)? {
                Sort::BitVec(bits) if low <= high && high < bits => {
                    Ok(Sort::BitVec(high - low + 1))
                }
                _ => Err(Error::Sort(format!("invalid extract in {}", self))),
            },
            Term::ZeroExtend(extra, ref term) | Term::SignExtend(extra, ref term) => {
                match bitvec_sort(term)? {
                    Sort::BitVec(bits) => Ok(Sort::BitVec(bits + extra)),
                    Sort::Bool => Err(Error::Sort(format!("extension of Bool in {}", self))),
                }
            }
        }
    }

    /// Every free constant in this term, with its sort.
    pub fn free_constants(&self) -> BTreeMap<String, Sort> {
        let mut constants = BTreeMap::new();
        self.collect_constants(&mut constants);
        constants
    }

    fn collect_constants(&self, constants: &mut BTreeMap<String, Sort>) {
        match *self {
            Term::Bool(_) | Term::BitVec { .. } => {}
            Term::Const(ref name, sort) => {
                constants.insert(name.clone(), sort);
            }
            Term::Not(ref term)
            | Term::BvUnary(_, ref term)
            | Term::Extract { ref term, .. }
            | Term::ZeroExtend(_, ref term)
            | Term::SignExtend(_, ref term) => term.collect_constants(constants),
            Term::And(ref lhs, ref rhs)
            | Term::Or(ref lhs, ref rhs)
            | Term::Xor(ref lhs, ref rhs)
            | Term::Eq(ref lhs, ref rhs)
            | Term::BvBinary(_, ref lhs, ref rhs)
            | Term::BvCompare(_, ref lhs, ref rhs) => {
                lhs.collect_constants(constants);
                rhs.collect_constants(constants);
            }
            Term::Ite(ref condition, ref then, ref else_) => {
                condition.collect_constants(constants);
                then.collect_constants(constants);
                else_.collect_constants(constants);
            }
        }
    }
}

fn expect_sort(term: &Term, sort: Sort) -> Result<(), Error> {
    let actual = term.sort()?;
    if actual != sort {
        return Err(Error::Sort(format!(
            "expected {} but {} has sort {}",
            sort, term, actual
        )));
    }
    Ok(())
}

fn bitvec_sort(term: &Term) -> Result<Sort, Error> {
    match term.sort()? {
        Sort::BitVec(bits) => Ok(Sort::BitVec(bits)),
        Sort::Bool => Err(Error::Sort(format!("expected a bit-vector, got {}", term))),
    }
}

/// Quote a symbol if it is not a simple SMT-LIB2 symbol.
pub(crate) fn symbol(name: &str) -> String {
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$');
    if simple {
        name.to_string()
    } else {
        format!("|{}|", name.replace('|', "_"))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Term::Bool(value) => write!(f, "{}", value),
            Term::BitVec { value, bits } => {
                if bits % 4 == 0 {
                    write!(f, "#x{:01$x}", value, bits / 4)
                } else {
                    write!(f, "(_ bv{} {})", value, bits)
                }
            }
            Term::Const(ref name, _) => write!(f, "{}", symbol(name)),
            Term::Not(ref term) => write!(f, "(not {})", term),
            Term::And(ref lhs, ref rhs) => write!(f, "(and {} {})", lhs, rhs),
            Term::Or(ref lhs, ref rhs) => write!(f, "(or {} {})", lhs, rhs),
            Term::Xor(ref lhs, ref rhs) => write!(f, "(xor {} {})", lhs, rhs),
            Term::Eq(ref lhs, ref rhs) => write!(f, "(= {} {})", lhs, rhs),
            Term::Ite(ref condition, ref then, ref else_) => {
                write!(f, "(ite {} {} {})", condition, then, else_)
            }
            Term::BvUnary(BvUnaryOp::Not, ref term) => write!(f, "(bvnot {})", term),
            Term::BvUnary(BvUnaryOp::Neg, ref term) => write!(f, "(bvneg {})", term),
            Term::BvBinary(op, ref lhs, ref rhs) => write!(f, "({} {} {})", op.name(), lhs, rhs),
            Term::BvCompare(op, ref lhs, ref rhs) => {
                write!(f, "({} {} {})", op.name(), lhs, rhs)
            }
            Term::Extract {
                high,
                low,
                ref term,
            } => write!(f, "((_ extract {} {}) {})", high, low, term),
            Term::ZeroExtend(extra, ref term) => write!(f, "((_ zero_extend {}) {})", extra, term),
            Term::SignExtend(extra, ref term) => write!(f, "((_ sign_extend {}) {})", extra, term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smtlib2_rendering() {
        let x = Term::constant("x", Sort::BitVec(32));
        let gt = Term::bv_compare(BvCompareOp::Sgt, x.clone(), Term::bv(0, 32));
        assert_eq!(gt.to_string(), "(bvsgt x #x00000000)");

        let odd = Term::bv(5, 3);
        assert_eq!(odd.to_string(), "(_ bv5 3)");

        let quoted = Term::constant("var 1", Sort::Bool);
        assert_eq!(quoted.to_string(), "|var 1|");

        let extract = Term::Extract {
            high: 7,
            low: 0,
            term: Box::new(x),
        };
        assert_eq!(extract.to_string(), "((_ extract 7 0) x)");
    }

    #[test]
    fn sorts() {
        let x = Term::constant("x", Sort::BitVec(8));
        let sum = Term::bv_binary(BvBinaryOp::Add, x.clone(), Term::bv(1, 8));
        assert_eq!(sum.sort().unwrap(), Sort::BitVec(8));

        let wide = Term::SignExtend(8, Box::new(sum));
        assert_eq!(wide.sort().unwrap(), Sort::BitVec(16));

        let bad = Term::bv_binary(BvBinaryOp::Add, x.clone(), Term::bv(1, 16));
        assert!(bad.sort().is_err());

        let bad = Term::not(x);
        assert!(bad.sort().is_err());
    }

    #[test]
    fn free_constants() {
        let x = Term::constant("x", Sort::BitVec(8));
        let b = Term::constant("b", Sort::Bool);
        let term = Term::ite(b, Term::eq(x.clone(), x), Term::Bool(false));
        let constants = term.free_constants();
        assert_eq!(constants.len(), 2);
        assert_eq!(constants["x"], Sort::BitVec(8));
        assert_eq!(constants["b"], Sort::Bool);
    }
}
