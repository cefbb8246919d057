//! Evaluation of a `Term` under a `Model`.
//!
//! Bit-vector operators follow SMT-LIB2 semantics, including division and
//! remainder by zero.

use crate::formula::*;
use crate::Error;
use std::collections::BTreeMap;

/// The value of a term.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Value {
    Bool(bool),
    BitVec { value: u64, bits: usize },
}

impl Value {
    pub fn bv(value: u64, bits: usize) -> Value {
        Value::BitVec {
            value: value & mask(bits),
            bits,
        }
    }

    fn as_bool(&self) -> Result<bool, Error> {
        match *self {
            Value::Bool(value) => Ok(value),
            Value::BitVec { .. } => Err(Error::Sort("expected a Bool value".to_string())),
        }
    }

    fn as_bv(&self) -> Result<(u64, usize), Error> {
        match *self {
            Value::BitVec { value, bits } => Ok((value, bits)),
            Value::Bool(_) => Err(Error::Sort("expected a bit-vector value".to_string())),
        }
    }
}

/// An assignment of values to free constants.
pub type Model = BTreeMap<String, Value>;

fn mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

fn sign_bit(bits: usize) -> u64 {
    match bits {
        1..=64 => 1 << (bits - 1),
        _ => 0,
    }
}

fn sign_extend(value: u64, bits: usize) -> i64 {
    if bits < 64 && value & sign_bit(bits) != 0 {
        (value | !mask(bits)) as i64
    } else {
        value as i64
    }
}

fn is_negative(value: u64, bits: usize) -> bool {
    value & sign_bit(bits) != 0
}

fn neg(value: u64, bits: usize) -> u64 {
    value.wrapping_neg() & mask(bits)
}

fn udiv(lhs: u64, rhs: u64, bits: usize) -> u64 {
    if rhs == 0 {
        mask(bits)
    } else {
        lhs / rhs
    }
}

fn urem(lhs: u64, rhs: u64) -> u64 {
    if rhs == 0 {
        lhs
    } else {
        lhs % rhs
    }
}

fn binary(op: BvBinaryOp, lhs: u64, rhs: u64, bits: usize) -> u64 {
    let result = match op {
        BvBinaryOp::Add => lhs.wrapping_add(rhs),
        BvBinaryOp::Sub => lhs.wrapping_sub(rhs),
        BvBinaryOp::Mul => lhs.wrapping_mul(rhs),
        BvBinaryOp::Udiv => udiv(lhs, rhs, bits),
        BvBinaryOp::Urem => urem(lhs, rhs),
        BvBinaryOp::Sdiv => {
            let (ln, rn) = (is_negative(lhs, bits), is_negative(rhs, bits));
            let l = if ln { neg(lhs, bits) } else { lhs };
            let r = if rn { neg(rhs, bits) } else { rhs };
            let quotient = udiv(l, r, bits);
            if ln != rn {
                neg(quotient, bits)
            } else {
                quotient
            }
        }
        BvBinaryOp::Srem => {
            let (ln, rn) = (is_negative(lhs, bits), is_negative(rhs, bits));
            let l = if ln { neg(lhs, bits) } else { lhs };
            let r = if rn { neg(rhs, bits) } else { rhs };
            let remainder = urem(l, r);
            if ln {
                neg(remainder, bits)
            } else {
                remainder
            }
        }
        BvBinaryOp::And => lhs & rhs,
        BvBinaryOp::Or => lhs | rhs,
        BvBinaryOp::Xor => lhs ^ rhs,
        BvBinaryOp::Shl => {
            if rhs >= bits.min(64) as u64 {
                0
            } else {
                lhs << rhs
            }
        }
        BvBinaryOp::Lshr => {
            if rhs >= bits.min(64) as u64 {
                0
            } else {
                lhs >> rhs
            }
        }
        BvBinaryOp::Ashr => {
            let shift = if rhs >= bits.min(64) as u64 { 63 } else { rhs };
            (sign_extend(lhs, bits) >> shift) as u64
        }
    };
    result & mask(bits)
}

fn compare(op: BvCompareOp, lhs: u64, rhs: u64, bits: usize) -> bool {
    let (sl, sr) = (sign_extend(lhs, bits), sign_extend(rhs, bits));
    match op {
        BvCompareOp::Ult => lhs < rhs,
        BvCompareOp::Ule => lhs <= rhs,
        BvCompareOp::Ugt => lhs > rhs,
        BvCompareOp::Uge => lhs >= rhs,
        BvCompareOp::Slt => sl < sr,
        BvCompareOp::Sle => sl <= sr,
        BvCompareOp::Sgt => sl > sr,
        BvCompareOp::Sge => sl >= sr,
    }
}

impl Term {
    /// Evaluate this term, taking the values of free constants from `model`.
    ///
    /// # Error
    /// A free constant has no value in `model`, or the term is ill-sorted.
    pub fn eval(&self, model: &Model) -> Result<Value, Error> {
        Ok(match *self {
            Term::Bool(value) => Value::Bool(value),
            Term::BitVec { value, bits } => Value::bv(value, bits),
            Term::Const(ref name, _) => *model
                .get(name)
                .ok_or_else(|| Error::MissingValue(name.clone()))?,
            Term::Not(ref term) => Value::Bool(!term.eval(model)?.as_bool()?),
            Term::And(ref lhs, ref rhs) => {
                Value::Bool(lhs.eval(model)?.as_bool()? && rhs.eval(model)?.as_bool()?)
            }
            Term::Or(ref lhs, ref rhs) => {
                Value::Bool(lhs.eval(model)?.as_bool()? || rhs.eval(model)?.as_bool()?)
            }
            Term::Xor(ref lhs, ref rhs) => {
                Value::Bool(lhs.eval(model)?.as_bool()? != rhs.eval(model)?.as_bool()?)
            }
            Term::Eq(ref lhs, ref rhs) => Value::Bool(lhs.eval(model)? == rhs.eval(model)?),
            Term::Ite(ref condition, ref then, ref else_) => {
                if condition.eval(model)?.as_bool()? {
                    then.eval(model)?
                } else {
                    else_.eval(model)?
                }
            }
            Term::BvUnary(op, ref term) => {
                let (value, bits) = term.eval(model)?.as_bv()?;
                match op {
                    BvUnaryOp::Not => Value::bv(!value, bits),
                    BvUnaryOp::Neg => Value::bv(neg(value, bits), bits),
                }
            }
            Term::BvBinary(op, ref lhs, ref rhs) => {
                let (l, bits) = lhs.eval(model)?.as_bv()?;
                let (r, rbits) = rhs.eval(model)?.as_bv()?;
                if bits != rbits {
                    return Err(Error::Sort(format!("operand widths differ in {}", self)));
                }
                Value::bv(binary(op, l, r, bits), bits)
            }
            Term::BvCompare(op, ref lhs, ref rhs) => {
                let (l, bits) = lhs.eval(model)?.as_bv()?;
                let (r, rbits) = rhs.eval(model)?.as_bv()?;
                if bits != rbits {
                    return Err(Error::Sort(format!("operand widths differ in {}", self)));
                }
                Value::Bool(compare(op, l, r, bits))
            }
            Term::Extract {
                high,
                low,
                ref term,
            } => {
                let (value, _) = term.eval(model)?.as_bv()?;
                Value::bv(value >> low, high - low + 1)
            }
            Term::ZeroExtend(extra, ref term) => {
                let (value, bits) = term.eval(model)?.as_bv()?;
                Value::bv(value, bits + extra)
            }
            Term::SignExtend(extra, ref term) => {
                let (value, bits) = term.eval(model)?.as_bv()?;
                Value::bv(sign_extend(value, bits) as u64, bits + extra)
            }
        })
    }
}
