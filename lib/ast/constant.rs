//! A `Constant` holds a single literal value.
//!
//! Currently, only constant values upto 64-bits are supported.

use crate::ast::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value of some `Type`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Constant {
    value: u64,
    ty: Type,
}

impl Constant {
    /// Create a new `Constant` with the given value and type. Bits above the
    /// width of the type are discarded.
    pub fn new(value: u64, ty: Type) -> Constant {
        Constant {
            value: value & ty.mask(),
            ty,
        }
    }

    /// Create a new boolean `Constant`.
    pub fn bool_(value: bool) -> Constant {
        Constant::new(value as u64, Type::Bool)
    }

    /// Get the value of this `Constant`, zero-extended to 64 bits.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Get the value of this `Constant`, sign-extended to 64 bits if the type
    /// of this constant is signed.
    pub fn value_i64(&self) -> i64 {
        let bits = self.ty.bits();
        if self.ty.is_signed() && bits < 64 && self.value & self.ty.sign_bit() != 0 {
            (self.value | !self.ty.mask()) as i64
        } else {
            self.value as i64
        }
    }

    /// Get the `Type` of this `Constant`.
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Returns true if this `Constant` has a value other than zero.
    pub fn is_nonzero(&self) -> bool {
        self.value != 0
    }

    /// If this is a boolean `Constant`, get its value.
    pub fn as_bool(&self) -> Option<bool> {
        if self.ty.is_bool() {
            Some(self.value != 0)
        } else {
            None
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.ty {
            Type::Bool => write!(f, "{}", self.value != 0),
            Type::Int { signed: true, .. } => write!(f, "{}", self.value_i64()),
            Type::Int { signed: false, .. } => write!(f, "{}U", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_to_width() {
        let c = Constant::new(0x1ff, Type::int(8, false));
        assert_eq!(c.value(), 0xff);
        assert_eq!(c.to_string(), "255U");
    }

    #[test]
    fn sign_extends_signed_values() {
        let c = Constant::new(0xff, Type::int(8, true));
        assert_eq!(c.value_i64(), -1);
        assert_eq!(c.to_string(), "-1");

        let c = Constant::new(0x7f, Type::int(8, true));
        assert_eq!(c.value_i64(), 127);
    }

    #[test]
    fn booleans() {
        assert_eq!(Constant::bool_(true).as_bool(), Some(true));
        assert_eq!(Constant::bool_(false).to_string(), "false");
        assert_eq!(Constant::new(1, Type::int(32, true)).as_bool(), None);
    }
}
