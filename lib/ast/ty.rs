use serde::{Deserialize, Serialize};
use std::fmt;

/// The widest integer type supported.
pub const MAX_INT_BITS: usize = 64;

/// The type of an expression.
///
/// Integers are fixed-width, two's-complement, and wrap on overflow.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Type {
    Bool,
    Int { bits: usize, signed: bool },
}

impl Type {
    /// Create a new integer type.
    ///
    /// Widths outside `1..=MAX_INT_BITS` may be created, but such types are
    /// rejected by translation. See `Type::has_valid_width`.
    pub fn int(bits: usize, signed: bool) -> Type {
        Type::Int { bits, signed }
    }

    /// Returns true if this is `Type::Bool`.
    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    /// The width of this type in bits. `Bool` is one bit wide.
    pub fn bits(&self) -> usize {
        match *self {
            Type::Bool => 1,
            Type::Int { bits, .. } => bits,
        }
    }

    /// Returns true if this is a signed integer type.
    pub fn is_signed(&self) -> bool {
        match *self {
            Type::Bool => false,
            Type::Int { signed, .. } => signed,
        }
    }

    /// Returns true if this type is `Bool`, or an integer between 1 and
    /// `MAX_INT_BITS` bits wide.
    pub fn has_valid_width(&self) -> bool {
        (1..=MAX_INT_BITS).contains(&self.bits())
    }

    /// The highest bit of this type, or 0 for an invalid width.
    pub fn sign_bit(&self) -> u64 {
        if self.has_valid_width() {
            1 << (self.bits() - 1)
        } else {
            0
        }
    }

    /// A mask covering every bit of this type.
    pub fn mask(&self) -> u64 {
        if self.bits() >= 64 {
            u64::MAX
        } else {
            (1 << self.bits()) - 1
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Type::Bool => write!(f, "bool"),
            Type::Int { bits, signed: true } => write!(f, "int{}_t", bits),
            Type::Int {
                bits,
                signed: false,
            } => write!(f, "uint{}_t", bits),
        }
    }
}
