//! Solver formulas.
//!
//! A `Term` is a formula over booleans and fixed-width bit-vectors. Terms
//! render as SMT-LIB2 with `Display`, and can be evaluated under a `Model`.
//!
//! Expressions become terms through the `Translate` trait.

mod eval;
mod term;
mod translate;

pub use self::eval::*;
pub use self::term::*;
pub use self::translate::*;
