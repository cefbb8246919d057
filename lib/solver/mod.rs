//! A layer of abstraction over SMT solvers.
//!
//! A `Solver` decides whether a single `Bool` term is satisfiable, following a
//! `Tactic`. Each solver instance is its own context: nothing is shared
//! between instances, so independent simplifiers may each own one.

mod exhaustive;
mod tactic;
mod z3;

pub use self::exhaustive::*;
pub use self::tactic::*;
pub use self::z3::*;

use crate::formula::Term;
use crate::Error;
use std::fmt;

/// The answer to a satisfiability query.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
    /// The solver gave up, or ran out of resources.
    Unknown,
}

impl fmt::Display for SatResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SatResult::Sat => write!(f, "sat"),
            SatResult::Unsat => write!(f, "unsat"),
            SatResult::Unknown => write!(f, "unknown"),
        }
    }
}

pub trait Solver {
    /// Decide whether `assertion` is satisfiable, using `tactic`.
    ///
    /// # Error
    /// The solver failed to run, or refused the problem.
    fn check(&mut self, assertion: &Term, tactic: &Tactic) -> Result<SatResult, Error>;
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn check(&mut self, assertion: &Term, tactic: &Tactic) -> Result<SatResult, Error> {
        (**self).check(assertion, tactic)
    }
}
