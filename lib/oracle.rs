//! The proof oracle answers, "Is this expression a tautology?"
//!
//! To prove an expression, we translate it into a formula, assert the
//! negation of that formula, and ask the solver for satisfiability under the
//! current tactic. An unsatisfiable negation means the expression is a
//! tautology. Every other outcome means the expression is not proven:
//!
//! * The translator cannot represent the expression.
//! * The solver finds the negation satisfiable.
//! * The solver answers unknown, or runs out of resources.
//! * The solver fails outright.
//!
//! None of these are errors to the caller. The oracle logs them and reports
//! the expression as not proven.

use crate::ast::Expression;
use crate::formula::{BitVecTranslator, Term, Translate};
use crate::solver::{SatResult, Solver, Tactic};
use crate::Error;
use std::fmt;

/// What the oracle knows about an expression.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Verdict {
    /// The expression is a tautology.
    True,
    /// The expression is a contradiction.
    False,
    /// Neither could be proven.
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Verdict::True => write!(f, "proven true"),
            Verdict::False => write!(f, "proven false"),
            Verdict::Unknown => write!(f, "unknown"),
        }
    }
}

/// Proves expressions with a solver.
///
/// The oracle owns its solver and translator. It is scoped to one
/// simplification run, and must not be shared between runs.
#[derive(Debug)]
pub struct ProofOracle<S, T = BitVecTranslator> {
    solver: S,
    translator: T,
    tactic: Tactic,
    queries: usize,
    failures: usize,
}

impl<S: Solver> ProofOracle<S, BitVecTranslator> {
    /// Create an oracle using the default translator.
    pub fn new(solver: S) -> ProofOracle<S, BitVecTranslator> {
        ProofOracle::with_translator(solver, BitVecTranslator::new())
    }
}

impl<S: Solver, T: Translate> ProofOracle<S, T> {
    /// Create an oracle with the given translator.
    pub fn with_translator(solver: S, translator: T) -> ProofOracle<S, T> {
        ProofOracle {
            solver,
            translator,
            tactic: Tactic::default(),
            queries: 0,
            failures: 0,
        }
    }

    /// Set the tactic used for every following query.
    pub fn set_tactic(&mut self, tactic: Tactic) {
        self.tactic = tactic;
    }

    pub fn tactic(&self) -> &Tactic {
        &self.tactic
    }

    /// The solver context of this oracle.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// The number of queries sent to the solver.
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// The number of expressions the translator could not represent.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Returns true if `expression` is a tautology.
    pub fn prove(&mut self, expression: &Expression) -> bool {
        match self.translate(expression) {
            Some(term) => self.valid(Term::not(term), expression, "true"),
            None => false,
        }
    }

    /// Returns true if `expression` is a contradiction, or, `!expression` is a
    /// tautology.
    pub fn prove_false(&mut self, expression: &Expression) -> bool {
        match self.translate(expression) {
            Some(term) => self.valid(term, expression, "false"),
            None => false,
        }
    }

    /// Prove or refute `expression`.
    pub fn verdict(&mut self, expression: &Expression) -> Verdict {
        if self.prove(expression) {
            Verdict::True
        } else if self.prove_false(expression) {
            Verdict::False
        } else {
            Verdict::Unknown
        }
    }

    /// Returns true if `lhs` and `rhs` are logically equivalent.
    pub fn prove_equivalent(&mut self, lhs: &Expression, rhs: &Expression) -> bool {
        let (l, r) = match (self.translate(lhs), self.translate(rhs)) {
            (Some(l), Some(r)) => (l, r),
            _ => return false,
        };
        self.valid(Term::not(Term::eq(l, r)), lhs, "equivalent")
    }

    fn translate(&mut self, expression: &Expression) -> Option<Term> {
        match self.translator.translate(expression) {
            Ok(term) => Some(term),
            Err(error) => {
                self.failures += 1;
                debug!("not proving {}: {}", expression, error);
                None
            }
        }
    }

    // Returns true when `negation` is unsatisfiable.
    fn valid(&mut self, negation: Term, expression: &Expression, claim: &str) -> bool {
        self.queries += 1;
        let result = self
            .solver
            .check(&negation, &self.tactic)
            .and_then(|result| match result {
                SatResult::Unsat => Ok(()),
                SatResult::Sat | SatResult::Unknown => Err(Error::ProofInconclusive),
            });
        match result {
            Ok(()) => {
                debug!("{} proven {}", expression, claim);
                true
            }
            Err(Error::ProofInconclusive) => {
                trace!("{} not proven {}", expression, claim);
                false
            }
            Err(error) => {
                debug!("{} not proven {}: {}", expression, claim, error);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::solver::ExhaustiveSolver;

    fn i8_() -> Type {
        Type::int(8, true)
    }

    #[test]
    fn tautology() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i8_());
        let eq = builder.binary(BinaryOp::Eq, x.clone(), x);
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        assert!(oracle.prove(&eq));
        assert_eq!(oracle.verdict(&eq), Verdict::True);
    }

    #[test]
    fn contradiction() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i8_());
        let zero = builder.int(0, i8_());
        let gt = builder.binary(BinaryOp::Gt, x.clone(), zero.clone());
        let lt = builder.binary(BinaryOp::Lt, x, zero);
        let both = builder.land(gt, lt);
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        assert!(!oracle.prove(&both));
        assert!(oracle.prove_false(&both));
        assert_eq!(oracle.verdict(&both), Verdict::False);
    }

    #[test]
    fn wraparound_is_respected() {
        // x + 1 > x does not hold for x == 127
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i8_());
        let one = builder.int(1, i8_());
        let sum = builder.binary(BinaryOp::Add, x.clone(), one);
        let gt = builder.binary(BinaryOp::Gt, sum, x);
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        assert_eq!(oracle.verdict(&gt), Verdict::Unknown);
    }

    #[test]
    fn untranslatable_is_unknown() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i8_());
        let call = builder.call("f", i8_(), vec![x]);
        let zero = builder.int(0, i8_());
        let gt = builder.binary(BinaryOp::Gt, call, zero);
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        assert_eq!(oracle.verdict(&gt), Verdict::Unknown);
        assert_eq!(oracle.queries(), 0);
        assert_eq!(oracle.failures(), 2);
    }

    #[test]
    fn resource_exhaustion_is_unknown() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::int(32, true));
        let eq = builder.binary(BinaryOp::Eq, x.clone(), x);
        let mut oracle = ProofOracle::new(ExhaustiveSolver::with_max_bits(8));
        assert_eq!(oracle.verdict(&eq), Verdict::Unknown);
        assert_eq!(oracle.queries(), 2);
    }

    #[test]
    fn equivalence() {
        let mut builder = AstBuilder::new();
        let a = builder.variable("a", Type::Bool);
        let b = builder.variable("b", Type::Bool);
        let ab = builder.land(a.clone(), b.clone());
        let ba = builder.land(b, a.clone());
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        assert!(oracle.prove_equivalent(&ab, &ba));
        assert!(!oracle.prove_equivalent(&ab, &a));
    }

    #[test]
    fn tactic_setter() {
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        oracle.set_tactic(Tactic::named("smt").try_for(10));
        assert_eq!(oracle.tactic().timeout(), Some(10));
    }
}
