//! A `Solver` which enumerates every assignment of the free constants.
//!
//! This is only practical for small problems. When the free constants of a
//! query are wider than `max_bits` in total, the solver refuses the query
//! with `Error::ResourceExhausted`. A `TryFor` bound in the tactic is honoured
//! as a wall-clock limit on the enumeration; the tactic is otherwise ignored.

use crate::formula::{Model, Sort, Term, Value};
use crate::solver::{SatResult, Solver, Tactic};
use crate::Error;
use std::time::{Duration, Instant};

/// The default limit on the total width of free constants.
pub const DEFAULT_MAX_BITS: usize = 20;

#[derive(Clone, Debug)]
pub struct ExhaustiveSolver {
    max_bits: usize,
}

impl ExhaustiveSolver {
    pub fn new() -> ExhaustiveSolver {
        ExhaustiveSolver {
            max_bits: DEFAULT_MAX_BITS,
        }
    }

    /// An exhaustive solver which refuses queries whose free constants are
    /// wider than `max_bits` in total.
    pub fn with_max_bits(max_bits: usize) -> ExhaustiveSolver {
        ExhaustiveSolver { max_bits }
    }

    pub fn max_bits(&self) -> usize {
        self.max_bits
    }
}

impl Default for ExhaustiveSolver {
    fn default() -> ExhaustiveSolver {
        ExhaustiveSolver::new()
    }
}

fn sort_bits(sort: Sort) -> usize {
    match sort {
        Sort::Bool => 1,
        Sort::BitVec(bits) => bits,
    }
}

impl Solver for ExhaustiveSolver {
    fn check(&mut self, assertion: &Term, tactic: &Tactic) -> Result<SatResult, Error> {
        let constants = assertion.free_constants();
        let total_bits: usize = constants.values().map(|sort| sort_bits(*sort)).sum();
        if total_bits > self.max_bits || total_bits >= 64 {
            return Err(Error::ResourceExhausted(format!(
                "{} free bits exceeds the limit of {}",
                total_bits, self.max_bits
            )));
        }

        let deadline = tactic
            .timeout()
            .map(|milliseconds| Instant::now() + Duration::from_millis(milliseconds));

        for assignment in 0u64..(1u64 << total_bits) {
            if assignment & 0x3ff == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() > deadline {
                        return Err(Error::ResourceExhausted(
                            "enumeration exceeded the tactic's time bound".to_string(),
                        ));
                    }
                }
            }

            let mut model = Model::new();
            let mut offset = 0;
            for (name, sort) in constants.iter() {
                let bits = sort_bits(*sort);
                let value = (assignment >> offset) & ((1u64 << bits) - 1);
                offset += bits;
                let value = match *sort {
                    Sort::Bool => Value::Bool(value != 0),
                    Sort::BitVec(bits) => Value::bv(value, bits),
                };
                model.insert(name.clone(), value);
            }

            match assertion.eval(&model)? {
                Value::Bool(true) => return Ok(SatResult::Sat),
                Value::Bool(false) => {}
                Value::BitVec { .. } => {
                    return Err(Error::Sort(format!("assertion {} is not a Bool", assertion)))
                }
            }
        }

        Ok(SatResult::Unsat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::BvCompareOp;

    #[test]
    fn decides_small_queries() {
        let mut solver = ExhaustiveSolver::new();
        let x = Term::constant("x", Sort::BitVec(8));

        let positive = Term::bv_compare(BvCompareOp::Sgt, x.clone(), Term::bv(0, 8));
        let negative = Term::bv_compare(BvCompareOp::Slt, x.clone(), Term::bv(0, 8));
        let both = Term::and(positive.clone(), negative);

        assert_eq!(
            solver.check(&positive, &Tactic::default()).unwrap(),
            SatResult::Sat
        );
        assert_eq!(
            solver.check(&both, &Tactic::default()).unwrap(),
            SatResult::Unsat
        );
    }

    #[test]
    fn closed_terms() {
        let mut solver = ExhaustiveSolver::new();
        assert_eq!(
            solver.check(&Term::Bool(false), &Tactic::default()).unwrap(),
            SatResult::Unsat
        );
        assert_eq!(
            solver.check(&Term::Bool(true), &Tactic::default()).unwrap(),
            SatResult::Sat
        );
    }

    #[test]
    fn refuses_wide_queries() {
        let mut solver = ExhaustiveSolver::with_max_bits(16);
        let x = Term::constant("x", Sort::BitVec(32));
        let eq = Term::eq(x.clone(), x);
        match solver.check(&eq, &Tactic::default()) {
            Err(Error::ResourceExhausted(_)) => {}
            other => panic!("expected ResourceExhausted, got {:?}", other),
        }
    }
}
