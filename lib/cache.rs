//! Memoized proofs, keyed by equivalence class.
//!
//! The cache holds two maps, "proven true" and "proven false", from an
//! expression to whether the oracle could prove it. Lookups bucket on the
//! structural hash of an expression, and compare within a bucket using
//! semantic equality, so every expression semantically equal to an earlier
//! query shares that query's answer. The first expression queried for a class
//! becomes the representative of that class.
//!
//! Each class is sent to the oracle at most once per polarity, which bounds
//! solver queries by the number of distinct conditions rather than the number
//! of times they occur.
//!
//! A class is never proven both true and false. An oracle answer which would
//! break this means reasoning somewhere is unsound, and is reported as
//! `Error::CacheInconsistency`.

use crate::ast::Expression;
use crate::equivalence::EquivalenceEngine;
use crate::formula::Translate;
use crate::oracle::{ProofOracle, Verdict};
use crate::solver::Solver;
use crate::Error;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
struct ClassMap {
    buckets: FxHashMap<u64, Vec<(Expression, bool)>>,
    len: usize,
}

impl ClassMap {
    fn get(&self, hash: u64, expression: &Expression, engine: &EquivalenceEngine) -> Option<bool> {
        self.buckets.get(&hash).and_then(|bucket| {
            bucket
                .iter()
                .find(|(representative, _)| engine.equivalent(representative, expression))
                .map(|(_, proven)| *proven)
        })
    }

    fn insert(&mut self, hash: u64, expression: &Expression, proven: bool) {
        self.buckets
            .entry(hash)
            .or_default()
            .push((expression.clone(), proven));
        self.len += 1;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Polarity {
    True,
    False,
}

/// Proofs of truth and falsity, memoized per equivalence class.
#[derive(Clone, Debug, Default)]
pub struct ProofCache {
    proven_true: ClassMap,
    proven_false: ClassMap,
    hits: usize,
}

impl ProofCache {
    pub fn new() -> ProofCache {
        ProofCache::default()
    }

    /// Returns true if `expression` is a tautology, asking `oracle` only when
    /// no semantically equal expression has been asked before.
    pub fn is_proven_true<S: Solver, T: Translate>(
        &mut self,
        expression: &Expression,
        engine: &mut EquivalenceEngine,
        oracle: &mut ProofOracle<S, T>,
    ) -> Result<bool, Error> {
        self.lookup(Polarity::True, expression, engine, oracle)
    }

    /// Returns true if `expression` is a contradiction, asking `oracle` only
    /// when no semantically equal expression has been asked before.
    pub fn is_proven_false<S: Solver, T: Translate>(
        &mut self,
        expression: &Expression,
        engine: &mut EquivalenceEngine,
        oracle: &mut ProofOracle<S, T>,
    ) -> Result<bool, Error> {
        self.lookup(Polarity::False, expression, engine, oracle)
    }

    /// Prove or refute `expression`.
    pub fn verdict<S: Solver, T: Translate>(
        &mut self,
        expression: &Expression,
        engine: &mut EquivalenceEngine,
        oracle: &mut ProofOracle<S, T>,
    ) -> Result<Verdict, Error> {
        if self.is_proven_true(expression, engine, oracle)? {
            Ok(Verdict::True)
        } else if self.is_proven_false(expression, engine, oracle)? {
            Ok(Verdict::False)
        } else {
            Ok(Verdict::Unknown)
        }
    }

    /// Returns true if the class of `expression` has been queried for truth.
    pub fn contains_true(&self, expression: &Expression, engine: &mut EquivalenceEngine) -> bool {
        let hash = engine.hash(expression);
        self.proven_true.get(hash, expression, engine).is_some()
    }

    /// Returns true if the class of `expression` has been queried for falsity.
    pub fn contains_false(&self, expression: &Expression, engine: &mut EquivalenceEngine) -> bool {
        let hash = engine.hash(expression);
        self.proven_false.get(hash, expression, engine).is_some()
    }

    /// The number of entries across both maps.
    pub fn len(&self) -> usize {
        self.proven_true.len + self.proven_false.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of lookups answered without the oracle.
    pub fn hits(&self) -> usize {
        self.hits
    }

    fn lookup<S: Solver, T: Translate>(
        &mut self,
        polarity: Polarity,
        expression: &Expression,
        engine: &mut EquivalenceEngine,
        oracle: &mut ProofOracle<S, T>,
    ) -> Result<bool, Error> {
        let hash = engine.hash(expression);

        let (map, other) = match polarity {
            Polarity::True => (&mut self.proven_true, &self.proven_false),
            Polarity::False => (&mut self.proven_false, &self.proven_true),
        };

        if let Some(proven) = map.get(hash, expression, engine) {
            trace!("cache hit for {} ({:?}): {}", expression, polarity, proven);
            self.hits += 1;
            return Ok(proven);
        }

        let proven = match polarity {
            Polarity::True => oracle.prove(expression),
            Polarity::False => oracle.prove_false(expression),
        };

        if proven && other.get(hash, expression, engine) == Some(true) {
            error!(
                "{} proven both true and false, refusing to cache",
                expression
            );
            return Err(Error::CacheInconsistency(expression.to_string()));
        }

        map.insert(hash, expression, proven);
        Ok(proven)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::formula::Term;
    use crate::solver::{ExhaustiveSolver, SatResult, Tactic};

    fn i8_() -> Type {
        Type::int(8, true)
    }

    fn a_and_b(builder: &mut AstBuilder) -> Expression {
        let a = builder.variable("a", Type::Bool);
        let b = builder.variable("b", Type::Bool);
        builder.land(a, b)
    }

    #[test]
    fn one_query_per_class_per_polarity() {
        let mut builder = AstBuilder::new();
        let first = a_and_b(&mut builder);
        let second = a_and_b(&mut builder);
        let inner = a_and_b(&mut builder);
        let third = builder.paren(inner);

        let mut engine = EquivalenceEngine::new();
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        let mut cache = ProofCache::new();

        assert_eq!(
            cache.verdict(&first, &mut engine, &mut oracle).unwrap(),
            Verdict::Unknown
        );
        assert_eq!(oracle.queries(), 2);

        for expression in [&second, &third] {
            assert_eq!(
                cache.verdict(expression, &mut engine, &mut oracle).unwrap(),
                Verdict::Unknown
            );
        }
        assert_eq!(oracle.queries(), 2);
        assert_eq!(cache.hits(), 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn distinct_classes_are_queried_separately() {
        let mut builder = AstBuilder::new();
        let a = builder.variable("a", Type::Bool);
        let b = builder.variable("b", Type::Bool);
        let ab = builder.land(a.clone(), b.clone());
        let ba = builder.land(b, a);

        let mut engine = EquivalenceEngine::new();
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        let mut cache = ProofCache::new();

        cache.is_proven_true(&ab, &mut engine, &mut oracle).unwrap();
        cache.is_proven_true(&ba, &mut engine, &mut oracle).unwrap();
        assert_eq!(oracle.queries(), 2);
        assert!(cache.contains_true(&ab, &mut engine));
        assert!(!cache.contains_false(&ab, &mut engine));
    }

    #[test]
    fn proofs_are_cached() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", i8_());
        let eq = builder.binary(BinaryOp::Eq, x.clone(), x);

        let mut engine = EquivalenceEngine::new();
        let mut oracle = ProofOracle::new(ExhaustiveSolver::new());
        let mut cache = ProofCache::new();

        assert!(cache.is_proven_true(&eq, &mut engine, &mut oracle).unwrap());
        assert!(cache.is_proven_true(&eq, &mut engine, &mut oracle).unwrap());
        assert!(!cache.is_proven_false(&eq, &mut engine, &mut oracle).unwrap());
        assert_eq!(oracle.queries(), 2);
    }

    // Claims every query is unsatisfiable, so everything is "proven".
    struct UnsoundSolver;

    impl Solver for UnsoundSolver {
        fn check(&mut self, _: &Term, _: &Tactic) -> Result<SatResult, Error> {
            Ok(SatResult::Unsat)
        }
    }

    #[test]
    fn inconsistency_is_reported() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::Bool);

        let mut engine = EquivalenceEngine::new();
        let mut oracle = ProofOracle::new(UnsoundSolver);
        let mut cache = ProofCache::new();

        assert!(cache.is_proven_true(&x, &mut engine, &mut oracle).unwrap());
        match cache.is_proven_false(&x, &mut engine, &mut oracle) {
            Err(Error::CacheInconsistency(_)) => {}
            other => panic!("expected CacheInconsistency, got {:?}", other),
        }
        assert!(!cache.contains_false(&x, &mut engine));
    }
}
