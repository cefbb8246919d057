//! Condsimp: simplification of decompiled control-flow conditions.
//!
//! Decompilers synthesize the conditions of `if`, `while` and `do` statements
//! mechanically, and the results are frequently redundant, double-negated, or
//! provably constant. Condsimp rewrites those conditions into small, readable
//! boolean expressions without changing program semantics.
//!
//! The work is split into a few pieces:
//!
//! * `ast` - The expressions, statements and functions we rewrite.
//! * `equivalence` - Structural hashing and semantic equality over expressions.
//! * `formula` - Solver terms, and translation of expressions into terms.
//! * `solver` - Back ends which decide satisfiability of terms.
//! * `oracle` - Answers, "Is this expression a tautology?"
//! * `cache` - Memoizes oracle answers per equivalence class.
//! * `simplify` - The rewrite pass itself.
//!
//! A short example, using the exhaustive solver so no external solver is
//! needed:
//!
//! ```
//! use condsimp::ast;
//! use condsimp::simplify::CondSimplifier;
//! use condsimp::solver::ExhaustiveSolver;
//!
//! let mut builder = ast::AstBuilder::new();
//! let x = builder.variable("x", ast::Type::int(8, true));
//! let zero = builder.int(0, ast::Type::int(8, true));
//! let gt = builder.binary(ast::BinaryOp::Gt, x, zero);
//! let not = builder.lnot(gt);
//! let condition = builder.lnot(not);
//!
//! let mut provenance = ast::Provenance::new();
//! let mut simplifier = CondSimplifier::new(&mut provenance, ExhaustiveSolver::new());
//! let simplified = simplifier.simplify(condition).unwrap();
//! assert_eq!(simplified.to_string(), "x > 0");
//! ```

#[macro_use]
extern crate log;

pub mod ast;
pub mod cache;
pub mod equivalence;
pub mod formula;
pub mod oracle;
pub mod simplify;
pub mod solver;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expression cannot be translated to a formula: {0}")]
    UnsupportedExpression(String),
    #[error("Solver could not decide the query")]
    ProofInconclusive,
    #[error("Solver resources exhausted: {0}")]
    ResourceExhausted(String),
    #[error("Expression proven both true and false: {0}")]
    CacheInconsistency(String),
    #[error("Solver error: {0}")]
    Solver(String),
    #[error("Unexpected statement: {0}")]
    UnexpectedStatement(String),
    #[error("Sort mismatch: {0}")]
    Sort(String),
    #[error("Free constant {0} has no value in the model")]
    MissingValue(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Error {
        Error::Custom(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
