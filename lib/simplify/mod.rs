//! The condition simplification pass.
//!
//! `CondSimplifier` rewrites the condition of every `if`, `while` and `do`
//! statement into a simpler, semantically equivalent expression. Each
//! condition goes through rounds of three steps until nothing changes, or
//! until `Options::max_iterations` rounds have run:
//!
//! 1. Purely syntactic identities, applied bottom-up, left before right.
//!    Redundant parenthesis and no-op casts are dropped, double negations
//!    removed, and boolean literals folded through `!`, `&&` and `||`.
//! 2. Each operand of `&&` and `||` is proven true or false through the
//!    `ProofCache`, and proven operands are folded away.
//! 3. The whole condition is proven true or false through the `ProofCache`,
//!    and replaced with a literal when proven.
//!
//! Operands containing a call are never discarded when they would have been
//! evaluated, since the call may have side effects.
//!
//! Whatever the oracle cannot prove stays as it is. The only error which
//! escapes the pass is `Error::CacheInconsistency`.

mod options;

pub use self::options::*;

use crate::ast::*;
use crate::cache::ProofCache;
use crate::equivalence::EquivalenceEngine;
use crate::formula::{BitVecTranslator, Translate};
use crate::oracle::{ProofOracle, Verdict};
use crate::solver::{Solver, Tactic};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;


/// Where the simplification of a single condition stands.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    Unvisited,
    /// Syntactic rewrites and operand folding have run.
    ChildrenSimplified,
    /// The whole condition has been sent through the cache.
    ConditionEvaluated,
    /// The condition slot now holds a new expression.
    Rewritten,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            State::Unvisited => write!(f, "unvisited"),
            State::ChildrenSimplified => write!(f, "children simplified"),
            State::ConditionEvaluated => write!(f, "condition evaluated"),
            State::Rewritten => write!(f, "rewritten"),
        }
    }
}

/// Counters describing the work done by a `CondSimplifier`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Statistics {
    /// Conditions passed through `simplify`.
    pub conditions_visited: usize,
    /// Conditions which came out different.
    pub conditions_rewritten: usize,
    /// Queries sent to the solver.
    pub oracle_queries: usize,
    /// Proofs answered by the cache.
    pub cache_hits: usize,
    /// Rewrite rounds, across all conditions.
    pub iterations: usize,
}

// The outcome of applying identities at a single node.
enum Rewrite {
    Keep(ExpressionKind),
    Changed(ExpressionKind),
    Replace(Expression),
}

/// Simplifies the conditions of control statements.
///
/// A simplifier owns its solver, through its `ProofOracle`, and its proof
/// cache. Use one simplifier per unit of work, and do not share it between
/// threads.
pub struct CondSimplifier<'p, S, T = BitVecTranslator> {
    builder: AstBuilder,
    engine: EquivalenceEngine,
    cache: ProofCache,
    oracle: ProofOracle<S, T>,
    options: Options,
    statistics: Statistics,
    provenance: &'p mut Provenance,
}

impl<'p, S: Solver> CondSimplifier<'p, S, BitVecTranslator> {
    /// Create a simplifier with the default options.
    pub fn new(provenance: &'p mut Provenance, solver: S) -> CondSimplifier<'p, S> {
        CondSimplifier::with_options(provenance, solver, Options::default())
    }

    pub fn with_options(
        provenance: &'p mut Provenance,
        solver: S,
        options: Options,
    ) -> CondSimplifier<'p, S> {
        CondSimplifier::with_translator(provenance, solver, BitVecTranslator::new(), options)
    }
}

impl<'p, S: Solver, T: Translate> CondSimplifier<'p, S, T> {
    /// Create a simplifier which translates expressions with `translator`.
    pub fn with_translator(
        provenance: &'p mut Provenance,
        solver: S,
        translator: T,
        options: Options,
    ) -> CondSimplifier<'p, S, T> {
        let mut oracle = ProofOracle::with_translator(solver, translator);
        oracle.set_tactic(options.tactic().clone());
        CondSimplifier {
            builder: AstBuilder::new(),
            engine: EquivalenceEngine::new(),
            cache: ProofCache::new(),
            oracle,
            options,
            statistics: Statistics::default(),
            provenance,
        }
    }

    /// Set the tactic used for every following solver query.
    pub fn set_tactic(&mut self, tactic: Tactic) {
        self.options.set_tactic(tactic.clone());
        self.oracle.set_tactic(tactic);
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The oracle, and through it the solver context, of this simplifier.
    pub fn oracle(&self) -> &ProofOracle<S, T> {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut ProofOracle<S, T> {
        &mut self.oracle
    }

    pub fn cache(&self) -> &ProofCache {
        &self.cache
    }

    /// The builder this simplifier creates nodes with.
    pub fn builder_mut(&mut self) -> &mut AstBuilder {
        &mut self.builder
    }

    pub fn provenance(&self) -> &Provenance {
        &*self.provenance
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            oracle_queries: self.oracle.queries(),
            cache_hits: self.cache.hits(),
            ..self.statistics
        }
    }

    /// Simplify a single condition, returning the simplified condition.
    ///
    /// The returned expression has the same id as `condition` if, and only
    /// if, nothing was rewritten.
    pub fn simplify(&mut self, condition: Expression) -> Result<Expression, Error> {
        self.statistics.conditions_visited += 1;

        let original = condition.id();
        let text = condition.to_string();
        let mut state = State::Unvisited;
        let mut condition = condition;
        let mut fixpoint = false;

        for _ in 0..self.options.max_iterations() {
            self.statistics.iterations += 1;
            let before = condition.id();

            let rewritten = self.rewrite(condition)?;
            let rewritten = self.strip_parens(rewritten);
            let folded = if self.options.fold_operands() {
                self.fold(rewritten)?
            } else {
                rewritten
            };
            self.transition(&mut state, State::ChildrenSimplified, &text);

            condition = self.evaluate(folded)?;
            self.transition(&mut state, State::ConditionEvaluated, &text);

            if condition.id() == before {
                fixpoint = true;
                break;
            }
        }

        if !fixpoint {
            warn!(
                "{} did not reach a fixpoint within {} iterations, stopping at {}",
                text,
                self.options.max_iterations(),
                condition
            );
        }

        if condition.id() != original {
            self.provenance.inherit(condition.id(), original);
            self.statistics.conditions_rewritten += 1;
            self.transition(&mut state, State::Rewritten, &text);
            debug!("rewrote {} to {}", text, condition);
        }

        Ok(condition)
    }

    /// Simplify the condition of an `if` statement in place. Returns true if
    /// the condition changed.
    pub fn visit_if(&mut self, statement: &mut Statement) -> Result<bool, Error> {
        match *statement {
            Statement::If { .. } => self.visit_condition(statement),
            _ => Err(Error::UnexpectedStatement(format!(
                "expected if, found {}",
                statement.kind_name()
            ))),
        }
    }

    /// Simplify the condition of a `while` statement in place. Returns true if
    /// the condition changed.
    pub fn visit_while(&mut self, statement: &mut Statement) -> Result<bool, Error> {
        match *statement {
            Statement::While { .. } => self.visit_condition(statement),
            _ => Err(Error::UnexpectedStatement(format!(
                "expected while, found {}",
                statement.kind_name()
            ))),
        }
    }

    /// Simplify the condition of a `do` statement in place. Returns true if
    /// the condition changed.
    pub fn visit_do(&mut self, statement: &mut Statement) -> Result<bool, Error> {
        match *statement {
            Statement::Do { .. } => self.visit_condition(statement),
            _ => Err(Error::UnexpectedStatement(format!(
                "expected do, found {}",
                statement.kind_name()
            ))),
        }
    }

    /// Simplify every condition in a statement tree, in source order. A
    /// control statement's condition is visited before its bodies.
    pub fn visit_statement(&mut self, statement: &mut Statement) -> Result<bool, Error> {
        let mut changed = match *statement {
            Statement::If { .. } => self.visit_if(statement)?,
            Statement::While { .. } => self.visit_while(statement)?,
            Statement::Do { .. } => self.visit_do(statement)?,
            _ => false,
        };

        match *statement {
            Statement::Compound(ref mut statements) => {
                for statement in statements.iter_mut() {
                    changed |= self.visit_statement(statement)?;
                }
            }
            Statement::If {
                ref mut then,
                ref mut else_,
                ..
            } => {
                changed |= self.visit_statement(then)?;
                if let Some(else_) = else_ {
                    changed |= self.visit_statement(else_)?;
                }
            }
            Statement::While { ref mut body, .. } | Statement::Do { ref mut body, .. } => {
                changed |= self.visit_statement(body)?;
            }
            Statement::Expr(_) | Statement::Return(_) | Statement::Break | Statement::Continue => {}
        }

        Ok(changed)
    }

    /// Simplify every condition in a function. Returns true if anything
    /// changed.
    pub fn run_on_function(&mut self, function: &mut Function) -> Result<bool, Error> {
        let changed = self.visit_statement(function.body_mut())?;
        debug!(
            "{}: {}",
            function.name(),
            if changed { "simplified" } else { "unchanged" }
        );
        Ok(changed)
    }

    /// Simplify every condition in every function of a unit. Returns true if
    /// anything changed.
    pub fn run_on_unit(&mut self, unit: &mut Unit) -> Result<bool, Error> {
        let mut changed = false;
        for function in unit.functions_mut() {
            changed |= self.run_on_function(function)?;
        }
        Ok(changed)
    }

    fn visit_condition(&mut self, statement: &mut Statement) -> Result<bool, Error> {
        let kind = statement.kind_name();
        let slot = statement.condition_mut().ok_or_else(|| {
            Error::UnexpectedStatement(format!("{} has no condition", kind))
        })?;

        let simplified = self.simplify(slot.clone())?;
        if simplified.id() == slot.id() {
            return Ok(false);
        }
        *slot = simplified;
        Ok(true)
    }

    fn transition(&self, state: &mut State, next: State, condition: &str) {
        if *state != next {
            trace!("{}: {} -> {}", condition, state, next);
            *state = next;
        }
    }

    // Build a node from `kind`. A node whose children changed gets a fresh id
    // and inherits the provenance of the node it replaces.
    fn finish(&mut self, id: NodeId, kind: ExpressionKind, changed: bool) -> Expression {
        if changed {
            let expression = self.builder.expression(kind);
            self.provenance.inherit(expression.id(), id);
            expression
        } else {
            Expression::new(id, kind)
        }
    }

    fn replace(&mut self, replacement: Expression, id: NodeId) -> Expression {
        self.provenance.inherit(replacement.id(), id);
        replacement
    }

    // Apply `f` to every child of `expression`, left to right.
    fn map_children<F>(&mut self, expression: Expression, mut f: F) -> Result<Expression, Error>
    where
        F: FnMut(&mut Self, Expression) -> Result<Expression, Error>,
    {
        let id = expression.id();
        let mut changed = false;
        let mut visit = |this: &mut Self, child: Expression| -> Result<Box<Expression>, Error> {
            let before = child.id();
            let child = f(this, child)?;
            if child.id() != before {
                changed = true;
            }
            Ok(Box::new(child))
        };

        let kind = match expression.into_kind() {
            ExpressionKind::Unary(op, operand) => ExpressionKind::Unary(op, visit(self, *operand)?),
            ExpressionKind::Binary(op, lhs, rhs) => {
                let lhs = visit(self, *lhs)?;
                let rhs = visit(self, *rhs)?;
                ExpressionKind::Binary(op, lhs, rhs)
            }
            ExpressionKind::Ternary(condition, then, else_) => {
                let condition = visit(self, *condition)?;
                let then = visit(self, *then)?;
                let else_ = visit(self, *else_)?;
                ExpressionKind::Ternary(condition, then, else_)
            }
            ExpressionKind::Paren(inner) => ExpressionKind::Paren(visit(self, *inner)?),
            ExpressionKind::Cast(ty, inner) => ExpressionKind::Cast(ty, visit(self, *inner)?),
            ExpressionKind::Call(name, ty, args) => {
                let mut simplified = Vec::with_capacity(args.len());
                for arg in args {
                    simplified.push(*visit(self, arg)?);
                }
                ExpressionKind::Call(name, ty, simplified)
            }
            kind => kind,
        };

        Ok(self.finish(id, kind, changed))
    }

    // Step 1: syntactic identities, bottom-up.
    fn rewrite(&mut self, expression: Expression) -> Result<Expression, Error> {
        let expression = self.map_children(expression, |this, child| this.rewrite(child))?;
        Ok(self.identities(expression))
    }

    fn identities(&mut self, expression: Expression) -> Expression {
        let id = expression.id();
        let rewrite = match expression.into_kind() {
            ExpressionKind::Paren(inner) => {
                let redundant = matches!(
                    inner.kind(),
                    ExpressionKind::Variable(_)
                        | ExpressionKind::Constant(_)
                        | ExpressionKind::Paren(_)
                );
                if redundant {
                    Rewrite::Replace(*inner)
                } else {
                    Rewrite::Keep(ExpressionKind::Paren(inner))
                }
            }
            ExpressionKind::Cast(ty, inner) => {
                if inner.ty() == ty {
                    Rewrite::Replace(*inner)
                } else {
                    Rewrite::Keep(ExpressionKind::Cast(ty, inner))
                }
            }
            ExpressionKind::Unary(UnaryOp::LNot, operand) => {
                let (operand, collapsed) = self.boolean_position(*operand);
                self.negation(operand, collapsed)
            }
            ExpressionKind::Binary(BinaryOp::LAnd, lhs, rhs) => {
                let (lhs, lhs_collapsed) = self.boolean_position(*lhs);
                let (rhs, rhs_collapsed) = self.boolean_position(*rhs);
                match (lhs.as_bool(), rhs.as_bool()) {
                    // rhs is never evaluated
                    (Some(false), _) => Rewrite::Replace(lhs),
                    (_, Some(false)) if !lhs.has_call() => Rewrite::Replace(rhs),
                    (Some(true), _) if rhs.ty().is_bool() => Rewrite::Replace(rhs),
                    (_, Some(true)) if lhs.ty().is_bool() => Rewrite::Replace(lhs),
                    _ => logical(
                        BinaryOp::LAnd,
                        lhs,
                        rhs,
                        lhs_collapsed || rhs_collapsed,
                    ),
                }
            }
            ExpressionKind::Binary(BinaryOp::LOr, lhs, rhs) => {
                let (lhs, lhs_collapsed) = self.boolean_position(*lhs);
                let (rhs, rhs_collapsed) = self.boolean_position(*rhs);
                match (lhs.as_bool(), rhs.as_bool()) {
                    // rhs is never evaluated
                    (Some(true), _) => Rewrite::Replace(lhs),
                    (_, Some(true)) if !lhs.has_call() => Rewrite::Replace(rhs),
                    (Some(false), _) if rhs.ty().is_bool() => Rewrite::Replace(rhs),
                    (_, Some(false)) if lhs.ty().is_bool() => Rewrite::Replace(lhs),
                    _ => logical(
                        BinaryOp::LOr,
                        lhs,
                        rhs,
                        lhs_collapsed || rhs_collapsed,
                    ),
                }
            }
            kind => Rewrite::Keep(kind),
        };

        match rewrite {
            Rewrite::Keep(kind) => Expression::new(id, kind),
            Rewrite::Changed(kind) => self.finish(id, kind, true),
            Rewrite::Replace(replacement) => self.replace(replacement, id),
        }
    }

    fn negation(&mut self, operand: Expression, collapsed: bool) -> Rewrite {
        if let Some(value) = operand.as_bool() {
            let literal = self.builder.bool_(!value);
            self.provenance.inherit(literal.id(), operand.id());
            return Rewrite::Replace(literal);
        }

        let inner = match *unparen(&operand).kind() {
            ExpressionKind::Unary(UnaryOp::LNot, ref inner) => Some((**inner).clone()),
            _ => None,
        };
        match inner {
            Some(inner) => {
                self.provenance.inherit(inner.id(), operand.id());
                if inner.ty().is_bool() {
                    Rewrite::Replace(inner)
                } else {
                    let zero = self.builder.int(0, inner.ty());
                    let ne = self.builder.binary(BinaryOp::Ne, inner, zero);
                    self.provenance.inherit(ne.id(), operand.id());
                    Rewrite::Replace(ne)
                }
            }
            None if collapsed => {
                Rewrite::Changed(ExpressionKind::Unary(UnaryOp::LNot, Box::new(operand)))
            }
            None => Rewrite::Keep(ExpressionKind::Unary(UnaryOp::LNot, Box::new(operand))),
        }
    }

    // An integer literal in boolean position becomes `true` or `false`.
    fn boolean_position(&mut self, operand: Expression) -> (Expression, bool) {
        let value = match *operand.kind() {
            ExpressionKind::Constant(ref constant) if !constant.ty().is_bool() => {
                Some(constant.is_nonzero())
            }
            _ => None,
        };
        let value = match value {
            Some(value) => value,
            None => return (operand, false),
        };
        let literal = self.builder.bool_(value);
        (self.replace(literal, operand.id()), true)
    }

    fn strip_parens(&mut self, condition: Expression) -> Expression {
        let id = condition.id();
        match condition.into_kind() {
            ExpressionKind::Paren(inner) => {
                let inner = self.replace(*inner, id);
                self.strip_parens(inner)
            }
            kind => Expression::new(id, kind),
        }
    }

    // Step 2: prove the operands of `&&` and `||`, bottom-up.
    fn fold(&mut self, expression: Expression) -> Result<Expression, Error> {
        let expression = self.map_children(expression, |this, child| this.fold(child))?;

        let id = expression.id();
        let (op, lhs, rhs) = match expression.into_kind() {
            ExpressionKind::Binary(op, lhs, rhs) if op.is_logical() => (op, *lhs, *rhs),
            kind => return Ok(Expression::new(id, kind)),
        };

        let (lhs, lhs_proven) = self.prove_operand(lhs)?;
        let (rhs, rhs_proven) = self.prove_operand(rhs)?;
        let changed = lhs_proven || rhs_proven;
        let expression = self.finish(
            id,
            ExpressionKind::Binary(op, Box::new(lhs), Box::new(rhs)),
            changed,
        );

        Ok(if changed {
            self.identities(expression)
        } else {
            expression
        })
    }

    fn prove_operand(&mut self, operand: Expression) -> Result<(Expression, bool), Error> {
        if !operand.ty().is_bool() || operand.as_bool().is_some() || operand.has_call() {
            return Ok((operand, false));
        }
        match self.verdict(&operand)? {
            Verdict::True => Ok((self.literal(true, operand.id()), true)),
            Verdict::False => Ok((self.literal(false, operand.id()), true)),
            Verdict::Unknown => Ok((operand, false)),
        }
    }

    // Step 3: prove the whole condition.
    fn evaluate(&mut self, condition: Expression) -> Result<Expression, Error> {
        let (condition, _) = self.boolean_position(condition);
        if condition.as_bool().is_some() || condition.has_call() {
            return Ok(condition);
        }
        Ok(match self.verdict(&condition)? {
            Verdict::True => self.literal(true, condition.id()),
            Verdict::False => self.literal(false, condition.id()),
            Verdict::Unknown => condition,
        })
    }

    fn verdict(&mut self, expression: &Expression) -> Result<Verdict, Error> {
        let verdict = self
            .cache
            .verdict(expression, &mut self.engine, &mut self.oracle)?;
        if verdict != Verdict::Unknown {
            debug!("{} is {}", expression, verdict);
        }
        Ok(verdict)
    }

    fn literal(&mut self, value: bool, replaces: NodeId) -> Expression {
        let literal = self.builder.bool_(value);
        self.replace(literal, replaces)
    }
}

fn logical(op: BinaryOp, lhs: Expression, rhs: Expression, changed: bool) -> Rewrite {
    let kind = ExpressionKind::Binary(op, Box::new(lhs), Box::new(rhs));
    if changed {
        Rewrite::Changed(kind)
    } else {
        Rewrite::Keep(kind)
    }
}

fn unparen(expression: &Expression) -> &Expression {
    match *expression.kind() {
        ExpressionKind::Paren(ref inner) => unparen(inner),
        _ => expression,
    }
}
