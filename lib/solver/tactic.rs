use serde::{Deserialize, Serialize};
use std::fmt;

/// A solving strategy, with resource bounds.
///
/// Tactics render in z3's tactic syntax, for use with `check-sat-using`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Tactic {
    /// A primitive tactic, such as `simplify` or `smt`.
    Named(String),
    /// Apply each tactic in turn.
    Then(Vec<Tactic>),
    /// Try each tactic in turn until one succeeds.
    OrElse(Vec<Tactic>),
    /// Give up on the inner tactic after a number of milliseconds.
    TryFor(Box<Tactic>, u64),
}

impl Tactic {
    pub fn named<S>(name: S) -> Tactic
    where
        S: Into<String>,
    {
        Tactic::Named(name.into())
    }

    pub fn then(tactics: Vec<Tactic>) -> Tactic {
        Tactic::Then(tactics)
    }

    pub fn or_else(tactics: Vec<Tactic>) -> Tactic {
        Tactic::OrElse(tactics)
    }

    /// Bound this tactic to `milliseconds`.
    pub fn try_for(self, milliseconds: u64) -> Tactic {
        Tactic::TryFor(Box::new(self), milliseconds)
    }

    /// The tightest time bound anywhere in this tactic, in milliseconds.
    pub fn timeout(&self) -> Option<u64> {
        match *self {
            Tactic::Named(_) => None,
            Tactic::Then(ref tactics) | Tactic::OrElse(ref tactics) => {
                tactics.iter().filter_map(|tactic| tactic.timeout()).min()
            }
            Tactic::TryFor(ref tactic, milliseconds) => Some(
                tactic
                    .timeout()
                    .map(|inner| inner.min(milliseconds))
                    .unwrap_or(milliseconds),
            ),
        }
    }
}

impl Default for Tactic {
    fn default() -> Tactic {
        Tactic::then(vec![
            Tactic::named("simplify"),
            Tactic::named("solve-eqs"),
            Tactic::named("smt"),
        ])
        .try_for(1000)
    }
}

fn fmt_combinator(f: &mut fmt::Formatter, name: &str, tactics: &[Tactic]) -> fmt::Result {
    match tactics.len() {
        0 => write!(f, "skip"),
        1 => write!(f, "{}", tactics[0]),
        _ => write!(
            f,
            "({} {})",
            name,
            tactics
                .iter()
                .map(|tactic| tactic.to_string())
                .collect::<Vec<String>>()
                .join(" ")
        ),
    }
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tactic::Named(ref name) => write!(f, "{}", name),
            Tactic::Then(ref tactics) => fmt_combinator(f, "then", tactics),
            Tactic::OrElse(ref tactics) => fmt_combinator(f, "or-else", tactics),
            Tactic::TryFor(ref tactic, milliseconds) => {
                write!(f, "(try-for {} {})", tactic, milliseconds)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tactic() {
        let tactic = Tactic::default();
        assert_eq!(
            tactic.to_string(),
            "(try-for (then simplify solve-eqs smt) 1000)"
        );
        assert_eq!(tactic.timeout(), Some(1000));
    }

    #[test]
    fn single_tactic_combinators_collapse() {
        let tactic = Tactic::or_else(vec![Tactic::named("smt")]);
        assert_eq!(tactic.to_string(), "smt");
        assert_eq!(tactic.timeout(), None);
    }

    #[test]
    fn tightest_timeout() {
        let tactic = Tactic::or_else(vec![
            Tactic::named("sat").try_for(50),
            Tactic::named("smt").try_for(200),
        ])
        .try_for(500);
        assert_eq!(tactic.timeout(), Some(50));
    }

    #[test]
    fn serializes() {
        let tactic = Tactic::default();
        let json = serde_json::to_string(&tactic).unwrap();
        let back: Tactic = serde_json::from_str(&json).unwrap();
        assert_eq!(tactic, back);
    }
}
