use crate::solver::Tactic;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::default;

/// The default bound on rewrite rounds per condition.
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Options which change the behavior of the condition simplifier.
///
/// Options can be loaded from JSON. Missing fields take their default value.
///
/// ```
/// use condsimp::simplify::Options;
///
/// let options = Options::from_json(r#"{"max_iterations": 2}"#).unwrap();
/// assert_eq!(options.max_iterations(), 2);
/// assert!(options.fold_operands());
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Options {
    max_iterations: usize,
    tactic: Tactic,
    fold_operands: bool,
}

impl Options {
    /// Create a new set of Options with the default settings.
    pub fn new() -> Options {
        Options::default()
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> Result<Options, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// The largest number of rewrite rounds applied to a single condition
    /// before we give up on reaching a fixpoint.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    /// The tactic the solver uses for every query.
    pub fn tactic(&self) -> &Tactic {
        &self.tactic
    }

    pub fn set_tactic(&mut self, tactic: Tactic) {
        self.tactic = tactic;
    }

    /// Whether the operands of `&&` and `||` are proven individually.
    ///
    /// When false, only whole conditions are sent to the oracle. This saves
    /// solver time on large conditions, at the cost of missing operands which
    /// are constant on their own.
    pub fn fold_operands(&self) -> bool {
        self.fold_operands
    }

    pub fn set_fold_operands(&mut self, fold_operands: bool) {
        self.fold_operands = fold_operands;
    }
}

impl default::Default for Options {
    fn default() -> Options {
        Options {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tactic: Tactic::default(),
            fold_operands: true,
        }
    }
}

/// Create your options with the builder pattern.
///
/// For more details on the options, see `simplify::Options`
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    pub fn new() -> OptionsBuilder {
        OptionsBuilder {
            options: Options::default(),
        }
    }

    /// Set the fixpoint bound. By default this is 8.
    pub fn max_iterations(mut self, max_iterations: usize) -> OptionsBuilder {
        self.options.max_iterations = max_iterations;
        self
    }

    pub fn tactic(mut self, tactic: Tactic) -> OptionsBuilder {
        self.options.tactic = tactic;
        self
    }

    /// Set the, "Fold operands," option. By default this is true.
    pub fn fold_operands(mut self, fold_operands: bool) -> OptionsBuilder {
        self.options.fold_operands = fold_operands;
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

impl default::Default for OptionsBuilder {
    fn default() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}
