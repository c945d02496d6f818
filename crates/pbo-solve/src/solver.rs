use pbo_core::{Energy, Label, PboError};
use serde::{Deserialize, Serialize};

use crate::problem::QuadraticProblem;

/// Labeling returned by a [`QuadraticSolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// One label per problem variable, primaries first.
    pub labels: Vec<Label>,
    /// Energy of `labels` under the solved problem.
    pub energy: Energy,
    /// Number of improvement sweeps performed (zero for enumeration).
    pub sweeps: usize,
    /// Number of random restarts evaluated after the warm start.
    pub restarts: usize,
}

impl Solution {
    /// Returns the labels of the primary variables.
    pub fn primary(&self, num_primary: usize) -> &[Label] {
        &self.labels[..num_primary]
    }
}

/// Minimiser of a [`QuadraticProblem`].
pub trait QuadraticSolver {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Minimises `problem`. `initial` seeds the primary variables when the
    /// solver supports warm starts; missing entries default to label 0.
    fn solve(&self, problem: &QuadraticProblem, initial: &[Label]) -> Result<Solution, PboError>;
}
