use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::ordering::assignment_labels;
use pbo_core::{Energy, Label};

use crate::problem::QuadraticProblem;
use crate::solver::{QuadraticSolver, Solution};

/// Largest number of primary variables [`Exhaustive`] accepts.
pub const MAX_EXHAUSTIVE_PRIMARIES: usize = 24;

/// Exact minimiser enumerating every primary assignment.
///
/// Auxiliary variables are set to their conditional optimum, so the cost is
/// `2^num_primary` evaluations. Ties resolve to the lowest assignment index.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exhaustive;

impl QuadraticSolver for Exhaustive {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(&self, problem: &QuadraticProblem, _initial: &[Label]) -> Result<Solution, PboError> {
        let num_primary = problem.num_primary();
        if num_primary > MAX_EXHAUSTIVE_PRIMARIES {
            return Err(PboError::Solver(
                ErrorInfo::new("exhaustive-too-large", "too many variables to enumerate")
                    .with_context("num_primary", num_primary)
                    .with_context("limit", MAX_EXHAUSTIVE_PRIMARIES)
                    .with_hint("use the local-search solver"),
            ));
        }
        problem.check_magnitude()?;

        let mut primary = vec![0; num_primary];
        let mut best: Option<(Energy, usize)> = None;
        for mask in 0..(1usize << num_primary) {
            assignment_labels(mask, &mut primary);
            let energy = problem.min_over_auxiliary(&primary)?;
            if best.map_or(true, |(best_energy, _)| energy < best_energy) {
                best = Some((energy, mask));
            }
        }
        let (energy, mask) = best.unwrap_or((problem.constant(), 0));
        assignment_labels(mask, &mut primary);

        let adjacency = problem.adjacency();
        let mut labels = primary;
        labels.resize(problem.num_variables(), 0);
        for aux in num_primary..problem.num_variables() {
            let field = problem.linear(aux)
                + adjacency[aux]
                    .iter()
                    .filter(|(neighbor, _)| labels[*neighbor] != 0)
                    .map(|(_, coefficient)| coefficient)
                    .sum::<Energy>();
            labels[aux] = Label::from(field < 0);
        }

        Ok(Solution {
            labels,
            energy,
            sweeps: 0,
            restarts: 0,
        })
    }
}
