#![deny(missing_docs)]
#![doc = "Quadratic pseudo-Boolean problems and the solvers that minimise them."]

/// Exact enumeration for small problems.
pub mod exhaustive;
/// Deterministic local search with seeded restarts.
pub mod local_search;
/// The reduced quadratic problem representation.
pub mod problem;
/// Solver trait and solution payload.
pub mod solver;

pub use exhaustive::{Exhaustive, MAX_EXHAUSTIVE_PRIMARIES};
pub use local_search::{LocalSearch, LocalSearchConfig};
pub use problem::{QuadraticProblem, MAX_PROBLEM_MAGNITUDE};
pub use solver::{QuadraticSolver, Solution};
