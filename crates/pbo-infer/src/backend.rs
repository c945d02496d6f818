use std::fmt;

use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::{Energy, Label, PseudoBooleanBackend, VariableIndex};
use pbo_reduce::HigherOrderEnergy;
use pbo_solve::{QuadraticProblem, QuadraticSolver, Solution};

use crate::config::InferenceConfig;

/// [`PseudoBooleanBackend`] built from [`HigherOrderEnergy`] and a
/// [`QuadraticSolver`].
pub struct ReductionBackend {
    solver: Box<dyn QuadraticSolver + Send + Sync>,
    energy: HigherOrderEnergy,
    problem: Option<QuadraticProblem>,
    solution: Option<Solution>,
}

impl fmt::Debug for ReductionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReductionBackend")
            .field("solver", &self.solver.name())
            .field("max_order", &self.energy.max_order())
            .field("num_variables", &self.energy.num_variables())
            .finish_non_exhaustive()
    }
}

impl ReductionBackend {
    /// Creates a backend accepting cliques up to `max_order` solved by `solver`.
    pub fn new(max_order: usize, solver: Box<dyn QuadraticSolver + Send + Sync>) -> Self {
        Self {
            solver,
            energy: HigherOrderEnergy::new(max_order),
            problem: None,
            solution: None,
        }
    }

    /// Creates the backend described by `config`.
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(config.max_order, config.build_solver())
    }

    /// Reduced problem of the current run, once [`reduce`](PseudoBooleanBackend::reduce) ran.
    pub fn problem(&self) -> Option<&QuadraticProblem> {
        self.problem.as_ref()
    }

    /// Solution of the current run, once [`solve`](PseudoBooleanBackend::solve) ran.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}

impl PseudoBooleanBackend for ReductionBackend {
    fn begin(&mut self, num_variables: usize) -> Result<(), PboError> {
        self.energy = HigherOrderEnergy::new(self.energy.max_order());
        self.energy.add_variables(num_variables);
        self.problem = None;
        self.solution = None;
        Ok(())
    }

    fn add_unary_term(
        &mut self,
        variable: VariableIndex,
        e0: Energy,
        e1: Energy,
    ) -> Result<(), PboError> {
        self.energy.add_unary_term(variable, e0, e1)
    }

    fn add_clique(
        &mut self,
        variables: &[VariableIndex],
        table: &[Energy],
    ) -> Result<(), PboError> {
        self.energy.add_clique(variables, table)
    }

    fn reduce(&mut self) -> Result<(), PboError> {
        let mut problem = QuadraticProblem::new(self.energy.num_variables());
        self.energy.to_quadratic(&mut problem)?;
        self.problem = Some(problem);
        self.solution = None;
        Ok(())
    }

    fn solve(&mut self, initial: &[Label]) -> Result<(), PboError> {
        let problem = self.problem.as_ref().ok_or_else(|| {
            PboError::Solver(ErrorInfo::new(
                "not-reduced",
                "reduce must run before solve",
            ))
        })?;
        let solution = self.solver.solve(problem, initial)?;
        tracing::info!(
            solver = self.solver.name(),
            energy = solution.energy,
            sweeps = solution.sweeps,
            restarts = solution.restarts,
            auxiliary = problem.num_auxiliary(),
            "solved reduced problem"
        );
        self.solution = Some(solution);
        Ok(())
    }

    fn label(&self, variable: VariableIndex) -> Result<Label, PboError> {
        let solution = self.solution.as_ref().ok_or_else(|| {
            PboError::Solver(ErrorInfo::new("solver-not-run", "no solution is available"))
        })?;
        if variable >= self.energy.num_variables() {
            return Err(PboError::Solver(
                ErrorInfo::new("unknown-variable", "label requested for a missing variable")
                    .with_context("variable", variable)
                    .with_context("num_variables", self.energy.num_variables()),
            ));
        }
        Ok(solution.labels[variable])
    }
}
