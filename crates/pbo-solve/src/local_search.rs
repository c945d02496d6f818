use pbo_core::rng::RngHandle;
use pbo_core::{Energy, Label, PboError, VariableIndex};
use serde::{Deserialize, Serialize};

use crate::problem::QuadraticProblem;
use crate::solver::{QuadraticSolver, Solution};

/// Tunables of the [`LocalSearch`] solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSearchConfig {
    /// Upper bound on improvement sweeps per descent (0 runs to a local minimum).
    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,
    /// Number of random restarts after the warm-started descent.
    #[serde(default)]
    pub restarts: usize,
    /// Master seed; restart `r` uses substream `r`.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_max_sweeps() -> usize {
    1000
}

fn default_seed() -> u64 {
    0x0B1A_5EED_0000_0001_u64
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_sweeps: default_max_sweeps(),
            restarts: 0,
            seed: default_seed(),
        }
    }
}

/// Single-flip descent over the primary variables.
///
/// Auxiliary variables are never flipped on their own: after every primary
/// flip each adjacent auxiliary is reset to its conditional optimum, so the
/// search effectively minimises `min_w E(x, w)` over the primaries `x`.
#[derive(Debug, Clone, Default)]
pub struct LocalSearch {
    config: LocalSearchConfig,
}

impl LocalSearch {
    /// Creates a solver with the given configuration.
    pub fn new(config: LocalSearchConfig) -> Self {
        Self { config }
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }
}

impl QuadraticSolver for LocalSearch {
    fn name(&self) -> &'static str {
        "local-search"
    }

    fn solve(&self, problem: &QuadraticProblem, initial: &[Label]) -> Result<Solution, PboError> {
        // Descent deltas stay within twice the magnitude.
        problem.check_magnitude()?;
        let adjacency = problem.adjacency();
        let seed_labels: Vec<Label> = (0..problem.num_primary())
            .map(|variable| Label::from(initial.get(variable).copied().unwrap_or(0) != 0))
            .collect();

        let mut best = Descent::start(problem, &adjacency, &seed_labels)?;
        let mut sweeps = best.run(self.config.max_sweeps);
        tracing::debug!(energy = best.energy, sweeps, "warm-start descent finished");

        let mut primary = vec![0; problem.num_primary()];
        for restart in 0..self.config.restarts {
            let mut rng = RngHandle::substream(self.config.seed, restart as u64);
            primary.iter_mut().for_each(|label| *label = rng.binary_label());
            let mut candidate = Descent::start(problem, &adjacency, &primary)?;
            sweeps += candidate.run(self.config.max_sweeps);
            tracing::debug!(restart, energy = candidate.energy, "restart descent finished");
            if candidate.energy < best.energy {
                best = candidate;
            }
        }

        Ok(Solution {
            labels: best.labels,
            energy: best.energy,
            sweeps,
            restarts: self.config.restarts,
        })
    }
}

struct Descent<'a> {
    problem: &'a QuadraticProblem,
    adjacency: &'a [Vec<(VariableIndex, Energy)>],
    labels: Vec<Label>,
    // Indexed by variable; only auxiliary entries are maintained.
    fields: Vec<Energy>,
    energy: Energy,
}

impl<'a> Descent<'a> {
    fn start(
        problem: &'a QuadraticProblem,
        adjacency: &'a [Vec<(VariableIndex, Energy)>],
        primary: &[Label],
    ) -> Result<Self, PboError> {
        let mut labels = primary.to_vec();
        labels.resize(problem.num_variables(), 0);
        let mut fields = vec![0; problem.num_variables()];
        for aux in problem.num_primary()..problem.num_variables() {
            let field = problem.linear(aux)
                + adjacency[aux]
                    .iter()
                    .filter(|(neighbor, _)| labels[*neighbor] != 0)
                    .map(|(_, coefficient)| coefficient)
                    .sum::<Energy>();
            fields[aux] = field;
            labels[aux] = Label::from(field < 0);
        }
        let energy = problem.evaluate(&labels)?;
        Ok(Self {
            problem,
            adjacency,
            labels,
            fields,
            energy,
        })
    }

    fn flip_delta(&self, variable: VariableIndex) -> Energy {
        let sign: Energy = if self.labels[variable] == 0 { 1 } else { -1 };
        let mut direct = self.problem.linear(variable);
        let mut delta = 0;
        for &(neighbor, coefficient) in &self.adjacency[variable] {
            if self.problem.is_auxiliary(neighbor) {
                let field = self.fields[neighbor];
                delta += (field + sign * coefficient).min(0) - field.min(0);
            } else if self.labels[neighbor] != 0 {
                direct += coefficient;
            }
        }
        delta + sign * direct
    }

    fn flip(&mut self, variable: VariableIndex, delta: Energy) {
        let sign: Energy = if self.labels[variable] == 0 { 1 } else { -1 };
        self.labels[variable] ^= 1;
        for &(neighbor, coefficient) in &self.adjacency[variable] {
            if self.problem.is_auxiliary(neighbor) {
                self.fields[neighbor] += sign * coefficient;
                self.labels[neighbor] = Label::from(self.fields[neighbor] < 0);
            }
        }
        self.energy += delta;
    }

    /// Runs improvement sweeps until no flip helps or the limit is hit.
    fn run(&mut self, max_sweeps: usize) -> usize {
        let mut sweeps = 0;
        loop {
            let mut improved = false;
            for variable in 0..self.problem.num_primary() {
                let delta = self.flip_delta(variable);
                if delta < 0 {
                    self.flip(variable, delta);
                    improved = true;
                }
            }
            sweeps += 1;
            if !improved || (max_sweeps > 0 && sweeps >= max_sweeps) {
                return sweeps;
            }
        }
    }
}
