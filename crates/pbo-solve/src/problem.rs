use std::collections::BTreeMap;

use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::fixed;
use pbo_core::{Energy, Label, VariableIndex};

/// Largest [`QuadraticProblem::magnitude`] the solvers accept.
///
/// Every energy, flip delta and auxiliary field is bounded by twice the
/// magnitude, so solver arithmetic stays unchecked below this limit.
pub const MAX_PROBLEM_MAGNITUDE: Energy = Energy::MAX / 2;

/// Quadratic pseudo-Boolean energy over primary and auxiliary variables.
///
/// The energy is `constant + Σ a_i x_i + Σ b_ij x_i x_j`. Variables
/// `0..num_primary` mirror the original model; later indices are auxiliary
/// variables introduced by a reduction. Auxiliary variables are coupled only
/// to primary variables, so each one has an independent optimum once the
/// primaries are fixed. Coefficient updates are overflow-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadraticProblem {
    num_primary: usize,
    constant: Energy,
    linear: Vec<Energy>,
    quadratic: BTreeMap<(VariableIndex, VariableIndex), Energy>,
}

impl QuadraticProblem {
    /// Creates an empty problem with `num_primary` primary variables.
    pub fn new(num_primary: usize) -> Self {
        Self {
            num_primary,
            constant: 0,
            linear: vec![0; num_primary],
            quadratic: BTreeMap::new(),
        }
    }

    /// Number of primary variables.
    pub fn num_primary(&self) -> usize {
        self.num_primary
    }

    /// Number of auxiliary variables.
    pub fn num_auxiliary(&self) -> usize {
        self.linear.len() - self.num_primary
    }

    /// Total number of variables.
    pub fn num_variables(&self) -> usize {
        self.linear.len()
    }

    /// Number of distinct non-zero pairwise coefficients.
    pub fn num_quadratic_terms(&self) -> usize {
        self.quadratic.values().filter(|&&b| b != 0).count()
    }

    /// Constant offset of the energy.
    pub fn constant(&self) -> Energy {
        self.constant
    }

    /// Linear coefficient of `variable`.
    pub fn linear(&self, variable: VariableIndex) -> Energy {
        self.linear[variable]
    }

    /// Returns whether `variable` was introduced by a reduction.
    pub fn is_auxiliary(&self, variable: VariableIndex) -> bool {
        variable >= self.num_primary
    }

    /// Appends an auxiliary variable and returns its index.
    pub fn add_auxiliary(&mut self) -> VariableIndex {
        self.linear.push(0);
        self.linear.len() - 1
    }

    /// Adds a constant offset.
    pub fn add_constant(&mut self, value: Energy) -> Result<(), PboError> {
        self.constant = fixed::add(self.constant, value, "constant")?;
        Ok(())
    }

    /// Adds `coefficient * x_variable`.
    pub fn add_linear(
        &mut self,
        variable: VariableIndex,
        coefficient: Energy,
    ) -> Result<(), PboError> {
        self.check_variable(variable)?;
        self.linear[variable] = fixed::add(self.linear[variable], coefficient, "linear")?;
        Ok(())
    }

    /// Adds `coefficient * x_i * x_j`.
    pub fn add_quadratic(
        &mut self,
        i: VariableIndex,
        j: VariableIndex,
        coefficient: Energy,
    ) -> Result<(), PboError> {
        self.check_variable(i)?;
        self.check_variable(j)?;
        if i == j {
            // x * x == x for binary variables.
            return self.add_linear(i, coefficient);
        }
        if self.is_auxiliary(i) && self.is_auxiliary(j) {
            return Err(PboError::Reduction(
                ErrorInfo::new(
                    "auxiliary-coupling",
                    "auxiliary variables may only couple to primary variables",
                )
                .with_context("i", i)
                .with_context("j", j),
            ));
        }
        let key = if i < j { (i, j) } else { (j, i) };
        let entry = self.quadratic.entry(key).or_insert(0);
        *entry = fixed::add(*entry, coefficient, "quadratic")?;
        Ok(())
    }

    /// Adds a unary term with energy `e0` at label 0 and `e1` at label 1.
    pub fn add_unary_term(
        &mut self,
        variable: VariableIndex,
        e0: Energy,
        e1: Energy,
    ) -> Result<(), PboError> {
        self.add_linear(variable, fixed::sub(e1, e0, "unary")?)?;
        self.add_constant(e0)
    }

    /// Adds a pairwise term where `e01` is the energy of `x_i = 0, x_j = 1`.
    pub fn add_pairwise_term(
        &mut self,
        i: VariableIndex,
        j: VariableIndex,
        e00: Energy,
        e01: Energy,
        e10: Energy,
        e11: Energy,
    ) -> Result<(), PboError> {
        let diagonal = fixed::add(e00, e11, "pairwise")?;
        let off_diagonal = fixed::add(e01, e10, "pairwise")?;
        self.add_quadratic(i, j, fixed::sub(diagonal, off_diagonal, "pairwise")?)?;
        self.add_linear(i, fixed::sub(e10, e00, "pairwise")?)?;
        self.add_linear(j, fixed::sub(e01, e00, "pairwise")?)?;
        self.add_constant(e00)
    }

    /// Sum of the absolute values of every coefficient, constant included.
    pub fn magnitude(&self) -> Result<Energy, PboError> {
        std::iter::once(&self.constant)
            .chain(&self.linear)
            .chain(self.quadratic.values())
            .try_fold(0, |total: Energy, &coefficient| {
                let abs = coefficient
                    .checked_abs()
                    .ok_or_else(|| PboError::energy_overflow("magnitude"))?;
                fixed::add(total, abs, "magnitude")
            })
    }

    /// Fails with `energy-overflow` when [`magnitude`](Self::magnitude)
    /// exceeds [`MAX_PROBLEM_MAGNITUDE`].
    pub fn check_magnitude(&self) -> Result<(), PboError> {
        if self.magnitude()? > MAX_PROBLEM_MAGNITUDE {
            return Err(PboError::energy_overflow("magnitude"));
        }
        Ok(())
    }

    /// Builds symmetric adjacency lists of the non-zero pairwise coefficients.
    pub fn adjacency(&self) -> Vec<Vec<(VariableIndex, Energy)>> {
        let mut adjacency = vec![Vec::new(); self.num_variables()];
        for (&(i, j), &coefficient) in &self.quadratic {
            if coefficient != 0 {
                adjacency[i].push((j, coefficient));
                adjacency[j].push((i, coefficient));
            }
        }
        adjacency
    }

    /// Evaluates the energy of a full labeling (primary and auxiliary).
    pub fn evaluate(&self, labels: &[Label]) -> Result<Energy, PboError> {
        if labels.len() != self.num_variables() {
            return Err(PboError::Solver(
                ErrorInfo::new("labeling-length", "labeling must cover every variable")
                    .with_context("expected", self.num_variables())
                    .with_context("actual", labels.len()),
            ));
        }
        let mut energy = self.constant;
        for (variable, &coefficient) in self.linear.iter().enumerate() {
            if labels[variable] != 0 {
                energy = fixed::add(energy, coefficient, "evaluate")?;
            }
        }
        for (&(i, j), &coefficient) in &self.quadratic {
            if labels[i] != 0 && labels[j] != 0 {
                energy = fixed::add(energy, coefficient, "evaluate")?;
            }
        }
        Ok(energy)
    }

    /// Minimum energy over all auxiliary labelings for fixed primary labels.
    pub fn min_over_auxiliary(&self, primary: &[Label]) -> Result<Energy, PboError> {
        if primary.len() != self.num_primary {
            return Err(PboError::Solver(
                ErrorInfo::new("labeling-length", "labeling must cover every primary variable")
                    .with_context("expected", self.num_primary)
                    .with_context("actual", primary.len()),
            ));
        }
        let mut energy = self.constant;
        let mut fields = self.linear[self.num_primary..].to_vec();
        for (variable, &coefficient) in self.linear[..self.num_primary].iter().enumerate() {
            if primary[variable] != 0 {
                energy = fixed::add(energy, coefficient, "marginalize")?;
            }
        }
        for (&(i, j), &coefficient) in &self.quadratic {
            // Keys are ordered, so only `j` can be auxiliary.
            if self.is_auxiliary(j) {
                if primary[i] != 0 {
                    let field = &mut fields[j - self.num_primary];
                    *field = fixed::add(*field, coefficient, "marginalize")?;
                }
            } else if primary[i] != 0 && primary[j] != 0 {
                energy = fixed::add(energy, coefficient, "marginalize")?;
            }
        }
        fields
            .into_iter()
            .try_fold(energy, |energy, field| fixed::add(energy, field.min(0), "marginalize"))
    }

    fn check_variable(&self, variable: VariableIndex) -> Result<(), PboError> {
        if variable < self.num_variables() {
            Ok(())
        } else {
            Err(PboError::Reduction(
                ErrorInfo::new("unknown-variable", "term references a missing variable")
                    .with_context("variable", variable)
                    .with_context("num_variables", self.num_variables()),
            ))
        }
    }
}
