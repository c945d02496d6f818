#![deny(missing_docs)]
#![doc = "Core traits and data types for minimising binary energies through quadratic pseudo-Boolean reduction."]

use std::iter::ExactSizeIterator;

pub mod errors;
pub mod fixed;
pub mod ordering;
pub mod rng;

pub use errors::{ErrorInfo, PboError};
pub use fixed::{clamp_energy, MAX_FIXED_ENERGY};
pub use ordering::{assignment_index, assignment_labels, table_len, MAX_SUPPORTED_ORDER};
pub use rng::{derive_substream_seed, RngHandle};

/// Label assigned to a single variable.
pub type Label = usize;

/// Fixed-point energy consumed by reducers and solvers.
pub type Energy = i64;

/// Index of a variable within an [`EnergyModel`].
pub type VariableIndex = usize;

/// Index of a factor within an [`EnergyModel`].
pub type FactorIndex = usize;

/// Read-only view of a single factor of an [`EnergyModel`].
pub trait Factor: Send + Sync {
    /// Returns the number of variables the factor depends on.
    fn num_variables(&self) -> usize;

    /// Returns the model index of the variable at `position` in the factor's ordering.
    fn variable_index(&self, position: usize) -> VariableIndex;

    /// Returns the variable indices in the factor's own ordering.
    fn variable_indices(&self) -> Box<dyn ExactSizeIterator<Item = VariableIndex> + '_> {
        Box::new((0..self.num_variables()).map(move |position| self.variable_index(position)))
    }

    /// Evaluates the factor for a full assignment given in the factor's ordering.
    fn energy(&self, labels: &[Label]) -> f64;
}

/// Describes the read-only contract of a discrete graphical model.
///
/// Factor arity and variable cardinalities must stay fixed for the lifetime of
/// any inference object borrowing the model.
pub trait EnergyModel: Send + Sync {
    /// Returns the number of variables.
    fn num_variables(&self) -> usize;

    /// Returns the number of factors.
    fn num_factors(&self) -> usize;

    /// Returns the label cardinality of a variable.
    fn num_labels(&self, variable: VariableIndex) -> usize;

    /// Returns the factor at `index`.
    fn factor(&self, index: FactorIndex) -> &dyn Factor;
}

/// Capability interface of a higher-order reducer paired with a quadratic solver.
///
/// The adapter drives an implementation in a fixed order per inference run:
/// [`begin`](Self::begin), any number of unary and clique submissions,
/// [`reduce`](Self::reduce), [`solve`](Self::solve), then one
/// [`label`](Self::label) call per original variable.
pub trait PseudoBooleanBackend {
    /// Discards previous state and sizes a fresh context for `num_variables` variables.
    fn begin(&mut self, num_variables: usize) -> Result<(), PboError>;

    /// Submits the energies of `variable` at label 0 and label 1.
    fn add_unary_term(
        &mut self,
        variable: VariableIndex,
        e0: Energy,
        e1: Energy,
    ) -> Result<(), PboError>;

    /// Submits a clique table laid out in the canonical bit order of [`ordering`].
    fn add_clique(&mut self, variables: &[VariableIndex], table: &[Energy])
        -> Result<(), PboError>;

    /// Reduces all submitted terms to an equivalent quadratic problem.
    fn reduce(&mut self) -> Result<(), PboError>;

    /// Solves the reduced problem, starting from `initial` where the solver supports it.
    fn solve(&mut self, initial: &[Label]) -> Result<(), PboError>;

    /// Returns the solved label of an original variable.
    fn label(&self, variable: VariableIndex) -> Result<Label, PboError>;
}

/// Evaluates the total energy of `labels` under `model`.
pub fn evaluate<M: EnergyModel + ?Sized>(model: &M, labels: &[Label]) -> Result<f64, PboError> {
    if labels.len() != model.num_variables() {
        return Err(PboError::Model(
            ErrorInfo::new("labeling-length", "labeling does not cover every variable")
                .with_context("expected", model.num_variables())
                .with_context("actual", labels.len()),
        ));
    }
    let mut total = 0.0;
    let mut scratch = Vec::new();
    for index in 0..model.num_factors() {
        let factor = model.factor(index);
        scratch.clear();
        scratch.extend(factor.variable_indices().map(|variable| labels[variable]));
        total += factor.energy(&scratch);
    }
    Ok(total)
}
