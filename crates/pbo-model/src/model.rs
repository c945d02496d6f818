use std::collections::BTreeSet;

use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::{EnergyModel, Factor, FactorIndex, Label, VariableIndex};

/// Factor storing one energy per joint assignment of its variables.
///
/// Values are laid out first-variable-fastest: the stride of position 0 is 1
/// and the stride of position `i` is the product of the cardinalities before
/// it. For binary factors this coincides with the canonical clique bit order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFactor {
    variables: Vec<VariableIndex>,
    strides: Vec<usize>,
    values: Vec<f64>,
}

impl TableFactor {
    /// Returns the variables in the factor's own ordering.
    pub fn variables(&self) -> &[VariableIndex] {
        &self.variables
    }

    /// Returns the raw value table.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn offset(&self, labels: &[Label]) -> usize {
        labels
            .iter()
            .zip(&self.strides)
            .map(|(&label, &stride)| label * stride)
            .sum()
    }
}

impl Factor for TableFactor {
    fn num_variables(&self) -> usize {
        self.variables.len()
    }

    fn variable_index(&self, position: usize) -> VariableIndex {
        self.variables[position]
    }

    fn energy(&self, labels: &[Label]) -> f64 {
        debug_assert_eq!(labels.len(), self.variables.len());
        self.values[self.offset(labels)]
    }
}

/// Discrete graphical model with explicit factor tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableModel {
    cardinalities: Vec<usize>,
    factors: Vec<TableFactor>,
}

impl TableModel {
    /// Creates an empty model with the given label cardinality per variable.
    pub fn new(cardinalities: Vec<usize>) -> Self {
        Self {
            cardinalities,
            factors: Vec::new(),
        }
    }

    /// Creates an empty model over `num_variables` binary variables.
    pub fn binary(num_variables: usize) -> Self {
        Self::new(vec![2; num_variables])
    }

    /// Returns the cardinality of every variable.
    pub fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }

    /// Returns the stored factors.
    pub fn factors(&self) -> &[TableFactor] {
        &self.factors
    }

    /// Adds a factor over `variables` with a first-variable-fastest value table.
    pub fn add_factor(
        &mut self,
        variables: Vec<VariableIndex>,
        values: Vec<f64>,
    ) -> Result<FactorIndex, PboError> {
        let mut seen = BTreeSet::new();
        let mut strides = Vec::with_capacity(variables.len());
        let mut expected = 1usize;
        for &variable in &variables {
            let cardinality = self.cardinalities.get(variable).copied().ok_or_else(|| {
                PboError::Model(
                    ErrorInfo::new("unknown-variable", "factor references a missing variable")
                        .with_context("variable", variable)
                        .with_context("num_variables", self.cardinalities.len()),
                )
            })?;
            if !seen.insert(variable) {
                return Err(PboError::Model(
                    ErrorInfo::new("repeated-variable", "factor lists a variable twice")
                        .with_context("variable", variable),
                ));
            }
            strides.push(expected);
            expected = expected.checked_mul(cardinality).ok_or_else(|| {
                PboError::Model(
                    ErrorInfo::new("table-overflow", "factor table size overflows usize")
                        .with_context("arity", variables.len()),
                )
            })?;
        }
        if values.len() != expected {
            return Err(PboError::Model(
                ErrorInfo::new("table-length", "value table does not match factor shape")
                    .with_context("expected", expected)
                    .with_context("actual", values.len()),
            ));
        }
        self.factors.push(TableFactor {
            variables,
            strides,
            values,
        });
        Ok(self.factors.len() - 1)
    }

    /// Adds an arity-0 factor contributing a constant energy.
    pub fn add_constant(&mut self, value: f64) -> FactorIndex {
        self.factors.push(TableFactor {
            variables: Vec::new(),
            strides: Vec::new(),
            values: vec![value],
        });
        self.factors.len() - 1
    }

    /// Adds a unary factor with energies `(e0, e1)` on a binary variable.
    pub fn add_unary(
        &mut self,
        variable: VariableIndex,
        e0: f64,
        e1: f64,
    ) -> Result<FactorIndex, PboError> {
        self.add_factor(vec![variable], vec![e0, e1])
    }
}

impl EnergyModel for TableModel {
    fn num_variables(&self) -> usize {
        self.cardinalities.len()
    }

    fn num_factors(&self) -> usize {
        self.factors.len()
    }

    fn num_labels(&self, variable: VariableIndex) -> usize {
        self.cardinalities[variable]
    }

    fn factor(&self, index: FactorIndex) -> &dyn Factor {
        &self.factors[index]
    }
}
