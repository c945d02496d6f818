use std::collections::{BTreeMap, BTreeSet};

use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::fixed;
use pbo_core::ordering::{table_len, MAX_SUPPORTED_ORDER};
use pbo_core::{Energy, Label, VariableIndex};
use pbo_solve::QuadraticProblem;

use crate::polynomial::clique_to_monomials;

/// Counts describing one call to [`HigherOrderEnergy::to_quadratic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReductionSummary {
    /// Non-zero monomials in the accumulated polynomial (constant excluded).
    pub monomials: usize,
    /// Monomials of degree three or more that needed auxiliary variables.
    pub higher_order: usize,
    /// Auxiliary variables appended to the quadratic problem.
    pub auxiliary: usize,
}

/// Sum of unary terms and clique tables kept as a multilinear polynomial.
///
/// Terms are commutative contributions: submission order never changes the
/// accumulated polynomial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HigherOrderEnergy {
    max_order: usize,
    num_variables: usize,
    constant: Energy,
    terms: BTreeMap<Vec<VariableIndex>, Energy>,
}

impl HigherOrderEnergy {
    /// Creates an empty energy accepting cliques of up to `max_order` variables.
    pub fn new(max_order: usize) -> Self {
        Self {
            max_order: max_order.min(MAX_SUPPORTED_ORDER),
            num_variables: 0,
            constant: 0,
            terms: BTreeMap::new(),
        }
    }

    /// Largest accepted clique arity.
    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Number of variables added so far.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Appends `count` variables and returns the index of the first one.
    pub fn add_variables(&mut self, count: usize) -> VariableIndex {
        let first = self.num_variables;
        self.num_variables += count;
        first
    }

    /// Adds a unary term with energy `e0` at label 0 and `e1` at label 1.
    pub fn add_unary_term(
        &mut self,
        variable: VariableIndex,
        e0: Energy,
        e1: Energy,
    ) -> Result<(), PboError> {
        self.check_variable(variable)?;
        let slope = fixed::sub(e1, e0, "unary")?;
        self.constant = fixed::add(self.constant, e0, "constant")?;
        self.add_monomial(vec![variable], slope)
    }

    /// Adds a clique table in canonical bit order over `variables`.
    pub fn add_clique(
        &mut self,
        variables: &[VariableIndex],
        table: &[Energy],
    ) -> Result<(), PboError> {
        if variables.len() > self.max_order {
            return Err(PboError::Reduction(
                ErrorInfo::new("clique-too-large", "clique arity exceeds the maximum order")
                    .with_context("arity", variables.len())
                    .with_context("max_order", self.max_order),
            ));
        }
        if table.len() != table_len(variables.len()) {
            return Err(PboError::Reduction(
                ErrorInfo::new("clique-table-length", "clique table must hold 2^arity entries")
                    .with_context("arity", variables.len())
                    .with_context("actual", table.len()),
            ));
        }
        let mut seen = BTreeSet::new();
        for &variable in variables {
            self.check_variable(variable)?;
            if !seen.insert(variable) {
                return Err(PboError::Reduction(
                    ErrorInfo::new("repeated-variable", "clique lists a variable twice")
                        .with_context("variable", variable),
                ));
            }
        }

        for monomial in clique_to_monomials(variables, table)? {
            if monomial.variables.is_empty() {
                self.constant = fixed::add(self.constant, monomial.coefficient, "constant")?;
            } else {
                self.add_monomial(monomial.variables, monomial.coefficient)?;
            }
        }
        Ok(())
    }

    /// Evaluates the accumulated polynomial for a labeling of every variable.
    pub fn evaluate(&self, labels: &[Label]) -> Result<Energy, PboError> {
        if labels.len() != self.num_variables {
            return Err(PboError::Reduction(
                ErrorInfo::new("labeling-length", "labeling must cover every variable")
                    .with_context("expected", self.num_variables)
                    .with_context("actual", labels.len()),
            ));
        }
        self.terms
            .iter()
            .filter(|(variables, _)| variables.iter().all(|&v| labels[v] != 0))
            .try_fold(self.constant, |total, (_, &coefficient)| {
                fixed::add(total, coefficient, "evaluate")
            })
    }

    /// Writes an equivalent quadratic problem into `problem`.
    ///
    /// `problem` must have one primary variable per variable of this energy.
    /// For every primary assignment the minimum over the appended auxiliary
    /// variables equals [`evaluate`](Self::evaluate).
    pub fn to_quadratic(
        &self,
        problem: &mut QuadraticProblem,
    ) -> Result<ReductionSummary, PboError> {
        if problem.num_primary() != self.num_variables {
            return Err(PboError::Reduction(
                ErrorInfo::new("primary-mismatch", "quadratic problem has the wrong size")
                    .with_context("expected", self.num_variables)
                    .with_context("actual", problem.num_primary()),
            ));
        }

        let mut summary = ReductionSummary::default();
        problem.add_constant(self.constant)?;
        for (variables, &coefficient) in &self.terms {
            if coefficient == 0 {
                continue;
            }
            summary.monomials += 1;
            match variables.as_slice() {
                [single] => problem.add_linear(*single, coefficient)?,
                [first, second] => problem.add_quadratic(*first, *second, coefficient)?,
                _ => {
                    summary.higher_order += 1;
                    summary.auxiliary += if coefficient < 0 {
                        reduce_negative(problem, variables, coefficient)?
                    } else {
                        reduce_positive(problem, variables, coefficient)?
                    };
                }
            }
        }

        problem.check_magnitude()?;
        tracing::debug!(
            monomials = summary.monomials,
            higher_order = summary.higher_order,
            auxiliary = summary.auxiliary,
            quadratic_terms = problem.num_quadratic_terms(),
            "reduced higher-order energy"
        );
        Ok(summary)
    }

    fn add_monomial(
        &mut self,
        variables: Vec<VariableIndex>,
        coefficient: Energy,
    ) -> Result<(), PboError> {
        if coefficient != 0 {
            let entry = self.terms.entry(variables).or_insert(0);
            *entry = fixed::add(*entry, coefficient, "monomial")?;
        }
        Ok(())
    }

    fn check_variable(&self, variable: VariableIndex) -> Result<(), PboError> {
        if variable < self.num_variables {
            Ok(())
        } else {
            Err(PboError::Reduction(
                ErrorInfo::new("unknown-variable", "term references a missing variable")
                    .with_context("variable", variable)
                    .with_context("num_variables", self.num_variables),
            ))
        }
    }
}

/// `a x_1..x_d = min_w a w (S_1 - (d - 1))` for `a < 0`.
fn reduce_negative(
    problem: &mut QuadraticProblem,
    variables: &[VariableIndex],
    coefficient: Energy,
) -> Result<usize, PboError> {
    let degree = variables.len() as Energy;
    let aux = problem.add_auxiliary();
    problem.add_linear(aux, fixed::mul(coefficient, 1 - degree, "reduce-negative")?)?;
    for &variable in variables {
        problem.add_quadratic(variable, aux, coefficient)?;
    }
    Ok(1)
}

/// Ishikawa's reduction for `a > 0`:
/// `a x_1..x_d = a min_w [ Σ_{i=1}^{n} w_i (c_i (2i - S_1) - 1) + S_2 ]`
/// with `n = ⌊(d - 1) / 2⌋`, `c_i = 1` when `d` is odd and `i = n`, else `2`.
fn reduce_positive(
    problem: &mut QuadraticProblem,
    variables: &[VariableIndex],
    coefficient: Energy,
) -> Result<usize, PboError> {
    let degree = variables.len();
    for (offset, &first) in variables.iter().enumerate() {
        for &second in &variables[offset + 1..] {
            problem.add_quadratic(first, second, coefficient)?;
        }
    }
    let count = (degree - 1) / 2;
    for i in 1..=count {
        let weight: Energy = if degree % 2 == 1 && i == count { 1 } else { 2 };
        let bias = fixed::mul(coefficient, 2 * weight * i as Energy - 1, "reduce-positive")?;
        let coupling = fixed::mul(coefficient, -weight, "reduce-positive")?;
        let aux = problem.add_auxiliary();
        problem.add_linear(aux, bias)?;
        for &variable in variables {
            problem.add_quadratic(variable, aux, coupling)?;
        }
    }
    Ok(count)
}
