use pbo_core::ordering::{assignment_labels, table_len};
use pbo_core::{clamp_energy, Energy, EnergyModel, FactorIndex, Label, VariableIndex};

/// Converts a real-valued energy to fixed point by scaling and truncating
/// toward zero.
///
/// Results are clamped to `±MAX_FIXED_ENERGY`, so infinite energies act as
/// large finite penalties. `NaN` maps to zero.
pub fn to_fixed_point(value: f64, scale: f64) -> Energy {
    clamp_energy((value * scale) as Energy)
}

/// Decision term produced from one factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Energies of a single variable at label 0 and label 1.
    Unary {
        /// Model index of the variable.
        variable: VariableIndex,
        /// Fixed-point energy at label 0.
        e0: Energy,
        /// Fixed-point energy at label 1.
        e1: Energy,
    },
    /// Clique table over two or more variables.
    Clique {
        /// Variables in the factor's own ordering.
        variables: Vec<VariableIndex>,
        /// `2^k` fixed-point energies in canonical bit order.
        table: Vec<Energy>,
    },
}

/// Tally of the terms produced by a [`Terms`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TermCounts {
    /// Unary terms emitted.
    pub unary: usize,
    /// Clique tables emitted.
    pub cliques: usize,
    /// Constant (arity-0) factors dropped.
    pub skipped: usize,
}

/// Iterator turning each factor of a model into at most one [`Term`].
///
/// Tables are built lazily, one factor at a time. Arity-0 factors only shift
/// the minimum's value, never its location, so they are skipped.
pub struct Terms<'m, M: EnergyModel + ?Sized> {
    model: &'m M,
    scale: f64,
    max_order: usize,
    next: FactorIndex,
    counts: TermCounts,
}

impl<'m, M: EnergyModel + ?Sized> Terms<'m, M> {
    /// Creates the iterator. Every factor must already satisfy `max_order`.
    pub fn new(model: &'m M, scale: f64, max_order: usize) -> Self {
        Self {
            model,
            scale,
            max_order,
            next: 0,
            counts: TermCounts::default(),
        }
    }

    /// Terms emitted and factors skipped so far.
    pub fn counts(&self) -> TermCounts {
        self.counts
    }

    fn build(&mut self, index: FactorIndex) -> Option<Term> {
        let factor = self.model.factor(index);
        let arity = factor.num_variables();
        debug_assert!(
            arity <= self.max_order,
            "factor {index} of arity {arity} passed validation with max_order {}",
            self.max_order
        );

        match arity {
            0 => {
                self.counts.skipped += 1;
                None
            }
            1 => {
                let variable = factor.variable_index(0);
                let top = self.top_label(variable);
                let e0 = factor.energy(&[0]);
                let e1 = factor.energy(&[top]);
                self.counts.unary += 1;
                Some(Term::Unary {
                    variable,
                    e0: to_fixed_point(e0, self.scale),
                    e1: to_fixed_point(e1, self.scale),
                })
            }
            _ => {
                let variables: Vec<VariableIndex> = factor.variable_indices().collect();
                let tops: Vec<Label> = variables.iter().map(|&v| self.top_label(v)).collect();
                let mut labels = vec![0; arity];
                let table = (0..table_len(arity))
                    .map(|mask| {
                        assignment_labels(mask, &mut labels);
                        for (label, &top) in labels.iter_mut().zip(&tops) {
                            *label = (*label).min(top);
                        }
                        to_fixed_point(factor.energy(&labels), self.scale)
                    })
                    .collect();
                self.counts.cliques += 1;
                Some(Term::Clique { variables, table })
            }
        }
    }

    // Single-label variables read label 0 for both bit values.
    fn top_label(&self, variable: VariableIndex) -> Label {
        self.model.num_labels(variable).clamp(1, 2) - 1
    }
}

impl<M: EnergyModel + ?Sized> Iterator for Terms<'_, M> {
    type Item = Term;

    fn next(&mut self) -> Option<Term> {
        while self.next < self.model.num_factors() {
            let index = self.next;
            self.next += 1;
            if let Some(term) = self.build(index) {
                return Some(term);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pbo_core::MAX_FIXED_ENERGY;

    use super::*;

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(to_fixed_point(1.23456, 10_000.0), 12_345);
        assert_eq!(to_fixed_point(-1.23456, 10_000.0), -12_345);
        assert_eq!(to_fixed_point(-1.0, 10_000.0), -10_000);
        assert_eq!(to_fixed_point(f64::NAN, 10_000.0), 0);
        assert_eq!(to_fixed_point(f64::INFINITY, 10_000.0), MAX_FIXED_ENERGY);
        assert_eq!(to_fixed_point(f64::NEG_INFINITY, 10_000.0), -MAX_FIXED_ENERGY);
        assert_eq!(to_fixed_point(2.0e15, 10_000.0), MAX_FIXED_ENERGY);
    }
}
