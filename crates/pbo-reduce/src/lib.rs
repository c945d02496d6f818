#![deny(missing_docs)]
#![doc = "Higher-order clique energies and their reduction to quadratic pseudo-Boolean problems."]

mod energy;
mod polynomial;

pub use energy::{HigherOrderEnergy, ReductionSummary};
pub use polynomial::{clique_to_monomials, Monomial};
