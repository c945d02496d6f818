use pbo_core::fixed;
use pbo_core::ordering::{bit_is_set, table_len};
use pbo_core::{Energy, PboError, VariableIndex};

/// Product of binary variables scaled by an integer coefficient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monomial {
    /// Variables of the product in ascending order; empty for the constant.
    pub variables: Vec<VariableIndex>,
    /// Coefficient of the product.
    pub coefficient: Energy,
}

/// Expands a clique table into its multilinear polynomial.
///
/// `table[mask]` is the energy of the assignment where position `i` of
/// `variables` carries bit `i` of `mask`. The Möbius transform
/// `c[S] = Σ_{T ⊆ S} (-1)^{|S \ T|} table[T]` yields one coefficient per subset;
/// zero coefficients are dropped. The caller guarantees
/// `table.len() == 2^variables.len()`.
///
/// Coefficients can reach `2^k` times the largest table entry; a transform
/// leaving the `Energy` range fails with `energy-overflow`.
pub fn clique_to_monomials(
    variables: &[VariableIndex],
    table: &[Energy],
) -> Result<Vec<Monomial>, PboError> {
    let arity = variables.len();
    debug_assert_eq!(table.len(), table_len(arity));
    let mut coefficients = table.to_vec();
    for position in 0..arity {
        let bit = 1usize << position;
        for mask in 0..coefficients.len() {
            if mask & bit != 0 {
                coefficients[mask] =
                    fixed::sub(coefficients[mask], coefficients[mask ^ bit], "mobius")?;
            }
        }
    }

    Ok(coefficients
        .into_iter()
        .enumerate()
        .filter(|&(_, coefficient)| coefficient != 0)
        .map(|(mask, coefficient)| {
            let mut members: Vec<VariableIndex> = (0..arity)
                .filter(|&position| bit_is_set(mask, position))
                .map(|position| variables[position])
                .collect();
            members.sort_unstable();
            Monomial {
                variables: members,
                coefficient,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairwise_table_expands_to_known_coefficients() {
        // Energy 0 at (x0, x1) = (0, 1), 100 elsewhere.
        let monomials = clique_to_monomials(&[4, 2], &[100, 100, 0, 100]).unwrap();
        assert_eq!(
            monomials,
            vec![
                Monomial {
                    variables: vec![],
                    coefficient: 100
                },
                Monomial {
                    variables: vec![2],
                    coefficient: -100
                },
                Monomial {
                    variables: vec![2, 4],
                    coefficient: 100
                },
            ]
        );
    }

    #[test]
    fn and_gate_is_a_single_cubic_monomial() {
        let mut table = vec![0; 8];
        table[0b111] = -7;
        let monomials = clique_to_monomials(&[0, 1, 2], &table).unwrap();
        assert_eq!(monomials.len(), 1);
        assert_eq!(monomials[0].variables, vec![0, 1, 2]);
        assert_eq!(monomials[0].coefficient, -7);
    }

    #[test]
    fn oversized_expansion_reports_overflow() {
        let table = [Energy::MAX, Energy::MIN, Energy::MIN, Energy::MAX];
        let err = clique_to_monomials(&[0, 1], &table).unwrap_err();
        assert_eq!(err.code(), "energy-overflow");
    }
}
