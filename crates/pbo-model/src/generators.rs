use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::ordering::table_len;
use pbo_core::rng::RngHandle;
use rand::seq::index::sample;
use rand::Rng;

use crate::model::TableModel;

/// Generates a binary model with random factors using deterministic randomness.
///
/// Every factor picks an arity in `1..=max_arity`, distinct variables, and
/// whole-number energies drawn uniformly from `[-10, 10]`. Whole numbers stay
/// exact under fixed-point scaling, so minimisers can be compared across solvers.
pub fn gen_random_binary(
    num_variables: usize,
    num_factors: usize,
    max_arity: usize,
    rng: &mut RngHandle,
) -> Result<TableModel, PboError> {
    if num_variables == 0 || max_arity == 0 {
        return Err(PboError::Model(
            ErrorInfo::new(
                "empty-model",
                "random generator requires at least one variable and arity one",
            )
            .with_context("num_variables", num_variables)
            .with_context("max_arity", max_arity),
        ));
    }
    let max_arity = max_arity.min(num_variables);
    let mut model = TableModel::binary(num_variables);
    for _ in 0..num_factors {
        let arity = rng.inner_mut().gen_range(1..=max_arity);
        let variables = sample(rng.inner_mut(), num_variables, arity).into_vec();
        let values = (0..table_len(arity))
            .map(|_| f64::from(rng.inner_mut().gen_range(-10i32..=10)))
            .collect();
        model.add_factor(variables, values)?;
    }
    Ok(model)
}
