use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::EnergyModel;

/// Checks the reduction preconditions: every factor arity is at most
/// `max_order` and every variable has at most two labels.
///
/// Arity is checked first, so a model violating both reports
/// [`PboError::ModelTooComplex`].
pub fn validate_model<M>(model: &M, max_order: usize) -> Result<(), PboError>
where
    M: EnergyModel + ?Sized,
{
    for index in 0..model.num_factors() {
        let arity = model.factor(index).num_variables();
        if arity > max_order {
            return Err(PboError::ModelTooComplex(
                ErrorInfo::new(
                    "model-too-complex",
                    "factor order exceeds the supported maximum",
                )
                .with_context("factor", index)
                .with_context("arity", arity)
                .with_context("max_order", max_order)
                .with_hint("raise max_order in the inference configuration"),
            ));
        }
    }

    for variable in 0..model.num_variables() {
        let labels = model.num_labels(variable);
        if labels > 2 {
            return Err(PboError::NonBinaryModel(
                ErrorInfo::new("non-binary-model", "only binary variables can be reduced")
                    .with_context("variable", variable)
                    .with_context("labels", labels),
            ));
        }
    }
    Ok(())
}
