use pbo_core::{EnergyModel, Label, PboError, PseudoBooleanBackend};

/// Solves the reduced problem and reads back one label per model variable.
///
/// Either every variable receives a label or an error is returned; no
/// partial labeling escapes. Labels above a variable's range are clamped to
/// its last label.
pub fn solve_labels<M, B>(
    backend: &mut B,
    model: &M,
    initial: &[Label],
) -> Result<Vec<Label>, PboError>
where
    M: EnergyModel + ?Sized,
    B: PseudoBooleanBackend + ?Sized,
{
    backend.solve(initial)?;
    (0..model.num_variables())
        .map(|variable| {
            let top = model.num_labels(variable).clamp(1, 2) - 1;
            backend.label(variable).map(|label| label.min(top))
        })
        .collect()
}
