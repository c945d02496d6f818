use pbo_core::{EnergyModel, PboError, PseudoBooleanBackend};

use crate::config::InferenceConfig;
use crate::terms::{Term, TermCounts, Terms};

/// Opens a fresh backend context, submits every term of `model`, and reduces.
///
/// Each clique table is handed over as soon as it is built and dropped
/// afterwards. Backend failures are returned unchanged.
pub fn submit_terms<M, B>(
    backend: &mut B,
    model: &M,
    config: &InferenceConfig,
) -> Result<TermCounts, PboError>
where
    M: EnergyModel + ?Sized,
    B: PseudoBooleanBackend + ?Sized,
{
    backend.begin(model.num_variables())?;
    let mut terms = Terms::new(model, config.scale, config.max_order);
    for term in terms.by_ref() {
        match term {
            Term::Unary { variable, e0, e1 } => backend.add_unary_term(variable, e0, e1)?,
            Term::Clique { variables, table } => backend.add_clique(&variables, &table)?,
        }
    }
    let counts = terms.counts();
    tracing::debug!(
        unary = counts.unary,
        cliques = counts.cliques,
        skipped = counts.skipped,
        "submitted terms"
    );
    backend.reduce()?;
    Ok(counts)
}
