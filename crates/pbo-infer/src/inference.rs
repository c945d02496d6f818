use pbo_core::{evaluate, EnergyModel, Label, PboError, PseudoBooleanBackend};
use serde::{Deserialize, Serialize};

use crate::backend::ReductionBackend;
use crate::config::InferenceConfig;
use crate::driver::submit_terms;
use crate::orchestrator::solve_labels;
use crate::state::LabelStore;
use crate::terms::TermCounts;
use crate::validate::validate_model;
use crate::visitor::{EmptyVisitor, InferenceVisitor};

/// Outcome reported by [`Inference::infer`] and [`Inference::arg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceTermination {
    /// The request completed.
    Normal,
    /// The request cannot be answered; no output was written.
    Unknown,
}

/// Common surface of inference algorithms over an [`EnergyModel`].
pub trait Inference {
    /// Model type the algorithm borrows.
    type Model: EnergyModel + ?Sized;

    /// Name of the algorithm.
    fn name(&self) -> &'static str;

    /// The borrowed model.
    fn model(&self) -> &Self::Model;

    /// Runs one inference, reporting progress to `visitor`.
    fn infer_with<V>(&mut self, visitor: &mut V) -> Result<InferenceTermination, PboError>
    where
        Self: Sized,
        V: InferenceVisitor<Self> + ?Sized;

    /// Runs one inference without progress reporting.
    fn infer(&mut self) -> Result<InferenceTermination, PboError>
    where
        Self: Sized,
    {
        self.infer_with(&mut EmptyVisitor)
    }

    /// Writes the `n`-th best labeling into `out`.
    fn arg(&self, out: &mut Vec<Label>, n: usize) -> InferenceTermination;

    /// Model energy of the labeling returned by `arg(out, 1)`.
    fn energy(&self) -> Result<f64, PboError> {
        let mut labels = Vec::new();
        self.arg(&mut labels, 1);
        evaluate(self.model(), &labels)
    }
}

/// Minimises a binary model of bounded order by reducing it to a quadratic
/// pseudo-Boolean problem and handing that to a backend solver.
///
/// The model is borrowed read-only for the adapter's whole lifetime. Only the
/// labeling persists between [`infer`](Inference::infer) calls; every run
/// rebuilds the backend context from scratch and starts the solver from the
/// stored labeling.
#[derive(Debug)]
pub struct LocalSearchInference<'m, M, B = ReductionBackend>
where
    M: EnergyModel + ?Sized,
    B: PseudoBooleanBackend,
{
    model: &'m M,
    config: InferenceConfig,
    backend: B,
    labels: LabelStore,
    last_counts: Option<TermCounts>,
}

impl<'m, M: EnergyModel + ?Sized> LocalSearchInference<'m, M> {
    /// Validates `model` and builds the backend described by `config`.
    ///
    /// Fails with [`PboError::Config`], [`PboError::ModelTooComplex`] or
    /// [`PboError::NonBinaryModel`]; no adapter exists after a failure.
    pub fn new(model: &'m M, config: InferenceConfig) -> Result<Self, PboError> {
        let backend = ReductionBackend::from_config(&config);
        Self::with_backend(model, config, backend)
    }
}

impl<'m, M, B> LocalSearchInference<'m, M, B>
where
    M: EnergyModel + ?Sized,
    B: PseudoBooleanBackend,
{
    /// Validates `model` and pairs it with a caller-supplied backend.
    pub fn with_backend(
        model: &'m M,
        config: InferenceConfig,
        backend: B,
    ) -> Result<Self, PboError> {
        config.validate()?;
        validate_model(model, config.max_order)?;
        tracing::info!(
            variables = model.num_variables(),
            factors = model.num_factors(),
            max_order = config.max_order,
            scale = config.scale,
            "local search inference ready"
        );
        Ok(Self {
            model,
            labels: LabelStore::zeros(model.num_variables()),
            config,
            backend,
            last_counts: None,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Backend used for reduction and solving.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current labeling.
    pub fn labels(&self) -> &[Label] {
        self.labels.as_slice()
    }

    /// Term totals of the last completed run.
    pub fn last_counts(&self) -> Option<TermCounts> {
        self.last_counts
    }

    /// Overwrites the labeling verbatim. The caller keeps it aligned with the model.
    pub fn set_state<I: IntoIterator<Item = Label>>(&mut self, labels: I) {
        self.labels.assign(labels);
    }

    /// Copies one label per model variable from `labels`.
    ///
    /// Fails with [`PboError::InvalidStartingPoint`] when `labels` runs out
    /// early; the stored labeling is left as it was.
    pub fn set_starting_point<I: IntoIterator<Item = Label>>(
        &mut self,
        labels: I,
    ) -> Result<(), PboError> {
        let required = self.model.num_variables();
        self.labels.seed(labels, required).map_err(|err| {
            tracing::warn!(required, error = %err, "starting point rejected");
            err
        })
    }

    /// Sets every label back to 0.
    ///
    /// The model's structure must not have changed since construction; this
    /// is not re-checked.
    pub fn reset(&mut self) {
        self.labels.reset();
        self.last_counts = None;
    }
}

impl<'m, M, B> Inference for LocalSearchInference<'m, M, B>
where
    M: EnergyModel + ?Sized,
    B: PseudoBooleanBackend,
{
    type Model = M;

    fn name(&self) -> &'static str {
        "LocalSearch"
    }

    fn model(&self) -> &M {
        self.model
    }

    fn infer_with<V>(&mut self, visitor: &mut V) -> Result<InferenceTermination, PboError>
    where
        V: InferenceVisitor<Self> + ?Sized,
    {
        visitor.begin(self);
        let counts = submit_terms(&mut self.backend, self.model, &self.config)?;
        let labels = solve_labels(&mut self.backend, self.model, self.labels.as_slice())?;
        self.labels.assign(labels);
        self.last_counts = Some(counts);
        visitor.visit(self);
        visitor.end(self);
        Ok(InferenceTermination::Normal)
    }

    fn arg(&self, out: &mut Vec<Label>, n: usize) -> InferenceTermination {
        if n > 1 {
            return InferenceTermination::Unknown;
        }
        self.labels.copy_into(out);
        InferenceTermination::Normal
    }
}
