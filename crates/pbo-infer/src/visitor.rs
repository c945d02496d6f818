use std::time::{Duration, Instant};

use crate::inference::Inference;

/// Hooks invoked by [`LocalSearchInference::infer_with`](crate::LocalSearchInference::infer_with).
///
/// `begin` runs before any term is built, `visit` once the new labeling is
/// stored, and `end` just before returning. A failed run calls `begin` only.
pub trait InferenceVisitor<I: ?Sized> {
    /// Called before the run starts.
    fn begin(&mut self, _inference: &I) {}

    /// Called after the labeling has been replaced.
    fn visit(&mut self, _inference: &I) {}

    /// Called when the run finishes.
    fn end(&mut self, _inference: &I) {}
}

/// Visitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyVisitor;

impl<I: ?Sized> InferenceVisitor<I> for EmptyVisitor {}

/// Visitor logging each stage with its current energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseVisitor;

impl<I: Inference + ?Sized> InferenceVisitor<I> for VerboseVisitor {
    fn begin(&mut self, inference: &I) {
        tracing::info!(algorithm = inference.name(), "inference started");
    }

    fn visit(&mut self, inference: &I) {
        match inference.energy() {
            Ok(energy) => tracing::info!(algorithm = inference.name(), energy, "labeling updated"),
            Err(err) => {
                tracing::warn!(algorithm = inference.name(), error = %err, "labeling updated")
            }
        }
    }

    fn end(&mut self, inference: &I) {
        tracing::info!(algorithm = inference.name(), "inference finished");
    }
}

/// Visitor measuring wall-clock time across runs.
#[derive(Debug, Clone, Default)]
pub struct TimingVisitor {
    started: Option<Instant>,
    last: Option<Duration>,
    total: Duration,
    runs: usize,
}

impl TimingVisitor {
    /// Duration of the most recent completed run.
    pub fn last(&self) -> Option<Duration> {
        self.last
    }

    /// Summed duration of all completed runs.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of completed runs.
    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl<I: ?Sized> InferenceVisitor<I> for TimingVisitor {
    fn begin(&mut self, _inference: &I) {
        self.started = Some(Instant::now());
    }

    fn end(&mut self, _inference: &I) {
        if let Some(started) = self.started.take() {
            let elapsed = started.elapsed();
            self.last = Some(elapsed);
            self.total += elapsed;
            self.runs += 1;
        }
    }
}
