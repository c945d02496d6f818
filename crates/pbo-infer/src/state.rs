use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::Label;

/// Holds the most recent labeling of an inference object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelStore {
    labels: Vec<Label>,
}

impl LabelStore {
    /// All-zero labeling of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            labels: vec![0; len],
        }
    }

    /// Current labels.
    pub fn as_slice(&self) -> &[Label] {
        &self.labels
    }

    /// Replaces the labeling verbatim, whatever its length.
    pub fn assign<I: IntoIterator<Item = Label>>(&mut self, labels: I) {
        self.labels = labels.into_iter().collect();
    }

    /// Takes exactly `required` labels from `labels`.
    ///
    /// Fails with [`PboError::InvalidStartingPoint`] when fewer are available,
    /// leaving the stored labeling untouched.
    pub fn seed<I: IntoIterator<Item = Label>>(
        &mut self,
        labels: I,
        required: usize,
    ) -> Result<(), PboError> {
        let candidate: Vec<Label> = labels.into_iter().take(required).collect();
        if candidate.len() < required {
            return Err(PboError::InvalidStartingPoint(
                ErrorInfo::new("invalid-starting-point", "unsuitable starting point")
                    .with_context("required", required)
                    .with_context("available", candidate.len()),
            ));
        }
        self.labels = candidate;
        Ok(())
    }

    /// Sets every label to 0 without changing the length.
    pub fn reset(&mut self) {
        self.labels.iter_mut().for_each(|label| *label = 0);
    }

    /// Copies the labeling into `out`, resizing it to match.
    pub fn copy_into(&self, out: &mut Vec<Label>) {
        out.clear();
        out.extend_from_slice(&self.labels);
    }
}
