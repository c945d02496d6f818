//! Error families raised while validating, reducing and minimising a model.
//!
//! Every family carries the same [`ErrorInfo`] payload. Callers match on the
//! variant to learn which stage failed and on [`PboError::code`] for the exact
//! cause, e.g. `model-too-complex` or `energy-overflow`.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and offending values of a failed adapter stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case cause, stable across releases.
    pub code: String,
    /// One-line description for logs.
    pub message: String,
    /// Offending values keyed by name, such as `factor` or `arity`.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// What the caller can change to avoid the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload without context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records an offending value under `key`.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Failure of an inference run, grouped by the stage that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PboError {
    /// A factor has more variables than the reducer supports.
    #[error("model too complex: {0}")]
    ModelTooComplex(ErrorInfo),
    /// A variable has more than two labels.
    #[error("non-binary model: {0}")]
    NonBinaryModel(ErrorInfo),
    /// A starting labeling was shorter than the number of variables.
    #[error("invalid starting point: {0}")]
    InvalidStartingPoint(ErrorInfo),
    /// Malformed model construction (unknown variables, bad tables).
    #[error("model error: {0}")]
    Model(ErrorInfo),
    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Higher-order reduction contract violations.
    #[error("reduction error: {0}")]
    Reduction(ErrorInfo),
    /// Quadratic solver contract violations.
    #[error("solver error: {0}")]
    Solver(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

// Renders as `message [code] key=value key=value (hint: ...)`.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.code)?;
        for (key, value) in &self.context {
            write!(f, " {key}={value}")?;
        }
        match &self.hint {
            Some(hint) => write!(f, " (hint: {hint})"),
            None => Ok(()),
        }
    }
}

impl PboError {
    /// Payload of whichever family this is.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PboError::ModelTooComplex(info)
            | PboError::NonBinaryModel(info)
            | PboError::InvalidStartingPoint(info)
            | PboError::Model(info)
            | PboError::Config(info)
            | PboError::Reduction(info)
            | PboError::Solver(info)
            | PboError::Serde(info) => info,
        }
    }

    /// Shorthand for `self.info().code`.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Fixed-point energy arithmetic left the representable range during `stage`.
    pub fn energy_overflow(stage: &str) -> Self {
        PboError::Reduction(
            ErrorInfo::new("energy-overflow", "fixed-point energy arithmetic overflowed")
                .with_context("stage", stage)
                .with_hint("lower the scale or bound the factor energies"),
        )
    }
}
