use std::fs;
use std::path::Path;

use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::ordering::MAX_SUPPORTED_ORDER;
use pbo_solve::{Exhaustive, LocalSearch, LocalSearchConfig, QuadraticSolver};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters of an inference run.
///
/// The validator and the term builder both read `scale` and `max_order` from
/// this value; nothing else carries those constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Multiplier applied to every real-valued energy before truncation.
    /// Scaled values are clamped to `±MAX_FIXED_ENERGY` (`2^40`).
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Largest factor arity accepted by the validator.
    #[serde(default = "default_max_order")]
    pub max_order: usize,
    /// Quadratic solver used by the default backend.
    #[serde(default)]
    pub solver: SolverKind,
    /// Local search tunables (ignored by the exhaustive solver).
    #[serde(default)]
    pub local_search: LocalSearchConfig,
}

fn default_scale() -> f64 {
    10_000.0
}

fn default_max_order() -> usize {
    10
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            max_order: default_max_order(),
            solver: SolverKind::default(),
            local_search: LocalSearchConfig::default(),
        }
    }
}

/// Supported quadratic solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    /// Descent with optional seeded restarts.
    #[default]
    LocalSearch,
    /// Exact enumeration, for small models.
    Exhaustive,
}

impl InferenceConfig {
    /// Parses a configuration from YAML; missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PboError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|err| PboError::Serde(ErrorInfo::new("config-yaml", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, PboError> {
        let yaml = fs::read_to_string(path).map_err(|err| {
            PboError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Checks that the values are usable.
    pub fn validate(&self) -> Result<(), PboError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PboError::Config(
                ErrorInfo::new("config-scale", "scale must be finite and positive")
                    .with_context("scale", self.scale),
            ));
        }
        if self.max_order == 0 || self.max_order > MAX_SUPPORTED_ORDER {
            return Err(PboError::Config(
                ErrorInfo::new("config-max-order", "max_order is out of range")
                    .with_context("max_order", self.max_order)
                    .with_context("limit", MAX_SUPPORTED_ORDER),
            ));
        }
        Ok(())
    }

    /// Instantiates the configured quadratic solver.
    pub fn build_solver(&self) -> Box<dyn QuadraticSolver + Send + Sync> {
        match self.solver {
            SolverKind::LocalSearch => Box::new(LocalSearch::new(self.local_search.clone())),
            SolverKind::Exhaustive => Box::new(Exhaustive),
        }
    }
}
