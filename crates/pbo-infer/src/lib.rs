#![deny(missing_docs)]
#![doc = "Minimises binary graphical models by reducing their factors to a quadratic pseudo-Boolean problem."]

//! The pipeline per inference run is validate (once, at construction), build
//! fixed-point terms, reduce, solve, store. [`LocalSearchInference`] ties the
//! stages together around a borrowed [`pbo_core::EnergyModel`].

/// Default backend pairing the higher-order reducer with a quadratic solver.
pub mod backend;
/// Inference configuration and YAML loading.
pub mod config;
/// Submission of built terms into a backend.
pub mod driver;
/// The adapter and the `Inference` trait.
pub mod inference;
/// Solving and label read-back.
pub mod orchestrator;
/// Storage of the current labeling.
pub mod state;
/// Conversion of factors into unary terms and clique tables.
pub mod terms;
/// Model precondition checks.
pub mod validate;
/// Progress hooks invoked around a solve.
pub mod visitor;

pub use backend::ReductionBackend;
pub use config::{InferenceConfig, SolverKind};
pub use inference::{Inference, InferenceTermination, LocalSearchInference};
pub use state::LabelStore;
pub use terms::{to_fixed_point, Term, TermCounts, Terms};
pub use validate::validate_model;
pub use visitor::{EmptyVisitor, InferenceVisitor, TimingVisitor, VerboseVisitor};
