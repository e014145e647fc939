//! Holdout evaluation of recommenders and classifiers.

pub mod confusion;
pub mod cross_validation;
pub mod metrics;
pub mod report;

pub use confusion::{ConfusionMatrix, Evaluation};
pub use cross_validation::CrossValidation;
pub use metrics::MetricKind;
pub use report::{AggregateReport, RoundScores};
