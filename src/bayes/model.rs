//! Naive Bayes over binary features, written as dense matrix algebra.
//!
//! Training builds a label indicator matrix `A` (`labels × rows`), then
//!
//! ```text
//! histogram = A · 1
//! prior     = histogram / rows
//! prob1     = diag(histogram)⁻¹ · (A · data)
//! prob0     = 1 − prob1
//! ```
//!
//! Classification picks the label maximising
//! `ln(prior + 1) + Σ ln(prob1·x + prob0·(1 − x) + 1)`. The `+ 1` offsets keep
//! every logarithm finite.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::bayes::training::TrainingMatrix;
use crate::bayes::{load_blob, save_blob};
use crate::error::{ApprecError, Result};
use crate::util::matrix::Matrix;

/// A trained Naive Bayes model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesModel {
    labels: Vec<String>,
    priors: Vec<f64>,
    prob1: Matrix,
    prob0: Matrix,
}

impl BayesModel {
    /// Trains a model. Labels of `label_space` with no training row are left
    /// out of the model; the remaining labels keep their `label_space` order.
    pub fn train(training: &TrainingMatrix, label_space: &[String]) -> Result<Self> {
        let rows = training.num_rows();
        let labels: Vec<String> = label_space
            .iter()
            .filter(|label| training.labels().contains(label))
            .cloned()
            .collect();

        if labels.is_empty() {
            return Err(ApprecError::empty_input(
                "no training row carries a label of the label space",
            ));
        }
        let dropped = label_space.len() - labels.len();
        if dropped > 0 {
            debug!("Dropped {dropped} labels without training examples");
        }

        let mut indicator = Matrix::zeros(labels.len(), rows);
        for (row, row_label) in training.labels().iter().enumerate() {
            if let Some(l) = labels.iter().position(|label| label == row_label) {
                indicator.set(l, row, 1.0);
            }
        }

        let histogram = indicator.row_sums();
        if let Some(l) = histogram.iter().position(|&count| count == 0.0) {
            return Err(ApprecError::model_state(format!(
                "label '{}' has no training examples",
                labels[l]
            )));
        }

        let priors = histogram.iter().map(|count| count / rows as f64).collect();
        let feature_counts = indicator.matmul(training.data())?;
        let prob1 = feature_counts.scale_rows_by_inverse(&histogram)?;
        let prob0 = prob1.complement();

        info!(
            "Trained Bayes model: {} labels, {} features, {rows} rows",
            labels.len(),
            prob1.n_cols()
        );

        Ok(BayesModel {
            labels,
            priors,
            prob1,
            prob0,
        })
    }

    /// Labels known to the model.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn priors(&self) -> &[f64] {
        &self.priors
    }

    /// Probability of each feature being present, one row per label.
    pub fn prob1(&self) -> &Matrix {
        &self.prob1
    }

    /// Probability of each feature being absent, one row per label.
    pub fn prob0(&self) -> &Matrix {
        &self.prob0
    }

    pub fn num_features(&self) -> usize {
        self.prob1.n_cols()
    }

    /// Score of every label for an attribute vector.
    pub fn scores(&self, attributes: &[f64]) -> Result<Vec<f64>> {
        if attributes.len() != self.num_features() {
            return Err(ApprecError::invalid_argument(format!(
                "attribute vector has {} entries, model expects {}",
                attributes.len(),
                self.num_features()
            )));
        }

        let mut scores = Vec::with_capacity(self.labels.len());
        for (l, prior) in self.priors.iter().enumerate() {
            let present = self.prob1.row(l);
            let absent = self.prob0.row(l);
            let mut score = (prior + 1.0).ln();
            for ((&x, &p1), &p0) in attributes.iter().zip(present).zip(absent) {
                score += (p1 * x + p0 * (1.0 - x) + 1.0).ln();
            }
            if !score.is_finite() {
                return Err(ApprecError::numeric(format!(
                    "score of label '{}' is not finite",
                    self.labels[l]
                )));
            }
            scores.push(score);
        }
        Ok(scores)
    }

    /// Most likely label. Ties go to the label listed first.
    pub fn classify(&self, attributes: &[f64]) -> Result<&str> {
        let scores = self.scores(attributes)?;
        let mut best = 0;
        for (l, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = l;
            }
        }
        Ok(&self.labels[best])
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let n = self.labels.len();
        if n == 0
            || self.priors.len() != n
            || self.prob1.n_rows() != n
            || self.prob0.shape() != self.prob1.shape()
        {
            return Err(ApprecError::model_state("inconsistent Bayes model"));
        }
        Ok(())
    }

    /// Writes the model as a bincode blob.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_blob(self, path)
    }

    /// Reads a model written by [`BayesModel::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model: BayesModel = load_blob(path)?;
        model.validate()?;
        Ok(model)
    }
}
