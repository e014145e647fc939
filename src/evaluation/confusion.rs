//! Confusion counts for one evaluation round.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// True/false positive/negative counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_negative: usize,
}

impl ConfusionMatrix {
    /// Counts of a predicted item set against the real one, within a
    /// repository of `repository_size` items.
    pub fn from_sets(
        predicted: &BTreeSet<&str>,
        real: &BTreeSet<&str>,
        repository_size: usize,
    ) -> Self {
        let true_positive = predicted.intersection(real).count();
        let false_positive = predicted.len() - true_positive;
        let false_negative = real.len() - true_positive;
        let real_negative = repository_size.saturating_sub(real.len());

        ConfusionMatrix {
            true_positive,
            false_positive,
            false_negative,
            true_negative: real_negative.saturating_sub(false_positive),
        }
    }

    /// One-vs-rest counts of `label` over parallel label sequences.
    pub fn one_vs_rest(predicted: &[String], real: &[String], label: &str) -> Self {
        let mut matrix = ConfusionMatrix::default();
        for (p, r) in predicted.iter().zip(real) {
            match (p == label, r == label) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_positive += 1,
                (false, true) => matrix.false_negative += 1,
                (false, false) => matrix.true_negative += 1,
            }
        }
        matrix
    }

    pub fn predicted_positive(&self) -> usize {
        self.true_positive + self.false_positive
    }

    pub fn real_positive(&self) -> usize {
        self.true_positive + self.false_negative
    }

    pub fn real_negative(&self) -> usize {
        self.false_positive + self.true_negative
    }

    pub fn total(&self) -> usize {
        self.real_positive() + self.real_negative()
    }
}

/// A predicted outcome compared with the real one.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    confusion: ConfusionMatrix,
    repository_size: usize,
    predicted_scores: BTreeMap<String, f64>,
    real_scores: BTreeMap<String, f64>,
}

impl Evaluation {
    /// Compares scored predictions with the scored held-out items.
    pub fn new(
        predicted_scores: BTreeMap<String, f64>,
        real_scores: BTreeMap<String, f64>,
        repository_size: usize,
    ) -> Self {
        let predicted: BTreeSet<&str> = predicted_scores.keys().map(String::as_str).collect();
        let real: BTreeSet<&str> = real_scores.keys().map(String::as_str).collect();
        let confusion = ConfusionMatrix::from_sets(&predicted, &real, repository_size);

        Evaluation {
            confusion,
            repository_size,
            predicted_scores,
            real_scores,
        }
    }

    /// Label-only comparison; the repository is the evaluated sequence.
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        Evaluation {
            confusion,
            repository_size: confusion.total(),
            predicted_scores: BTreeMap::new(),
            real_scores: BTreeMap::new(),
        }
    }

    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    pub fn repository_size(&self) -> usize {
        self.repository_size
    }

    pub fn predicted_items(&self) -> impl Iterator<Item = &str> {
        self.predicted_scores.keys().map(String::as_str)
    }

    /// Score differences (predicted − real) over every item predicted or
    /// real; a missing side scores 0.
    pub fn score_errors(&self) -> Vec<f64> {
        let items: BTreeSet<&String> = self
            .predicted_scores
            .keys()
            .chain(self.real_scores.keys())
            .collect();
        items
            .into_iter()
            .map(|item| {
                let predicted = self.predicted_scores.get(item).copied().unwrap_or(0.0);
                let real = self.real_scores.get(item).copied().unwrap_or(0.0);
                predicted - real
            })
            .collect()
    }
}
