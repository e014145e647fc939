//! Round-based holdout evaluation.
//!
//! Each round draws `floor(N × partition_proportion)` of the known items
//! without replacement as the held-out set, runs the recommender or
//! classifier on the remainder and scores the outcome against the held-out
//! items. Rounds are independent: every round samples from the full set.

use std::collections::BTreeMap;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use crate::bayes::ItemClassifier;
use crate::config::EvaluationConfig;
use crate::error::{ApprecError, Result};
use crate::evaluation::confusion::{ConfusionMatrix, Evaluation};
use crate::evaluation::metrics::{MetricKind, coverage};
use crate::evaluation::report::{AggregateReport, RoundScores};
use crate::index::TermIndex;
use crate::recommender::Recommender;
use crate::user::UserProfile;

/// Holdout evaluation driver.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    config: EvaluationConfig,
}

impl CrossValidation {
    /// Validates the configuration.
    pub fn new(config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(CrossValidation { config })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Number of items held out of a pool of `pool_size`.
    pub fn held_out_size(&self, pool_size: usize) -> usize {
        (pool_size as f64 * self.config.partition_proportion).floor() as usize
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Splits `pool` into a held-out sample and the remainder, both in pool
    /// order.
    pub fn split<T: Clone>(&self, rng: &mut StdRng, pool: &[T]) -> Result<(Vec<T>, Vec<T>)> {
        if pool.is_empty() {
            return Err(ApprecError::empty_input("nothing to hold out from an empty pool"));
        }
        let held = self.held_out_size(pool.len());
        if held == 0 {
            return Err(ApprecError::empty_input(format!(
                "a pool of {} items holds out nothing at proportion {}",
                pool.len(),
                self.config.partition_proportion
            )));
        }

        let mut selected = vec![false; pool.len()];
        for i in sample(rng, pool.len(), held) {
            selected[i] = true;
        }

        let mut held_out = Vec::with_capacity(held);
        let mut remainder = Vec::with_capacity(pool.len() - held);
        for (item, chosen) in pool.iter().zip(selected) {
            if chosen {
                held_out.push(item.clone());
            } else {
                remainder.push(item.clone());
            }
        }
        Ok((held_out, remainder))
    }

    /// Evaluates the recommender's configured strategy on `user`.
    pub fn run_recommender(
        &self,
        recommender: &Recommender<'_>,
        user: &UserProfile,
    ) -> Result<AggregateReport> {
        let strategy = recommender.config().strategy.clone();
        let repository_size = recommender.index().corpus_size();
        let result_size = (repository_size as f64 * self.config.result_proportion) as usize;
        if result_size == 0 {
            return Err(ApprecError::invalid_config(format!(
                "result_proportion {} of {repository_size} items recommends nothing",
                self.config.result_proportion
            )));
        }

        let pool: Vec<(String, f64)> = user
            .scores()
            .iter()
            .map(|(item, score)| (item.clone(), *score))
            .collect();

        let mut rng = self.rng();
        let mut report = AggregateReport::new(strategy.as_str(), self.config.metrics.clone());
        let mut evaluations = Vec::with_capacity(self.config.rounds);

        for round in 0..self.config.rounds {
            let (held_out, remainder) = self.split(&mut rng, &pool)?;
            let round_user = UserProfile::from_scores(remainder)
                .with_demographics(user.demographics().iter().copied());

            let predicted = recommender.recommend(&strategy, &round_user, result_size)?;
            if predicted.strategy().is_none() {
                return Err(ApprecError::unknown_strategy(strategy));
            }
            if predicted.is_empty() {
                return Err(ApprecError::empty_input(format!(
                    "round {round} produced no recommendation"
                )));
            }

            let predicted_scores: BTreeMap<String, f64> = predicted
                .entries()
                .iter()
                .map(|entry| (entry.item.clone(), entry.score))
                .collect();
            let held = held_out.len();
            let evaluation = Evaluation::new(
                predicted_scores,
                held_out.into_iter().collect(),
                repository_size,
            );
            log_counts(round, evaluation.confusion());

            report.push_round(RoundScores {
                round,
                held_out: held,
                predicted: predicted.len(),
                scores: self.score(&evaluation),
                per_label: BTreeMap::new(),
            });
            evaluations.push(evaluation);
        }

        if self.config.metrics.contains(&MetricKind::Coverage) {
            report.coverage = Some(coverage(&evaluations));
        }
        info!("Evaluated strategy {strategy} over {} rounds", self.config.rounds);
        Ok(report)
    }

    /// Evaluates a classifier trained by `train` on labelled items.
    ///
    /// Every round trains on the remainder and classifies the held-out items.
    /// Metrics are computed one label against the rest and averaged over
    /// `labels`.
    pub fn run_classifier<C, F>(
        &self,
        subject: &str,
        index: &dyn TermIndex,
        labelled: &[(String, String)],
        labels: &[String],
        mut train: F,
    ) -> Result<AggregateReport>
    where
        C: ItemClassifier,
        F: FnMut(&[(String, String)]) -> Result<C>,
    {
        if labels.is_empty() {
            return Err(ApprecError::empty_input("no labels to evaluate"));
        }

        let mut rng = self.rng();
        let mut report = AggregateReport::new(subject, self.config.metrics.clone());

        for round in 0..self.config.rounds {
            let (held_out, remainder) = self.split(&mut rng, labelled)?;
            let classifier = train(remainder.as_slice())?;

            let mut predicted = Vec::with_capacity(held_out.len());
            let mut real = Vec::with_capacity(held_out.len());
            for (item, label) in &held_out {
                predicted.push(classifier.classify_item(index, item)?);
                real.push(label.clone());
            }

            let mut per_label = BTreeMap::new();
            for label in labels {
                let confusion = ConfusionMatrix::one_vs_rest(&predicted, &real, label);
                debug!("Label {label}:");
                log_counts(round, &confusion);
                per_label.insert(label.clone(), self.score(&Evaluation::from_confusion(confusion)));
            }

            let scores = (0..self.config.metrics.len())
                .map(|m| per_label.values().map(|s: &Vec<f64>| s[m]).sum::<f64>() / labels.len() as f64)
                .collect();

            report.push_round(RoundScores {
                round,
                held_out: held_out.len(),
                predicted: predicted.len(),
                scores,
                per_label,
            });
        }

        info!("Evaluated classifier {subject} over {} rounds", self.config.rounds);
        Ok(report)
    }

    fn score(&self, evaluation: &Evaluation) -> Vec<f64> {
        self.config
            .metrics
            .iter()
            .map(|metric| metric.evaluate(evaluation))
            .collect()
    }
}

fn log_counts(round: usize, confusion: &ConfusionMatrix) {
    debug!(
        "Round {round}: TP {} FP {} FN {} TN {}",
        confusion.true_positive,
        confusion.false_positive,
        confusion.false_negative,
        confusion.true_negative
    );
}
