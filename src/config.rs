//! Configuration for recommendation and evaluation.
//!
//! Every component receives its configuration explicitly at construction.
//! [`AppConfig`] bundles the pieces the binary needs and is read from a JSON
//! file; any field left out takes its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ApprecError, Result};
use crate::evaluation::metrics::MetricKind;
use crate::index::weighting::WeightingScheme;

/// Weight added to items classified with `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierWeight {
    pub label: String,
    pub weight: f64,
}

impl TierWeight {
    pub fn new<S: Into<String>>(label: S, weight: f64) -> Self {
        TierWeight {
            label: label.into(),
            weight,
        }
    }
}

/// Configuration of the strategy dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Strategy identifier, e.g. `cb`, `knn` or `mlbva`.
    pub strategy: String,
    /// Number of terms in a content profile.
    pub profile_size: usize,
    /// Candidates gathered before classifier re-scoring or hybrid narrowing.
    pub suggestion_size: usize,
    /// Number of items returned.
    pub num_recommendations: usize,
    /// Attach "because" explanations to results.
    pub because: bool,
    /// Weighting scheme for OR-queries.
    pub weighting: WeightingScheme,
    /// Optional whitelist of tag names accepted in tag profiles.
    pub valid_tags: Vec<String>,
    /// Classifier labels, from least to most useful.
    pub labels: Vec<String>,
    /// Score offset per classifier label.
    pub tier_weights: Vec<TierWeight>,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            strategy: "cb".to_string(),
            profile_size: 10,
            suggestion_size: 200,
            num_recommendations: 8,
            because: false,
            weighting: WeightingScheme::default(),
            valid_tags: Vec::new(),
            labels: vec!["RU".to_string(), "U".to_string(), "NU".to_string()],
            tier_weights: vec![
                TierWeight::new("RU", 0.0),
                TierWeight::new("U", 1000.0),
                TierWeight::new("NU", 2000.0),
            ],
        }
    }
}

impl RecommenderConfig {
    /// Weight of a label, 0 for labels without an entry.
    pub fn tier_weight(&self, label: &str) -> f64 {
        self.tier_weights
            .iter()
            .find(|tier| tier.label == label)
            .map_or(0.0, |tier| tier.weight)
    }

    pub fn validate(&self) -> Result<()> {
        if self.profile_size == 0 {
            return Err(ApprecError::invalid_config("profile_size must be positive"));
        }
        if self.labels.is_empty() {
            return Err(ApprecError::invalid_config("labels must not be empty"));
        }
        Ok(())
    }
}

/// Configuration of the evaluation harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Share of the known items held out each round, strictly in (0, 1).
    pub partition_proportion: f64,
    /// Number of rounds, at least 1.
    pub rounds: usize,
    pub metrics: Vec<MetricKind>,
    /// Result size as a share of the repository size.
    pub result_proportion: f64,
    /// Seed for reproducible rounds.
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            partition_proportion: 0.7,
            rounds: 5,
            metrics: vec![
                MetricKind::Precision,
                MetricKind::Recall,
                MetricKind::FScore { beta: 1.0 },
            ],
            result_proportion: 0.1,
            seed: None,
        }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<()> {
        let p = self.partition_proportion;
        if !(p > 0.0 && p < 1.0) {
            return Err(ApprecError::invalid_config(format!(
                "partition_proportion must be in (0, 1), got {p}"
            )));
        }
        if self.rounds == 0 {
            return Err(ApprecError::invalid_config("rounds must be at least 1"));
        }
        if !(self.result_proportion > 0.0 && self.result_proportion <= 1.0) {
            return Err(ApprecError::invalid_config(format!(
                "result_proportion must be in (0, 1], got {}",
                self.result_proportion
            )));
        }
        Ok(())
    }
}

/// Data locations used by the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// JSON Lines term index.
    pub index: PathBuf,
    /// Directory holding the cluster dataset.
    pub clusters: PathBuf,
    /// Persisted classifier.
    pub model: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            index: PathBuf::from("data/index.jsonl"),
            clusters: PathBuf::from("data/clusters"),
            model: PathBuf::from("data/bayes_model.bin"),
        }
    }
}

/// Complete configuration of the binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recommender: RecommenderConfig,
    pub evaluation: EvaluationConfig,
    pub paths: DataPaths,
}

impl AppConfig {
    /// Reads and validates a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.recommender.validate()?;
        self.evaluation.validate()
    }
}
