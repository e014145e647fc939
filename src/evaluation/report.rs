//! Aggregated evaluation results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluation::metrics::MetricKind;

/// Scores of one round, parallel to the report's metric list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundScores {
    pub round: usize,
    pub held_out: usize,
    pub predicted: usize,
    pub scores: Vec<f64>,
    /// Per-label scores of a classifier round, parallel to the metric list.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub per_label: BTreeMap<String, Vec<f64>>,
}

/// Per-round scores and their means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub created_at: DateTime<Utc>,
    /// Strategy or classifier under evaluation.
    pub subject: String,
    pub metrics: Vec<MetricKind>,
    pub rounds: Vec<RoundScores>,
    /// Mean of every metric across the pushed rounds.
    #[serde(default)]
    pub means: Vec<f64>,
    /// Coverage over all rounds, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
}

impl AggregateReport {
    pub fn new<S: Into<String>>(subject: S, metrics: Vec<MetricKind>) -> Self {
        AggregateReport {
            created_at: Utc::now(),
            subject: subject.into(),
            metrics,
            rounds: Vec::new(),
            means: Vec::new(),
            coverage: None,
        }
    }

    pub fn push_round(&mut self, round: RoundScores) {
        self.rounds.push(round);
        self.means = self.mean_scores();
    }

    /// Scores of one metric across rounds.
    pub fn metric_scores(&self, metric: usize) -> Vec<f64> {
        self.rounds
            .iter()
            .filter_map(|round| round.scores.get(metric).copied())
            .collect()
    }

    /// Mean of every metric across rounds, 0 without rounds.
    pub fn mean_scores(&self) -> Vec<f64> {
        (0..self.metrics.len())
            .map(|metric| {
                let scores = self.metric_scores(metric);
                if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f64>() / scores.len() as f64
                }
            })
            .collect()
    }

    /// Mean of the named metric.
    pub fn mean_of(&self, metric: &MetricKind) -> Option<f64> {
        let position = self.metrics.iter().position(|m| m == metric)?;
        self.mean_scores().get(position).copied()
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .metrics
            .iter()
            .map(|metric| metric.label().len().max(8) + 2)
            .collect();

        writeln!(f, "{} ({})", self.subject, self.created_at.format("%Y-%m-%d %H:%M:%S"))?;
        write!(f, "| Round |")?;
        for (metric, width) in self.metrics.iter().zip(&widths) {
            write!(f, "{:^width$}|", metric.label())?;
        }
        writeln!(f)?;

        let write_row = |f: &mut fmt::Formatter<'_>, name: &str, values: &[f64]| {
            write!(f, "|{name:^7}|")?;
            for (value, width) in values.iter().zip(&widths) {
                write!(f, "{:>w$}|", format!("{:.1}% ", value * 100.0), w = *width)?;
            }
            writeln!(f)
        };

        for round in &self.rounds {
            write_row(f, &round.round.to_string(), &round.scores)?;
        }
        write_row(f, "Mean", &self.mean_scores())?;

        if let Some(coverage) = self.coverage {
            writeln!(f, "Coverage over all rounds: {:.1}%", coverage * 100.0)?;
        }
        Ok(())
    }
}
