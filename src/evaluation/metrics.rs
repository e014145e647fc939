//! Evaluation metrics.
//!
//! Every metric maps an [`Evaluation`] to a scalar. Ratios whose numerator
//! is zero are 0 regardless of the denominator, and a metric whose
//! denominator vanishes is 0 as well.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ApprecError, Result};
use crate::evaluation::confusion::Evaluation;

/// A metric computed on every evaluation round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MetricKind {
    /// Share of predicted items that are relevant.
    Precision,
    /// Share of relevant items that were predicted.
    Recall,
    /// Weighted harmonic mean of precision and recall.
    FScore { beta: f64 },
    /// Accuracy balanced over the relevant and irrelevant classes.
    Accuracy,
    /// Share of the repository classified correctly.
    SimpleAccuracy,
    /// False positive rate.
    Fpr,
    /// Matthews correlation coefficient.
    Mcc,
    /// Mean absolute score error.
    Mae,
    /// Mean squared score error.
    Mse,
    /// Root mean squared score error.
    Rmse,
    /// Share of the repository recommended at least once.
    Coverage,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if numerator == 0.0 || denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    ratio(sum, count as f64)
}

impl MetricKind {
    /// Column label used in reports.
    pub fn label(&self) -> String {
        match self {
            MetricKind::Precision => "Precision".to_string(),
            MetricKind::Recall => "Recall".to_string(),
            MetricKind::FScore { beta } => format!("F({beta:.1})"),
            MetricKind::Accuracy => "Accuracy".to_string(),
            MetricKind::SimpleAccuracy => "S_Accuracy".to_string(),
            MetricKind::Fpr => "FPR".to_string(),
            MetricKind::Mcc => "MCC".to_string(),
            MetricKind::Mae => "MAE".to_string(),
            MetricKind::Mse => "MSE".to_string(),
            MetricKind::Rmse => "RMSE".to_string(),
            MetricKind::Coverage => "Coverage".to_string(),
        }
    }

    /// Value of the metric on one round.
    ///
    /// Coverage of a single round is the share of the repository predicted in
    /// that round; [`coverage`] gives the value over several rounds.
    pub fn evaluate(&self, evaluation: &Evaluation) -> f64 {
        let m = evaluation.confusion();
        let tp = m.true_positive as f64;
        let fp = m.false_positive as f64;
        let fn_ = m.false_negative as f64;
        let tn = m.true_negative as f64;
        let repository = evaluation.repository_size() as f64;
        let real = m.real_positive() as f64;

        match self {
            MetricKind::Precision => ratio(tp, m.predicted_positive() as f64),
            MetricKind::Recall => ratio(tp, real),
            MetricKind::FScore { beta } => {
                let p = MetricKind::Precision.evaluate(evaluation);
                let r = MetricKind::Recall.evaluate(evaluation);
                let b2 = beta * beta;
                ratio((1.0 + b2) * p * r, b2 * p + r)
            }
            MetricKind::Accuracy => {
                let type_one = ratio(fp, repository - real);
                let type_two = ratio(fn_, real);
                1.0 - (type_one + type_two) / 2.0
            }
            MetricKind::SimpleAccuracy => ratio(repository - fp - fn_, repository),
            MetricKind::Fpr => ratio(fp, repository - real),
            MetricKind::Mcc => {
                let marginals = (tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_);
                ratio(tp * tn - fp * fn_, marginals.sqrt())
            }
            MetricKind::Mae => mean(evaluation.score_errors().into_iter().map(f64::abs)),
            MetricKind::Mse => mean(evaluation.score_errors().into_iter().map(|e| e * e)),
            MetricKind::Rmse => MetricKind::Mse.evaluate(evaluation).sqrt(),
            MetricKind::Coverage => coverage(std::slice::from_ref(evaluation)),
        }
    }
}

/// Distinct items predicted over all `evaluations`, as a share of the
/// repository.
pub fn coverage(evaluations: &[Evaluation]) -> f64 {
    let Some(first) = evaluations.first() else {
        return 0.0;
    };
    let covered: std::collections::BTreeSet<&str> = evaluations
        .iter()
        .flat_map(|evaluation| evaluation.predicted_items())
        .collect();
    ratio(covered.len() as f64, first.repository_size() as f64)
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Parses `precision`, `recall`, `f_score` (β = 1), `f_score:<β>`,
/// `accuracy`, `simple_accuracy`, `fpr`, `mcc`, `mae`, `mse`, `rmse` and
/// `coverage`.
impl FromStr for MetricKind {
    type Err = ApprecError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, argument) = match s.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (s, None),
        };

        let kind = match name.trim().to_lowercase().as_str() {
            "precision" => MetricKind::Precision,
            "recall" => MetricKind::Recall,
            "f_score" | "fscore" | "f" => {
                let beta = match argument {
                    Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                        ApprecError::parse(format!("invalid F-score beta '{raw}'"))
                    })?,
                    None => 1.0,
                };
                return Ok(MetricKind::FScore { beta });
            }
            "accuracy" => MetricKind::Accuracy,
            "simple_accuracy" => MetricKind::SimpleAccuracy,
            "fpr" => MetricKind::Fpr,
            "mcc" => MetricKind::Mcc,
            "mae" => MetricKind::Mae,
            "mse" => MetricKind::Mse,
            "rmse" => MetricKind::Rmse,
            "coverage" => MetricKind::Coverage,
            other => return Err(ApprecError::parse(format!("unknown metric '{other}'"))),
        };

        if argument.is_some() {
            return Err(ApprecError::parse(format!("metric '{name}' takes no argument")));
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::evaluation::confusion::ConfusionMatrix;

    fn scores(items: &[&str]) -> BTreeMap<String, f64> {
        items.iter().map(|i| (i.to_string(), 1.0)).collect()
    }

    fn fruit() -> Evaluation {
        Evaluation::new(
            scores(&["apple", "grape", "orange"]),
            scores(&["apple", "grape", "pineapple", "melon"]),
            10,
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_precision_and_recall() {
        let evaluation = fruit();
        assert!(close(MetricKind::Precision.evaluate(&evaluation), 2.0 / 3.0));
        assert!(close(MetricKind::Recall.evaluate(&evaluation), 0.5));

        let f1 = MetricKind::FScore { beta: 1.0 }.evaluate(&evaluation);
        assert!(close(f1, 2.0 * (2.0 / 3.0) * 0.5 / (2.0 / 3.0 + 0.5)));
    }

    #[test]
    fn test_accuracy_family() {
        let evaluation = fruit();
        // tp 2, fp 1, fn 2, tn 5
        assert!(close(MetricKind::SimpleAccuracy.evaluate(&evaluation), 0.7));
        assert!(close(
            MetricKind::Accuracy.evaluate(&evaluation),
            1.0 - (1.0 / 6.0 + 2.0 / 4.0) / 2.0
        ));
        assert!(close(MetricKind::Fpr.evaluate(&evaluation), 1.0 / 6.0));

        let mcc = (2.0 * 5.0 - 1.0 * 2.0) / ((3.0f64) * 4.0 * 6.0 * 7.0).sqrt();
        assert!(close(MetricKind::Mcc.evaluate(&evaluation), mcc));
        assert!(close(MetricKind::Coverage.evaluate(&evaluation), 0.3));
    }

    #[test]
    fn test_degenerate_cases_are_zero() {
        let nothing = Evaluation::new(BTreeMap::new(), scores(&["a"]), 5);
        assert_eq!(MetricKind::Precision.evaluate(&nothing), 0.0);
        assert_eq!(MetricKind::Recall.evaluate(&nothing), 0.0);
        assert_eq!(MetricKind::FScore { beta: 0.5 }.evaluate(&nothing), 0.0);
        assert_eq!(MetricKind::Mcc.evaluate(&nothing), 0.0);

        let labels_only = Evaluation::from_confusion(ConfusionMatrix {
            true_positive: 1,
            false_positive: 1,
            false_negative: 1,
            true_negative: 2,
        });
        assert!(close(MetricKind::SimpleAccuracy.evaluate(&labels_only), 0.6));
        assert_eq!(MetricKind::Mae.evaluate(&labels_only), 0.0);
    }

    #[test]
    fn test_score_errors() {
        let evaluation = Evaluation::new(
            [("a".to_string(), 3.0)].into_iter().collect(),
            [("a".to_string(), 1.0), ("b".to_string(), 2.0)].into_iter().collect(),
            5,
        );
        assert!(close(MetricKind::Mae.evaluate(&evaluation), 2.0));
        assert!(close(MetricKind::Mse.evaluate(&evaluation), 4.0));
        assert!(close(MetricKind::Rmse.evaluate(&evaluation), 2.0));
    }

    #[test]
    fn test_coverage_over_rounds() {
        let rounds = [
            Evaluation::new(scores(&["a", "b"]), scores(&["c"]), 10),
            Evaluation::new(scores(&["b", "d"]), scores(&["c"]), 10),
        ];
        assert!(close(coverage(&rounds), 0.3));
        assert_eq!(coverage(&[]), 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("precision".parse::<MetricKind>().unwrap(), MetricKind::Precision);
        assert_eq!(
            "f_score:0.5".parse::<MetricKind>().unwrap(),
            MetricKind::FScore { beta: 0.5 }
        );
        assert_eq!(
            "f_score".parse::<MetricKind>().unwrap(),
            MetricKind::FScore { beta: 1.0 }
        );
        assert!("recall:2".parse::<MetricKind>().is_err());
        assert!("ndcg".parse::<MetricKind>().is_err());
        assert_eq!(MetricKind::FScore { beta: 0.5 }.to_string(), "F(0.5)");
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&MetricKind::FScore { beta: 0.5 }).unwrap();
        assert_eq!(json, r#"{"metric":"f_score","beta":0.5}"#);
        let kind: MetricKind = serde_json::from_str(r#"{"metric":"simple_accuracy"}"#).unwrap();
        assert_eq!(kind, MetricKind::SimpleAccuracy);
    }
}
