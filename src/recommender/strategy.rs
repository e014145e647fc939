//! Strategy identifiers and the strategy factory.

use std::fmt;
use std::str::FromStr;

use crate::error::{ApprecError, Result};
use crate::profile::ContentKind;
use crate::recommender::Strategy;
use crate::recommender::collaborative::Collaborative;
use crate::recommender::content::ContentBased;
use crate::recommender::hybrid::Hybrid;
use crate::recommender::machine_learning::MachineLearning;

/// Order in which a hybrid strategy composes its two passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HybridOrder {
    /// Content pass narrows the candidates, collaborative ranking orders them.
    ContentThenCollaborative,
    /// Co-cluster members narrow the candidates, content ranking orders them.
    CollaborativeThenContent,
}

/// Classifier used by a classifier-augmented strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifierSource {
    /// The built-in Bayes classifier.
    Bayes,
    /// A vector classifier supplied by the caller.
    Vector,
}

/// Every strategy the dispatcher knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    ContentBased(ContentKind),
    Collaborative,
    Hybrid(HybridOrder),
    MachineLearning {
        classifier: ClassifierSource,
        expansion: bool,
    },
}

const REGISTRY: &[(&str, StrategyKind)] = &[
    ("cb", StrategyKind::ContentBased(ContentKind::Mix)),
    ("cbt", StrategyKind::ContentBased(ContentKind::Tag)),
    ("cbd", StrategyKind::ContentBased(ContentKind::Desc)),
    ("cbh", StrategyKind::ContentBased(ContentKind::Half)),
    ("cbtm", StrategyKind::ContentBased(ContentKind::Time)),
    ("cb_eset", StrategyKind::ContentBased(ContentKind::MixEset)),
    ("cbt_eset", StrategyKind::ContentBased(ContentKind::TagEset)),
    ("cbd_eset", StrategyKind::ContentBased(ContentKind::DescEset)),
    ("cbh_eset", StrategyKind::ContentBased(ContentKind::HalfEset)),
    ("knn", StrategyKind::Collaborative),
    ("cb_knn", StrategyKind::Hybrid(HybridOrder::ContentThenCollaborative)),
    ("knn_cb", StrategyKind::Hybrid(HybridOrder::CollaborativeThenContent)),
    (
        "mlbva",
        StrategyKind::MachineLearning {
            classifier: ClassifierSource::Bayes,
            expansion: false,
        },
    ),
    (
        "mlbva_eset",
        StrategyKind::MachineLearning {
            classifier: ClassifierSource::Bayes,
            expansion: true,
        },
    ),
    (
        "mlbow",
        StrategyKind::MachineLearning {
            classifier: ClassifierSource::Vector,
            expansion: false,
        },
    ),
    (
        "mlbow_eset",
        StrategyKind::MachineLearning {
            classifier: ClassifierSource::Vector,
            expansion: true,
        },
    ),
];

impl StrategyKind {
    /// Looks up a strategy identifier.
    pub fn lookup(id: &str) -> Option<StrategyKind> {
        REGISTRY
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, kind)| *kind)
    }

    /// All registered identifiers.
    pub fn ids() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(name, _)| *name)
    }

    /// Identifier of the strategy.
    pub fn id(&self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, kind)| kind == self)
            .map_or("unknown", |(name, _)| *name)
    }

    /// Instantiates the strategy.
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::ContentBased(content) => Box::new(ContentBased::new(content)),
            StrategyKind::Collaborative => Box::new(Collaborative),
            StrategyKind::Hybrid(order) => Box::new(Hybrid::new(order)),
            StrategyKind::MachineLearning {
                classifier,
                expansion,
            } => {
                let content = if expansion {
                    ContentKind::MixEset
                } else {
                    ContentKind::Mix
                };
                Box::new(MachineLearning::new(content, classifier))
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = ApprecError;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::lookup(s).ok_or_else(|| ApprecError::unknown_strategy(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trip() {
        for id in StrategyKind::ids() {
            let kind: StrategyKind = id.parse().unwrap();
            assert_eq!(kind.id(), id);
            assert_eq!(kind.to_string(), id);
        }
        assert_eq!(StrategyKind::ids().count(), 16);
    }

    #[test]
    fn test_content_variants() {
        assert_eq!(
            StrategyKind::lookup("cbt"),
            Some(StrategyKind::ContentBased(ContentKind::Tag))
        );
        assert_eq!(
            StrategyKind::lookup("cbh_eset"),
            Some(StrategyKind::ContentBased(ContentKind::HalfEset))
        );
    }

    #[test]
    fn test_unknown_identifier() {
        assert_eq!(StrategyKind::lookup("demographic"), None);
        match "demographic".parse::<StrategyKind>() {
            Err(ApprecError::UnknownStrategy(id)) => assert_eq!(id, "demographic"),
            other => panic!("expected unknown strategy, got {other:?}"),
        }
    }
}
