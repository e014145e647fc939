//! Strategy dispatcher.
//!
//! A [`Recommender`] owns the configuration and borrows the read-only data a
//! strategy may need: the term index, the cluster model, the Bayes
//! classifier, an external vector classifier and a usage-decay source. The
//! strategy identifier selects a [`StrategyKind`], which builds the concrete
//! [`Strategy`].
//!
//! # Example
//!
//! ```
//! use apprec::config::RecommenderConfig;
//! use apprec::index::memory::{IndexedItem, MemoryTermIndex};
//! use apprec::recommender::Recommender;
//! use apprec::user::UserProfile;
//!
//! let index = MemoryTermIndex::from_items(vec![
//!     IndexedItem::new("vim").with_term("XTuse::editing", 1).with_term("editor", 2),
//!     IndexedItem::new("emacs").with_term("XTuse::editing", 1).with_term("editor", 1),
//!     IndexedItem::new("gimp").with_term("XTworks-with::image", 1),
//! ])
//! .unwrap();
//!
//! let recommender = Recommender::new(RecommenderConfig::default(), &index);
//! let user = UserProfile::from_items(["vim"]);
//! let result = recommender.recommend("cb", &user, 5).unwrap();
//! assert_eq!(result.ranking(), ["emacs"]);
//! ```

pub mod collaborative;
pub mod content;
pub mod hybrid;
pub mod machine_learning;
pub mod result;
pub mod strategy;

use log::{info, warn};

use crate::bayes::ItemClassifier;
use crate::cluster::ClusterModel;
use crate::config::RecommenderConfig;
use crate::error::{ApprecError, Result};
use crate::index::TermIndex;
use crate::profile::TermProfileBuilder;
use crate::profile::time::TermDecay;
use crate::user::UserProfile;

pub use result::{RecommendationEntry, RecommendationResult};
pub use strategy::{ClassifierSource, HybridOrder, StrategyKind};

/// Read-only data shared by every strategy.
#[derive(Clone, Copy)]
pub struct StrategyContext<'a> {
    pub config: &'a RecommenderConfig,
    pub index: &'a dyn TermIndex,
    pub clusters: Option<&'a ClusterModel>,
    pub bayes: Option<&'a dyn ItemClassifier>,
    pub vector_classifier: Option<&'a dyn ItemClassifier>,
    pub decay: Option<&'a dyn TermDecay>,
}

impl<'a> StrategyContext<'a> {
    /// Profile builder configured with the tag whitelist and decay source.
    pub fn profile_builder(&self) -> TermProfileBuilder<'a> {
        let builder =
            TermProfileBuilder::new(self.index).with_valid_tags(&self.config.valid_tags);
        match self.decay {
            Some(decay) => builder.with_decay(decay),
            None => builder,
        }
    }

    /// Cluster model, or an error naming the strategy that needed it.
    pub fn require_clusters(&self, strategy: &str) -> Result<&'a ClusterModel> {
        self.clusters.ok_or_else(|| {
            ApprecError::model_state(format!("strategy '{strategy}' requires a cluster model"))
        })
    }

    /// Classifier of the given source.
    pub fn require_classifier(
        &self,
        strategy: &str,
        source: ClassifierSource,
    ) -> Result<&'a dyn ItemClassifier> {
        let classifier = match source {
            ClassifierSource::Bayes => self.bayes,
            ClassifierSource::Vector => self.vector_classifier,
        };
        classifier.ok_or_else(|| {
            ApprecError::model_state(format!("strategy '{strategy}' requires a trained classifier"))
        })
    }
}

/// A recommendation strategy.
pub trait Strategy {
    /// Identifier of the strategy.
    fn id(&self) -> &'static str;

    /// Ranks at most `size` items for `user`.
    fn run(
        &self,
        ctx: &StrategyContext<'_>,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult>;
}

/// Dispatches recommendation requests to strategies.
pub struct Recommender<'a> {
    config: RecommenderConfig,
    index: &'a dyn TermIndex,
    clusters: Option<&'a ClusterModel>,
    bayes: Option<&'a dyn ItemClassifier>,
    vector_classifier: Option<&'a dyn ItemClassifier>,
    decay: Option<&'a dyn TermDecay>,
}

impl<'a> Recommender<'a> {
    pub fn new(config: RecommenderConfig, index: &'a dyn TermIndex) -> Self {
        Recommender {
            config,
            index,
            clusters: None,
            bayes: None,
            vector_classifier: None,
            decay: None,
        }
    }

    pub fn with_clusters(mut self, clusters: &'a ClusterModel) -> Self {
        self.clusters = Some(clusters);
        self
    }

    /// Sets the classifier used by `mlbva` strategies.
    pub fn with_bayes(mut self, classifier: &'a dyn ItemClassifier) -> Self {
        self.bayes = Some(classifier);
        self
    }

    /// Sets the external classifier used by `mlbow` strategies.
    pub fn with_vector_classifier(mut self, classifier: &'a dyn ItemClassifier) -> Self {
        self.vector_classifier = Some(classifier);
        self
    }

    /// Sets the usage-decay source used by the time-weighted profile.
    pub fn with_decay(mut self, decay: &'a dyn TermDecay) -> Self {
        self.decay = Some(decay);
        self
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn index(&self) -> &'a dyn TermIndex {
        self.index
    }

    fn context(&self) -> StrategyContext<'_> {
        StrategyContext {
            config: &self.config,
            index: self.index,
            clusters: self.clusters,
            bayes: self.bayes,
            vector_classifier: self.vector_classifier,
            decay: self.decay,
        }
    }

    /// Recommends `size` items with the strategy named `strategy_id`.
    ///
    /// An unknown identifier selects no strategy and yields an empty result
    /// without a strategy.
    pub fn recommend(
        &self,
        strategy_id: &str,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        match StrategyKind::lookup(strategy_id) {
            Some(kind) => self.recommend_with(kind, user, size),
            None => {
                warn!("Strategy not defined: {strategy_id}");
                Ok(RecommendationResult::no_strategy())
            }
        }
    }

    /// Recommends with the configured strategy and result size.
    pub fn recommend_default(&self, user: &UserProfile) -> Result<RecommendationResult> {
        self.recommend(&self.config.strategy, user, self.config.num_recommendations)
    }

    pub fn recommend_with(
        &self,
        kind: StrategyKind,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        let strategy = kind.build();
        info!(
            "Recommending {size} items with strategy {} for profile {} of {} items",
            strategy.id(),
            user.id,
            user.len()
        );

        let ctx = self.context();
        let mut result = strategy.run(&ctx, user, size)?.for_user(user.id);
        if self.config.because {
            result.explain(self.index, &user.items());
        }
        Ok(result)
    }
}
