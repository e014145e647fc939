//! Classifier-augmented recommendation.
//!
//! A content pass over a profile of `suggestion_size` terms gathers up to
//! `suggestion_size` candidates. Every candidate is classified into a
//! usefulness tier and scored `tier_weight(label) + suggestion_size - rank`,
//! where `rank` is the 1-based position in the content ranking. The tier dominates; the content rank
//! orders items within a tier.

use log::debug;

use crate::error::Result;
use crate::profile::ContentKind;
use crate::recommender::content::content_search;
use crate::recommender::result::RecommendationResult;
use crate::recommender::strategy::{ClassifierSource, StrategyKind};
use crate::recommender::{Strategy, StrategyContext};
use crate::user::UserProfile;

#[derive(Debug, Clone, Copy)]
pub struct MachineLearning {
    content: ContentKind,
    classifier: ClassifierSource,
}

impl MachineLearning {
    pub fn new(content: ContentKind, classifier: ClassifierSource) -> Self {
        MachineLearning {
            content,
            classifier,
        }
    }
}

impl Strategy for MachineLearning {
    fn id(&self) -> &'static str {
        StrategyKind::MachineLearning {
            classifier: self.classifier,
            expansion: self.content == ContentKind::MixEset,
        }
        .id()
    }

    fn run(
        &self,
        ctx: &StrategyContext<'_>,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        let classifier = ctx.require_classifier(self.id(), self.classifier)?;
        let suggestion_size = ctx.config.suggestion_size;

        let hits = content_search(
            ctx,
            user,
            self.content,
            suggestion_size,
            suggestion_size,
            &|_: &str| true,
        )?;

        let mut scores = Vec::with_capacity(hits.len());
        for (position, hit) in hits.into_iter().enumerate() {
            let label = classifier.classify_item(ctx.index, &hit.item)?;
            let rank = position + 1;
            let score =
                ctx.config.tier_weight(&label) + suggestion_size.saturating_sub(rank) as f64;
            debug!("{}: {label} ({score})", hit.item);
            scores.push((hit.item, score));
        }

        Ok(RecommendationResult::from_scores(self.id(), scores, size))
    }
}
