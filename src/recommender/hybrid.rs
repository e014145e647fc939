//! Hybrid strategies composing a content pass and a collaborative pass.

use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::error::Result;
use crate::index::filter::TagExpandFilter;
use crate::index::filter::{ItemFilter, PackageMatchFilter};
use crate::profile::ContentKind;
use crate::recommender::collaborative::neighbourhood_scores;
use crate::recommender::content::content_search;
use crate::recommender::result::RecommendationResult;
use crate::recommender::strategy::{HybridOrder, StrategyKind};
use crate::recommender::{Strategy, StrategyContext};
use crate::user::UserProfile;

/// Narrows the candidates with one pass and ranks them with the other.
#[derive(Debug, Clone, Copy)]
pub struct Hybrid {
    order: HybridOrder,
}

impl Hybrid {
    pub fn new(order: HybridOrder) -> Self {
        Hybrid { order }
    }

    pub fn order(&self) -> HybridOrder {
        self.order
    }

    // Content suggestions ranked by how often they occur in the user's cluster.
    fn content_then_collaborative(
        &self,
        ctx: &StrategyContext<'_>,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        let neighbourhood: AHashMap<String, f64> =
            neighbourhood_scores(ctx, user, self.id())?.into_iter().collect();

        let in_cluster = |item: &str| neighbourhood.contains_key(item);
        let hits = content_search(
            ctx,
            user,
            ContentKind::Mix,
            ctx.config.profile_size,
            ctx.config.suggestion_size,
            &in_cluster,
        )?;
        debug!("{} content candidates inside the cluster", hits.len());

        let scores = hits
            .into_iter()
            .filter_map(|hit| neighbourhood.get(&hit.item).map(|&count| (hit.item, count)))
            .collect();
        Ok(RecommendationResult::from_scores(self.id(), scores, size))
    }

    // Cluster members ranked by a tag profile of the cluster itself.
    fn collaborative_then_content(
        &self,
        ctx: &StrategyContext<'_>,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        let mut members = neighbourhood_scores(ctx, user, self.id())?;
        members.sort_by(|a, b| b.1.total_cmp(&a.1));
        members.truncate(ctx.config.suggestion_size);

        let candidates: Vec<String> = members.into_iter().map(|(item, _)| item).collect();
        let profile: Vec<String> = ctx
            .index
            .expand(&candidates, ctx.config.profile_size, &TagExpandFilter)
            .into_iter()
            .map(|t| t.term)
            .collect();
        debug!("Neighbourhood profile: {profile:?}");

        let allowed: AHashSet<&str> = candidates.iter().map(String::as_str).collect();
        let package_filter = PackageMatchFilter::new(user.items());
        let filter =
            |item: &str| allowed.contains(item) && package_filter.accepts_item(item);

        let hits = ctx
            .index
            .search(&profile, &ctx.config.weighting, &filter, size);
        let scores = hits.into_iter().map(|hit| (hit.item, hit.weight)).collect();
        Ok(RecommendationResult::from_scores(self.id(), scores, size))
    }
}

impl Strategy for Hybrid {
    fn id(&self) -> &'static str {
        StrategyKind::Hybrid(self.order).id()
    }

    fn run(
        &self,
        ctx: &StrategyContext<'_>,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        match self.order {
            HybridOrder::ContentThenCollaborative => {
                self.content_then_collaborative(ctx, user, size)
            }
            HybridOrder::CollaborativeThenContent => {
                self.collaborative_then_content(ctx, user, size)
            }
        }
    }
}
