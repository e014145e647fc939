//! Collaborative recommendation over precomputed clusters.

use log::debug;

use crate::error::Result;
use crate::index::filter::{PackageExpandFilter, TermFilter};
use crate::index::term;
use crate::cluster::ClusterLocator;
use crate::recommender::result::RecommendationResult;
use crate::recommender::strategy::StrategyKind;
use crate::recommender::{Strategy, StrategyContext};
use crate::user::UserProfile;

/// Ranks the members of the user's nearest cluster by occurrence count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collaborative;

impl Strategy for Collaborative {
    fn id(&self) -> &'static str {
        StrategyKind::Collaborative.id()
    }

    fn run(
        &self,
        ctx: &StrategyContext<'_>,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        let scores = neighbourhood_scores(ctx, user, self.id())?;
        Ok(RecommendationResult::from_scores(self.id(), scores, size))
    }
}

/// Co-cluster members the user does not own, scored by occurrence count and
/// listed in universe order.
pub(crate) fn neighbourhood_scores(
    ctx: &StrategyContext<'_>,
    user: &UserProfile,
    strategy: &str,
) -> Result<Vec<(String, f64)>> {
    let clusters = ctx.require_clusters(strategy)?;
    let owned = user.items();
    let located = ClusterLocator::new(clusters).locate(&owned)?;

    let filter = PackageExpandFilter::new(owned);
    let scores: Vec<(String, f64)> = located
        .members
        .into_iter()
        .filter(|(package, _)| filter.accepts_term(&term::package_term(package)))
        .map(|(package, count)| (package, f64::from(count)))
        .collect();

    debug!(
        "Cluster {} offers {} new packages",
        located.cluster,
        scores.len()
    );
    Ok(scores)
}
