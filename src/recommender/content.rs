//! Content-based recommendation.

use log::debug;

use crate::error::Result;
use crate::index::SearchHit;
use crate::index::filter::{ItemFilter, PackageMatchFilter};
use crate::profile::ContentKind;
use crate::recommender::result::RecommendationResult;
use crate::recommender::strategy::StrategyKind;
use crate::recommender::{Strategy, StrategyContext};
use crate::user::UserProfile;

/// Ranks items by how well they match a content profile of the user.
#[derive(Debug, Clone, Copy)]
pub struct ContentBased {
    content: ContentKind,
}

impl ContentBased {
    pub fn new(content: ContentKind) -> Self {
        ContentBased { content }
    }

    pub fn content(&self) -> ContentKind {
        self.content
    }
}

impl Strategy for ContentBased {
    fn id(&self) -> &'static str {
        StrategyKind::ContentBased(self.content).id()
    }

    fn run(
        &self,
        ctx: &StrategyContext<'_>,
        user: &UserProfile,
        size: usize,
    ) -> Result<RecommendationResult> {
        let hits = content_search(
            ctx,
            user,
            self.content,
            ctx.config.profile_size,
            size,
            &|_: &str| true,
        )?;
        let scores = hits.into_iter().map(|hit| (hit.item, hit.weight)).collect();
        Ok(RecommendationResult::from_scores(self.id(), scores, size))
    }
}

/// Builds a profile of `profile_size` terms and OR-queries the index with it.
///
/// Owned items and items rejected by the package naming rules never appear;
/// `restrict` narrows the candidates further.
pub(crate) fn content_search(
    ctx: &StrategyContext<'_>,
    user: &UserProfile,
    content: ContentKind,
    profile_size: usize,
    limit: usize,
    restrict: &dyn ItemFilter,
) -> Result<Vec<SearchHit>> {
    let owned = user.items();
    let profile = ctx
        .profile_builder()
        .content_profile(content, &owned, profile_size)?;
    if profile.is_empty() {
        debug!("Empty {content} profile, nothing to query");
        return Ok(Vec::new());
    }

    let package_filter = PackageMatchFilter::new(owned);
    let filter =
        |item: &str| package_filter.accepts_item(item) && restrict.accepts_item(item);

    Ok(ctx
        .index
        .search(profile.terms(), &ctx.config.weighting, &filter, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecommenderConfig;
    use crate::index::memory::{IndexedItem, MemoryTermIndex};

    fn index() -> MemoryTermIndex {
        MemoryTermIndex::from_items(vec![
            IndexedItem::new("gimp")
                .with_term("XTworks-with::image", 1)
                .with_term("XTuse::editing", 1)
                .with_term("image", 3),
            IndexedItem::new("krita")
                .with_term("XTworks-with::image", 1)
                .with_term("XTuse::editing", 1)
                .with_term("image", 2)
                .with_term("paint", 1),
            IndexedItem::new("mypaint")
                .with_term("XTworks-with::image", 1)
                .with_term("paint", 1),
            IndexedItem::new("gimp-doc").with_term("image", 4),
            IndexedItem::new("kde-paint").with_term("XTworks-with::image", 1),
            IndexedItem::new("mutt").with_term("XTworks-with::mail", 1),
        ])
        .unwrap()
    }

    fn context<'a>(config: &'a RecommenderConfig, index: &'a MemoryTermIndex) -> StrategyContext<'a> {
        StrategyContext {
            config,
            index,
            clusters: None,
            bayes: None,
            vector_classifier: None,
            decay: None,
        }
    }

    #[test]
    fn test_tag_and_description_variants() {
        let index = index();
        let config = RecommenderConfig::default();
        let ctx = context(&config, &index);
        let user = UserProfile::from_items(["gimp"]);

        let result = ContentBased::new(ContentKind::Mix).run(&ctx, &user, 10).unwrap();
        assert_eq!(result.strategy(), Some("cb"));
        assert_eq!(result.ranking()[0], "krita");
        assert!(!result.ranking().contains(&"gimp"));
        assert!(!result.ranking().contains(&"gimp-doc"));
        assert!(!result.ranking().contains(&"kde-paint"));
        assert!(!result.ranking().contains(&"mutt"));

        let result = ContentBased::new(ContentKind::Desc).run(&ctx, &user, 10).unwrap();
        assert_eq!(result.ranking(), ["krita"]);

        let result = ContentBased::new(ContentKind::Tag).run(&ctx, &user, 1).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_desktop_items_follow_the_user() {
        let index = index();
        let config = RecommenderConfig::default();
        let ctx = context(&config, &index);

        let user = UserProfile::from_items(["gimp", "kde"]);
        let result = ContentBased::new(ContentKind::Tag).run(&ctx, &user, 10).unwrap();
        assert!(result.ranking().contains(&"kde-paint"));
    }

    #[test]
    fn test_empty_profile_gives_empty_result() {
        let index = index();
        let config = RecommenderConfig::default();
        let ctx = context(&config, &index);

        let result = ContentBased::new(ContentKind::Mix)
            .run(&ctx, &UserProfile::from_items(Vec::<String>::new()), 10)
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.strategy(), Some("cb"));
    }

    #[test]
    fn test_restricted_search() {
        let index = index();
        let config = RecommenderConfig::default();
        let ctx = context(&config, &index);
        let user = UserProfile::from_items(["gimp"]);

        let only_mypaint = |item: &str| item == "mypaint";
        let hits =
            content_search(&ctx, &user, ContentKind::Tag, 10, 10, &only_mypaint).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item, "mypaint");
    }
}
