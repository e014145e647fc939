//! Recommendation results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::index::TermIndex;
use crate::util::similarity::DescriptionMatcher;

/// Owned items listed as the reason for one recommendation.
pub const MAX_EXPLANATIONS: usize = 4;

/// One recommended item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub item: String,
    pub score: f64,
    /// Owned items with the most similar descriptions, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub because: Vec<String>,
}

/// Scored items ranked by score, highest first.
///
/// A result without a strategy is the outcome of an unknown strategy
/// identifier; it is always empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    strategy: Option<String>,
    /// Id of the profile the result was computed for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<Uuid>,
    entries: Vec<RecommendationEntry>,
}

impl RecommendationResult {
    /// Result of an unknown strategy.
    pub fn no_strategy() -> Self {
        Self::default()
    }

    /// Ranks `scores` by score. Equal scores keep their input order. At most
    /// `limit` entries are kept.
    pub fn from_scores<S: Into<String>>(strategy: S, scores: Vec<(String, f64)>, limit: usize) -> Self {
        let mut entries: Vec<RecommendationEntry> = scores
            .into_iter()
            .map(|(item, score)| RecommendationEntry {
                item,
                score,
                because: Vec::new(),
            })
            .collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        entries.truncate(limit);

        RecommendationResult {
            strategy: Some(strategy.into()),
            user: None,
            entries,
        }
    }

    /// Tags the result with the id of the profile it answers.
    pub fn for_user(mut self, id: Uuid) -> Self {
        self.user = Some(id);
        self
    }

    pub fn user(&self) -> Option<Uuid> {
        self.user
    }

    /// Identifier of the strategy that produced the result.
    pub fn strategy(&self) -> Option<&str> {
        self.strategy.as_deref()
    }

    pub fn entries(&self) -> &[RecommendationEntry] {
        &self.entries
    }

    /// Items in rank order.
    pub fn ranking(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.item.as_str()).collect()
    }

    pub fn scores(&self) -> BTreeMap<&str, f64> {
        self.entries
            .iter()
            .map(|e| (e.item.as_str(), e.score))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attaches to every entry the owned items whose descriptions are most
    /// similar to the entry's description. Ties go to the owned item whose
    /// name sorts first.
    pub fn explain(&mut self, index: &dyn TermIndex, owned: &[String]) {
        let mut owned_descriptions: Vec<(&str, String)> = owned
            .iter()
            .filter_map(|item| {
                index
                    .description(item)
                    .map(|desc| (item.as_str(), desc.to_lowercase()))
            })
            .collect();
        owned_descriptions.sort_by(|a, b| a.0.cmp(b.0));

        for entry in &mut self.entries {
            let Some(description) = index.description(&entry.item) else {
                continue;
            };
            let matcher = DescriptionMatcher::new(&description.to_lowercase());

            let mut ratios: Vec<(&str, u32)> = owned_descriptions
                .iter()
                .map(|(item, desc)| (*item, matcher.ratio(desc)))
                .collect();
            ratios.sort_by(|a, b| b.1.cmp(&a.1));

            entry.because = ratios
                .into_iter()
                .take(MAX_EXPLANATIONS)
                .map(|(item, _)| item.to_string())
                .collect();
        }
    }
}

impl fmt::Display for RecommendationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, entry) in self.entries.iter().enumerate() {
            writeln!(f, "{:>3}: {:<30} {:>10.4}", rank + 1, entry.item, entry.score)?;
            if !entry.because.is_empty() {
                writeln!(f, "     because you own: {}", entry.because.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{IndexedItem, MemoryTermIndex};

    fn scores(raw: &[(&str, f64)]) -> Vec<(String, f64)> {
        raw.iter().map(|(i, s)| (i.to_string(), *s)).collect()
    }

    #[test]
    fn test_stable_ranking() {
        let result = RecommendationResult::from_scores(
            "cb",
            scores(&[("b", 1.0), ("a", 3.0), ("c", 1.0), ("d", 2.0)]),
            10,
        );
        assert_eq!(result.ranking(), ["a", "d", "b", "c"]);
        assert_eq!(result.strategy(), Some("cb"));
        assert_eq!(result.scores()["d"], 2.0);

        let limited = RecommendationResult::from_scores("cb", scores(&[("a", 1.0), ("b", 2.0)]), 1);
        assert_eq!(limited.ranking(), ["b"]);
    }

    #[test]
    fn test_no_strategy_is_empty() {
        let result = RecommendationResult::no_strategy();
        assert!(result.is_empty());
        assert_eq!(result.strategy(), None);
        assert_eq!(result.to_string(), "");
        assert_eq!(result.user(), None);
    }

    #[test]
    fn test_user_id_is_serialized() {
        let id = Uuid::new_v4();
        let result = RecommendationResult::from_scores("cb", scores(&[("a", 1.0)]), 10);
        assert!(serde_json::to_value(&result).unwrap().get("user").is_none());

        let result = result.for_user(id);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["user"], id.to_string());

        let back: RecommendationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.user(), Some(id));
    }

    #[test]
    fn test_explanations() {
        let mut items = vec![
            IndexedItem::new("inkscape").with_description("Vector-based drawing program"),
            IndexedItem::new("gimp").with_description("GNU Image Manipulation Program"),
            IndexedItem::new("krita").with_description("pixel-based image manipulation program"),
            IndexedItem::new("mutt").with_description("text-based mailreader"),
        ];
        for i in 0..4 {
            items.push(IndexedItem::new(format!("same{i}")).with_description("identical"));
        }
        let index = MemoryTermIndex::from_items(items).unwrap();

        let owned: Vec<String> = ["gimp", "mutt", "inkscape", "same3", "same1", "same2", "same0"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut result = RecommendationResult::from_scores("cb", scores(&[("krita", 1.0)]), 10);
        result.explain(&index, &owned);
        let because = &result.entries()[0].because;
        assert_eq!(because.len(), MAX_EXPLANATIONS);
        assert_eq!(because[0], "gimp");

        let mut result =
            RecommendationResult::from_scores("cb", scores(&[("same0", 1.0)]), 10);
        result.explain(&index, &owned);
        assert_eq!(result.entries()[0].because, ["same0", "same1", "same2", "same3"]);
    }
}
