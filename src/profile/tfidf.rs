//! TF-IDF ranking of the terms of a set of items.

use std::collections::BTreeMap;

use log::debug;

use crate::index::filter::TermFilter;
use crate::index::term;
use crate::index::TermIndex;
use crate::profile::time::TermDecay;

/// A candidate profile term and its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

/// Ranks every accepted term of `items` by sublinear TF-IDF.
///
/// The term frequency is the number of selected items carrying the term, so
/// `tf = 1 + ln(count)` and `idf = ln(corpus_size / frequency)`. With a decay
/// source the weight is further multiplied by the decay of the term over the
/// selected items carrying it. Terms whose weight is not finite are skipped.
/// Items unknown to the index contribute nothing.
pub fn rank_terms(
    index: &dyn TermIndex,
    items: &[String],
    filter: &dyn TermFilter,
    decay: Option<&dyn TermDecay>,
) -> Vec<WeightedTerm> {
    // term -> items of the selection carrying it
    let mut selection: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in items {
        for item_term in index.terms_of(item) {
            if term::is_package(&item_term.term) || !filter.accepts_term(&item_term.term) {
                continue;
            }
            selection
                .entry(item_term.term)
                .or_default()
                .push(item.clone());
        }
    }

    let corpus_size = index.corpus_size() as f64;
    let mut ranked = Vec::with_capacity(selection.len());

    for (term, carriers) in selection {
        let tf = 1.0 + (carriers.len() as f64).ln();
        let idf = (corpus_size / index.frequency(&term) as f64).ln();
        let mut weight = tf * idf;
        if let Some(decay) = decay {
            weight *= decay.term_weight(&term, &carriers);
        }

        if weight.is_finite() {
            ranked.push(WeightedTerm { term, weight });
        } else {
            debug!("Skipping term {term}: weight is not finite");
        }
    }

    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.term.cmp(&b.term)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::filter::{AcceptAll, TagFilter};
    use crate::index::memory::{IndexedItem, MemoryTermIndex};

    fn index() -> MemoryTermIndex {
        MemoryTermIndex::from_items(vec![
            IndexedItem::new("a")
                .with_term("XPa", 1)
                .with_term("XTuse::editing", 1)
                .with_term("editor", 1),
            IndexedItem::new("b")
                .with_term("XPb", 1)
                .with_term("XTuse::editing", 1)
                .with_term("text", 1),
            IndexedItem::new("c").with_term("XPc", 1).with_term("text", 1),
            IndexedItem::new("d").with_term("XPd", 1).with_term("mail", 1),
        ])
        .unwrap()
    }

    struct Halve;

    impl TermDecay for Halve {
        fn term_weight(&self, _term: &str, _packages: &[String]) -> f64 {
            0.5
        }
    }

    #[test]
    fn test_weights() {
        let index = index();
        let items = vec!["a".to_string(), "b".to_string()];
        let ranked = rank_terms(&index, &items, &AcceptAll, None);

        // package terms never enter a profile
        assert!(ranked.iter().all(|t| !t.term.starts_with("XP")));

        let editing = ranked.iter().find(|t| t.term == "XTuse::editing").unwrap();
        let expected = (1.0 + 2f64.ln()) * (4.0f64 / 2.0).ln();
        assert!((editing.weight - expected).abs() < 1e-12);

        let editor = ranked.iter().find(|t| t.term == "editor").unwrap();
        assert!((editor.weight - 4f64.ln()).abs() < 1e-12);

        assert_eq!(ranked[0].term, "editor");
        assert!(ranked.windows(2).all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn test_filter_decay_and_unknown_items() {
        let index = index();
        let items = vec!["a".to_string(), "zzz".to_string()];

        let ranked = rank_terms(&index, &items, &TagFilter::new(), Some(&Halve as &dyn TermDecay));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].term, "XTuse::editing");
        assert!((ranked[0].weight - 0.5 * 2f64.ln()).abs() < 1e-12);

        assert!(rank_terms(&index, &[], &AcceptAll, None).is_empty());
    }
}
