//! In-memory term index.
//!
//! Items are loaded from JSON Lines, one object per line:
//!
//! ```json
//! {"name": "gimp", "terms": {"XPgimp": 1, "XTuse::editing": 1, "image": 3}, "description": "GNU Image Manipulation Program"}
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ApprecError, Result};
use crate::index::filter::{ItemFilter, TermFilter};
use crate::index::weighting::{CollectionStats, WeightingScheme, inverse_frequency};
use crate::index::{ExpandedTerm, ItemTerm, SearchHit, TermIndex};

/// Within-document saturation used when weighting expansion terms.
const EXPAND_K: f64 = 1.0;

/// An item as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedItem {
    pub name: String,
    #[serde(default)]
    pub terms: BTreeMap<String, u32>,
    #[serde(default)]
    pub description: String,
}

impl IndexedItem {
    pub fn new<S: Into<String>>(name: S) -> Self {
        IndexedItem {
            name: name.into(),
            terms: BTreeMap::new(),
            description: String::new(),
        }
    }

    /// Adds `wdf` occurrences of a term.
    pub fn with_term<S: Into<String>>(mut self, term: S, wdf: u32) -> Self {
        *self.terms.entry(term.into()).or_insert(0) += wdf;
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    fn length(&self) -> u64 {
        self.terms.values().map(|&wdf| u64::from(wdf)).sum()
    }
}

/// Term index held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTermIndex {
    items: Vec<IndexedItem>,
    by_name: AHashMap<String, usize>,
    postings: AHashMap<String, Vec<usize>>,
    total_length: u64,
}

impl MemoryTermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from items. Duplicate item names are rejected.
    pub fn from_items<I: IntoIterator<Item = IndexedItem>>(items: I) -> Result<Self> {
        let mut index = Self::new();
        for item in items {
            index.add_item(item)?;
        }
        Ok(index)
    }

    /// Adds an item to the index.
    pub fn add_item(&mut self, item: IndexedItem) -> Result<()> {
        if self.by_name.contains_key(&item.name) {
            return Err(ApprecError::invalid_argument(format!(
                "duplicate item '{}'",
                item.name
            )));
        }

        let id = self.items.len();
        for term in item.terms.keys() {
            self.postings.entry(term.clone()).or_default().push(id);
        }
        self.total_length += item.length();
        self.by_name.insert(item.name.clone(), id);
        self.items.push(item);
        Ok(())
    }

    /// Loads an index from a JSON Lines file. Blank lines are ignored.
    pub fn load_jsonl<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut index = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let item: IndexedItem = serde_json::from_str(&line).map_err(|e| {
                ApprecError::parse(format!("{}:{}: {e}", path.display(), line_no + 1))
            })?;
            index.add_item(item)?;
        }

        debug!(
            "Loaded {} items ({} distinct terms) from {}",
            index.items.len(),
            index.postings.len(),
            path.display()
        );
        Ok(index)
    }

    /// Writes the index as JSON Lines.
    pub fn save_jsonl<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for item in &self.items {
            serde_json::to_writer(&mut writer, item)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Item names in insertion order.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name.as_str())
    }

    pub fn item(&self, name: &str) -> Option<&IndexedItem> {
        self.by_name.get(name).map(|&id| &self.items[id])
    }

    /// Inverse frequency of a term in this corpus.
    pub fn inverse_frequency(&self, term: &str) -> f64 {
        inverse_frequency(self.corpus_size(), self.frequency(term))
    }

    fn stats(&self) -> CollectionStats {
        let average_length = if self.items.is_empty() {
            0.0
        } else {
            self.total_length as f64 / self.items.len() as f64
        };
        CollectionStats {
            corpus_size: self.items.len(),
            average_length,
        }
    }
}

impl TermIndex for MemoryTermIndex {
    fn corpus_size(&self) -> usize {
        self.items.len()
    }

    fn frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    fn contains(&self, item: &str) -> bool {
        self.by_name.contains_key(item)
    }

    fn terms_of(&self, item: &str) -> Vec<ItemTerm> {
        self.item(item)
            .map(|item| {
                item.terms
                    .iter()
                    .map(|(term, &wdf)| ItemTerm {
                        term: term.clone(),
                        wdf,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn description(&self, item: &str) -> Option<String> {
        self.item(item).map(|item| item.description.clone())
    }

    fn search(
        &self,
        terms: &[String],
        scheme: &WeightingScheme,
        filter: &dyn ItemFilter,
        limit: usize,
    ) -> Vec<SearchHit> {
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let stats = self.stats();
        let mut query: Vec<(&str, u32)> = Vec::new();
        for term in terms {
            match query.iter_mut().find(|(t, _)| *t == term.as_str()) {
                Some((_, wqf)) => *wqf += 1,
                None => query.push((term.as_str(), 1)),
            }
        }

        let mut scores: AHashMap<usize, f64> = AHashMap::new();
        for (term, wqf) in &query {
            let Some(posting) = self.postings.get(*term) else {
                continue;
            };
            for &id in posting {
                let item = &self.items[id];
                let wdf = item.terms.get(*term).copied().unwrap_or(0);
                let weight =
                    scheme.term_weight(&stats, posting.len(), *wqf, wdf, item.length() as f64);
                *scores.entry(id).or_insert(0.0) += weight;
            }
        }

        let mut hits: Vec<(usize, f64)> = scores
            .into_iter()
            .filter(|(id, _)| filter.accepts_item(&self.items[*id].name))
            .map(|(id, weight)| {
                let length = self.items[id].length() as f64;
                (id, weight + scheme.extra_weight(&stats, terms.len(), length))
            })
            .collect();

        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(limit);

        hits.into_iter()
            .map(|(id, weight)| SearchHit {
                item: self.items[id].name.clone(),
                weight,
            })
            .collect()
    }

    fn expand(
        &self,
        relevant: &[String],
        count: usize,
        filter: &dyn TermFilter,
    ) -> Vec<ExpandedTerm> {
        let mut relevant_ids: Vec<usize> = relevant
            .iter()
            .filter_map(|name| self.by_name.get(name).copied())
            .collect();
        relevant_ids.sort_unstable();
        relevant_ids.dedup();

        if relevant_ids.is_empty() || count == 0 {
            return Vec::new();
        }

        let stats = self.stats();
        let big_r = relevant_ids.len() as f64;

        // term -> (relevant items carrying it, summed wdf factor)
        let mut candidates: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for &id in &relevant_ids {
            let item = &self.items[id];
            let length_ratio = if stats.average_length > 0.0 {
                item.length() as f64 / stats.average_length
            } else {
                1.0
            };
            for (term, &wdf) in &item.terms {
                let wdf = f64::from(wdf);
                let factor = (EXPAND_K + 1.0) * wdf / (EXPAND_K * length_ratio + wdf);
                let entry = candidates.entry(term.as_str()).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += factor;
            }
        }

        let big_n = stats.corpus_size as f64;
        let mut expanded: Vec<ExpandedTerm> = candidates
            .into_iter()
            .filter(|(term, _)| filter.accepts_term(term))
            .map(|(term, (r, multiplier))| {
                let r = r as f64;
                let n = self.frequency(term) as f64;
                let mut ratio = ((r + 0.5) * (big_n - big_r - n + r + 0.5))
                    / ((big_r - r + 0.5) * (n - r + 0.5));
                if ratio < 2.0 {
                    ratio = ratio * 0.5 + 1.0;
                }
                ExpandedTerm {
                    term: term.to_string(),
                    weight: ratio.ln() * multiplier,
                }
            })
            .collect();

        expanded.sort_by(|a, b| b.weight.total_cmp(&a.weight).then(a.term.cmp(&b.term)));
        expanded.truncate(count);
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::filter::{AcceptAll, DescriptionFilter, TagFilter};
    use tempfile::TempDir;

    fn sample_index() -> MemoryTermIndex {
        MemoryTermIndex::from_items(vec![
            IndexedItem::new("gimp")
                .with_term("XPgimp", 1)
                .with_term("XTuse::editing", 1)
                .with_term("XTworks-with::image", 1)
                .with_term("image", 3)
                .with_description("GNU Image Manipulation Program"),
            IndexedItem::new("inkscape")
                .with_term("XPinkscape", 1)
                .with_term("XTuse::editing", 1)
                .with_term("XTworks-with::image:vector", 1)
                .with_term("vector", 2)
                .with_description("vector-based drawing program"),
            IndexedItem::new("vim")
                .with_term("XPvim", 1)
                .with_term("XTuse::editing", 1)
                .with_term("XTworks-with::text", 1)
                .with_term("editor", 2)
                .with_description("Vi IMproved - enhanced vi editor"),
            IndexedItem::new("mutt")
                .with_term("XPmutt", 1)
                .with_term("XTworks-with::mail", 1)
                .with_term("mail", 2)
                .with_description("text-based mailreader"),
        ])
        .unwrap()
    }

    #[test]
    fn test_statistics() {
        let index = sample_index();
        assert_eq!(index.corpus_size(), 4);
        assert_eq!(index.frequency("XTuse::editing"), 3);
        assert_eq!(index.frequency("missing"), 0);
        assert!(index.contains("vim"));
        assert_eq!(index.terms_of("mutt").len(), 3);
        assert!(index.terms_of("emacs").is_empty());
        assert!(index.inverse_frequency("image") > index.inverse_frequency("XTuse::editing"));
    }

    #[test]
    fn test_duplicate_items_are_rejected() {
        let mut index = sample_index();
        assert!(index.add_item(IndexedItem::new("vim")).is_err());
    }

    #[test]
    fn test_search_ranks_and_filters() {
        let index = sample_index();
        let scheme = WeightingScheme::default();
        let terms = vec!["image".to_string(), "XTuse::editing".to_string()];

        let hits = index.search(&terms, &scheme, &AcceptAll, 10);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].item, "gimp");
        assert!(hits.windows(2).all(|w| w[0].weight >= w[1].weight));

        let not_gimp = |item: &str| item != "gimp";
        let hits = index.search(&terms, &scheme, &not_gimp, 1);
        assert_eq!(hits.len(), 1);
        assert_ne!(hits[0].item, "gimp");
    }

    #[test]
    fn test_expand_prefers_differentiating_terms() {
        let index = sample_index();
        let relevant = vec!["gimp".to_string(), "inkscape".to_string()];

        let tags = index.expand(&relevant, 10, &TagFilter::new());
        assert!(!tags.is_empty());
        assert!(tags.iter().all(|t| t.term.starts_with("XT")));

        let words = index.expand(&relevant, 1, &DescriptionFilter);
        assert_eq!(words.len(), 1);
        assert!(words[0].term == "image" || words[0].term == "vector");

        assert!(index.expand(&["emacs".to_string()], 5, &AcceptAll).is_empty());
    }

    #[test]
    fn test_jsonl_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.jsonl");
        let index = sample_index();
        index.save_jsonl(&path).unwrap();

        let loaded = MemoryTermIndex::load_jsonl(&path).unwrap();
        assert_eq!(loaded.corpus_size(), 4);
        assert_eq!(loaded.item("gimp"), index.item("gimp"));
        assert_eq!(
            loaded.description("vim").as_deref(),
            Some("Vi IMproved - enhanced vi editor")
        );
    }

    #[test]
    fn test_malformed_line_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jsonl");
        std::fs::write(&path, "{\"name\": \"vim\"}\nnot json\n").unwrap();

        match MemoryTermIndex::load_jsonl(&path) {
            Err(ApprecError::Parse(msg)) => assert!(msg.contains(":2:")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
