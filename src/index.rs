//! Term index collaborator.
//!
//! The recommendation core never builds or persists the term index itself; it
//! only consumes term statistics, ranked OR-query results and expansion terms
//! through the [`TermIndex`] trait. [`memory::MemoryTermIndex`] is an
//! in-memory implementation loaded from JSON Lines, used by the binary and by
//! the tests.

pub mod filter;
pub mod memory;
pub mod term;
pub mod weighting;

use serde::{Deserialize, Serialize};

use crate::index::filter::{ItemFilter, TermFilter};
use crate::index::weighting::WeightingScheme;

/// One ranked item returned by [`TermIndex::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Item (package) name.
    pub item: String,
    /// Weight assigned by the weighting scheme.
    pub weight: f64,
}

/// One differentiating term returned by [`TermIndex::expand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedTerm {
    pub term: String,
    pub weight: f64,
}

/// A term attached to an item, with its within-document frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTerm {
    pub term: String,
    pub wdf: u32,
}

/// Bidirectional item/term association consumed by the recommendation core.
pub trait TermIndex {
    /// Number of items in the corpus.
    fn corpus_size(&self) -> usize;

    /// Number of items the term is attached to.
    fn frequency(&self, term: &str) -> usize;

    /// Whether the corpus knows the item.
    fn contains(&self, item: &str) -> bool;

    /// Terms attached to an item, empty when the item is unknown.
    fn terms_of(&self, item: &str) -> Vec<ItemTerm>;

    /// Free-text description of an item, if the index stores one.
    fn description(&self, item: &str) -> Option<String>;

    /// OR-query: ranks every item matching at least one of `terms`, keeping
    /// only items accepted by `filter`. At most `limit` hits are returned,
    /// highest weight first.
    fn search(
        &self,
        terms: &[String],
        scheme: &WeightingScheme,
        filter: &dyn ItemFilter,
        limit: usize,
    ) -> Vec<SearchHit>;

    /// Returns up to `count` terms that best differentiate `relevant` items
    /// from the whole corpus, keeping only terms accepted by `filter`.
    fn expand(&self, relevant: &[String], count: usize, filter: &dyn TermFilter)
    -> Vec<ExpandedTerm>;
}
