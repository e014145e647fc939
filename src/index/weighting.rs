//! Weighting schemes for OR-queries against the term index.
//!
//! Both schemes share the probabilistic term weight
//! `ln((N - n + 0.5) / (n + 0.5))`, where ratios below 2 are compressed to
//! `ratio / 2 + 1` so that very common terms keep a small positive weight.

use serde::{Deserialize, Serialize};

/// Corpus-level statistics a scheme needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionStats {
    /// Number of items in the corpus.
    pub corpus_size: usize,
    /// Average item length (sum of wdf).
    pub average_length: f64,
}

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Within-document frequency saturation.
    pub k1: f64,
    /// Query-length correction, added once per item.
    pub k2: f64,
    /// Within-query frequency saturation.
    pub k3: f64,
    /// Length normalisation strength.
    pub b: f64,
    /// Lower bound of the normalised item length.
    pub min_normlen: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            k2: 0.0,
            k3: 7.0,
            b: 0.75,
            min_normlen: 0.5,
        }
    }
}

/// Traditional probabilistic weighting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradParams {
    pub k: f64,
}

impl Default for TradParams {
    fn default() -> Self {
        Self { k: 1.0 }
    }
}

/// Weighting scheme applied by [`crate::index::TermIndex::search`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum WeightingScheme {
    Bm25(Bm25Params),
    Trad(TradParams),
}

impl Default for WeightingScheme {
    fn default() -> Self {
        WeightingScheme::Bm25(Bm25Params::default())
    }
}

/// Probabilistic inverse frequency of a term attached to `n` of `corpus_size` items.
pub fn inverse_frequency(corpus_size: usize, n: usize) -> f64 {
    let big_n = corpus_size as f64;
    let n = n as f64;
    let mut ratio = (big_n - n + 0.5) / (n + 0.5);
    if ratio < 2.0 {
        ratio = ratio * 0.5 + 1.0;
    }
    ratio.ln()
}

fn length_ratio(stats: &CollectionStats, item_length: f64) -> f64 {
    if stats.average_length > 0.0 {
        item_length / stats.average_length
    } else {
        1.0
    }
}

impl WeightingScheme {
    /// Weight contributed by one query term to one matching item.
    ///
    /// `n` is the number of items carrying the term, `wqf` its frequency in
    /// the query and `wdf` its frequency in the item.
    pub fn term_weight(
        &self,
        stats: &CollectionStats,
        n: usize,
        wqf: u32,
        wdf: u32,
        item_length: f64,
    ) -> f64 {
        let idf = inverse_frequency(stats.corpus_size, n);
        let wdf = f64::from(wdf);

        match self {
            WeightingScheme::Bm25(p) => {
                let wqf = f64::from(wqf);
                let query_part = if p.k3 + wqf > 0.0 {
                    (p.k3 + 1.0) * wqf / (p.k3 + wqf)
                } else {
                    0.0
                };
                let normlen = length_ratio(stats, item_length).max(p.min_normlen);
                let denom = p.k1 * ((1.0 - p.b) + p.b * normlen) + wdf;
                let item_part = if denom > 0.0 {
                    (p.k1 + 1.0) * wdf / denom
                } else {
                    0.0
                };
                idf * query_part * item_part
            }
            WeightingScheme::Trad(p) => {
                let denom = p.k * length_ratio(stats, item_length) + wdf;
                let item_part = if denom > 0.0 {
                    (p.k + 1.0) * wdf / denom
                } else {
                    0.0
                };
                idf * item_part
            }
        }
    }

    /// Per-item weight that does not depend on individual terms.
    pub fn extra_weight(&self, stats: &CollectionStats, query_length: usize, item_length: f64) -> f64 {
        match self {
            WeightingScheme::Bm25(p) if p.k2 != 0.0 => {
                let normlen = length_ratio(stats, item_length).max(p.min_normlen);
                p.k2 * query_length as f64 * (1.0 - normlen) / (1.0 + normlen)
            }
            _ => 0.0,
        }
    }
}
