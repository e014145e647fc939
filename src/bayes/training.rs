//! Training data for the Bayes classifier.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ApprecError, Result};
use crate::index::TermIndex;
use crate::index::filter::{DescriptionFilter, TagFilter, TermFilter};
use crate::index::term;
use crate::util::matrix::Matrix;

/// Binary feature rows with one label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingMatrix {
    data: Matrix,
    labels: Vec<String>,
}

impl TrainingMatrix {
    pub fn new(data: Matrix, labels: Vec<String>) -> Result<Self> {
        if data.n_rows() != labels.len() {
            return Err(ApprecError::invalid_argument(format!(
                "{} rows but {} labels",
                data.n_rows(),
                labels.len()
            )));
        }
        if data.n_rows() == 0 {
            return Err(ApprecError::empty_input("training matrix has no rows"));
        }
        Ok(TrainingMatrix { data, labels })
    }

    pub fn from_rows<R, I, S>(rows: &[R], labels: I) -> Result<Self>
    where
        R: AsRef<[f64]>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Matrix::from_rows(rows)?,
            labels.into_iter().map(Into::into).collect(),
        )
    }

    pub fn data(&self) -> &Matrix {
        &self.data
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn num_rows(&self) -> usize {
        self.data.n_rows()
    }

    pub fn num_features(&self) -> usize {
        self.data.n_cols()
    }
}

/// Tag and description-term vocabularies defining an item's feature vector.
///
/// The feature vector of an item is tag presence over `tags` followed by term
/// presence over `terms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    tags: Vec<String>,
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn new(tags: Vec<String>, terms: Vec<String>) -> Self {
        Vocabulary { tags, terms }
    }

    /// Collects the sorted tags and description terms of `items`.
    pub fn from_items(index: &dyn TermIndex, items: &[String], valid_tags: &[String]) -> Self {
        let tag_filter = TagFilter::with_valid_tags(valid_tags.iter().cloned());
        let mut tags = BTreeSet::new();
        let mut terms = BTreeSet::new();

        for item in items {
            for item_term in index.terms_of(item) {
                if tag_filter.accepts_term(&item_term.term) {
                    if let Some(tag) = term::tag_name(&item_term.term) {
                        tags.insert(tag.to_string());
                    }
                } else if DescriptionFilter.accepts_term(&item_term.term) {
                    terms.insert(item_term.term);
                }
            }
        }

        Vocabulary {
            tags: tags.into_iter().collect(),
            terms: terms.into_iter().collect(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.tags.len() + self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binary attribute vector of an item.
    pub fn attributes(&self, index: &dyn TermIndex, item: &str) -> Vec<f64> {
        let item_terms: BTreeSet<String> =
            index.terms_of(item).into_iter().map(|t| t.term).collect();

        let tags = self
            .tags
            .iter()
            .map(|tag| item_terms.contains(&term::tag_term(tag)));
        let terms = self.terms.iter().map(|t| item_terms.contains(t));

        tags.chain(terms).map(|present| if present { 1.0 } else { 0.0 }).collect()
    }

    /// Builds the training matrix of labelled items.
    pub fn training_matrix(
        &self,
        index: &dyn TermIndex,
        labelled: &[(String, String)],
    ) -> Result<TrainingMatrix> {
        let rows: Vec<Vec<f64>> = labelled
            .iter()
            .map(|(item, _)| self.attributes(index, item))
            .collect();
        if rows.is_empty() {
            return Err(ApprecError::empty_input("no labelled items"));
        }
        TrainingMatrix::new(
            Matrix::from_rows(&rows)?,
            labelled.iter().map(|(_, label)| label.clone()).collect(),
        )
    }
}

/// Labels items by usage tier.
///
/// `ranked` must be ordered from most to least used. Items are split into
/// `labels.len()` equal consecutive chunks, the first chunk getting the first
/// label; items left over by the integer division get the last label.
pub fn usage_tiers(ranked: &[String], labels: &[String]) -> Result<Vec<(String, String)>> {
    let Some(last) = labels.last() else {
        return Err(ApprecError::empty_input("no labels to assign"));
    };
    let chunk = ranked.len() / labels.len();

    Ok(ranked
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let label = if chunk == 0 {
                last
            } else {
                labels.get(i / chunk).unwrap_or(last)
            };
            (item.clone(), label.clone())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{IndexedItem, MemoryTermIndex};

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_usage_tiers() {
        let items: Vec<String> = (0..7).map(|i| format!("p{i}")).collect();
        let tiers = usage_tiers(&items, &labels(&["NU", "U", "RU"])).unwrap();

        let assigned: Vec<&str> = tiers.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(assigned, ["NU", "NU", "U", "U", "RU", "RU", "RU"]);

        let few = usage_tiers(&items[..2], &labels(&["NU", "U", "RU"])).unwrap();
        assert!(few.iter().all(|(_, l)| l == "RU"));

        assert!(usage_tiers(&items, &[]).is_err());
    }

    #[test]
    fn test_vocabulary_and_attributes() {
        let index = MemoryTermIndex::from_items(vec![
            IndexedItem::new("vim")
                .with_term("XPvim", 1)
                .with_term("XTuse::editing", 1)
                .with_term("editor", 1),
            IndexedItem::new("gimp")
                .with_term("XPgimp", 1)
                .with_term("XTuse::editing", 1)
                .with_term("XTworks-with::image", 1)
                .with_term("image", 1),
        ])
        .unwrap();

        let items = labels(&["vim", "gimp"]);
        let vocabulary = Vocabulary::from_items(&index, &items, &[]);
        assert_eq!(vocabulary.tags(), ["use::editing", "works-with::image"]);
        assert_eq!(vocabulary.terms(), ["editor", "image"]);

        assert_eq!(vocabulary.attributes(&index, "vim"), vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(vocabulary.attributes(&index, "gimp"), vec![1.0, 1.0, 0.0, 1.0]);
        assert_eq!(vocabulary.attributes(&index, "unknown"), vec![0.0; 4]);

        let matrix = vocabulary
            .training_matrix(
                &index,
                &[
                    ("vim".to_string(), "U".to_string()),
                    ("gimp".to_string(), "RU".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(matrix.num_rows(), 2);
        assert_eq!(matrix.num_features(), 4);
        assert_eq!(matrix.labels(), ["U", "RU"]);
    }

    #[test]
    fn test_training_matrix_shape_checks() {
        assert!(TrainingMatrix::from_rows(&[vec![1.0]], ["a", "b"]).is_err());
        assert!(TrainingMatrix::new(Matrix::zeros(0, 3), Vec::new()).is_err());
    }
}
