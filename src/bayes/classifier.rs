//! Item classifiers used by classifier-augmented strategies.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bayes::model::BayesModel;
use crate::bayes::training::Vocabulary;
use crate::bayes::{load_blob, save_blob};
use crate::error::{ApprecError, Result};
use crate::index::TermIndex;

/// Assigns a usefulness label to an item.
pub trait ItemClassifier {
    fn classify_item(&self, index: &dyn TermIndex, item: &str) -> Result<String>;
}

/// Bayes model paired with the vocabulary that defines its features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesItemClassifier {
    vocabulary: Vocabulary,
    model: BayesModel,
}

impl BayesItemClassifier {
    pub fn new(vocabulary: Vocabulary, model: BayesModel) -> Result<Self> {
        model.validate()?;
        if vocabulary.len() != model.num_features() {
            return Err(ApprecError::model_state(format!(
                "vocabulary has {} features, model has {}",
                vocabulary.len(),
                model.num_features()
            )));
        }
        Ok(BayesItemClassifier { vocabulary, model })
    }

    /// Trains on labelled items, building the vocabulary from them.
    pub fn train(
        index: &dyn TermIndex,
        labelled: &[(String, String)],
        label_space: &[String],
        valid_tags: &[String],
    ) -> Result<Self> {
        let items: Vec<String> = labelled.iter().map(|(item, _)| item.clone()).collect();
        let vocabulary = Vocabulary::from_items(index, &items, valid_tags);
        let training = vocabulary.training_matrix(index, labelled)?;
        let model = BayesModel::train(&training, label_space)?;
        Self::new(vocabulary, model)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn model(&self) -> &BayesModel {
        &self.model
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_blob(self, path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let stored: BayesItemClassifier = load_blob(path)?;
        Self::new(stored.vocabulary, stored.model)
    }
}

impl ItemClassifier for BayesItemClassifier {
    fn classify_item(&self, index: &dyn TermIndex, item: &str) -> Result<String> {
        let attributes = self.vocabulary.attributes(index, item);
        self.model.classify(&attributes).map(str::to_string)
    }
}
