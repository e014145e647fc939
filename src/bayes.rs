//! Naive Bayes classification of items into usefulness tiers.

pub mod classifier;
pub mod model;
pub mod training;

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApprecError, Result};

pub use classifier::{BayesItemClassifier, ItemClassifier};
pub use model::BayesModel;
pub use training::{TrainingMatrix, Vocabulary, usage_tiers};

pub(crate) fn save_blob<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| ApprecError::serialization(e.to_string()))?;
    fs::write(path, bytes)?;
    Ok(())
}

pub(crate) fn load_blob<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let bytes = fs::read(path)?;
    let (value, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
        .map_err(|e| ApprecError::serialization(e.to_string()))?;
    Ok(value)
}
