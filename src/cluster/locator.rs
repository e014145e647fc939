//! Nearest-cluster lookup.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cluster::model::ClusterModel;
use crate::error::{ApprecError, Result};

/// The cluster closest to a user and the packages that belong to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMatch {
    pub cluster: usize,
    pub distance: f64,
    /// Co-cluster packages with their occurrence count, in universe order.
    pub members: Vec<(String, u32)>,
}

/// Locates users among precomputed clusters.
#[derive(Debug, Clone, Copy)]
pub struct ClusterLocator<'a> {
    model: &'a ClusterModel,
}

impl<'a> ClusterLocator<'a> {
    pub fn new(model: &'a ClusterModel) -> Self {
        ClusterLocator { model }
    }

    /// Binary presence vector of `owned` over the package universe.
    pub fn user_vector(&self, owned: &[String]) -> Vec<f64> {
        let mut vector = vec![0.0; self.model.packages().len()];
        for item in owned {
            if let Some(i) = self.model.position(item) {
                vector[i] = 1.0;
            }
        }
        vector
    }

    /// Index and distance of the centroid nearest to `vector`. Ties go to
    /// the lowest index.
    pub fn nearest(&self, vector: &[f64]) -> Result<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, centroid) in self.model.centroids().iter().enumerate() {
            if centroid.len() != vector.len() {
                return Err(ApprecError::invalid_argument(format!(
                    "vector has {} coordinates, centroids have {}",
                    vector.len(),
                    centroid.len()
                )));
            }
            let distance = euclidean_distance(centroid, vector);
            if distance.is_nan() {
                return Err(ApprecError::numeric(format!("distance to cluster {i} is NaN")));
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        best.ok_or_else(|| ApprecError::empty_input("cluster model has no centroids"))
    }

    /// Finds the cluster nearest to the owned items and its members.
    pub fn locate(&self, owned: &[String]) -> Result<ClusterMatch> {
        let vector = self.user_vector(owned);
        let (cluster, distance) = self.nearest(&vector)?;
        let members: Vec<(String, u32)> = self
            .model
            .members(cluster)
            .into_iter()
            .map(|(package, count)| (package.to_string(), count))
            .collect();

        debug!(
            "User located in cluster {cluster} (distance {distance:.3}, {} members)",
            members.len()
        );

        Ok(ClusterMatch {
            cluster,
            distance,
            members,
        })
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
