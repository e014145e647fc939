//! Cluster centroids and package memberships.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::error::{ApprecError, Result};

/// Precomputed clustering of package-presence vectors.
///
/// The package universe is the ordered list of packages in the membership
/// table; every centroid has one coordinate per universe package.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel {
    centroids: Vec<Vec<f64>>,
    packages: Vec<String>,
    memberships: Vec<BTreeMap<usize, u32>>,
    positions: AHashMap<String, usize>,
}

impl ClusterModel {
    /// Builds a model, checking that every centroid spans the package
    /// universe and every package belongs to at least one existing cluster.
    pub fn new(
        centroids: Vec<Vec<f64>>,
        memberships: Vec<(String, BTreeMap<usize, u32>)>,
    ) -> Result<Self> {
        if centroids.is_empty() {
            return Err(ApprecError::empty_input("cluster model has no centroids"));
        }

        let dimension = memberships.len();
        for (i, centroid) in centroids.iter().enumerate() {
            if centroid.len() != dimension {
                return Err(ApprecError::parse(format!(
                    "centroid {i} has {} coordinates, expected {dimension}",
                    centroid.len()
                )));
            }
        }

        let mut packages = Vec::with_capacity(dimension);
        let mut positions = AHashMap::with_capacity(dimension);
        let mut table = Vec::with_capacity(dimension);

        for (package, clusters) in memberships {
            if clusters.is_empty() {
                return Err(ApprecError::parse(format!(
                    "package '{package}' belongs to no cluster"
                )));
            }
            if let Some(&cluster) = clusters.keys().find(|&&c| c >= centroids.len()) {
                return Err(ApprecError::parse(format!(
                    "package '{package}' refers to unknown cluster {cluster}"
                )));
            }
            if positions.insert(package.clone(), packages.len()).is_some() {
                return Err(ApprecError::parse(format!(
                    "package '{package}' listed twice"
                )));
            }
            packages.push(package);
            table.push(clusters);
        }

        Ok(ClusterModel {
            centroids,
            packages,
            memberships: table,
            positions,
        })
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn num_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Packages in universe order.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Position of a package in the universe.
    pub fn position(&self, package: &str) -> Option<usize> {
        self.positions.get(package).copied()
    }

    /// Cluster occurrence counts of a package.
    pub fn memberships(&self, package: &str) -> Option<&BTreeMap<usize, u32>> {
        self.position(package).map(|i| &self.memberships[i])
    }

    /// Packages present in `cluster`, in universe order, with their occurrence count.
    pub fn members(&self, cluster: usize) -> Vec<(&str, u32)> {
        self.packages
            .iter()
            .zip(&self.memberships)
            .filter_map(|(package, clusters)| {
                clusters.get(&cluster).map(|&count| (package.as_str(), count))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(package: &str, clusters: &[(usize, u32)]) -> (String, BTreeMap<usize, u32>) {
        (package.to_string(), clusters.iter().copied().collect())
    }

    #[test]
    fn test_members() {
        let model = ClusterModel::new(
            vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0]],
            vec![
                membership("vim", &[(0, 4)]),
                membership("emacs", &[(1, 2)]),
                membership("gimp", &[(0, 1), (1, 3)]),
            ],
        )
        .unwrap();

        assert_eq!(model.num_clusters(), 2);
        assert_eq!(model.position("gimp"), Some(2));
        assert_eq!(model.members(0), vec![("vim", 4), ("gimp", 1)]);
        assert_eq!(model.members(1), vec![("emacs", 2), ("gimp", 3)]);
        assert!(model.members(5).is_empty());
    }

    #[test]
    fn test_invalid_models() {
        // dimension mismatch
        assert!(ClusterModel::new(vec![vec![1.0]], vec![
            membership("vim", &[(0, 1)]),
            membership("gimp", &[(0, 1)]),
        ])
        .is_err());

        // unknown cluster
        assert!(ClusterModel::new(vec![vec![1.0]], vec![membership("vim", &[(3, 1)])]).is_err());

        // orphan package
        assert!(ClusterModel::new(vec![vec![1.0]], vec![membership("vim", &[])]).is_err());

        assert!(ClusterModel::new(Vec::new(), Vec::new()).is_err());
    }
}
