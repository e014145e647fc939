//! Collaborative clustering.
//!
//! Users are represented by binary package-presence vectors. A precomputed,
//! checksummed dataset of cluster centroids and package memberships is loaded
//! once; [`locator::ClusterLocator`] then finds the cluster nearest to a user
//! and the packages that belong to it.

pub mod loader;
pub mod locator;
pub mod model;

pub use loader::load_dataset;
pub use locator::{ClusterLocator, ClusterMatch};
pub use model::ClusterModel;
