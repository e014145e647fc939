//! # apprec
//!
//! A package recommendation engine for software repositories.
//!
//! ## Features
//!
//! - Content-based strategies over tag and description term profiles
//! - Time-weighted profiles from package usage times
//! - Collaborative recommendation from a verified cluster dataset
//! - Hybrid strategies chaining content and collaborative stages
//! - Naive Bayes re-ranking by predicted usefulness
//! - Holdout evaluation with precision, recall, F-score, MCC and more

pub mod bayes;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod index;
pub mod profile;
pub mod recommender;
pub mod user;
pub mod util;

pub mod prelude {
    pub use crate::config::{AppConfig, EvaluationConfig, RecommenderConfig};
    pub use crate::error::{ApprecError, Result};
    pub use crate::index::TermIndex;
    pub use crate::recommender::{RecommendationResult, Recommender, StrategyKind};
    pub use crate::user::UserProfile;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
