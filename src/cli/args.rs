//! Command line argument parsing for the apprec CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// apprec - package recommendations from what you already have installed
#[derive(Parser, Debug, Clone)]
#[command(name = "apprec")]
#[command(about = "Content-based, collaborative and classifier-augmented package recommendations")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ApprecArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "APPREC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Term index (JSON Lines), overrides the configured path
    #[arg(long, value_name = "INDEX_FILE", global = true)]
    pub index: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ApprecArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recommend packages for a user profile
    Recommend(RecommendArgs),

    /// Train the Bayes classifier from package usage times
    Train(TrainArgs),

    /// Classify packages with a trained classifier
    Classify(ClassifyArgs),

    /// Run holdout evaluation of a strategy or of the classifier
    Evaluate(EvaluateArgs),

    /// Check a cluster dataset against its manifest
    #[command(name = "verify-clusters")]
    VerifyClusters(VerifyClustersArgs),
}

/// Arguments for recommending
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// User profile: one package per line, optionally followed by a score
    #[arg(value_name = "PROFILE_FILE")]
    pub profile: PathBuf,

    /// Strategy identifier (cb, cbt, knn, cb_knn, mlbva, ...)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Number of recommendations
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Explain each recommendation with similar owned packages
    #[arg(long)]
    pub because: bool,

    /// Package usage times for the time-weighted profile
    #[arg(long, value_name = "USAGE_FILE")]
    pub usage: Option<PathBuf>,

    /// Cluster dataset directory, overrides the configured path
    #[arg(long, value_name = "DIR")]
    pub clusters: Option<PathBuf>,

    /// Trained classifier, overrides the configured path
    #[arg(long, value_name = "MODEL_FILE")]
    pub model: Option<PathBuf>,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Package usage times: `<package> <modified secs> <accessed secs>` per line
    #[arg(value_name = "USAGE_FILE")]
    pub usage: PathBuf,

    /// Where to write the classifier, overrides the configured path
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for classifying
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Packages to classify
    #[arg(value_name = "PACKAGE", required = true)]
    pub packages: Vec<String>,

    /// Trained classifier, overrides the configured path
    #[arg(long, value_name = "MODEL_FILE")]
    pub model: Option<PathBuf>,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// User profile to evaluate a strategy on
    #[arg(value_name = "PROFILE_FILE", required_unless_present = "usage")]
    pub profile: Option<PathBuf>,

    /// Evaluate the classifier on usage-labelled packages instead
    #[arg(long, value_name = "USAGE_FILE", conflicts_with = "profile")]
    pub usage: Option<PathBuf>,

    /// Strategy identifier
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Number of rounds
    #[arg(short, long)]
    pub rounds: Option<usize>,

    /// Share of the items held out each round
    #[arg(short, long)]
    pub partition: Option<f64>,

    /// Seed for reproducible rounds
    #[arg(long)]
    pub seed: Option<u64>,

    /// Metrics (precision, recall, f_score[:beta], accuracy, mcc, coverage, ...)
    #[arg(short, long = "metric", value_name = "METRIC")]
    pub metrics: Vec<String>,

    /// Cluster dataset directory, overrides the configured path
    #[arg(long, value_name = "DIR")]
    pub clusters: Option<PathBuf>,

    /// Trained classifier, overrides the configured path
    #[arg(long, value_name = "MODEL_FILE")]
    pub model: Option<PathBuf>,
}

/// Arguments for dataset verification
#[derive(Parser, Debug, Clone)]
pub struct VerifyClustersArgs {
    /// Cluster dataset directory, defaults to the configured path
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
