//! Command implementations for the apprec CLI.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use log::{info, warn};

use crate::bayes::{BayesItemClassifier, ItemClassifier, usage_tiers};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::cluster::{ClusterModel, load_dataset};
use crate::config::{AppConfig, RecommenderConfig};
use crate::error::{ApprecError, Result};
use crate::evaluation::{CrossValidation, MetricKind};
use crate::index::TermIndex;
use crate::index::memory::MemoryTermIndex;
use crate::profile::time::{UsageTimeDecay, load_usage_file};
use crate::recommender::{ClassifierSource, Recommender, StrategyKind};
use crate::user::UserProfile;

/// Execute a CLI command.
pub fn execute_command(args: ApprecArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Recommend(rec_args) => recommend(rec_args, &config, &args),
        Command::Train(train_args) => train(train_args, &config, &args),
        Command::Classify(classify_args) => classify(classify_args, &config, &args),
        Command::Evaluate(eval_args) => evaluate(eval_args, &config, &args),
        Command::VerifyClusters(verify_args) => verify_clusters(verify_args, &config, &args),
    }
}

fn load_config(args: &ApprecArgs) -> Result<AppConfig> {
    match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            let config = AppConfig::from_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?;
            Ok(config)
        }
        None => Ok(AppConfig::default()),
    }
}

fn load_index(args: &ApprecArgs, config: &AppConfig) -> Result<MemoryTermIndex> {
    let path = args.index.as_ref().unwrap_or(&config.paths.index);
    let index = MemoryTermIndex::load_jsonl(path)
        .with_context(|| format!("loading term index {}", path.display()))?;
    info!("Loaded {} items from {}", index.corpus_size(), path.display());
    Ok(index)
}

/// Data a strategy may need besides the term index.
#[derive(Default)]
struct Collaborators {
    clusters: Option<ClusterModel>,
    bayes: Option<BayesItemClassifier>,
    decay: Option<UsageTimeDecay>,
}

impl Collaborators {
    /// Loads what `strategy` needs.
    fn load(
        strategy: &str,
        clusters_dir: &Path,
        model_path: &Path,
        usage: Option<&Path>,
    ) -> Result<Self> {
        let mut collaborators = Collaborators::default();

        match StrategyKind::lookup(strategy) {
            Some(StrategyKind::Collaborative) | Some(StrategyKind::Hybrid(_)) => {
                let clusters = load_dataset(clusters_dir).with_context(|| {
                    format!("loading cluster dataset {}", clusters_dir.display())
                })?;
                collaborators.clusters = Some(clusters);
            }
            Some(StrategyKind::MachineLearning {
                classifier: ClassifierSource::Bayes,
                ..
            }) => {
                collaborators.bayes = Some(load_classifier(model_path)?);
            }
            Some(StrategyKind::MachineLearning {
                classifier: ClassifierSource::Vector,
                ..
            }) => {
                warn!("No vector classifier is available to strategy {strategy}");
            }
            _ => {}
        }

        if let Some(path) = usage {
            let usage = load_usage_file(path)?;
            collaborators.decay = Some(UsageTimeDecay::new(usage, Utc::now()));
        }
        Ok(collaborators)
    }

    fn recommender<'a>(
        &'a self,
        config: RecommenderConfig,
        index: &'a dyn TermIndex,
    ) -> Recommender<'a> {
        let mut recommender = Recommender::new(config, index);
        if let Some(clusters) = &self.clusters {
            recommender = recommender.with_clusters(clusters);
        }
        if let Some(bayes) = &self.bayes {
            recommender = recommender.with_bayes(bayes);
        }
        if let Some(decay) = &self.decay {
            recommender = recommender.with_decay(decay);
        }
        recommender
    }
}

fn load_classifier(path: &Path) -> Result<BayesItemClassifier> {
    let classifier = BayesItemClassifier::load(path)
        .with_context(|| format!("loading classifier model {}", path.display()))?;
    Ok(classifier)
}

fn load_user(path: &Path, index: &dyn TermIndex) -> Result<UserProfile> {
    let mut user = UserProfile::load(path)?;
    user.retain_indexed(index);
    if user.is_empty() {
        warn!("No package of {} is known to the index", path.display());
    }
    Ok(user)
}

/// Labels the indexed packages of a usage file by usage tier.
fn labelled_by_usage(
    index: &dyn TermIndex,
    usage_path: &Path,
    labels: &[String],
) -> Result<Vec<(String, String)>> {
    let decay = UsageTimeDecay::new(load_usage_file(usage_path)?, Utc::now());
    let ranked: Vec<String> = decay
        .ranked_packages()
        .into_iter()
        .map(|(package, _)| package)
        .filter(|package| index.contains(package))
        .collect();
    if ranked.is_empty() {
        return Err(ApprecError::empty_input(format!(
            "no package of {} is known to the index",
            usage_path.display()
        )));
    }

    // most used packages get the most useful label
    let tier_order: Vec<String> = labels.iter().rev().cloned().collect();
    usage_tiers(&ranked, &tier_order)
}

/// Recommend packages for a user profile.
fn recommend(args: &RecommendArgs, config: &AppConfig, cli_args: &ApprecArgs) -> Result<()> {
    let mut rec_config = config.recommender.clone();
    if let Some(strategy) = &args.strategy {
        rec_config.strategy = strategy.clone();
    }
    rec_config.because |= args.because;
    let size = args.size.unwrap_or(rec_config.num_recommendations);

    let index = load_index(cli_args, config)?;
    let user = load_user(&args.profile, &index)?;
    let collaborators = Collaborators::load(
        &rec_config.strategy,
        args.clusters.as_ref().unwrap_or(&config.paths.clusters),
        args.model.as_ref().unwrap_or(&config.paths.model),
        args.usage.as_deref(),
    )?;

    let strategy = rec_config.strategy.clone();
    let recommender = collaborators.recommender(rec_config, &index);
    let result = recommender.recommend(&strategy, &user, size)?;

    output_result(
        &format!("Recommendations ({strategy}) for {}", args.profile.display()),
        &result,
        cli_args,
    )
}

/// Train the Bayes classifier on usage tiers.
fn train(args: &TrainArgs, config: &AppConfig, cli_args: &ApprecArgs) -> Result<()> {
    let index = load_index(cli_args, config)?;
    let labels = &config.recommender.labels;
    let labelled = labelled_by_usage(&index, &args.usage, labels)?;

    let classifier = BayesItemClassifier::train(
        &index,
        &labelled,
        labels,
        &config.recommender.valid_tags,
    )?;

    let output: &PathBuf = args.output.as_ref().unwrap_or(&config.paths.model);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    classifier.save(output)?;

    output_result(
        "Classifier trained",
        &TrainingSummary {
            model_path: output.display().to_string(),
            items: labelled.len(),
            labels: classifier.model().labels().to_vec(),
            tags: classifier.vocabulary().tags().len(),
            terms: classifier.vocabulary().terms().len(),
        },
        cli_args,
    )
}

/// Classify packages with a trained classifier.
fn classify(args: &ClassifyArgs, config: &AppConfig, cli_args: &ApprecArgs) -> Result<()> {
    let index = load_index(cli_args, config)?;
    let classifier = load_classifier(args.model.as_ref().unwrap_or(&config.paths.model))?;

    let mut classifications = Vec::with_capacity(args.packages.len());
    for package in &args.packages {
        if !index.contains(package) {
            return Err(ApprecError::not_found(format!("package '{package}'")));
        }
        classifications.push(Classification {
            package: package.clone(),
            label: classifier.classify_item(&index, package)?,
        });
    }

    output_result(
        "Classifications",
        &ClassificationResults { classifications },
        cli_args,
    )
}

/// Run holdout evaluation.
fn evaluate(args: &EvaluateArgs, config: &AppConfig, cli_args: &ApprecArgs) -> Result<()> {
    let mut eval_config = config.evaluation.clone();
    if let Some(rounds) = args.rounds {
        eval_config.rounds = rounds;
    }
    if let Some(partition) = args.partition {
        eval_config.partition_proportion = partition;
    }
    if args.seed.is_some() {
        eval_config.seed = args.seed;
    }
    if !args.metrics.is_empty() {
        eval_config.metrics = args
            .metrics
            .iter()
            .map(|m| m.parse::<MetricKind>())
            .collect::<Result<Vec<_>>>()?;
    }
    let cross_validation = CrossValidation::new(eval_config)?;
    let index = load_index(cli_args, config)?;

    let report = match (&args.usage, &args.profile) {
        (Some(usage), _) => {
            let labels = &config.recommender.labels;
            let valid_tags = &config.recommender.valid_tags;
            let labelled = labelled_by_usage(&index, usage, labels)?;
            cross_validation.run_classifier("bayes", &index, &labelled, labels, |train| {
                BayesItemClassifier::train(&index, train, labels, valid_tags)
            })?
        }
        (None, Some(profile)) => {
            let mut rec_config = config.recommender.clone();
            if let Some(strategy) = &args.strategy {
                rec_config.strategy = strategy.clone();
            }
            let user = load_user(profile, &index)?;
            let collaborators = Collaborators::load(
                &rec_config.strategy,
                args.clusters.as_ref().unwrap_or(&config.paths.clusters),
                args.model.as_ref().unwrap_or(&config.paths.model),
                None,
            )?;
            let recommender = collaborators.recommender(rec_config, &index);
            cross_validation.run_recommender(&recommender, &user)?
        }
        (None, None) => {
            return Err(ApprecError::invalid_argument(
                "evaluate needs a profile file or --usage",
            ));
        }
    };

    output_result("Evaluation report", &report, cli_args)
}

/// Verify and load a cluster dataset.
fn verify_clusters(
    args: &VerifyClustersArgs,
    config: &AppConfig,
    cli_args: &ApprecArgs,
) -> Result<()> {
    let dir = args.dir.as_ref().unwrap_or(&config.paths.clusters);
    let model = load_dataset(dir)
        .with_context(|| format!("verifying cluster dataset {}", dir.display()))?;

    output_result(
        "Cluster dataset verified",
        &VerificationSummary {
            dir: dir.display().to_string(),
            clusters: model.num_clusters(),
            packages: model.packages().len(),
        },
        cli_args,
    )
}
