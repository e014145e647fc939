use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use clap::Parser;

use apprec::cli::{ApprecArgs, execute_command};
use apprec::cluster::loader::{CLUSTERS_FILE, MEMBERSHIPS_FILE, write_manifest};
use apprec::config::AppConfig;
use apprec::index::memory::{IndexedItem, MemoryTermIndex};

use tempfile::tempdir;

fn write_index(path: &Path) {
    let mut items = Vec::new();
    for i in 0..3 {
        items.push(IndexedItem::new(format!("editor{i}")).with_term("XTuse::editing", 1));
        items.push(IndexedItem::new(format!("viewer{i}")).with_term("XTuse::viewing", 1));
        items.push(IndexedItem::new(format!("game{i}")).with_term("XTgame::toys", 1));
    }
    MemoryTermIndex::from_items(items)
        .unwrap()
        .save_jsonl(path)
        .unwrap();
}

fn write_usage(path: &Path) {
    let modified = Utc::now() - Duration::days(30);
    let mut lines = String::new();
    for i in 0..3 {
        for (name, days) in [("editor", 29), ("viewer", 15), ("game", 1)] {
            let accessed = modified + Duration::days(days);
            lines.push_str(&format!(
                "{name}{i} {} {}\n",
                modified.timestamp(),
                accessed.timestamp()
            ));
        }
    }
    fs::write(path, lines).unwrap();
}

fn run(args: &[&str]) -> apprec::error::Result<()> {
    let mut argv = vec!["apprec", "-q"];
    argv.extend_from_slice(args);
    execute_command(ApprecArgs::parse_from(argv))
}

#[test]
fn test_train_then_classify() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index.jsonl");
    let usage = dir.path().join("usage.txt");
    let model = dir.path().join("models").join("bayes.bin");
    write_index(&index);
    write_usage(&usage);

    let index_arg = index.to_str().unwrap();
    let model_arg = model.to_str().unwrap();

    run(&[
        "--index",
        index_arg,
        "train",
        usage.to_str().unwrap(),
        "-o",
        model_arg,
    ])
    .unwrap();
    assert!(model.exists());

    run(&["--format", "json", "--index", index_arg, "classify", "editor1", "--model", model_arg])
        .unwrap();
    assert!(run(&["--index", index_arg, "classify", "nosuchpkg", "--model", model_arg]).is_err());
}

#[test]
fn test_recommend_with_configuration_file() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index.jsonl");
    write_index(&index);

    let mut config = AppConfig::default();
    config.paths.index = index.clone();
    config.recommender.strategy = "cbt".to_string();
    let config_path = dir.path().join("apprec.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let profile = dir.path().join("profile.txt");
    fs::write(&profile, "editor0\n").unwrap();

    run(&["-c", config_path.to_str().unwrap(), "recommend", profile.to_str().unwrap(), "--because"])
        .unwrap();

    // collaborative strategies need the cluster dataset
    let missing = dir.path().join("no-clusters");
    assert!(
        run(&[
            "-c",
            config_path.to_str().unwrap(),
            "recommend",
            profile.to_str().unwrap(),
            "-s",
            "knn",
            "--clusters",
            missing.to_str().unwrap(),
        ])
        .is_err()
    );
}

#[test]
fn test_verify_clusters() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(CLUSTERS_FILE), "1;0\n0;1\n").unwrap();
    fs::write(dir.path().join(MEMBERSHIPS_FILE), "vim-0:2\ngimp-1:3\n").unwrap();
    write_manifest(dir.path()).unwrap();

    run(&["verify-clusters", dir.path().to_str().unwrap()]).unwrap();

    fs::write(dir.path().join(CLUSTERS_FILE), "1;0\n0;0.5\n").unwrap();
    assert!(run(&["verify-clusters", dir.path().to_str().unwrap()]).is_err());
}

#[test]
fn test_evaluate_recommender() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index.jsonl");
    write_index(&index);
    let profile = dir.path().join("profile.txt");
    fs::write(&profile, "editor0\neditor1\neditor2\n").unwrap();

    // nine items recommend nothing at the default result proportion
    let mut config = AppConfig::default();
    config.evaluation.result_proportion = 0.5;
    let config_path = dir.path().join("apprec.json");
    fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();
    assert!(
        run(&["--index", index.to_str().unwrap(), "evaluate", profile.to_str().unwrap(), "-s", "cbt"])
            .is_err()
    );

    run(&[
        "-c",
        config_path.to_str().unwrap(),
        "--index",
        index.to_str().unwrap(),
        "evaluate",
        profile.to_str().unwrap(),
        "-s",
        "cbt",
        "--partition",
        "0.4",
        "--seed",
        "3",
        "-m",
        "precision",
        "-m",
        "f_score:0.5",
    ])
    .unwrap();

    assert!(
        run(&[
            "--index",
            index.to_str().unwrap(),
            "evaluate",
            profile.to_str().unwrap(),
            "-m",
            "nonsense",
        ])
        .is_err()
    );
}

#[test]
fn test_load_errors_name_the_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.jsonl");
    let model = dir.path().join("missing.bin");
    write_index(&dir.path().join("index.jsonl"));

    let error = run(&["--index", missing.to_str().unwrap(), "classify", "editor0"]).unwrap_err();
    let message = error.to_string();
    assert!(message.starts_with("loading term index"), "{message}");
    assert!(message.contains("missing.jsonl"), "{message}");

    let index = dir.path().join("index.jsonl");
    let error = run(&[
        "--index",
        index.to_str().unwrap(),
        "classify",
        "editor0",
        "--model",
        model.to_str().unwrap(),
    ])
    .unwrap_err();
    assert!(error.to_string().starts_with("loading classifier model"), "{error}");
}
