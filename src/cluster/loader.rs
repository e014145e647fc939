//! Checksummed cluster dataset loader.
//!
//! A dataset directory holds:
//!
//! - `clusters.txt`: one centroid per line, `;`-separated floats;
//! - `pkgs_clusters.txt`: one package per line as `<package>-<c>:<n>;<c>:<n>…`,
//!   where the package name is everything before the last `-`;
//! - `InRelease`: `sha256sum`-style `<hex digest>  <file name>` lines.
//!
//! The `*.txt` files of the directory and the `*.txt` entries of the manifest
//! must match exactly before anything is parsed.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::{debug, info};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::cluster::model::ClusterModel;
use crate::error::{ApprecError, Result};

pub const CLUSTERS_FILE: &str = "clusters.txt";
pub const MEMBERSHIPS_FILE: &str = "pkgs_clusters.txt";
pub const MANIFEST_FILE: &str = "InRelease";

/// Verifies and loads a cluster dataset.
pub fn load_dataset<P: AsRef<Path>>(dir: P) -> Result<ClusterModel> {
    let dir = dir.as_ref();
    verify_dataset(dir)?;

    let centroids = parse_centroids(&fs::read_to_string(dir.join(CLUSTERS_FILE))?)?;
    let memberships = parse_memberships(&fs::read_to_string(dir.join(MEMBERSHIPS_FILE))?)?;
    let model = ClusterModel::new(centroids, memberships)?;

    info!(
        "Loaded {} clusters over {} packages from {}",
        model.num_clusters(),
        model.packages().len(),
        dir.display()
    );
    Ok(model)
}

/// SHA-256 hex digest of a byte string.
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Digests of every `*.txt` file in `dir`, keyed by file name.
fn dataset_digests(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut digests = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_file() && name.ends_with(".txt") {
            let digest = sha256_hex(&fs::read(entry.path())?);
            digests.insert(name, digest);
        }
    }
    Ok(digests)
}

/// Parses the `*.txt` entries of a manifest.
fn manifest_digests(manifest: &str) -> Result<BTreeMap<String, String>> {
    let line_re = Regex::new(r"^([0-9a-fA-F]{64})\s+\*?(\S+\.txt)\s*$")
        .map_err(|e| ApprecError::other(e.to_string()))?;

    Ok(manifest
        .lines()
        .filter_map(|line| line_re.captures(line.trim()))
        .map(|caps| (caps[2].to_string(), caps[1].to_lowercase()))
        .collect())
}

/// Checks the dataset files against the manifest.
pub fn verify_dataset<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    let manifest = fs::read_to_string(dir.join(MANIFEST_FILE))?;

    let expected = manifest_digests(&manifest)?;
    let actual = dataset_digests(dir)?;

    if expected.is_empty() {
        return Err(ApprecError::data_integrity(format!(
            "{} lists no dataset files",
            dir.join(MANIFEST_FILE).display()
        )));
    }

    for required in [CLUSTERS_FILE, MEMBERSHIPS_FILE] {
        if !actual.contains_key(required) {
            return Err(ApprecError::data_integrity(format!(
                "{required} missing from {}",
                dir.display()
            )));
        }
    }

    if expected != actual {
        let mismatched: BTreeSet<&str> = expected
            .keys()
            .chain(actual.keys())
            .filter(|name| expected.get(*name) != actual.get(*name))
            .map(String::as_str)
            .collect();
        return Err(ApprecError::data_integrity(format!(
            "sha256 mismatch in {}: {}",
            dir.display(),
            mismatched.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }

    debug!("Verified {} dataset files in {}", actual.len(), dir.display());
    Ok(())
}

/// Writes an `InRelease` manifest covering the `*.txt` files of `dir`.
pub fn write_manifest<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    let manifest: String = dataset_digests(dir)?
        .into_iter()
        .map(|(name, digest)| format!("{digest}  {name}\n"))
        .collect();
    fs::write(dir.join(MANIFEST_FILE), manifest)?;
    Ok(())
}

pub fn parse_centroids(content: &str) -> Result<Vec<Vec<f64>>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_no, line)| {
            line.trim()
                .split(';')
                .map(|value| {
                    value.trim().parse::<f64>().map_err(|e| {
                        ApprecError::parse(format!("{CLUSTERS_FILE}:{}: {e}", line_no + 1))
                    })
                })
                .collect()
        })
        .collect()
}

pub fn parse_memberships(content: &str) -> Result<Vec<(String, BTreeMap<usize, u32>)>> {
    let mut memberships = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bad_line = |detail: &str| {
            ApprecError::parse(format!("{MEMBERSHIPS_FILE}:{}: {detail}", line_no + 1))
        };

        let (package, clusters) = line
            .rsplit_once('-')
            .ok_or_else(|| bad_line("missing '-' separator"))?;

        let mut table = BTreeMap::new();
        for pair in clusters.split(';') {
            let (cluster, times) = pair
                .split_once(':')
                .ok_or_else(|| bad_line("expected <cluster>:<count>"))?;
            let cluster = cluster
                .trim()
                .parse::<usize>()
                .map_err(|e| bad_line(&e.to_string()))?;
            let times = times
                .trim()
                .parse::<u32>()
                .map_err(|e| bad_line(&e.to_string()))?;
            table.insert(cluster, times);
        }

        memberships.push((package.to_string(), table));
    }

    Ok(memberships)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_dataset(dir: &Path) {
        fs::write(dir.join(CLUSTERS_FILE), "1;0;1\n0;1;0.5\n").unwrap();
        fs::write(dir.join(MEMBERSHIPS_FILE), "vim-0:3\ngtk-doc-1:2\nlibreoffice-0:1;1:4\n")
            .unwrap();
        write_manifest(dir).unwrap();
    }

    #[test]
    fn test_parse_memberships_uses_last_dash() {
        let parsed = parse_memberships("gtk-doc-tools-1:2;3:4\n").unwrap();
        assert_eq!(parsed[0].0, "gtk-doc-tools");
        assert_eq!(parsed[0].1, BTreeMap::from([(1, 2), (3, 4)]));

        assert!(parse_memberships("vim\n").is_err());
        assert!(parse_memberships("vim-0\n").is_err());
        assert!(parse_memberships("vim-x:1\n").is_err());
    }

    #[test]
    fn test_parse_centroids() {
        let parsed = parse_centroids("1;0;0.25\n\n0;1;1\n").unwrap();
        assert_eq!(parsed, vec![vec![1.0, 0.0, 0.25], vec![0.0, 1.0, 1.0]]);
        assert!(parse_centroids("1;a\n").is_err());
    }

    #[test]
    fn test_load_verified_dataset() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());

        let model = load_dataset(dir.path()).unwrap();
        assert_eq!(model.num_clusters(), 2);
        assert_eq!(model.packages(), ["vim", "gtk-doc", "libreoffice"]);
    }

    #[test]
    fn test_tampered_file_fails_integrity_check() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());
        fs::write(dir.path().join(CLUSTERS_FILE), "1;1;1\n0;1;0.5\n").unwrap();

        match load_dataset(dir.path()) {
            Err(ApprecError::DataIntegrity(msg)) => assert!(msg.contains(CLUSTERS_FILE)),
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_unlisted_file_fails_integrity_check() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());
        fs::write(dir.path().join("extra.txt"), "x").unwrap();

        assert!(matches!(
            verify_dataset(dir.path()),
            Err(ApprecError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CLUSTERS_FILE), "1\n").unwrap();
        assert!(matches!(verify_dataset(dir.path()), Err(ApprecError::Io(_))));

        fs::write(dir.path().join(MANIFEST_FILE), "not a manifest\n").unwrap();
        assert!(matches!(
            verify_dataset(dir.path()),
            Err(ApprecError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
