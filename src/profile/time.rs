//! Time-based term weights.
//!
//! A package that keeps being used long after it was installed is a stronger
//! signal than one that was installed and forgotten. [`UsageTimeDecay`] turns
//! install and access times into per-package ratings and rates a term by the
//! packages that carry it.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApprecError, Result};

/// Number of package ratings averaged per term.
const RATINGS_PER_TERM: usize = 5;

/// Step used to pad short rating lists.
const PADDING_STEP: f64 = 0.2;

/// Source of time-based weights for profile terms.
pub trait TermDecay {
    /// Weight of `term`, given the owned packages that carry it.
    fn term_weight(&self, term: &str, packages: &[String]) -> f64;
}

/// Install (modification) and last access time of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageUsage {
    pub package: String,
    pub modified: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
}

/// Time decay derived from package usage records.
#[derive(Debug, Clone, Default)]
pub struct UsageTimeDecay {
    percents: AHashMap<String, f64>,
}

impl UsageTimeDecay {
    /// Rates every package relative to `now`.
    pub fn new<I: IntoIterator<Item = PackageUsage>>(usage: I, now: DateTime<Utc>) -> Self {
        let percents = usage
            .into_iter()
            .map(|u| {
                let percent = usage_percent(&u, now);
                (u.package, percent)
            })
            .collect();
        UsageTimeDecay { percents }
    }

    /// Share of the package's installed lifetime during which it was still used.
    pub fn usage_percent(&self, package: &str) -> Option<f64> {
        self.percents.get(package).copied()
    }

    /// Rating of one package, 0 for unknown packages.
    pub fn rating(&self, package: &str) -> f64 {
        self.usage_percent(package).map_or(0.0, decay_curve)
    }

    /// Known packages ordered by usage percent, most used first.
    pub fn ranked_packages(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .percents
            .iter()
            .map(|(package, &percent)| (package.clone(), percent))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    pub fn len(&self) -> usize {
        self.percents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.percents.is_empty()
    }
}

impl TermDecay for UsageTimeDecay {
    fn term_weight(&self, _term: &str, packages: &[String]) -> f64 {
        let mut ratings: Vec<f64> = packages.iter().map(|p| self.rating(p)).collect();
        if ratings.is_empty() {
            return 0.0;
        }
        ratings.sort_by(|a, b| b.total_cmp(a));

        while ratings.len() < RATINGS_PER_TERM {
            let last = ratings[ratings.len() - 1];
            ratings.push(last - PADDING_STEP);
        }

        ratings.iter().take(RATINGS_PER_TERM).sum::<f64>() / RATINGS_PER_TERM as f64
    }
}

fn usage_percent(usage: &PackageUsage, now: DateTime<Utc>) -> f64 {
    let lifetime = (now - usage.modified).num_seconds() as f64;
    if lifetime <= 0.0 {
        return 0.0;
    }
    let used = (usage.accessed - usage.modified).num_seconds() as f64;
    used / lifetime
}

/// Maps a usage percent to a rating in `(0, 10]`; unused packages rate 0.
pub fn decay_curve(percent: f64) -> f64 {
    if percent == 0.0 {
        0.0
    } else {
        10.0 * (-(1.0 - percent)).exp()
    }
}

/// Reads usage records, one `<package> <modified> <accessed>` line each, with
/// both times in Unix seconds.
pub fn load_usage_file<P: AsRef<Path>>(path: P) -> Result<Vec<PackageUsage>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mut records = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bad_line = || ApprecError::parse(format!("{}:{}: {line}", path.display(), line_no + 1));

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [package, modified, accessed] = fields[..] else {
            return Err(bad_line());
        };
        let timestamp = |raw: &str| {
            raw.parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(bad_line)
        };

        records.push(PackageUsage {
            package: package.to_string(),
            modified: timestamp(modified)?,
            accessed: timestamp(accessed)?,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn usage(package: &str, now: DateTime<Utc>, installed_days: i64, used_days: i64) -> PackageUsage {
        let modified = now - Duration::days(installed_days);
        PackageUsage {
            package: package.to_string(),
            modified,
            accessed: modified + Duration::days(used_days),
        }
    }

    #[test]
    fn test_usage_percent_and_curve() {
        let now = Utc::now();
        let decay = UsageTimeDecay::new(
            vec![usage("vim", now, 10, 10), usage("gimp", now, 10, 5), usage("xterm", now, 10, 0)],
            now,
        );

        assert!((decay.usage_percent("vim").unwrap() - 1.0).abs() < 1e-9);
        assert!((decay.usage_percent("gimp").unwrap() - 0.5).abs() < 1e-9);
        assert!((decay.rating("vim") - 10.0).abs() < 1e-6);
        assert!((decay.rating("gimp") - 10.0 * (-0.5f64).exp()).abs() < 1e-6);
        assert_eq!(decay.rating("xterm"), 0.0);
        assert_eq!(decay.rating("unknown"), 0.0);

        let ranked = decay.ranked_packages();
        assert_eq!(ranked[0].0, "vim");
        assert_eq!(ranked[2].0, "xterm");
    }

    #[test]
    fn test_term_weight_pads_to_five() {
        let now = Utc::now();
        let decay = UsageTimeDecay::new(vec![usage("vim", now, 10, 10)], now);

        // 10, 9.8, 9.6, 9.4, 9.2
        let weight = decay.term_weight("editor", &["vim".to_string()]);
        assert!((weight - 9.6).abs() < 1e-6);
        assert_eq!(decay.term_weight("editor", &[]), 0.0);
    }

    #[test]
    fn test_term_weight_uses_top_five() {
        let now = Utc::now();
        let records: Vec<PackageUsage> = (0..7)
            .map(|i| usage(&format!("p{i}"), now, 10, 10 - i))
            .collect();
        let packages: Vec<String> = records.iter().map(|r| r.package.clone()).collect();
        let decay = UsageTimeDecay::new(records, now);

        let expected: f64 = (0..5).map(|i| decay.rating(&format!("p{i}"))).sum::<f64>() / 5.0;
        assert!((decay.term_weight("t", &packages) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_load_usage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usage.txt");
        std::fs::write(&path, "vim 1000 5000\n# comment\ngimp 2000 2000\n").unwrap();

        let records = load_usage_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].package, "vim");
        assert_eq!(records[0].accessed.timestamp(), 5000);

        std::fs::write(&path, "vim 1000\n").unwrap();
        assert!(load_usage_file(&path).is_err());
    }
}
