//! User profiles.
//!
//! A [`UserProfile`] is the set of items a user owns, each with a score, plus
//! the demographic labels the user identifies with.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApprecError, Result};
use crate::index::TermIndex;

/// Demographic labels and the debtags they stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Demographic {
    Admin,
    Devel,
    Desktop,
    Art,
    Science,
}

impl Demographic {
    pub const ALL: [Demographic; 5] = [
        Demographic::Admin,
        Demographic::Devel,
        Demographic::Desktop,
        Demographic::Art,
        Demographic::Science,
    ];

    /// Tags associated with the label.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Demographic::Admin => &[
                "admin",
                "hardware",
                "mail",
                "protocol",
                "network",
                "security",
                "web",
                "interface::web",
            ],
            Demographic::Devel => &["devel", "role::devel-lib", "role::shared-lib"],
            Demographic::Desktop => &[
                "x11",
                "accessibility",
                "game",
                "junior",
                "office",
                "interface::x11",
            ],
            Demographic::Art => &["field::arts", "sound"],
            Demographic::Science => &[
                "science",
                "biology",
                "field::astronomy",
                "field::aviation",
                "field::biology",
                "field::chemistry",
                "field::eletronics",
                "field::finance",
                "field::geography",
                "field::geology",
                "field::linguistics",
                "field::mathematics",
                "field::medicine",
                "field::meteorology",
                "field::physics",
                "field::statistics",
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Demographic::Admin => "admin",
            Demographic::Devel => "devel",
            Demographic::Desktop => "desktop",
            Demographic::Art => "art",
            Demographic::Science => "science",
        }
    }
}

impl fmt::Display for Demographic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Demographic {
    type Err = ApprecError;

    fn from_str(s: &str) -> Result<Self> {
        Demographic::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ApprecError::parse(format!("unknown demographic label '{s}'")))
    }
}

/// Items owned by a user, each with a score.
///
/// Every profile gets a fresh `id` that tags the results computed for it.
/// Equality ignores the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    items: BTreeMap<String, f64>,
    demographics: BTreeSet<Demographic>,
}

impl PartialEq for UserProfile {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items && self.demographics == other.demographics
    }
}

impl UserProfile {
    /// Creates a profile where every item scores 1.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_scores(items.into_iter().map(|item| (item, 1.0)))
    }

    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        UserProfile {
            id: Uuid::new_v4(),
            items: scores.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            demographics: BTreeSet::from([Demographic::Desktop]),
        }
    }

    /// Reads a profile from a text file with one item per line, optionally
    /// followed by whitespace and a score. Blank lines and `#` comments are
    /// ignored.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut scores = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(name) = fields.next() else {
                continue;
            };
            let score = match fields.next() {
                Some(raw) => raw.parse::<f64>().map_err(|e| {
                    ApprecError::parse(format!("{}:{}: {e}", path.display(), line_no + 1))
                })?,
                None => 1.0,
            };
            scores.push((name.to_string(), score));
        }

        Ok(Self::from_scores(scores))
    }

    pub fn with_demographics<I: IntoIterator<Item = Demographic>>(mut self, labels: I) -> Self {
        self.demographics = labels.into_iter().collect();
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains_key(item)
    }

    /// Owned item names in lexical order.
    pub fn items(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub fn scores(&self) -> &BTreeMap<String, f64> {
        &self.items
    }

    pub fn score(&self, item: &str) -> Option<f64> {
        self.items.get(item).copied()
    }

    pub fn demographics(&self) -> &BTreeSet<Demographic> {
        &self.demographics
    }

    /// Union of the tags of every demographic label of the user.
    pub fn demographic_tags(&self) -> BTreeSet<&'static str> {
        self.demographics
            .iter()
            .flat_map(|d| d.tags().iter().copied())
            .collect()
    }

    /// Keeps only the items the index knows about.
    pub fn retain_indexed(&mut self, index: &dyn TermIndex) {
        let before = self.items.len();
        self.items.retain(|item, _| index.contains(item));
        let discarded = before - self.items.len();
        if discarded > 0 {
            info!("Discarded {discarded} profile items unknown to the index");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{IndexedItem, MemoryTermIndex};
    use tempfile::TempDir;

    #[test]
    fn test_default_demographic_is_desktop() {
        let profile = UserProfile::from_items(["vim", "gimp"]);
        assert_eq!(profile.len(), 2);
        assert!(profile.demographics().contains(&Demographic::Desktop));
        assert!(profile.demographic_tags().contains("office"));
        assert_eq!(profile.score("vim"), Some(1.0));
    }

    #[test]
    fn test_equality_ignores_id() {
        let first = UserProfile::from_items(["vim", "gimp"]);
        let second = UserProfile::from_items(["gimp", "vim"]);
        assert_ne!(first.id, second.id);
        assert_eq!(first, second);
        assert_ne!(first, second.clone().with_demographics([Demographic::Admin]));
    }

    #[test]
    fn test_demographic_union() {
        let profile = UserProfile::from_items(["vim"])
            .with_demographics([Demographic::Admin, Demographic::Art]);
        let tags = profile.demographic_tags();
        assert!(tags.contains("security"));
        assert!(tags.contains("sound"));
        assert!(!tags.contains("office"));
        assert_eq!(tags.len(), 10);
        assert_eq!("science".parse::<Demographic>().unwrap(), Demographic::Science);
        assert!("gaming".parse::<Demographic>().is_err());
    }

    #[test]
    fn test_load_profile_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.txt");
        std::fs::write(&path, "# owned\nvim\ngimp 3.5\n\n").unwrap();

        let profile = UserProfile::load(&path).unwrap();
        assert_eq!(profile.items(), vec!["gimp".to_string(), "vim".to_string()]);
        assert_eq!(profile.score("gimp"), Some(3.5));

        std::fs::write(&path, "vim high\n").unwrap();
        assert!(UserProfile::load(&path).is_err());
    }

    #[test]
    fn test_retain_indexed() {
        let index = MemoryTermIndex::from_items(vec![IndexedItem::new("vim")]).unwrap();
        let mut profile = UserProfile::from_items(["vim", "not-packaged"]);
        profile.retain_indexed(&index);
        assert_eq!(profile.items(), vec!["vim".to_string()]);
    }
}
