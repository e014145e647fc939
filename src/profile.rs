//! Content profiles.
//!
//! A [`ContentProfile`] is the ordered list of terms that best describe the
//! items a user owns. [`TermProfileBuilder`] ranks candidate terms either by
//! TF-IDF over the owned items or by relevance expansion against the whole
//! corpus, then removes stem duplicates.
//!
//! # Examples
//!
//! ```
//! use apprec::index::filter::TagFilter;
//! use apprec::index::memory::{IndexedItem, MemoryTermIndex};
//! use apprec::profile::{ProfileMode, TermProfileBuilder};
//!
//! let index = MemoryTermIndex::from_items(vec![
//!     IndexedItem::new("vim").with_term("XTuse::editing", 1),
//!     IndexedItem::new("mutt").with_term("XTworks-with::mail", 1),
//! ])
//! .unwrap();
//!
//! let builder = TermProfileBuilder::new(&index);
//! let profile = builder
//!     .build(&["vim".to_string()], 5, &TagFilter::new(), ProfileMode::TfIdf, false)
//!     .unwrap();
//! assert_eq!(profile.terms(), ["XTuse::editing"]);
//! ```

pub mod dedup;
pub mod tfidf;
pub mod time;

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ApprecError, Result};
use crate::index::TermIndex;
use crate::index::filter::{Combine, DescriptionFilter, TagFilter, TermFilter};
use crate::profile::dedup::deduplicate_stems;
use crate::profile::tfidf::rank_terms;
use crate::profile::time::TermDecay;

/// How candidate terms are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMode {
    /// Sublinear TF-IDF over the owned items.
    TfIdf,
    /// Relevance expansion of the owned items against the corpus.
    Expansion,
}

/// Which terms a content profile is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Tag,
    Desc,
    Mix,
    Half,
    Time,
    TagEset,
    DescEset,
    MixEset,
    HalfEset,
}

impl ContentKind {
    pub const ALL: [ContentKind; 9] = [
        ContentKind::Tag,
        ContentKind::Desc,
        ContentKind::Mix,
        ContentKind::Half,
        ContentKind::Time,
        ContentKind::TagEset,
        ContentKind::DescEset,
        ContentKind::MixEset,
        ContentKind::HalfEset,
    ];

    pub fn mode(self) -> ProfileMode {
        match self {
            ContentKind::TagEset
            | ContentKind::DescEset
            | ContentKind::MixEset
            | ContentKind::HalfEset => ProfileMode::Expansion,
            _ => ProfileMode::TfIdf,
        }
    }

    pub fn uses_time(self) -> bool {
        self == ContentKind::Time
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Tag => "tag",
            ContentKind::Desc => "desc",
            ContentKind::Mix => "mix",
            ContentKind::Half => "half",
            ContentKind::Time => "time",
            ContentKind::TagEset => "tag_eset",
            ContentKind::DescEset => "desc_eset",
            ContentKind::MixEset => "mix_eset",
            ContentKind::HalfEset => "half_eset",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ApprecError;

    fn from_str(s: &str) -> Result<Self> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ApprecError::parse(format!("unknown content kind '{s}'")))
    }
}

/// Ordered, size-bounded list of profile terms without stem duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentProfile {
    terms: Vec<String>,
}

impl ContentProfile {
    pub fn new(terms: Vec<String>) -> Self {
        ContentProfile { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn into_terms(self) -> Vec<String> {
        self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn truncated(mut self, len: usize) -> Self {
        self.terms.truncate(len);
        self
    }

    fn concat(mut self, other: ContentProfile) -> Self {
        self.terms.extend(other.terms);
        self
    }
}

/// Builds content profiles from a term index.
pub struct TermProfileBuilder<'a> {
    index: &'a dyn TermIndex,
    valid_tags: Vec<String>,
    decay: Option<&'a dyn TermDecay>,
}

impl<'a> TermProfileBuilder<'a> {
    pub fn new(index: &'a dyn TermIndex) -> Self {
        TermProfileBuilder {
            index,
            valid_tags: Vec::new(),
            decay: None,
        }
    }

    /// Restricts tag profiles to the given tag names.
    pub fn with_valid_tags(mut self, tags: &[String]) -> Self {
        self.valid_tags = tags.to_vec();
        self
    }

    /// Sets the decay source used by time-weighted profiles.
    pub fn with_decay(mut self, decay: &'a dyn TermDecay) -> Self {
        self.decay = Some(decay);
        self
    }

    /// Builds a profile of at most `size` terms accepted by `filter`.
    ///
    /// An empty `owned` set yields an empty profile. Time weighting requires a
    /// decay source.
    pub fn build(
        &self,
        owned: &[String],
        size: usize,
        filter: &dyn TermFilter,
        mode: ProfileMode,
        time_context: bool,
    ) -> Result<ContentProfile> {
        if owned.is_empty() || size == 0 {
            return Ok(ContentProfile::default());
        }

        let decay = if time_context {
            Some(self.decay.ok_or_else(|| {
                ApprecError::invalid_config("time-weighted profile requires usage data")
            })?)
        } else {
            None
        };

        let candidates: Vec<String> = match mode {
            ProfileMode::TfIdf => rank_terms(self.index, owned, filter, decay)
                .into_iter()
                .map(|t| t.term)
                .collect(),
            ProfileMode::Expansion => self
                .index
                .expand(owned, size * 2, filter)
                .into_iter()
                .map(|t| t.term)
                .collect(),
        };

        Ok(ContentProfile::new(deduplicate_stems(&candidates, size)))
    }

    /// Builds the profile of the given kind.
    pub fn content_profile(
        &self,
        kind: ContentKind,
        owned: &[String],
        size: usize,
    ) -> Result<ContentProfile> {
        let tags = TagFilter::with_valid_tags(self.valid_tags.iter().cloned());
        let mode = kind.mode();

        let profile = match kind {
            ContentKind::Tag | ContentKind::TagEset => self.build(owned, size, &tags, mode, false)?,
            ContentKind::Desc | ContentKind::DescEset => {
                self.build(owned, size, &DescriptionFilter, mode, false)?
            }
            ContentKind::Mix | ContentKind::MixEset => {
                self.build(owned, size, &tags.or(DescriptionFilter), mode, false)?
            }
            ContentKind::Half | ContentKind::HalfEset | ContentKind::Time => {
                let time = kind.uses_time();
                // each half is cut from a full-size, deduplicated profile
                let tag_part = self.build(owned, size, &tags, mode, time)?;
                let desc_part = self.build(owned, size, &DescriptionFilter, mode, time)?;
                tag_part.truncated(size / 2).concat(desc_part.truncated(size / 2))
            }
        };

        debug!("Content profile ({kind}): {:?}", profile.terms());
        Ok(profile)
    }
}
