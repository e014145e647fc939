//! Term and item filters.
//!
//! A [`TermFilter`] decides which terms may enter a profile or an expansion
//! set, an [`ItemFilter`] decides which items may appear in a ranked result.
//! Any `Fn(&str) -> bool` closure is a filter of both kinds, and filters
//! compose through [`Combine::and`] and [`Combine::or`].

use std::collections::HashSet;
use std::sync::LazyLock;

use ahash::AHashSet;

use crate::index::term::{self, STEM_PREFIX};

/// Capability deciding whether a term is acceptable.
pub trait TermFilter {
    fn accepts_term(&self, term: &str) -> bool;
}

/// Capability deciding whether an item is acceptable.
pub trait ItemFilter {
    fn accepts_item(&self, item: &str) -> bool;
}

impl<F> TermFilter for F
where
    F: Fn(&str) -> bool,
{
    fn accepts_term(&self, term: &str) -> bool {
        self(term)
    }
}

impl<F> ItemFilter for F
where
    F: Fn(&str) -> bool,
{
    fn accepts_item(&self, item: &str) -> bool {
        self(item)
    }
}

/// Both filters must accept.
#[derive(Debug, Clone)]
pub struct And<A, B>(pub A, pub B);

/// Either filter may accept.
#[derive(Debug, Clone)]
pub struct Or<A, B>(pub A, pub B);

impl<A: TermFilter, B: TermFilter> TermFilter for And<A, B> {
    fn accepts_term(&self, term: &str) -> bool {
        self.0.accepts_term(term) && self.1.accepts_term(term)
    }
}

impl<A: TermFilter, B: TermFilter> TermFilter for Or<A, B> {
    fn accepts_term(&self, term: &str) -> bool {
        self.0.accepts_term(term) || self.1.accepts_term(term)
    }
}

impl<A: ItemFilter, B: ItemFilter> ItemFilter for And<A, B> {
    fn accepts_item(&self, item: &str) -> bool {
        self.0.accepts_item(item) && self.1.accepts_item(item)
    }
}

impl<A: ItemFilter, B: ItemFilter> ItemFilter for Or<A, B> {
    fn accepts_item(&self, item: &str) -> bool {
        self.0.accepts_item(item) || self.1.accepts_item(item)
    }
}

/// Combinators available on every filter.
pub trait Combine: Sized {
    fn and<B>(self, other: B) -> And<Self, B> {
        And(self, other)
    }

    fn or<B>(self, other: B) -> Or<Self, B> {
        Or(self, other)
    }
}

impl<T> Combine for T {}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl TermFilter for AcceptAll {
    fn accepts_term(&self, _term: &str) -> bool {
        true
    }
}

impl ItemFilter for AcceptAll {
    fn accepts_item(&self, _item: &str) -> bool {
        true
    }
}

/// English stop words excluded from description profiles.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Accepts tag terms, optionally restricted to a whitelist of tag names.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    valid_tags: Option<AHashSet<String>>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts accepted tags to `tags`. An empty whitelist accepts every tag.
    pub fn with_valid_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: AHashSet<String> = tags.into_iter().map(Into::into).collect();
        Self {
            valid_tags: (!tags.is_empty()).then_some(tags),
        }
    }
}

impl TermFilter for TagFilter {
    fn accepts_term(&self, term: &str) -> bool {
        match term::tag_name(term) {
            Some(tag) => self
                .valid_tags
                .as_ref()
                .is_none_or(|valid| valid.contains(tag)),
            None => false,
        }
    }
}

/// Accepts description words: lower-case, containing a letter, not a stop
/// word. Stemmed variants are judged by their stem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionFilter;

impl TermFilter for DescriptionFilter {
    fn accepts_term(&self, term: &str) -> bool {
        let word = term.strip_prefix(STEM_PREFIX).unwrap_or(term);
        !STOP_WORDS.contains(word)
            && !word.chars().any(char::is_uppercase)
            && word.chars().any(|c| c.is_ascii_lowercase())
    }
}

/// Accepts tag terms only, for collaborative tag expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagExpandFilter;

impl TermFilter for TagExpandFilter {
    fn accepts_term(&self, term: &str) -> bool {
        term::is_tag(term)
    }
}

// Desktop meta-packages are only offered to users who already run that desktop.
fn desktop_rule(name: &str, owned: &AHashSet<String>) -> Option<bool> {
    ["kde", "gnome"]
        .into_iter()
        .find(|desktop| name.contains(desktop))
        .map(|desktop| owned.contains(desktop))
}

/// Accepts package terms for packages the user does not own.
#[derive(Debug, Clone, Default)]
pub struct PackageExpandFilter {
    owned: AHashSet<String>,
}

impl PackageExpandFilter {
    pub fn new<I, S>(owned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owned: owned.into_iter().map(Into::into).collect(),
        }
    }
}

impl TermFilter for PackageExpandFilter {
    fn accepts_term(&self, term: &str) -> bool {
        let Some(package) = term::package_name(term) else {
            return false;
        };
        let is_new = !self.owned.contains(package);
        desktop_rule(package, &self.owned).map_or(is_new, |allowed| is_new && allowed)
    }
}

/// Accepts items worth recommending to a user.
///
/// Owned items and multi-arch names (`pkg:arch`) are rejected. Items naming
/// `kde` or `gnome` pass only when the user owns the literal `kde` or `gnome`
/// item. Everything else is rejected when it looks like a library (`lib*`)
/// or documentation (`*doc`).
#[derive(Debug, Clone, Default)]
pub struct PackageMatchFilter {
    owned: AHashSet<String>,
}

impl PackageMatchFilter {
    pub fn new<I, S>(owned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owned: owned.into_iter().map(Into::into).collect(),
        }
    }
}

impl ItemFilter for PackageMatchFilter {
    fn accepts_item(&self, item: &str) -> bool {
        let is_new = !self.owned.contains(item) && !item.contains(':');

        if let Some(allowed) = desktop_rule(item, &self.owned) {
            return is_new && allowed;
        }

        if item.starts_with("lib") || item.ends_with("doc") {
            return false;
        }

        is_new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_filter() {
        let filter = TagFilter::new();
        assert!(filter.accepts_term("XTuse::editing"));
        assert!(!filter.accepts_term("editor"));

        let filter = TagFilter::with_valid_tags(["use::editing"]);
        assert!(filter.accepts_term("XTuse::editing"));
        assert!(!filter.accepts_term("XTgame::fps"));
    }

    #[test]
    fn test_description_filter() {
        let filter = DescriptionFilter;
        assert!(filter.accepts_term("editor"));
        assert!(filter.accepts_term("Zedit"));
        assert!(filter.accepts_term("mp3"));
        assert!(!filter.accepts_term("the"));
        assert!(!filter.accepts_term("XTuse::editing"));
        assert!(!filter.accepts_term("XPvim"));
        assert!(!filter.accepts_term("1234"));
        assert!(!filter.accepts_term("Editor"));
    }

    #[test]
    fn test_mixed_filter() {
        let filter = TagFilter::new().or(DescriptionFilter);
        assert!(filter.accepts_term("XTuse::editing"));
        assert!(filter.accepts_term("editor"));
        assert!(!filter.accepts_term("XPvim"));
    }

    #[test]
    fn test_package_match_filter() {
        let filter = PackageMatchFilter::new(["vim", "gimp"]);
        assert!(filter.accepts_item("inkscape"));
        assert!(!filter.accepts_item("vim"));
        assert!(!filter.accepts_item("libc6"));
        assert!(!filter.accepts_item("python-doc"));
        assert!(!filter.accepts_item("wine:i386"));
        assert!(!filter.accepts_item("kdenlive"));
        assert!(!filter.accepts_item("gnome-shell"));

        let filter = PackageMatchFilter::new(["kde"]);
        assert!(filter.accepts_item("kdenlive"));
        assert!(filter.accepts_item("libkdecore5"));
        assert!(!filter.accepts_item("kde"));
    }

    #[test]
    fn test_package_expand_filter() {
        let filter = PackageExpandFilter::new(["vim", "gnome"]);
        assert!(filter.accepts_term("XPemacs"));
        assert!(!filter.accepts_term("XPvim"));
        assert!(!filter.accepts_term("emacs"));
        assert!(filter.accepts_term("XPgnome-shell"));
        assert!(!filter.accepts_term("XPkate-kde"));
    }

    #[test]
    fn test_closure_and_combinators() {
        let short = |term: &str| term.len() < 6;
        let filter = DescriptionFilter.and(short);
        assert!(filter.accepts_term("edit"));
        assert!(!filter.accepts_term("editors"));
        assert!(AcceptAll.accepts_item("anything"));
    }
}
