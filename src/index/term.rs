//! Term prefix conventions.
//!
//! Tags are stored as `XT<tag>`, package-name terms as `XP<package>` and
//! stemmed description words as `Z<stem>`. Plain lower-case words are
//! unstemmed description tokens.

/// Prefix of debtags terms.
pub const TAG_PREFIX: &str = "XT";

/// Prefix of package-name terms.
pub const PACKAGE_PREFIX: &str = "XP";

/// Prefix marking a stemmed description term.
pub const STEM_PREFIX: &str = "Z";

/// Builds the term for a tag.
pub fn tag_term(tag: &str) -> String {
    format!("{TAG_PREFIX}{tag}")
}

/// Builds the term for a package name.
pub fn package_term(package: &str) -> String {
    format!("{PACKAGE_PREFIX}{package}")
}

/// Tag name of a tag term.
pub fn tag_name(term: &str) -> Option<&str> {
    term.strip_prefix(TAG_PREFIX)
}

/// Package name of a package term.
pub fn package_name(term: &str) -> Option<&str> {
    term.strip_prefix(PACKAGE_PREFIX)
}

/// Un-marked stem of a stemmed term.
pub fn stem_root(term: &str) -> Option<&str> {
    term.strip_prefix(STEM_PREFIX)
}

pub fn is_tag(term: &str) -> bool {
    term.starts_with(TAG_PREFIX)
}

pub fn is_package(term: &str) -> bool {
    term.starts_with(PACKAGE_PREFIX)
}
