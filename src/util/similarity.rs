//! String similarity used to explain recommendations.
//!
//! Descriptions of recommended packages are compared with the descriptions of
//! the packages a user already owns; the closest owned packages are reported
//! as the reason for the recommendation.

use std::cmp::min;

/// Calculate the Levenshtein distance between two strings.
/// This is the minimum number of single-character edits (insertions, deletions, or substitutions)
/// required to change one word into another.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    distance_chars(&s1_chars, &s2_chars)
}

// Two-row variant of the classic matrix fill.
fn distance_chars(s1: &[char], s2: &[char]) -> usize {
    let len1 = s1.len();
    let len2 = s2.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;

        for j in 1..=len2 {
            let cost = if s1[i - 1] == s2[j - 1] { 0 } else { 1 };

            curr_row[j] = min(
                min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Similarity ratio on a 0-100 scale, 100 meaning identical strings.
///
/// Two empty strings are considered identical.
pub fn similarity_ratio(s1: &str, s2: &str) -> u32 {
    let matcher = DescriptionMatcher::new(s1);
    matcher.ratio(s2)
}

/// Compares one description against many candidates, reusing the decoded
/// characters of the reference text.
#[derive(Debug, Clone)]
pub struct DescriptionMatcher {
    reference: Vec<char>,
}

impl DescriptionMatcher {
    /// Create a new matcher for the given reference text.
    pub fn new(reference: &str) -> Self {
        DescriptionMatcher {
            reference: reference.chars().collect(),
        }
    }

    /// Calculate distance to a candidate string.
    pub fn distance(&self, candidate: &str) -> usize {
        let candidate: Vec<char> = candidate.chars().collect();
        distance_chars(&self.reference, &candidate)
    }

    /// Similarity ratio (0 to 100, higher is more similar).
    pub fn ratio(&self, candidate: &str) -> u32 {
        let candidate: Vec<char> = candidate.chars().collect();
        let max_len = self.reference.len().max(candidate.len());
        if max_len == 0 {
            return 100;
        }

        let distance = distance_chars(&self.reference, &candidate);
        let similarity = 1.0 - (distance as f64 / max_len as f64);
        (similarity * 100.0).round() as u32
    }
}
