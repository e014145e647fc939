//! Stem deduplication of ranked term candidates.

use crate::index::term::stem_root;

/// Selects at most `size` terms from `candidates` so that no two selected
/// terms collapse to the same stem.
///
/// The first `size` candidates form the working profile. Every stemmed term
/// (`Z<root>`) in it evicts the other terms whose un-marked form starts with
/// `<root>`; each eviction pulls the next unused candidate, in rank order, into
/// the profile. This repeats until a pass evicts nothing.
pub fn deduplicate_stems(candidates: &[String], size: usize) -> Vec<String> {
    let mut profile: Vec<&str> = candidates.iter().take(size).map(String::as_str).collect();
    let mut cursor = profile.len();

    loop {
        let roots: Vec<&str> = profile.iter().copied().filter_map(stem_root).collect();
        if roots.is_empty() {
            break;
        }

        let before = profile.len();
        profile.retain(|term| !collides(term, &roots));
        let evicted = before - profile.len();
        if evicted == 0 {
            break;
        }

        for _ in 0..evicted {
            match candidates.get(cursor) {
                Some(next) => profile.push(next.as_str()),
                None => break,
            }
            cursor += 1;
        }
    }

    profile.into_iter().map(str::to_string).collect()
}

// A term collides with a root when its un-marked form extends the root,
// unless it is that root's own marker term.
fn collides(term: &str, roots: &[&str]) -> bool {
    let surface = stem_root(term).unwrap_or(term);
    roots
        .iter()
        .any(|root| surface.starts_with(root) && stem_root(term) != Some(*root))
}
