use std::collections::{BTreeSet, HashSet};

/// Merge the search keyword `new` into an accumulated niche field.
///
/// Words already present (compared lowercase) are dropped; the remaining
/// words of `new` are appended in sorted lowercase order. An empty field
/// simply takes `new`.
#[must_use]
pub fn merge_niche(existing: &str, new: &str) -> String {
    if existing.trim().is_empty() {
        return new.to_owned();
    }

    let existing_words: HashSet<String> = existing
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let unique_new: BTreeSet<String> = new
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| !existing_words.contains(w))
        .collect();

    if unique_new.is_empty() {
        return existing.to_owned();
    }

    let appended: Vec<String> = unique_new.into_iter().collect();
    format!("{existing} {}", appended.join(" "))
}
