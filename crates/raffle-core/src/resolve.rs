// Case-insensitive duplicate resolution for incoming names.

use std::collections::HashSet;

/// Result of merging a candidate batch against the existing pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// New, mutually distinct names in input order, with first-seen casing.
    pub to_insert: Vec<String>,
    /// Candidates dropped: already present, or repeated within the batch.
    pub skipped: usize,
}

/// Comparison key for name uniqueness.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Filter `candidates` against `existing` and against each other,
/// case-insensitively. The first occurrence of each new name wins.
pub fn resolve_duplicates<'a, I>(candidates: &[String], existing: I) -> Resolution
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = existing.into_iter().map(name_key).collect();

    let to_insert: Vec<String> = candidates
        .iter()
        .filter(|name| seen.insert(name_key(name)))
        .cloned()
        .collect();

    Resolution {
        skipped: candidates.len() - to_insert.len(),
        to_insert,
    }
}
