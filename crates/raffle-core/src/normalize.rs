// Raw text input -> candidate names.

/// Split a block of text into candidate names: one per line, trimmed,
/// empty lines dropped. Order, duplicates and casing are preserved.
pub fn normalize_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
