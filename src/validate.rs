//! Input normalization for command-line arguments.
//!
//! Bulk-delete options are destructive, so they resolve in three tiers:
//! exact match → synonym lookup → error with suggestion. Nothing fuzzy is
//! ever accepted silently; a near miss only produces a suggestion.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_BULK_DELETE_OPTIONS: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["ALL", "OLD_DATA", "INACTIVE_PROFILES"].into_iter().collect());

// ── Synonym maps ─────────────────────────────────────────────

pub static BULK_DELETE_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("EVERYTHING", "ALL"),
        ("WIPE", "ALL"),
        ("OLD", "OLD_DATA"),
        ("STALE", "OLD_DATA"),
        ("RETENTION", "OLD_DATA"),
        ("INACTIVE", "INACTIVE_PROFILES"),
        ("DORMANT", "INACTIVE_PROFILES"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a bulk-delete option via exact match or synonym lookup.
///
/// Matching ignores case and treats `-` and spaces like `_`.
///
/// Returns the canonical option, or an error with the original input
/// and an optional suggestion.
pub fn normalize_bulk_delete_option(input: &str) -> Result<String, (String, Option<String>)> {
    let key = input.trim().to_uppercase().replace(['-', ' '], "_");

    // Tier 1: exact match
    if VALID_BULK_DELETE_OPTIONS.contains(key.as_str()) {
        return Ok(key);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = BULK_DELETE_SYNONYMS.get(key.as_str()) {
        return Ok(canonical.to_string());
    }

    // Tier 3: find closest suggestion
    let suggestion = find_closest_match(&key, &VALID_BULK_DELETE_OPTIONS, &BULK_DELETE_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 3 && best.is_none_or(|(_, best_dist)| dist < best_dist) {
            // For synonyms, show what it maps to
            let target = synonyms.get(v).copied().unwrap_or(v);
            best = Some((target, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing IDs similar to the searched ID.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|id| (levenshtein_distance(searched, id), id.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}
