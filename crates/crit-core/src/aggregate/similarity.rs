//! Weighted multi-field similarity between two findings.
//!
//! `score = 0.5 * message + 0.3 * location + 0.2 * category`, each term in `[0, 1]`.

use crate::finding::Finding;

pub const MESSAGE_WEIGHT: f64 = 0.5;
pub const LOCATION_WEIGHT: f64 = 0.3;
pub const CATEGORY_WEIGHT: f64 = 0.2;

/// Messages are compared on at most this many characters.
pub const MESSAGE_COMPARE_CHARS: usize = 200;

/// Score for two categories that are related but not equal.
pub const RELATED_CATEGORY_SCORE: f64 = 0.7;

const RELATED_CATEGORIES: &[(&str, &[&str])] = &[
    ("sql-injection", &["injection", "security", "input-validation"]),
    ("xss", &["injection", "security", "input-validation"]),
    ("command-injection", &["injection", "security", "input-validation"]),
    ("injection", &["sql-injection", "xss", "command-injection", "security"]),
    ("auth", &["authentication", "authorization", "security"]),
    ("authentication", &["auth", "security", "credentials"]),
    ("authorization", &["auth", "access-control", "security"]),
    ("secrets", &["hardcoded-secret", "credentials", "security"]),
    ("hardcoded-secret", &["secrets", "credentials", "security"]),
    ("breaking-change", &["api-change", "compatibility"]),
    ("api-change", &["breaking-change", "compatibility"]),
    ("missing-test", &["test-coverage", "testing", "coverage"]),
    ("test-coverage", &["missing-test", "testing", "coverage"]),
    ("testing", &["coverage", "edge-case", "missing-test", "test-coverage"]),
    ("coverage", &["testing", "test-coverage", "missing-test"]),
    ("edge-case", &["testing", "coverage"]),
    ("crypto", &["security", "secrets"]),
    ("n-plus-one", &["performance", "database"]),
    ("memory", &["performance", "resource-leak"]),
    ("complexity", &["maintainability", "quality"]),
    ("error-handling", &["quality", "reliability"]),
];

/// Combined similarity in `[0, 1]`.
///
/// A finding compared with itself scores exactly 1.0, including general
/// findings whose location term alone is 0.5. Distinct findings always go
/// through the weighted terms.
pub fn similarity(a: &Finding, b: &Finding) -> f64 {
    if a == b {
        return 1.0;
    }
    MESSAGE_WEIGHT * message_similarity(&a.message, &b.message)
        + LOCATION_WEIGHT * location_similarity(a, b)
        + CATEGORY_WEIGHT * category_similarity(&a.category, &b.category)
}

/// Case-insensitive, trimmed, truncated message comparison using
/// normalized character edit distance.
pub fn message_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_message(a);
    let b = normalize_message(b);
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let longest = a.len().max(b.len());
    1.0 - edit_distance(&a, &b) as f64 / longest as f64
}

fn normalize_message(message: &str) -> Vec<char> {
    message
        .trim()
        .to_lowercase()
        .chars()
        .take(MESSAGE_COMPARE_CHARS)
        .collect()
}

/// Character-level Levenshtein distance.
pub fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Location closeness. Only a finding with a file has a usable location.
pub fn location_similarity(a: &Finding, b: &Finding) -> f64 {
    match (a.location(), b.location()) {
        (None, None) => 0.5,
        (Some(_), None) | (None, Some(_)) => 0.0,
        (Some((file_a, _)), Some((file_b, _))) if file_a != file_b => 0.0,
        (Some((_, line_a)), Some((_, line_b))) => match (line_a, line_b) {
            (None, None) => 1.0,
            (Some(_), None) | (None, Some(_)) => 0.8,
            (Some(x), Some(y)) => line_proximity(x.abs_diff(y)),
        },
    }
}

fn line_proximity(distance: u32) -> f64 {
    match distance {
        0 => 1.0,
        1..=5 => 0.9,
        6..=10 => 0.7,
        11..=20 => 0.5,
        _ => 0.3,
    }
}

/// 1 for equal categories, [`RELATED_CATEGORY_SCORE`] for related ones, else 0.
pub fn category_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_ascii_lowercase();
    let b = b.trim().to_ascii_lowercase();
    if a == b {
        1.0
    } else if is_related(&a, &b) || is_related(&b, &a) {
        RELATED_CATEGORY_SCORE
    } else {
        0.0
    }
}

fn is_related(category: &str, other: &str) -> bool {
    RELATED_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .is_some_and(|(_, related)| related.contains(&other))
}
