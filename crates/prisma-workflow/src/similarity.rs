//! Normalized textual similarity between titles

/// Normalize text for comparison: trim surrounding whitespace, lowercase
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Similarity of two strings in `[0, 1]`
///
/// `1.0` on equality after normalization, otherwise
/// `(max_len - levenshtein) / max_len` over Unicode scalar values.
/// Returns `0.0` when either side is empty after normalization; that
/// value means "cannot determine", not "different" (see [`compare`]).
///
/// # Examples
///
/// ```
/// use prisma_workflow::similarity;
///
/// assert_eq!(similarity("Metformin and CVD Risk", "  metformin and cvd risk "), 1.0);
/// assert_eq!(similarity("", "Metformin"), 0.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    compare(a, b).unwrap_or(0.0)
}

/// Like [`similarity`] but `None` when either input is empty
pub fn compare(a: &str, b: &str) -> Option<f64> {
    compare_normalized(&normalize(a), &normalize(b))
}

/// Compare two already-normalized strings
pub fn compare_normalized(a: &str, b: &str) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(1.0);
    }

    let longest = a.chars().count().max(b.chars().count());
    let distance = strsim::levenshtein(a, b);
    Some((longest - distance) as f64 / longest as f64)
}
