use std::collections::{BTreeMap, BTreeSet};

/// Tokenize text into lowercase terms: hyphens count as whitespace and
/// runs of whitespace separate terms. Never yields an empty term.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Distinct terms of a token sequence, each appearing once.
pub fn distinct_terms(tokens: &[String]) -> BTreeSet<&str> {
    tokens.iter().map(String::as_str).collect()
}

/// Raw occurrence count per term, in term order so that sums over the
/// counts are reproducible.
pub fn term_counts(tokens: &[String]) -> BTreeMap<&str, u32> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for term in tokens {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Logarithmically dampened term frequency, `1 + log10(tf)`; 0 when the
/// term is absent.
#[inline]
pub fn log_tf(tf: u32) -> f64 {
    if tf > 0 { 1.0 + (tf as f64).log10() } else { 0.0 }
}
