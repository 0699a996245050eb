//! Keyword similarity between two pieces of tracked content. Pure functions.

use std::collections::HashMap;

/// Weight of a keyword phrase by word count: 3+ words → 3, 2 words → 2, else 1.
pub fn phrase_weight(phrase: &str) -> f64 {
    match phrase.split_whitespace().count() {
        n if n >= 3 => 3.0,
        2 => 2.0,
        _ => 1.0,
    }
}

/// Lower-cases, trims and collapses internal whitespace.
fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn phrase_set(keywords: &[String]) -> HashMap<String, f64> {
    keywords
        .iter()
        .map(|k| normalize(k))
        .filter(|k| !k.is_empty())
        .map(|k| {
            let weight = phrase_weight(&k);
            (k, weight)
        })
        .collect()
}

/// Weighted overlap between two keyword lists, in [0, 1].
///
/// Shared phrases contribute their word-count weight; the sum is divided by the
/// number of distinct phrases across both lists and clamped. A single shared
/// three-word phrase therefore outweighs several shared single words.
/// Symmetric, and 0 when either side is empty.
pub fn keyword_overlap(source: &[String], target: &[String]) -> f64 {
    let source = phrase_set(source);
    let target = phrase_set(target);
    if source.is_empty() || target.is_empty() {
        return 0.0;
    }

    let weighted_intersection: f64 = source
        .iter()
        .filter(|(phrase, _)| target.contains_key(*phrase))
        .map(|(_, weight)| weight)
        .sum();

    let shared = source.keys().filter(|p| target.contains_key(*p)).count();
    let union = source.len() + target.len() - shared;

    (weighted_intersection / union as f64).clamp(0.0, 1.0)
}
