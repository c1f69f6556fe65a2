//! Lexical relevance scoring between a query and a piece of evidence.
//!
//! Sources that do not report their own ranking use this score to populate
//! [`EvidenceSnippet::relevance_score`](super::EvidenceSnippet::relevance_score).
//! The score is a weighted sum, clamped to `[0, 1]`:
//!
//! | Component | Weight |
//! |-----------|--------|
//! | Query word overlap ratio | 0.4 |
//! | Exact query substring (0.3) or a shared word longer than 3 chars (0.15) | 0.3 / 0.15 |
//! | Character-bigram similarity over the first 500 chars | 0.3 |

use std::collections::{HashMap, HashSet};

const OVERLAP_WEIGHT: f64 = 0.4;
const EXACT_SUBSTRING_WEIGHT: f64 = 0.3;
const PARTIAL_SUBSTRING_WEIGHT: f64 = 0.15;
const SIMILARITY_WEIGHT: f64 = 0.3;
const SIMILARITY_WINDOW_CHARS: usize = 500;

/// Score how relevant `text` is to `query`.
pub fn score_relevance(query: &str, text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let query_lower = query.to_lowercase();
    let text_lower = text.to_lowercase();

    let query_words: HashSet<&str> = query_lower.split_whitespace().collect();
    let text_words: HashSet<&str> = text_lower.split_whitespace().collect();

    let mut score = 0.0;

    if !query_words.is_empty() {
        let overlap = query_words.intersection(&text_words).count() as f64;
        score += OVERLAP_WEIGHT * overlap / query_words.len() as f64;
    }

    let trimmed_query = query_lower.trim();
    if !trimmed_query.is_empty() && text_lower.contains(trimmed_query) {
        score += EXACT_SUBSTRING_WEIGHT;
    } else if query_words
        .iter()
        .any(|w| w.chars().count() > 3 && text_lower.contains(w))
    {
        score += PARTIAL_SUBSTRING_WEIGHT;
    }

    let window: String = text_lower.chars().take(SIMILARITY_WINDOW_CHARS).collect();
    score += SIMILARITY_WEIGHT * bigram_similarity(&query_lower, &window);

    score.clamp(0.0, 1.0)
}

/// Dice coefficient over character bigrams (multiset), in `[0, 1]`.
pub fn bigram_similarity(a: &str, b: &str) -> f64 {
    let a_bigrams = bigrams(a);
    let b_bigrams = bigrams(b);

    let a_total: usize = a_bigrams.values().sum();
    let b_total: usize = b_bigrams.values().sum();
    if a_total == 0 || b_total == 0 {
        return if a == b { 1.0 } else { 0.0 };
    }

    let shared: usize = a_bigrams
        .iter()
        .map(|(bigram, count)| (*count).min(b_bigrams.get(bigram).copied().unwrap_or(0)))
        .sum();

    2.0 * shared as f64 / (a_total + b_total) as f64
}

fn bigrams(s: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = s.chars().collect();
    let mut counts = HashMap::new();
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_scores_zero() {
        assert_eq!(score_relevance("capital of France", ""), 0.0);
        assert_eq!(score_relevance("capital of France", "   "), 0.0);
    }

    #[test]
    fn test_identical_text_scores_one() {
        let s = score_relevance("capital of france", "capital of france");
        assert!((s - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_related_text_beats_unrelated_text() {
        let query = "capital of France";
        let related = score_relevance(query, "Paris is the capital and largest city of France.");
        let unrelated = score_relevance(query, "Bananas are rich in potassium.");
        assert!(related > unrelated);
        assert!(related > 0.3);
    }

    #[test]
    fn test_score_within_unit_interval() {
        let s = score_relevance("a b c", "a b c a b c a b c");
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn test_bigram_similarity() {
        assert_eq!(bigram_similarity("night", "night"), 1.0);
        assert_eq!(bigram_similarity("ab", "cd"), 0.0);
        // night/nacht share only "ht": 2*1 / (4+4)
        assert!((bigram_similarity("night", "nacht") - 0.25).abs() < 1e-9);
    }
}
