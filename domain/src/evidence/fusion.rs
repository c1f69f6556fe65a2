//! Fused evidence: the merged, deduplicated and ranked result of one
//! multi-source retrieval.

use super::snippet::EvidenceSnippet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Snippets returned by one source, tagged with the source's position in
/// the configured source order (0 = highest priority).
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub priority: usize,
    pub snippets: Vec<EvidenceSnippet>,
}

impl SourceBatch {
    pub fn new(priority: usize, snippets: Vec<EvidenceSnippet>) -> Self {
        Self { priority, snippets }
    }
}

/// Ordered, deduplicated evidence for one query (Value Object)
///
/// Invariants:
/// - no two snippets share the same normalized text
/// - sorted by relevance descending, then source priority ascending
/// - at most the `max_snippets` passed to [`FusedEvidence::fuse`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedEvidence {
    snippets: Vec<EvidenceSnippet>,
}

impl FusedEvidence {
    /// Evidence for a query where no source produced anything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge per-source batches.
    ///
    /// All snippets are concatenated and ordered by relevance (descending),
    /// then source priority, then arrival order. Duplicates by normalized text
    /// are then dropped keeping the first entry, which is the highest-relevance
    /// copy (or the higher-priority source on equal relevance). Blank snippets
    /// are discarded. The result is truncated to `max_snippets`.
    pub fn fuse(batches: Vec<SourceBatch>, max_snippets: usize) -> Self {
        let mut ranked: Vec<(usize, usize, EvidenceSnippet)> = batches
            .into_iter()
            .flat_map(|batch| {
                let priority = batch.priority;
                batch.snippets.into_iter().map(move |s| (priority, s))
            })
            .enumerate()
            .map(|(seq, (priority, snippet))| (priority, seq, snippet))
            .collect();

        ranked.sort_by(|(pa, sa, a), (pb, sb, b)| {
            b.relevance_score()
                .total_cmp(&a.relevance_score())
                .then_with(|| pa.cmp(pb))
                .then_with(|| sa.cmp(sb))
        });

        let mut seen = HashSet::new();
        let snippets = ranked
            .into_iter()
            .filter_map(|(_, _, snippet)| {
                let key = snippet.normalized_text();
                if key.is_empty() || !seen.insert(key) {
                    None
                } else {
                    Some(snippet)
                }
            })
            .take(max_snippets)
            .collect();

        Self { snippets }
    }

    pub fn snippets(&self) -> &[EvidenceSnippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvidenceSnippet> {
        self.snippets.iter()
    }

    /// Distinct source names contributing to this evidence, in ranked order.
    pub fn source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for snippet in &self.snippets {
            if !names.contains(&snippet.source_name()) {
                names.push(snippet.source_name());
            }
        }
        names
    }

    /// Render as a numbered list for embedding in a prompt.
    pub fn render_for_prompt(&self) -> String {
        self.snippets
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. [{}] {}", i + 1, s.source_name(), s.text().trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(source: &str, text: &str, score: f64) -> EvidenceSnippet {
        EvidenceSnippet::new(source, text, score)
    }

    #[test]
    fn test_fuse_sorts_by_relevance_then_priority() {
        let batches = vec![
            SourceBatch::new(0, vec![snippet("wikipedia", "alpha", 0.5)]),
            SourceBatch::new(1, vec![
                snippet("duckduckgo", "beta", 0.9),
                snippet("duckduckgo", "gamma", 0.5),
            ]),
        ];
        let fused = FusedEvidence::fuse(batches, 10);
        let texts: Vec<_> = fused.iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_fuse_dedup_keeps_higher_relevance() {
        let batches = vec![
            SourceBatch::new(0, vec![snippet("wikipedia", "Paris is the capital of France.", 0.4)]),
            SourceBatch::new(1, vec![snippet("duckduckgo", "  paris is the CAPITAL of france. ", 0.8)]),
        ];
        let fused = FusedEvidence::fuse(batches, 10);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused.snippets()[0].source_name(), "duckduckgo");
        assert_eq!(fused.snippets()[0].relevance_score(), 0.8);
    }

    #[test]
    fn test_fuse_dedup_equal_relevance_keeps_priority_source() {
        let batches = vec![
            SourceBatch::new(1, vec![snippet("duckduckgo", "Same text", 0.6)]),
            SourceBatch::new(0, vec![snippet("wikipedia", "same   text", 0.6)]),
        ];
        let fused = FusedEvidence::fuse(batches, 10);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused.snippets()[0].source_name(), "wikipedia");
    }

    #[test]
    fn test_fuse_truncates_and_drops_blank() {
        let batches = vec![SourceBatch::new(
            0,
            vec![
                snippet("corpus", "one", 0.9),
                snippet("corpus", "   ", 0.95),
                snippet("corpus", "two", 0.8),
                snippet("corpus", "three", 0.7),
            ],
        )];
        let fused = FusedEvidence::fuse(batches, 2);
        let texts: Vec<_> = fused.iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_fuse_no_batches_is_empty() {
        let fused = FusedEvidence::fuse(Vec::new(), 5);
        assert!(fused.is_empty());
        assert_eq!(fused, FusedEvidence::empty());
        assert_eq!(fused.render_for_prompt(), "");
    }

    #[test]
    fn test_render_and_source_names() {
        let batches = vec![
            SourceBatch::new(0, vec![snippet("wikipedia", "Paris is in France", 0.9)]),
            SourceBatch::new(1, vec![snippet("wikidata", "Paris: capital of France", 0.5)]),
        ];
        let fused = FusedEvidence::fuse(batches, 10);
        assert_eq!(fused.source_names(), vec!["wikipedia", "wikidata"]);
        assert_eq!(
            fused.render_for_prompt(),
            "1. [wikipedia] Paris is in France\n2. [wikidata] Paris: capital of France"
        );
    }
}
