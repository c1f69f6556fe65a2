//! Majority agreement across corrected rationales.

use crate::rationale::{Rationale, answer_key};
use serde::{Deserialize, Serialize};

/// Result of a consensus check (Value Object)
///
/// Computed fresh for each run and never mutated.
/// `agreement_ratio == supporting_count / total_count` exactly.
///
/// # Example
///
/// ```
/// use cok_domain::consensus::ConsensusResult;
///
/// let result = ConsensusResult::from_answers(["Paris", "Lyon", "Paris"], 0.7);
/// assert_eq!(result.candidate_answer, "Paris");
/// assert_eq!(result.supporting_count, 2);
/// assert!(!result.reached); // 2/3 < 0.7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Most frequent answer (first-occurring surface form)
    pub candidate_answer: String,
    /// `supporting_count / total_count`, 0.0 when there are no answers
    pub agreement_ratio: f64,
    /// Number of answers equal to the candidate
    pub supporting_count: usize,
    /// Number of answers considered
    pub total_count: usize,
    /// Threshold the ratio was compared against
    pub threshold: f64,
    /// `agreement_ratio >= threshold` (and at least one answer)
    pub reached: bool,
}

impl ConsensusResult {
    /// Evaluate agreement over the extracted answers of `rationales`.
    pub fn evaluate(rationales: &[Rationale], threshold: f64) -> Self {
        Self::from_answers(rationales.iter().map(Rationale::extracted_answer), threshold)
    }

    /// Evaluate agreement over a sequence of answers.
    ///
    /// Answers are compared by [`answer_key`]. The candidate is the answer with
    /// the highest count; on equal counts the one occurring first in the input
    /// wins, so the outcome is deterministic for a given input order.
    pub fn from_answers<'a, I>(answers: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        // (key, surface form of first occurrence, count) in first-occurrence order
        let mut tally: Vec<(String, &'a str, usize)> = Vec::new();
        let mut total_count = 0;

        for answer in answers {
            total_count += 1;
            let key = answer_key(answer);
            match tally.iter_mut().find(|(k, _, _)| *k == key) {
                Some(entry) => entry.2 += 1,
                None => tally.push((key, answer, 1)),
            }
        }

        let mut best: Option<&(String, &str, usize)> = None;
        for entry in &tally {
            if best.is_none_or(|b| entry.2 > b.2) {
                best = Some(entry);
            }
        }

        let (candidate_answer, supporting_count) = best
            .map(|(_, surface, count)| (surface.trim().to_string(), *count))
            .unwrap_or_default();

        let agreement_ratio = if total_count == 0 {
            0.0
        } else {
            supporting_count as f64 / total_count as f64
        };

        Self {
            candidate_answer,
            agreement_ratio,
            supporting_count,
            total_count,
            threshold,
            reached: total_count > 0 && agreement_ratio >= threshold,
        }
    }

    /// Short human-readable summary, e.g. `"2/3 agree (66.7%)"`.
    pub fn summary(&self) -> String {
        format!(
            "{}/{} agree ({:.1}%)",
            self.supporting_count,
            self.total_count,
            self.agreement_ratio * 100.0
        )
    }
}
