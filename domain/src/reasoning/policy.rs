//! Sampling policy for rationale generation.
//!
//! One decision is made per question and applied uniformly to all k
//! generation calls of that question.
//!
//! | Condition | Temperature | Template |
//! |-----------|-------------|----------|
//! | dataset tag is fact-verification | 0.3 | fact-verification few-shot |
//! | "what is" / "who is" / "when was" / "where is" | 0.3 | chain-of-thought |
//! | "how does" / "why" / "explain" / "compare" | 0.6 | chain-of-thought |
//! | "analyze" / "evaluate" / "reconcile" / "resolve" | 0.8 | chain-of-thought |
//! | no match | 0.7 | chain-of-thought |
//!
//! Tiers are checked in order by case-insensitive substring match; the first
//! tier with a matching keyword wins.

use crate::core::question::Question;
use serde::{Deserialize, Serialize};

/// Which reasoning prompt template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningTemplate {
    /// Standard step-by-step reasoning
    ChainOfThought,
    /// Few-shot claim verification (SUPPORTED / REFUTED / NOT ENOUGH INFO)
    FactVerification,
}

/// One row of the keyword rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTier {
    pub keywords: Vec<String>,
    pub temperature: f64,
}

impl KeywordTier {
    pub fn new(keywords: &[&str], temperature: f64) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            temperature,
        }
    }

    fn matches(&self, text_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| text_lower.contains(&k.to_lowercase()))
    }
}

/// Why a particular temperature was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tier")]
pub enum SamplingReason {
    FactVerification,
    KeywordTier(usize),
    Default,
}

/// Outcome of applying the policy to a question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingDecision {
    pub temperature: f64,
    pub template: ReasoningTemplate,
    pub reason: SamplingReason,
}

/// Temperature and template selection policy (immutable configuration value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    pub fact_verification_temperature: f64,
    pub tiers: Vec<KeywordTier>,
    pub default_temperature: f64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            fact_verification_temperature: 0.3,
            tiers: vec![
                KeywordTier::new(&["what is", "who is", "when was", "where is"], 0.3),
                KeywordTier::new(&["how does", "why", "explain", "compare"], 0.6),
                KeywordTier::new(&["analyze", "evaluate", "reconcile", "resolve"], 0.8),
            ],
            default_temperature: 0.7,
        }
    }
}

impl SamplingPolicy {
    /// Decide the batch temperature and template for a question.
    pub fn decide(&self, question: &Question) -> SamplingDecision {
        if question.is_fact_verification() {
            return SamplingDecision {
                temperature: self.fact_verification_temperature,
                template: ReasoningTemplate::FactVerification,
                reason: SamplingReason::FactVerification,
            };
        }

        let (temperature, reason) = self.classify(question.content());
        SamplingDecision {
            temperature,
            template: ReasoningTemplate::ChainOfThought,
            reason,
        }
    }

    /// Classify free text against the keyword tiers.
    pub fn classify(&self, text: &str) -> (f64, SamplingReason) {
        let lower = text.to_lowercase();
        self.tiers
            .iter()
            .enumerate()
            .find(|(_, tier)| tier.matches(&lower))
            .map(|(i, tier)| (tier.temperature, SamplingReason::KeywordTier(i)))
            .unwrap_or((self.default_temperature, SamplingReason::Default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(text: &str) -> SamplingDecision {
        SamplingPolicy::default().decide(&Question::new(text).unwrap())
    }

    #[test]
    fn test_fact_verification_overrides_keywords() {
        let q = Question::new("Claim: Why is the sky green? Analyze this.")
            .unwrap()
            .with_dataset("fact_verification");
        let decision = SamplingPolicy::default().decide(&q);
        assert_eq!(decision.temperature, 0.3);
        assert_eq!(decision.template, ReasoningTemplate::FactVerification);
        assert_eq!(decision.reason, SamplingReason::FactVerification);
    }

    #[test]
    fn test_factual_tier() {
        let d = decide("What is the capital of France?");
        assert_eq!(d.temperature, 0.3);
        assert_eq!(d.template, ReasoningTemplate::ChainOfThought);
        assert_eq!(d.reason, SamplingReason::KeywordTier(0));
    }

    #[test]
    fn test_explanatory_tier() {
        assert_eq!(decide("How does photosynthesis work?").temperature, 0.6);
        assert_eq!(decide("Explain the causes of WW1").temperature, 0.6);
    }

    #[test]
    fn test_analytical_tier() {
        assert_eq!(decide("Reconcile these two accounts of the battle").temperature, 0.8);
    }

    #[test]
    fn test_earlier_tier_wins() {
        // matches both tier 0 ("what is") and tier 1 ("why")
        assert_eq!(decide("What is the reason why leaves fall?").temperature, 0.3);
    }

    #[test]
    fn test_no_match_uses_default() {
        let d = decide("Name the longest river in Africa.");
        assert_eq!(d.temperature, 0.7);
        assert_eq!(d.reason, SamplingReason::Default);
    }

    #[test]
    fn test_non_fact_dataset_uses_keywords() {
        let q = Question::new("Who is the author of Dune?")
            .unwrap()
            .with_dataset("hotpotqa");
        let d = SamplingPolicy::default().decide(&q);
        assert_eq!(d.temperature, 0.3);
        assert_eq!(d.template, ReasoningTemplate::ChainOfThought);
    }
}
