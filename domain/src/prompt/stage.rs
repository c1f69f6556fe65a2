//! Prompts for the stages after reasoning: query extraction, correction,
//! validation and consolidation.

use crate::evidence::FusedEvidence;
use crate::rationale::Rationale;

/// Builders for stage prompts
pub struct StagePrompt;

impl StagePrompt {
    /// Ask the model to turn a rationale into a search query.
    pub fn query_extraction(rationale: &str) -> String {
        format!(
            r#"Extract the main search query from this reasoning. Reply with the query only, on one line.

Reasoning: {}

Search query:"#,
            rationale
        )
    }

    /// Ground a rationale in retrieved evidence.
    ///
    /// With empty evidence the prompt says so explicitly; the call still runs
    /// so every rationale goes through the same stage.
    pub fn correction(question: &str, rationale: &str, evidence: &FusedEvidence) -> String {
        let knowledge = if evidence.is_empty() {
            "No supporting evidence was found for this reasoning. Keep what is correct and fix anything you know to be wrong.".to_string()
        } else {
            evidence.render_for_prompt()
        };

        format!(
            r#"Given the supporting knowledge, correct or improve the following rationale to make it more accurate.

Question: {}

Original Rationale: {}

Supporting Knowledge:
{}

Write the corrected rationale, then finish with a final line of the form "Answer: <short answer>".

Corrected Rationale:"#,
            question, rationale, knowledge
        )
    }

    /// Ask whether a candidate answer is responsive to the question.
    pub fn validation(question: &str, candidate_answer: &str) -> String {
        format!(
            r#"Is '{}' reasonable for '{}'?

Judge only whether the answer is a plausible, relevant response to the question.
Reply with YES or NO."#,
            candidate_answer, question
        )
    }

    /// Synthesize a final answer from all corrected rationales.
    pub fn consolidation(question: &str, rationales: &[Rationale]) -> String {
        let steps = rationales
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {}", i + 1, r.text().trim()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Based on the following reasoning steps, provide a concise final answer to the question.

Question: {}

Reasoning steps:
{}

IMPORTANT: Provide ONLY the answer, nothing else.
- For fact verification: provide only the label (SUPPORTED, REFUTED, or NOT ENOUGH INFO).
- For multiple choice: provide only the letter.
- For factual questions: provide only the specific fact or entity name.
- Do NOT include explanations, reasoning, or additional text.

Final Answer:"#,
            question, steps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{EvidenceSnippet, SourceBatch};
    use crate::rationale::RationaleId;

    #[test]
    fn test_validation_prompt_wording() {
        let prompt = StagePrompt::validation("What is the capital of France?", "Paris");
        assert!(prompt.starts_with("Is 'Paris' reasonable for 'What is the capital of France?'"));
    }

    #[test]
    fn test_correction_prompt_without_evidence() {
        let prompt = StagePrompt::correction("Q?", "Some reasoning", &FusedEvidence::empty());
        assert!(prompt.contains("No supporting evidence was found"));
        assert!(prompt.contains("Original Rationale: Some reasoning"));
    }

    #[test]
    fn test_correction_prompt_embeds_evidence() {
        let evidence = FusedEvidence::fuse(
            vec![SourceBatch::new(
                0,
                vec![EvidenceSnippet::new("wikipedia", "Paris is the capital of France.", 0.9)],
            )],
            5,
        );
        let prompt = StagePrompt::correction("Q?", "Lyon is the capital", &evidence);
        assert!(prompt.contains("1. [wikipedia] Paris is the capital of France."));
        assert!(!prompt.contains("No supporting evidence"));
    }

    #[test]
    fn test_consolidation_prompt_lists_all_rationales() {
        let rationales = vec![
            Rationale::raw(RationaleId(0), "Answer: Paris"),
            Rationale::raw(RationaleId(1), "Answer: Lyon"),
        ];
        let prompt = StagePrompt::consolidation("What is the capital of France?", &rationales);
        assert!(prompt.contains("1. Answer: Paris"));
        assert!(prompt.contains("2. Answer: Lyon"));
        assert!(prompt.ends_with("Final Answer:"));
    }
}
