//! Named, versioned reasoning templates.
//!
//! Each template has exactly one substitution slot, `{input}`, which receives
//! the question (or claim) text. Worked examples are static text.

use crate::reasoning::ReasoningTemplate;

/// Placeholder replaced by [`PromptTemplate::render`].
pub const INPUT_SLOT: &str = "{input}";

/// A named, versioned prompt template with a single `{input}` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub version: u32,
    body: &'static str,
}

impl PromptTemplate {
    pub const fn new(name: &'static str, version: u32, body: &'static str) -> Self {
        Self {
            name,
            version,
            body,
        }
    }

    /// Template for a reasoning style.
    pub fn for_reasoning(template: ReasoningTemplate) -> &'static PromptTemplate {
        match template {
            ReasoningTemplate::ChainOfThought => &CHAIN_OF_THOUGHT,
            ReasoningTemplate::FactVerification => &FACT_VERIFICATION,
        }
    }

    /// Substitute the question text into the template.
    pub fn render(&self, input: &str) -> String {
        self.body.replace(INPUT_SLOT, input)
    }

    /// `name@vN`, used in logs and transcripts.
    pub fn id(&self) -> String {
        format!("{}@v{}", self.name, self.version)
    }
}

/// Step-by-step reasoning for open questions.
pub const CHAIN_OF_THOUGHT: PromptTemplate = PromptTemplate::new(
    "chain_of_thought",
    1,
    r#"You are a helpful assistant. Answer the following question step by step.

Question: {input}

Think about what information is needed to answer this question. Break down the problem and provide your reasoning.
Finish with a final line of the form "Answer: <short answer>".

Reasoning:"#,
);

/// Few-shot claim verification with one worked example per label.
pub const FACT_VERIFICATION: PromptTemplate = PromptTemplate::new(
    "fact_verification",
    1,
    r#"You verify claims against world knowledge. Reason step by step, then label the claim as SUPPORTED, REFUTED, or NOT ENOUGH INFO.

Example 1
Claim: The Eiffel Tower is located in Paris.
Reasoning: The Eiffel Tower was built for the 1889 World's Fair on the Champ de Mars in Paris, France, where it still stands.
Answer: SUPPORTED

Example 2
Claim: Albert Einstein was born in France.
Reasoning: Albert Einstein was born in Ulm, in the Kingdom of Württemberg in the German Empire, not in France.
Answer: REFUTED

Example 3
Claim: The first person to read this sentence had breakfast today.
Reasoning: There is no record that identifies this reader or their meals, so the claim cannot be checked.
Answer: NOT ENOUGH INFO

Now verify the following.
Claim: {input}
Reasoning:"#,
);
