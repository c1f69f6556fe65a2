//! Console output formatter for pipeline results

use cok_application::RunPipelineInput;
use cok_domain::answer::{choice_letter, fact_label};
use cok_domain::{Confidence, DatasetTag, OutputFormat, PipelineResult, ResultStage};
use colored::Colorize;

/// Formats pipeline results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render `result` in the requested format.
    pub fn render(input: &RunPipelineInput, result: &PipelineResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(input, result),
            OutputFormat::Answer => Self::format_answer_only(input, result),
            OutputFormat::Json => Self::format_json(input, result),
        }
    }

    /// Dataset-convention form of the answer, if one applies.
    ///
    /// Fact-verification runs map onto SUPPORTS / REFUTES / NOT ENOUGH INFO;
    /// multiple-choice runs map onto an option letter.
    pub fn canonical_answer(input: &RunPipelineInput, result: &PipelineResult) -> Option<String> {
        let is_fact_verification = input
            .dataset
            .as_deref()
            .is_some_and(|d| DatasetTag::new(d).is_fact_verification());

        if is_fact_verification {
            return fact_label(&result.answer).map(|label| label.to_string());
        }
        if !input.choices.is_empty() {
            return choice_letter(&result.answer, &input.choices).map(String::from);
        }
        None
    }

    /// Format the complete result
    pub fn format(input: &RunPipelineInput, result: &PipelineResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Chain-of-Knowledge"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            input.question
        ));
        if let Some(dataset) = &input.dataset {
            output.push_str(&format!("{} {}\n", "Dataset:".cyan().bold(), dataset));
        }
        for (i, choice) in input.choices.iter().enumerate() {
            let letter = cok_domain::answer::option_letter(i).unwrap_or('?');
            output.push_str(&format!("  {}. {}\n", letter, choice));
        }

        // Rationales as first sampled
        output.push_str(&Self::section_header("Sampled Rationales"));
        for rationale in &result.raw_rationales {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ── answer: {}", rationale.id(), rationale.extracted_answer())
                    .yellow()
                    .bold(),
                Self::indent(rationale.text(), "  ")
            ));
        }

        output.push_str(&Self::section_header("Consensus"));
        let consensus = &result.consensus;
        let summary = consensus.summary();
        output.push_str(&format!(
            "\n{}\n",
            if consensus.reached {
                summary.green()
            } else {
                summary.yellow()
            }
        ));

        if result.stage == ResultStage::Consolidated {
            output.push_str(&Self::section_header("Corrected Rationales"));
            for rationale in &result.rationales {
                let marker = if rationale.is_corrected() {
                    "corrected".green()
                } else {
                    "raw fallback".red()
                };
                output.push_str(&format!(
                    "\n{} ({})\n{}\n",
                    format!("── {} ── answer: {}", rationale.id(), rationale.extracted_answer())
                        .yellow()
                        .bold(),
                    marker,
                    Self::indent(rationale.text(), "  ")
                ));
            }
        }

        if !result.degradations.is_empty() {
            output.push_str(&Self::section_header("Degradations"));
            for degradation in &result.degradations {
                output.push_str(&format!("  {} {}\n", "!".yellow().bold(), degradation));
            }
        }

        output.push_str(&Self::section_header("Answer"));
        output.push_str(&format!("\n{}\n", result.answer.bold()));
        if let Some(canonical) = Self::canonical_answer(input, result) {
            output.push_str(&format!("{} {}\n", "Canonical:".dimmed(), canonical));
        }
        output.push_str(&format!(
            "{} {} ({})\n",
            "Stage:".dimmed(),
            result.stage.as_str(),
            Self::confidence_label(result.confidence)
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(input: &RunPipelineInput, result: &PipelineResult) -> String {
        let value = serde_json::json!({
            "question": input.question,
            "dataset": input.dataset,
            "choices": input.choices,
            "canonical_answer": Self::canonical_answer(input, result),
            "result": result,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Only the answer: the canonical form when one applies
    pub fn format_answer_only(input: &RunPipelineInput, result: &PipelineResult) -> String {
        let answer = Self::canonical_answer(input, result).unwrap_or_else(|| result.answer.clone());
        format!("{}\n", answer)
    }

    fn confidence_label(confidence: Confidence) -> colored::ColoredString {
        match confidence {
            Confidence::High => confidence.as_str().green(),
            Confidence::Low => confidence.as_str().yellow(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
