//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for pipeline results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rationales, evidence use, consensus and the answer
    Full,
    /// Only the final answer
    Answer,
    /// The whole result as JSON
    Json,
}

impl From<OutputFormat> for cok_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => cok_domain::OutputFormat::Full,
            OutputFormat::Answer => cok_domain::OutputFormat::Answer,
            OutputFormat::Json => cok_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for chain-of-knowledge
#[derive(Parser, Debug)]
#[command(name = "chain-of-knowledge")]
#[command(
    author,
    version,
    about = "Chain-of-Knowledge - answer questions with evidence-corrected reasoning"
)]
#[command(long_about = r#"
Chain-of-Knowledge answers a question by sampling several reasoning chains,
checking them for agreement, and grounding them in retrieved evidence.

The pipeline:
1. Reasoning: k rationales are sampled from the model
2. Consensus: if enough rationales agree and a validator approves, stop early
3. Correction: each rationale is corrected against evidence from Wikipedia,
   DuckDuckGo, Wikidata or a local corpus
4. Consolidation: the corrected rationales are merged into one answer

Configuration files are loaded from (in priority order):
1. COK_* environment variables (e.g. COK_PIPELINE__NUM_RATIONALES=3)
2. --config <path>     Explicit config file
3. ./cok.toml          Project-level config
4. ~/.config/chain-of-knowledge/config.toml   Global config

Example:
  chain-of-knowledge "Which country has the largest population in Africa?"
  chain-of-knowledge --dataset fever "The Eiffel Tower is in Berlin."
  chain-of-knowledge -c Paris -c Rome -c Madrid "What is the capital of Italy?"
"#)]
pub struct Cli {
    /// The question (or claim, for fact verification) to answer
    pub question: Option<String>,

    /// Dataset tag; "fever" or "fact_verification" switches to claim checking
    #[arg(short, long, value_name = "TAG")]
    pub dataset: Option<String>,

    /// Multiple-choice option (can be specified multiple times)
    #[arg(short = 'c', long = "choice", value_name = "TEXT")]
    pub choices: Vec<String>,

    /// Number of rationales to sample
    #[arg(short = 'k', long, value_name = "N")]
    pub rationales: Option<usize>,

    /// Consensus threshold in [0, 1]
    #[arg(short, long, value_name = "RATIO")]
    pub threshold: Option<f64>,

    /// Always correct and consolidate, even when consensus is reached
    #[arg(long)]
    pub no_early_stop: bool,

    /// Model name passed to the completion endpoint
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Evidence source (can be specified multiple times; order is priority)
    #[arg(short, long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Write a JSONL transcript of the run
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "chain-of-knowledge",
            "-k",
            "3",
            "--threshold",
            "0.6",
            "-c",
            "Paris",
            "-c",
            "Rome",
            "--source",
            "wikipedia",
            "-o",
            "json",
            "-vv",
            "What is the capital of Italy?",
        ])
        .unwrap();

        assert_eq!(cli.question.as_deref(), Some("What is the capital of Italy?"));
        assert_eq!(cli.rationales, Some(3));
        assert_eq!(cli.threshold, Some(0.6));
        assert_eq!(cli.choices, vec!["Paris", "Rome"]);
        assert_eq!(cli.sources, vec!["wikipedia"]);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_question_optional_for_show_config() {
        let cli = Cli::try_parse_from(["chain-of-knowledge", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.question.is_none());
    }

    #[test]
    fn test_output_format_maps_to_domain() {
        assert_eq!(
            cok_domain::OutputFormat::from(OutputFormat::Answer),
            cok_domain::OutputFormat::Answer
        );
    }
}
