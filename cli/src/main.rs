//! CLI entrypoint for Chain-of-Knowledge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use cok_application::{CompletionBackend, RunPipelineInput, RunPipelineUseCase};
use cok_domain::OutputFormat;
use cok_infrastructure::{
    CachingBackend, ConfigLoader, FileConfig, JsonlConversationLogger, OpenAiCompatibleBackend,
    SourceRegistry,
};
use cok_presentation::{Cli, ConsoleFormatter, ProgressReporter};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;

    info!("Starting Chain-of-Knowledge");

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("{}", issue.message);
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    let Some(question) = cli.question.clone() else {
        bail!("A question is required. Run with --help for usage.");
    };

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let api_key = config.completion.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set; requests are sent without an API key",
            config.completion.api_key_env
        );
    }
    let mut backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiCompatibleBackend::new(
        config.completion.base_url.clone(),
        config.completion.model.clone(),
        api_key,
        config.completion.timeout(),
    )?);
    if config.completion.cache {
        backend = Arc::new(CachingBackend::new(backend));
    }

    let sources = SourceRegistry::build(
        &config.retrieval.sources,
        config.retrieval.corpus_path.as_deref(),
    )?;
    info!(
        "Evidence sources: {}",
        sources
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Ctrl-C cancels the run instead of killing the process mid-write
    let cancellation = CancellationToken::new();
    tokio::spawn({
        let token = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling run");
                token.cancel();
            }
        }
    });

    let mut use_case = RunPipelineUseCase::new(backend, sources, config.to_pipeline_config())
        .with_cancellation(cancellation);

    if let Some(path) = cli.transcript.as_ref().or(config.logging.transcript.as_ref())
        && let Some(logger) = JsonlConversationLogger::new(path)
    {
        info!("Writing transcript to {}", logger.path().display());
        use_case = use_case.with_conversation_logger(Arc::new(logger));
    }

    let input = RunPipelineInput::new(question)
        .with_dataset(cli.dataset.clone())
        .with_choices(cli.choices.clone());

    let result = if cli.quiet || !config.output.show_progress {
        use_case.execute(input.clone()).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input.clone(), &progress).await?
    };

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    print!("{}", ConsoleFormatter::render(&input, &result, format));

    Ok(())
}

/// Command-line flags take precedence over every configuration source.
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(k) = cli.rationales {
        config.pipeline.num_rationales = k;
    }
    if let Some(threshold) = cli.threshold {
        config.pipeline.consensus_threshold = threshold;
    }
    if cli.no_early_stop {
        config.pipeline.early_stopping = false;
    }
    if let Some(model) = &cli.model {
        config.completion.model = model.clone();
    }
    if !cli.sources.is_empty() {
        config.retrieval.sources = cli.sources.clone();
    }
}

/// Stderr logging filtered by `-v` (or `RUST_LOG` when no `-v` is given),
/// plus an optional plain-text log file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
