//! `hirevet` - candidate evaluation pipeline CLI.
//!
//! Works against a JSON candidate file so the pipeline can be exercised
//! without a database: candidates are loaded into the in-memory store,
//! operated on, and written back.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hirevet_core::InterviewSession;
use hirevet_runtime::{
    Candidate, EvaluationOrchestrator, EvaluationOutcome, MemoryStore, ProviderChain,
    ResponseEvaluator, RuntimeConfig, SweepScheduler, TextLetterWriter,
};

#[derive(Parser)]
#[command(name = "hirevet", version, about = "Candidate evaluation pipeline")]
struct Cli {
    /// Path to a runtime configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an interview session file with the response evaluator
    Score {
        /// Path to a session JSON file
        #[arg(long)]
        session: PathBuf,

        /// Pretty-print the evaluation
        #[arg(long)]
        pretty: bool,
    },

    /// Evaluate one candidate and dispatch its notification
    Evaluate {
        /// Path to a candidates JSON file
        #[arg(long)]
        candidates: PathBuf,

        /// Candidate id
        #[arg(long)]
        id: String,
    },

    /// Recompute scores for a candidate without re-sending letters
    Recalculate {
        #[arg(long)]
        candidates: PathBuf,

        #[arg(long)]
        id: String,
    },

    /// Run one batch sweep over all pending candidates
    Batch {
        #[arg(long)]
        candidates: PathBuf,
    },

    /// Run periodic batch sweeps until interrupted
    Watch {
        #[arg(long)]
        candidates: PathBuf,

        /// Seconds between sweeps (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    match cli.command {
        Command::Score { session, pretty } => score(&config, &session, pretty).await,
        Command::Evaluate { candidates, id } => {
            with_store(&config, &candidates, |orchestrator| async move {
                match orchestrator.evaluate_candidate(&id).await? {
                    EvaluationOutcome::Evaluated(result) => {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    EvaluationOutcome::Skipped => {
                        println!("skipped: candidate already evaluated");
                    }
                }
                Ok(())
            })
            .await
        }
        Command::Recalculate { candidates, id } => {
            with_store(&config, &candidates, |orchestrator| async move {
                let result = orchestrator.recalculate(&id).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            })
            .await
        }
        Command::Batch { candidates } => {
            with_store(&config, &candidates, |orchestrator| async move {
                let report = orchestrator.process_pending().await?;
                println!(
                    "evaluated: {}, skipped: {}, failed: {}",
                    report.evaluated,
                    report.skipped,
                    report.errors.len()
                );
                for failure in &report.errors {
                    eprintln!("  {}: {}", failure.candidate_id, failure.error);
                }
                Ok(())
            })
            .await
        }
        Command::Watch {
            candidates,
            interval,
        } => watch(&config, &candidates, interval).await,
    }
}

/// Run the response evaluator over a session file.
async fn score(config: &RuntimeConfig, session_path: &Path, pretty: bool) -> Result<()> {
    let session: InterviewSession = read_json(session_path)
        .with_context(|| format!("loading session from {}", session_path.display()))?;

    let chain = ProviderChain::from_env();
    if chain.is_empty() {
        tracing::info!("no provider credentials found, heuristic scoring only");
    }

    let evaluator = ResponseEvaluator::new(chain).with_config(config.completion_config());
    let evaluation = evaluator.evaluate(&session).await;

    let output = if pretty {
        serde_json::to_string_pretty(&evaluation)?
    } else {
        serde_json::to_string(&evaluation)?
    };
    println!("{}", output);
    Ok(())
}

/// Load candidates, run an operation through the orchestrator, save back.
async fn with_store<F, Fut>(config: &RuntimeConfig, candidates_path: &Path, op: F) -> Result<()>
where
    F: FnOnce(Arc<EvaluationOrchestrator>) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let store = Arc::new(load_candidates(candidates_path)?);
    let orchestrator = Arc::new(build_orchestrator(config, store.clone())?);

    let outcome = op(orchestrator).await;

    // Persist the working set even when the operation failed part-way;
    // whatever was evaluated is already authoritative.
    save_candidates(candidates_path, &store)?;
    outcome
}

async fn watch(config: &RuntimeConfig, candidates_path: &Path, interval: Option<u64>) -> Result<()> {
    let store = Arc::new(load_candidates(candidates_path)?);
    let orchestrator = Arc::new(build_orchestrator(config, store.clone())?);

    let sweep_interval = interval
        .map(Duration::from_secs)
        .unwrap_or(config.sweep_interval);

    tracing::info!(interval = ?sweep_interval, "watching for pending candidates");
    let scheduler = SweepScheduler::spawn(orchestrator, sweep_interval);
    scheduler.trigger();

    tokio::signal::ctrl_c()
        .await
        .context("waiting for interrupt")?;

    tracing::info!("interrupted, shutting down");
    scheduler.shutdown();
    scheduler.join().await;

    save_candidates(candidates_path, &store)?;
    Ok(())
}

fn build_orchestrator(
    config: &RuntimeConfig,
    store: Arc<MemoryStore>,
) -> Result<EvaluationOrchestrator> {
    Ok(EvaluationOrchestrator::builder()
        .store(store)
        .letters(Arc::new(TextLetterWriter::new(config.letters_dir.clone())))
        .scoring(config.scoring.clone())
        .inter_candidate_delay(config.inter_candidate_delay)
        .build()?)
}

fn load_candidates(path: &Path) -> Result<MemoryStore> {
    let candidates: Vec<Candidate> =
        read_json(path).with_context(|| format!("loading candidates from {}", path.display()))?;
    tracing::debug!(count = candidates.len(), "candidates loaded");
    Ok(MemoryStore::from_candidates(candidates))
}

fn save_candidates(path: &Path, store: &MemoryStore) -> Result<()> {
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
