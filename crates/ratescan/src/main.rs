use clap::Parser;
use ratescan_core::{BoundaryDetector, DetectorConfig, Error};
use ratescan_local::ollama::{OllamaClient, OllamaConfig};
use ratescan_local::pdf::PdfPageProvider;
use ratescan_local::pipeline::{run_extraction, PipelineConfig};
use ratescan_local::FsStore;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit codes are part of the contract: 0 success, 1 input document not
/// found, 2 no candidate page range detected, 3 downstream extraction or
/// persistence failure.
const EXIT_NOT_FOUND: u8 = 1;
const EXIT_NO_CANDIDATE: u8 = 2;
const EXIT_EXTRACTION_FAILED: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "ratescan")]
#[command(about = "Extract a utility rate schedule from a tariff PDF via a local LLM", long_about = None)]
struct Cli {
    /// Path to the tariff PDF.
    #[arg(default_value = "documents/sample-tariff.pdf")]
    pdf: PathBuf,

    /// Root directory for the provenance store.
    #[arg(long, env = "RATESCAN_STORE_DIR", default_value = ".ratescan-store")]
    store_dir: PathBuf,

    /// Ollama base URL.
    #[arg(
        long,
        env = "RATESCAN_OLLAMA_BASE_URL",
        default_value = "http://127.0.0.1:11434"
    )]
    ollama_base_url: String,

    /// Ollama model name.
    #[arg(long, env = "RATESCAN_OLLAMA_MODEL", default_value = "qwen2.5:7b-instruct")]
    model: String,

    /// Utility name recorded on excerpt records.
    #[arg(long, env = "RATESCAN_UTILITY", default_value = "unknown_utility")]
    utility: String,

    /// Max non-hit pages tolerated inside one detected cluster.
    #[arg(long, default_value_t = 1)]
    gap: usize,

    /// Trailing pages appended to each detected range.
    #[arg(long, default_value_t = 2)]
    pad_after: usize,

    /// Overall timeout for the single completion call, in milliseconds.
    #[arg(long, default_value_t = 300_000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if !cli.pdf.exists() {
        log::error!("input document not found: {}", cli.pdf.display());
        return ExitCode::from(EXIT_NOT_FOUND);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::NoCandidateRange) => {
            log::error!("no schedule candidate page ranges detected");
            ExitCode::from(EXIT_NO_CANDIDATE)
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(EXIT_EXTRACTION_FAILED)
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let detector = BoundaryDetector::new(&DetectorConfig {
        gap: cli.gap,
        pad_after: cli.pad_after,
        ..DetectorConfig::default()
    })?;

    let client = reqwest::Client::builder()
        .user_agent("ratescan/0.1")
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| Error::Llm(e.to_string()))?;
    let backend = OllamaClient::new(
        client,
        OllamaConfig {
            base_url: cli.ollama_base_url,
            model: cli.model,
            timeout_ms: cli.timeout_ms,
        },
    );

    let store = FsStore::new(cli.store_dir);
    let outcome = run_extraction(
        &cli.pdf,
        &PdfPageProvider,
        &detector,
        &backend,
        &store,
        &PipelineConfig {
            utility: cli.utility,
        },
    )
    .await?;

    match outcome.payload.schedules.first() {
        Some(sched) => println!(
            "extracted '{}' (pages {}-{}, {} charges, {} citations) -> {}",
            sched.schedule_name,
            outcome.range.start + 1,
            outcome.range.end + 1,
            sched.charges.len(),
            sched.citations.len(),
            outcome.extraction_id,
        ),
        None => println!(
            "extraction {} succeeded but returned zero schedules",
            outcome.extraction_id
        ),
    }
    Ok(())
}
