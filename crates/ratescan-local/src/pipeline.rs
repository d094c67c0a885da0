//! End-to-end extraction run for one document.
//!
//! Sequencing mirrors the provenance trail it leaves behind: record the
//! document, select an excerpt and record it, ask the model, record the
//! attempt (success or failure), and finally mark the excerpt extracted.
//! Completion, parse, and validation failures are caught once here, recorded
//! with the raw model output kept for diagnosis, and surfaced to the caller.
//! No retry: a failed run is terminal.

use crate::{now_epoch_s, prompt::build_prompt, reply::first_json_object, FsStore};
use ratescan_core::{
    BoundaryDetector, CompletionBackend, Error, ExtractionPayload, PageRange, PageTextProvider,
    Result,
};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Utility name attached to excerpt records; provenance only.
    pub utility: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            utility: "unknown_utility".to_string(),
        }
    }
}

/// What one successful run produced, with the ids it was recorded under.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub doc_id: String,
    pub rate_id: String,
    pub extraction_id: String,
    pub range: PageRange,
    pub payload: ExtractionPayload,
}

/// Content-addressed document id: `sha256:<hex>` over the file bytes.
pub fn document_id(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).map_err(|e| Error::Pdf(format!("read {}: {e}", path.display())))?;
    let mut h = Sha256::new();
    h.update(&bytes);
    Ok(format!("sha256:{}", hex::encode(h.finalize())))
}

fn short_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..12])
}

pub async fn run_extraction(
    path: &Path,
    provider: &dyn PageTextProvider,
    detector: &BoundaryDetector,
    backend: &dyn CompletionBackend,
    store: &FsStore,
    config: &PipelineConfig,
) -> Result<ExtractionOutcome> {
    log::info!("starting extraction for {}", path.display());

    let doc_id = document_id(path)?;
    store.upsert(
        "documents",
        &doc_id,
        &serde_json::json!({
            "doc_id": doc_id,
            "path": path.display().to_string(),
            "ingested_at_epoch_s": now_epoch_s(),
        }),
    )?;

    let pages = provider.page_texts(path)?;
    let selected = detector.select_excerpt(&pages)?;

    let rate_id = short_id("rate");
    store.insert(
        "excerpts",
        &rate_id,
        &serde_json::json!({
            "rate_id": rate_id,
            "doc_id": doc_id,
            "utility": config.utility,
            "page_start": selected.range.start + 1,
            "page_end": selected.range.end + 1,
            "status": "selected",
            "created_at_epoch_s": now_epoch_s(),
        }),
    )?;

    let prompt = build_prompt(&selected.text);

    let raw = match backend.complete(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            record_failure(store, &rate_id, &doc_id, &e, None)?;
            return Err(e);
        }
    };

    let payload = match first_json_object(&raw).and_then(|json| {
        serde_json::from_str::<ExtractionPayload>(json).map_err(|e| Error::Parse(e.to_string()))
    }) {
        Ok(payload) => payload,
        Err(e) => {
            record_failure(store, &rate_id, &doc_id, &e, Some(&raw))?;
            return Err(e);
        }
    };

    let extraction_id = short_id("ext");
    store.insert(
        "extractions",
        &extraction_id,
        &serde_json::json!({
            "extraction_id": extraction_id,
            "rate_id": rate_id,
            "doc_id": doc_id,
            "status": "ok",
            "payload": payload,
            "created_at_epoch_s": now_epoch_s(),
        }),
    )?;
    store.upsert(
        "excerpts",
        &rate_id,
        &serde_json::json!({
            "status": "extracted",
            "current_extraction_id": extraction_id,
        }),
    )?;

    log::info!(
        "extraction {extraction_id} succeeded: {} schedule(s)",
        payload.schedules.len()
    );
    Ok(ExtractionOutcome {
        doc_id,
        rate_id,
        extraction_id,
        range: selected.range,
        payload,
    })
}

fn record_failure(
    store: &FsStore,
    rate_id: &str,
    doc_id: &str,
    error: &Error,
    raw_output: Option<&str>,
) -> Result<()> {
    log::error!("extraction failed for {rate_id}: {error}");
    store.insert(
        "extractions",
        &short_id("ext"),
        &serde_json::json!({
            "rate_id": rate_id,
            "doc_id": doc_id,
            "status": "failed",
            "error": error.to_string(),
            "raw_output": raw_output,
            "created_at_epoch_s": now_epoch_s(),
        }),
    )
}
