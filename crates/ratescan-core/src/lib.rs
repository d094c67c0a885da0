use std::path::Path;

pub mod boundary;
pub mod schema;

pub use boundary::{
    assemble_excerpt, cluster_ranges, expand_ranges, page_marker, score_pages, BoundaryDetector,
    DetectorConfig, MarkerLexicon, PageHit, PageRange, SelectedExcerpt, DEFAULT_MARKER_TERMS,
};
pub use schema::{Charge, Citation, Eligibility, EligibilityRules, ExtractionPayload, Schedule};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid marker pattern: {0}")]
    InvalidPattern(String),
    #[error("no candidate page range detected")]
    NoCandidateRange,
    #[error("pdf read failed: {0}")]
    Pdf(String),
    #[error("completion failed: {0}")]
    Llm(String),
    #[error("model output parse failed: {0}")]
    Parse(String),
    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Yields one raw text string per physical page of a document.
///
/// A page that fails to extract may come back as an empty string; a failure
/// to open or parse the document as a whole is `Error::Pdf`.
pub trait PageTextProvider: Send + Sync {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>>;
}

/// A single-shot text completion backend (prompt in, free-form reply out).
///
/// One request per call, no retry. The reply may or may not be fenced or
/// annotated; callers recover structured output from it separately.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
