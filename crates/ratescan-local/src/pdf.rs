use ratescan_core::{Error, PageTextProvider, Result};
use std::path::Path;

/// Per-page text extraction over `pdf-extract` (pure Rust, text-layer only).
///
/// Extraction quality varies by PDF; scanned documents without a text layer
/// come back as empty pages, which the scorer treats as zero matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageProvider;

impl PageTextProvider for PdfPageProvider {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Pdf(format!("read {}: {e}", path.display())))?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| Error::Pdf(e.to_string()))?;
        log::info!("extracted {} pages from {}", pages.len(), path.display());
        Ok(pages)
    }
}
