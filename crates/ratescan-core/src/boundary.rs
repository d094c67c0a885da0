//! Heuristic page-boundary detection for tariff PDFs.
//!
//! A rate schedule announces itself with stereotyped language ("RATE SCHEDULE",
//! "DEMAND CHARGE", ...). We score each page by marker occurrences, cluster hit
//! pages into contiguous ranges with a small gap tolerance, then pad each range
//! with trailing pages so charge tables that follow the triggering text are
//! captured. Everything here is deterministic and allocation-only (no IO).

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default marker terms, matched case-insensitively as word-bounded phrases.
///
/// Terms are regex fragments; callers overriding them may use their own
/// patterns as long as each is valid inside one alternation group.
pub const DEFAULT_MARKER_TERMS: &[&str] = &[
    "rate schedule",
    "schedule",
    "applicable to",
    "availability",
    "character of service",
    "customer charge",
    "demand charge",
    "energy charge",
];

/// A set of marker terms compiled into a single case-insensitive alternation.
#[derive(Debug, Clone)]
pub struct MarkerLexicon {
    alternation: Regex,
}

impl MarkerLexicon {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::InvalidPattern("empty marker term list".to_string()));
        }
        let joined = terms
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join("|");
        let alternation = Regex::new(&format!(r"(?i)\b(?:{joined})\b"))
            .map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(Self { alternation })
    }

    /// Count non-overlapping matches in one page's text.
    pub fn count_matches(&self, text: &str) -> usize {
        self.alternation.find_iter(text).count()
    }
}

impl Default for MarkerLexicon {
    fn default() -> Self {
        // The default term list is a compile-time constant and always valid.
        Self::new(DEFAULT_MARKER_TERMS).expect("default marker terms compile")
    }
}

/// A page containing at least one marker match, with its match count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHit {
    pub page_index: usize,
    pub score: usize,
}

/// An inclusive span of 0-based page indices, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

/// Score every page against the lexicon, in index order.
///
/// Sparse output: pages with zero matches are omitted entirely, so the
/// returned indices are strictly increasing by construction.
pub fn score_pages(lexicon: &MarkerLexicon, pages: &[String]) -> Vec<PageHit> {
    let mut hits = Vec::new();
    for (i, text) in pages.iter().enumerate() {
        let score = lexicon.count_matches(text);
        if score > 0 {
            log::debug!("page {} matched {} markers", i + 1, score);
            hits.push(PageHit {
                page_index: i,
                score,
            });
        }
    }
    log::info!(
        "scored {} pages, {} candidate pages",
        pages.len(),
        hits.len()
    );
    hits
}

/// Group hit pages into contiguous ranges, tolerating up to `gap` non-hit
/// pages between two hits inside one cluster.
///
/// Input order is not trusted: a sorted copy of the indices drives the merge.
pub fn cluster_ranges(hits: &[PageHit], gap: usize) -> Vec<PageRange> {
    if hits.is_empty() {
        log::warn!("no page hits to cluster");
        return Vec::new();
    }
    let mut idxs: Vec<usize> = hits.iter().map(|h| h.page_index).collect();
    idxs.sort_unstable();

    let mut ranges = Vec::new();
    let mut start = idxs[0];
    let mut prev = idxs[0];
    for &idx in &idxs[1..] {
        if idx <= prev + gap + 1 {
            prev = idx;
        } else {
            ranges.push(PageRange { start, end: prev });
            start = idx;
            prev = idx;
        }
    }
    ranges.push(PageRange { start, end: prev });
    log::info!("clustered into {} page ranges", ranges.len());
    ranges
}

/// Pad each range's end by `pad_after` trailing pages, clamped at the last
/// page. Starts are never moved: markers sit at or near the top of the
/// relevant section, so only trailing content (charge tables) needs capture.
pub fn expand_ranges(ranges: &[PageRange], num_pages: usize, pad_after: usize) -> Vec<PageRange> {
    ranges
        .iter()
        .map(|r| {
            assert!(
                r.start <= r.end && r.end < num_pages,
                "malformed page range {}..={} for {num_pages} pages",
                r.start,
                r.end
            );
            PageRange {
                start: r.start,
                end: (r.end + pad_after).min(num_pages - 1),
            }
        })
        .collect()
}

/// The page-boundary marker line for a 1-based page number.
///
/// The format is load-bearing: the extraction prompt instructs the model to
/// cite page numbers read from these lines, and tests re-split excerpts on
/// them.
pub fn page_marker(page_number: usize) -> String {
    format!("--- PAGE {page_number} ---")
}

/// Concatenate the pages of `range` with marker lines, then normalize
/// whitespace: runs of spaces/tabs collapse to one space, 3+ consecutive
/// newlines collapse to two, carriage returns are dropped, result trimmed.
pub fn assemble_excerpt(pages: &[String], range: PageRange) -> String {
    assert!(
        range.start <= range.end && range.end < pages.len(),
        "malformed page range {}..={} for {} pages",
        range.start,
        range.end,
        pages.len()
    );
    let mut raw = String::new();
    for i in range.start..=range.end {
        raw.push('\n');
        raw.push_str(&page_marker(i + 1));
        raw.push('\n');
        raw.push_str(&pages[i]);
        raw.push('\n');
    }
    collapse_whitespace(&raw)
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().filter(|&c| c != '\r').peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {
                while matches!(chars.peek(), Some(' ' | '\t')) {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' => {
                let mut run = 1usize;
                while matches!(chars.peek(), Some('\n')) {
                    chars.next();
                    run += 1;
                }
                out.push('\n');
                if run >= 2 {
                    out.push('\n');
                }
            }
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}

/// Detection knobs, passed in explicitly (no process-global configuration).
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Marker terms; regex fragments matched case-insensitively, word-bounded.
    pub marker_terms: Vec<String>,
    /// Max non-hit pages tolerated between two hits inside one cluster.
    pub gap: usize,
    /// Trailing pages appended to each detected range.
    pub pad_after: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            marker_terms: DEFAULT_MARKER_TERMS.iter().map(|s| s.to_string()).collect(),
            gap: 1,
            pad_after: 2,
        }
    }
}

/// One selected excerpt: the padded range and its assembled text.
#[derive(Debug, Clone)]
pub struct SelectedExcerpt {
    pub range: PageRange,
    pub text: String,
}

/// Runs score -> cluster -> expand -> assemble over a document's pages.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    lexicon: MarkerLexicon,
    gap: usize,
    pad_after: usize,
}

impl BoundaryDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        Ok(Self {
            lexicon: MarkerLexicon::new(&config.marker_terms)?,
            gap: config.gap,
            pad_after: config.pad_after,
        })
    }

    /// All padded candidate ranges, in ascending page order.
    pub fn detect_ranges(&self, pages: &[String]) -> Vec<PageRange> {
        let hits = score_pages(&self.lexicon, pages);
        let clustered = cluster_ranges(&hits, self.gap);
        expand_ranges(&clustered, pages.len(), self.pad_after)
    }

    /// Select the first candidate range and assemble its excerpt.
    ///
    /// First-candidate-wins is a deliberate simplification: a document with
    /// several distinct rate schedules on non-adjacent pages only has its
    /// first detected range extracted. Callers needing more can use
    /// [`detect_ranges`](Self::detect_ranges) and assemble per range.
    pub fn select_excerpt(&self, pages: &[String]) -> Result<SelectedExcerpt> {
        let ranges = self.detect_ranges(pages);
        let Some(&range) = ranges.first() else {
            return Err(Error::NoCandidateRange);
        };
        log::info!("using page range {}-{}", range.start + 1, range.end + 1);
        Ok(SelectedExcerpt {
            range,
            text: assemble_excerpt(pages, range),
        })
    }
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self {
            lexicon: MarkerLexicon::default(),
            gap: 1,
            pad_after: 2,
        }
    }
}
