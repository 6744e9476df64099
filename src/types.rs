//! Core types flowing through the search-and-synthesis pipeline.
//!
//! Each entity is owned by the stage that produces it and handed to the
//! next stage by value; nothing is mutated after handoff.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive bounds for the number of results a query may request.
pub const MIN_RESULT_COUNT: usize = 1;
/// Upper bound mirrors the provider's per-request maximum.
pub const MAX_RESULT_COUNT: usize = 20;

/// Which provider endpoint a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchKind {
    /// General web search — diverse, relevant content from various sources.
    General,
    /// Fresh news articles and breaking stories.
    News,
}

impl SearchKind {
    /// Wire name used in provider payloads and user-facing summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "search",
            Self::News => "news",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable search request, constructed once per pipeline run.
///
/// `result_count` is clamped to `[MIN_RESULT_COUNT, MAX_RESULT_COUNT]` at
/// construction; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    text: String,
    kind: SearchKind,
    result_count: usize,
}

impl SearchQuery {
    /// Build a query, clamping `result_count` into the valid range.
    pub fn new(text: impl Into<String>, kind: SearchKind, result_count: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            result_count: result_count.clamp(MIN_RESULT_COUNT, MAX_RESULT_COUNT),
        }
    }

    /// The query text sent to the provider.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// General or news search.
    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    /// Requested number of structured results, already clamped.
    pub fn result_count(&self) -> usize {
        self.result_count
    }
}

/// A provider result record before extraction and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    /// Title of the result page.
    pub title: String,
    /// Link to the result page.
    pub url: String,
    /// Provider-supplied snippet; used as content fallback when
    /// extraction fails.
    pub snippet: String,
    /// Host of `url` with a leading `www.` stripped.
    pub domain: String,
    /// Raw publication date string, news results only.
    pub published: Option<String>,
    /// Publisher name, news results only.
    pub source: Option<String>,
}

/// Terminal outcome of extracting one result URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStatus {
    /// Readable text was extracted.
    Ok,
    /// The page could not be fetched (transport error, timeout, bad status).
    FetchFailed,
    /// The page was fetched but yielded no extractable text.
    Empty,
    /// The body did not look like HTML and was not handed to the extractor.
    Skipped,
}

/// Extraction outcome for one URL. Absent text is a valid terminal state,
/// not an error that halts the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// The URL that was fetched.
    pub url: String,
    /// Cleaned readable text, present only when `status` is `Ok`.
    pub text: Option<String>,
    /// How the extraction ended.
    pub status: ExtractionStatus,
}

impl ExtractedContent {
    /// Outcome with readable text.
    pub fn ok(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: Some(text.into()),
            status: ExtractionStatus::Ok,
        }
    }

    /// Outcome without text.
    pub fn failed(url: impl Into<String>, status: ExtractionStatus) -> Self {
        Self {
            url: url.into(),
            text: None,
            status,
        }
    }
}

/// A search result normalised into the system's own fields, decoupled
/// from the provider's raw schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResult {
    /// Title of the result page.
    pub title: String,
    /// Link to the result page.
    pub url: String,
    /// Host with a leading `www.` stripped.
    pub domain: String,
    /// Extracted main text, or the provider snippet when extraction failed.
    pub content: String,
    /// Best-effort parsed publication time, news results only.
    pub published_at: Option<DateTime<Utc>>,
    /// 1-based position after trimming to the requested count.
    pub rank: usize,
}

/// Aggregated output of one search, owned by the orchestrator for the
/// lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query that produced these results.
    pub query: SearchQuery,
    /// Structured results in provider order, ranks 1..=len.
    pub results: Vec<StructuredResult>,
    /// Human-readable extraction summary.
    pub result_summary: String,
    /// How many raw results yielded extracted page text (the rest ride on
    /// snippet fallback). Drives the confidence clamp in synthesis.
    pub extracted_count: usize,
}

/// Coarse qualitative label reflecting evidentiary strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Weak or no supporting evidence.
    Low,
    /// Partial evidence, e.g. snippet-only sources.
    Medium,
    /// Multiple successfully extracted sources.
    High,
}

impl ConfidenceLevel {
    /// Stable lowercase name matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Final artifact of a pipeline run, immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The user's original question, verbatim.
    pub user_query: String,
    /// Summary of what the web search found.
    pub search_results_summary: String,
    /// Comprehensive answer incorporating the search results.
    pub comprehensive_answer: String,
    /// Source URLs backing the answer.
    pub sources: BTreeSet<String>,
    /// Confidence in the answer.
    pub confidence_level: ConfidenceLevel,
}
