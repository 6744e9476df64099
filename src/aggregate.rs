//! Structured result aggregation: match extractions to raw results,
//! drop unusable entries, trim to the requested count.
//!
//! Provider ranking order is preserved; a result is dropped only when it
//! has neither extracted text nor a snippet. Ranks are recomputed 1-based
//! over the kept results, and later provider results backfill slots freed
//! by dropped ones until the limit is reached or the input is exhausted.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::types::{ExtractedContent, RawResult, SearchQuery, SearchResponse, StructuredResult};

/// Date formats the provider has been observed to use for news results.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%d %b %Y"];

/// Best-effort parse of a provider date string.
///
/// Relative phrasings like "2 hours ago" are left unparsed rather than
/// anchored to the current clock, so identical inputs always aggregate
/// identically.
pub(crate) fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Build a [`SearchResponse`] from raw results and their extractions.
///
/// Walks `raw` in provider order. Content per result is the extracted
/// text when present, else the snippet; results with neither are dropped
/// and the remainder re-ranked. Stops once `query.result_count()`
/// structured results exist — fewer is valid, never an error.
pub fn aggregate(
    query: SearchQuery,
    raw: Vec<RawResult>,
    extracted: &HashMap<String, ExtractedContent>,
) -> SearchResponse {
    let limit = query.result_count();
    let total = raw.len();

    let extracted_count = raw
        .iter()
        .filter(|item| {
            extracted
                .get(&item.url)
                .and_then(|e| e.text.as_deref())
                .is_some_and(|t| !t.trim().is_empty())
        })
        .count();

    let mut results: Vec<StructuredResult> = Vec::with_capacity(limit.min(total));
    for item in raw {
        if results.len() == limit {
            break;
        }

        let text = extracted
            .get(&item.url)
            .and_then(|e| e.text.as_deref())
            .filter(|t| !t.trim().is_empty());

        let content = match text {
            Some(text) => text.to_owned(),
            None if !item.snippet.trim().is_empty() => item.snippet.clone(),
            None => {
                tracing::debug!(url = item.url, "dropping result with no usable content");
                continue;
            }
        };

        results.push(StructuredResult {
            title: item.title,
            url: item.url,
            domain: item.domain,
            content,
            published_at: item.published.as_deref().and_then(parse_published),
            rank: results.len() + 1,
        });
    }

    let result_summary = format!(
        "Extracted content from {extracted_count} of {total} {} results for query: '{}'",
        query.kind(),
        query.text()
    );
    tracing::debug!(
        kept = results.len(),
        total,
        extracted_count,
        "aggregation complete"
    );

    SearchResponse {
        query,
        results,
        result_summary,
        extracted_count,
    }
}
