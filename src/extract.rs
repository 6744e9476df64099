//! Per-URL content extraction with bounded concurrent fan-out.
//!
//! Each result URL is fetched with a bounded timeout and handed to the
//! HTML extractor. Every failure mode degrades to an [`ExtractedContent`]
//! with an absent text and a status — extraction never fails a run, even
//! when all URLs fail.

use std::collections::HashMap;

use futures::StreamExt;

use crate::config::AgentConfig;
use crate::content;
use crate::error::AgentError;
use crate::http;
use crate::types::{ExtractedContent, ExtractionStatus};

/// How much of the body is sniffed for an `<html` marker when the
/// Content-Type header is absent or unhelpful.
const SNIFF_BYTES: usize = 1000;

/// A content extraction backend.
///
/// Implementors turn one URL into a terminal [`ExtractedContent`]; the
/// outcome is always a value, never an error. Must be `Send + Sync` for
/// concurrent fan-out.
pub trait ExtractContent: Send + Sync {
    /// Fetch and extract one URL.
    fn extract(&self, url: &str) -> impl std::future::Future<Output = ExtractedContent> + Send;
}

/// True when the response plausibly carries an HTML document.
pub(crate) fn looks_like_html(content_type: &str, body: &str) -> bool {
    if content_type.to_lowercase().contains("text/html") {
        return true;
    }
    let head_len = body
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= SNIFF_BYTES)
        .last()
        .unwrap_or(0);
    body[..head_len].to_lowercase().contains("<html")
}

/// HTTP-backed extractor using the shared fetch client.
pub struct HttpContentExtractor {
    client: reqwest::Client,
}

impl HttpContentExtractor {
    /// Build an extractor from agent configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the fetch client cannot be built.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        Ok(Self {
            client: http::build_fetch_client(config)?,
        })
    }
}

impl ExtractContent for HttpContentExtractor {
    async fn extract(&self, url: &str) -> ExtractedContent {
        let response = match self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7")
            .header("Referer", "https://www.google.com")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url, error = %e, "page fetch failed");
                return ExtractedContent::failed(url, ExtractionStatus::FetchFailed);
            }
        };

        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "page fetch bad status");
            return ExtractedContent::failed(url, ExtractionStatus::FetchFailed);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url, error = %e, "page body read failed");
                return ExtractedContent::failed(url, ExtractionStatus::FetchFailed);
            }
        };

        if !looks_like_html(&content_type, &body) {
            tracing::debug!(url, content_type, "non-HTML body skipped");
            return ExtractedContent::failed(url, ExtractionStatus::Skipped);
        }

        match content::readable_text(&body) {
            Some(text) => {
                tracing::debug!(url, chars = text.len(), "content extracted");
                ExtractedContent::ok(url, text)
            }
            None => ExtractedContent::failed(url, ExtractionStatus::Empty),
        }
    }
}

/// Extract all URLs with at most `max_in_flight` fetches at once.
///
/// Results are joined back by URL, so completion order never affects the
/// final ranking derived later from provider order.
pub async fn extract_all<E: ExtractContent>(
    extractor: &E,
    urls: &[String],
    max_in_flight: usize,
) -> HashMap<String, ExtractedContent> {
    let fetches = urls.iter().map(|url| {
        let url = url.clone();
        async move {
            let outcome = extractor.extract(&url).await;
            (url, outcome)
        }
    });

    futures::stream::iter(fetches)
        .buffer_unordered(max_in_flight.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect()
}
