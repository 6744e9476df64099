//! Serper search provider client — typed wire schema and error classification.
//!
//! Issues a single POST per call against the `/search` or `/news` endpoint
//! with the credential in the `X-API-KEY` header. The provider's JSON
//! payload is decoded at this boundary into [`RawResult`] records;
//! undecodable shapes are classified as `malformed` rather than being
//! propagated untyped downstream.

use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;
use crate::error::{AgentError, SearchApiError};
use crate::http;
use crate::keys::ApiKey;
use crate::search_api::SearchApi;
use crate::types::{RawResult, SearchKind, SearchQuery};

/// General web search endpoint.
pub const SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
/// News search endpoint.
pub const NEWS_ENDPOINT: &str = "https://google.serper.dev/news";

/// Request payload for both endpoints.
#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
    location: &'a str,
    gl: &'a str,
    hl: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
}

/// Top-level provider response. General results arrive under `organic`,
/// news results under `news`; the unrequested array stays empty.
#[derive(Debug, Deserialize)]
struct SerperEnvelope {
    #[serde(default)]
    organic: Vec<SerperItem>,
    #[serde(default)]
    news: Vec<SerperItem>,
}

/// One candidate result as the provider reports it.
#[derive(Debug, Deserialize)]
struct SerperItem {
    #[serde(default)]
    title: String,
    link: Option<String>,
    #[serde(default)]
    snippet: String,
    date: Option<String>,
    source: Option<String>,
}

/// Host of `link` with a leading `www.` stripped; empty when unparseable.
pub(crate) fn domain_of(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_owned()))
        .map(|host| host.strip_prefix("www.").unwrap_or(&host).to_owned())
        .unwrap_or_default()
}

/// Classify a non-200 provider status into an error kind.
pub(crate) fn classify_status(status: u16) -> SearchApiError {
    let message = format!("provider returned status {status}");
    match status {
        401 | 403 => SearchApiError::Auth(message),
        402 | 429 => SearchApiError::Quota(message),
        500..=599 => SearchApiError::Network(message),
        // 400/404/422 and friends mean the request shape no longer matches
        // what the provider expects.
        _ => SearchApiError::Malformed(message),
    }
}

/// Decode a 200 body into raw results for the requested kind.
///
/// Items without a link are dropped. An empty result array is valid and
/// decodes to an empty vector, not an error.
///
/// # Errors
///
/// [`SearchApiError::Malformed`] when the body is not the expected JSON shape.
pub(crate) fn parse_results(
    body: &str,
    kind: SearchKind,
) -> Result<Vec<RawResult>, SearchApiError> {
    let envelope: SerperEnvelope = serde_json::from_str(body)
        .map_err(|e| SearchApiError::Malformed(format!("undecodable response body: {e}")))?;

    let items = match kind {
        SearchKind::General => envelope.organic,
        SearchKind::News => envelope.news,
    };

    let results = items
        .into_iter()
        .filter_map(|item| {
            let link = item.link?;
            let domain = domain_of(&link);
            Some(RawResult {
                title: item.title,
                url: link,
                snippet: item.snippet,
                domain,
                published: item.date.filter(|d| !d.trim().is_empty()),
                source: item.source.filter(|s| !s.trim().is_empty()),
            })
        })
        .collect();

    Ok(results)
}

/// HTTP client for the Serper provider.
pub struct SerperClient {
    client: reqwest::Client,
    search_endpoint: String,
    news_endpoint: String,
    location: String,
    country: String,
    language: String,
}

impl SerperClient {
    /// Build a client from agent configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        Ok(Self {
            client: http::build_api_client(config)?,
            search_endpoint: SEARCH_ENDPOINT.to_owned(),
            news_endpoint: NEWS_ENDPOINT.to_owned(),
            location: config.location.clone(),
            country: config.country.clone(),
            language: config.language.clone(),
        })
    }

    /// Override both endpoints, for pointing at a local test server.
    pub fn with_endpoints(mut self, search: impl Into<String>, news: impl Into<String>) -> Self {
        self.search_endpoint = search.into();
        self.news_endpoint = news.into();
        self
    }

    fn endpoint_for(&self, kind: SearchKind) -> &str {
        match kind {
            SearchKind::General => &self.search_endpoint,
            SearchKind::News => &self.news_endpoint,
        }
    }
}

impl SearchApi for SerperClient {
    async fn execute(
        &self,
        query: &SearchQuery,
        key: &ApiKey,
    ) -> Result<Vec<RawResult>, SearchApiError> {
        let payload = SerperRequest {
            q: query.text(),
            num: query.result_count(),
            location: &self.location,
            gl: &self.country,
            hl: &self.language,
            kind: matches!(query.kind(), SearchKind::News).then_some("news"),
            page: matches!(query.kind(), SearchKind::News).then_some(1),
        };

        tracing::trace!(query = query.text(), kind = %query.kind(), "search request");

        let response = self
            .client
            .post(self.endpoint_for(query.kind()))
            .header("X-API-KEY", key.expose())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SearchApiError::Network(format!("search request failed: {e}")))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(classify_status(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchApiError::Network(format!("response read failed: {e}")))?;

        let results = parse_results(&body, query.kind())?;
        tracing::debug!(count = results.len(), "provider results parsed");
        Ok(results)
    }
}
