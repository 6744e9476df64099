//! The linear run state machine: optimise → search → extract/aggregate →
//! synthesize.
//!
//! A run moves strictly forward through [`Stage`]s; no stage calls back
//! into an earlier one. Only the search stage can fail the run (exhausted
//! retries or keys) besides the LLM capability itself; extraction and
//! aggregation degrade into output quality instead. The orchestrator owns
//! no state beyond the in-flight entities of the current run.

use std::fmt;
use std::time::Duration;

use crate::aggregate;
use crate::cache;
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::extract::{self, ExtractContent, HttpContentExtractor};
use crate::keys::{ApiKey, KeyProvider};
use crate::llm::{self, HttpPipeRunner, LlmRunner};
use crate::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::search_api::SearchApi;
use crate::serper::SerperClient;
use crate::types::{AgentResponse, RawResult, SearchKind, SearchQuery};

use super::retry;

/// Pipeline run stages, in order. `Failed` is terminal and reachable only
/// through a fatal search or LLM capability error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    QueryOptimized,
    Searched,
    Aggregated,
    Answered,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::QueryOptimized => "query_optimized",
            Self::Searched => "searched",
            Self::Aggregated => "aggregated",
            Self::Answered => "answered",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The web search agent: owns the pipeline's components and runs queries
/// through them.
///
/// Generic over the search backend, content extractor, and LLM runner so
/// tests can substitute scripted implementations. The rate limiter inside
/// is shared by every run on the same agent.
pub struct WebSearchAgent<S, E, L> {
    config: AgentConfig,
    limiter: RateLimiter,
    keys: KeyProvider,
    search: S,
    extractor: E,
    llm: L,
}

/// Agent wired to the real provider, fetcher, and pipe service.
pub type HttpWebSearchAgent = WebSearchAgent<SerperClient, HttpContentExtractor, HttpPipeRunner>;

impl HttpWebSearchAgent {
    /// Build a fully HTTP-backed agent from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for invalid configuration or HTTP
    /// client construction failure.
    pub fn from_config(config: AgentConfig) -> Result<Self> {
        let search = SerperClient::new(&config)?;
        let extractor = HttpContentExtractor::new(&config)?;
        let llm = HttpPipeRunner::new(&config)?;
        Self::new(config, search, extractor, llm)
    }
}

impl<S, E, L> WebSearchAgent<S, E, L>
where
    S: SearchApi,
    E: ExtractContent,
    L: LlmRunner,
{
    /// Assemble an agent from explicit components.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] when the configuration is invalid.
    pub fn new(config: AgentConfig, search: S, extractor: E, llm: L) -> Result<Self> {
        config.validate()?;
        let limiter = RateLimiter::new(RateLimiterConfig {
            ceiling: config.rate_limit_ceiling,
            window: Duration::from_secs(config.rate_limit_window_secs),
        });
        let keys = KeyProvider::new(
            ApiKey::new(config.primary_api_key.clone()),
            config.fallback_api_key.as_deref().map(ApiKey::new),
        );
        Ok(Self {
            config,
            limiter,
            keys,
            search,
            extractor,
            llm,
        })
    }

    /// Answer `user_query` with the configured default kind and count.
    ///
    /// # Errors
    ///
    /// See [`run_with_query`](Self::run_with_query).
    pub async fn run(&self, user_query: &str) -> Result<AgentResponse> {
        self.run_with_query(
            user_query,
            self.config.default_kind,
            self.config.default_result_count,
        )
        .await
    }

    /// Answer `user_query`, searching `kind` for up to `result_count`
    /// results.
    ///
    /// # Errors
    ///
    /// - [`AgentError::RateLimited`] when admission control denies the call
    /// - [`AgentError::AllKeysExhausted`] / [`AgentError::Search`] when the
    ///   search stage fails terminally
    /// - [`AgentError::Llm`] when a pipe invocation fails
    pub async fn run_with_query(
        &self,
        user_query: &str,
        kind: SearchKind,
        result_count: usize,
    ) -> Result<AgentResponse> {
        tracing::debug!(stage = %Stage::Start, user_query, "pipeline run starting");

        let optimized = llm::optimize(&self.llm, user_query).await?;
        let query = SearchQuery::new(optimized, kind, result_count);
        tracing::debug!(stage = %Stage::QueryOptimized, query = query.text());

        let raw = match self.search_raw(&query).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(stage = %Stage::Failed, error = %err, "search stage failed");
                return Err(err);
            }
        };
        tracing::debug!(stage = %Stage::Searched, count = raw.len());

        let urls: Vec<String> = raw.iter().map(|r| r.url.clone()).collect();
        let extracted =
            extract::extract_all(&self.extractor, &urls, self.config.max_concurrent_fetches).await;
        let response = aggregate::aggregate(query, raw, &extracted);
        tracing::debug!(stage = %Stage::Aggregated, kept = response.results.len());

        let answer = llm::synthesize(&self.llm, user_query, &response).await?;
        tracing::debug!(stage = %Stage::Answered, confidence = %answer.confidence_level);

        tracing::debug!(stage = %Stage::Done, sources = answer.sources.len());
        Ok(answer)
    }

    /// Like [`run`](Self::run), but bounded by an overall deadline.
    ///
    /// Exceeding the deadline abandons in-flight work and reports
    /// [`AgentError::Cancelled`], distinct from ordinary failure.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run), plus [`AgentError::Cancelled`].
    pub async fn run_with_timeout(
        &self,
        user_query: &str,
        deadline: Duration,
    ) -> Result<AgentResponse> {
        match tokio::time::timeout(deadline, self.run(user_query)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Cancelled(format!(
                "deadline of {:.1}s elapsed",
                deadline.as_secs_f64()
            ))),
        }
    }

    /// Fetch raw results, through the cache when caching is enabled.
    async fn search_raw(&self, query: &SearchQuery) -> Result<Vec<RawResult>> {
        let ttl = self.config.cache_ttl_seconds;
        if ttl == 0 {
            return retry::run_search(&self.search, &self.keys, &self.limiter, query).await;
        }

        let cache_key = cache::CacheKey::for_query(query);
        if let Some(cached) = cache::get(&cache_key, ttl).await {
            tracing::debug!(query = query.text(), "raw results served from cache");
            return Ok(cached);
        }

        let raw = retry::run_search(&self.search, &self.keys, &self.limiter, query).await?;
        cache::insert(cache_key, raw.clone(), ttl).await;
        Ok(raw)
    }
}
