//! # webanswer
//!
//! Answer a natural-language question from the live web: optimise the
//! question into a search query, run it against a search provider, extract
//! readable content from the result pages, and synthesize a cited,
//! confidence-rated answer.
//!
//! ## Design
//!
//! - One linear pipeline per run: optimise → search → extract/aggregate →
//!   synthesize; no stage calls back into an earlier one
//! - Admission-controlled provider calls with primary/fallback credentials,
//!   bounded network backoff, and a one-shot key switch on auth/quota failure
//! - Concurrent bounded page fetches joined back by URL; extraction failures
//!   degrade to provider snippets instead of failing the run
//! - LLM work crosses a trait boundary (named pipe + input mapping → typed
//!   output); the execution engine is an external collaborator
//! - In-memory TTL cache for raw provider results
//!
//! ## Security
//!
//! - API keys are redacted from `Debug` output and never appear in errors
//! - Queries are logged only at trace/debug level
//!
//! ## Examples
//!
//! ```no_run
//! # async fn example() -> webanswer::Result<()> {
//! let config = webanswer::AgentConfig::from_env()?;
//! let answer = webanswer::answer("What is artificial intelligence?", &config).await?;
//! println!("{} (confidence: {})", answer.comprehensive_answer, answer.confidence_level);
//! for source in &answer.sources {
//!     println!("  {source}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod extract;
pub mod http;
pub mod keys;
pub mod llm;
pub mod orchestrator;
pub mod rate_limit;
pub mod search_api;
pub mod serper;
pub mod types;

pub use config::AgentConfig;
pub use error::{AgentError, Result, SearchApiError};
pub use extract::{ExtractContent, HttpContentExtractor};
pub use keys::{ApiKey, KeyProvider};
pub use llm::{HttpPipeRunner, LlmRunner};
pub use orchestrator::pipeline::{HttpWebSearchAgent, Stage, WebSearchAgent};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use search_api::SearchApi;
pub use serper::SerperClient;
pub use types::{
    AgentResponse, ConfidenceLevel, ExtractedContent, ExtractionStatus, RawResult, SearchKind,
    SearchQuery, SearchResponse, StructuredResult,
};

/// Answer a question using a fully HTTP-backed agent built from `config`.
///
/// Convenience wrapper that assembles an [`HttpWebSearchAgent`] per call;
/// hold an agent yourself to share its rate limiter across runs.
///
/// # Errors
///
/// Returns [`AgentError::Config`] for invalid configuration, plus every
/// fatal run error of [`WebSearchAgent::run`].
pub async fn answer(user_query: &str, config: &AgentConfig) -> Result<AgentResponse> {
    let agent = HttpWebSearchAgent::from_config(config.clone())?;
    agent.run(user_query).await
}

/// Answer a question with configuration picked up from the environment.
///
/// # Errors
///
/// Same as [`answer`], plus [`AgentError::Config`] when no primary API key
/// is set.
pub async fn answer_from_env(user_query: &str) -> Result<AgentResponse> {
    answer(user_query, &AgentConfig::from_env()?).await
}
