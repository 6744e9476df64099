//! Error types for the webanswer crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. API keys never appear in error messages.

/// Classified failure from the search provider API.
///
/// The classification drives the retry/fallback policy: credential errors
/// trigger a one-time key switch, network errors are retried with backoff,
/// and malformed responses abort immediately (they indicate a provider
/// contract change, not a transient condition).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchApiError {
    /// The provider rejected the credential (HTTP 401/403).
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The credential's quota is exhausted (HTTP 402/429).
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Transport failure, timeout, or provider-side 5xx.
    #[error("network failure: {0}")]
    Network(String),

    /// The provider returned a payload the wire schema cannot decode.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl SearchApiError {
    /// Stable lowercase name of this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Quota(_) => "quota",
            Self::Network(_) => "network",
            Self::Malformed(_) => "malformed",
        }
    }

    /// True for auth/quota failures, which warrant a key switch.
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Quota(_))
    }

    /// True for failures worth retrying on the same key.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Errors that abort a pipeline run.
///
/// Extraction and aggregation degradations are absorbed into output quality
/// and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Admission control denied the search call before any network traffic.
    #[error("rate limit exceeded, retry in {retry_after_secs}s (limit: {limit} requests per window)")]
    RateLimited {
        /// Estimated seconds until the current window rolls over.
        retry_after_secs: u64,
        /// The configured admission ceiling.
        limit: u32,
    },

    /// A search API call failed after retries and key fallback were spent.
    #[error("search request failed: {0}")]
    Search(#[from] SearchApiError),

    /// The fallback credential also failed, or none was configured.
    #[error("all search API keys exhausted")]
    AllKeysExhausted,

    /// The LLM capability reported a provider error. No local recovery.
    #[error("LLM capability error: {0}")]
    Llm(String),

    /// The overall run was cancelled; distinct from ordinary failure.
    #[error("run cancelled: {0}")]
    Cancelled(String),

    /// Invalid agent configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for webanswer results.
pub type Result<T> = std::result::Result<T, AgentError>;
