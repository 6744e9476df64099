//! Agent configuration with sensible defaults.
//!
//! [`AgentConfig`] controls credentials, result counts, timeouts, the
//! rate-limit ceiling, extraction concurrency, and the LLM capability
//! endpoint. Use [`Default::default()`] plus field overrides, or
//! [`AgentConfig::from_env`] to pick up credentials from the environment.

use std::env;

use crate::error::AgentError;
use crate::types::{SearchKind, MAX_RESULT_COUNT, MIN_RESULT_COUNT};

/// Primary search credential environment variable.
pub const ENV_API_KEY: &str = "SERPER_API_KEY";
/// Fallback credential environment variables, checked in order.
pub const ENV_FALLBACK_KEYS: &[&str] = &[
    "SERPER_API_KEY_FALLBACK",
    "SERPER_SECONDARY_API_KEY",
    "SERPER_API_KEY_2",
];
/// LLM capability endpoint override.
pub const ENV_LLM_ENDPOINT: &str = "WEBANSWER_LLM_ENDPOINT";

/// Configuration for a web search agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Primary search API key.
    pub primary_api_key: String,
    /// Optional fallback key, tried once after an auth/quota failure.
    pub fallback_api_key: Option<String>,
    /// Results requested per run when the caller does not override.
    pub default_result_count: usize,
    /// Endpoint targeted per run when the caller does not override.
    pub default_kind: SearchKind,
    /// Search API admissions allowed per window.
    pub rate_limit_ceiling: u32,
    /// Rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,
    /// Search API request timeout in seconds.
    pub search_timeout_secs: u64,
    /// Per-page fetch timeout in seconds for content extraction.
    pub fetch_timeout_secs: u64,
    /// Maximum extraction fetches in flight at once.
    pub max_concurrent_fetches: usize,
    /// How long to cache raw provider results in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
    /// Custom User-Agent for page fetches. If `None`, rotates through a
    /// built-in list of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Provider geographic bias: free-form location name.
    pub location: String,
    /// Provider country code (`gl`).
    pub country: String,
    /// Provider language code (`hl`).
    pub language: String,
    /// Base URL of the LLM pipe execution service.
    pub llm_endpoint: String,
    /// LLM pipe request timeout in seconds.
    pub llm_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            primary_api_key: String::new(),
            fallback_api_key: None,
            default_result_count: 4,
            default_kind: SearchKind::General,
            rate_limit_ceiling: 360,
            rate_limit_window_secs: 3600,
            search_timeout_secs: 15,
            fetch_timeout_secs: 8,
            max_concurrent_fetches: 6,
            cache_ttl_seconds: 600,
            user_agent: None,
            location: "France".into(),
            country: "fr".into(),
            language: "fr".into(),
            llm_endpoint: "http://127.0.0.1:8378/pipes".into(),
            llm_timeout_secs: 60,
        }
    }
}

impl AgentConfig {
    /// Build a config from environment variables, keeping defaults for
    /// everything not set.
    ///
    /// Reads the primary key from `SERPER_API_KEY` and the fallback from the
    /// first non-empty of `SERPER_API_KEY_FALLBACK`, `SERPER_SECONDARY_API_KEY`,
    /// `SERPER_API_KEY_2`. A fallback equal to the primary is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if no primary key is configured.
    pub fn from_env() -> Result<Self, AgentError> {
        let primary = env::var(ENV_API_KEY).unwrap_or_default();
        if primary.trim().is_empty() {
            return Err(AgentError::Config(format!(
                "no search API key configured, set {ENV_API_KEY}"
            )));
        }

        let fallback = ENV_FALLBACK_KEYS
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.trim().is_empty() && *value != primary);

        let mut config = Self {
            primary_api_key: primary,
            fallback_api_key: fallback,
            ..Default::default()
        };
        if let Ok(endpoint) = env::var(ENV_LLM_ENDPOINT) {
            if !endpoint.trim().is_empty() {
                config.llm_endpoint = endpoint;
            }
        }
        Ok(config)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `primary_api_key` must be non-empty
    /// - `default_result_count` must be within `[1, 20]`
    /// - `rate_limit_ceiling` must be greater than 0
    /// - timeouts must be greater than 0
    /// - `max_concurrent_fetches` must be greater than 0
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.primary_api_key.trim().is_empty() {
            return Err(AgentError::Config("primary_api_key must be set".into()));
        }
        if self.default_result_count < MIN_RESULT_COUNT
            || self.default_result_count > MAX_RESULT_COUNT
        {
            return Err(AgentError::Config(format!(
                "default_result_count must be within [{MIN_RESULT_COUNT}, {MAX_RESULT_COUNT}]"
            )));
        }
        if self.rate_limit_ceiling == 0 {
            return Err(AgentError::Config(
                "rate_limit_ceiling must be greater than 0".into(),
            ));
        }
        if self.search_timeout_secs == 0 || self.fetch_timeout_secs == 0 {
            return Err(AgentError::Config(
                "timeouts must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(AgentError::Config(
                "max_concurrent_fetches must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
