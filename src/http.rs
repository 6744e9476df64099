//! Shared HTTP clients for the search API and page fetching.
//!
//! The API client is a plain JSON client with the search timeout. The
//! fetch client presents browser-like headers, a cookie store, and a
//! rotating User-Agent so content fetches are less likely to hit 403s.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::config::AgentConfig;
use crate::error::AgentError;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build the JSON client used for search API requests.
///
/// # Errors
///
/// Returns [`AgentError::Config`] if the client cannot be constructed.
pub fn build_api_client(config: &AgentConfig) -> Result<reqwest::Client, AgentError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.search_timeout_secs))
        .build()
        .map_err(|e| AgentError::Config(format!("failed to build API client: {e}")))
}

/// Build the client used to fetch result pages for extraction.
///
/// The client has:
/// - Cookie store enabled (consent walls, session redirects)
/// - Per-fetch timeout from config
/// - Random User-Agent from the rotation list (or custom if configured)
/// - Browser-like `Accept` headers set per request by the extractor
///
/// # Errors
///
/// Returns [`AgentError::Config`] if the client cannot be constructed.
pub fn build_fetch_client(config: &AgentConfig) -> Result<reqwest::Client, AgentError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| AgentError::Config(format!("failed to build fetch client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
