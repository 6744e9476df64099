//! Per-call retry/fallback driver for search API requests.
//!
//! Retry limits and fallback-once semantics are enforced structurally by
//! a small state machine rather than ad hoc counters:
//!
//! ```text
//! Attempting ──network error──► RetryingNetwork ──backoff──► Attempting
//!     │                                                          ▲
//!     ├──auth/quota error──► SwitchingKey ──────────────────────┘
//!     │
//!     └──► Succeeded | Failed
//! ```
//!
//! Admission control gates every network attempt; a denial fails the call
//! immediately without touching the network. Network errors back off
//! exponentially for up to [`MAX_NETWORK_RETRIES`] re-attempts per key;
//! auth/quota failures switch to the fallback credential exactly once;
//! malformed responses abort with no retry.

use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::keys::{ApiKey, KeyProvider};
use crate::rate_limit::RateLimiter;
use crate::search_api::SearchApi;
use crate::types::{RawResult, SearchQuery};

/// Admission key shared by all search calls in the process.
pub const ADMISSION_KEY: &str = "global";

/// Network re-attempts allowed per credential.
pub const MAX_NETWORK_RETRIES: u32 = 2;

/// First backoff delay; doubles per retry.
const BACKOFF_BASE_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    /// Ready to issue an attempt with the active credential.
    Attempting { network_retries: u32 },
    /// Backing off before re-attempting after a network failure.
    RetryingNetwork { network_retries: u32 },
    /// Resolving a credential failure through the key provider.
    SwitchingKey,
}

/// Execute a search call to completion under the retry/fallback policy.
///
/// # Errors
///
/// - [`AgentError::RateLimited`] when admission is denied
/// - [`AgentError::AllKeysExhausted`] when the fallback key also fails or
///   none is configured
/// - [`AgentError::Search`] for exhausted network retries or a malformed
///   provider response
pub async fn run_search<S: SearchApi>(
    api: &S,
    keys: &KeyProvider,
    limiter: &RateLimiter,
    query: &SearchQuery,
) -> Result<Vec<RawResult>> {
    let mut key: ApiKey = keys.current();
    let mut state = CallState::Attempting { network_retries: 0 };

    loop {
        match state {
            CallState::Attempting { network_retries } => {
                if !limiter.admit(ADMISSION_KEY) {
                    return Err(AgentError::RateLimited {
                        retry_after_secs: limiter.retry_after(ADMISSION_KEY).as_secs(),
                        limit: limiter.ceiling(),
                    });
                }

                match api.execute(query, &key).await {
                    Ok(results) => return Ok(results),
                    Err(err) if err.is_retryable() => {
                        if network_retries >= MAX_NETWORK_RETRIES {
                            tracing::warn!(error = %err, "network retries exhausted");
                            return Err(err.into());
                        }
                        tracing::warn!(
                            error = %err,
                            attempt = network_retries + 1,
                            "network failure, backing off"
                        );
                        state = CallState::RetryingNetwork { network_retries };
                    }
                    Err(err) if err.is_credential() => {
                        tracing::warn!(kind = err.kind(), "credential rejected by provider");
                        state = CallState::SwitchingKey;
                    }
                    Err(err) => {
                        // Malformed: the provider contract changed, retrying
                        // cannot help.
                        tracing::warn!(error = %err, "non-retryable search failure");
                        return Err(err.into());
                    }
                }
            }
            CallState::RetryingNetwork { network_retries } => {
                let delay = Duration::from_millis(BACKOFF_BASE_MS << network_retries);
                tokio::time::sleep(delay).await;
                state = CallState::Attempting {
                    network_retries: network_retries + 1,
                };
            }
            CallState::SwitchingKey => {
                key = keys.report_failure(&key)?;
                state = CallState::Attempting { network_retries: 0 };
            }
        }
    }
}
