//! Search API credential management with one-shot fallback.
//!
//! [`KeyProvider`] holds a primary and optional fallback credential. When
//! the search client reports an authentication or quota failure on the
//! active key, the provider switches to the fallback exactly once; a
//! second failure, or a missing fallback, exhausts the run.

use std::fmt;
use std::sync::Mutex;

use crate::error::AgentError;

/// A search API credential. The value is redacted from `Debug` output so
/// keys cannot leak through logs or error formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw key value, for request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(…)")
    }
}

/// Which credential is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Primary,
    Fallback,
}

#[derive(Debug)]
struct KeyState {
    active: Active,
    exhausted: bool,
}

/// Primary/fallback credential holder shared across a run.
#[derive(Debug)]
pub struct KeyProvider {
    primary: ApiKey,
    fallback: Option<ApiKey>,
    state: Mutex<KeyState>,
}

impl KeyProvider {
    /// Build a provider from a primary key and optional fallback.
    ///
    /// A fallback identical to the primary is dropped: retrying the same
    /// rejected credential cannot succeed.
    pub fn new(primary: ApiKey, fallback: Option<ApiKey>) -> Self {
        let fallback = fallback.filter(|fb| *fb != primary);
        Self {
            primary,
            fallback,
            state: Mutex::new(KeyState {
                active: Active::Primary,
                exhausted: false,
            }),
        }
    }

    /// The credential the next search call should use.
    pub fn current(&self) -> ApiKey {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.active {
            Active::Primary => self.primary.clone(),
            // Fallback is only ever activated when present.
            Active::Fallback => self
                .fallback
                .clone()
                .unwrap_or_else(|| self.primary.clone()),
        }
    }

    /// Report an auth/quota failure on `failed` and obtain the next
    /// credential to try.
    ///
    /// Switches primary→fallback exactly once. Returns
    /// [`AgentError::AllKeysExhausted`] when the fallback has already been
    /// tried or none is configured.
    ///
    /// # Errors
    ///
    /// [`AgentError::AllKeysExhausted`] — fatal for the run.
    pub fn report_failure(&self, failed: &ApiKey) -> Result<ApiKey, AgentError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.exhausted {
            return Err(AgentError::AllKeysExhausted);
        }

        match (&state.active, &self.fallback) {
            (Active::Primary, Some(fallback)) if *failed == self.primary => {
                tracing::warn!("primary search key rejected, switching to fallback");
                state.active = Active::Fallback;
                Ok(fallback.clone())
            }
            _ => {
                state.exhausted = true;
                tracing::warn!("no further search keys available");
                Err(AgentError::AllKeysExhausted)
            }
        }
    }
}
