//! Trait definition for the pluggable search provider backend.

use crate::error::SearchApiError;
use crate::keys::ApiKey;
use crate::types::{RawResult, SearchQuery};

/// A search provider backend.
///
/// Implementors issue one search request (general or news) with the given
/// credential and return the provider's raw result records in provider
/// order. Failures are classified into [`SearchApiError`] kinds so the
/// call driver can decide between backoff, key fallback, and aborting.
///
/// Admission control is the driver's responsibility; implementors perform
/// exactly one network attempt per call.
///
/// All implementations must be `Send + Sync` so a run can be moved across
/// executor threads.
pub trait SearchApi: Send + Sync {
    /// Execute one search request against the provider.
    ///
    /// # Errors
    ///
    /// Returns [`SearchApiError`] classified as `auth`, `quota`, `network`,
    /// or `malformed`.
    fn execute(
        &self,
        query: &SearchQuery,
        key: &ApiKey,
    ) -> impl std::future::Future<Output = Result<Vec<RawResult>, SearchApiError>> + Send;
}
