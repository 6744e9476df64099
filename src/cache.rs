//! In-memory TTL cache for raw provider results.
//!
//! Caches the provider's raw records keyed by the normalised query text,
//! search kind, and requested count, so a repeated question within the TTL
//! costs no API admission. Uses [`moka`] for async-friendly caching with
//! automatic eviction. Structured results are rebuilt per run — only the
//! provider round-trip is cached.

use std::sync::OnceLock;
use std::time::Duration;

use moka::future::Cache;

use crate::types::{RawResult, SearchKind, SearchQuery};

/// Maximum number of cached raw result sets.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Global process-wide raw-result cache.
///
/// Lazily initialised on first access. TTL is set when first created
/// and cannot be changed after initialisation.
static CACHE: OnceLock<Cache<CacheKey, Vec<RawResult>>> = OnceLock::new();

/// Composite cache key: normalised query text, kind, and count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    kind: SearchKind,
    result_count: usize,
}

impl CacheKey {
    /// Build a deterministic key from a search query.
    ///
    /// The text is lowercased and trimmed so trivially different phrasings
    /// of the same query share an entry.
    pub fn for_query(query: &SearchQuery) -> Self {
        Self {
            query: query.text().trim().to_lowercase(),
            kind: query.kind(),
            result_count: query.result_count(),
        }
    }
}

fn get_or_init_cache(ttl_seconds: u64) -> &'static Cache<CacheKey, Vec<RawResult>> {
    CACHE.get_or_init(|| {
        Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build()
    })
}

/// Look up cached raw results for the given key.
pub async fn get(key: &CacheKey, ttl_seconds: u64) -> Option<Vec<RawResult>> {
    let cache = get_or_init_cache(ttl_seconds);
    cache.get(key).await
}

/// Insert raw results into the cache.
pub async fn insert(key: CacheKey, results: Vec<RawResult>, ttl_seconds: u64) {
    let cache = get_or_init_cache(ttl_seconds);
    cache.insert(key, results).await;
}
