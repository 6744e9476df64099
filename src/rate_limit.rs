//! Admission control for outbound search API calls.
//!
//! [`RateLimiter`] bounds calls to a fixed quota per window using a fixed
//! bucket: the first admission under a key anchors the window, every
//! admission inside it counts against the ceiling, and the bucket resets
//! once the window elapses. At most `ceiling` calls are admitted per
//! window; the anchor point is the key's first call, not a wall-clock
//! hour boundary.
//!
//! The limiter is the only cross-run shared mutable resource in the
//! pipeline. It is an explicitly constructed component passed to the call
//! driver, not ambient state, and guards its counters with a [`Mutex`] so
//! concurrent runs observe a consistent increment-and-check.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Configuration for admission control.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum admissions per window per key.
    pub ceiling: u32,
    /// Window length. A zero-length window resets on every call.
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            ceiling: 360,
            window: Duration::from_secs(3600),
        }
    }
}

/// One key's bucket: when it opened and how many admissions it has granted.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    opened_at: Instant,
    admitted: u32,
}

/// Per-key fixed-bucket admission gate.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    /// Create a limiter with the given configuration.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Try to admit one call under `key`.
    ///
    /// Returns `true` and counts the admission while the key's bucket is
    /// under the ceiling; returns `false` once the quota for the current
    /// window is exhausted. The caller must not issue the guarded call
    /// after a denial.
    pub fn admit(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        let bucket = buckets.entry(key.to_owned()).or_insert(Bucket {
            opened_at: now,
            admitted: 0,
        });

        if now.duration_since(bucket.opened_at) >= self.config.window {
            bucket.opened_at = now;
            bucket.admitted = 0;
        }

        if bucket.admitted >= self.config.ceiling {
            tracing::warn!(key, ceiling = self.config.ceiling, "admission denied");
            return false;
        }

        bucket.admitted += 1;
        true
    }

    /// Estimated time until the key's current window rolls over.
    ///
    /// Zero when the key has no open bucket or the window already elapsed.
    pub fn retry_after(&self, key: &str) -> Duration {
        let buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        match buckets.get(key) {
            Some(bucket) => self
                .config
                .window
                .saturating_sub(bucket.opened_at.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// The configured admission ceiling.
    pub fn ceiling(&self) -> u32 {
        self.config.ceiling
    }

    /// Drop all buckets, restoring every key to a fresh window.
    pub fn reset(&self) {
        self.buckets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
