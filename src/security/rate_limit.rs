//! Login attempt rate limiting per identity.
//!
//! # States (per key)
//! ```text
//! Clean    → Tracking: first failure (record created, count = 1)
//! Tracking → Blocked:  count > max_attempts within the window
//! any      → Clean:    success, window expiry, or LRU eviction
//! ```
//!
//! # Design Decisions
//! - Fixed window that restarts on the first failure after expiry; this is
//!   not a sliding log, so a burst straddling the boundary can get up to
//!   twice the budget
//! - One mutex around a bounded LRU; every operation is O(1)
//! - A store failure (poisoned lock) fails open, availability over
//!   strictness: the attempt is admitted, the store is reset, and a warning
//!   is logged
//! - State is process-local; separate instances limit independently

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Failure bookkeeping for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub window_start: Instant,
    pub attempt_count: u32,
}

/// Outcome of `check_and_record_failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    /// Under the threshold; `remaining` further failures are tolerated.
    Allowed { remaining: u32 },
    /// Over the threshold until the window ends.
    Denied { retry_after: Duration },
    /// The store was unusable; admitted without tracking.
    AllowedDueToStoreError,
}

impl LoginDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, LoginDecision::Denied { .. })
    }

    /// Remaining tolerated failures; zero when denied or untracked.
    pub fn remaining(&self) -> u32 {
        match self {
            LoginDecision::Allowed { remaining } => *remaining,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoginDecision::Allowed { .. } => "allowed",
            LoginDecision::Denied { .. } => "denied",
            LoginDecision::AllowedDueToStoreError => "allowed_store_error",
        }
    }
}

/// Bounded, windowed failure counter keyed by normalized identity.
pub struct LoginRateLimiter {
    store: Mutex<LruCache<String, RateLimitRecord>>,
    max_attempts: u32,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            max_attempts,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.window_secs),
            config.capacity,
        )
    }

    /// Record a failed attempt for `key` and decide whether to admit it.
    ///
    /// Called before the password comparison.
    pub fn check_and_record_failure(&self, key: &str) -> LoginDecision {
        self.check_and_record_failure_at(key, Instant::now())
    }

    /// `check_and_record_failure` with an explicit clock reading.
    pub fn check_and_record_failure_at(&self, key: &str, now: Instant) -> LoginDecision {
        let key = normalize_key(key);
        let decision = match self.lock_store() {
            Some(mut store) => self.record_failure(&mut store, key, now),
            None => LoginDecision::AllowedDueToStoreError,
        };
        metrics::record_login_attempt(decision.as_str());
        decision
    }

    fn record_failure(
        &self,
        store: &mut LruCache<String, RateLimitRecord>,
        key: String,
        now: Instant,
    ) -> LoginDecision {
        if let Some(record) = store.get_mut(&key) {
            let elapsed = now.saturating_duration_since(record.window_start);
            if elapsed <= self.window {
                record.attempt_count = record.attempt_count.saturating_add(1);
                if record.attempt_count > self.max_attempts {
                    let retry_after = self.window - elapsed;
                    tracing::warn!(
                        event = "rate_limit_denied",
                        attempts = record.attempt_count,
                        max_attempts = self.max_attempts,
                        retry_after_secs = retry_after.as_secs(),
                        "Login rate limit exceeded"
                    );
                    return LoginDecision::Denied { retry_after };
                }
                return LoginDecision::Allowed {
                    remaining: self.max_attempts - record.attempt_count,
                };
            }
        }

        let fresh = RateLimitRecord {
            window_start: now,
            attempt_count: 1,
        };
        if let Some((evicted, _)) = store.push(key.clone(), fresh) {
            if evicted != key {
                tracing::debug!(event = "rate_limit_evicted", "Rate limit store full, evicted least recently used key");
            }
        }
        metrics::record_tracked_keys(store.len());

        if fresh.attempt_count > self.max_attempts {
            // Only reachable with max_attempts == 0
            return LoginDecision::Denied { retry_after: self.window };
        }
        LoginDecision::Allowed {
            remaining: self.max_attempts - fresh.attempt_count,
        }
    }

    /// Forget `key` after a successful login. Idempotent.
    pub fn record_success(&self, key: &str) {
        let key = normalize_key(key);
        if let Some(mut store) = self.lock_store() {
            store.pop(&key);
            metrics::record_tracked_keys(store.len());
        }
    }

    /// Drop every record whose window has ended. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let Some(mut store) = self.lock_store() else {
            return 0;
        };
        let expired: Vec<String> = store
            .iter()
            .filter(|(_, record)| now.saturating_duration_since(record.window_start) > self.window)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            store.pop(key);
        }
        metrics::record_tracked_keys(store.len());
        expired.len()
    }

    /// Current record for `key`, without touching recency.
    pub fn record(&self, key: &str) -> Option<RateLimitRecord> {
        let key = normalize_key(key);
        self.lock_store().and_then(|store| store.peek(&key).copied())
    }

    pub fn tracked_keys(&self) -> usize {
        self.lock_store().map(|store| store.len()).unwrap_or(0)
    }

    /// Lock the store. A poisoned lock means a writer panicked mid-update, so
    /// the contents are untrusted: wipe them, clear the poison and report
    /// failure for this call.
    fn lock_store(&self) -> Option<MutexGuard<'_, LruCache<String, RateLimitRecord>>> {
        match self.store.lock() {
            Ok(store) => Some(store),
            Err(poisoned) => {
                tracing::warn!(
                    event = "rate_limit_store_failure",
                    "Rate limit store poisoned; resetting and failing open"
                );
                let mut store = poisoned.into_inner();
                store.clear();
                drop(store);
                self.store.clear_poison();
                None
            }
        }
    }
}

/// Identity keys compare case-insensitively and ignore surrounding space.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}
