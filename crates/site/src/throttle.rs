//! Per-caller submission cooldown using `governor`.
//!
//! One submission per cooldown window per caller key. The keyed check is a
//! single atomic check-and-set, so two concurrent requests from the same
//! address inside one window cannot both pass, and a denied check does not
//! extend the window.
//!
//! The store is per running instance: under multi-instance deployment a
//! caller can exceed the intended global rate by hitting different
//! instances. Callers see only [`SubmissionThrottle::check`], so an
//! externalized store could be substituted without touching the handler.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderMap;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter, clock::DefaultClock};

/// Bucket used when no caller address can be derived at all.
const UNKNOWN_BUCKET: &str = "unknown";

/// Keyed cooldown limiter over caller addresses.
///
/// Entries live for the process lifetime and are never evicted.
pub struct SubmissionThrottle {
    limiter: RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>,
}

impl SubmissionThrottle {
    /// Create a throttle allowing one submission per `cooldown` per key.
    ///
    /// # Panics
    ///
    /// Panics if `cooldown` is zero; configuration loading rejects that
    /// before construction.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        let quota = Quota::with_period(cooldown).expect("cooldown is nonzero");
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Check-and-record for one submission attempt.
    ///
    /// Returns `true` when the caller is outside the cooldown window; the
    /// acceptance is recorded by the same atomic operation. Returns `false`
    /// (recording nothing) when the caller is still inside the window.
    #[must_use]
    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_owned()).is_ok()
    }
}

/// Derive the caller key for rate limiting.
///
/// Best effort: the first `X-Forwarded-For` entry, else `X-Real-IP`, else
/// the peer socket address, else a shared "unknown" bucket. Header values
/// are taken as opaque strings - a forged header still lands every forgery
/// in the same bucket.
#[must_use]
pub fn caller_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_owned();
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return real_ip.to_owned();
    }

    peer.map_or_else(|| UNKNOWN_BUCKET.to_owned(), |addr| addr.ip().to_string())
}
