//! Rate-limit detection and retry policy for the REST invoker.
//!
//! Nothing here is shared between calls: every decision is made from the
//! policy resolved for one call and the headers of that call's latest response.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Rate-limit standing read from one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitState {
    /// Maximum requests allowed in the window.
    pub limit: Option<u32>,
    /// Remaining requests in the current window.
    pub remaining: Option<u32>,
    /// When the window resets.
    pub reset_at: Option<DateTime<Utc>>,
    /// Rate limit scope (`core`, `search`, ...).
    pub resource: Option<String>,
    /// `Retry-After` header, used by secondary rate limits.
    pub retry_after: Option<Duration>,
}

impl RateLimitState {
    /// Reads the rate-limit headers. Returns `None` when none are present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        }

        let limit = header::<u32>(headers, "x-ratelimit-limit");
        let remaining = header::<u32>(headers, "x-ratelimit-remaining");
        let reset_at = header::<i64>(headers, "x-ratelimit-reset")
            .and_then(|ts| DateTime::from_timestamp(ts, 0));
        let resource = header::<String>(headers, "x-ratelimit-resource");
        let retry_after = header::<u64>(headers, "retry-after").map(Duration::from_secs);

        if limit.is_none()
            && remaining.is_none()
            && reset_at.is_none()
            && resource.is_none()
            && retry_after.is_none()
        {
            return None;
        }

        Some(Self {
            limit,
            remaining,
            reset_at,
            resource,
            retry_after,
        })
    }

    /// Returns true when the primary quota is used up.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Time until the window resets, zero if already past.
    pub fn until_reset(&self, now: DateTime<Utc>) -> Duration {
        self.reset_at
            .and_then(|reset| (reset - now).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }
}

/// How a response should be handled by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx.
    Success,
    /// Primary or secondary rate limit hit.
    RateLimited,
    /// 5xx; retrying unchanged may succeed.
    Transient,
    /// Any other failure; the request itself must change.
    Permanent,
}

/// Classifies a response.
///
/// A 403 is a rate limit when the quota is exhausted, when `Retry-After` is
/// set, when the message says so, or when the quota headers are missing
/// entirely. Only a 403 that shows remaining quota is an authorization failure.
pub fn classify(status: u16, state: Option<&RateLimitState>, message: Option<&str>) -> Disposition {
    match status {
        200..=299 => Disposition::Success,
        429 => Disposition::RateLimited,
        403 => {
            let mentions_rate_limit = message
                .map(|m| {
                    let m = m.to_ascii_lowercase();
                    m.contains("rate limit") || m.contains("abuse")
                })
                .unwrap_or(false);
            let ambiguous = state.map(|s| s.remaining.is_none()).unwrap_or(true);
            let signalled = state
                .map(|s| s.is_exhausted() || s.retry_after.is_some())
                .unwrap_or(false);

            if signalled || mentions_rate_limit || ambiguous {
                Disposition::RateLimited
            } else {
                Disposition::Permanent
            }
        }
        500 | 502 | 503 | 504 => Disposition::Transient,
        _ => Disposition::Permanent,
    }
}

/// Retry budget and delays for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay, also the minimum rate-limit wait.
    pub retry_delay: Duration,
    /// Cap for exponential backoff.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy.
    pub fn new(max_retries: u32, retry_delay: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
            max_backoff,
        }
    }

    /// Returns true if another retry fits in the budget.
    pub fn can_retry(&self, retries_used: u32) -> bool {
        retries_used < self.max_retries
    }

    /// Backoff for a transient failure: `retry_delay * 2^attempt`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Wait before retrying a rate-limited request.
    pub fn rate_limit_wait(&self, state: Option<&RateLimitState>, now: DateTime<Utc>) -> Duration {
        let Some(state) = state else {
            return self.retry_delay;
        };
        let retry_after = state.retry_after.unwrap_or(Duration::ZERO);
        self.retry_delay
            .max(state.until_reset(now))
            .max(retry_after)
    }
}
