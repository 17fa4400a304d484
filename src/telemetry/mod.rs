//! Telemetry sinks and tracing hooks.

use crate::resilience::RateLimitState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Property keys attached to every call record.
pub mod keys {
    /// Per-call UUID.
    pub const CALL_ID: &str = "call_id";
    /// HTTP method.
    pub const METHOD: &str = "method";
    /// Final HTTP status, if a response was received.
    pub const STATUS: &str = "status";
    /// Requests sent, retries included.
    pub const ATTEMPTS: &str = "attempts";
    /// Requests repeated after a transient failure or a rate-limit wait.
    pub const RETRIES: &str = "retries";
    /// Rate-limit waits performed.
    pub const RATE_LIMIT_WAITS: &str = "rate_limit_waits";
    /// Pages fetched.
    pub const PAGES: &str = "pages";
    /// Wall time of the logical call.
    pub const DURATION_MS: &str = "duration_ms";
    /// `success` or the error kind.
    pub const OUTCOME: &str = "outcome";
}

/// Receives one record per logical call. Fire-and-forget: implementations
/// must return quickly and never panic.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetrySink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &str, properties: &HashMap<String, String>);
}

/// Sink that drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&self, _event: &str, _properties: &HashMap<String, String>) {}
}

/// Sink that turns records into `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record(&self, event: &str, properties: &HashMap<String, String>) {
        let mut pairs: Vec<_> = properties.iter().collect();
        pairs.sort();
        let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        info!(
            target: "github_telemetry",
            event = %event,
            properties = %rendered.join(" "),
            "Telemetry event"
        );
    }
}

/// Counters aggregated from call records.
#[derive(Debug, Default)]
pub struct Metrics {
    calls_total: AtomicU64,
    calls_success: AtomicU64,
    calls_failed: AtomicU64,
    retries_total: AtomicU64,
    rate_limit_waits: AtomicU64,
    pages_total: AtomicU64,
    latency_total_us: AtomicU64,
}

impl Metrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished call.
    pub fn record_call(&self, success: bool, retries: u64, rate_limit_waits: u64, pages: u64, latency: Duration) {
        self.calls_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.calls_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.calls_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.retries_total.fetch_add(retries, Ordering::Relaxed);
        self.rate_limit_waits
            .fetch_add(rate_limit_waits, Ordering::Relaxed);
        self.pages_total.fetch_add(pages, Ordering::Relaxed);
        self.latency_total_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    /// Gets the average latency in microseconds.
    pub fn average_latency_us(&self) -> u64 {
        let total = self.latency_total_us.load(Ordering::Relaxed);
        let count = self.calls_total.load(Ordering::Relaxed);
        if count == 0 {
            0
        } else {
            total / count
        }
    }

    /// Gets a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls_total: self.calls_total.load(Ordering::Relaxed),
            calls_success: self.calls_success.load(Ordering::Relaxed),
            calls_failed: self.calls_failed.load(Ordering::Relaxed),
            retries_total: self.retries_total.load(Ordering::Relaxed),
            rate_limit_waits: self.rate_limit_waits.load(Ordering::Relaxed),
            pages_total: self.pages_total.load(Ordering::Relaxed),
            average_latency_us: self.average_latency_us(),
        }
    }

    /// Resets all metrics.
    pub fn reset(&self) {
        self.calls_total.store(0, Ordering::Relaxed);
        self.calls_success.store(0, Ordering::Relaxed);
        self.calls_failed.store(0, Ordering::Relaxed);
        self.retries_total.store(0, Ordering::Relaxed);
        self.rate_limit_waits.store(0, Ordering::Relaxed);
        self.pages_total.store(0, Ordering::Relaxed);
        self.latency_total_us.store(0, Ordering::Relaxed);
    }
}

impl TelemetrySink for Metrics {
    fn record(&self, _event: &str, properties: &HashMap<String, String>) {
        let number = |key: &str| {
            properties
                .get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
        };
        let success = properties.get(keys::OUTCOME).map(String::as_str) == Some("success");
        self.record_call(
            success,
            number(keys::RETRIES),
            number(keys::RATE_LIMIT_WAITS),
            number(keys::PAGES),
            Duration::from_millis(number(keys::DURATION_MS)),
        );
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Logical calls.
    pub calls_total: u64,
    /// Successful calls.
    pub calls_success: u64,
    /// Failed calls.
    pub calls_failed: u64,
    /// Retries across all calls.
    pub retries_total: u64,
    /// Rate-limit waits across all calls.
    pub rate_limit_waits: u64,
    /// Pages fetched.
    pub pages_total: u64,
    /// Average latency in microseconds.
    pub average_latency_us: u64,
}

/// Tracing hooks for the invoker.
pub(crate) struct TracingHooks;

impl TracingHooks {
    pub(crate) fn on_request_start(call_id: &str, method: &str, url: &str, attempt: u32) {
        debug!(
            call_id = %call_id,
            method = %method,
            url = %url,
            attempt = attempt,
            "GitHub API request started"
        );
    }

    pub(crate) fn on_request_complete(call_id: &str, method: &str, url: &str, status: u16, duration: Duration) {
        debug!(
            call_id = %call_id,
            method = %method,
            url = %url,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "GitHub API request completed"
        );
    }

    pub(crate) fn on_retry(call_id: &str, method: &str, url: &str, attempt: u32, delay: Duration, reason: &str) {
        warn!(
            call_id = %call_id,
            method = %method,
            url = %url,
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            reason = %reason,
            "Retrying GitHub API request"
        );
    }

    pub(crate) fn on_rate_limited(call_id: &str, state: Option<&RateLimitState>, wait: Duration) {
        warn!(
            call_id = %call_id,
            remaining = state.and_then(|s| s.remaining).map(i64::from).unwrap_or(-1),
            resource = state.and_then(|s| s.resource.as_deref()).unwrap_or("core"),
            wait_ms = wait.as_millis() as u64,
            "Rate limit hit, waiting before retry"
        );
    }
}

/// Sensitive headers that should be redacted in logs.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-github-token",
    "x-access-token",
    "cookie",
    "set-cookie",
];

/// Redacts sensitive values in headers.
pub fn redact_header(name: &str, value: &str) -> String {
    if SENSITIVE_HEADERS.contains(&name.to_lowercase().as_str()) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_metrics_from_records() {
        let metrics = Metrics::new();

        metrics.record(
            "GET request",
            &props(&[
                (keys::OUTCOME, "success"),
                (keys::ATTEMPTS, "3"),
                (keys::RETRIES, "1"),
                (keys::RATE_LIMIT_WAITS, "1"),
                (keys::PAGES, "2"),
                (keys::DURATION_MS, "100"),
            ]),
        );
        metrics.record(
            "GET request",
            &props(&[(keys::OUTCOME, "not_found"), (keys::ATTEMPTS, "1")]),
        );

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                calls_total: 2,
                calls_success: 1,
                calls_failed: 1,
                retries_total: 1,
                rate_limit_waits: 1,
                pages_total: 2,
                average_latency_us: 50_000,
            }
        );

        metrics.reset();
        assert_eq!(metrics.snapshot().calls_total, 0);
    }

    #[test]
    fn test_redact_header() {
        assert_eq!(redact_header("Authorization", "Bearer token"), "[REDACTED]");
        assert_eq!(redact_header("Content-Type", "application/json"), "application/json");
    }

    #[test]
    fn test_noop_and_tracing_sinks_accept_records() {
        let properties = props(&[(keys::CALL_ID, "abc")]);
        NoopTelemetry.record("event", &properties);
        TracingTelemetry.record("event", &properties);
    }
}
