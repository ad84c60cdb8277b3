//! Global atomic counters for proxy observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at shutdown).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    invocations: AtomicU64,
    events_published: AtomicU64,
    errors_published: AtomicU64,
    unexpected_parameters: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            invocations: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
            errors_published: AtomicU64::new(0),
            unexpected_parameters: AtomicU64::new(0),
        }
    }

    /// Increment the invocation counter by one.
    pub fn inc_invocations(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "invocations", "counter incremented");
    }

    /// Increment the published-events counter by one.
    pub fn inc_events_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "events_published", "counter incremented");
    }

    /// Increment the published-errors counter by one.
    pub fn inc_errors_published(&self) {
        self.errors_published.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "errors_published", "counter incremented");
    }

    /// Increment the unexpected-parameter counter by one.
    pub fn inc_unexpected_parameters(&self) {
        self.unexpected_parameters.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "unexpected_parameters", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            invocations = self.invocations(),
            events_published = self.events_published(),
            errors_published = self.errors_published(),
            unexpected_parameters = self.unexpected_parameters(),
        );
    }

    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    pub fn errors_published(&self) -> u64 {
        self.errors_published.load(Ordering::Relaxed)
    }

    pub fn unexpected_parameters(&self) -> u64 {
        self.unexpected_parameters.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.invocations.store(0, Ordering::Relaxed);
        self.events_published.store(0, Ordering::Relaxed);
        self.errors_published.store(0, Ordering::Relaxed);
        self.unexpected_parameters.store(0, Ordering::Relaxed);
    }
}
