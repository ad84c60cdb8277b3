//! Structured tracing hooks for proxy dispatch.
//!
//! - Proxy-scoped spans via the [`ProxySpan`] RAII guard
//! - Emission functions for publishes, failures, and dropped invocations
//!
//! Emitted at `debug!` for successful publishes and `warn!`/`error!` for
//! failures and dropped invocations (filter via `EVENT_PROXY_LOG` or
//! `RUST_LOG`).

use event_proxy_core::EventError;
use tracing::{debug, error, warn};

/// RAII guard that enters a proxy-scoped span on the current thread.
///
/// Not `Send`; hold it only across synchronous code.
///
/// ```ignore
/// let _span = ProxySpan::enter("checkout");
/// // events emitted here carry name = "checkout"
/// ```
pub struct ProxySpan {
    _span: tracing::span::EnteredSpan,
}

impl ProxySpan {
    pub fn enter(name: &str) -> Self {
        let span = tracing::debug_span!("event_proxy.proxy", name = %name);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a record was published to every sink.
pub fn emit_event_published(name: &str, tags: &[String], sinks: usize) {
    debug!(
        event = "proxy.published",
        name = %name,
        tags = ?tags,
        sinks = sinks,
    );
}

/// Emit event: an invocation failed and the error was published.
pub fn emit_error_published(name: &str, error: &EventError, sinks: usize) {
    warn!(
        event = "proxy.failed",
        name = %name,
        error = %error,
        sinks = sinks,
    );
}

/// Emit event: an invocation could not be scheduled.
pub fn emit_invocation_dropped(name: &str, reason: &dyn std::fmt::Display) {
    error!(event = "proxy.dropped", name = %name, reason = %reason);
}
