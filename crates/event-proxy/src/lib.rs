//! Event-Proxy: structured event logging through callable proxies
//!
//! A proxy is bound to an event name, a fixed set of sinks, and default
//! tags/data. Each invocation normalizes its loosely-typed arguments,
//! layers them over the proxy's defaults, and publishes the same record to
//! every sink. Child proxies inherit a snapshot of their parent's defaults.
//!
//! ## Key Components
//!
//! - [`EventProxy`] / [`create_event_proxy`]: the proxy factory
//! - [`EventSink`] / [`BroadcastSink`]: the sink boundary
//! - [`fakes::MemorySink`]: recording sink for tests
//! - [`init_tracing`]: subscriber setup for applications
//!
//! The argument model and normalizer are re-exported from
//! `event-proxy-core`.

mod defaults;
mod error;
pub mod fakes;
pub mod metrics;
pub mod obs;
mod options;
mod proxy;
pub mod sink;
pub mod telemetry;

pub use defaults::DefaultCell;
pub use error::{ProxyError, Result};
pub use options::{ChildOptions, ProxyOptions};
pub use proxy::{create_event_proxy, EventProxy};
pub use sink::{BroadcastSink, Emission, EventSink, Payload, SinkSet, ERROR_CHANNEL};

pub use event_proxy_core::{
    args, normalize, Arg, DataMap, DataProducer, EventArgs, EventError, EventRecord,
    NormalizeError, TagMap,
};

pub use metrics::METRICS;
pub use obs::{emit_error_published, emit_event_published, emit_invocation_dropped, ProxySpan};
pub use telemetry::{init_tracing, init_tracing_from_env};

/// Event-Proxy version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
