//! Event proxies: callable emitters pre-bound to a name, sinks, and defaults.
//!
//! [`EventProxy::call`] never blocks and never reports back to the caller.
//! It schedules a detached task that:
//! 1. normalizes the arguments
//! 2. on success, prepends the proxy's default tags (deduplicated, empties
//!    dropped), deep-merges the default data under the call-site data, and
//!    publishes one record and one tag map to every sink
//! 3. on failure, publishes the error on [`ERROR_CHANNEL`] only
//!
//! Invocations are independent; one whose data producer is slow may publish
//! after a later one.

use std::sync::Arc;

use event_proxy_core::{
    apply_to_defaults, merge_data, normalize, sanitize_tags, tag_map, unique_tags, DataMap,
    EventArgs, EventError, EventRecord, NormalizeError, NullPolicy, TagMap,
};
use tokio::runtime::Handle;
use tracing::instrument;

use crate::defaults::DefaultCell;
use crate::error::{ProxyError, Result};
use crate::metrics::METRICS;
use crate::obs;
use crate::options::{ChildOptions, ProxyOptions};
use crate::sink::{Payload, SinkSet, ERROR_CHANNEL};

/// A stateful emitter bound to one event name and a fixed set of sinks.
///
/// `tags` and `data` are the proxy's own defaults. They are shared with every
/// clone of this handle and read by each invocation when its task runs, so
/// mutations affect all future (and possibly pending) invocations. Children
/// get their own copies.
#[derive(Debug, Clone)]
pub struct EventProxy {
    name: Arc<str>,
    sinks: SinkSet,
    pub tags: DefaultCell<Vec<String>>,
    pub data: DefaultCell<DataMap>,
}

/// Build a proxy after validating its options.
///
/// Fails when the event name is empty or reserved, or when `sinks` is
/// empty.
///
/// ```no_run
/// use std::sync::Arc;
/// use event_proxy::{args, create_event_proxy, BroadcastSink, ProxyOptions};
///
/// # async fn demo() -> event_proxy::Result<()> {
/// let sink = Arc::new(BroadcastSink::default());
/// let log = create_event_proxy(sink, ProxyOptions::new("log").with_tags(["api"]))?;
/// log.call(args![["slow"], "request took 2s"]);
/// # Ok(())
/// # }
/// ```
pub fn create_event_proxy(sinks: impl Into<SinkSet>, options: ProxyOptions) -> Result<EventProxy> {
    options.validate()?;
    let sinks = sinks.into();
    if sinks.is_empty() {
        return Err(ProxyError::NoSinks { name: options.name });
    }
    Ok(EventProxy::new(sinks, options))
}

impl EventProxy {
    /// Build a proxy without validating the event name or the sink set.
    pub fn new(sinks: impl Into<SinkSet>, options: ProxyOptions) -> Self {
        let ProxyOptions { name, tags, data } = options;
        Self {
            name: Arc::from(name),
            sinks: sinks.into(),
            tags: DefaultCell::new(tags),
            data: DefaultCell::new(data),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sinks(&self) -> &SinkSet {
        &self.sinks
    }

    /// `true` when both handles are the same proxy (shared defaults).
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        DefaultCell::ptr_eq(&a.tags, &b.tags) && DefaultCell::ptr_eq(&a.data, &b.data)
    }

    /// Fire-and-forget invocation.
    ///
    /// Requires a tokio runtime. Without one the invocation does not run to
    /// completion: nothing is published, not even on [`ERROR_CHANNEL`], and
    /// the drop is only reported through `tracing` as `proxy.dropped`.
    pub fn call(&self, args: EventArgs) {
        let _span = obs::ProxySpan::enter(&self.name);
        METRICS.inc_invocations();

        let dispatch = Dispatch {
            name: Arc::clone(&self.name),
            sinks: self.sinks.clone(),
            tags: self.tags.clone(),
            data: self.data.clone(),
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(dispatch.run(args));
            }
            Err(err) => obs::emit_invocation_dropped(&self.name, &err),
        }
    }

    /// Derive an independent proxy with the same name and sinks.
    ///
    /// Its tags are this proxy's current tags followed by `options.tags`,
    /// deduplicated; its data is this proxy's current data with
    /// `options.data` merged on top. Later changes to either proxy's
    /// defaults do not affect the other.
    pub fn child(&self, options: ChildOptions) -> EventProxy {
        let ChildOptions {
            tags: extra_tags,
            data: extra_data,
        } = options;

        let tags = unique_tags(self.tags.snapshot().into_iter().chain(extra_tags));
        let data = merge_data(&self.data.read(), &extra_data, NullPolicy::Keep);

        EventProxy {
            name: Arc::clone(&self.name),
            sinks: self.sinks.clone(),
            tags: DefaultCell::new(tags),
            data: DefaultCell::new(data),
        }
    }
}

/// Everything one scheduled invocation needs, detached from the handle.
struct Dispatch {
    name: Arc<str>,
    sinks: SinkSet,
    tags: DefaultCell<Vec<String>>,
    data: DefaultCell<DataMap>,
}

impl Dispatch {
    #[instrument(skip_all, fields(name = %self.name), level = "debug")]
    async fn run(self, args: EventArgs) {
        match normalize(args).await {
            Ok(record) => {
                if is_unexpected_parameter(&record) {
                    METRICS.inc_unexpected_parameters();
                }
                let (record, tags) = self.apply_defaults(record);
                self.publish_event(record, tags).await;
            }
            Err(error) => self.publish_error(error).await,
        }
    }

    fn apply_defaults(&self, mut record: EventRecord) -> (Arc<EventRecord>, Arc<TagMap>) {
        let mut combined = self.tags.snapshot();
        combined.append(&mut record.tags);
        record.tags = sanitize_tags(combined);

        record.data = apply_to_defaults(&self.data.read(), record.data.as_ref(), NullPolicy::Override);

        let tags = tag_map(&record.tags);
        (Arc::new(record), Arc::new(tags))
    }

    async fn publish_event(&self, record: Arc<EventRecord>, tags: Arc<TagMap>) {
        obs::emit_event_published(&self.name, &record.tags, self.sinks.len());
        self.sinks
            .emit_all(&self.name, Payload::Event { record, tags })
            .await;
        METRICS.inc_events_published();
    }

    async fn publish_error(&self, error: EventError) {
        obs::emit_error_published(&self.name, &error, self.sinks.len());
        self.sinks
            .emit_all(ERROR_CHANNEL, Payload::Error(error))
            .await;
        METRICS.inc_errors_published();
    }
}

fn is_unexpected_parameter(record: &EventRecord) -> bool {
    record
        .error
        .as_ref()
        .and_then(|e| e.downcast_ref::<NormalizeError>())
        .is_some_and(|e| matches!(e, NormalizeError::UnexpectedParameter(_)))
}
