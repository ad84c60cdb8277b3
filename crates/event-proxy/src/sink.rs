//! Sink boundary: where proxies publish events.
//!
//! A sink is an opaque multi-listener target. Proxies publish on two kinds of
//! channel:
//! - the proxy's event name, carrying the record and its tag-presence map
//! - [`ERROR_CHANNEL`], carrying the failure of an invocation
//!
//! Every sink bound to a proxy receives the same `Arc`s for a given
//! invocation, so listeners may compare by identity to detect duplicates.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use event_proxy_core::{EventError, EventRecord, TagMap};
use tokio::sync::broadcast;
use tracing::trace;

/// Reserved channel for invocation failures.
pub const ERROR_CHANNEL: &str = "error";

/// What a sink receives on a channel.
#[derive(Debug, Clone)]
pub enum Payload {
    Event {
        record: Arc<EventRecord>,
        tags: Arc<TagMap>,
    },
    Error(EventError),
}

impl Payload {
    pub fn record(&self) -> Option<&Arc<EventRecord>> {
        match self {
            Payload::Event { record, .. } => Some(record),
            Payload::Error(_) => None,
        }
    }

    pub fn tags(&self) -> Option<&Arc<TagMap>> {
        match self {
            Payload::Event { tags, .. } => Some(tags),
            Payload::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&EventError> {
        match self {
            Payload::Error(err) => Some(err),
            Payload::Event { .. } => None,
        }
    }
}

/// A single delivery: the channel name plus its payload.
#[derive(Debug, Clone)]
pub struct Emission {
    pub channel: String,
    pub payload: Payload,
}

/// Target that proxies publish to.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, channel: &str, payload: Payload);
}

/// The fixed, ordered set of sinks a proxy publishes to.
#[derive(Clone)]
pub struct SinkSet(Arc<[Arc<dyn EventSink>]>);

impl SinkSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sinks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn EventSink>> {
        self.0.iter()
    }

    /// Publish `payload` on `channel` to every sink, in registration order.
    pub(crate) async fn emit_all(&self, channel: &str, payload: Payload) {
        for sink in self.iter() {
            sink.emit(channel, payload.clone()).await;
        }
    }
}

impl<S: EventSink + 'static> From<Arc<S>> for SinkSet {
    fn from(sink: Arc<S>) -> Self {
        let sink: Arc<dyn EventSink> = sink;
        Self(Arc::from(vec![sink]))
    }
}

impl From<Vec<Arc<dyn EventSink>>> for SinkSet {
    fn from(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self(Arc::from(sinks))
    }
}

impl FromIterator<Arc<dyn EventSink>> for SinkSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn EventSink>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Default for SinkSet {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl fmt::Debug for SinkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkSet").field("len", &self.len()).finish()
    }
}

/// Default buffer of a [`BroadcastSink`].
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Multi-listener sink backed by a tokio broadcast channel.
///
/// Every subscriber sees every emission. Emissions made while nobody is
/// subscribed are discarded.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<Emission>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Emission> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

#[async_trait]
impl EventSink for BroadcastSink {
    async fn emit(&self, channel: &str, payload: Payload) {
        let emission = Emission {
            channel: channel.to_string(),
            payload,
        };
        if self.sender.send(emission).is_err() {
            trace!(channel, "no broadcast listeners attached");
        }
    }
}
