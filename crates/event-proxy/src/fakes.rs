//! In-memory fakes for the sink boundary (testing only)
//!
//! Provides `MemorySink`, which records every emission and lets tests await
//! delivery instead of the (fire-and-forget) invocation.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use event_proxy_core::{EventError, EventRecord, TagMap};
use tokio::sync::Notify;

use crate::sink::{Emission, EventSink, Payload};

/// Sink that keeps every emission in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    emissions: Mutex<Vec<Emission>>,
    delivered: Notify,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All emissions so far, in delivery order.
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records and tag maps published on `channel`.
    pub fn events(&self, channel: &str) -> Vec<(Arc<EventRecord>, Arc<TagMap>)> {
        self.emissions()
            .into_iter()
            .filter(|e| e.channel == channel)
            .filter_map(|e| match e.payload {
                Payload::Event { record, tags } => Some((record, tags)),
                Payload::Error(_) => None,
            })
            .collect()
    }

    /// Errors published on any channel.
    pub fn errors(&self) -> Vec<EventError> {
        self.emissions()
            .into_iter()
            .filter_map(|e| match e.payload {
                Payload::Error(err) => Some(err),
                Payload::Event { .. } => None,
            })
            .collect()
    }

    /// Wait until at least `count` emissions have been delivered.
    pub async fn wait_for(&self, count: usize) -> Vec<Emission> {
        loop {
            let delivered = self.delivered.notified();
            {
                let emissions = self.emissions.lock().unwrap_or_else(PoisonError::into_inner);
                if emissions.len() >= count {
                    return emissions.clone();
                }
            }
            delivered.await;
        }
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn emit(&self, channel: &str, payload: Payload) {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Emission {
                channel: channel.to_string(),
                payload,
            });
        self.delivered.notify_waiters();
    }
}
