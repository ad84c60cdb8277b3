//! The canonical event record produced by normalization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::EventError;

/// String-keyed event payload.
pub type DataMap = serde_json::Map<String, serde_json::Value>;

/// Tag-presence map (`{tag: true}`) published alongside each event.
pub type TagMap = BTreeMap<String, bool>;

/// A normalized structured-log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Ordered tags; may be empty.
    pub tags: Vec<String>,
    /// Event payload. `None` when the caller passed an explicit null.
    pub data: Option<DataMap>,
    /// Human-readable message; empty by default.
    pub message: String,
    /// When the event happened; defaults to normalization time.
    pub timestamp: DateTime<Utc>,
    /// Present only when an error was supplied or synthesized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EventError>,
}

impl EventRecord {
    /// A record with every field at its default, stamped with `timestamp`.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            tags: Vec::new(),
            data: Some(DataMap::new()),
            message: String::new(),
            timestamp,
            error: None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
