//! Proxy and child configuration.

use event_proxy_core::DataMap;
use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, Result};
use crate::sink::ERROR_CHANNEL;

/// Construction options for a root proxy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyOptions {
    /// Channel name events are published on.
    pub name: String,
    /// Default tags prepended to every event.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Default data every event's data is merged onto.
    #[serde(default)]
    pub data: DataMap,
}

impl ProxyOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = data;
        self
    }

    /// Reject names that cannot serve as an event channel.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ProxyError::InvalidName {
                name: self.name.clone(),
                reason: "must not be empty",
            });
        }
        if self.name == ERROR_CHANNEL {
            return Err(ProxyError::InvalidName {
                name: self.name.clone(),
                reason: "reserved for failures",
            });
        }
        Ok(())
    }

    /// Parse and validate options from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

/// Extra defaults layered onto a parent's when deriving a child proxy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildOptions {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub data: DataMap,
}

impl ChildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = data;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
