//! Error types for event-proxy-core

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Errors synthesized while normalizing event arguments.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// An argument matched none of the supported roles.
    #[error("unexpected parameter type: {0}")]
    UnexpectedParameter(String),

    /// The data producer panicked instead of returning.
    #[error("data producer panicked: {0}")]
    ProducerPanicked(String),
}

/// A shared, reference-counted error value carried by events.
///
/// Cloning is cheap and keeps the same allocation, so every sink that
/// receives a clone can use [`EventError::ptr_eq`] to recognise duplicate
/// deliveries of a single failure. Equality is identity.
#[derive(Clone)]
pub struct EventError(Arc<dyn StdError + Send + Sync + 'static>);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);

impl EventError {
    /// Wrap any error value.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Build an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// `true` when both handles point at the same error instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Attempt to view the wrapped error as a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    /// Borrow the wrapped error.
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }
}

impl From<anyhow::Error> for EventError {
    fn from(err: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = err.into();
        Self(Arc::from(boxed))
    }
}

impl From<NormalizeError> for EventError {
    fn from(err: NormalizeError) -> Self {
        Self::new(err)
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl StdError for EventError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl PartialEq for EventError {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl Serialize for EventError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
