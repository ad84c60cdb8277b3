//! Positional event arguments.
//!
//! Callers hand a proxy any ordered subset of
//! `[error] [tags] [data | producer] [message] [timestamp]`. Each [`Arg`]
//! carries its runtime type; the normalizer decides the role from that type,
//! never from the position.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::error::{EventError, NormalizeError};
use crate::record::DataMap;

/// Future returned by a [`DataProducer`].
pub type ProducerFuture = BoxFuture<'static, anyhow::Result<DataMap>>;

/// A zero-argument callable invoked to obtain the event data lazily.
pub struct DataProducer(Box<dyn FnOnce() -> ProducerFuture + Send + 'static>);

impl DataProducer {
    /// Wrap an async producer.
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<DataMap>> + Send + 'static,
    {
        Self(Box::new(move || producer().boxed()))
    }

    /// Wrap a synchronous producer.
    pub fn from_sync<F>(producer: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<DataMap> + Send + 'static,
    {
        Self(Box::new(move || async move { producer() }.boxed()))
    }

    /// Invoke the producer and await its data.
    ///
    /// Errors and panics both surface as an [`EventError`].
    pub async fn produce(self) -> Result<DataMap, EventError> {
        let producer = self.0;
        let outcome = AssertUnwindSafe(async move { producer().await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(err)) => Err(EventError::from(err)),
            Err(panic) => Err(NormalizeError::ProducerPanicked(panic_message(panic)).into()),
        }
    }
}

impl fmt::Debug for DataProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataProducer(..)")
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// One positional argument, tagged with its runtime type.
#[derive(Debug)]
pub enum Arg {
    Error(EventError),
    Tags(Vec<String>),
    Data(DataMap),
    /// Explicit null data, distinct from an omitted argument.
    Null,
    Producer(DataProducer),
    Message(String),
    Timestamp(DateTime<Utc>),
    /// A value matching none of the roles above (numbers, booleans, ...).
    Other(Value),
}

impl Arg {
    pub fn error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Arg::Error(EventError::new(err))
    }

    pub fn producer<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<DataMap>> + Send + 'static,
    {
        Arg::Producer(DataProducer::new(producer))
    }

    pub fn producer_sync<F>(producer: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<DataMap> + Send + 'static,
    {
        Arg::Producer(DataProducer::from_sync(producer))
    }

    pub fn other(value: impl Into<Value>) -> Self {
        Arg::Other(value.into())
    }

    /// Short type name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Error(_) => "error",
            Arg::Tags(_) => "tags",
            Arg::Data(_) => "data",
            Arg::Null => "null",
            Arg::Producer(_) => "producer",
            Arg::Message(_) => "message",
            Arg::Timestamp(_) => "timestamp",
            Arg::Other(_) => "other",
        }
    }

    /// Plain string form of the value.
    pub fn render(&self) -> String {
        match self {
            Arg::Error(err) => err.to_string(),
            Arg::Tags(tags) => tags.join(","),
            Arg::Data(data) => Value::Object(data.clone()).to_string(),
            Arg::Null => "null".to_string(),
            Arg::Producer(_) => "[producer]".to_string(),
            Arg::Message(message) => message.clone(),
            Arg::Timestamp(ts) => ts.to_rfc3339(),
            Arg::Other(Value::String(s)) => s.clone(),
            Arg::Other(value) => value.to_string(),
        }
    }
}

impl From<EventError> for Arg {
    fn from(err: EventError) -> Self {
        Arg::Error(err)
    }
}

impl From<&str> for Arg {
    fn from(message: &str) -> Self {
        Arg::Message(message.to_string())
    }
}

impl From<String> for Arg {
    fn from(message: String) -> Self {
        Arg::Message(message)
    }
}

impl From<&String> for Arg {
    fn from(message: &String) -> Self {
        Arg::Message(message.clone())
    }
}

impl From<Vec<String>> for Arg {
    fn from(tags: Vec<String>) -> Self {
        Arg::Tags(tags)
    }
}

impl From<Vec<&str>> for Arg {
    fn from(tags: Vec<&str>) -> Self {
        Arg::Tags(tags.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Arg {
    fn from(tags: [&str; N]) -> Self {
        Arg::Tags(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl From<&[&str]> for Arg {
    fn from(tags: &[&str]) -> Self {
        Arg::Tags(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl From<DataMap> for Arg {
    fn from(data: DataMap) -> Self {
        Arg::Data(data)
    }
}

impl From<Option<DataMap>> for Arg {
    fn from(data: Option<DataMap>) -> Self {
        data.map_or(Arg::Null, Arg::Data)
    }
}

impl From<DataProducer> for Arg {
    fn from(producer: DataProducer) -> Self {
        Arg::Producer(producer)
    }
}

impl From<DateTime<Utc>> for Arg {
    fn from(ts: DateTime<Utc>) -> Self {
        Arg::Timestamp(ts)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Other(n.into())
    }
}

impl From<u64> for Arg {
    fn from(n: u64) -> Self {
        Arg::Other(n.into())
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Other(n.into())
    }
}

/// Non-finite numbers have no JSON form and are kept as their text
/// (`NaN`, `Infinity`, `-Infinity`).
impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        if n.is_finite() {
            Arg::Other(n.into())
        } else if n.is_nan() {
            Arg::Other(Value::String("NaN".to_string()))
        } else if n.is_sign_positive() {
            Arg::Other(Value::String("Infinity".to_string()))
        } else {
            Arg::Other(Value::String("-Infinity".to_string()))
        }
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Other(b.into())
    }
}

/// Classify a dynamic JSON value by its type.
impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Arg::Data(map),
            Value::Null => Arg::Null,
            Value::String(s) => Arg::Message(s),
            Value::Array(items) => Arg::Tags(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other => Arg::Other(other),
        }
    }
}

/// Ordered argument list for one invocation.
#[derive(Debug, Default)]
pub struct EventArgs {
    queue: VecDeque<Arg>,
}

impl EventArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn with(mut self, arg: impl Into<Arg>) -> Self {
        self.queue.push_back(arg.into());
        self
    }

    pub fn push(&mut self, arg: impl Into<Arg>) {
        self.queue.push_back(arg.into());
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn into_queue(self) -> VecDeque<Arg> {
        self.queue
    }
}

impl From<Vec<Arg>> for EventArgs {
    fn from(args: Vec<Arg>) -> Self {
        Self {
            queue: args.into(),
        }
    }
}

impl FromIterator<Arg> for EventArgs {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

/// Build [`EventArgs`] from heterogeneous values.
///
/// ```
/// use event_proxy_core::{args, EventArgs};
///
/// let args: EventArgs = args![["db", "slow"], "query took too long"];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::EventArgs::new()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::EventArgs::new()$(.with($arg))+
    };
}
