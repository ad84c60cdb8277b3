//! Type-driven positional argument normalization.
//!
//! Arguments are consumed greedily from the front of the queue. Each role in
//! [`RESOLUTION_ORDER`] gets one look at the current front item and takes it
//! only when the item's type matches. An item left over after every role has
//! had its turn is treated as an unexpected runtime value: it is consumed and
//! an error is synthesized from it.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::args::{Arg, EventArgs};
use crate::error::{EventError, NormalizeError};
use crate::record::{DataMap, EventRecord};

/// The role an argument can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Error,
    Tags,
    /// Data map, explicit null, or a data producer.
    Data,
    Message,
    Timestamp,
}

/// Roles in the order they are tried against the argument queue.
pub const RESOLUTION_ORDER: [Role; 5] = [
    Role::Error,
    Role::Tags,
    Role::Data,
    Role::Message,
    Role::Timestamp,
];

impl Role {
    /// Whether `arg` can fill this role.
    pub fn accepts(self, arg: &Arg) -> bool {
        matches!(
            (self, arg),
            (Role::Error, Arg::Error(_))
                | (Role::Tags, Arg::Tags(_))
                | (Role::Data, Arg::Data(_) | Arg::Null | Arg::Producer(_))
                | (Role::Message, Arg::Message(_))
                | (Role::Timestamp, Arg::Timestamp(_))
        )
    }
}

#[derive(Debug, Default)]
struct Fields {
    error: Option<EventError>,
    tags: Option<Vec<String>>,
    data: Option<Option<DataMap>>,
    message: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    unexpected: Option<String>,
}

impl Fields {
    async fn assign(&mut self, arg: Arg) -> Result<(), EventError> {
        match arg {
            Arg::Error(err) => self.error = Some(err),
            Arg::Tags(tags) => self.tags = Some(tags),
            Arg::Data(data) => self.data = Some(Some(data)),
            Arg::Null => self.data = Some(None),
            Arg::Producer(producer) => self.data = Some(Some(producer.produce().await?)),
            Arg::Message(message) => self.message = Some(message),
            Arg::Timestamp(ts) => self.timestamp = Some(ts),
            other @ Arg::Other(_) => self.unexpected(other),
        }
        Ok(())
    }

    fn unexpected(&mut self, arg: Arg) {
        let rendered = arg.render();
        debug!(kind = arg.kind(), value = %rendered, "unexpected event argument");

        if self.error.is_none() {
            self.error = Some(NormalizeError::UnexpectedParameter(rendered.clone()).into());
        }
        self.unexpected = Some(rendered);
    }

    fn finish(self, now: DateTime<Utc>) -> EventRecord {
        let error = self.error;
        let message = self
            .message
            .or(self.unexpected)
            .or_else(|| error.as_ref().map(ToString::to_string))
            .unwrap_or_default();

        EventRecord {
            tags: self.tags.unwrap_or_default(),
            data: self.data.unwrap_or_else(|| Some(DataMap::new())),
            message,
            timestamp: self.timestamp.unwrap_or(now),
            error,
        }
    }
}

/// Resolve loosely-typed positional arguments into an [`EventRecord`].
///
/// Supported orderings are any subset of
/// `[error] [tags] [data | producer] [message] [timestamp]`. Omitted fields
/// take their defaults: no tags, empty data, empty message, and the time of
/// this call. When an error is given without a message, the error text
/// becomes the message.
///
/// Fails only when a data producer returns an error or panics; the failure is
/// returned unchanged.
pub async fn normalize(args: EventArgs) -> Result<EventRecord, EventError> {
    let now = Utc::now();
    let mut queue: VecDeque<Arg> = args.into_queue();

    if queue.is_empty() {
        return Ok(EventRecord::new(now));
    }

    let mut fields = Fields::default();

    for role in RESOLUTION_ORDER {
        match queue.pop_front() {
            Some(arg) if role.accepts(&arg) => fields.assign(arg).await?,
            Some(arg) => queue.push_front(arg),
            None => break,
        }
    }

    if let Some(arg) = queue.pop_front() {
        fields.unexpected(arg);
        if !queue.is_empty() {
            debug!(ignored = queue.len(), "ignoring trailing event arguments");
        }
    }

    Ok(fields.finish(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use serde_json::json;

    fn map(value: serde_json::Value) -> DataMap {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn assert_defaults_except(record: &EventRecord, populated: &[&str]) {
        if !populated.contains(&"tags") {
            assert!(record.tags.is_empty(), "tags should default");
        }
        if !populated.contains(&"data") {
            assert_eq!(record.data, Some(DataMap::new()), "data should default");
        }
        if !populated.contains(&"message") {
            assert_eq!(record.message, "", "message should default");
        }
        if !populated.contains(&"timestamp") {
            assert!(record.timestamp <= Utc::now());
        }
    }

    #[test]
    fn resolution_order_is_error_tags_data_message_timestamp() {
        assert_eq!(
            RESOLUTION_ORDER,
            [Role::Error, Role::Tags, Role::Data, Role::Message, Role::Timestamp]
        );
    }

    #[test]
    fn data_role_accepts_maps_null_and_producers_but_not_timestamps() {
        assert!(Role::Data.accepts(&Arg::Data(DataMap::new())));
        assert!(Role::Data.accepts(&Arg::Null));
        assert!(Role::Data.accepts(&Arg::producer_sync(|| Ok(DataMap::new()))));
        assert!(!Role::Data.accepts(&Arg::Timestamp(Utc::now())));
        assert!(!Role::Data.accepts(&Arg::other(1)));
    }

    #[tokio::test]
    async fn no_arguments_yield_default_record() {
        let before = Utc::now();
        let record = normalize(args![]).await.unwrap();

        assert!(record.tags.is_empty());
        assert_eq!(record.data, Some(DataMap::new()));
        assert_eq!(record.message, "");
        assert!(record.timestamp >= before && record.timestamp <= Utc::now());
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn accepts_each_field_alone() {
        let record = normalize(args![["a", "b"]]).await.unwrap();
        assert_eq!(record.tags, vec!["a", "b"]);
        assert_defaults_except(&record, &["tags"]);

        let record = normalize(args![json!({"a": "b"})]).await.unwrap();
        assert_eq!(record.data, Some(map(json!({"a": "b"}))));
        assert_defaults_except(&record, &["data"]);

        let record = normalize(args!["a"]).await.unwrap();
        assert_eq!(record.message, "a");
        assert_defaults_except(&record, &["message"]);

        let ts = Utc::now() - chrono::Duration::hours(1);
        let record = normalize(args![ts]).await.unwrap();
        assert_eq!(record.timestamp, ts);
        assert_defaults_except(&record, &["timestamp"]);
    }

    #[tokio::test]
    async fn accepts_tags_data_message_timestamp() {
        let ts = Utc::now() - chrono::Duration::minutes(5);
        let record = normalize(args![["a", "b"], json!({"a": "b"}), "a", ts])
            .await
            .unwrap();

        assert_eq!(record.tags, vec!["a", "b"]);
        assert_eq!(record.data, Some(map(json!({"a": "b"}))));
        assert_eq!(record.message, "a");
        assert_eq!(record.timestamp, ts);
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn error_is_kept_by_identity() {
        let err = EventError::msg("");
        let record = normalize(args![err.clone()]).await.unwrap();

        assert!(EventError::ptr_eq(record.error.as_ref().unwrap(), &err));
        assert_defaults_except(&record, &[]);
    }

    #[tokio::test]
    async fn error_text_becomes_message_unless_one_is_given() {
        let record = normalize(args![EventError::msg("")]).await.unwrap();
        assert_eq!(record.message, "");

        let record = normalize(args![EventError::msg(""), "a"]).await.unwrap();
        assert_eq!(record.message, "a");

        let record = normalize(args![EventError::msg("a")]).await.unwrap();
        assert_eq!(record.message, "a");

        let record = normalize(args![EventError::msg("a"), "b"]).await.unwrap();
        assert_eq!(record.message, "b");
        assert!(record.has_error());
    }

    #[tokio::test]
    async fn explicit_null_data_is_preserved() {
        let record = normalize(args![json!(null)]).await.unwrap();
        assert_eq!(record.data, None);
        assert_defaults_except(&record, &["data"]);
    }

    #[tokio::test]
    async fn timestamps_are_never_taken_as_data() {
        let ts = Utc::now() - chrono::Duration::days(1);
        let record = normalize(args![["x"], ts]).await.unwrap();
        assert_eq!(record.data, Some(DataMap::new()));
        assert_eq!(record.timestamp, ts);
    }

    #[tokio::test]
    async fn producers_are_invoked_for_data() {
        let record = normalize(args![Arg::producer_sync(|| Ok(map(json!({"a": "b"})))) ])
            .await
            .unwrap();
        assert_eq!(record.data, Some(map(json!({"a": "b"}))));

        let record = normalize(args![
            ["t"],
            Arg::producer(|| async {
                tokio::task::yield_now().await;
                Ok(map(json!({"lazy": true})))
            }),
            "m"
        ])
        .await
        .unwrap();
        assert_eq!(record.tags, vec!["t"]);
        assert_eq!(record.data, Some(map(json!({"lazy": true}))));
        assert_eq!(record.message, "m");
    }

    #[tokio::test]
    async fn producer_errors_fail_normalization() {
        let err = normalize(args![Arg::producer_sync(|| Err(anyhow::anyhow!("sync")))])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "sync");

        let err = normalize(args![Arg::producer(|| async { Err(anyhow::anyhow!("async")) })])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "async");
    }

    #[tokio::test]
    async fn unexpected_values_synthesize_an_error() {
        for (value, text) in [(123i64, "123"), (0, "0")] {
            let record = normalize(args![value]).await.unwrap();

            assert_eq!(record.message, text);
            assert!(record.tags.is_empty());
            assert_eq!(record.data, Some(DataMap::new()));
            let err = record.error.expect("synthesized error");
            assert!(matches!(
                err.downcast_ref::<NormalizeError>(),
                Some(NormalizeError::UnexpectedParameter(v)) if v == text
            ));
        }
    }

    #[tokio::test]
    async fn non_finite_number_is_unexpected_not_a_message() {
        let record = normalize(args![f64::NAN]).await.unwrap();

        assert_eq!(record.message, "NaN");
        assert_eq!(
            record.error.map(|e| e.to_string()),
            Some("unexpected parameter type: NaN".to_string())
        );
    }

    #[tokio::test]
    async fn out_of_order_argument_falls_back_once() {
        // message is consumed, then the tags found after it are unexpected
        let record = normalize(args!["first", ["late"], true]).await.unwrap();

        assert_eq!(record.message, "first");
        assert!(record.tags.is_empty());
        assert_eq!(
            record.error.map(|e| e.to_string()),
            Some("unexpected parameter type: late".to_string())
        );
    }

    #[tokio::test]
    async fn fallback_keeps_a_supplied_error() {
        let err = EventError::msg("original");
        let record = normalize(args![err.clone(), ["t"], 42i64]).await.unwrap();

        assert!(EventError::ptr_eq(record.error.as_ref().unwrap(), &err));
        assert_eq!(record.tags, vec!["t"]);
        assert_eq!(record.message, "42");
    }
}
