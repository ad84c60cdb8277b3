//! Event-Proxy Core: argument normalization and default merging
//!
//! This crate turns the loosely-typed, order-independent arguments handed to
//! an event proxy into a canonical [`EventRecord`], and provides the merge
//! primitives proxies use to layer call-site values over inherited defaults.
//!
//! ## Key Components
//!
//! - [`normalize`]: type-driven positional argument resolution
//! - [`Arg`] / [`EventArgs`] / [`args!`]: the argument model
//! - [`merge_data`] / [`sanitize_tags`]: default/override merging

pub mod args;
mod error;
pub mod merge;
pub mod normalize;
mod record;

pub use args::{Arg, DataProducer, EventArgs, ProducerFuture};
pub use error::{EventError, NormalizeError};
pub use merge::{apply_to_defaults, merge_data, sanitize_tags, tag_map, unique_tags, NullPolicy};
pub use normalize::{normalize, Role, RESOLUTION_ORDER};
pub use record::{DataMap, EventRecord, TagMap};

/// Event-Proxy core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
