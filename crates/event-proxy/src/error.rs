//! Error types for event-proxy

use thiserror::Error;

/// Errors raised while building proxies from configuration.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The event name cannot be used as a channel
    #[error("invalid event name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A proxy needs at least one sink to publish to
    #[error("event proxy {name:?} has no sinks")]
    NoSinks { name: String },

    /// Proxy or child options could not be parsed
    #[error("invalid proxy options: {0}")]
    Options(#[from] serde_json::Error),
}

/// Result type for event-proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_error_display() {
        let err = ProxyError::InvalidName {
            name: String::new(),
            reason: "must not be empty",
        };
        assert_eq!(err.to_string(), "invalid event name \"\": must not be empty");

        let err = ProxyError::NoSinks { name: "log".into() };
        assert_eq!(err.to_string(), "event proxy \"log\" has no sinks");

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProxyError::from(parse);
        assert!(err.to_string().starts_with("invalid proxy options"));
    }
}
