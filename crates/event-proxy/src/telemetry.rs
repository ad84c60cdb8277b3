//! Centralised tracing initialisation for applications using event proxies.
//!
//! Call [`init_tracing`] (or [`init_tracing_from_env`]) once at program start
//! to configure the global subscriber with an `EnvFilter` and optional JSON
//! formatting. Later calls are silently ignored.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default verbosity (`error`, `warn`, `info`, `debug`, `trace`).
pub const LOG_LEVEL_ENV: &str = "EVENT_PROXY_LOG";

/// Set to `json` for newline-delimited JSON output.
pub const LOG_FORMAT_ENV: &str = "EVENT_PROXY_LOG_FORMAT";

/// Initialise the global tracing subscriber.
///
/// * `json`: when `true`, emit newline-delimited JSON log lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// Initialise tracing from `EVENT_PROXY_LOG` and `EVENT_PROXY_LOG_FORMAT`.
pub fn init_tracing_from_env() {
    let json = is_json_format(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    let level = parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    init_tracing(json, level);
}

fn is_json_format(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

fn parse_level(value: Option<&str>) -> Level {
    value
        .and_then(|v| v.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}
