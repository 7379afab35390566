//! Logging setup for applications embedding the fetcher.
//!
//! Only available with the `logging` feature. Libraries should install their
//! own subscriber instead; fob-fetch itself only emits `tracing` events.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Verbosity of fetcher output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    /// Errors, backend fallbacks and retries
    Warn,
    /// Adds one line per network fetch
    #[default]
    Info,
    /// Adds cache hits and misses
    Debug,
    /// Adds every resolution candidate
    Trace,
}

impl LogLevel {
    /// Filter directives for this level: fetcher crates at `self`, the HTTP
    /// stack capped at `warn` so connection chatter stays out of the output.
    pub fn directives(self) -> String {
        let http = match self {
            LogLevel::Silent | LogLevel::Error => self,
            _ => LogLevel::Warn,
        };
        format!("fob_fetch={self},fob_graph={self},reqwest={http},hyper={http},{self}")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("Invalid log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Install a global subscriber at `level`. A set `RUST_LOG` replaces the
/// level's directives. Only the first call in a process has an effect.
///
/// ```rust,no_run
/// use fob_fetch::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| install(filter_for(level)));
}

/// Install a global subscriber configured by `RUST_LOG`, defaulting to
/// [`LogLevel::Info`].
pub fn init_logging_from_env() {
    init_logging(LogLevel::Info);
}

fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::builder().parse_lossy(level.directives()))
}

fn install(filter: EnvFilter) {
    // A subscriber installed by the host application wins
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).without_time())
        .try_init();
}
