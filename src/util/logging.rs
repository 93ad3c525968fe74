//! Tracing subscriber setup
//!
//! Logs go to stderr so that `build` output on stdout stays machine-readable.
//! `RUST_LOG` directives are honoured on top of the configured level, and
//! initialisation only ever happens once per process.
//!
//! ```no_run
//! use premisia_wbs::util::logging;
//!
//! logging::init_logging(logging::LoggingConfig::from_env());
//! tracing::info!(stage = "analyzer", "Stage started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const CRATE_TARGET: &str = "premisia_wbs";

const LEVEL_ENV: &str = "PREMISIA_LOG_LEVEL";
const JSON_ENV: &str = "PREMISIA_LOG_JSON";

/// Dependencies that are noisy at debug level
const QUIET_TARGETS: &[&str] = &[
    "h2=warn",
    "hyper=warn",
    "hyper_util=warn",
    "reqwest=warn",
    "genai=warn",
];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// JSON lines instead of human-readable output
    pub use_json: bool,

    pub include_target: bool,

    /// File and line number
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Reads `PREMISIA_LOG_LEVEL` and `PREMISIA_LOG_JSON`; unset or invalid values
    /// fall back to INFO and human-readable output
    pub fn from_env() -> Self {
        let level = env::var(LEVEL_ENV)
            .ok()
            .and_then(|l| parse_level(&l))
            .unwrap_or(Level::INFO);
        let use_json = env::var(JSON_ENV).map(|v| parse_flag(&v)).unwrap_or(false);

        Self::with_level(level).json(use_json)
    }

    pub fn json(mut self, use_json: bool) -> Self {
        self.use_json = use_json;
        self
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::from_default_env();

        if let Ok(directive) = format!("{}={}", CRATE_TARGET, self.level).parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        if env::var("RUST_LOG").is_err() {
            for target in QUIET_TARGETS {
                if let Ok(directive) = target.parse::<Directive>() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        filter
    }
}

/// Case-insensitive level name; `None` for anything unrecognised
pub fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// `1`, `true` or `yes`, any case
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids),
                )
                .init();
        }
    });
}
