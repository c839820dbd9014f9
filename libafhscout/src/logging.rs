//! Logging setup shared by the library consumers and the `afh-scout` binary
//!
//! Output always goes to stderr so that stdout stays free for reports.
//!
//! ```no_run
//! use libafhscout::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Pretty, "debug".to_string(), false).init();
//! ```

use std::str::FromStr;

/// Environment variable selecting the log format for [`LoggingConfig::from_env`]
pub const LOG_FORMAT_ENV_VAR: &str = "AFH_SCOUT_LOG_FORMAT";

/// Environment variable selecting the log level for [`LoggingConfig::from_env`]
pub const LOG_LEVEL_ENV_VAR: &str = "AFH_SCOUT_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text, no colors
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line with colors, for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    /// `verbose` forces the `debug` level unless `RUST_LOG` is set.
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Install the global subscriber.
    ///
    /// Calling this a second time is harmless: the later subscriber is
    /// ignored.
    pub fn init(&self) {
        use tracing_subscriber::EnvFilter;

        let level = if self.verbose { "debug" } else { self.level.as_str() };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let result = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .try_init(),
        };

        if result.is_err() {
            tracing::debug!("Logging subscriber already installed");
        }
    }

    /// Read format and level from `AFH_SCOUT_LOG_FORMAT` /
    /// `AFH_SCOUT_LOG_LEVEL`, defaulting to text at `warn`.
    ///
    /// An unrecognized format falls back to text.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var(LOG_FORMAT_ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = std::env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| "warn".to_string());

        Self::new(format, level, verbose)
    }
}

/// Initialize logging from the environment, see [`LoggingConfig::from_env`]
pub fn init_default() {
    LoggingConfig::from_env(false).init();
}
