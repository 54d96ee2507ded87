//! Logging setup shared by the mb-* tools
//!
//! Logs always go to stderr. Stdout carries the feed, search and account
//! output that users pipe into other programs.
//!
//! ```no_run
//! use libmicroblog::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "libmicroblog=debug", false).init();
//! ```

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

pub const FORMAT_ENV: &str = "MICROBLOG_LOG_FORMAT";
pub const LEVEL_ENV: &str = "MICROBLOG_LOG_LEVEL";

const QUIET_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event, no colors
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line events with source locations
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
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

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives such as `info` or `libmicroblog=debug`
    pub level: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(LogFormat::Text, QUIET_LEVEL, false)
    }
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: impl Into<String>, verbose: bool) -> Self {
        Self {
            format,
            level: level.into(),
            verbose,
        }
    }

    /// Read `MICROBLOG_LOG_FORMAT` and `MICROBLOG_LOG_LEVEL`
    ///
    /// An unknown format falls back to text and an unset or blank level to
    /// `warn`, so tool output is not interleaved with log lines.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var(FORMAT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let level = std::env::var(LEVEL_ENV)
            .ok()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| QUIET_LEVEL.to_string());

        Self::new(format, level, verbose)
    }

    /// Filter directives for the subscriber
    ///
    /// `verbose` replaces the configured level with `debug`. sqlx logs every
    /// statement, so it stays at `warn` unless the level names it.
    pub fn directives(&self) -> String {
        let base = if self.verbose {
            VERBOSE_LEVEL
        } else {
            self.level.as_str()
        };

        if base.contains("sqlx") {
            base.to_string()
        } else {
            format!("{},sqlx=warn", base)
        }
    }

    /// Install the global subscriber
    ///
    /// Returns `false` when a subscriber is already installed or the level
    /// does not parse; the existing subscriber (if any) is left alone.
    pub fn init(&self) -> bool {
        let Ok(filter) = EnvFilter::try_new(self.directives()) else {
            return false;
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        let installed = match self.format {
            LogFormat::Json => builder
                .json()
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => builder
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => builder.with_target(false).try_init(),
        };

        installed.is_ok()
    }
}

/// Configure logging for a CLI from the environment and its `--verbose` flag
pub fn init_default(verbose: bool) {
    let config = LoggingConfig::from_env(verbose);
    if !config.init() {
        // Fall back to the quiet default when the configured level is unusable
        LoggingConfig {
            verbose,
            ..LoggingConfig::default()
        }
        .init();
    }
}
