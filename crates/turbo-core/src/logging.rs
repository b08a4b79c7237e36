//! Log verbosity and subscriber setup
//!
//! Levels use the npm-style names accepted in `LOG_LEVEL`; they map onto
//! `tracing` levels for the stderr subscriber.

use std::fmt;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Silly,
    Verbose,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silly => "silly",
            LogLevel::Verbose => "verbose",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Verbose and below also dump the full error chain on failure
    pub fn is_verbose(&self) -> bool {
        *self <= LogLevel::Verbose
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Silly => LevelFilter::TRACE,
            LogLevel::Verbose => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silly" | "trace" => Ok(LogLevel::Silly),
            "verbose" | "debug" => Ok(LogLevel::Verbose),
            "info" | "http" | "notice" | "timing" | "success" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "silent" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Install the global stderr subscriber
///
/// `RUST_LOG` still refines the filter per target when set. Calling this twice
/// is harmless; the second install is ignored.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.level_filter().into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(level.is_verbose())
        .without_time()
        .try_init();
}
