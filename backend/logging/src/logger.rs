//! Structured Logger
//!
//! Wraps `tracing` with a human console layer on stderr, a rolling NDJSON
//! file, and environment-based level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix; the appender adds the date.
pub const LOG_FILE_PREFIX: &str = "stockscan.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directive used when `RUST_LOG` is unset, e.g. `info` or `stockscan=debug`.
    pub level: String,
    /// Directory for NDJSON files. `None` disables file output.
    pub dir: Option<PathBuf>,
    /// Emit JSON on the console as well.
    pub json_console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            dir: None,
            json_console: false,
        }
    }
}

/// Initialize the global structured logger. Calling it twice is harmless;
/// the second call is ignored.
pub fn init_logger(options: &LogOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    // Rolling file appender: `<dir>/stockscan.log.YYYY-MM-DD`
    let file_layer = options.dir.as_ref().and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        Some(fmt::layer().json().with_writer(appender).with_ansi(false))
    });

    // Console goes to stderr so table and CSV output on stdout stays clean.
    let (plain_console, json_console) = if options.json_console {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(true),
            ),
            None,
        )
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(plain_console)
        .with(json_console)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let options = LogOptions {
            level: "debug".into(),
            dir: Some(logs.clone()),
            json_console: false,
        };
        init_logger(&options);
        init_logger(&options);
        assert!(logs.is_dir());
    }
}
