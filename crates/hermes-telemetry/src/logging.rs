//! Structured logging for Hermes.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either
//! JSON or human-readable output.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::logging::{LogConfig, init_logging};
//!
//! let config = LogConfig::default();
//! init_logging(&config)?;
//!
//! tracing::info!(request_id = %id, "Processing request");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Log level or filter directives (e.g., "info", "hermes_pipeline=debug").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    ///
    /// Pipeline lifecycle events are emitted at `debug` and show up here.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Builds the subscriber described by `config`, writing to `writer`.
///
/// The subscriber is not installed; see [`init_logging`] for that.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidLevel` if `config.level` does not parse.
pub fn build_subscriber<W>(
    config: &LogConfig,
    writer: W,
) -> TelemetryResult<Box<dyn Subscriber + Send + Sync>>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry();
    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);
        Ok(Box::new(registry.with(fmt_layer)))
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);
        Ok(Box::new(registry.with(fmt_layer)))
    }
}

/// Initializes the logging subsystem, writing to stdout.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidLevel` if the level does not parse, or
/// `TelemetryError::LoggingInit` if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let subscriber = build_subscriber(config, std::io::stdout)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Creates an env filter from a string.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidLevel` if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidLevel(format!("{filter}: {e}")))
}

/// Standard log field names.
///
/// The pipeline's failure entries use these names.
pub mod fields {
    /// Request ID field name.
    pub const REQUEST_ID: &str = "request_id";

    /// HTTP method field name.
    pub const HTTP_METHOD: &str = "http.method";

    /// HTTP path field name.
    pub const HTTP_PATH: &str = "http.path";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Panic stack field name.
    pub const STACK: &str = "stack";

    /// Rendered panic value field name.
    pub const PANIC_VALUE: &str = "panic_value";

    /// Remaining key/value pairs of a failure entry.
    pub const EXTRA: &str = "fields";
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{ErrorLogger, Field, RequestContext, TracingLogger};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("hermes_pipeline=debug,warn").is_ok());
        assert!(matches!(
            create_env_filter("hermes=loudest"),
            Err(TelemetryError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_failure_entry_uses_standard_fields() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let subscriber = build_subscriber(&LogConfig::default(), move || sink.clone()).unwrap();

        let ctx = RequestContext::mock();
        tracing::subscriber::with_default(subscriber, || {
            TracingLogger.log_error(
                &ctx,
                "recovered from panic during request",
                &[
                    Field::new("error", &"boom"),
                    Field::new("status", &500),
                    Field::new("stack", &"0: main"),
                    Field::new("panic_value", &r#"{"field":"name"}"#),
                ],
            );
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let entry = &lines[0];
        assert_eq!(entry["level"], "ERROR");
        let recorded = &entry["fields"];
        assert_eq!(recorded["message"], "recovered from panic during request");
        assert_eq!(recorded[fields::REQUEST_ID], ctx.request_id().to_string());
        assert_eq!(recorded[fields::ERROR], "boom");
        assert_eq!(recorded[fields::STACK], "0: main");
        assert_eq!(recorded[fields::PANIC_VALUE], r#"{"field":"name"}"#);
        assert_eq!(recorded[fields::EXTRA], "status=500");
    }

    #[test]
    fn test_level_filters_events() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let config = LogConfig {
            level: "error".to_string(),
            ..Default::default()
        };
        let subscriber = build_subscriber(&config, move || sink.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hidden");
            tracing::error!("shown");
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["fields"]["message"], "shown");
    }
}
