//! Configuration sections.

use hermes_extract::{ResponseWriter, DEFAULT_MAX_BODY_SIZE};
use hermes_pipeline::{options, Opt};
use hermes_telemetry::LogConfig;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directives (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the settings `hermes_telemetry::init_logging` takes.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            file_line_info: self.include_location,
            ..LogConfig::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// How successful results and classified errors are written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// JSON bodies.
    #[default]
    Json,
    /// URL-encoded form bodies.
    Form,
    /// Status code only, always `204 No Content`.
    NoContent,
}

impl ResponseFormat {
    /// The response writer for this format.
    #[must_use]
    pub fn writer(self) -> ResponseWriter {
        match self {
            Self::Json => ResponseWriter::json(),
            Self::Form => ResponseWriter::form(),
            Self::NoContent => ResponseWriter::no_content(),
        }
    }
}

/// Service-wide pipeline defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineSettings {
    /// Status code written on success.
    #[serde(default = "default_success_code")]
    pub success_code: u16,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Response body format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            success_code: default_success_code(),
            max_body_size: default_max_body_size(),
            response_format: ResponseFormat::default(),
        }
    }
}

impl PipelineSettings {
    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the success code is outside
    /// 100..=599 or the body limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.status()?;
        if self.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.max_body_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Bundles these settings into one option, suitable for sharing across
    /// pipelines.
    ///
    /// Options applied after the bundle override it.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`PipelineSettings::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::PipelineSettings;
    /// use hermes_pipeline::Options;
    ///
    /// let settings = PipelineSettings {
    ///     success_code: 201,
    ///     ..Default::default()
    /// };
    ///
    /// let options = Options::from_opts([settings.options().unwrap()]);
    /// assert_eq!(options.success_code(), http::StatusCode::CREATED);
    /// ```
    pub fn options(&self) -> Result<Opt, ConfigError> {
        self.validate()?;
        Ok(options::defaults([
            options::success_code(self.status()?),
            options::max_body_size(self.max_body_size),
            options::response_writer(self.response_format.writer()),
        ]))
    }

    fn status(&self) -> Result<StatusCode, ConfigError> {
        if !(100..=599).contains(&self.success_code) {
            return Err(ConfigError::invalid_value(
                "pipeline.success_code",
                format!("{} is not between 100 and 599", self.success_code),
            ));
        }
        StatusCode::from_u16(self.success_code)
            .map_err(|e| ConfigError::invalid_value("pipeline.success_code", e.to_string()))
    }
}

fn default_success_code() -> u16 {
    200
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}
