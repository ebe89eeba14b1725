//! Main configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, PipelineSettings};

/// Complete Hermes configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.pipeline.success_code, 200);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pipeline defaults.
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

impl HermesConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The success code is outside 100..=599
    /// - The body size limit is zero
    /// - The log level does not parse as a filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;

        if let Err(e) = hermes_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Debug level, human-readable output with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::{HermesConfig, LogFormat};
    ///
    /// let config = HermesConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
            },
            pipeline: PipelineSettings::default(),
        }
    }

    /// Create a production configuration preset.
    ///
    /// Info level, JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}
