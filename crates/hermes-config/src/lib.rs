//! Typed configuration for Hermes.
//!
//! Service-wide settings with:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! The [`HermesConfig`] root has two sections:
//!
//! - [`LoggingConfig`] - maps onto `hermes_telemetry::LogConfig`
//! - [`PipelineSettings`] - success status, body limit and response format,
//!   bundled into a reusable pipeline option by [`PipelineSettings::options`]
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! hermes_telemetry::init_logging(&config.logging.log_config())?;
//! let defaults = config.pipeline.options()?;
//! # let _ = defaults;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//!
//! [pipeline]
//! success_code = 200
//! max_body_size = 1048576
//! response_format = "json"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `HERMES__LOGGING__ENABLED` | `logging.enabled` |
//! | `HERMES__LOGGING__LEVEL` | `logging.level` |
//! | `HERMES__LOGGING__FORMAT` | `logging.format` |
//! | `HERMES__LOGGING__INCLUDE_LOCATION` | `logging.include_location` |
//! | `HERMES__PIPELINE__SUCCESS_CODE` | `pipeline.success_code` |
//! | `HERMES__PIPELINE__MAX_BODY_SIZE` | `pipeline.max_body_size` |
//! | `HERMES__PIPELINE__RESPONSE_FORMAT` | `pipeline.response_format` |

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HermesConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, PipelineSettings, ResponseFormat};
