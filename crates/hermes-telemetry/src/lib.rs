//! Structured logging for Hermes services.
//!
//! Hermes pipelines report through `tracing`: lifecycle transitions at
//! `debug`, failures at `error` via `hermes_core::TracingLogger`. Without a
//! subscriber those events go nowhere. This crate installs one.
//!
//! # Example
//!
//! ```rust,no_run
//! use hermes_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!("ready");
//! # Ok::<(), hermes_telemetry::TelemetryError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{build_subscriber, create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
