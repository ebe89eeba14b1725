//! # Hermes
//!
//! Typed HTTP request pipelines.
//!
//! An application function takes a request context and a decoded request
//! model and returns a result or an error. Hermes wraps it in a pipeline that
//! decodes the body, recovers panics, classifies errors into status codes
//! and payloads, logs failures and writes exactly one response.
//!
//! ## Crates
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`core`] | `hermes-core` | Request context, parameters, error taxonomy, payloads, logger interface |
//! | [`extract`] | `hermes-extract` | Request readers and response writers |
//! | [`pipeline`] | `hermes-pipeline` | Pipelines, options, error matchers, process-wide defaults |
//! | [`telemetry`] | `hermes-telemetry` | Logging setup |
//! | [`config`] | `hermes-config` | Layered service configuration |
//!
//! ## Example
//!
//! ```rust
//! use hermes::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Greet {
//!     name: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Greeting {
//!     message: String,
//!     tenant: String,
//! }
//!
//! async fn greet(ctx: RequestContext, req: Greet) -> Result<Greeting, BoxError> {
//!     if req.name.is_empty() {
//!         return Err("name is required".into());
//!     }
//!     Ok(Greeting {
//!         message: format!("hello {}", req.name),
//!         tenant: ctx.param("x-tenant").to_string(),
//!     })
//! }
//!
//! let handler: Handler = Pipeline::action(greet).with([
//!     options::success_code(StatusCode::CREATED),
//!     options::header_param("x-tenant"),
//! ]);
//! # let _ = handler;
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use hermes_core as core;

// Re-export readers and writers
pub use hermes_extract as extract;

// Re-export the pipeline
pub use hermes_pipeline as pipeline;

// Re-export logging setup
pub use hermes_telemetry as telemetry;

// Re-export configuration
pub use hermes_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_core::{
        BoxError, DecodeError, ErrorLogger, Field, ParamReader, ParamSource, Payload,
        PipelineError, ReadParam, RecoveredError, RequestContext, RequestId,
    };

    pub use hermes_extract::{RequestReader, ResponseWriter};

    pub use hermes_pipeline::{
        options, set_default_error_handlers, set_logger, ErrorMatcher, Handler, Opt, Pipeline,
    };

    pub use http::StatusCode;
}
