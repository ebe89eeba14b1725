//! # Hermes Pipeline
//!
//! The typed request pipeline: decode, invoke, recover, classify, respond.
//!
//! A [`Pipeline`] wraps an async application function. Configuring it with
//! [`options`] yields a [`Handler`], which turns each HTTP request into
//! exactly one HTTP response:
//!
//! - the body is decoded into the function's request model by the configured
//!   [`RequestReader`](hermes_extract::RequestReader)
//! - panics in the function are recovered and reported as errors
//! - errors are classified by the [`ErrorMatcher`] chain into a status and
//!   payload
//! - the outcome is written by the configured
//!   [`ResponseWriter`](hermes_extract::ResponseWriter)
//!
//! ## Example
//!
//! ```rust
//! use hermes_core::RequestContext;
//! use hermes_pipeline::{options, ErrorMatcher, Pipeline};
//! use http::StatusCode;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct CreateUser {
//!     name: String,
//! }
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[derive(Debug, Clone, Serialize)]
//! struct Duplicate {
//!     name: String,
//! }
//!
//! impl std::fmt::Display for Duplicate {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "user {} already exists", self.name)
//!     }
//! }
//!
//! impl std::error::Error for Duplicate {}
//!
//! async fn create_user(_ctx: RequestContext, req: CreateUser) -> Result<User, Duplicate> {
//!     if req.name == "root" {
//!         return Err(Duplicate { name: req.name });
//!     }
//!     Ok(User { id: 1, name: req.name })
//! }
//!
//! let handler = Pipeline::action(create_user).with([
//!     options::success_code(StatusCode::CREATED),
//!     options::error_handlers([ErrorMatcher::if_error::<Duplicate>(StatusCode::CONFLICT)]),
//! ]);
//! # let _ = handler;
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod classify;
mod defaults;
pub mod options;
mod pipeline;
mod recover;
mod service;

pub use classify::{classify, ErrorMatcher};
pub use defaults::{default_error_handlers, logger, set_default_error_handlers, set_logger};
pub use options::{Opt, Options};
pub use pipeline::{Handler, Pipeline};
