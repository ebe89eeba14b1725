//! # Hermes Core
//!
//! Core types for the Hermes typed request pipeline.
//!
//! This crate provides the foundational types shared by every pipeline:
//!
//! - [`RequestContext`] - Per-request context carrying the request id, a typed
//!   value store and the resolved parameter snapshot
//! - [`RequestId`] - UUID v7 request identifier
//! - [`ParamSource`], [`ParamReader`], [`ReadParam`] - Uniform access to values
//!   stored in headers or URL/route parameters
//! - [`PipelineError`], [`DecodeError`], [`RecoveredError`] - The error taxonomy
//!   every failure is funnelled through
//! - [`Payload`] - Type-erased, serializable response payload
//! - [`ErrorLogger`] - The logging interface the pipeline reports failures to

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod logger;
mod params;
mod payload;

pub use context::{RequestContext, RequestId, REQUEST_ID_HEADER};
pub use error::{BoxError, DecodeError, PipelineError, RecoveredError};
pub use logger::{ErrorLogger, Field, NoopLogger, TracingLogger};
pub use params::{from_headers, ParamReader, ParamSource, ReadParam, ResolvedParams};
pub use payload::Payload;
