//! # Hermes Extract
//!
//! Request decoders and response writers for the Hermes typed request
//! pipeline.
//!
//! Both sides are pluggable per pipeline:
//!
//! | Side | Type | Built-ins |
//! |------|------|-----------|
//! | Request body | [`RequestReader`] | JSON, form, form with callback, custom |
//! | Response | [`ResponseWriter`] | JSON, form, form with callback, no content, custom |
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use hermes_core::{NoopLogger, Payload, RequestContext};
//! use hermes_extract::{RequestReader, ResponseWriter};
//! use http::StatusCode;
//!
//! let (parts, ()) = http::Request::post("/echo").body(()).unwrap().into_parts();
//! let input: String = RequestReader::json()
//!     .decode(&parts, &Bytes::from_static(br#""Hello World""#))
//!     .unwrap();
//!
//! let response = ResponseWriter::json().write(
//!     &RequestContext::mock(),
//!     &NoopLogger,
//!     StatusCode::OK,
//!     &Payload::new(input),
//! );
//! assert_eq!(response.status(), StatusCode::OK);
//! ```
//!
//! ## Error Handling
//!
//! Readers fail with [`DecodeError`](hermes_core::DecodeError), which the
//! pipeline classifies as `400 Bad Request` by default. Writers never fail:
//! encoding problems are reported to the error logger and the response keeps
//! its status with an empty body.

#![doc(html_root_url = "https://docs.rs/hermes-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod reader;
mod writer;

pub use reader::{Decoder, RequestReader, DEFAULT_MAX_BODY_SIZE};
pub use writer::{ResponseBody, ResponseWriter, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
