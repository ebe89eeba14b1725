//! # Hermes Test
//!
//! Test utilities for Hermes pipelines, providing in-memory HTTP testing
//! without network connections or port binding.
//!
//! ## Key Features
//!
//! - **In-Memory Testing**: requests are handed straight to a [`Handler`](hermes_pipeline::Handler)
//! - **Request Builder**: fluent API with JSON and form bodies
//! - **Response Assertions**: helpers for status, headers and bodies
//!
//! ## Example
//!
//! ```ignore
//! use hermes_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_user() {
//!     let client = TestClient::new(create_user_handler());
//!
//!     let response = client
//!         .post("/users")
//!         .json(&json!({ "name": "Alice" }))
//!         .send()
//!         .await;
//!
//!     response.assert_status(http::StatusCode::CREATED);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
