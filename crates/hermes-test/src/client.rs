//! Test client for in-memory HTTP testing.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use hermes_pipeline::Handler;
use http::Method;
use serde::Serialize;

/// A test client for making in-memory HTTP requests.
///
/// Drives a [`Handler`] directly, without starting a server or binding a
/// port. Every request goes through the complete pipeline.
///
/// # Example
///
/// ```
/// use hermes_core::RequestContext;
/// use hermes_pipeline::Pipeline;
/// use hermes_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let handler = Pipeline::action(|_: RequestContext, name: String| async move {
///     Ok::<_, std::convert::Infallible>(format!("hello {name}"))
/// })
/// .build();
///
/// let client = TestClient::new(handler);
/// let response = client.post("/greet").json(&"world").send().await;
///
/// assert_eq!(response.status_code(), 200);
/// assert_eq!(response.json::<String>().unwrap(), "hello world");
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    handler: Handler,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a new test client for a handler.
    pub fn new(handler: Handler) -> Self {
        Self {
            handler,
            default_headers: Vec::new(),
        }
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Sends a test request through the handler.
    pub async fn send(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.handler.handle(request.into_http_request()).await;
        TestResponse::from_http(response).await
    }
}

/// A request builder bound to a test client.
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let mut builder = builder;
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the request body as form-urlencoded.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("request should succeed")
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{ReadParam, RequestContext};
    use hermes_pipeline::{options, Pipeline};
    use http::StatusCode;
    use serde_json::json;
    use std::convert::Infallible;

    fn echo_headers() -> Handler {
        Pipeline::task_with_params(|ctx: RequestContext, read: ReadParam| async move {
            Ok::<_, Infallible>(json!({
                "method": ctx.method().as_str(),
                "path": ctx.path(),
                "tenant": read.header("x-tenant"),
                "content_type": read.header("content-type"),
            }))
        })
        .build()
    }

    #[tokio::test]
    async fn test_action_roundtrip() {
        let handler = Pipeline::action(|_: RequestContext, n: i64| async move {
            Ok::<_, Infallible>(n + 1)
        })
        .with([options::success_code(StatusCode::CREATED)]);

        let response = TestClient::new(handler).post("/inc").json(&41).send().await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<i64>().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_methods_and_paths() {
        let client = TestClient::new(echo_headers());

        for (response, method) in [
            (client.get("/a").send().await, "GET"),
            (client.put("/a").send().await, "PUT"),
            (client.patch("/a").send().await, "PATCH"),
            (client.delete("/a").send().await, "DELETE"),
            (client.request(Method::HEAD, "/a").send().await, "HEAD"),
        ] {
            let body = response.json_value().unwrap();
            assert_eq!(body["method"], method);
            assert_eq!(body["path"], "/a");
        }
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = TestClient::new(echo_headers()).with_default_header("X-Tenant", "acme");

        let response = client.get("/").send().await;
        assert_eq!(response.json_value().unwrap()["tenant"], "acme");
    }

    #[tokio::test]
    async fn test_json_sets_content_type() {
        let client = TestClient::new(echo_headers());

        let response = client.post("/").json(&json!({"name": "Alice"})).send().await;
        assert_eq!(
            response.json_value().unwrap()["content_type"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let client = TestClient::new(echo_headers());

        let result = client.get("/").header("bad name", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
