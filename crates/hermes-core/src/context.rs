//! Request context types.
//!
//! The [`RequestContext`] carries per-request state from the pipeline into the
//! application function, the error matchers and the error logger.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::request::Parts;
use http::{Extensions, Method};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::params::ResolvedParams;

/// Header used to propagate a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use hermes_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Private key under which resolved parameters live in the value store.
///
/// Only [`RequestContext::param`] and [`RequestContext::params`] can reach it.
#[derive(Clone)]
struct ParamsKey(Arc<ResolvedParams>);

/// Per-request context handed to application functions.
///
/// `RequestContext` carries:
/// - A unique request ID for log correlation
/// - The request method and path
/// - A typed value store for request-scoped data
/// - The snapshot of resolved parameters (see [`RequestContext::param`])
///
/// Cloning is cheap enough to hand a copy to the application function while
/// the pipeline keeps its own for classification and logging.
///
/// # Example
///
/// ```
/// use hermes_core::RequestContext;
///
/// let ctx = RequestContext::new();
/// println!("Processing request: {}", ctx.request_id());
/// assert_eq!(ctx.param("missing"), "");
/// ```
#[derive(Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    values: Extensions,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a new request context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            method: Method::GET,
            path: "/".to_string(),
            values: Extensions::new(),
            started_at: Instant::now(),
        }
    }

    /// Creates a context for an incoming request.
    ///
    /// The request id is taken from the `x-request-id` header when it holds a
    /// valid UUID, otherwise a new one is generated.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map_or_else(RequestId::new, RequestId::from_uuid);

        Self {
            request_id,
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            values: Extensions::new(),
            started_at: Instant::now(),
        }
    }

    /// Creates a mock context for testing purposes.
    #[must_use]
    pub fn mock() -> Self {
        Self::new()
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a request-scoped value, returning the previous value of that type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values.insert(value)
    }

    /// Returns a request-scoped value by type.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    /// Attaches the resolved parameter snapshot for this request.
    pub fn set_params(&mut self, params: ResolvedParams) {
        self.values.insert(ParamsKey(Arc::new(params)));
    }

    /// Returns a new context with the given resolved parameters attached.
    #[must_use]
    pub fn with_params(mut self, params: ResolvedParams) -> Self {
        self.set_params(params);
        self
    }

    /// Returns a resolved parameter by name.
    ///
    /// Never fails: a name that was not resolved for this request, or a
    /// context without resolved parameters, yields an empty string.
    #[must_use]
    pub fn param(&self, name: &str) -> &str {
        self.values
            .get::<ParamsKey>()
            .map_or("", |ParamsKey(params)| params.get(name))
    }

    /// Returns the whole resolved parameter snapshot, if one was attached.
    #[must_use]
    pub fn params(&self) -> Option<&ResolvedParams> {
        self.values
            .get::<ParamsKey>()
            .map(|ParamsKey(params)| params.as_ref())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params())
            .finish_non_exhaustive()
    }
}
