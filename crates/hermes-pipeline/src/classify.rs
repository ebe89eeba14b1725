//! Error classification chain.
//!
//! A failure is turned into `(status, payload)` by trying matchers in order:
//!
//! 1. the pipeline's own matchers, in registration order
//! 2. the process-wide defaults (see [`set_default_error_handlers`](crate::set_default_error_handlers))
//! 3. the built-in fallback: decode errors become `400`, everything else
//!    `500`, both with the error message as payload
//!
//! The first matcher that returns `Some` wins.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use hermes_core::{Payload, PipelineError, RequestContext};
use http::StatusCode;
use serde::Serialize;

use crate::defaults::default_error_handlers;

type MatchFn =
    dyn Fn(&PipelineError, &RequestContext) -> Option<(StatusCode, Payload)> + Send + Sync;

/// One link of the classification chain.
///
/// A matcher inspects a failure and either claims it with a status and
/// payload, or declines with `None`.
///
/// # Example
///
/// ```rust
/// use hermes_core::{Payload, PipelineError, RequestContext};
/// use hermes_pipeline::ErrorMatcher;
/// use http::StatusCode;
///
/// #[derive(Debug, Clone, serde::Serialize)]
/// struct NotFound {
///     resource: String,
/// }
///
/// impl std::fmt::Display for NotFound {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{} not found", self.resource)
///     }
/// }
///
/// impl std::error::Error for NotFound {}
///
/// let matcher = ErrorMatcher::if_error::<NotFound>(StatusCode::NOT_FOUND);
///
/// let err = PipelineError::handler(NotFound { resource: "user".into() });
/// let (status, payload) = matcher.check(&err, &RequestContext::mock()).unwrap();
/// assert_eq!(status, StatusCode::NOT_FOUND);
/// assert_eq!(payload.to_json_vec().unwrap(), br#"{"resource":"user"}"#);
///
/// let other = PipelineError::handler("boom");
/// assert!(matcher.check(&other, &RequestContext::mock()).is_none());
/// ```
#[derive(Clone)]
pub struct ErrorMatcher(Arc<MatchFn>);

impl ErrorMatcher {
    /// Creates a matcher from a raw function over the error.
    ///
    /// No type constraint applies; the function sees every failure.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&PipelineError, &RequestContext) -> Option<(StatusCode, Payload)>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(check))
    }

    /// Matches errors of type `E` and responds with the error value itself.
    ///
    /// `E` is looked up along the error's source chain, and in the panic
    /// value of recovered panics.
    #[must_use]
    pub fn if_error<E>(status: StatusCode) -> Self
    where
        E: StdError + Serialize + Clone + Send + Sync + 'static,
    {
        Self::new(move |err, _| err.find::<E>().map(|e| (status, Payload::new(e.clone()))))
    }

    /// Matches errors of type `E` and responds with the payload built by `as_payload`.
    pub fn if_error_use<E, P, F>(status: StatusCode, as_payload: F) -> Self
    where
        E: StdError + 'static,
        P: Serialize + Send + 'static,
        F: Fn(&E, &RequestContext) -> P + Send + Sync + 'static,
    {
        Self::new(move |err, ctx| {
            err.find::<E>()
                .map(|e| (status, Payload::new(as_payload(e, ctx))))
        })
    }

    /// Runs the matcher against one failure.
    #[must_use]
    pub fn check(
        &self,
        err: &PipelineError,
        ctx: &RequestContext,
    ) -> Option<(StatusCode, Payload)> {
        (self.0)(err, ctx)
    }
}

impl fmt::Debug for ErrorMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorMatcher(..)")
    }
}

/// Classifies a failure: pipeline matchers, then process-wide defaults, then
/// the built-in fallback.
#[must_use]
pub fn classify(
    err: &PipelineError,
    ctx: &RequestContext,
    matchers: &[ErrorMatcher],
) -> (StatusCode, Payload) {
    let defaults = default_error_handlers();
    matchers
        .iter()
        .chain(defaults.iter())
        .find_map(|matcher| matcher.check(err, ctx))
        .unwrap_or_else(|| fallback(err))
}

fn fallback(err: &PipelineError) -> (StatusCode, Payload) {
    let status = if err.is_decode() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Payload::new(err.to_string()))
}
