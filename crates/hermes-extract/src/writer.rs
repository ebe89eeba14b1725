//! Response writers.
//!
//! A [`ResponseWriter`] turns `(context, status, payload)` into exactly one
//! response. The status is always the one it was given; a payload that fails
//! to encode is reported to the error logger and the body is left empty.
//!
//! | Writer | Content-Type | Body |
//! |--------|--------------|------|
//! | [`ResponseWriter::json`] | `application/json; charset=utf-8` | JSON, empty for no payload |
//! | [`ResponseWriter::form`] | `application/x-www-form-urlencoded` | flat object as form pairs |
//! | [`ResponseWriter::form_with`] | `application/x-www-form-urlencoded` | pairs from a callback |
//! | [`ResponseWriter::no_content`] | none | none, status `204` |

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use hermes_core::{BoxError, ErrorLogger, Field, Payload, RequestContext};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use http_body_util::Full;

/// Body type of every response the pipeline produces.
pub type ResponseBody = Full<Bytes>;

/// Content type written by [`ResponseWriter::json`].
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type written by the form writers.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

type WriteFn =
    dyn Fn(&RequestContext, &dyn ErrorLogger, StatusCode, &Payload) -> Response<ResponseBody>
        + Send
        + Sync;

/// Pluggable response emitter.
///
/// # Example
///
/// ```rust
/// use hermes_core::{NoopLogger, Payload, RequestContext};
/// use hermes_extract::ResponseWriter;
/// use http::StatusCode;
///
/// let response = ResponseWriter::json().write(
///     &RequestContext::mock(),
///     &NoopLogger,
///     StatusCode::CREATED,
///     &Payload::new("success"),
/// );
///
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(
///     response.headers()["content-type"],
///     "application/json; charset=utf-8"
/// );
/// ```
#[derive(Clone)]
pub struct ResponseWriter(Arc<WriteFn>);

impl ResponseWriter {
    /// Writes the payload as JSON.
    ///
    /// No payload, or one that serializes to `null`, gives an empty body.
    #[must_use]
    pub fn json() -> Self {
        Self::custom(write_json)
    }

    /// Writes a flat, object-shaped payload as URL-encoded form pairs.
    ///
    /// Fields are written in declaration order.
    #[must_use]
    pub fn form() -> Self {
        Self::custom(
            |ctx: &RequestContext, logger: &dyn ErrorLogger, status, payload: &Payload| {
                write_form(ctx, logger, status, payload, |payload| {
                    let value = payload.to_value()?;
                    if value.is_null() {
                        return Ok(String::new());
                    }
                    Ok(serde_urlencoded::to_string(&value)?)
                })
            },
        )
    }

    /// Writes the `(key, value)` pairs produced by `encode` as a URL-encoded
    /// form.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hermes_core::Payload;
    /// use hermes_extract::ResponseWriter;
    ///
    /// let writer = ResponseWriter::form_with(|payload: &Payload| {
    ///     let name = payload.downcast_ref::<String>().ok_or("unexpected payload")?;
    ///     Ok::<_, &str>(vec![("name".to_string(), name.clone())])
    /// });
    /// # let _ = writer;
    /// ```
    pub fn form_with<E, F>(encode: F) -> Self
    where
        E: Into<BoxError>,
        F: Fn(&Payload) -> Result<Vec<(String, String)>, E> + Send + Sync + 'static,
    {
        Self::custom(
            move |ctx: &RequestContext, logger: &dyn ErrorLogger, status, payload: &Payload| {
                write_form(ctx, logger, status, payload, |payload| {
                    let pairs = encode(payload).map_err(Into::<BoxError>::into)?;
                    Ok(serde_urlencoded::to_string(pairs)?)
                })
            },
        )
    }

    /// Ignores the payload and writes `204 No Content`.
    #[must_use]
    pub fn no_content() -> Self {
        Self::custom(|_: &RequestContext, _: &dyn ErrorLogger, _, _: &Payload| {
            response(StatusCode::NO_CONTENT, None, Vec::new())
        })
    }

    /// Wraps an arbitrary write function.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hermes_core::{ErrorLogger, Payload, RequestContext};
    /// use hermes_extract::ResponseWriter;
    /// use http::StatusCode;
    ///
    /// let json = ResponseWriter::json();
    /// let writer = ResponseWriter::custom(
    ///     move |ctx: &RequestContext, logger: &dyn ErrorLogger, status, payload: &Payload| {
    ///         let mut response = json.write(ctx, logger, status, payload);
    ///         response
    ///             .headers_mut()
    ///             .insert("cache-control", http::HeaderValue::from_static("no-store"));
    ///         response
    ///     },
    /// );
    /// # let _ = writer;
    /// ```
    pub fn custom<F>(write: F) -> Self
    where
        F: Fn(&RequestContext, &dyn ErrorLogger, StatusCode, &Payload) -> Response<ResponseBody>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(write))
    }

    /// Writes one response.
    #[must_use]
    pub fn write(
        &self,
        ctx: &RequestContext,
        logger: &dyn ErrorLogger,
        status: StatusCode,
        payload: &Payload,
    ) -> Response<ResponseBody> {
        (self.0)(ctx, logger, status, payload)
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseWriter(..)")
    }
}

fn write_json(
    ctx: &RequestContext,
    logger: &dyn ErrorLogger,
    status: StatusCode,
    payload: &Payload,
) -> Response<ResponseBody> {
    let body = match payload.to_json_vec() {
        Ok(body) if body == b"null" => Vec::new(),
        Ok(body) => body,
        Err(err) => {
            logger.log_error(ctx, "failed to write JSON", &[Field::new("error", &err)]);
            Vec::new()
        }
    };
    response(status, Some(JSON_CONTENT_TYPE), body)
}

fn write_form(
    ctx: &RequestContext,
    logger: &dyn ErrorLogger,
    status: StatusCode,
    payload: &Payload,
    encode: impl FnOnce(&Payload) -> Result<String, BoxError>,
) -> Response<ResponseBody> {
    let body = if payload.is_empty() {
        Vec::new()
    } else {
        match encode(payload) {
            Ok(form) => form.into_bytes(),
            Err(err) => {
                logger.log_error(ctx, "failed to write Form Data", &[Field::new("error", &err)]);
                Vec::new()
            }
        }
    };
    response(status, Some(FORM_CONTENT_TYPE), body)
}

fn response(
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Vec<u8>,
) -> Response<ResponseBody> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}
