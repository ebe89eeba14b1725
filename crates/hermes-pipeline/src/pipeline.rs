//! The pipeline core.
//!
//! A [`Pipeline`] adapts one application function into a [`Handler`]. Every
//! request goes through the same steps, strictly in order:
//!
//! 1. resolve the configured parameters into the request context
//! 2. read and decode the body, for functions that take a request model
//! 3. invoke the function inside the panic recovery boundary
//! 4. on success, write the result with the configured success status
//! 5. on failure (decode error, returned error or panic), classify the
//!    error, log it, then write the classified status and payload
//!
//! Exactly one response is produced per request.
//!
//! | Constructor | Function signature |
//! |-------------|--------------------|
//! | [`Pipeline::action`] | `(RequestContext, T) -> Result<U, E>` |
//! | [`Pipeline::action_with_params`] | `(RequestContext, T, ReadParam) -> Result<U, E>` |
//! | [`Pipeline::callback_action`] | `(RequestContext, T) -> Result<U, E>`, `T` decoded by a callback reader |
//! | [`Pipeline::callback_action_with_params`] | `(RequestContext, T, ReadParam) -> Result<U, E>`, same |
//! | [`Pipeline::task`] | `(RequestContext) -> Result<U, E>` |
//! | [`Pipeline::task_with_params`] | `(RequestContext, ReadParam) -> Result<U, E>` |
//!
//! All functions are async.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use hermes_core::{
    BoxError, DecodeError, Field, ParamReader, Payload, PipelineError, ReadParam, RequestContext,
    ResolvedParams,
};
use hermes_extract::{Decoder, RequestReader, ResponseBody};
use http::request::Parts;
use http::{Request, Response};
use http_body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::classify::classify;
use crate::options::{Opt, Options};
use crate::recover::recover;

type AppFuture = BoxFuture<'static, Result<Payload, BoxError>>;

/// A decoded request, ready to be handed to the application function.
type Invocation = Box<dyn FnOnce() -> AppFuture + Send>;

/// Decodes the body for one request and binds the application function to
/// its arguments.
type Prepare =
    dyn Fn(RequestContext, ReadParam, &Parts, Bytes) -> Result<Invocation, DecodeError> + Send + Sync;

/// Turns the finished options into the per-request entry point.
type Bind = Box<dyn FnOnce(&Options) -> Box<Prepare> + Send>;

/// An application function waiting for its options.
///
/// # Example
///
/// ```rust
/// use hermes_core::RequestContext;
/// use hermes_pipeline::{options, Pipeline};
/// use http::StatusCode;
///
/// let handler = Pipeline::action(|_ctx: RequestContext, name: String| async move {
///     Ok::<_, std::convert::Infallible>(format!("hello {name}"))
/// })
/// .with([options::success_code(StatusCode::CREATED)]);
/// # let _ = handler;
/// ```
pub struct Pipeline {
    name: &'static str,
    reads_body: bool,
    bind: Bind,
}

impl Pipeline {
    /// Adapts a function of the context and a decoded request model.
    pub fn action<T, U, E, F, Fut>(f: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        U: Serialize + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(RequestContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        Self::action_with_params(move |ctx, model, _: ReadParam| f(ctx, model))
    }

    /// Adapts a function of the context, a decoded request model and the
    /// parameter accessor.
    pub fn action_with_params<T, U, E, F, Fut>(f: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        U: Serialize + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(RequestContext, T, ReadParam) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        Self::decoding("action", f, RequestReader::decoder::<T>)
    }

    /// Adapts a function whose request model is produced only by a
    /// [`RequestReader::form_with`] or [`RequestReader::custom`] callback.
    ///
    /// The model needs no serde `Deserialize` impl. Building the handler
    /// panics unless one of those readers is configured for `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hermes_core::{BoxError, RequestContext};
    /// use hermes_extract::RequestReader;
    /// use hermes_pipeline::{options, Pipeline};
    ///
    /// struct Query(String);
    ///
    /// let reader = RequestReader::form_with(|pairs: &[(String, String)]| {
    ///     pairs
    ///         .iter()
    ///         .find(|(k, _)| k == "q")
    ///         .map(|(_, v)| Query(v.clone()))
    ///         .ok_or("missing q")
    /// });
    ///
    /// let handler = Pipeline::callback_action(|_: RequestContext, query: Query| async move {
    ///     Ok::<_, BoxError>(query.0.len())
    /// })
    /// .with([options::request_reader(reader)]);
    /// # let _ = handler;
    /// ```
    pub fn callback_action<T, U, E, F, Fut>(f: F) -> Self
    where
        T: Send + 'static,
        U: Serialize + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(RequestContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        Self::callback_action_with_params(move |ctx, model, _: ReadParam| f(ctx, model))
    }

    /// Like [`callback_action`](Self::callback_action), with the parameter
    /// accessor.
    pub fn callback_action_with_params<T, U, E, F, Fut>(f: F) -> Self
    where
        T: Send + 'static,
        U: Serialize + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(RequestContext, T, ReadParam) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        Self::decoding("callback action", f, RequestReader::callback_decoder::<T>)
    }

    fn decoding<T, U, E, F, Fut>(
        name: &'static str,
        f: F,
        resolve: fn(&RequestReader) -> Decoder<T>,
    ) -> Self
    where
        T: Send + 'static,
        U: Serialize + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(RequestContext, T, ReadParam) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        let f = Arc::new(f);
        Self {
            name,
            reads_body: true,
            bind: Box::new(move |options: &Options| -> Box<Prepare> {
                let decode = resolve(options.request_reader());
                Box::new(
                    move |ctx: RequestContext, read: ReadParam, parts: &Parts, body: Bytes| {
                        let model = (*decode)(parts, &body)?;
                        let f = Arc::clone(&f);
                        Ok(Box::new(move || app_future((*f)(ctx, model, read))) as Invocation)
                    },
                )
            }),
        }
    }

    /// Adapts a function of the context alone. The body is never read.
    pub fn task<U, E, F, Fut>(f: F) -> Self
    where
        U: Serialize + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        Self::task_with_params(move |ctx, _: ReadParam| f(ctx))
    }

    /// Adapts a function of the context and the parameter accessor. The body
    /// is never read.
    pub fn task_with_params<U, E, F, Fut>(f: F) -> Self
    where
        U: Serialize + Send + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(RequestContext, ReadParam) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        let f = Arc::new(f);
        Self {
            name: "task",
            reads_body: false,
            bind: Box::new(move |_: &Options| -> Box<Prepare> {
                Box::new(
                    move |ctx: RequestContext, read: ReadParam, _: &Parts, _: Bytes| {
                        let f = Arc::clone(&f);
                        Ok(Box::new(move || app_future((*f)(ctx, read))) as Invocation)
                    },
                )
            }),
        }
    }

    /// Applies `opts` in order on top of the defaults and builds the handler.
    ///
    /// # Panics
    ///
    /// Panics on configuration errors, such as a custom request reader built
    /// for a different model type.
    pub fn with(self, opts: impl IntoIterator<Item = Opt>) -> Handler {
        let options = Options::from_opts(opts);
        let params = options.param_readers();
        let prepare = (self.bind)(&options);
        debug!(
            kind = self.name,
            params = params.len(),
            matchers = options.error_matchers().len(),
            "pipeline built"
        );

        Handler {
            inner: Arc::new(Inner {
                options,
                params,
                prepare,
                reads_body: self.reads_body,
            }),
        }
    }

    /// Builds the handler with the default options.
    #[must_use]
    pub fn build(self) -> Handler {
        self.with([])
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("kind", &self.name)
            .field("reads_body", &self.reads_body)
            .finish_non_exhaustive()
    }
}

fn app_future<U, E, Fut>(fut: Fut) -> AppFuture
where
    U: Serialize + Send + 'static,
    E: Into<BoxError> + 'static,
    Fut: Future<Output = Result<U, E>> + Send + 'static,
{
    Box::pin(async move { fut.await.map(Payload::new).map_err(Into::into) })
}

struct Inner {
    options: Options,
    params: IndexMap<String, ParamReader>,
    prepare: Box<Prepare>,
    reads_body: bool,
}

/// A finished pipeline, ready to serve requests.
///
/// Cheap to clone; all clones share one immutable configuration.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<Inner>,
}

impl Handler {
    /// Returns the configuration this handler was built with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    /// Processes one request and produces its response.
    ///
    /// Dropping the returned future abandons the request, including the
    /// application function.
    pub async fn handle<B>(&self, request: Request<B>) -> Response<ResponseBody>
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();
        let mut ctx = RequestContext::from_parts(&parts);
        ctx.set_params(ResolvedParams::resolve(&self.inner.params, &parts));
        debug!(
            request_id = %ctx.request_id(),
            http.method = %ctx.method(),
            http.path = %ctx.path(),
            "parameters resolved"
        );

        let parts = Arc::new(parts);
        match self.run(ctx.clone(), parts, body).await {
            Ok(payload) => self.succeed(&ctx, &payload),
            Err(err) => self.fail(&ctx, &err),
        }
    }

    async fn run<B>(
        &self,
        ctx: RequestContext,
        parts: Arc<Parts>,
        body: B,
    ) -> Result<Payload, PipelineError>
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
    {
        let body = if self.inner.reads_body {
            read_body(body, self.inner.options.max_body_size()).await?
        } else {
            Bytes::new()
        };

        let request_id = ctx.request_id();
        let read = ReadParam::new(Arc::clone(&parts), self.inner.options.url_reader().cloned());
        let invocation = (self.inner.prepare)(ctx, read, &parts, body)?;
        debug!(%request_id, "request decoded");

        let result = recover(invocation).await?;
        debug!(%request_id, ok = result.is_ok(), "application function returned");
        result.map_err(PipelineError::Handler)
    }

    fn succeed(&self, ctx: &RequestContext, payload: &Payload) -> Response<ResponseBody> {
        let options = &self.inner.options;
        let logger = options.error_logger();
        let response =
            options
                .response_writer()
                .write(ctx, logger.as_ref(), options.success_code(), payload);
        debug!(
            request_id = %ctx.request_id(),
            status = response.status().as_u16(),
            elapsed = ?ctx.elapsed(),
            "request completed"
        );
        response
    }

    fn fail(&self, ctx: &RequestContext, err: &PipelineError) -> Response<ResponseBody> {
        let options = &self.inner.options;
        let (status, payload) = classify(err, ctx, options.error_matchers());

        let logger = options.error_logger();
        let code = status.as_u16();
        match err {
            PipelineError::Decode(_) => logger.log_error(
                ctx,
                "failed to read request content",
                &[Field::new("error", err), Field::new("status", &code)],
            ),
            PipelineError::Recovered(recovered) => {
                let stack = recovered.stack();
                // A matcher that claimed the panic rendered its value into the payload.
                let value = payload.to_value().ok().filter(|value| !value.is_null());
                let mut fields = vec![
                    Field::new("error", err),
                    Field::new("status", &code),
                    Field::new("stack", &stack),
                ];
                if let Some(value) = &value {
                    fields.push(Field::new("panic_value", value));
                }
                logger.log_error(ctx, "recovered from panic during request", &fields);
            }
            PipelineError::Handler(_) => logger.log_error(
                ctx,
                "request failed",
                &[Field::new("error", err), Field::new("status", &code)],
            ),
        }

        let response = options
            .response_writer()
            .write(ctx, logger.as_ref(), status, &payload);
        debug!(
            request_id = %ctx.request_id(),
            status = response.status().as_u16(),
            elapsed = ?ctx.elapsed(),
            "request failed"
        );
        response
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("options", &self.inner.options)
            .field("reads_body", &self.inner.reads_body)
            .finish_non_exhaustive()
    }
}

async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, DecodeError>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    Limited::new(body, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|err| {
            if err.is::<LengthLimitError>() {
                DecodeError::payload_too_large(limit)
            } else {
                DecodeError::new(err)
            }
        })
}
