//! Hyper integration.
//!
//! [`Handler`] implements [`hyper::service::Service`], so it can be passed
//! straight to a connection builder:
//!
//! ```rust,ignore
//! let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), handler.clone());
//! ```
//!
//! The service never fails; every outcome is already an HTTP response.

use std::convert::Infallible;

use futures_util::future::BoxFuture;
use hermes_core::BoxError;
use hermes_extract::ResponseBody;
use http::{Request, Response};
use http_body::Body;
use hyper::service::Service;

use crate::pipeline::Handler;

impl<B> Service<Request<B>> for Handler
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(req).await) })
    }
}
