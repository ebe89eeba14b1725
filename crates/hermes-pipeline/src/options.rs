//! Pipeline options.
//!
//! A pipeline is configured by an ordered list of [`Opt`] values applied on
//! top of fixed defaults:
//!
//! | Setting | Default | Option | Repeated use |
//! |---------|---------|--------|--------------|
//! | success status | `200 OK` | [`success_code`] | last wins |
//! | request reader | JSON | [`request_reader`] | last wins |
//! | response writer | JSON | [`response_writer`] | last wins |
//! | error logger | process-wide logger | [`error_logger`] | last wins |
//! | error matchers | none | [`error_handlers`] | appends |
//! | named parameters | none | [`header_param`], [`url_param`], [`param`] | inserts |
//! | URL parameter reader | none | [`url_reader`] | last wins |
//! | body size limit | 1 MB | [`max_body_size`] | last wins |
//!
//! [`defaults`] packages several options into one reusable unit.
//!
//! # Example
//!
//! ```rust
//! use hermes_core::NoopLogger;
//! use hermes_pipeline::options::{self, Options};
//! use http::StatusCode;
//!
//! let shared = options::defaults([
//!     options::error_logger(NoopLogger),
//!     options::header_param("x-tenant"),
//! ]);
//!
//! let options = Options::from_opts([shared, options::success_code(StatusCode::CREATED)]);
//! assert_eq!(options.success_code(), StatusCode::CREATED);
//! assert!(options.has_error_logger());
//! ```

use std::fmt;
use std::sync::Arc;

use hermes_core::{ErrorLogger, ParamReader, ParamSource};
use hermes_extract::{RequestReader, ResponseWriter, DEFAULT_MAX_BODY_SIZE};
use http::StatusCode;
use indexmap::IndexMap;

use crate::classify::ErrorMatcher;

/// One configuration step.
///
/// Options are plain functions over [`Options`], applied in order when a
/// pipeline is built.
#[derive(Clone)]
pub struct Opt(Arc<dyn Fn(&mut Options) + Send + Sync>);

impl Opt {
    /// Wraps a mutation of the options.
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(&mut Options) + Send + Sync + 'static,
    {
        Self(Arc::new(apply))
    }

    /// Applies this option.
    pub fn apply(&self, options: &mut Options) {
        (self.0)(options);
    }
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opt(..)")
    }
}

/// How a named parameter is read.
#[derive(Clone)]
enum ParamBinding {
    Source(ParamSource),
    Reader(ParamReader),
}

/// Finished pipeline configuration.
#[derive(Clone)]
pub struct Options {
    success_code: StatusCode,
    request_reader: RequestReader,
    response_writer: ResponseWriter,
    error_logger: Option<Arc<dyn ErrorLogger>>,
    error_matchers: Vec<ErrorMatcher>,
    params: IndexMap<String, ParamBinding>,
    url_reader: Option<ParamReader>,
    max_body_size: usize,
}

impl Options {
    /// Returns the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            success_code: StatusCode::OK,
            request_reader: RequestReader::json(),
            response_writer: ResponseWriter::json(),
            error_logger: None,
            error_matchers: Vec::new(),
            params: IndexMap::new(),
            url_reader: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Applies `opts` in order on top of the defaults.
    #[must_use]
    pub fn from_opts(opts: impl IntoIterator<Item = Opt>) -> Self {
        let mut options = Self::new();
        for opt in opts {
            opt.apply(&mut options);
        }
        options
    }

    /// Status written for successful invocations.
    #[must_use]
    pub const fn success_code(&self) -> StatusCode {
        self.success_code
    }

    /// The request body decoder.
    #[must_use]
    pub const fn request_reader(&self) -> &RequestReader {
        &self.request_reader
    }

    /// The response emitter.
    #[must_use]
    pub const fn response_writer(&self) -> &ResponseWriter {
        &self.response_writer
    }

    /// Returns `true` if an error logger was configured.
    #[must_use]
    pub const fn has_error_logger(&self) -> bool {
        self.error_logger.is_some()
    }

    /// The logger failures are reported to.
    ///
    /// Falls back to the process-wide logger at the time of the call.
    #[must_use]
    pub fn error_logger(&self) -> Arc<dyn ErrorLogger> {
        self.error_logger
            .as_ref()
            .map_or_else(crate::defaults::logger, Arc::clone)
    }

    /// Pipeline-specific error matchers, in registration order.
    #[must_use]
    pub fn error_matchers(&self) -> &[ErrorMatcher] {
        &self.error_matchers
    }

    /// Names of the registered parameters, in registration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// The reader for [`ParamSource::Url`], if one was configured.
    #[must_use]
    pub const fn url_reader(&self) -> Option<&ParamReader> {
        self.url_reader.as_ref()
    }

    /// Maximum accepted request body size in bytes.
    #[must_use]
    pub const fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Resolves every registered name to the reader that serves it.
    ///
    /// Names bound to [`ParamSource::Url`] use the URL reader configured by
    /// the time the pipeline is built; without one they read as empty.
    pub(crate) fn param_readers(&self) -> IndexMap<String, ParamReader> {
        self.params
            .iter()
            .map(|(name, binding)| {
                let reader = match binding {
                    ParamBinding::Reader(reader) => reader.clone(),
                    ParamBinding::Source(ParamSource::Header) => ParamReader::headers(),
                    ParamBinding::Source(ParamSource::Url) => self
                        .url_reader
                        .clone()
                        .unwrap_or_else(|| ParamReader::new(|_, _| String::new())),
                };
                (name.clone(), reader)
            })
            .collect()
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("success_code", &self.success_code)
            .field("request_reader", &self.request_reader)
            .field("error_logger", &self.error_logger.is_some())
            .field("error_matchers", &self.error_matchers.len())
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("url_reader", &self.url_reader.is_some())
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

/// Sets the status written for successful invocations.
#[must_use]
pub fn success_code(status: StatusCode) -> Opt {
    Opt::new(move |o| o.success_code = status)
}

/// Appends error matchers after those already registered.
pub fn error_handlers(matchers: impl IntoIterator<Item = ErrorMatcher>) -> Opt {
    let matchers: Vec<ErrorMatcher> = matchers.into_iter().collect();
    Opt::new(move |o| o.error_matchers.extend(matchers.iter().cloned()))
}

/// Sets the logger failures are reported to.
pub fn error_logger(logger: impl ErrorLogger) -> Opt {
    let logger: Arc<dyn ErrorLogger> = Arc::new(logger);
    Opt::new(move |o| o.error_logger = Some(Arc::clone(&logger)))
}

/// Registers a named parameter read by a custom reader.
pub fn param(name: impl Into<String>, reader: ParamReader) -> Opt {
    bind(name.into(), ParamBinding::Reader(reader))
}

/// Registers a named parameter read from the request headers.
pub fn header_param(name: impl Into<String>) -> Opt {
    bind(name.into(), ParamBinding::Source(ParamSource::Header))
}

/// Registers a named parameter read from the URL through the
/// [`url_reader`].
pub fn url_param(name: impl Into<String>) -> Opt {
    bind(name.into(), ParamBinding::Source(ParamSource::Url))
}

fn bind(name: String, binding: ParamBinding) -> Opt {
    Opt::new(move |o| {
        o.params.insert(name.clone(), binding.clone());
    })
}

/// Sets the reader for URL and route parameters.
///
/// Route parameters are extracted by the hosting router; this reader only
/// fetches them from wherever the router left them.
#[must_use]
pub fn url_reader(reader: ParamReader) -> Opt {
    Opt::new(move |o| o.url_reader = Some(reader.clone()))
}

/// Sets the request body decoder.
#[must_use]
pub fn request_reader(reader: RequestReader) -> Opt {
    Opt::new(move |o| o.request_reader = reader.clone())
}

/// Sets the response emitter.
#[must_use]
pub fn response_writer(writer: ResponseWriter) -> Opt {
    Opt::new(move |o| o.response_writer = writer.clone())
}

/// Sets the maximum accepted request body size in bytes.
///
/// # Panics
///
/// Panics when the option is applied with a limit of zero.
#[must_use]
pub fn max_body_size(limit: usize) -> Opt {
    Opt::new(move |o| {
        assert!(limit > 0, "max_body_size must be greater than zero");
        o.max_body_size = limit;
    })
}

/// Packages several options into one.
///
/// Applying the bundle applies its options in their original order.
pub fn defaults(opts: impl IntoIterator<Item = Opt>) -> Opt {
    let opts: Vec<Opt> = opts.into_iter().collect();
    Opt::new(move |o| {
        for opt in &opts {
            opt.apply(o);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Field, NoopLogger, RequestContext};

    fn parts() -> http::request::Parts {
        http::Request::get("/orders/17")
            .header("x-tenant", "acme")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();

        assert_eq!(options.success_code(), StatusCode::OK);
        assert!(!options.has_error_logger());
        assert!(options.error_matchers().is_empty());
        assert_eq!(options.param_names().count(), 0);
        assert!(options.url_reader().is_none());
        assert_eq!(options.max_body_size(), DEFAULT_MAX_BODY_SIZE);
        assert_eq!(
            format!("{:?}", options.request_reader()),
            "RequestReader::Json"
        );
    }

    #[test]
    fn test_scalar_options_last_wins() {
        let options = Options::from_opts([
            success_code(StatusCode::CREATED),
            success_code(StatusCode::ACCEPTED),
            request_reader(RequestReader::form()),
            max_body_size(16),
        ]);

        assert_eq!(options.success_code(), StatusCode::ACCEPTED);
        assert_eq!(
            format!("{:?}", options.request_reader()),
            "RequestReader::Form"
        );
        assert_eq!(options.max_body_size(), 16);
    }

    #[test]
    fn test_error_handlers_append() {
        let options = Options::from_opts([
            error_handlers([ErrorMatcher::new(|_, _| None)]),
            error_handlers([ErrorMatcher::new(|_, _| None), ErrorMatcher::new(|_, _| None)]),
        ]);

        assert_eq!(options.error_matchers().len(), 3);
    }

    #[test]
    fn test_defaults_bundle_applies_in_order() {
        let shared = defaults([
            success_code(StatusCode::CREATED),
            error_handlers([ErrorMatcher::new(|_, _| None)]),
            header_param("x-tenant"),
        ]);

        let options = Options::from_opts([
            shared.clone(),
            success_code(StatusCode::NO_CONTENT),
            shared,
        ]);

        assert_eq!(options.success_code(), StatusCode::CREATED);
        assert_eq!(options.error_matchers().len(), 2);
        assert_eq!(options.param_names().collect::<Vec<_>>(), ["x-tenant"]);
    }

    #[test]
    fn test_param_readers_resolve_sources() {
        let options = Options::from_opts([
            header_param("x-tenant"),
            url_param("id"),
            param("constant", ParamReader::new(|_, _| "fixed".to_string())),
            url_reader(ParamReader::new(|parts, name| {
                if name == "id" {
                    parts.uri.path().rsplit('/').next().unwrap_or_default().to_string()
                } else {
                    String::new()
                }
            })),
        ]);

        let parts = parts();
        let readers = options.param_readers();
        let read = |name: &str| readers[name].read(&parts, name);

        assert_eq!(read("x-tenant"), "acme");
        assert_eq!(read("id"), "17");
        assert_eq!(read("constant"), "fixed");
    }

    #[test]
    fn test_url_param_without_reader_is_empty() {
        let options = Options::from_opts([url_param("id")]);
        let readers = options.param_readers();

        assert_eq!(readers["id"].read(&parts(), "id"), "");
    }

    #[test]
    fn test_explicit_logger_is_used() {
        let options = Options::from_opts([error_logger(
            |_: &RequestContext, _: &str, _: &[Field<'_>]| {},
        )]);
        assert!(options.has_error_logger());

        let options = Options::from_opts([error_logger(NoopLogger)]);
        options
            .error_logger()
            .log_error(&RequestContext::mock(), "ignored", &[]);
    }

    #[test]
    #[should_panic(expected = "max_body_size must be greater than zero")]
    fn test_zero_body_limit_fails_fast() {
        let _ = Options::from_opts([max_body_size(0)]);
    }
}
