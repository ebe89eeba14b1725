//! Parameter sources and readers.
//!
//! Application code reads named request values through one accessor keyed by
//! ([`ParamSource`], name), whatever location the value actually comes from:
//!
//! | Source | Reader |
//! |--------|--------|
//! | [`ParamSource::Header`] | [`from_headers`], case-insensitive |
//! | [`ParamSource::Url`] | caller-supplied [`ParamReader`] (route parameters belong to the router) |
//!
//! Reads never fail; a missing value is an empty string.

use std::fmt;
use std::sync::Arc;

use http::request::Parts;
use indexmap::IndexMap;

/// Where a named parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// Request headers.
    Header,
    /// URL or route parameters, as extracted by the hosting router.
    Url,
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Url => write!(f, "url"),
        }
    }
}

/// Reads a header value by name.
///
/// Header names are case-insensitive. Returns an empty string when the header
/// is absent or its value is not visible ASCII.
///
/// # Example
///
/// ```
/// use hermes_core::from_headers;
///
/// let (parts, ()) = http::Request::get("/")
///     .header("x-tenant", "acme")
///     .body(())
///     .unwrap()
///     .into_parts();
///
/// assert_eq!(from_headers(&parts, "X-Tenant"), "acme");
/// assert_eq!(from_headers(&parts, "x-missing"), "");
/// ```
#[must_use]
pub fn from_headers(parts: &Parts, name: &str) -> String {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// A source-specific reader: `(request, name) -> value`.
///
/// Readers are total; they return an empty string for anything they cannot
/// resolve.
#[derive(Clone)]
pub struct ParamReader(Arc<dyn Fn(&Parts, &str) -> String + Send + Sync>);

impl ParamReader {
    /// Wraps a reader function.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_core::ParamReader;
    ///
    /// // Route parameters stored by a router as a request extension.
    /// #[derive(Clone)]
    /// struct RouteParams(Vec<(String, String)>);
    ///
    /// let reader = ParamReader::new(|parts, name| {
    ///     parts
    ///         .extensions
    ///         .get::<RouteParams>()
    ///         .and_then(|p| p.0.iter().find(|(k, _)| k == name))
    ///         .map(|(_, v)| v.clone())
    ///         .unwrap_or_default()
    /// });
    ///
    /// let (mut parts, ()) = http::Request::get("/users/42").body(()).unwrap().into_parts();
    /// parts.extensions.insert(RouteParams(vec![("id".into(), "42".into())]));
    ///
    /// assert_eq!(reader.read(&parts, "id"), "42");
    /// assert_eq!(reader.read(&parts, "other"), "");
    /// ```
    pub fn new<F>(read: F) -> Self
    where
        F: Fn(&Parts, &str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(read))
    }

    /// The built-in header reader.
    #[must_use]
    pub fn headers() -> Self {
        Self::new(from_headers)
    }

    /// Reads `name` from the request.
    #[must_use]
    pub fn read(&self, parts: &Parts, name: &str) -> String {
        (self.0)(parts, name)
    }
}

impl fmt::Debug for ParamReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamReader(..)")
    }
}

/// Per-request snapshot of named parameter values.
///
/// Computed once, before the application function runs, from the configured
/// `name -> reader` table. Missing names read as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParams {
    values: IndexMap<String, String>,
}

impl ResolvedParams {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every configured reader against the request.
    ///
    /// Each reader is invoked with the request and its own name.
    pub fn resolve<'a, I>(readers: I, parts: &Parts) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a ParamReader)>,
    {
        readers
            .into_iter()
            .map(|(name, reader)| (name.clone(), reader.read(parts, name)))
            .collect()
    }

    /// Returns the value for `name`, or an empty string.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    /// Returns `true` if no parameters were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of resolved parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over `(name, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ResolvedParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// The parameter-read callback handed to application functions.
///
/// `read(source, name)` never fails: headers are looked up directly, URL
/// parameters go through the configured URL reader, and anything unresolved is
/// an empty string.
#[derive(Clone)]
pub struct ReadParam {
    parts: Arc<Parts>,
    url: Option<ParamReader>,
}

impl ReadParam {
    /// Creates an accessor over the request head.
    #[must_use]
    pub fn new(parts: Arc<Parts>, url: Option<ParamReader>) -> Self {
        Self { parts, url }
    }

    /// Reads `name` from `source`.
    #[must_use]
    pub fn read(&self, source: ParamSource, name: &str) -> String {
        match source {
            ParamSource::Header => from_headers(&self.parts, name),
            ParamSource::Url => self
                .url
                .as_ref()
                .map(|reader| reader.read(&self.parts, name))
                .unwrap_or_default(),
        }
    }

    /// Shorthand for `read(ParamSource::Header, name)`.
    #[must_use]
    pub fn header(&self, name: &str) -> String {
        self.read(ParamSource::Header, name)
    }

    /// Shorthand for `read(ParamSource::Url, name)`.
    #[must_use]
    pub fn url(&self, name: &str) -> String {
        self.read(ParamSource::Url, name)
    }
}

impl fmt::Debug for ReadParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadParam")
            .field("uri", &self.parts.uri)
            .field("url_reader", &self.url.is_some())
            .finish()
    }
}
