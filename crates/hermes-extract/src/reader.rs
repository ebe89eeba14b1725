//! Request body decoders.
//!
//! A [`RequestReader`] is chosen per pipeline and resolved against the
//! pipeline's request model type once, when the pipeline is built. Every
//! failure it produces is a [`DecodeError`].
//!
//! | Reader | Body format |
//! |--------|-------------|
//! | [`RequestReader::json`] | JSON (default) |
//! | [`RequestReader::form`] | URL-encoded form, deserialized with serde |
//! | [`RequestReader::form_with`] | URL-encoded form, decoded by a callback |
//! | [`RequestReader::custom`] | anything, decoded by a callback |

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use hermes_core::{BoxError, DecodeError};
use http::request::Parts;
use serde::de::DeserializeOwned;

/// Default maximum request body size (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// A decoder resolved for one model type.
pub type Decoder<T> = Arc<dyn Fn(&Parts, &Bytes) -> Result<T, DecodeError> + Send + Sync>;

/// Pluggable request body decoder.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use hermes_extract::RequestReader;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Login {
///     username: String,
/// }
///
/// let (parts, ()) = http::Request::post("/login").body(()).unwrap().into_parts();
///
/// let login: Login = RequestReader::form()
///     .decode(&parts, &Bytes::from_static(b"username=alice"))
///     .unwrap();
/// assert_eq!(login.username, "alice");
///
/// let err = RequestReader::json()
///     .decode::<Login>(&parts, &Bytes::from_static(b"{"))
///     .unwrap_err();
/// assert!(err.to_string().starts_with("failed to read request: "));
/// ```
#[derive(Clone)]
pub struct RequestReader {
    kind: ReaderKind,
}

#[derive(Clone)]
enum ReaderKind {
    Json,
    Form,
    Custom {
        model: &'static str,
        decoder: Arc<dyn Any + Send + Sync>,
    },
}

impl RequestReader {
    /// Decodes the body as JSON.
    #[must_use]
    pub fn json() -> Self {
        Self {
            kind: ReaderKind::Json,
        }
    }

    /// Decodes the body as URL-encoded form data.
    #[must_use]
    pub fn form() -> Self {
        Self {
            kind: ReaderKind::Form,
        }
    }

    /// Parses the body as URL-encoded form data and hands the ordered
    /// `(key, value)` pairs to `decode`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bytes::Bytes;
    /// use hermes_extract::RequestReader;
    ///
    /// let reader = RequestReader::form_with(|pairs: &[(String, String)]| {
    ///     pairs
    ///         .iter()
    ///         .find(|(k, _)| k == "q")
    ///         .map(|(_, v)| v.clone())
    ///         .ok_or("missing q")
    /// });
    ///
    /// let (parts, ()) = http::Request::post("/").body(()).unwrap().into_parts();
    /// let q: String = reader.decode(&parts, &Bytes::from_static(b"q=hello+world")).unwrap();
    /// assert_eq!(q, "hello world");
    /// ```
    pub fn form_with<T, E, F>(decode: F) -> Self
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn(&[(String, String)]) -> Result<T, E> + Send + Sync + 'static,
    {
        let decoder = move |_: &Parts, body: &Bytes| -> Result<T, DecodeError> {
            let pairs: Vec<(String, String)> =
                serde_urlencoded::from_bytes(body).map_err(DecodeError::new)?;
            decode(&pairs).map_err(DecodeError::new)
        };
        Self::from_decoder::<T>(Arc::new(decoder))
    }

    /// Decodes the body with a caller-supplied function.
    ///
    /// The function sees the request head and the whole body.
    pub fn custom<T, E, F>(decode: F) -> Self
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn(&Parts, &Bytes) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::from_decoder::<T>(Arc::new(move |parts: &Parts, body: &Bytes| {
            decode(parts, body).map_err(DecodeError::new)
        }))
    }

    fn from_decoder<T: Send + 'static>(decoder: Decoder<T>) -> Self {
        Self {
            kind: ReaderKind::Custom {
                model: type_name::<T>(),
                decoder: Arc::new(decoder),
            },
        }
    }

    /// Resolves this reader for model type `T`.
    ///
    /// # Panics
    ///
    /// Panics if the reader was built by [`form_with`](Self::form_with) or
    /// [`custom`](Self::custom) for a different model type. Pipelines call
    /// this while being built, so a mismatch surfaces at startup.
    #[must_use]
    pub fn decoder<T: DeserializeOwned + Send + 'static>(&self) -> Decoder<T> {
        match &self.kind {
            ReaderKind::Json => Arc::new(decode_json::<T>),
            ReaderKind::Form => Arc::new(decode_form::<T>),
            ReaderKind::Custom { model, decoder } => callback::<T>(model, decoder),
        }
    }

    /// Resolves a callback reader for a model type that has no serde
    /// `Deserialize` impl.
    ///
    /// Only readers built by [`form_with`](Self::form_with) or
    /// [`custom`](Self::custom) can produce such a model.
    ///
    /// # Panics
    ///
    /// Panics if this is the JSON or form reader, or if the callback was
    /// built for a different model type.
    #[must_use]
    pub fn callback_decoder<T: Send + 'static>(&self) -> Decoder<T> {
        match &self.kind {
            ReaderKind::Custom { model, decoder } => callback::<T>(model, decoder),
            ReaderKind::Json | ReaderKind::Form => panic!(
                "{self:?} decodes with serde but the pipeline model `{}` needs a form_with or custom reader",
                type_name::<T>()
            ),
        }
    }

    /// Decodes `body` into `T`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] wrapping the codec or callback failure.
    pub fn decode<T: DeserializeOwned + Send + 'static>(
        &self,
        parts: &Parts,
        body: &Bytes,
    ) -> Result<T, DecodeError> {
        (self.decoder::<T>())(parts, body)
    }
}

impl Default for RequestReader {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for RequestReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ReaderKind::Json => f.write_str("RequestReader::Json"),
            ReaderKind::Form => f.write_str("RequestReader::Form"),
            ReaderKind::Custom { model, .. } => write!(f, "RequestReader::Custom({model})"),
        }
    }
}

fn callback<T: Send + 'static>(model: &str, decoder: &Arc<dyn Any + Send + Sync>) -> Decoder<T> {
    decoder
        .downcast_ref::<Decoder<T>>()
        .cloned()
        .unwrap_or_else(|| {
            panic!(
                "request reader decodes `{model}` but the pipeline model is `{}`",
                type_name::<T>()
            )
        })
}

fn decode_json<T: DeserializeOwned>(_: &Parts, body: &Bytes) -> Result<T, DecodeError> {
    serde_json::from_slice(body).map_err(DecodeError::new)
}

fn decode_form<T: DeserializeOwned>(_: &Parts, body: &Bytes) -> Result<T, DecodeError> {
    serde_urlencoded::from_bytes(body).map_err(DecodeError::new)
}
