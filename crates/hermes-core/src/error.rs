//! Error taxonomy for the request pipeline.
//!
//! Every failure a pipeline can observe ends up as a [`PipelineError`]:
//!
//! | Variant | Origin | Default status |
//! |---------|--------|----------------|
//! | [`PipelineError::Decode`] | request body could not be read or decoded | `400` |
//! | [`PipelineError::Handler`] | application function returned an error | `500` |
//! | [`PipelineError::Recovered`] | application function panicked | `500` |
//!
//! Matchers look errors up by type with [`PipelineError::find`], which walks the
//! [`source`](std::error::Error::source) chain and, for recovered panics, the
//! typed panic value.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed error type accepted from application functions and codecs.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The request body could not be read or decoded.
///
/// Wraps the underlying I/O or codec failure; [`source`](StdError::source)
/// returns it unchanged.
///
/// # Example
///
/// ```
/// use hermes_core::DecodeError;
///
/// let err = DecodeError::new("expected value at line 1 column 1");
/// assert_eq!(
///     err.to_string(),
///     "failed to read request: expected value at line 1 column 1"
/// );
/// ```
#[derive(Debug, Error)]
#[error("failed to read request: {source}")]
pub struct DecodeError {
    #[source]
    source: BoxError,
}

impl DecodeError {
    /// Wraps a codec or I/O failure.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Creates an error for a body exceeding the configured limit.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(format!("payload too large: body exceeds {limit} bytes"))
    }

    /// Returns the underlying cause.
    #[must_use]
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Consumes the error and returns the underlying cause.
    #[must_use]
    pub fn into_cause(self) -> BoxError {
        self.source
    }
}

/// A panic raised by an application function, caught at the pipeline boundary.
///
/// Holds the original panic value (retrievable by type with [`value`](Self::value))
/// and the stack trace captured when the panic happened.
pub struct RecoveredError {
    value: Box<dyn Any + Send>,
    message: String,
    stack: String,
}

impl RecoveredError {
    /// Creates a recovered error from a panic payload and a rendered stack trace.
    pub fn new(value: Box<dyn Any + Send>, stack: impl Into<String>) -> Self {
        let message = panic_message(value.as_ref());
        Self {
            value,
            message,
            stack: stack.into(),
        }
    }

    /// Returns the panic value if it has type `T`.
    #[must_use]
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns a human-readable rendering of the panic value.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the captured stack trace.
    #[must_use]
    pub fn stack(&self) -> &str {
        &self.stack
    }

    fn as_boxed_error(&self) -> Option<&(dyn StdError + 'static)> {
        if let Some(err) = self.value.downcast_ref::<BoxError>() {
            return Some(err.as_ref() as &(dyn StdError + 'static));
        }
        self.value
            .downcast_ref::<Box<dyn StdError + Send>>()
            .map(|err| err.as_ref() as &(dyn StdError + 'static))
    }
}

impl fmt::Debug for RecoveredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveredError")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RecoveredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recovered from panic: {}", self.message)
    }
}

impl StdError for RecoveredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.as_boxed_error()
    }
}

/// Renders a panic payload the way the default panic hook does, falling back
/// to `Display` for boxed errors.
fn panic_message(value: &(dyn Any + Send)) -> String {
    if let Some(s) = value.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = value.downcast_ref::<String>() {
        s.clone()
    } else if let Some(err) = value.downcast_ref::<BoxError>() {
        err.to_string()
    } else if let Some(err) = value.downcast_ref::<Box<dyn StdError + Send>>() {
        err.to_string()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Any failure observed while processing a single request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request body could not be read or decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The application function returned an error.
    #[error(transparent)]
    Handler(BoxError),

    /// The application function panicked.
    #[error(transparent)]
    Recovered(#[from] RecoveredError),
}

impl PipelineError {
    /// Wraps an error returned by an application function.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Returns `true` for request decoding failures.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Returns `true` for recovered panics.
    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }

    /// Returns the recovered panic, if this error is one.
    #[must_use]
    pub fn as_recovered(&self) -> Option<&RecoveredError> {
        match self {
            Self::Recovered(err) => Some(err),
            _ => None,
        }
    }

    /// Finds the first error of type `E` in this error's chain.
    ///
    /// The search starts with the wrapped error itself, follows
    /// [`source`](StdError::source) links, and for recovered panics also
    /// considers the typed panic value.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_core::PipelineError;
    ///
    /// #[derive(Debug)]
    /// struct NotFound;
    ///
    /// impl std::fmt::Display for NotFound {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    ///         f.write_str("not found")
    ///     }
    /// }
    ///
    /// impl std::error::Error for NotFound {}
    ///
    /// let err = PipelineError::handler(NotFound);
    /// assert!(err.find::<NotFound>().is_some());
    /// assert!(err.find::<std::io::Error>().is_none());
    /// ```
    #[must_use]
    pub fn find<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Decode(err) => find_in_chain(err),
            Self::Handler(err) => find_in_chain(err.as_ref()),
            Self::Recovered(err) => err.value::<E>().or_else(|| find_in_chain(err)),
        }
    }
}

fn find_in_chain<'a, E: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a E> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<E>() {
            return Some(found);
        }
        current = err.source();
    }
    None
}
