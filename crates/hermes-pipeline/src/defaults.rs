//! Process-wide defaults.
//!
//! Two values are shared by every pipeline in the process:
//!
//! - the default error matchers, consulted after each pipeline's own matchers
//! - the default error logger, used by pipelines without an `error_logger`
//!   option
//!
//! Both are read on every failing request and may be replaced at any time.
//! Replacement swaps a whole immutable snapshot, so a request in flight sees
//! either the old value or the new one, never a mix.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use hermes_core::{ErrorLogger, TracingLogger};

use crate::classify::ErrorMatcher;

fn matchers_slot() -> &'static ArcSwap<Vec<ErrorMatcher>> {
    static SLOT: OnceLock<ArcSwap<Vec<ErrorMatcher>>> = OnceLock::new();
    SLOT.get_or_init(|| ArcSwap::from_pointee(Vec::new()))
}

fn logger_slot() -> &'static ArcSwap<Arc<dyn ErrorLogger>> {
    static SLOT: OnceLock<ArcSwap<Arc<dyn ErrorLogger>>> = OnceLock::new();
    SLOT.get_or_init(|| ArcSwap::from_pointee(Arc::new(TracingLogger) as Arc<dyn ErrorLogger>))
}

/// Replaces the process-wide default error matchers.
///
/// # Example
///
/// ```rust
/// use hermes_pipeline::{set_default_error_handlers, ErrorMatcher};
/// use http::StatusCode;
///
/// #[derive(Debug, Clone, serde::Serialize)]
/// struct Invalid(String);
///
/// impl std::fmt::Display for Invalid {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str(&self.0)
///     }
/// }
///
/// impl std::error::Error for Invalid {}
///
/// set_default_error_handlers([
///     ErrorMatcher::if_error::<Invalid>(StatusCode::UNPROCESSABLE_ENTITY),
/// ]);
/// ```
pub fn set_default_error_handlers(matchers: impl IntoIterator<Item = ErrorMatcher>) {
    let matchers: Vec<ErrorMatcher> = matchers.into_iter().collect();
    tracing::debug!(count = matchers.len(), "default error matchers replaced");
    matchers_slot().store(Arc::new(matchers));
}

/// Returns the current snapshot of the process-wide default error matchers.
#[must_use]
pub fn default_error_handlers() -> Arc<Vec<ErrorMatcher>> {
    matchers_slot().load_full()
}

/// Replaces the process-wide default error logger.
///
/// The initial logger is [`TracingLogger`], which is silent until a
/// `tracing` subscriber is installed.
pub fn set_logger(logger: impl ErrorLogger) {
    let logger: Arc<dyn ErrorLogger> = Arc::new(logger);
    logger_slot().store(Arc::new(logger));
}

/// Returns the current process-wide default error logger.
#[must_use]
pub fn logger() -> Arc<dyn ErrorLogger> {
    Arc::clone(&logger_slot().load())
}
