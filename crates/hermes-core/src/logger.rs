//! The error logging interface consumed by the pipeline.
//!
//! The pipeline reports every failure synchronously, before it writes the
//! response, through one method: `(context, message, key/value fields)`.

use std::fmt;

use crate::RequestContext;

/// A structured key/value pair attached to a log entry.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    /// Field name.
    pub key: &'static str,
    /// Field value.
    pub value: &'a dyn fmt::Display,
}

impl<'a> Field<'a> {
    /// Creates a field.
    pub fn new(key: &'static str, value: &'a dyn fmt::Display) -> Self {
        Self { key, value }
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Receives error-level log entries from the pipeline.
///
/// Implemented for closures taking `(&RequestContext, &str, &[Field])`.
///
/// # Example
///
/// ```
/// use hermes_core::{ErrorLogger, Field, RequestContext};
///
/// let logger = |ctx: &RequestContext, message: &str, fields: &[Field<'_>]| {
///     eprintln!("[{}] {message} {fields:?}", ctx.request_id());
/// };
///
/// let error = "boom";
/// logger.log_error(&RequestContext::mock(), "request failed", &[Field::new("error", &error)]);
/// ```
pub trait ErrorLogger: Send + Sync + 'static {
    /// Records an error-level entry.
    fn log_error(&self, ctx: &RequestContext, message: &str, fields: &[Field<'_>]);
}

impl<F> ErrorLogger for F
where
    F: Fn(&RequestContext, &str, &[Field<'_>]) + Send + Sync + 'static,
{
    fn log_error(&self, ctx: &RequestContext, message: &str, fields: &[Field<'_>]) {
        self(ctx, message, fields);
    }
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl ErrorLogger for NoopLogger {
    fn log_error(&self, _ctx: &RequestContext, _message: &str, _fields: &[Field<'_>]) {}
}

/// Emits entries as `tracing` error events.
///
/// The request id, `error`, `stack` and `panic_value` are recorded as fields
/// of their own; any other fields are rendered into a single `fields` value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log_error(&self, ctx: &RequestContext, message: &str, fields: &[Field<'_>]) {
        tracing::error!(
            request_id = %ctx.request_id(),
            http.method = %ctx.method(),
            http.path = %ctx.path(),
            error = find(fields, "error").map(tracing::field::display),
            stack = find(fields, "stack").map(tracing::field::display),
            panic_value = find(fields, "panic_value").map(tracing::field::display),
            fields = %DisplayFields(fields),
            "{message}"
        );
    }
}

fn find<'a>(fields: &[Field<'a>], key: &str) -> Option<&'a dyn fmt::Display> {
    fields.iter().find(|f| f.key == key).map(|f| f.value)
}

struct DisplayFields<'a, 'b>(&'a [Field<'b>]);

impl fmt::Display for DisplayFields<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rest = self
            .0
            .iter()
            .filter(|field| !matches!(field.key, "error" | "stack" | "panic_value"));
        for (i, field) in rest.enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", field.key, field.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_logger() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger = move |_: &RequestContext, message: &str, fields: &[Field<'_>]| {
            sink.lock()
                .unwrap()
                .push(format!("{message} {}", DisplayFields(fields)));
        };

        let err = "oooh";
        logger.log_error(
            &RequestContext::mock(),
            "request failed",
            &[
                Field::new("error", &err),
                Field::new("status", &500),
                Field::new("stack", &"main"),
            ],
        );

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["request failed status=500"]
        );
    }

    #[test]
    fn test_builtin_loggers_do_not_panic() {
        let ctx = RequestContext::mock();
        NoopLogger.log_error(&ctx, "ignored", &[]);
        TracingLogger.log_error(&ctx, "request failed", &[Field::new("error", &"x")]);
    }

    #[test]
    fn test_field_debug() {
        let value = 42;
        assert_eq!(format!("{:?}", Field::new("answer", &value)), "answer=42");
    }
}
