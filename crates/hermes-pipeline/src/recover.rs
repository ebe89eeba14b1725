//! Panic recovery boundary.
//!
//! The application function runs inside [`Recover`], which polls it under
//! `catch_unwind`. A panic is turned into a [`RecoveredError`] holding the
//! panic value and the stack captured where the panic happened, and never
//! unwinds past the pipeline.
//!
//! The stack is captured by a panic hook installed once per process. While a
//! boundary is polling on the current thread the hook records the stack and
//! stays silent, since the pipeline reports the panic through its error
//! logger. Any other panic goes to the previously installed hook.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

use hermes_core::RecoveredError;

thread_local! {
    static ACTIVE: Cell<usize> = const { Cell::new(0) };
    static CAPTURED: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn install_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !capture_stack() {
                previous(info);
            }
        }));
    });
}

/// Records the stack for a panic raised inside a boundary on this thread.
///
/// Returns `false` when no boundary is active, in which case the panic is not
/// ours to report.
fn capture_stack() -> bool {
    if ACTIVE.with(Cell::get) == 0 {
        return false;
    }
    let stack = Backtrace::force_capture().to_string();
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(stack));
    true
}

/// Runs `f` with the boundary marked active on this thread.
///
/// Returns the panic as a [`RecoveredError`] if `f` unwinds.
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, RecoveredError> {
    ACTIVE.with(|active| active.set(active.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    ACTIVE.with(|active| active.set(active.get() - 1));

    result.map_err(|value| {
        let stack = CAPTURED
            .with(|captured| captured.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string());
        RecoveredError::new(value, stack)
    })
}

/// Future adapter that converts panics of the inner future into errors.
#[must_use = "futures do nothing unless polled"]
pub(crate) struct Recover<F> {
    future: Option<F>,
}

impl<F> Future for Recover<F>
where
    F: Future + Unpin,
{
    type Output = Result<F::Output, RecoveredError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(future) = this.future.as_mut() else {
            return Poll::Pending;
        };

        match guarded(|| Pin::new(future).poll(cx)) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => {
                this.future = None;
                Poll::Ready(Ok(output))
            }
            Err(err) => {
                this.future = None;
                Poll::Ready(Err(err))
            }
        }
    }
}

/// Calls `start` and drives the future it returns, both inside the boundary.
pub(crate) async fn recover<F, Fut>(start: F) -> Result<Fut::Output, RecoveredError>
where
    F: FnOnce() -> Fut,
    Fut: Future + Unpin,
{
    install_hook();
    let future = guarded(start)?;
    Recover {
        future: Some(future),
    }
    .await
}
