//! Panic containment.
//!
//! Expected failures are values: handlers turn them into 400/404 responses
//! themselves. Anything else is a panic, and [`ErrorBoundary`] is the only
//! place that catches one.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use futures::FutureExt;
use serde_json::json;
use tracing::error;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while processing your request.";

/// A contained panic: its message and the backtrace of the panicking thread.
#[derive(Debug, Clone)]
pub struct Failure {
    pub message: String,
    pub trace: String,
}

/// Where contained failures are reported. Never sees client-facing output.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn record(&self, failure: &Failure);
}

/// Reports failures as `tracing` error events.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, failure: &Failure) {
        error!(message = %failure.message, trace = %failure.trace, "unhandled failure while processing request");
    }
}

/// Converts a panic anywhere downstream into
/// `500 {"message":"An error occurred while processing your request.","statusCode":500}`.
///
/// Whatever the failing stage had built so far is dropped; the client only
/// ever sees the fixed body.
pub struct ErrorBoundary {
    sink: Arc<dyn DiagnosticSink>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }

    pub fn with_sink(sink: impl DiagnosticSink) -> Self {
        install_panic_hook();
        Self { sink: Arc::new(sink) }
    }
}

impl Default for ErrorBoundary {
    fn default() -> Self { Self::new() }
}

impl Middleware for ErrorBoundary {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let sink = Arc::clone(&self.sink);
        Box::pin(async move {
            match AssertUnwindSafe(next.run(req)).catch_unwind().await {
                Ok(res) => res,
                Err(payload) => {
                    sink.record(&Failure::from_panic(&*payload));
                    internal_error()
                }
            }
        })
    }
}

fn internal_error() -> Response {
    (
        Status::InternalServerError,
        Json(json!({ "message": INTERNAL_ERROR_MESSAGE, "statusCode": 500 })),
    )
        .into_response()
}

// ── Panic capture ─────────────────────────────────────────────────────────────

thread_local! {
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Chains a panic hook that stashes the panicking thread's backtrace.
///
/// `catch_unwind` returns on the thread that panicked, within the same poll,
/// so the boundary can pick the trace up from the thread-local. The previous
/// hook still runs.
fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info.location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "<unknown>".to_owned());
            let trace = format!("at {location}\n{}", Backtrace::force_capture());
            LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

impl Failure {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload.downcast_ref::<&str>().map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        let trace = LAST_TRACE.with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| "<backtrace unavailable>".to_owned());
        Self { message, trace }
    }
}
