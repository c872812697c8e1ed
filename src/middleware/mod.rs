//! Middleware layer.
//!
//! Middleware intercepts requests on their way to the router and is the place
//! for cross-cutting concerns. Every stage has the same shape:
//!
//! ```text
//! (Request, Next) -> Response
//! ```
//!
//! A stage either produces a response itself (short-circuit) or calls
//! [`Next::run`] to hand the request to the rest of the pipeline. Stages are
//! listed outermost first on a [`Pipeline`] and frozen into a [`Service`]:
//!
//! ```rust
//! use rolodex::middleware::{self, AuthGate, ErrorBoundary, Next, Pipeline};
//! use rolodex::{Request, Router};
//!
//! let service = Pipeline::new()
//!     .layer(AuthGate::new("auth_token"))
//!     .layer(ErrorBoundary::new())
//!     .layer(middleware::from_fn(|req: Request, next: Next| async move {
//!         next.run(req).await
//!     }))
//!     .build(Router::new());
//! ```
//!
//! Built-in stages:
//! - [`AuthGate`]: static shared-secret header check
//! - [`ErrorBoundary`]: turns handler panics into a uniform 500
//! - [`RequestLogger`]: records method, path and final status

use std::future::Future;
use std::sync::Arc;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

mod auth;
mod recover;
mod request_log;

pub use auth::{AUTH_HEADER, AuthGate};
pub use recover::{DiagnosticSink, ErrorBoundary, Failure, TracingSink};
pub use request_log::RequestLogger;

// ── Middleware trait ──────────────────────────────────────────────────────────

/// One stage of a [`Pipeline`].
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

/// Adapts an async closure `(Request, Next) -> Response` into a [`Middleware`].
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FromFn(f)
}

/// Middleware returned by [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self.0)(req, next))
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

struct Chain {
    stages: Vec<Arc<dyn Middleware>>,
    router: Router,
}

/// The remainder of the pipeline after the current stage.
///
/// Consumed by [`Next::run`], so a stage can invoke downstream at most once.
pub struct Next {
    chain: Arc<Chain>,
    index: usize,
}

impl Next {
    /// Runs every remaining stage, then the router.
    ///
    /// Downstream work happens entirely inside the returned future: nothing
    /// runs until it is polled, so a stage that wraps the future (for
    /// instance to catch panics) also covers handler construction.
    pub fn run(self, req: Request) -> BoxFuture {
        Box::pin(async move {
            let Self { chain, index } = self;
            match chain.stages.get(index) {
                Some(stage) => {
                    let next = Next { chain: Arc::clone(&chain), index: index + 1 };
                    let fut = stage.handle(req, next);
                    fut.await
                }
                None => chain.router.dispatch(req).await,
            }
        })
    }
}

// ── Pipeline / Service ────────────────────────────────────────────────────────

/// Ordered list of middleware, outermost first.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. It runs after every stage added before it.
    pub fn layer(mut self, stage: impl Middleware) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Freezes the pipeline around `router`.
    pub fn build(self, router: Router) -> Service {
        Service { chain: Arc::new(Chain { stages: self.stages, router }) }
    }
}

/// A composed pipeline ready to answer requests. Cheap to clone.
#[derive(Clone)]
pub struct Service {
    chain: Arc<Chain>,
}

impl Service {
    /// Passes `req` through every stage and the router.
    pub async fn handle(&self, req: Request) -> Response {
        Next { chain: Arc::clone(&self.chain), index: 0 }.run(req).await
    }
}
