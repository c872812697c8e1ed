//! Route handlers and their erased form.
//!
//! Handlers are plain `async fn(Request) -> impl IntoResponse` items. When
//! registered, each one is wrapped in an [`Endpoint`] and stored behind an
//! `Arc<dyn Endpoint>` so the router can keep handlers of different types in
//! the same tree. Middleware stages return the same [`BoxFuture`], so a stage
//! and an endpoint are interchangeable from `Next`'s point of view.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Heap-allocated future resolving to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A registered route target.
#[doc(hidden)]
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

#[doc(hidden)]
pub type SharedEndpoint = Arc<dyn Endpoint>;

/// Anything the router accepts as a route target.
///
/// Sealed. Satisfied by every `Fn(Request) -> impl Future<Output = impl IntoResponse>`
/// that is `Send + Sync + 'static`. Handlers needing application state are
/// closures that clone it per call (see `api::routes`).
pub trait Handler: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> SharedEndpoint;
}

mod sealed {
    pub trait Sealed {}
}

impl<F, Fut, R> sealed::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn into_endpoint(self) -> SharedEndpoint {
        Arc::new(AsyncFn(self))
    }
}

struct AsyncFn<F>(F);

impl<F, Fut, R> Endpoint for AsyncFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request) -> BoxFuture {
        let pending = (self.0)(req);
        Box::pin(async move { pending.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    async fn created(_: Request) -> Status {
        Status::Created
    }

    #[tokio::test]
    async fn endpoint_converts_handler_output() {
        let endpoint = created.into_endpoint();
        let res = endpoint.call(Request::new("POST", "/users")).await;
        assert_eq!(res.status_code(), 201);
    }

    #[tokio::test]
    async fn closures_are_handlers() {
        let greeting = String::from("hi");
        let endpoint = (move |_: Request| {
            let body = greeting.clone();
            async move { body }
        })
        .into_endpoint();
        let res = endpoint.call(Request::new("GET", "/")).await;
        assert_eq!(res.body(), b"hi");
    }
}
