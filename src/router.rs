//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. The router is the
//! innermost stage of a [`Pipeline`](crate::middleware::Pipeline): it runs
//! only after every middleware has called `next`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{Handler, SharedEndpoint};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and hand it to
/// [`Pipeline::build`](crate::middleware::Pipeline::build).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<SharedEndpoint>>,
}

/// Outcome of matching a method + path against the registered routes.
pub(crate) enum Route {
    Found(SharedEndpoint, HashMap<String, String>),
    /// The path exists under some other method.
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and are read with `req.param("name")`:
    ///
    /// ```rust
    /// # use rolodex::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/users/{id}", get_user)
    ///     .on(Method::Post, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_endpoint())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: &str, path: &str) -> Route {
        let found = method.parse::<Method>().ok()
            .and_then(|m| self.routes.get(&m))
            .and_then(|tree| tree.at(path).ok());

        if let Some(matched) = found {
            let handler = Arc::clone(matched.value);
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Route::Found(handler, params);
        }

        if self.routes.values().any(|tree| tree.at(path).is_ok()) {
            Route::MethodNotAllowed
        } else {
            Route::NotFound
        }
    }

    /// Routes `req` to its handler, or answers 404 / 405.
    pub(crate) async fn dispatch(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Route::Found(handler, params) => {
                req.set_params(params);
                handler.call(req).await
            }
            Route::MethodNotAllowed => Response::status(Status::MethodNotAllowed),
            Route::NotFound => Response::status(Status::NotFound),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
