//! # rolodex
//!
//! A small HTTP service for user records, built on a minimal in-crate HTTP
//! layer whose one piece of structure is its middleware pipeline.
//!
//! ## Request flow
//!
//! ```text
//! hyper ─► AuthGate ─► ErrorBoundary ─► RequestLogger ─► Router ─► handler
//!            │ 401          │ 500            │ appends       │ 404 / 405
//!            ▼              ▼                ▼ after return  ▼
//! ```
//!
//! - [`AuthGate`](middleware::AuthGate) answers 401 unless `x-auth` carries
//!   the shared token. Rejected requests go no further, so they are never logged.
//! - [`ErrorBoundary`](middleware::ErrorBoundary) turns any downstream panic
//!   into a fixed 500 body and reports the panic to a diagnostic sink.
//! - [`RequestLogger`](middleware::RequestLogger) appends method, path and
//!   final status to the [`RequestLogStore`](logs::RequestLogStore) once the
//!   handler has returned.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rolodex::api::{self, AppState};
//! use rolodex::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rolodex::Error> {
//!     let service = api::app("auth_token", AppState::default());
//!     Server::bind("0.0.0.0:3000")?.serve(service).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod logs;
pub mod middleware;
pub mod users;

pub use config::Config;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use method::{Method, UnknownMethod};
pub use middleware::{Pipeline, Service};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
