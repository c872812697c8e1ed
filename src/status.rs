//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use rolodex::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! Response::builder()
//!     .status(Status::Created)
//!     .header("location", "/users/42")
//!     .json(br#"{"id":42}"#.to_vec());
//! ```

/// The status codes this service produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    NoContent,            // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    Unauthorized,         // 401
    NotFound,             // 404
    MethodNotAllowed,     // 405

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::Created              => 201,
            Status::NoContent            => 204,
            Status::BadRequest           => 400,
            Status::Unauthorized         => 401,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::InternalServerError  => 500,
        }
    }
}
