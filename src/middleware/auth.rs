//! Shared-secret authentication gate.

use serde_json::json;
use tracing::warn;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::{IntoResponse, Json};
use crate::status::Status;

/// Header carrying the shared secret.
pub const AUTH_HEADER: &str = "x-auth";

/// Rejects any request whose `x-auth` header is missing, empty, or not equal
/// to the configured token.
///
/// Rejected requests get `401 {"message":"Unauthorized","statusCode":401}`
/// and never reach later stages, so nothing downstream of the gate observes
/// them. Accepted requests pass through untouched.
pub struct AuthGate {
    token: String,
}

impl AuthGate {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    fn accepts(&self, req: &Request) -> bool {
        matches!(req.header(AUTH_HEADER), Some(t) if !t.is_empty() && t == self.token)
    }
}

impl Middleware for AuthGate {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        if self.accepts(&req) {
            return next.run(req);
        }

        warn!(method = %req.method(), path = %req.path(), "rejected unauthenticated request");
        Box::pin(async {
            (
                Status::Unauthorized,
                Json(json!({ "message": "Unauthorized", "statusCode": 401 })),
            )
                .into_response()
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::middleware::Pipeline;
    use crate::{Method, Router};

    fn service() -> crate::Service {
        Pipeline::new()
            .layer(AuthGate::new("auth_token"))
            .build(Router::new().on(Method::Get, "/", |_req: Request| async { "ok" }))
    }

    #[rstest]
    #[case::missing(None)]
    #[case::empty(Some(""))]
    #[case::wrong(Some("nope"))]
    #[case::wrong_case(Some("AUTH_TOKEN"))]
    #[tokio::test]
    async fn rejects_bad_tokens(#[case] token: Option<&str>) {
        let mut req = Request::new("GET", "/");
        if let Some(token) = token {
            req = req.with_header(AUTH_HEADER, token);
        }

        let res = service().handle(req).await;
        assert_eq!(res.status_code(), 401);
        assert_eq!(res.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, json!({ "message": "Unauthorized", "statusCode": 401 }));
    }

    #[tokio::test]
    async fn forwards_valid_token() {
        let req = Request::new("GET", "/").with_header("X-Auth", "auth_token");
        let res = service().handle(req).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"ok");
    }
}
