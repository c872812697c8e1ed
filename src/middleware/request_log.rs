//! Completed-request recording.

use tracing::debug;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::logs::{RequestLogEntry, RequestLogStore};
use crate::request::Request;

/// Appends one [`RequestLogEntry`] per request after downstream finishes.
///
/// Method and path are captured before the request moves downstream; the
/// status is whatever the response carries once downstream returns. The
/// response itself is passed back unchanged. A request whose downstream
/// panics never completes here and leaves no entry.
pub struct RequestLogger {
    store: RequestLogStore,
}

impl RequestLogger {
    pub fn new(store: RequestLogStore) -> Self {
        Self { store }
    }
}

impl Middleware for RequestLogger {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let store = self.store.clone();
        let method = req.method().to_owned();
        let path = req.path().to_owned();
        Box::pin(async move {
            let res = next.run(req).await;
            let status = res.status_code();
            debug!(%method, %path, status, "request completed");
            store.append(RequestLogEntry::new(method, path, status));
            res
        })
    }
}
