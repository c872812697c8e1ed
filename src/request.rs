//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;

/// An incoming HTTP request with its body fully read.
///
/// The server builds one per hyper request. Tests and embedders can build
/// one directly and hand it to [`Service::handle`](crate::Service::handle):
///
/// ```rust
/// use rolodex::Request;
///
/// let req = Request::new("POST", "/users")
///     .with_header("x-auth", "auth_token")
///     .with_body(r#"{"name":"Alice","email":"alice@example.com"}"#);
/// assert_eq!(req.header("X-Auth"), Some("auth_token"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Returns the first value when repeated.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    /// Parameters are only populated once the router has matched the request,
    /// so middleware always sees `None`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case_and_takes_first() {
        let req = Request::new("GET", "/users")
            .with_header("X-Auth", "first")
            .with_header("x-auth", "second");
        assert_eq!(req.header("x-AUTH"), Some("first"));
        assert_eq!(req.header("missing"), None);
    }
}
