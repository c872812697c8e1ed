//! Append-only record of completed requests, served by `GET /logs`.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One completed request. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
}

impl RequestLogEntry {
    pub fn new(method: impl Into<String>, path: impl Into<String>, status_code: u16) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            status_code,
            timestamp: Utc::now(),
        }
    }
}

/// Thread-safe, append-only log of [`RequestLogEntry`] values.
///
/// Clones share the same underlying log. Appends are serialised by a mutex
/// held only for the push; [`snapshot`](Self::snapshot) holds it only for
/// the copy, so neither side waits on anything but the other's memcpy.
#[derive(Debug, Clone, Default)]
pub struct RequestLogStore {
    entries: Arc<Mutex<Vec<RequestLogEntry>>>,
}

impl RequestLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: RequestLogEntry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }

    /// Every entry appended so far, in append order.
    pub fn snapshot(&self) -> Arc<[RequestLogEntry]> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::from(entries.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let store = RequestLogStore::new();
        store.append(RequestLogEntry::new("GET", "/users", 200));
        let before = store.snapshot();
        store.append(RequestLogEntry::new("DELETE", "/users/1", 204));

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
        assert_eq!(store.snapshot()[1].status_code, 204);
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        let store = RequestLogStore::new();
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        store.append(RequestLogEntry::new("GET", format!("/t{t}/{i}"), 200));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(store.len(), 2000);
    }

    #[test]
    fn serialises_with_camel_case_fields() {
        let entry = RequestLogEntry::new("POST", "/users", 201);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["path"], "/users");
        assert_eq!(json["statusCode"], 201);
        assert!(json["timestamp"].is_string());
    }
}
