//! User records and the request body shared by create and update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Positive, never-reused user identifier.
pub type UserId = i64;

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `None` until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /users` and `PUT /users/{id}`.
///
/// Every field is optional at the wire level so that a missing field reaches
/// validation and gets its descriptive message, instead of failing decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Fields of a [`UserInput`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serialises_absent_timestamps_as_null() {
        let user = User {
            id: 1,
            name: "Alice".to_owned(),
            email: "alice@example.com".to_owned(),
            phone: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["updatedAt"], json!(null));
        assert_eq!(value["phone"], json!(null));
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn missing_fields_decode_as_none() {
        let input: UserInput = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(input.name, None);
        assert_eq!(input.email.as_deref(), Some("a@b.c"));
    }
}
