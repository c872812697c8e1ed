//! Input checks for `POST /users` and `PUT /users/{id}`.
//!
//! Checks run in a fixed order and the first failing step wins:
//!
//! 1. name present and not blank
//! 2. email present and not blank
//! 3. field rules (lengths, email shape, phone shape), all violations collected
//! 4. email parses as a single mail address
//! 5. phone present and non-empty (create only)
//! 6. email not already taken (create only)

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::model::{NewUser, UserInput};
use super::store::UserStore;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const NAME_TOO_LONG: &str = "Name cannot exceed 100 characters";
pub const EMAIL_TOO_LONG: &str = "Email cannot exceed 100 characters";
pub const PHONE_TOO_LONG: &str = "Phone cannot exceed 20 characters";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const INVALID_PHONE: &str = "Invalid phone format";
pub const EMAIL_EXISTS: &str = "Email already exists";

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 100;
const PHONE_MAX: usize = 20;

/// Why an input was rejected.
///
/// `Rule` comes from a short-circuiting step and is sent as `{"error": ..}`;
/// `Fields` comes from the field-rule step and is sent as `{"errors": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Rule(&'static str),
    #[error("{}", .0.join("; "))]
    Fields(Vec<&'static str>),
}

/// Steps 1–6. `store` is consulted for step 6 only.
pub fn validate_create(input: &UserInput, store: &UserStore) -> Result<NewUser, ValidationError> {
    let user = validate_common(input)?;

    // Step 5: the model says optional, but creation has always required it.
    if user.phone.as_deref().is_none_or(str::is_empty) {
        return Err(ValidationError::Rule(INVALID_PHONE));
    }
    if store.email_exists(&user.email) {
        return Err(ValidationError::Rule(EMAIL_EXISTS));
    }
    Ok(user)
}

/// Steps 1–4. Phone stays optional and email uniqueness is left to the store,
/// which knows which user is being updated.
pub fn validate_update(input: &UserInput) -> Result<NewUser, ValidationError> {
    validate_common(input)
}

fn validate_common(input: &UserInput) -> Result<NewUser, ValidationError> {
    let name = non_blank(input.name.as_deref()).ok_or(ValidationError::Rule(NAME_REQUIRED))?;
    let email = non_blank(input.email.as_deref()).ok_or(ValidationError::Rule(EMAIL_REQUIRED))?;
    let phone = input.phone.as_deref();

    let violations = field_violations(name, email, phone);
    if !violations.is_empty() {
        return Err(ValidationError::Fields(violations));
    }

    if !is_mail_address(email) {
        return Err(ValidationError::Rule(INVALID_EMAIL));
    }

    Ok(NewUser {
        name: name.to_owned(),
        email: email.to_owned(),
        phone: phone.map(str::to_owned),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Step 3, in field order name, email, phone.
fn field_violations(name: &str, email: &str, phone: Option<&str>) -> Vec<&'static str> {
    let mut out = Vec::new();

    if name.chars().count() > NAME_MAX {
        out.push(NAME_TOO_LONG);
    }

    if !has_email_shape(email) {
        out.push(INVALID_EMAIL);
    }
    if email.chars().count() > EMAIL_MAX {
        out.push(EMAIL_TOO_LONG);
    }

    if let Some(phone) = phone {
        if !phone_regex().is_match(phone) {
            out.push(INVALID_PHONE);
        }
        if phone.chars().count() > PHONE_MAX {
            out.push(PHONE_TOO_LONG);
        }
    }

    out
}

/// Exactly one `@`, neither first nor last, and no line breaks.
fn has_email_shape(email: &str) -> bool {
    if email.contains(['\r', '\n']) {
        return false;
    }
    match (email.find('@'), email.rfind('@')) {
        (Some(first), Some(last)) => first > 0 && first == last && first != email.len() - 1,
        _ => false,
    }
}

static MAIL_ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

/// Step 4: a dot-atom local part and domain with no empty labels.
fn is_mail_address(email: &str) -> bool {
    MAIL_ADDRESS_RE
        .get_or_init(|| {
            let atom = r"[\w!#$%&'*+/=?^`{|}~-]+";
            let label = r"[\w-]+";
            let pattern = format!(r"^{atom}(?:\.{atom})*@{label}(?:\.{label})*$");
            Regex::new(&pattern)
                .unwrap_or_else(|error| panic!("mail address regex failed to compile: {error}"))
        })
        .is_match(email)
}

/// Digits, whitespace and `+ - . ( )`, at least one digit, then an optional
/// `x` / `ext` / `ext.` extension. Trailing whitespace is ignored.
fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        let pattern = r"^[+\s\d\-.()]*\d[+\s\d\-.()]*(?:(?i:ext\.?|x)\s*\d+)?\s*$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn user_input(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> UserInput {
        UserInput {
            name: name.map(str::to_owned),
            email: email.map(str::to_owned),
            phone: phone.map(str::to_owned),
        }
    }

    #[rstest]
    #[case::missing_name(user_input(None, Some("a@b.io"), Some("555")), ValidationError::Rule(NAME_REQUIRED))]
    #[case::blank_name(user_input(Some("  "), None, None), ValidationError::Rule(NAME_REQUIRED))]
    #[case::blank_email(user_input(Some("Al"), Some("\t"), Some("555")), ValidationError::Rule(EMAIL_REQUIRED))]
    #[case::bad_shape(user_input(Some("Al"), Some("al.example.com"), Some("555")), ValidationError::Fields(vec![INVALID_EMAIL]))]
    #[case::two_ats(user_input(Some("Al"), Some("a@b@c"), Some("555")), ValidationError::Fields(vec![INVALID_EMAIL]))]
    #[case::bad_phone(user_input(Some("Al"), Some("a@b.io"), Some("call me")), ValidationError::Fields(vec![INVALID_PHONE]))]
    #[case::empty_phone(user_input(Some("Al"), Some("a@b.io"), Some("")), ValidationError::Fields(vec![INVALID_PHONE]))]
    #[case::not_an_address(user_input(Some("Al"), Some("a..b@c.io"), Some("555")), ValidationError::Rule(INVALID_EMAIL))]
    #[case::space_in_address(user_input(Some("Al"), Some("a b@c.io"), Some("555")), ValidationError::Rule(INVALID_EMAIL))]
    #[case::missing_phone(user_input(Some("Al"), Some("a@b.io"), None), ValidationError::Rule(INVALID_PHONE))]
    fn create_rejections(#[case] input: UserInput, #[case] expected: ValidationError) {
        assert_eq!(validate_create(&input, &UserStore::new()), Err(expected));
    }

    #[test]
    fn field_rules_collect_every_violation() {
        let long_name = "n".repeat(101);
        let long_email = format!("{}@example.com", "e".repeat(95));
        let err = validate_update(&user_input(Some(&long_name), Some(&long_email), Some("12345678901234567890123")))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Fields(vec![NAME_TOO_LONG, EMAIL_TOO_LONG, PHONE_TOO_LONG]),
        );
    }

    #[test]
    fn name_rule_runs_before_email_rule() {
        let err = validate_update(&user_input(Some(""), Some(""), None)).unwrap_err();
        assert_eq!(err, ValidationError::Rule(NAME_REQUIRED));
    }

    #[rstest]
    #[case("5551234")]
    #[case("+1 (555) 123-4567")]
    #[case("555.123.4567 x89")]
    #[case("555-1234 ext. 12")]
    #[case("555 x12 ")]
    fn accepts_phone_shapes(#[case] phone: &str) {
        let user = validate_create(&user_input(Some("Al"), Some("al@example.com"), Some(phone)), &UserStore::new());
        assert_eq!(user.unwrap().phone.as_deref(), Some(phone));
    }

    #[test]
    fn update_allows_missing_phone() {
        let user = validate_update(&user_input(Some("Al"), Some("al@example.com"), None)).unwrap();
        assert_eq!(user.phone, None);
    }

    #[test]
    fn create_rejects_taken_email_last() {
        let store = UserStore::new();
        let first = validate_create(&user_input(Some("Al"), Some("al@example.com"), Some("555")), &store).unwrap();
        store.create(first).unwrap();

        let again = validate_create(&user_input(Some("Bo"), Some("al@example.com"), Some("556")), &store);
        assert_eq!(again, Err(ValidationError::Rule(EMAIL_EXISTS)));

        let missing_phone = validate_create(&user_input(Some("Bo"), Some("al@example.com"), None), &store);
        assert_eq!(missing_phone, Err(ValidationError::Rule(INVALID_PHONE)));
    }
}
