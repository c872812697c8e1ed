//! HTTP surface: the user endpoints, `GET /logs`, and the pipeline around them.
//!
//! | Route | Success |
//! |---|---|
//! | `GET /users` | 200, every user |
//! | `GET /users/{id}` | 200, one user |
//! | `POST /users` | 201 + `location: /users/{id}` |
//! | `PUT /users/{id}` | 200, updated user |
//! | `DELETE /users/{id}` | 204 |
//! | `GET /logs` | 200, every request log entry |
//!
//! Expected failures are [`ApiError`] values rendered as 400/404 bodies.
//! Only panics reach the [`ErrorBoundary`].

use std::future::Future;

use serde_json::{Value, json};

use crate::handler::Handler;
use crate::logs::RequestLogStore;
use crate::method::Method;
use crate::middleware::{AuthGate, ErrorBoundary, Pipeline, RequestLogger, Service};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;
use crate::users::{self, StoreError, UserId, UserInput, UserStore, ValidationError};

const USER_NOT_FOUND: &str = "User not found";
const ID_NOT_POSITIVE: &str = "ID must be greater than 0";
const ID_NOT_INTEGER: &str = "ID must be an integer";
const INVALID_BODY: &str = "Invalid request body";

/// Process-lifetime state shared by every handler. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub users: UserStore,
    pub logs: RequestLogStore,
}

/// Builds the full service: AuthGate → ErrorBoundary → RequestLogger → routes.
pub fn app(auth_token: &str, state: AppState) -> Service {
    app_with_boundary(auth_token, state, ErrorBoundary::new())
}

/// [`app`] with a caller-supplied boundary, e.g. one with its own diagnostic sink.
pub fn app_with_boundary(auth_token: &str, state: AppState, boundary: ErrorBoundary) -> Service {
    Pipeline::new()
        .layer(AuthGate::new(auth_token))
        .layer(boundary)
        .layer(RequestLogger::new(state.logs.clone()))
        .build(routes(state))
}

/// The route table, without middleware.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .on(Method::Get,    "/users",      with_state(state.clone(), list_users))
        .on(Method::Get,    "/users/{id}", with_state(state.clone(), get_user))
        .on(Method::Post,   "/users",      with_state(state.clone(), create_user))
        .on(Method::Put,    "/users/{id}", with_state(state.clone(), update_user))
        .on(Method::Delete, "/users/{id}", with_state(state.clone(), delete_user))
        .on(Method::Get,    "/logs",       with_state(state.clone(), list_logs))
}

fn with_state<F, Fut>(state: AppState, f: F) -> impl Handler
where
    F: Fn(AppState, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
{
    move |req: Request| f(state.clone(), req)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn list_users(state: AppState, _req: Request) -> Result<Response, ApiError> {
    Ok(Json(state.users.list()).into_response())
}

async fn get_user(state: AppState, req: Request) -> Result<Response, ApiError> {
    let id = path_id(&req)?;
    Ok(Json(state.users.get(id)?).into_response())
}

async fn create_user(state: AppState, req: Request) -> Result<Response, ApiError> {
    let input = body(&req)?;
    let new_user = users::validate_create(&input, &state.users)?;
    let user = state.users.create(new_user)?;

    let location = format!("/users/{}", user.id);
    let mut res = (Status::Created, Json(user)).into_response();
    res.headers.push(("location".to_owned(), location));
    Ok(res)
}

async fn update_user(state: AppState, req: Request) -> Result<Response, ApiError> {
    let id = path_id(&req)?;
    let input = body(&req)?;
    let changes = users::validate_update(&input)?;
    Ok(Json(state.users.update(id, changes)?).into_response())
}

async fn delete_user(state: AppState, req: Request) -> Result<Response, ApiError> {
    let id = path_id(&req)?;
    state.users.delete(id)?;
    Ok(Response::status(Status::NoContent))
}

async fn list_logs(state: AppState, _req: Request) -> Result<Response, ApiError> {
    let entries = state.logs.snapshot();
    Ok(Json(&entries[..]).into_response())
}

// ── Extraction ────────────────────────────────────────────────────────────────

fn path_id(req: &Request) -> Result<UserId, ApiError> {
    let raw = req.param("id").unwrap_or_default();
    let id: UserId = raw.parse().map_err(|_| ApiError::BadRequest(ID_NOT_INTEGER))?;
    if id <= 0 {
        return Err(ApiError::BadRequest(ID_NOT_POSITIVE));
    }
    Ok(id)
}

/// Only a JSON object is a user body. Derived struct decoding would also take
/// an array and fill the fields by position.
fn body(req: &Request) -> Result<UserInput, ApiError> {
    let invalid = |_: serde_json::Error| ApiError::BadRequest(INVALID_BODY);
    match serde_json::from_slice::<Value>(req.body()).map_err(invalid)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(invalid),
        _ => Err(ApiError::BadRequest(INVALID_BODY)),
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Expected request failures, each with a fixed client-facing body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) | Self::Validation(ValidationError::Rule(msg)) => {
                (Status::BadRequest, Json(json!({ "error": msg }))).into_response()
            }
            Self::Validation(ValidationError::Fields(msgs)) => {
                (Status::BadRequest, Json(json!({ "errors": msgs }))).into_response()
            }
            Self::Store(StoreError::DuplicateEmail) => {
                (Status::BadRequest, Json(json!({ "error": users::validation::EMAIL_EXISTS }))).into_response()
            }
            Self::Store(StoreError::NotFound) => {
                (Status::NotFound, Json(json!({ "error": USER_NOT_FOUND }))).into_response()
            }
        }
    }
}
