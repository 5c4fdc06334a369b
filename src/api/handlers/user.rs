//! User registration and lookup handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::{Credentials, User};
use crate::error::{ErrorResponse, TrackerError};

/// `POST /users`: Register a user.
///
/// # Errors
///
/// Returns [`TrackerError::UsernameTaken`] if the username is in use.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    summary = "Register user",
    description = "Stores the user with a bcrypt hash of the password. The hash is never returned.",
    request_body = Credentials,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, TrackerError> {
    let Json(credentials) = body?;
    let user = state.fleet_service.register_user(credentials).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`: Look a user up by id.
///
/// # Errors
///
/// Returns [`TrackerError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    summary = "Get user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, TrackerError> {
    let Path(id) = id?;
    Ok(Json(state.fleet_service.get_user(id).await?))
}

/// `GET /users/by-username/{username}`: Look a user up by name.
///
/// # Errors
///
/// Returns [`TrackerError::UserNotFound`] if nobody holds the username.
#[utoipa::path(
    get,
    path = "/api/users/by-username/{username}",
    tag = "Users",
    summary = "Find user by username",
    params(("username" = String, Path, description = "Exact username")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, TrackerError> {
    Ok(Json(
        state.fleet_service.get_user_by_username(&username).await?,
    ))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{id}", get(get_user))
        .route("/users/by-username/{username}", get(get_user_by_username))
}
