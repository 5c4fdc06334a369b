//! Alert CRUD handlers.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    ActorQuery, AlertListQuery, AlertPatchRequest, AlertRequest, SuccessResponse,
};
use crate::app_state::AppState;
use crate::domain::Alert;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /alerts`: List alerts, optionally for one device.
///
/// # Errors
///
/// Returns [`TrackerError`] on a malformed query or storage failure.
#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "Alerts",
    summary = "List alerts",
    params(AlertListQuery),
    responses(
        (status = 200, description = "Alerts, newest first", body = Vec<Alert>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    )
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertListQuery>, QueryRejection>,
) -> Result<Json<Vec<Alert>>, TrackerError> {
    let Query(query) = query?;
    Ok(Json(state.fleet_service.list_alerts(query.device_id).await?))
}

/// `GET /alerts/{id}`: Get one alert.
///
/// # Errors
///
/// Returns [`TrackerError::AlertNotFound`] if the alert does not exist.
#[utoipa::path(
    get,
    path = "/api/alerts/{id}",
    tag = "Alerts",
    summary = "Get alert",
    params(("id" = i64, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert", body = Alert),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    )
)]
pub async fn get_alert(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Alert>, TrackerError> {
    let Path(id) = id?;
    Ok(Json(state.fleet_service.get_alert(id).await?))
}

/// `POST /alerts`: Raise an alert against an existing device.
///
/// # Errors
///
/// Returns [`TrackerError::RelatedDeviceNotFound`] if the device is missing.
#[utoipa::path(
    post,
    path = "/api/alerts",
    tag = "Alerts",
    summary = "Create alert",
    request_body = AlertRequest,
    responses(
        (status = 201, description = "Alert created", body = Alert),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn create_alert(
    State(state): State<AppState>,
    body: Result<Json<AlertRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TrackerError> {
    let Json(req) = body?;
    let (alert, actor) = req.into_new();
    let created = state
        .fleet_service
        .create_alert(alert, actor.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /alerts/{id}`: Replace every field of an alert.
///
/// # Errors
///
/// Returns [`TrackerError`] on a malformed body, unknown alert or missing
/// target device.
#[utoipa::path(
    put,
    path = "/api/alerts/{id}",
    tag = "Alerts",
    summary = "Replace alert",
    params(("id" = i64, Path, description = "Alert id")),
    request_body = AlertRequest,
    responses(
        (status = 200, description = "Updated alert", body = Alert),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Alert or device not found", body = ErrorResponse),
    )
)]
pub async fn replace_alert(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AlertRequest>, JsonRejection>,
) -> Result<Json<Alert>, TrackerError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let (patch, actor) = req.into_replacement();
    let updated = state
        .fleet_service
        .update_alert(id, patch, actor.as_deref())
        .await?;
    Ok(Json(updated))
}

/// `PATCH /alerts/{id}`: Merge supplied fields into an alert.
///
/// # Errors
///
/// Returns [`TrackerError`] on an empty or malformed body, unknown alert
/// or missing target device.
#[utoipa::path(
    patch,
    path = "/api/alerts/{id}",
    tag = "Alerts",
    summary = "Update alert fields",
    params(("id" = i64, Path, description = "Alert id")),
    request_body = AlertPatchRequest,
    responses(
        (status = 200, description = "Updated alert", body = Alert),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Alert or device not found", body = ErrorResponse),
    )
)]
pub async fn patch_alert(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AlertPatchRequest>, JsonRejection>,
) -> Result<Json<Alert>, TrackerError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let (patch, actor) = req.into_patch();
    let updated = state
        .fleet_service
        .update_alert(id, patch, actor.as_deref())
        .await?;
    Ok(Json(updated))
}

/// `DELETE /alerts/{id}`: Delete one alert.
///
/// # Errors
///
/// Returns [`TrackerError::AlertNotFound`] if the alert does not exist.
#[utoipa::path(
    delete,
    path = "/api/alerts/{id}",
    tag = "Alerts",
    summary = "Delete alert",
    params(("id" = i64, Path, description = "Alert id"), ActorQuery),
    responses(
        (status = 200, description = "Alert deleted", body = SuccessResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse),
    )
)]
pub async fn delete_alert(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ActorQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse>, TrackerError> {
    let Path(id) = id?;
    let Query(query) = query?;
    state
        .fleet_service
        .delete_alert(id, query.performed_by.as_deref())
        .await?;
    Ok(Json(SuccessResponse::OK))
}

/// Alert routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts).post(create_alert))
        .route(
            "/alerts/{id}",
            get(get_alert)
                .put(replace_alert)
                .patch(patch_alert)
                .delete(delete_alert),
        )
}
