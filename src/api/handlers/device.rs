//! Device CRUD handlers, plus the per-device alert listing.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ActorQuery, DevicePatchRequest, DeviceRequest, SuccessResponse};
use crate::app_state::AppState;
use crate::domain::{Alert, Device};
use crate::error::{ErrorResponse, TrackerError};

/// `GET /devices`: List all devices, newest first.
///
/// # Errors
///
/// Returns [`TrackerError::Storage`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "Devices",
    summary = "List devices",
    responses(
        (status = 200, description = "All devices, newest first", body = Vec<Device>),
    )
)]
pub async fn list_devices(State(state): State<AppState>) -> Result<Json<Vec<Device>>, TrackerError> {
    Ok(Json(state.fleet_service.list_devices().await?))
}

/// `GET /devices/{id}`: Get one device.
///
/// # Errors
///
/// Returns [`TrackerError::DeviceNotFound`] if the device does not exist.
#[utoipa::path(
    get,
    path = "/api/devices/{id}",
    tag = "Devices",
    summary = "Get device",
    params(("id" = i64, Path, description = "Device id")),
    responses(
        (status = 200, description = "Device", body = Device),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn get_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Device>, TrackerError> {
    let Path(id) = id?;
    Ok(Json(state.fleet_service.get_device(id).await?))
}

/// `POST /devices`: Register a device.
///
/// # Errors
///
/// Returns [`TrackerError`] on a malformed body or blank field.
#[utoipa::path(
    post,
    path = "/api/devices",
    tag = "Devices",
    summary = "Create device",
    description = "Stores a device and records a `devices/create` audit entry attributed to `performed_by`.",
    request_body = DeviceRequest,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 400, description = "Invalid body", body = ErrorResponse),
    )
)]
pub async fn create_device(
    State(state): State<AppState>,
    body: Result<Json<DeviceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TrackerError> {
    let Json(req) = body?;
    let (device, actor) = req.into_new();
    let created = state
        .fleet_service
        .create_device(device, actor.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /devices/{id}`: Replace every field of a device.
///
/// # Errors
///
/// Returns [`TrackerError`] on a malformed body or unknown device.
#[utoipa::path(
    put,
    path = "/api/devices/{id}",
    tag = "Devices",
    summary = "Replace device",
    params(("id" = i64, Path, description = "Device id")),
    request_body = DeviceRequest,
    responses(
        (status = 200, description = "Updated device", body = Device),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn replace_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<DeviceRequest>, JsonRejection>,
) -> Result<Json<Device>, TrackerError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let (patch, actor) = req.into_replacement();
    let updated = state
        .fleet_service
        .update_device(id, patch, actor.as_deref())
        .await?;
    Ok(Json(updated))
}

/// `PATCH /devices/{id}`: Merge supplied fields into a device.
///
/// # Errors
///
/// Returns [`TrackerError`] on an empty or malformed body or unknown device.
#[utoipa::path(
    patch,
    path = "/api/devices/{id}",
    tag = "Devices",
    summary = "Update device fields",
    params(("id" = i64, Path, description = "Device id")),
    request_body = DevicePatchRequest,
    responses(
        (status = 200, description = "Updated device", body = Device),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn patch_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<DevicePatchRequest>, JsonRejection>,
) -> Result<Json<Device>, TrackerError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let (patch, actor) = req.into_patch();
    let updated = state
        .fleet_service
        .update_device(id, patch, actor.as_deref())
        .await?;
    Ok(Json(updated))
}

/// `DELETE /devices/{id}`: Delete a device and all of its alerts.
///
/// # Errors
///
/// Returns [`TrackerError::DeviceNotFound`] if the device does not exist.
#[utoipa::path(
    delete,
    path = "/api/devices/{id}",
    tag = "Devices",
    summary = "Delete device",
    description = "Deletes every alert of the device, each audited, then the device itself.",
    params(("id" = i64, Path, description = "Device id"), ActorQuery),
    responses(
        (status = 200, description = "Device deleted", body = SuccessResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn delete_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ActorQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse>, TrackerError> {
    let Path(id) = id?;
    let Query(query) = query?;
    state
        .fleet_service
        .delete_device(id, query.performed_by.as_deref())
        .await?;
    Ok(Json(SuccessResponse::OK))
}

/// `GET /devices/{id}/alerts`: List the alerts of one device.
///
/// # Errors
///
/// Returns [`TrackerError::Storage`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/devices/{id}/alerts",
    tag = "Devices",
    summary = "List device alerts",
    params(("id" = i64, Path, description = "Device id")),
    responses(
        (status = 200, description = "Alerts of the device, newest first", body = Vec<Alert>),
    )
)]
pub async fn list_device_alerts(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Alert>>, TrackerError> {
    let Path(id) = id?;
    Ok(Json(state.fleet_service.list_alerts(Some(id)).await?))
}

/// Device routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list_devices).post(create_device))
        .route(
            "/devices/{id}",
            get(get_device)
                .put(replace_device)
                .patch(patch_device)
                .delete(delete_device),
        )
        .route("/devices/{id}/alerts", get(list_device_alerts))
}
