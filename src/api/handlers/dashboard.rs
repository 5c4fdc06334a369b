//! Audit trail and dashboard summary handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::AuditLog;
use crate::error::TrackerError;
use crate::service::DashboardStats;

/// `GET /audit-logs`: Full audit trail, newest first.
///
/// # Errors
///
/// Returns [`TrackerError::Storage`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    tag = "Audit",
    summary = "List audit entries",
    responses(
        (status = 200, description = "Audit entries, newest first", body = Vec<AuditLog>),
    )
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuditLog>>, TrackerError> {
    Ok(Json(state.fleet_service.audit_logs().await?))
}

/// `GET /stats`: Dashboard counters and the latest alerts.
///
/// # Errors
///
/// Returns [`TrackerError::Storage`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Audit",
    summary = "Dashboard summary",
    responses(
        (status = 200, description = "Counters and recent alerts", body = DashboardStats),
    )
)]
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, TrackerError> {
    Ok(Json(state.fleet_service.stats().await?))
}

/// Audit and dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(list_audit_logs))
        .route("/stats", get(stats))
}
