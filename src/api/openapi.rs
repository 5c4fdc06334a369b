//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    AlertPatchRequest, AlertRequest, DevicePatchRequest, DeviceRequest, SuccessResponse,
};
use super::handlers::{alert, dashboard, device, system, user};
use crate::domain::{Alert, AlertType, AuditAction, AuditLog, Credentials, Device, DeviceStatus, User};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::DashboardStats;

/// Generated OpenAPI specification, served by Swagger UI when the
/// `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "fleet-tracker",
        description = "Devices, alerts and the audit trail of every change made to them."
    ),
    paths(
        device::list_devices,
        device::get_device,
        device::create_device,
        device::replace_device,
        device::patch_device,
        device::delete_device,
        device::list_device_alerts,
        alert::list_alerts,
        alert::get_alert,
        alert::create_alert,
        alert::replace_alert,
        alert::patch_alert,
        alert::delete_alert,
        dashboard::list_audit_logs,
        dashboard::stats,
        user::register_user,
        user::get_user,
        user::get_user_by_username,
        system::health_handler,
    ),
    components(schemas(
        Device,
        DeviceStatus,
        Alert,
        AlertType,
        AuditLog,
        AuditAction,
        User,
        Credentials,
        DashboardStats,
        DeviceRequest,
        DevicePatchRequest,
        AlertRequest,
        AlertPatchRequest,
        SuccessResponse,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Devices", description = "Tracked devices"),
        (name = "Alerts", description = "Alerts raised against devices"),
        (name = "Audit", description = "Audit trail and dashboard summary"),
        (name = "Users", description = "Dashboard user accounts"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;
