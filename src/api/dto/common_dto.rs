//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query string accepted by delete endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActorQuery {
    /// Acting user recorded in the audit trail; defaults to `system`.
    pub performed_by: Option<String>,
}

/// Query string accepted by `GET /alerts`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertListQuery {
    /// Restrict the list to alerts of this device.
    pub device_id: Option<i64>,
}

/// Body returned by successful deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    /// The only value this type ever takes on the wire.
    pub const OK: Self = Self { success: true };
}
