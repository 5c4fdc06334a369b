//! Read-side dashboard summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Alert, AuditLog, Device, DeviceStatus};

/// Number of alerts shown in the "recent" panel.
pub const RECENT_ALERTS: usize = 5;

/// Counters and the latest alerts shown on the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of tracked devices.
    pub total_devices: usize,
    /// Devices currently reporting `offline`.
    pub offline_devices: usize,
    /// Number of stored alerts.
    pub active_alerts: usize,
    /// Audit entries written since midnight UTC.
    pub today_audit_logs: usize,
    /// The most recent alerts, newest first.
    pub recent_alerts: Vec<Alert>,
}

impl DashboardStats {
    /// Folds the full device, alert and audit lists into the summary.
    ///
    /// `alerts` may arrive in any order; `now` fixes the start of "today".
    #[must_use]
    pub fn compute(
        devices: &[Device],
        mut alerts: Vec<Alert>,
        audit_logs: &[AuditLog],
        now: DateTime<Utc>,
    ) -> Self {
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map_or(now, |t| t.and_utc());

        let active_alerts = alerts.len();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        alerts.truncate(RECENT_ALERTS);

        Self {
            total_devices: devices.len(),
            offline_devices: devices
                .iter()
                .filter(|d| d.status == DeviceStatus::Offline)
                .count(),
            active_alerts,
            today_audit_logs: audit_logs.iter().filter(|l| l.timestamp >= midnight).count(),
            recent_alerts: alerts,
        }
    }
}
