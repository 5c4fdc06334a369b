//! Database row shapes and their mapping into domain types.
//!
//! Enum columns are stored as lowercase text; a value outside the known
//! set surfaces as [`StorageError::Corrupt`].

use chrono::{DateTime, Utc};

use super::StorageError;
use crate::domain::{Alert, AuditLog, Device, User};

/// A row of the `devices` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceRow {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Operating-system label.
    pub os: String,
    /// Status text.
    pub status: String,
    /// Location.
    pub location: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = StorageError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| corrupt("devices", e))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            os: row.os,
            status,
            location: row.location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row of the `alerts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertRow {
    /// Primary key.
    pub id: i64,
    /// Referenced device.
    pub device_id: i64,
    /// Alert type text.
    #[sqlx(rename = "type")]
    pub alert_type: String,
    /// Message.
    pub message: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = StorageError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let alert_type = row.alert_type.parse().map_err(|e| corrupt("alerts", e))?;
        Ok(Self {
            id: row.id,
            device_id: row.device_id,
            alert_type,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

/// A row of the `audit_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditLogRow {
    /// Primary key.
    pub id: i64,
    /// Entity collection name.
    pub table_name: String,
    /// Action text.
    pub action: String,
    /// Affected row id.
    pub record_id: i64,
    /// Acting user.
    pub performed_by: String,
    /// Write timestamp.
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<AuditLogRow> for AuditLog {
    type Error = StorageError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        let action = row.action.parse().map_err(|e| corrupt("audit_logs", e))?;
        Ok(Self {
            id: row.id,
            table_name: row.table_name,
            action,
            record_id: row.record_id,
            performed_by: row.performed_by,
            timestamp: row.timestamp,
        })
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Primary key.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// bcrypt hash.
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

fn corrupt(table: &'static str, reason: impl std::fmt::Display) -> StorageError {
    StorageError::Corrupt {
        table,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AlertType, AuditAction, DeviceStatus};

    #[test]
    fn device_row_maps_status() {
        let now = Utc::now();
        let row = DeviceRow {
            id: 3,
            name: "edge".to_string(),
            os: "Linux".to_string(),
            status: "warning".to_string(),
            location: "Rack1".to_string(),
            created_at: now,
            updated_at: now,
        };
        let Ok(device) = Device::try_from(row) else {
            panic!("valid row rejected");
        };
        assert_eq!(device.status, DeviceStatus::Warning);
    }

    #[test]
    fn unknown_enum_text_is_corrupt() {
        let row = AlertRow {
            id: 1,
            device_id: 1,
            alert_type: "fatal".to_string(),
            message: "disk low".to_string(),
            created_at: Utc::now(),
        };
        let Err(StorageError::Corrupt { table, .. }) = Alert::try_from(row) else {
            panic!("unknown type accepted");
        };
        assert_eq!(table, "alerts");
    }

    #[test]
    fn audit_row_maps_action() {
        let row = AuditLogRow {
            id: 9,
            table_name: "alerts".to_string(),
            action: "delete".to_string(),
            record_id: 4,
            performed_by: "system".to_string(),
            timestamp: Utc::now(),
        };
        assert!(matches!(
            AuditLog::try_from(row),
            Ok(AuditLog { action: AuditAction::Delete, record_id: 4, .. })
        ));
        assert_eq!(AlertType::Critical.as_str(), "critical");
    }
}
