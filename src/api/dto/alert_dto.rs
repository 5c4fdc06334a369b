//! Alert request bodies.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{AlertPatch, AlertType, NewAlert};

/// `POST /alerts` and `PUT /alerts/{id}` body: a full alert.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AlertRequest {
    /// Device the alert is raised against.
    pub device_id: i64,
    /// Severity.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Message text.
    pub message: String,
    /// Acting user recorded in the audit trail.
    #[serde(default)]
    pub performed_by: Option<String>,
}

impl AlertRequest {
    /// Splits the body into the insertable alert and the acting user.
    #[must_use]
    pub fn into_new(self) -> (NewAlert, Option<String>) {
        let alert = NewAlert {
            device_id: self.device_id,
            alert_type: self.alert_type,
            message: self.message,
        };
        (alert, self.performed_by)
    }

    /// Splits the body into a patch that overwrites every field.
    #[must_use]
    pub fn into_replacement(self) -> (AlertPatch, Option<String>) {
        let patch = AlertPatch {
            device_id: Some(self.device_id),
            alert_type: Some(self.alert_type),
            message: Some(self.message),
        };
        (patch, self.performed_by)
    }
}

/// `PATCH /alerts/{id}` body: any subset of alert fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AlertPatchRequest {
    /// Move the alert to another device.
    #[serde(default)]
    pub device_id: Option<i64>,
    /// New severity.
    #[serde(default, rename = "type")]
    pub alert_type: Option<AlertType>,
    /// New message text.
    #[serde(default)]
    pub message: Option<String>,
    /// Acting user recorded in the audit trail.
    #[serde(default)]
    pub performed_by: Option<String>,
}

impl AlertPatchRequest {
    /// Splits the body into the patch and the acting user.
    #[must_use]
    pub fn into_patch(self) -> (AlertPatch, Option<String>) {
        let patch = AlertPatch {
            device_id: self.device_id,
            alert_type: self.alert_type,
            message: self.message,
        };
        (patch, self.performed_by)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn type_field_uses_wire_name() {
        let Ok(req) = serde_json::from_str::<AlertRequest>(
            r#"{"device_id":1,"type":"critical","message":"fan stopped"}"#,
        ) else {
            panic!("valid body rejected");
        };
        let (alert, actor) = req.into_new();
        assert_eq!(alert.alert_type, AlertType::Critical);
        assert!(actor.is_none());
    }

    #[test]
    fn patch_may_only_move_device() {
        let Ok(req) = serde_json::from_str::<AlertPatchRequest>(
            r#"{"device_id":4,"performed_by":"ops"}"#,
        ) else {
            panic!("partial body rejected");
        };
        let (patch, actor) = req.into_patch();
        assert_eq!(patch.device_id, Some(4));
        assert!(patch.message.is_none());
        assert_eq!(actor.as_deref(), Some("ops"));
    }
}
