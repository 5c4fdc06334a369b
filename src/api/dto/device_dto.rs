//! Device request bodies.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{DevicePatch, DeviceStatus, NewDevice};

/// `POST /devices` and `PUT /devices/{id}` body: a full device.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeviceRequest {
    /// Display name.
    pub name: String,
    /// Operating-system label.
    pub os: String,
    /// Status.
    pub status: DeviceStatus,
    /// Location.
    pub location: String,
    /// Acting user recorded in the audit trail.
    #[serde(default)]
    pub performed_by: Option<String>,
}

impl DeviceRequest {
    /// Splits the body into the insertable device and the acting user.
    #[must_use]
    pub fn into_new(self) -> (NewDevice, Option<String>) {
        let device = NewDevice {
            name: self.name,
            os: self.os,
            status: self.status,
            location: self.location,
        };
        (device, self.performed_by)
    }

    /// Splits the body into a patch that overwrites every field.
    #[must_use]
    pub fn into_replacement(self) -> (DevicePatch, Option<String>) {
        let patch = DevicePatch {
            name: Some(self.name),
            os: Some(self.os),
            status: Some(self.status),
            location: Some(self.location),
        };
        (patch, self.performed_by)
    }
}

/// `PATCH /devices/{id}` body: any subset of device fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DevicePatchRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New operating-system label.
    #[serde(default)]
    pub os: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    /// New location.
    #[serde(default)]
    pub location: Option<String>,
    /// Acting user recorded in the audit trail.
    #[serde(default)]
    pub performed_by: Option<String>,
}

impl DevicePatchRequest {
    /// Splits the body into the patch and the acting user.
    #[must_use]
    pub fn into_patch(self) -> (DevicePatch, Option<String>) {
        let patch = DevicePatch {
            name: self.name,
            os: self.os,
            status: self.status,
            location: self.location,
        };
        (patch, self.performed_by)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn full_body_parses_with_actor() {
        let Ok(req) = serde_json::from_str::<DeviceRequest>(
            r#"{"name":"A","os":"Linux","status":"online","location":"Rack1","performed_by":"alice"}"#,
        ) else {
            panic!("valid body rejected");
        };
        let (device, actor) = req.into_new();
        assert_eq!(device.status, DeviceStatus::Online);
        assert_eq!(actor.as_deref(), Some("alice"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let parsed = serde_json::from_str::<DeviceRequest>(
            r#"{"name":"A","os":"Linux","status":"sleeping","location":"Rack1"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn replacement_sets_every_field() {
        let req = DeviceRequest {
            name: "B".to_string(),
            os: "BSD".to_string(),
            status: DeviceStatus::Error,
            location: "Rack2".to_string(),
            performed_by: None,
        };
        let (patch, actor) = req.into_replacement();
        assert!(patch.name.is_some() && patch.os.is_some() && patch.location.is_some());
        assert_eq!(patch.status, Some(DeviceStatus::Error));
        assert!(actor.is_none());
    }

    #[test]
    fn partial_body_leaves_missing_fields_unset() {
        let Ok(req) = serde_json::from_str::<DevicePatchRequest>(r#"{"status":"offline"}"#) else {
            panic!("partial body rejected");
        };
        let (patch, _) = req.into_patch();
        assert_eq!(patch.status, Some(DeviceStatus::Offline));
        assert!(patch.name.is_none());
    }
}
